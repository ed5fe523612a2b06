use std::process::Command;

use tracing::debug;
use voxpush_device::{DeviceTransport, DpMap, TransportError};

/// Runs device exchanges through an external transport command.
///
/// The bridge process owns the encrypted device session: device id, local
/// key, socket, retries. Contract: the command is invoked as
/// `<bridge...> set <dp> <value>` or `<bridge...> status`, prints one JSON
/// object of datapoint id → value on stdout, and exits zero. A datapoint the
/// device never answered for is simply absent from the object.
pub struct BridgeTransport {
    program: String,
    args: Vec<String>,
}

impl BridgeTransport {
    /// Build from a whitespace-separated command line. Returns `None` for an
    /// empty line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(BridgeTransport {
            program,
            args: parts.collect(),
        })
    }

    fn invoke(&self, extra: &[&str]) -> Result<DpMap, TransportError> {
        debug!(program = %self.program, ?extra, "invoking transport bridge");
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Unavailable {
                reason: format!("bridge exited with {}: {}", output.status, stderr.trim()),
            });
        }
        parse_reply(&output.stdout)
    }
}

impl DeviceTransport for BridgeTransport {
    fn set_value(&mut self, dp: u32, value: &str) -> Result<DpMap, TransportError> {
        self.invoke(&["set", &dp.to_string(), value])
    }

    fn status(&mut self) -> Result<DpMap, TransportError> {
        self.invoke(&["status"])
    }
}

fn parse_reply(stdout: &[u8]) -> Result<DpMap, TransportError> {
    let value: serde_json::Value =
        serde_json::from_slice(stdout).map_err(|err| TransportError::Unavailable {
            reason: format!("bridge printed invalid JSON: {err}"),
        })?;
    let object = value.as_object().ok_or_else(|| TransportError::Unavailable {
        reason: "bridge reply is not a JSON object".to_string(),
    })?;

    let mut map = DpMap::new();
    for (key, value) in object {
        let dp = key.parse::<u32>().map_err(|_| TransportError::Unavailable {
            reason: format!("bridge reply key '{key}' is not a datapoint id"),
        })?;
        map.insert(dp, value.clone());
    }
    Ok(map)
}
