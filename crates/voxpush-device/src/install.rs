use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};
use voxpush_wire::{InstallReply, InstallRequest};

use crate::dp;
use crate::error::{DeviceError, Result};
use crate::transport::{DeviceTransport, DpMap};

/// Confirmation state the device reports for an install command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// The reply carried no state field.
    Unknown,
    /// Acknowledged; the device is still downloading or installing.
    Pending,
    /// Pack downloaded and installed.
    Success,
    /// The device refused the pack id.
    Rejected,
    /// A state code this crate does not know.
    Other(u64),
}

impl InstallState {
    /// Classify a reply's state code.
    pub fn from_code(code: Option<u64>) -> Self {
        match code {
            None => InstallState::Unknown,
            Some(1) => InstallState::Pending,
            Some(2) => InstallState::Success,
            Some(3) => InstallState::Rejected,
            Some(code) => InstallState::Other(code),
        }
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallState::Unknown => write!(f, "unknown"),
            InstallState::Pending => write!(f, "pending"),
            InstallState::Success => write!(f, "success"),
            InstallState::Rejected => write!(f, "rejected"),
            InstallState::Other(code) => write!(f, "state {code}"),
        }
    }
}

/// Advisory table of currently-installed pack versions.
///
/// The device only applies a pack whose version strictly exceeds the one it
/// has, so pushing at or below the known version is usually a device-side
/// no-op. The table is consulted for a warning before sending and nothing
/// more; it never blocks a push and is passed in per call, not held as
/// process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownVersions(BTreeMap<u64, u64>);

impl Default for KnownVersions {
    /// The official pack versions as last observed.
    fn default() -> Self {
        KnownVersions(BTreeMap::from([
            (dp::PACK_FEMALE, 13),
            (dp::PACK_MALE, 15),
        ]))
    }
}

impl KnownVersions {
    /// An empty table; no advisory ever fires.
    pub fn empty() -> Self {
        KnownVersions(BTreeMap::new())
    }

    /// Record or override the known version for a pack.
    pub fn set(&mut self, pack_id: u64, version: u64) {
        self.0.insert(pack_id, version);
    }

    pub fn get(&self, pack_id: u64) -> Option<u64> {
        self.0.get(&pack_id).copied()
    }

    /// The advisory for a requested push, if the requested version is not
    /// strictly greater than the known one.
    pub fn check(&self, pack_id: u64, version: u64) -> Option<VersionAdvisory> {
        match self.get(pack_id) {
            Some(known) if version <= known => Some(VersionAdvisory {
                pack_id,
                requested: version,
                known,
            }),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.0.iter().map(|(&pack_id, &version)| (pack_id, version))
    }
}

/// Warning that the device will likely ignore the requested version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionAdvisory {
    pub pack_id: u64,
    pub requested: u64,
    pub known: u64,
}

impl fmt::Display for VersionAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version {} is not higher than known version {} for pack {}; the device may ignore the command",
            self.requested, self.known, self.pack_id
        )
    }
}

/// What came back (or didn't) for one push.
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    /// The reply map had no voice-pack datapoint. The device may still be
    /// downloading; the flow reports this rather than retrying.
    NoResponse,
    /// The device replied and the reply decoded.
    Classified {
        reply: InstallReply,
        state: InstallState,
    },
}

/// Everything observed during one push.
#[derive(Debug, Clone, PartialEq)]
pub struct PushReport {
    /// The encoded command exactly as sent.
    pub payload: String,
    /// Pre-send version warning, if one fired.
    pub advisory: Option<VersionAdvisory>,
    pub outcome: PushOutcome,
    /// Volume read back from the best-effort status query.
    pub volume: Option<serde_json::Value>,
}

/// Knobs for one push.
#[derive(Debug, Clone)]
pub struct PushOptions {
    /// Advisory version table consulted before sending.
    pub known_versions: KnownVersions,
    /// Read device status after classification to report the volume.
    pub confirm_status: bool,
    /// How long to let the device settle before the status read.
    pub settle: Duration,
}

impl Default for PushOptions {
    fn default() -> Self {
        PushOptions {
            known_versions: KnownVersions::default(),
            confirm_status: true,
            settle: Duration::from_secs(1),
        }
    }
}

/// Push a voice pack install command and classify the confirmation.
///
/// Synchronous; the only blocking points are the transport calls. A
/// transport error aborts, a missing reply does not, and nothing after
/// classification can change the classification.
pub fn push_pack<T: DeviceTransport>(
    transport: &mut T,
    request: &InstallRequest,
    options: &PushOptions,
) -> Result<PushReport> {
    let advisory = options
        .known_versions
        .check(request.set_id, request.version);
    if let Some(advisory) = &advisory {
        warn!("{advisory}");
    }

    let payload = request.encode();
    debug!(dp = dp::VOICE_PACK, pack_id = request.set_id, "sending install command");

    let reply_map = transport.set_value(dp::VOICE_PACK, &payload)?;
    let outcome = classify_reply(&reply_map)?;

    let volume = if options.confirm_status {
        if !options.settle.is_zero() {
            std::thread::sleep(options.settle);
        }
        read_volume(transport)
    } else {
        None
    };

    Ok(PushReport {
        payload,
        advisory,
        outcome,
        volume,
    })
}

fn classify_reply(reply_map: &DpMap) -> Result<PushOutcome> {
    let Some(value) = reply_map.get(&dp::VOICE_PACK) else {
        return Ok(PushOutcome::NoResponse);
    };
    let text = value.as_str().ok_or(DeviceError::UnexpectedValue {
        dp: dp::VOICE_PACK,
    })?;
    let reply = InstallReply::parse(text)?;
    let state = InstallState::from_code(reply.state);
    debug!(?state, "install reply classified");
    Ok(PushOutcome::Classified { reply, state })
}

/// Best-effort volume readback. Failures are logged and swallowed; the
/// classification already happened.
fn read_volume<T: DeviceTransport>(transport: &mut T) -> Option<serde_json::Value> {
    match transport.status() {
        Ok(status) => status.get(&dp::VOLUME).cloned(),
        Err(err) => {
            debug!("status readback failed: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::TransportError;

    // Captured reply payloads; field layouts are covered by voxpush-wire.
    const REPLY_SUCCESS: &str = "ChD2AxgQIPYDKAI=";
    const REPLY_REJECTED: &str = "BSDnBygD";

    struct ScriptedTransport {
        reply: DpMap,
        status: DpMap,
        fail_send: bool,
        fail_status: bool,
        sent: Vec<(u32, String)>,
        status_reads: usize,
    }

    impl ScriptedTransport {
        fn replying(reply: DpMap) -> Self {
            ScriptedTransport {
                reply,
                status: DpMap::new(),
                fail_send: false,
                fail_status: false,
                sent: Vec::new(),
                status_reads: 0,
            }
        }
    }

    impl DeviceTransport for ScriptedTransport {
        fn set_value(&mut self, dp: u32, value: &str) -> std::result::Result<DpMap, TransportError> {
            if self.fail_send {
                return Err(TransportError::Unavailable {
                    reason: "scripted failure".to_string(),
                });
            }
            self.sent.push((dp, value.to_string()));
            Ok(self.reply.clone())
        }

        fn status(&mut self) -> std::result::Result<DpMap, TransportError> {
            self.status_reads += 1;
            if self.fail_status {
                return Err(TransportError::Unavailable {
                    reason: "scripted status failure".to_string(),
                });
            }
            Ok(self.status.clone())
        }
    }

    fn sample_request() -> InstallRequest {
        InstallRequest {
            set_id: 502,
            url: "http://10.0.0.5/pack.zip".to_string(),
            content_hash: "c808f5460f6663f467af482bc94dc34".to_string(),
            version: 16,
            size_bytes: 748_473,
        }
    }

    fn quiet_options() -> PushOptions {
        PushOptions {
            settle: Duration::ZERO,
            ..PushOptions::default()
        }
    }

    #[test]
    fn classifies_success_reply() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(REPLY_SUCCESS))]));
        let report = push_pack(&mut transport, &sample_request(), &quiet_options()).unwrap();

        match &report.outcome {
            PushOutcome::Classified { reply, state } => {
                assert_eq!(*state, InstallState::Success);
                assert_eq!(reply.installed_id, Some(502));
                assert_eq!(reply.installed_version, Some(16));
            }
            other => panic!("expected classified outcome, got {other:?}"),
        }

        // The command went to the voice pack datapoint, encoded once.
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0].0, dp::VOICE_PACK);
        assert_eq!(transport.sent[0].1, report.payload);
        assert_eq!(transport.sent[0].1, sample_request().encode());
    }

    #[test]
    fn classifies_rejected_reply() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(REPLY_REJECTED))]));
        let report = push_pack(&mut transport, &sample_request(), &quiet_options()).unwrap();

        match &report.outcome {
            PushOutcome::Classified { reply, state } => {
                assert_eq!(*state, InstallState::Rejected);
                assert_eq!(reply.target_id, Some(999));
            }
            other => panic!("expected classified outcome, got {other:?}"),
        }
    }

    #[test]
    fn missing_datapoint_is_no_response() {
        let mut transport = ScriptedTransport::replying(DpMap::new());
        let report = push_pack(&mut transport, &sample_request(), &quiet_options()).unwrap();
        assert_eq!(report.outcome, PushOutcome::NoResponse);
    }

    #[test]
    fn transport_error_propagates() {
        let mut transport = ScriptedTransport::replying(DpMap::new());
        transport.fail_send = true;
        let result = push_pack(&mut transport, &sample_request(), &quiet_options());
        assert!(matches!(result, Err(DeviceError::Transport(_))));
    }

    #[test]
    fn malformed_reply_is_an_error() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!("!!!"))]));
        let result = push_pack(&mut transport, &sample_request(), &quiet_options());
        assert!(matches!(result, Err(DeviceError::MalformedReply(_))));
    }

    #[test]
    fn non_string_reply_value_is_an_error() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(7))]));
        let result = push_pack(&mut transport, &sample_request(), &quiet_options());
        assert!(matches!(
            result,
            Err(DeviceError::UnexpectedValue { dp: dp::VOICE_PACK })
        ));
    }

    #[test]
    fn advisory_fires_but_never_blocks() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(REPLY_SUCCESS))]));
        let request = InstallRequest {
            version: 15,
            ..sample_request()
        };
        let report = push_pack(&mut transport, &request, &quiet_options()).unwrap();

        let advisory = report.advisory.expect("version 15 <= known 15 should warn");
        assert_eq!(advisory.pack_id, 502);
        assert_eq!(advisory.requested, 15);
        assert_eq!(advisory.known, 15);
        // The send still happened.
        assert_eq!(transport.sent.len(), 1);
    }

    #[test]
    fn no_advisory_above_known_version() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(REPLY_SUCCESS))]));
        let report = push_pack(&mut transport, &sample_request(), &quiet_options()).unwrap();
        assert!(report.advisory.is_none());
    }

    #[test]
    fn no_advisory_for_unlisted_pack() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(REPLY_SUCCESS))]));
        let request = InstallRequest {
            set_id: 700,
            version: 1,
            ..sample_request()
        };
        let report = push_pack(&mut transport, &request, &quiet_options()).unwrap();
        assert!(report.advisory.is_none());
    }

    #[test]
    fn volume_is_reported_from_status() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(REPLY_SUCCESS))]));
        transport.status = DpMap::from([(dp::VOLUME, json!(77))]);
        let report = push_pack(&mut transport, &sample_request(), &quiet_options()).unwrap();
        assert_eq!(report.volume, Some(json!(77)));
        assert_eq!(transport.status_reads, 1);
    }

    #[test]
    fn status_failure_is_non_fatal() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(REPLY_SUCCESS))]));
        transport.fail_status = true;
        let report = push_pack(&mut transport, &sample_request(), &quiet_options()).unwrap();

        assert!(matches!(
            report.outcome,
            PushOutcome::Classified {
                state: InstallState::Success,
                ..
            }
        ));
        assert_eq!(report.volume, None);
    }

    #[test]
    fn status_is_skipped_when_disabled() {
        let mut transport =
            ScriptedTransport::replying(DpMap::from([(dp::VOICE_PACK, json!(REPLY_SUCCESS))]));
        let options = PushOptions {
            confirm_status: false,
            ..quiet_options()
        };
        push_pack(&mut transport, &sample_request(), &options).unwrap();
        assert_eq!(transport.status_reads, 0);
    }

    #[test]
    fn state_codes_classify() {
        assert_eq!(InstallState::from_code(None), InstallState::Unknown);
        assert_eq!(InstallState::from_code(Some(1)), InstallState::Pending);
        assert_eq!(InstallState::from_code(Some(2)), InstallState::Success);
        assert_eq!(InstallState::from_code(Some(3)), InstallState::Rejected);
        assert_eq!(InstallState::from_code(Some(9)), InstallState::Other(9));
    }

    #[test]
    fn default_known_versions_match_official_packs() {
        let table = KnownVersions::default();
        assert_eq!(table.get(dp::PACK_FEMALE), Some(13));
        assert_eq!(table.get(dp::PACK_MALE), Some(15));
        assert_eq!(table.get(999), None);
    }

    #[test]
    fn empty_table_never_advises() {
        assert!(KnownVersions::empty().check(502, 1).is_none());
    }
}
