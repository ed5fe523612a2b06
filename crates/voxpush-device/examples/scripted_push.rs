//! Full push flow against a canned in-memory transport, no device needed.
//!
//! Run with:
//!   cargo run -p voxpush-device --example scripted_push

use std::time::Duration;

use serde_json::json;
use voxpush_device::{
    dp, push_pack, DeviceTransport, DpMap, PushOptions, PushOutcome, TransportError,
};
use voxpush_wire::InstallRequest;

/// Answers every send with a captured success reply.
struct CannedTransport;

impl DeviceTransport for CannedTransport {
    fn set_value(&mut self, dp: u32, value: &str) -> Result<DpMap, TransportError> {
        eprintln!("-> set dp {dp} = {value}");
        Ok(DpMap::from([(dp, json!("ChD2AxgQIPYDKAI="))]))
    }

    fn status(&mut self) -> Result<DpMap, TransportError> {
        Ok(DpMap::from([(dp::VOLUME, json!(80))]))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let request = InstallRequest {
        set_id: 502,
        url: "http://192.168.1.100/en_us_male.zip".to_string(),
        content_hash: "c808f5460f6663f467af482bc94dc34f".to_string(),
        version: 16,
        size_bytes: 748_473,
    };

    let options = PushOptions {
        settle: Duration::ZERO,
        ..PushOptions::default()
    };
    let report = push_pack(&mut CannedTransport, &request, &options)?;

    match report.outcome {
        PushOutcome::Classified { reply, state } => {
            println!("state             : {state}");
            println!("installed_id      : {:?}", reply.installed_id);
            println!("installed_version : {:?}", reply.installed_version);
        }
        PushOutcome::NoResponse => println!("no confirmation received"),
    }
    if let Some(volume) = report.volume {
        println!("volume            : {volume}");
    }

    Ok(())
}
