use std::collections::BTreeMap;
use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use voxpush_device::{dp, InstallState, KnownVersions, PushOutcome, PushReport};
use voxpush_wire::{FieldValue, InstallReply, InstallRequest};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PayloadOutput<'a> {
    payload: &'a str,
    set_id: u64,
    pack_name: Option<&'static str>,
    url: &'a str,
    content_hash: &'a str,
    version: u64,
    size_bytes: u64,
}

/// Print an encoded command plus the request it came from.
pub fn print_payload(request: &InstallRequest, payload: &str, format: OutputFormat) {
    let pack_name = dp::pack_name(request.set_id);
    match format {
        OutputFormat::Json => {
            let out = PayloadOutput {
                payload,
                set_id: request.set_id,
                pack_name,
                url: &request.url,
                content_hash: &request.content_hash,
                version: request.version,
                size_bytes: request.size_bytes,
            };
            println!("{}", to_json_line(&out));
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            table
                .add_row(vec!["payload".to_string(), payload.to_string()])
                .add_row(vec!["set_id".to_string(), labeled_pack(request.set_id)])
                .add_row(vec!["url".to_string(), request.url.clone()])
                .add_row(vec!["hash".to_string(), request.content_hash.clone()])
                .add_row(vec!["version".to_string(), request.version.to_string()])
                .add_row(vec!["size".to_string(), request.size_bytes.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("payload : {payload}");
            println!("set_id  : {}", labeled_pack(request.set_id));
            println!("url     : {}", request.url);
            println!("hash    : {}", request.content_hash);
            println!("version : {}", request.version);
            println!("size    : {}", request.size_bytes);
        }
        OutputFormat::Raw => println!("{payload}"),
    }
}

#[derive(Serialize)]
struct ReplyOutput {
    state: String,
    state_code: Option<u64>,
    installed_id: Option<u64>,
    installed_version: Option<u64>,
    target_id: Option<u64>,
    unknown: BTreeMap<u32, String>,
}

impl ReplyOutput {
    fn new(reply: &InstallReply, state: InstallState) -> Self {
        ReplyOutput {
            state: state.to_string(),
            state_code: reply.state,
            installed_id: reply.installed_id,
            installed_version: reply.installed_version,
            target_id: reply.target_id,
            unknown: reply
                .unknown
                .iter()
                .map(|(&field, value)| (field, value_preview(value)))
                .collect(),
        }
    }
}

/// Print a decoded reply and its classification.
pub fn print_reply(reply: &InstallReply, state: InstallState, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", to_json_line(&ReplyOutput::new(reply, state)));
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            table.add_row(vec!["state".to_string(), state.to_string()]);
            for (name, value) in reply_rows(reply) {
                table.add_row(vec![name, value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("state             : {state}");
            for (name, value) in reply_rows(reply) {
                println!("{name:<18}: {value}");
            }
        }
        OutputFormat::Raw => {
            println!("state\t{}", option_cell(reply.state));
            for (name, value) in reply_rows(reply) {
                println!("{name}\t{value}");
            }
        }
    }
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    outcome: &'static str,
    payload: &'a str,
    advisory: Option<String>,
    #[serde(flatten)]
    reply: Option<ReplyOutput>,
    volume: Option<&'a serde_json::Value>,
}

/// Print the full outcome of a push.
pub fn print_report(report: &PushReport, format: OutputFormat) {
    let classified = match &report.outcome {
        PushOutcome::Classified { reply, state } => Some((reply, *state)),
        PushOutcome::NoResponse => None,
    };

    match format {
        OutputFormat::Json => {
            let out = ReportOutput {
                outcome: match classified {
                    Some(_) => "classified",
                    None => "no-response",
                },
                payload: &report.payload,
                advisory: report.advisory.map(|advisory| advisory.to_string()),
                reply: classified.map(|(reply, state)| ReplyOutput::new(reply, state)),
                volume: report.volume.as_ref(),
            };
            println!("{}", to_json_line(&out));
        }
        _ => {
            match classified {
                Some((reply, state)) => print_reply(reply, state, format),
                None => println!("no confirmation received"),
            }
            if let Some(volume) = &report.volume {
                println!("volume (dp {}) is now: {volume}", dp::VOLUME);
            }
        }
    }
}

#[derive(Serialize)]
struct PackOutput {
    id: u64,
    name: Option<&'static str>,
    version: u64,
}

/// Print the known official packs and their last-observed versions.
pub fn print_packs(table: &KnownVersions, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let packs: Vec<PackOutput> = table
                .iter()
                .map(|(id, version)| PackOutput {
                    id,
                    name: dp::pack_name(id),
                    version,
                })
                .collect();
            println!("{}", to_json_line(&packs));
        }
        OutputFormat::Table => {
            let mut out = new_table(vec!["ID", "NAME", "VERSION"]);
            for (id, version) in table.iter() {
                out.add_row(vec![
                    id.to_string(),
                    dp::pack_name(id).unwrap_or("-").to_string(),
                    version.to_string(),
                ]);
            }
            println!("{out}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for (id, version) in table.iter() {
                println!("{id}\t{}\t{version}", dp::pack_name(id).unwrap_or("-"));
            }
        }
    }
}

/// Operator guidance for a classified state, if any is worth printing.
pub fn state_guidance(state: InstallState) -> Option<&'static str> {
    match state {
        InstallState::Success => Some(
            "voice pack installed; press start/pause on the vacuum to hear the new voice",
        ),
        InstallState::Rejected => Some(
            "the device rejected the pack id; use one it recognizes (501 = en_us_female, 502 = en_us_male)",
        ),
        InstallState::Pending => Some("the device is still downloading; query again shortly"),
        InstallState::Unknown | InstallState::Other(_) => {
            Some("unrecognized confirmation; the raw fields above are the best diagnostic")
        }
    }
}

/// Guidance when no confirmation came back at all.
pub fn no_response_guidance() -> &'static str {
    "no confirmation received; the device may still be downloading. check the network path if nothing changes"
}

fn reply_rows(reply: &InstallReply) -> Vec<(String, String)> {
    let mut rows = vec![
        ("installed_id".to_string(), option_cell(reply.installed_id)),
        (
            "installed_version".to_string(),
            option_cell(reply.installed_version),
        ),
        ("target_id".to_string(), option_cell(reply.target_id)),
    ];
    for (&field, value) in &reply.unknown {
        rows.push((format!("field_{field}"), value_preview(value)));
    }
    rows
}

fn labeled_pack(set_id: u64) -> String {
    match dp::pack_name(set_id) {
        Some(name) => format!("{set_id} ({name})"),
        None => set_id.to_string(),
    }
}

fn option_cell(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

fn value_preview(value: &FieldValue) -> String {
    match value {
        FieldValue::Varint(value) => value.to_string(),
        FieldValue::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => format!("<binary {} bytes>", bytes.len()),
        },
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn to_json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
