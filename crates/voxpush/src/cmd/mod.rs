use clap::{Args, Subcommand};
use voxpush_device::KnownVersions;
use voxpush_wire::InstallRequest;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod packs;
pub mod push;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build an install command payload without sending it.
    Encode(EncodeArgs),
    /// Decode and classify a device reply payload.
    Decode(DecodeArgs),
    /// Build and send an install command through a transport bridge.
    Push(PushArgs),
    /// List the known official voice packs.
    Packs(PacksArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Push(args) => push::run(args, format),
        Command::Packs(args) => packs::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// The packaged bundle's metadata, shared by `encode` and `push`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Pack id to install (501 = female, 502 = male).
    #[arg(long)]
    pub set_id: u64,

    /// HTTP URL the device downloads the pack ZIP from.
    #[arg(long)]
    pub url: String,

    /// Hex digest of the pack ZIP, as the packager printed it.
    #[arg(long, visible_alias = "md5", value_name = "HEX")]
    pub hash: String,

    /// Pack version; must exceed the installed one or the device ignores it.
    #[arg(long)]
    pub pack_version: u64,

    /// Pack ZIP size in bytes.
    #[arg(long)]
    pub size: u64,

    /// Override a known installed version, as ID=VERSION (repeatable).
    #[arg(long, value_name = "ID=VERSION")]
    pub known: Vec<String>,

    /// Skip the known-version advisory check.
    #[arg(long)]
    pub no_advisory: bool,
}

impl InstallArgs {
    pub fn to_request(&self) -> InstallRequest {
        InstallRequest {
            set_id: self.set_id,
            url: self.url.clone(),
            content_hash: self.hash.clone(),
            version: self.pack_version,
            size_bytes: self.size,
        }
    }

    /// The advisory table for this invocation: defaults plus `--known`
    /// overrides, or an empty table with `--no-advisory`.
    pub fn known_versions(&self) -> CliResult<KnownVersions> {
        if self.no_advisory {
            return Ok(KnownVersions::empty());
        }
        let mut table = KnownVersions::default();
        for entry in &self.known {
            let (id, version) = entry.split_once('=').ok_or_else(|| {
                CliError::new(USAGE, format!("--known expects ID=VERSION, got '{entry}'"))
            })?;
            let id = id.trim().parse().map_err(|_| {
                CliError::new(USAGE, format!("--known pack id is not a number: '{entry}'"))
            })?;
            let version = version.trim().parse().map_err(|_| {
                CliError::new(USAGE, format!("--known version is not a number: '{entry}'"))
            })?;
            table.set(id, version);
        }
        Ok(table)
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub install: InstallArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Base64 reply payload, as read back from the device datapoint.
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub install: InstallArgs,

    /// Transport bridge command line (whitespace-separated); invoked as
    /// `<BRIDGE...> set <DP> <VALUE>` and `<BRIDGE...> status`, printing a
    /// JSON datapoint map on stdout.
    #[arg(long, value_name = "COMMAND")]
    pub bridge: String,

    /// Skip the post-install status readback.
    #[arg(long)]
    pub no_status: bool,

    /// Settle time before the status readback (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub settle: String,
}

#[derive(Args, Debug, Default)]
pub struct PacksArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install_args(known: Vec<String>, no_advisory: bool) -> InstallArgs {
        InstallArgs {
            set_id: 502,
            url: "http://10.0.0.5/pack.zip".to_string(),
            hash: "c808f5460f6663f467af482bc94dc34".to_string(),
            pack_version: 16,
            size: 748_473,
            known,
            no_advisory,
        }
    }

    #[test]
    fn known_overrides_are_applied() {
        let args = install_args(vec!["502=20".to_string(), "700=3".to_string()], false);
        let table = args.known_versions().unwrap();
        assert_eq!(table.get(502), Some(20));
        assert_eq!(table.get(700), Some(3));
        // Untouched defaults survive.
        assert_eq!(table.get(501), Some(13));
    }

    #[test]
    fn no_advisory_empties_the_table() {
        let args = install_args(vec!["502=20".to_string()], true);
        let table = args.known_versions().unwrap();
        assert_eq!(table.get(502), None);
    }

    #[test]
    fn malformed_known_entry_is_usage_error() {
        let args = install_args(vec!["502:20".to_string()], false);
        let err = args.known_versions().expect_err("missing '=' should fail");
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn request_carries_all_bundle_fields() {
        let request = install_args(Vec::new(), false).to_request();
        assert_eq!(request.set_id, 502);
        assert_eq!(request.version, 16);
        assert_eq!(request.size_bytes, 748_473);
    }
}
