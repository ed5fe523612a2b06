use std::time::Duration;

use voxpush_device::{push_pack, InstallState, PushOptions, PushOutcome};

use crate::bridge::BridgeTransport;
use crate::cmd::PushArgs;
use crate::exit::{device_error, CliError, CliResult, FAILURE, SUCCESS, TIMEOUT, USAGE};
use crate::output::{no_response_guidance, print_report, state_guidance, OutputFormat};

pub fn run(args: PushArgs, format: OutputFormat) -> CliResult<i32> {
    let request = args.install.to_request();
    let options = PushOptions {
        known_versions: args.install.known_versions()?,
        confirm_status: !args.no_status,
        settle: parse_duration(&args.settle)?,
    };

    let mut transport = BridgeTransport::from_command_line(&args.bridge)
        .ok_or_else(|| CliError::new(USAGE, "--bridge must name a command"))?;

    let report = push_pack(&mut transport, &request, &options)
        .map_err(|err| device_error("push failed", err))?;
    print_report(&report, format);

    Ok(match &report.outcome {
        PushOutcome::NoResponse => {
            eprintln!("{}", no_response_guidance());
            TIMEOUT
        }
        PushOutcome::Classified { state, .. } => {
            if let Some(hint) = state_guidance(*state) {
                eprintln!("{hint}");
            }
            if *state == InstallState::Rejected {
                FAILURE
            } else {
                SUCCESS
            }
        }
    })
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
