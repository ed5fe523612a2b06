use voxpush_device::InstallState;
use voxpush_wire::InstallReply;

use crate::cmd::DecodeArgs;
use crate::exit::{wire_error, CliResult, SUCCESS};
use crate::output::{print_reply, state_guidance, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let reply = InstallReply::parse(args.payload.trim())
        .map_err(|err| wire_error("reply did not decode", err))?;
    let state = InstallState::from_code(reply.state);

    print_reply(&reply, state, format);
    if let Some(hint) = state_guidance(state) {
        eprintln!("{hint}");
    }
    Ok(SUCCESS)
}
