use tracing::warn;

use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_payload, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let request = args.install.to_request();

    let table = args.install.known_versions()?;
    if let Some(advisory) = table.check(request.set_id, request.version) {
        warn!("{advisory}");
    }

    let payload = request.encode();
    print_payload(&request, &payload, format);
    Ok(SUCCESS)
}
