use voxpush_device::KnownVersions;

use crate::cmd::PacksArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_packs, OutputFormat};

pub fn run(_args: PacksArgs, format: OutputFormat) -> CliResult<i32> {
    print_packs(&KnownVersions::default(), format);
    Ok(SUCCESS)
}
