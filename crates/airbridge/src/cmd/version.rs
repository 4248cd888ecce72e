use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("airbridge {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        println!("repository: {}", env!("CARGO_PKG_REPOSITORY"));
        println!("license: {}", env!("CARGO_PKG_LICENSE"));
    }
    Ok(SUCCESS)
}
