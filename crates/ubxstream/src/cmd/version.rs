use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("ubxstream {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: ubxstream");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", env!("UBXSTREAM_BUILD_TARGET"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: async={}, cli=true",
        cfg!(feature = "async")
    );
    println!(
        "default_max_payload: {}",
        ubxstream_frame::DEFAULT_MAX_PAYLOAD
    );
    println!(
        "known_lengths: {}",
        ubxstream_frame::KnownLengths::entries().len()
    );

    Ok(SUCCESS)
}
