use posequeue::transport::DEFAULT_PORT;
use posequeue::{DEFAULT_LABEL_QUEUE, DEFAULT_POSE_QUEUE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("posequeue {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: posequeue");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("POSEQUEUE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("features: schema={}, cli=true", cfg!(feature = "schema"));
    println!("store_protocol: resp2 (LPUSH/RPOP), default port {DEFAULT_PORT}");
    println!("default_queues: pose={DEFAULT_POSE_QUEUE}, label={DEFAULT_LABEL_QUEUE}");

    Ok(SUCCESS)
}
