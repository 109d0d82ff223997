//! SiteTrack Server - 工地进度跟踪后端
//!
//! Usage:
//! - Normal mode: `sitetrack-server`
//! - With custom port: `sitetrack-server --port 4100`

use sitetrack_server::config::EnvConfig;

/// 解析命令行参数
fn parse_args() -> EnvConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = EnvConfig::from_env();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                if let Ok(port) = args[i + 1].parse() {
                    config.port = port;
                }
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("SiteTrack Server - 工地进度跟踪后端");
    println!();
    println!("USAGE:");
    println!("    sitetrack-server [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>    Override the listening port");
    println!("    -h, --help       Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    PORT                 Listening port (default 4000)");
    println!("    PYTHON_BIN           Python interpreter (default python3)");
    println!("    VOLUME_DIFF_SCRIPT   Engine script path (default python/volume_diff.py)");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = parse_args();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    rt.block_on(async {
        sitetrack_server::init_and_run(config).await;
    });
}
