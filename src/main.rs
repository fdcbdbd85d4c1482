use clap::Parser;
use log_follower::{FollowConfig, Follower};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "log-follower",
    about = "Follow a growing file and print each new line",
    version
)]
struct Cli {
    /// File to follow.
    path: PathBuf,

    /// Byte offset to resume from; 0 starts at the end of the file.
    #[arg(short, long, default_value_t = 0)]
    offset: u64,

    /// Milliseconds to sleep between polls.
    #[arg(short, long, default_value_t = 10)]
    interval_ms: u64,

    /// Wake up early on filesystem notifications.
    #[arg(short, long)]
    watch: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Followed lines own stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = FollowConfig::default()
        .with_interval(Duration::from_millis(cli.interval_ms))
        .with_watch(cli.watch);

    let mut follower = match Follower::open(&cli.path, cli.offset, config).await {
        Ok(follower) => follower,
        Err(e) => {
            eprintln!("Error setting up follower: {}", e);
            process::exit(1);
        }
    };

    let handle = follower.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.stop();
        }
    });

    if let Err(e) = follower.follow().await {
        eprintln!("Error following {}: {}", cli.path.display(), e);
        process::exit(1);
    }
}
