//! CLI entry point for `woof`.

use std::path::{Path, PathBuf};

use clap::Parser;

use woof::config::{self, Config};
use woof::digest;

/// Render email messages into an HTML digest fragment.
///
/// Each input message becomes one entry with its sender, date and body.
/// Messages with an archive link header are shortened to a teaser with a
/// "Read more" link. The output file is replaced atomically.
#[derive(Parser)]
#[command(name = "woof", version)]
struct Cli {
    /// Digest file to write
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Message files to include, in order
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Configuration file (default: $WOOF_CONFIG or the user config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let report = digest::write_digest(&cli.output, &cli.inputs, &config.render)?;
    // Skipped inputs are always reported, whatever the log filter says.
    for skipped in &report.skipped {
        eprintln!("woof: {}: {}", skipped.path.display(), skipped.error);
    }
    tracing::info!(
        rendered = report.rendered,
        skipped = report.skipped.len(),
        "Done"
    );

    Ok(())
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = config.general.log_file.as_ref().and_then(|path| {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path.file_name()?;
        std::fs::create_dir_all(dir).ok()?;
        let appender = tracing_appender::rolling::never(dir, name);
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(appender),
        )
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
