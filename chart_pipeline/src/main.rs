use std::io::Write;

use anyhow::Result;
use chart_pipeline::{
    cli::{
        commands::{Cli, Commands},
        params,
    },
    config::load_config,
    pipeline::render_comparison,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compare(args) => {
            let request = params::comparison_request(&args, &cfg)?;
            let source = params::data_source(&args.source)?;
            let charts = render_comparison(&*source, &request).await?;

            // Rejections go to stderr so stdout stays machine-readable.
            for panel in [&charts.primary, &charts.secondary] {
                for (label, err) in panel.rejections() {
                    eprintln!("WARNING: {} - {label}: {err}", panel.spec.symbol());
                }
                if let Some(placeholder) = panel.spec.placeholder() {
                    eprintln!("NOTICE: {}", placeholder.message);
                }
            }

            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &charts)?;
            writeln!(stdout)?;
        }
        Commands::Tickers => {
            for ticker in &cfg.tickers {
                println!("{ticker}");
            }
        }
        Commands::Indicators => {
            for option in &cfg.indicator_options {
                println!("{option}");
            }
        }
    }
    Ok(())
}
