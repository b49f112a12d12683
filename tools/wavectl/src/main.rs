use anyhow::{Context, bail};
use clap::Parser;
use dialoguer::console::style;
use tracing::{Level, info};
use tracing_subscriber::util::SubscriberInitExt;
use wavegen_core::{Command, EngineConfig};

use wavectl::cli::{Cli, Commands};
use wavectl::{port, simulate};

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .finish()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    info!("stdout logger started");

    match cli.command {
        Commands::Ports => {
            let ports = port::candidate_ports()?;
            if ports.is_empty() {
                println!("{}", style("no USB serial ports found").dim());
            }
            for p in &ports {
                println!("{}", port::describe(p));
            }
        }
        Commands::Send { command, link, raw } => {
            if !raw {
                let max = EngineConfig::default().max_frequency_hz;
                Command::parse(command.as_bytes())
                    .and_then(|c| c.validate(max))
                    .with_context(|| format!("refusing to send {command:?} (use --raw to force)"))?;
            }
            let mut port = port::open(&link)?;
            port::send(&mut *port, command.as_bytes())?;
        }
        Commands::Set { wave, freq, link } => {
            let cmd = wave.command(freq);
            let max = EngineConfig::default().max_frequency_hz;
            if let Err(e) = cmd.validate(max) {
                bail!("{e}; the board accepts 1..={max} Hz");
            }
            let mut port = port::open(&link)?;
            port::send(&mut *port, cmd.encode().as_bytes())?;
        }
        Commands::Simulate(args) => {
            let report = simulate::run(&args)?;

            println!(
                "{} {} @ {}Hz",
                style("playing").green(),
                style(report.settings.waveform.name()).bold(),
                report.settings.frequency_hz
            );
            println!(
                "{} samples in {}ms (divisor {}, {:.1} samples/s, {} accepted, {} dropped)",
                report.ticks, report.elapsed_ms, report.divisor, report.tick_rate_hz, report.accepted, report.rejected
            );
            if !report.preview.is_empty() {
                println!("{}", style(format!("{:?}", report.preview)).dim());
            }
        }
    }

    Ok(())
}
