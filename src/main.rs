use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use graph_relax::GraphDocument;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document (JSON). Reads stdin when omitted or `-`.
    input: Option<PathBuf>,
    /// Upper bound on ticks, in case alphaTarget keeps the layout warm.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: usize,
    /// Emit every Nth snapshot as a JSON line instead of only the final layout.
    #[arg(long)]
    every: Option<u64>,
    /// Write to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let raw = read_input(args.input.as_ref())?;
    let mut simulation = GraphDocument::parse(&raw)?.into_simulation()?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    simulation.start();
    match args.every.filter(|every| *every > 0) {
        Some(every) => {
            for snapshot in simulation.ticks().take(args.max_ticks) {
                if snapshot.tick % every == 0 {
                    serde_json::to_writer(&mut out, &snapshot)?;
                    writeln!(out)?;
                }
            }
        }
        None => {
            simulation.run(args.max_ticks);
        }
    }

    if simulation.is_running() {
        tracing::warn!(
            ticks = simulation.tick_count(),
            alpha = simulation.alpha(),
            "tick limit reached before the layout cooled"
        );
        simulation.stop();
    }

    if args.every.is_none_or(|every| every == 0) {
        serde_json::to_writer_pretty(&mut out, &simulation.snapshot())?;
        writeln!(out)?;
    }
    out.flush().context("failed to flush output")?;
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path.filter(|path| path.as_os_str() != "-") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read graph document from stdin")?;
            Ok(raw)
        }
    }
}
