//! Kodama CLI - run an image filter script.

use std::fs::File;
use std::io::{self, BufReader, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use kodama::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "kodama", version, about = "Apply scripted filters to images")]
struct Cli {
    /// Script to run; read from stdin when omitted.
    #[arg(long)]
    infile: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let catalog = FilterCatalog::with_builtins();
    let script = match &cli.infile {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("can't open script {}", path.display()))?;
            Script::parse(BufReader::new(file), &catalog)?
        }
        None => Script::parse(io::stdin().lock(), &catalog)?,
    };

    let options = ExecutionOptions::new()
        .with_dispatch(DispatchConfig::from_env())
        .with_progress(print_progress);
    let report = ScriptRunner::with_codec(catalog.codec()).run(&script, Some(options))?;

    log::debug!(
        "{} step(s), {} instruction(s) in {:?}",
        report.stats.steps_executed,
        report.stats.instructions_executed,
        report.stats.total_duration
    );
    Ok(())
}

fn print_progress(update: ProgressUpdate) {
    let mut out = io::stdout().lock();
    // Progress output is best effort; a closed stdout must not abort the run.
    let _ = match update {
        ProgressUpdate::StepStarted { index, total, input } => {
            writeln!(out, "step {}/{} (<- {})", index, total, input.display())
        }
        ProgressUpdate::InstructionStarted { index, total, name, .. } => {
            write!(out, "\tinstruction {}/{} ({})... ", index, total, name)
                .and_then(|()| out.flush())
        }
        ProgressUpdate::InstructionCompleted { .. } => writeln!(out, "done"),
        ProgressUpdate::StepCompleted { output, .. } => {
            writeln!(out, "done (-> {})", output.display())
        }
        _ => Ok(()),
    };
}
