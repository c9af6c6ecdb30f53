use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crossword_csp::{
    load_font, render_grid, save_image, Crossword, Dictionary, InferredConflict, Puzzle, Solver,
    SolverConfig,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConflictPolicy {
    /// Abandon the candidate and restore the domains
    Rollback,
    /// Drop the forced words but keep the narrowed domains
    KeepNarrowing,
}

impl From<ConflictPolicy> for InferredConflict {
    fn from(policy: ConflictPolicy) -> InferredConflict {
        match policy {
            ConflictPolicy::Rollback => InferredConflict::Rollback,
            ConflictPolicy::KeepNarrowing => InferredConflict::KeepNarrowing,
        }
    }
}

#[derive(Parser)]
#[command(name = "crossword")]
#[command(version, long_about = None)]
#[command(about = "Fill a crossword structure with words from a word list")]
struct Cli {
    /// Structure file: one line per row, `_` for open cells
    structure: PathBuf,

    /// Word list, one word per line
    words: PathBuf,

    /// Also save the filled grid as an image (PNG) to this file
    output: Option<PathBuf>,

    /// Font used for the letters in the saved image
    #[arg(long, default_value = "assets/fonts/OpenSans-Regular.ttf")]
    font: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Skip arc-consistency propagation after each choice
    #[arg(long)]
    no_inference: bool,

    /// What to do when words forced by inference conflict with the assignment
    #[arg(long, value_enum, default_value_t = ConflictPolicy::Rollback)]
    inferred_conflict: ConflictPolicy,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let crossword = Crossword::load(&cli.structure)
        .with_context(|| format!("loading structure from {:?}", cli.structure))?;
    let dictionary = Dictionary::load(&cli.words)
        .with_context(|| format!("loading words from {:?}", cli.words))?;

    tracing::info!(
        "Loaded {}x{} structure with {} slots and {} words",
        crossword.width(),
        crossword.height(),
        crossword.slot_count(),
        dictionary.len()
    );

    let config = SolverConfig {
        inference: !cli.no_inference,
        inferred_conflict: cli.inferred_conflict.into(),
    };
    let outcome = Solver::new(Puzzle::new(&crossword, &dictionary), config).solve();

    match &outcome.assignment {
        None => println!("No solution."),
        Some(assignment) => {
            println!("{}", render_grid(&crossword, &dictionary, assignment));

            if let Some(output) = &cli.output {
                let font = match load_font(&cli.font) {
                    Ok(font) => Some(font),
                    Err(err) => {
                        tracing::warn!(
                            "Can't load font {:?}, saving grid without letters: {}",
                            cli.font,
                            err
                        );
                        None
                    }
                };
                save_image(&crossword, &dictionary, assignment, font.as_ref(), output)
                    .with_context(|| format!("saving grid image to {:?}", output))?;
                tracing::info!("Saved grid image to {:?}", output);
            }
        }
    }

    println!("Words tested: {}", outcome.statistics.words_tested);
    println!("Backtrack counter: {}", outcome.statistics.backtrack_calls);
    tracing::info!("Solved in {:?}", outcome.statistics.duration);

    Ok(())
}
