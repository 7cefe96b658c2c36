use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use kami2_solver::builder::{Builder, SquareBoardBuilder, TriangleBoardBuilder};
use kami2_solver::snapshot::StepRecord;
use kami2_solver::{solve, solve_with_ranking, ColorGraph};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Shape {
    /// Rectangular grid, four neighbors per cell
    Square,
    /// KAMI 2 columns of alternating triangles
    Triangle,
}

/// Find the fewest moves which flood a KAMI 2 board into a single colour
#[derive(Debug, Parser)]
#[command(name = "solver", version, about)]
struct Cli {
    /// Text board: one row per line, one character per cell, `.` or space for a hole
    board: PathBuf,

    /// Cell shape of the board
    #[arg(long, value_enum, default_value_t = Shape::Square)]
    shape: Shape,

    /// Log progress every this many explored moves
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    every: u64,

    /// Stop after exploring this many moves, keeping the best solution so far
    #[arg(long)]
    max_steps: Option<usize>,

    /// Order to try colours in, e.g. `rgby`; defaults to order of first appearance
    #[arg(long)]
    colors: Option<String>,

    /// Write progress records as JSON lines to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_board(text: &str, shape: Shape) -> Result<ColorGraph<char>> {
    let mut rows = text.lines().map(str::trim_end).collect::<Vec<_>>();
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }

    let built = match shape {
        Shape::Square => SquareBoardBuilder::paint_rows(&rows)?.build(),
        Shape::Triangle => TriangleBoardBuilder::paint_rows(&rows)?.build(),
    };

    built.map_err(|reasons| {
        let reasons = reasons.iter().map(ToString::to_string).collect::<Vec<_>>();
        anyhow!("invalid board: {}", reasons.join(", "))
    })
}

fn run(cli: &Cli) -> Result<()> {
    let text = fs::read_to_string(&cli.board)
        .with_context(|| format!("failed to read board from {}", cli.board.display()))?;
    let graph = parse_board(&text, cli.shape)?;
    debug!(nodes = graph.node_count(), edges = graph.n_edges(), colors = ?graph.colors(), "parsed board");

    let mut solver = match &cli.colors {
        Some(colors) => solve_with_ranking(graph, colors.chars().collect())?,
        None => solve(graph)?,
    };

    let mut log = cli.log.as_ref()
        .map(|path| File::create(path)
            .map(BufWriter::new)
            .with_context(|| format!("failed to create log file {}", path.display())))
        .transpose()?;

    let mut best = None;
    for step in solver.by_ref() {
        let periodic = step.number as u64 % cli.every == 0;

        if step.is_solution || periodic {
            if let Some(log) = log.as_mut() {
                serde_json::to_writer(&mut *log, &StepRecord::from(&step))?;
                writeln!(log)?;
            }
        }

        if step.is_solution {
            info!(moves = step.moves.len(), step = step.number, "found a solution");
            best = Some(step.moves.clone());
        } else if periodic {
            info!(step = step.number, minimum_ceiling = step.cache.minimum_ceiling(), "searching");
        }

        if cli.max_steps.is_some_and(|max| step.number >= max) {
            warn!(steps = step.number, "step limit reached, the best solution so far may not be minimal");
            break;
        }
    }

    if let Some(mut log) = log {
        log.flush()?;
    }

    info!(steps = solver.steps_taken(), "search finished");
    match best {
        Some(moves) => {
            println!("solved in {} moves", moves.len());
            for (i, chosen) in moves.iter().enumerate() {
                let location = chosen.location();
                println!("{}. ({}, {}) -> {}", i + 1, location.0, location.1, chosen.color());
            }
        }
        None if solver.cache().minimum_ceiling() == 0 => println!("already solved"),
        None => println!("no solution found"),
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    run(&cli)
}
