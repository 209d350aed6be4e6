use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brdreader::load_board_in_memory;

/// Reads Cadence Allegro `.brd` board-layout files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug-level logging for the load pipeline.
    #[clap(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a single file and print a one-line summary.
    Inspect { path: PathBuf },
    /// Load one or more files, optionally across a thread pool.
    Load {
        paths: Vec<PathBuf>,
        #[clap(short, long)]
        jobs: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Inspect { path } => match load_board_in_memory(&path) {
            Ok(board) => {
                println!(
                    "{}: {} copper layers, {} nets, {} footprints, {} tracks, {} vias, {} zones",
                    path.display(),
                    board.copper_layer_count,
                    board.net_count(),
                    board.footprints.len(),
                    board.tracks.len(),
                    board.vias.len(),
                    board.zones.len(),
                );
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                ExitCode::FAILURE
            }
        },
        Commands::Load { paths, jobs } => {
            let pool = jobs
                .map(|n| rayon::ThreadPoolBuilder::new().num_threads(n).build())
                .transpose();
            let pool = match pool {
                Ok(pool) => pool,
                Err(err) => {
                    eprintln!("failed to build thread pool: {err}");
                    return ExitCode::FAILURE;
                }
            };

            let run = || {
                use rayon::prelude::*;
                paths
                    .par_iter()
                    .map(|path| {
                        let result = load_board_in_memory(path);
                        (path.clone(), result)
                    })
                    .collect::<Vec<_>>()
            };

            let results = match &pool {
                Some(pool) => pool.install(run),
                None => run(),
            };

            let mut failed = false;
            for (path, result) in results {
                match result {
                    Ok(board) => {
                        println!("{}: ok ({} copper layers)", path.display(), board.copper_layer_count);
                    }
                    Err(err) => {
                        failed = true;
                        eprintln!("{}: {err}", path.display());
                    }
                }
            }

            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}
