//! CLI frontend for the Fernweh adventure engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::SessionArgs;

#[derive(Parser)]
#[command(
    name = "fw",
    about = "Fernweh: a text adventure engine with undo and scripted replay",
    version,
    propagate_version = true
)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a world file
    Check {
        /// Path to the world JSON file
        world: PathBuf,
    },

    /// Play a world interactively
    Play {
        /// Path to the world JSON file
        world: PathBuf,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Replay a command script and check the visited locations
    Simulate {
        /// Path to the world JSON file
        world: PathBuf,

        /// Path to the script (one command per line)
        script: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Print every command and reply
        #[arg(long)]
        transcript: bool,

        #[command(flatten)]
        session: SessionArgs,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { world } => commands::check::run(&world),
        Commands::Play { world, session } => commands::play::run(&world, &session),
        Commands::Simulate {
            world,
            script,
            json,
            transcript,
            session,
        } => commands::simulate::run(&world, &script, &session, json, transcript),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
