//! Report installed Hellas suite mods from a game instance.
//!
//! Usage:
//!   hellas hellasaudio version
//!   hellas --game-dir ~/.minecraft hellasdeck dependencies
//!   hellas --json helper rollcall
//!   hellas --list
//!
//! Replies go to stdout; a "not present" reply goes to stderr and exits 1.
//! Usage and configuration errors exit 2.

use anyhow::{Context, Result};
use clap::Parser;
use hellashelper::{CommandTable, InstalledMods, Outcome, Overrides, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hellas")]
#[command(about = "Report versions, dependencies, and features of installed Hellas mods")]
struct Cli {
    /// Game instance directory (defaults to HELLAS_GAME_DIR or the nearest ancestor with mods/).
    #[arg(long)]
    game_dir: Option<PathBuf>,
    /// Mods directory (defaults to HELLAS_MODS_DIR or <game-dir>/mods).
    #[arg(long)]
    mods_dir: Option<PathBuf>,
    /// Catalog override file (defaults to HELLAS_CATALOG or the built-in suite).
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Print the reply as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// List known modules and their command aliases.
    #[arg(long, conflicts_with_all = ["module", "verb"])]
    list: bool,
    /// Log resolution details to stderr.
    #[arg(long, short)]
    verbose: bool,
    /// Module alias, e.g. `hellasaudio` or `helper`.
    #[arg(required_unless_present = "list")]
    module: Option<String>,
    /// One of version, dependencies, features, rollcall.
    #[arg(required_unless_present = "list")]
    verb: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("{err:#}");
            2
        }
    };
    std::process::exit(code);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<Outcome> {
    let settings = Settings::resolve(Overrides {
        game_dir: cli.game_dir,
        mods_dir: cli.mods_dir,
        catalog: cli.catalog,
    })?;
    let catalog = settings.load_catalog()?;
    let table = CommandTable::build(&catalog, &settings.command_root);

    if cli.list {
        for line in table.describe() {
            println!("{line}");
        }
        return Ok(Outcome::Success);
    }

    // clap enforces both positionals unless --list is set.
    let (Some(module), Some(verb)) = (cli.module, cli.verb) else {
        anyhow::bail!("Usage:\n  {}", table.usage().join("\n  "));
    };

    let mods = InstalledMods::scan(&settings.mods_dir)
        .with_context(|| format!("scanning {}", settings.mods_dir.display()))?;
    let reply = table
        .dispatch(&module, &verb, &mods, &mods)
        .with_context(|| format!("Usage:\n  {}", table.usage().join("\n  ")))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reply.payload)?);
    } else {
        for line in &reply.lines {
            match reply.outcome {
                Outcome::Success => println!("{line}"),
                Outcome::Failure => eprintln!("{line}"),
            }
        }
    }
    Ok(reply.outcome)
}
