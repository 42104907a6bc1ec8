//! Zappac CLI: a programmer's calculator with a stateful session.

use clap::{Parser as ClapParser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use zappac_cli::colors::Palette;
use zappac_cli::config::{ConfigError, ZappacConfig, CONFIG_FILE};
use zappac_cli::persist::open_session;
use zappac_cli::repl::{self, ReplOptions};

#[derive(ClapParser)]
#[command(name = "zappac", version, about = "A programmer's calculator")]
struct Cli {
    /// Use this config file instead of searching for zappac.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive REPL (the default)
    Repl,
    /// Evaluate expressions in order within one session
    Eval {
        /// Expressions to evaluate
        #[arg(required = true)]
        exprs: Vec<String>,
    },
    /// Print the nodes an expression parses to as JSON
    Parse {
        /// Expression to parse
        expr: String,
    },
    /// Create a zappac.toml config file in the current directory
    Init,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ZAPPAC_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let (config, config_path) = load_config(cli.config);
    let palette = Palette::from_env(config.repl.color && !cli.no_color);

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => cmd_repl(&config, config_path, palette),
        Commands::Eval { exprs } => cmd_eval(&config, config_path, &exprs, palette),
        Commands::Parse { expr } => cmd_parse(&config, &expr, palette),
        Commands::Init => cmd_init(palette),
    }
}

fn fail(err: ConfigError) -> ! {
    eprintln!("{} {}", Palette::from_env(true).red("error:"), err);
    std::process::exit(1);
}

/// The active config and the file `save(name)` writes back to.
fn load_config(explicit: Option<PathBuf>) -> (ZappacConfig, Option<PathBuf>) {
    if let Some(path) = explicit {
        if !path.exists() {
            return (ZappacConfig::default(), Some(path));
        }
        return match ZappacConfig::load_from(&path) {
            Ok(cfg) => (cfg, Some(path)),
            Err(err) => fail(err),
        };
    }

    match ZappacConfig::load_with_path() {
        Ok(Some((path, cfg))) => (cfg, Some(path)),
        Ok(None) => (ZappacConfig::default(), ZappacConfig::global_path()),
        Err(err) => fail(err),
    }
}

fn cmd_repl(config: &ZappacConfig, config_path: Option<PathBuf>, palette: Palette) {
    let session = open_session(config, config_path);
    let options = ReplOptions::from_config(&config.repl, palette);
    if let Err(err) = repl::run_repl(session, options) {
        eprintln!("{} {}", palette.red("error:"), err);
        std::process::exit(1);
    }
}

fn cmd_eval(
    config: &ZappacConfig,
    config_path: Option<PathBuf>,
    exprs: &[String],
    palette: Palette,
) {
    let mut session = open_session(config, config_path);
    for expr in exprs {
        let outcome = session.exec(expr, true);
        if !outcome.ok {
            let err = outcome.state.last_error.as_deref().unwrap_or("evaluation failed");
            eprintln!("{} {}: {}", palette.red("error:"), palette.bold(expr), err);
            std::process::exit(1);
        }
        println!("{}", outcome.state.last_result);
    }
}

fn cmd_parse(config: &ZappacConfig, expr: &str, palette: Palette) {
    let session = open_session(config, None);
    let outcome = session.parse(expr);
    if let Some(err) = &outcome.error {
        eprintln!("{} {}", palette.red("syntax error:"), err);
        std::process::exit(1);
    }
    match serde_json::to_string_pretty(&outcome.nodes) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("{} {}", palette.red("error:"), err);
            std::process::exit(1);
        }
    }
}

fn cmd_init(palette: Palette) {
    let path = PathBuf::from(CONFIG_FILE);
    if path.exists() {
        eprintln!(
            "{} {} already exists, not overwriting",
            palette.red("error:"),
            CONFIG_FILE
        );
        std::process::exit(1);
    }
    if let Err(err) = std::fs::write(&path, ZappacConfig::default_template()) {
        eprintln!("{} writing {}: {}", palette.red("error:"), CONFIG_FILE, err);
        std::process::exit(1);
    }
    println!("{} {}", palette.status_label("Created"), CONFIG_FILE);
}
