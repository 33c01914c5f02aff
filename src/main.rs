//! flagscan - resolve a command line against a JSON parameter declaration.

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use flagscan::{Config, ParseOutcome, Parser, TypedValue, Value};
use serde_json::{json, Map};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Resolve command lines against a JSON parameter declaration.
#[derive(ClapParser, Debug)]
#[command(name = "flagscan", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse arguments and print the resolved values as JSON
    Parse {
        /// JSON parameter declaration
        #[arg(long)]
        config: String,

        /// Reject path parameters that do not exist
        #[arg(long)]
        check_paths: bool,

        /// Arguments to resolve
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print help text for the declared parameters
    Help {
        /// JSON parameter declaration
        #[arg(long)]
        config: String,

        /// Only show this parameter
        #[arg(long)]
        flag: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FLAGSCAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(json: &str) -> Result<Config> {
    let cfg = Config::from_json(json).context("failed to parse config JSON")?;
    cfg.validate().context("invalid config")?;
    Ok(cfg)
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => json!(s),
        Value::Integer(i) => json!(i),
        Value::Double(d) => json!(d),
        Value::Boolean(b) => json!(b),
        Value::Character(c) => json!(c.to_string()),
        Value::Path(p) => json!(p.display().to_string()),
    }
}

/// Collect every parameter's value into a JSON object keyed by full flag.
fn resolved_values(parser: &Parser) -> Result<serde_json::Value> {
    let mut out = Map::new();
    for handle in parser.registry().handles() {
        let flag = parser.registry().get(handle).full_flag().to_string();
        let value = match parser.value(handle)? {
            Some(TypedValue::Scalar(v)) => to_json(v),
            Some(TypedValue::Array(vs)) => vs.iter().map(to_json).collect(),
            None => serde_json::Value::Null,
        };
        out.insert(flag, value);
    }
    Ok(serde_json::Value::Object(out))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            config,
            check_paths,
            args,
        } => {
            let cfg = load_config(&config)?;
            let mut parser = cfg
                .build_parser(args)
                .context("failed to register parameters")?;
            if check_paths {
                parser = parser.with_path_check(Path::exists);
            }

            match parser.parse().context("failed to parse arguments")? {
                ParseOutcome::Help(text) => print!("{}", text),
                ParseOutcome::Parsed => {
                    let values = resolved_values(&parser)?;
                    println!("{}", serde_json::to_string_pretty(&values)?);
                }
            }
        }
        Commands::Help { config, flag } => {
            let cfg = load_config(&config)?;
            let parser = cfg
                .build_parser(Vec::<String>::new())
                .context("failed to register parameters")?;
            match flag {
                Some(flag) => print!("{}", parser.param_help_text(flag.as_str())?),
                None => print!("{}", parser.help_text()),
            }
        }
    }

    Ok(())
}
