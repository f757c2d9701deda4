use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use hydrator_core::{EntityRegistry, Schema, Value, hydrate_root, parse_entities, parse_schema};
use serde::Deserialize;

/// A schema declaration file: an optional table of entity shapes plus the
/// root schema to hydrate against.
#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    entities: Option<serde_json::Value>,
    schema: serde_json::Value,
}

#[derive(Debug, Parser)]
#[command(name = "hydrate")]
#[command(about = "Schema-directed hydration of JSON data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a schema declaration file and report whether it is valid.
    Check(CheckArgs),
    /// Hydrate a JSON input file against a schema declaration file.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema declaration file (JSON).
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Schema declaration file (JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Input data file (JSON).
    #[arg(long)]
    input: PathBuf,
    /// Emit compact instead of pretty-printed output.
    #[arg(long)]
    compact: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Run(args) => run_run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_schema(path: &Path) -> Result<Schema, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let file: SchemaFile = serde_json::from_str(&text)?;

    let mut registry = EntityRegistry::new();
    if let Some(entities) = &file.entities {
        parse_entities(entities, &mut registry)?;
    }
    Ok(parse_schema(&file.schema, &registry)?)
}

fn run_check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    load_schema(&args.schema)?;
    println!("{}: schema is valid", args.schema.display());
    Ok(())
}

fn run_run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let schema = load_schema(&args.schema)?;

    let text = fs::read_to_string(&args.input)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    let hydrated = hydrate_root(&Value::from(json), &schema)?;

    let rendered = if args.compact {
        serde_json::to_string(&hydrated)?
    } else {
        serde_json::to_string_pretty(&hydrated)?
    };
    println!("{rendered}");
    Ok(())
}
