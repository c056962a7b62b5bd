//! Inspection CLI for schema descriptions and state snapshots.
//!
//! # Responsibility
//! - Show how a schema description resolves.
//! - Print hydrated entities selected from a JSON state file.

use clap::{Parser, Subcommand};
use log::error;
use normorm_core::{
    core_version, default_log_level, generate, init_stderr_logging, load_schema, Association,
    EntityHolder, Extensions, GeneratorOptions, Orm, DEFAULT_STORE_ROOT_KEY,
};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Upper bound for `--depth`; cyclic schemas expand exponentially per level.
const MAX_DEPTH: i64 = 8;

#[derive(Parser)]
#[command(name = "normorm", version, about = "Inspect normalized entity schemas and state")]
struct Cli {
    /// Log level written to stderr (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entities, tables and resolved associations
    Inspect {
        /// Schema description JSON file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Select entities from a state snapshot
    Select {
        /// Schema description JSON file
        #[arg(long)]
        schema: PathBuf,

        /// State snapshot JSON file
        #[arg(long)]
        state: PathBuf,

        /// Entity name to select
        #[arg(long)]
        entity: String,

        /// Ids to select; every row when omitted
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Association levels to expand (0..=8)
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=MAX_DEPTH))]
        depth: u8,

        /// Key of the table map inside the state
        #[arg(long, default_value = DEFAULT_STORE_ROOT_KEY)]
        root_key: String,
    },

    /// Print the core library version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_stderr_logging(&level) {
        eprintln!("normorm: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_failed module=cli status=error message={err}");
            eprintln!("normorm: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), String> {
    match command {
        Commands::Inspect { schema } => {
            print!("{}", inspect(&schema)?);
            Ok(())
        }
        Commands::Select {
            schema,
            state,
            entity,
            ids,
            depth,
            root_key,
        } => {
            let rows = select(&schema, &state, &entity, &ids, usize::from(depth), root_key)?;
            let rendered = serde_json::to_string_pretty(&rows).map_err(|err| err.to_string())?;
            println!("{rendered}");
            Ok(())
        }
        Commands::Version => {
            println!("normorm_core version={}", core_version());
            Ok(())
        }
    }
}

/// Renders entities, tables and resolved associations, one line each.
fn inspect(schema_path: &Path) -> Result<String, String> {
    let schema = load_schema(schema_path).map_err(|err| err.to_string())?;
    let orm = Orm::from_schema(&schema);

    let mut out = String::new();
    for class in orm.classes().values() {
        let _ = writeln!(
            out,
            "{} table={} id={}",
            class.name(),
            class.table(),
            class.id_attribute()
        );
        for (attribute, association) in class.associations().iter() {
            let _ = writeln!(out, "  {attribute} -> {}", describe(association));
        }
    }
    for validator in orm.validators().values().filter(|v| v.is_polymorphic()) {
        let _ = writeln!(out, "{} (polymorphic)", validator.name());
    }
    Ok(out)
}

fn describe(association: &Association) -> String {
    match association {
        Association::Single { target } => format!("{target} (single)"),
        Association::Collection { target, table } => format!("[{target}] (collection of {table})"),
        Association::Union(union) => {
            let members = union
                .members
                .iter()
                .map(|(tag, entity)| format!("{tag}={entity}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("union on `{}`: {members}", union.schema_attribute)
        }
        Association::Opaque { kind } => format!("opaque ({})", kind.as_str()),
    }
}

fn select(
    schema_path: &Path,
    state_path: &Path,
    entity: &str,
    ids: &[String],
    depth: usize,
    root_key: String,
) -> Result<Vec<Value>, String> {
    let schema = load_schema(schema_path).map_err(|err| err.to_string())?;
    let options = GeneratorOptions::with_store_root_key(root_key);
    let orm = generate(&schema, Extensions::new(), options).map_err(|err| err.to_string())?;

    let text = std::fs::read_to_string(state_path)
        .map_err(|err| format!("failed to read state `{}`: {err}", state_path.display()))?;
    let state: Value = serde_json::from_str(&text)
        .map_err(|err| format!("invalid state `{}`: {err}", state_path.display()))?;

    let selector = orm
        .selector(entity)
        .ok_or_else(|| format!("unknown entity `{entity}`"))?;
    let holders: Vec<EntityHolder<'_>> = if ids.is_empty() {
        selector.select_all(&state)
    } else {
        let ids: Vec<Value> = ids.iter().cloned().map(Value::String).collect();
        selector.select_many(&state, Some(ids.as_slice()), false)
    };

    Ok(holders
        .iter()
        .map(|holder| holder.denormalize(depth))
        .collect())
}
