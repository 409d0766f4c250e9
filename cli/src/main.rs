use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use graveyard_schema_core::{Schema, SchemaBundle, validate_bundle, validate_schema};
use graveyard_schema_store::loader::{self, SchemaFile};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "graveyard-schema")]
#[command(about = "Validate, inspect and bundle event payload schemas")]
struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate schema and bundle JSON files.
    Validate(ValidateArgs),
    /// Pretty-print the schemas in a file.
    Show(ShowArgs),
    /// Bundle schema JSON files into a SchemaBundle file.
    Bundle(BundleArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema files and/or directories containing schema JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Schema or bundle JSON file.
    input: PathBuf,
    /// Only show the schema with this name.
    #[arg(long)]
    schema: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct BundleArgs {
    /// Schema files and/or directories containing schema JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output JSON bundle path.
    #[arg(long)]
    output: PathBuf,
    /// Optional bundle name metadata.
    #[arg(long)]
    name: Option<String>,
    /// Optional bundle description metadata.
    #[arg(long)]
    description: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Show(args) => run_show(args),
        Command::Bundle(args) => run_bundle(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
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

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let paths = loader::collect_json_files(&args.inputs).map_err(|e| e.to_string())?;
    let mut problems = 0usize;
    let mut checked = 0usize;

    for path in &paths {
        debug!(path = %path.display(), "validating");
        let file = match loader::load_file(path) {
            Ok(file) => file,
            Err(err) => {
                println!("{}: {err}", path.display());
                problems += 1;
                continue;
            }
        };

        let messages = match &file {
            SchemaFile::Schema(schema) => schema_problems(schema),
            SchemaFile::Bundle(bundle) => bundle_problems(bundle),
        };
        for message in &messages {
            println!("{}: {message}", path.display());
        }
        problems += messages.len();
        checked += file.into_schemas().len();
    }

    if problems > 0 {
        return Err(format!(
            "{problems} problem(s) found in {} file(s)",
            paths.len()
        ));
    }

    println!(
        "Validated {checked} schema(s) in {} file(s).",
        paths.len()
    );
    Ok(())
}

fn schema_problems(schema: &Schema) -> Vec<String> {
    validate_schema(schema)
        .iter()
        .map(|err| format!("{}: {err}", display_name(&schema.name)))
        .collect()
}

fn bundle_problems(bundle: &SchemaBundle) -> Vec<String> {
    validate_bundle(bundle)
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() { "<unnamed>" } else { name }
}

fn run_show(args: ShowArgs) -> Result<(), String> {
    let file = loader::load_file(&args.input)
        .map_err(|err| format!("Failed to load '{}': {err}", args.input.display()))?;

    let mut schemas = file.into_schemas();
    if let Some(name) = &args.schema {
        schemas.retain(|schema| &schema.name == name);
        if schemas.is_empty() {
            return Err(format!(
                "No schema named '{name}' in '{}'",
                args.input.display()
            ));
        }
    }

    for schema in &schemas {
        println!("{}", format_schema(schema, args.format)?);
    }
    Ok(())
}

fn format_schema(schema: &Schema, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(schema)
            .map_err(|err| format!("Failed to serialize schema '{}': {err}", schema.name)),
        OutputFormat::Yaml => serde_yaml::to_string(schema)
            .map_err(|err| format!("Failed to serialize schema '{}': {err}", schema.name)),
    }
}

fn run_bundle(args: BundleArgs) -> Result<(), String> {
    let paths = loader::collect_json_files(&args.inputs).map_err(|e| e.to_string())?;
    let bundle = bundle_schema_files(&paths, args.name, args.description)?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    let raw = serde_json::to_string_pretty(&bundle)
        .map_err(|err| format!("Failed to serialize schema bundle: {err}"))?;
    fs::write(&args.output, raw)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Bundled {} schema(s) into '{}'.",
        bundle.schema_count(),
        args.output.display()
    );
    Ok(())
}

fn bundle_schema_files(
    paths: &[PathBuf],
    name: Option<String>,
    description: Option<String>,
) -> Result<SchemaBundle, String> {
    let mut bundle = SchemaBundle::new(PACKAGE_VERSION, chrono::Utc::now().to_rfc3339());
    bundle.name = name;
    bundle.description = description;

    for path in paths {
        let schemas = load_valid_schemas(path)?;
        bundle.schemas.extend(schemas);
    }

    let errors = validate_bundle(&bundle);
    if let Some(first) = errors.first() {
        return Err(format!("Schema bundle validation failed: {first}"));
    }
    Ok(bundle)
}

fn load_valid_schemas(path: &Path) -> Result<Vec<Schema>, String> {
    let schemas = loader::load_file(path)
        .map_err(|err| format!("Invalid schema JSON '{}': {err}", path.display()))?
        .into_schemas();

    for schema in &schemas {
        if let Some(first) = validate_schema(schema).first() {
            return Err(format!(
                "Schema validation failed for '{}': {first}",
                path.display()
            ));
        }
    }
    Ok(schemas)
}
