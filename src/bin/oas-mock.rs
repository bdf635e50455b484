//! OpenAPI Mock CLI
//!
//! Command-line interface for validating payloads and generating mock data
//! from OpenAPI schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use oas_mock::{
    classify, load_value, navigate_fragment, validate, Generator, OpenApiDocument, Resolver,
    Schema, SeedConfig,
};

#[derive(Parser)]
#[command(name = "oas-mock")]
#[command(about = "Validate payloads and generate mock data from OpenAPI schemas")]
#[command(version)]
struct Cli {
    /// Log debug events to stderr (overridden by OAS_MOCK_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Which schema inside a file to use.
#[derive(Args)]
struct SchemaSelector {
    /// Schema or OpenAPI document (JSON or YAML)
    schema: PathBuf,

    /// Use components.schemas.<NAME> from an OpenAPI document
    #[arg(long, conflicts_with = "pointer")]
    component: Option<String>,

    /// JSON pointer to the schema inside the file (e.g., #/definitions/Pet)
    #[arg(long)]
    pointer: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload against a schema
    Validate {
        #[command(flatten)]
        selector: SchemaSelector,

        /// Payload file to validate
        payload: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Generate mock values from a schema
    Generate {
        #[command(flatten)]
        selector: SchemaSelector,

        /// Number of values to generate
        #[arg(long, short = 'n', default_value_t = 1)]
        count: usize,

        /// Field name used to pick realistic values for a root string
        #[arg(long, default_value = "")]
        hint: String,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Generate related instances for every resource in an OpenAPI document
    Seed {
        /// OpenAPI document (JSON or YAML)
        openapi: PathBuf,

        /// Instances per resource (0 uses the default of 5)
        #[arg(long, default_value_t = 0)]
        items: usize,

        /// Only seed these resources (comma-separated)
        #[arg(long, value_delimiter = ',')]
        include: Vec<String>,

        /// Never seed these resources (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Print the seeding plan instead of generating data
        #[arg(long)]
        dry_run: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Generate strings matching a regular expression
    Pattern {
        /// Regular expression
        pattern: String,

        /// Number of strings to generate
        #[arg(long, short = 'n', default_value_t = 1)]
        count: usize,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the semantic type inferred for field names
    Classify {
        /// Field names to classify
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            selector,
            payload,
            json,
        } => run_validate(&selector, &payload, json),

        Commands::Generate {
            selector,
            count,
            hint,
            seed,
            pretty,
        } => run_generate(&selector, count, &hint, seed, pretty),

        Commands::Seed {
            openapi,
            items,
            include,
            exclude,
            seed,
            dry_run,
            pretty,
        } => {
            let config = SeedConfig::new(items).include(include).exclude(exclude);
            run_seed(&openapi, &config, seed, dry_run, pretty)
        }

        Commands::Pattern {
            pattern,
            count,
            seed,
        } => run_pattern(&pattern, count, seed),

        Commands::Classify { fields } => {
            for field in fields {
                println!("{}\t{:?}", field, classify(&field));
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("OAS_MOCK_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries data; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_schema(selector: &SchemaSelector) -> Result<Schema, u8> {
    let root = load_value(&selector.schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let pointer = match (&selector.component, &selector.pointer) {
        (Some(name), _) => format!("#/components/schemas/{}", name.replace('~', "~0").replace('/', "~1")),
        (None, Some(pointer)) => pointer.clone(),
        (None, None) => "#".to_string(),
    };
    let raw = navigate_fragment(&root, &pointer).ok_or_else(|| {
        eprintln!("Error: no schema at {} in {}", pointer, selector.schema.display());
        2u8
    })?;

    Schema::from_json_in(raw, &root).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn run_validate(selector: &SchemaSelector, payload_path: &Path, json_output: bool) -> Result<(), u8> {
    let schema = load_schema(selector)?;
    let payload = load_value(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let errors = validate(&schema, &payload);
    if errors.is_empty() {
        if json_output {
            println!(r#"{{"valid":true}}"#);
        } else {
            println!("Valid");
        }
        return Ok(());
    }

    if json_output {
        let output = serde_json::json!({
            "valid": false,
            "errors": errors
        });
        println!("{}", output);
    } else {
        eprintln!("Validation failed:");
        for error in &errors {
            eprintln!("  [{}] {}", error.code, error);
        }
    }
    Err(1)
}

fn run_generate(
    selector: &SchemaSelector,
    count: usize,
    hint: &str,
    seed: Option<u64>,
    pretty: bool,
) -> Result<(), u8> {
    let schema = load_schema(selector)?;
    let mut generator = Generator::new(make_rng(seed));

    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let value = generator.generate(&schema, hint).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        values.push(value);
    }

    let output = if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    };
    print_json(&output, pretty)
}

fn run_seed(
    openapi: &Path,
    config: &SeedConfig,
    seed: Option<u64>,
    dry_run: bool,
    pretty: bool,
) -> Result<(), u8> {
    let raw = load_value(openapi).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let doc = OpenApiDocument::from_value(raw).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let resolver = Resolver::from_document(&doc).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if dry_run {
        let plan = serde_json::to_value(resolver.plan(config)).map_err(|e| {
            eprintln!("Error serializing plan: {}", e);
            2u8
        })?;
        return print_json(&plan, pretty);
    }

    let mut generator = Generator::new(make_rng(seed));
    let data = resolver.seed(config, &mut generator).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    // Emit resources in seeding order.
    let mut output = Map::new();
    for name in &data.order {
        if let Some(instances) = data.get(name) {
            output.insert(name.clone(), Value::Array(instances.to_vec()));
        }
    }
    print_json(&Value::Object(output), pretty)
}

fn run_pattern(pattern: &str, count: usize, seed: Option<u64>) -> Result<(), u8> {
    let mut generator = Generator::new(make_rng(seed));
    for _ in 0..count {
        let text = generator.generate_pattern(pattern).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        println!("{}", text);
    }
    Ok(())
}

fn print_json(value: &Value, pretty: bool) -> Result<(), u8> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", text);
    Ok(())
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
