//! abi-codegen - generate TypeScript bindings from a wasm-abi/1 manifest
//!
//! Usage:
//!   abi-codegen --validate -i abi.json      - Check a manifest and print its summary
//!   abi-codegen -i abi.json -o src          - Write src/types.ts and src/client.ts

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use wasm_abi_codegen::{generate, ClientStyle, GenerateOptions, Manifest};

#[derive(Parser)]
#[command(name = "abi-codegen")]
#[command(about = "Generate typed TypeScript clients from wasm-abi/1 manifests", long_about = None)]
struct Cli {
    /// Only validate the manifest and print a summary
    #[arg(long)]
    validate: bool,

    /// Path to the manifest
    #[arg(long, short = 'i', default_value = "abi.json")]
    input: PathBuf,

    /// Directory to write types.ts and client.ts into
    #[arg(long, short = 'o', default_value = "src")]
    output: PathBuf,

    /// Name of the generated client class
    #[arg(long, default_value = "Client")]
    client_name: String,

    /// How client methods take their arguments
    #[arg(long, value_enum, default_value_t = Style::Positional)]
    style: Style,

    /// Print a machine-readable summary instead of the human one
    #[arg(long)]
    json: bool,

    /// Log pipeline steps to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Style {
    /// makePerson(name, age, email)
    Positional,
    /// make_person({ name, age, email })
    Namespaced,
}

impl From<Style> for ClientStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Positional => ClientStyle::Positional,
            Style::Namespaced => ClientStyle::Namespaced,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
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

fn run(cli: &Cli) -> anyhow::Result<()> {
    let manifest = load_manifest(&cli.input)?;

    if cli.validate {
        return validate_command(&manifest, cli.json);
    }
    generate_command(&manifest, cli)
}

fn load_manifest(input: &Path) -> anyhow::Result<Manifest> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let manifest = Manifest::from_slice(&bytes).context("Validation failed")?;
    tracing::info!(input = %input.display(), hash = %manifest.hash().to_short_hex(), "loaded manifest");
    Ok(manifest)
}

fn validate_command(manifest: &Manifest, json: bool) -> anyhow::Result<()> {
    let summary = manifest.summary();
    if json {
        let output = serde_json::json!({
            "valid": true,
            "summary": summary,
            "hash": manifest.hash().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("✅ Manifest is valid: {summary}");
    }
    Ok(())
}

fn generate_command(manifest: &Manifest, cli: &Cli) -> anyhow::Result<()> {
    let options = GenerateOptions {
        client_name: cli.client_name.clone(),
        style: cli.style.into(),
    };
    // Render everything before touching the file system.
    let bindings = generate(manifest, &options).context("Generation failed")?;

    fs::create_dir_all(&cli.output).with_context(|| {
        format!("Failed to create output directory {}", cli.output.display())
    })?;

    let mut written = Vec::new();
    for (name, contents) in bindings.files() {
        let path = cli.output.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = contents.len(), "wrote file");
        written.push(path);
    }

    let summary = manifest.summary();
    if cli.json {
        let output = serde_json::json!({
            "summary": summary,
            "hash": manifest.hash().to_string(),
            "files": written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("✅ Generated bindings: {summary}");
        for path in &written {
            println!("   {}", path.display());
        }
    }
    Ok(())
}
