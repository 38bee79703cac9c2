//! Bundlewire CLI - resolve bindings, generate binders, invoke services

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use bundlewire::config::BundlewireConfig;
use bundlewire::diagnostics::Diagnostics;
use bundlewire::error::{BundleError, FixSuggestion};
use bundlewire::{Binder, BindingResolver, JavaEmitter, ProgramIndex, Resolution};

#[derive(Parser)]
#[command(name = "bundlewire")]
#[command(about = "Bundlewire - annotation-driven bundle bindings")]
#[command(version)]
struct Cli {
    /// Path to bundlewire.toml (defaults to ./bundlewire.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve bindings and report diagnostics
    Check {
        /// Path to the program model (.yaml)
        program: PathBuf,
    },

    /// Resolve bindings and write generated binders
    Generate {
        /// Path to the program model (.yaml)
        program: PathBuf,

        /// Output directory for generated sources
        #[arg(short, long, default_value = "generated")]
        out: PathBuf,
    },

    /// Call a service method and print the resulting bundle as JSON
    Invoke {
        /// Path to the program model (.yaml)
        program: PathBuf,

        /// Qualified name of the service interface
        service: String,

        /// Method name
        method: String,

        /// Arguments as JSON values, one per parameter (null = absent)
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.downcast_ref::<BundleError>().and_then(|e| e.fix_suggestion()) {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = BundlewireConfig::discover(cli.config.as_deref())?.with_env();

    match cli.command {
        Commands::Check { program } => check(&config, &program),
        Commands::Generate { program, out } => generate(&config, &program, &out),
        Commands::Invoke {
            program,
            service,
            method,
            args,
        } => invoke(&config, &program, &service, &method, &args),
    }
}

fn load(program: &Path) -> Result<ProgramIndex> {
    ProgramIndex::from_path(program)
        .with_context(|| format!("loading program model {}", program.display()))
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        eprintln!(
            "{}[{}] {}: {}",
            diagnostic.severity.to_string().red().bold(),
            diagnostic.code,
            diagnostic.location().bold(),
            diagnostic.message
        );
        eprintln!("  {} {}", "help:".cyan(), diagnostic.code.help());
    }
}

fn resolve(config: &BundlewireConfig, index: &ProgramIndex) -> Result<Resolution> {
    let resolution = BindingResolver::new(index, &config.resolver).resolve();
    print_diagnostics(resolution.diagnostics());
    if resolution.diagnostics().has_errors() {
        return Err(BundleError::ResolutionFailed {
            count: resolution.diagnostics().error_count(),
        }
        .into());
    }
    Ok(resolution)
}

fn check(config: &BundlewireConfig, program: &Path) -> Result<()> {
    let index = load(program)?;
    let resolution = resolve(config, &index)?;

    println!(
        "{} {} binding spec(s) resolved in '{}'",
        "✓".green(),
        resolution.len(),
        program.display()
    );
    for spec in resolution.specs() {
        let parent = spec
            .parent()
            .map(|p| format!(" extends {}", p.host()))
            .unwrap_or_default();
        println!("  {}{} ({} field(s))", spec.host().cyan(), parent, spec.fields().len());
    }
    Ok(())
}

fn generate(config: &BundlewireConfig, program: &Path, out: &Path) -> Result<()> {
    let index = load(program)?;
    let mut resolution = resolve(config, &index)?;

    let emitter = JavaEmitter::new(&config.emitter);
    let written = resolution.write_all(&emitter, out);
    if resolution.diagnostics().has_errors() {
        print_diagnostics(resolution.diagnostics());
        return Err(BundleError::ResolutionFailed {
            count: resolution.diagnostics().error_count(),
        }
        .into());
    }

    for path in &written {
        println!("{} {}", "→".cyan(), path.display());
    }
    println!("{} {} binder(s) generated", "✓".green(), written.len());
    Ok(())
}

fn invoke(
    config: &BundlewireConfig,
    program: &Path,
    service: &str,
    method: &str,
    args: &[String],
) -> Result<()> {
    let index = load(program)?;
    let args = args
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            serde_json::from_str(raw).with_context(|| format!("argument #{i} is not valid JSON: {raw}"))
        })
        .collect::<Result<Vec<serde_json::Value>>>()?;

    let binder = Binder::builder()
        .config(&config.runtime)
        .hierarchy(Arc::new(index.hierarchy().clone()))
        .build();
    let interface = index.service(service)?;
    let bundle = binder.create(&interface)?.call_json(method, &args)?;

    println!("{}", serde_json::to_string_pretty(&bundle.to_json())?);
    Ok(())
}
