use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

use composer_ns::{AutoloadSection, ComposerProject, NamespaceService, ResolverOptions};

/// Exit code for queries that found nothing
const EXIT_NOT_FOUND: u8 = 1;

/// Exit code when no usable composer.json was found
const EXIT_NO_MANIFEST: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "composer-ns")]
#[command(about = "Resolve PSR-4 namespaces and paths in a Composer project")]
struct Cli {
    /// Directory to start looking for composer.json from (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// JSON file with resolver options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Marker segment for test namespaces
    #[arg(long, global = true)]
    marker: Option<String>,

    /// Source file extension, without the dot
    #[arg(long, global = true)]
    extension: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the namespace a file or directory belongs to
    Namespace { path: PathBuf },
    /// Print the directory for a namespace
    Path { namespace: String },
    /// Print the source file for a fully qualified name
    File { fqn: String },
    /// Exit with 0 if the source file for a fully qualified name exists
    Exists { fqn: String },
    /// Print the longest declared namespace prefix of a name
    Base { name: String },
    /// Print the test namespace for a component
    TestNamespace { fqn: String },
    /// Print every namespace prefix whose directory exists
    Mappings,
}

fn load_options(cli: &Cli) -> Result<ResolverOptions> {
    let mut options: ResolverOptions = match &cli.config {
        Some(path) => {
            let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {:?}", path))?;
            serde_json::from_str(&content).with_context(|| format!("Failed to parse config {:?}", path))?
        }
        None => ResolverOptions::default(),
    };

    if let Some(marker) = &cli.marker {
        options.test_marker = marker.clone();
    }
    if let Some(extension) = &cli.extension {
        options.source_extension = extension.trim_start_matches('.').to_string();
    }

    debug!("Resolver options: {:?}", options);
    Ok(options)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let options = load_options(&cli)?;

    let start = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    let project = match ComposerProject::discover(&start) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(EXIT_NO_MANIFEST));
        }
    };
    info!("Using {:?}", project.manifest_path);

    let service = NamespaceService::new(options);
    let (manifest, root) = (&project.manifest, project.root.as_path());

    let found = match cli.command {
        Command::Namespace { path } => match service.namespace_from_path(&path, manifest, root) {
            Ok(namespace) => {
                println!("{}", namespace);
                true
            }
            Err(e) => {
                eprintln!("{}", e);
                false
            }
        },
        Command::Path { namespace } => print_path(service.path_from_namespace(&namespace, manifest, root)),
        Command::File { fqn } => print_path(service.path_from_fqn(&fqn, manifest, root)),
        Command::Exists { fqn } => service.file_with_fqn_exists(&fqn, manifest, root),
        Command::Base { name } => {
            let base = service.base_namespace(&name, manifest, root);
            println!("{}", base);
            !base.is_empty()
        }
        Command::TestNamespace { fqn } => {
            println!("{}", service.test_namespace(&fqn, manifest, root));
            true
        }
        Command::Mappings => {
            let tables = service.tables(manifest, root);
            for (section, mappings) in [
                (AutoloadSection::Autoload, &tables.primary),
                (AutoloadSection::AutoloadDev, &tables.dev),
            ] {
                for mapping in mappings {
                    println!("{}\t{}\t{}", section, mapping.prefix(), mapping.directory().display());
                }
            }
            true
        }
    };

    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_FOUND)
    })
}

fn print_path(path: Option<PathBuf>) -> bool {
    match path {
        Some(path) => {
            println!("{}", path.display());
            true
        }
        None => false,
    }
}

fn main() -> Result<ExitCode> {
    // Initialize logging with environment-based filtering
    // Default to WARN level so stdout stays clean, override with RUST_LOG
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
