use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tower_lsp::lsp_types::Position;
use tower_lsp::{LspService, Server};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate_features_lsp::backend::FeaturesBackend;
use crate_features_lsp::cache::MemoryCache;
use crate_features_lsp::features::{FeatureLookup, RemoteFeatureSource};
use crate_features_lsp::parsers::DependencyReference;
use crate_features_lsp::providers::completion::{FeatureCompleter, completion_context};
use crate_features_lsp::registries::crates_io::{CRATES_IO_API_URL, CratesIoRegistry};
use crate_features_lsp::registries::http_client::create_shared_client;

#[derive(Parser)]
#[command(name = "crate-features-lsp")]
#[command(about = "Language server completing feature names in Cargo.toml", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the LSP server (default behavior)
    Lsp,
    /// Print the feature suggestions for a cursor position in a manifest
    Complete {
        /// Path to the Cargo.toml to complete in
        #[arg(short, long)]
        file: PathBuf,

        /// Zero-based line of the cursor
        #[arg(short, long)]
        line: u32,

        /// Zero-based UTF-16 column of the cursor
        #[arg(short, long)]
        column: u32,

        /// Base URL of the registry API
        #[arg(long, default_value = CRATES_IO_API_URL)]
        registry_url: String,

        /// Registry request timeout in seconds
        #[arg(long, default_value = "5")]
        timeout_secs: u64,
    },
    /// Print the public features of one dependency
    Features {
        /// Crate name
        name: String,

        /// Version requirement, e.g. `1.0` or `^0.12`
        #[arg(short, long)]
        version: Option<String>,

        /// Directory of a path dependency; reads its Cargo.toml instead of the registry
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Base URL of the registry API
        #[arg(long, default_value = CRATES_IO_API_URL)]
        registry_url: String,

        /// Registry request timeout in seconds
        #[arg(long, default_value = "5")]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries the LSP protocol
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Option<Commands>) -> anyhow::Result<()> {
    match command {
        Some(Commands::Complete {
            file,
            line,
            column,
            registry_url,
            timeout_secs,
        }) => {
            let position = Position {
                line,
                character: column,
            };
            let completer = build_completer(&registry_url, timeout_secs)?;
            run_complete(&file, position, completer).await
        }
        Some(Commands::Features {
            name,
            version,
            path,
            registry_url,
            timeout_secs,
        }) => {
            let dependency = DependencyReference {
                crate_name: name,
                path,
                version,
            };
            let completer = build_completer(&registry_url, timeout_secs)?;
            run_features(&dependency, completer).await
        }
        Some(Commands::Lsp) | None => {
            run_lsp().await;
            Ok(())
        }
    }
}

fn build_completer(
    registry_url: &str,
    timeout_secs: u64,
) -> anyhow::Result<FeatureCompleter<CratesIoRegistry>> {
    let client = create_shared_client(Duration::from_secs(timeout_secs.max(1)))?;
    let registry = CratesIoRegistry::with_client(client).with_base_url(registry_url);
    Ok(FeatureCompleter::new(RemoteFeatureSource::new(
        registry,
        MemoryCache::new(),
    )))
}

async fn run_lsp() {
    tracing::info!("Starting crate-features-lsp server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(FeaturesBackend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

async fn run_complete(
    file: &Path,
    position: Position,
    completer: FeatureCompleter<CratesIoRegistry>,
) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let manifest_dir = std::path::absolute(file)
        .with_context(|| format!("Failed to resolve {}", file.display()))?
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let Some(context) = completion_context(&content, position, &manifest_dir) else {
        bail!(
            "No feature list opens at {}:{}:{}",
            file.display(),
            position.line,
            position.character
        );
    };
    eprintln!("Completing features of {}", context.dependency.crate_name);

    for suggestion in completer.suggest(&context).await {
        print_feature(&suggestion.feature.name, &suggestion.feature.enables);
    }
    Ok(())
}

async fn run_features(
    dependency: &DependencyReference,
    completer: FeatureCompleter<CratesIoRegistry>,
) -> anyhow::Result<()> {
    match completer.lookup(dependency).await {
        FeatureLookup::Resolved(features) => {
            if features.is_empty() {
                eprintln!("{} declares no public features", dependency.crate_name);
            }
            for feature in &features {
                print_feature(&feature.name, &feature.enables);
            }
            Ok(())
        }
        FeatureLookup::Unavailable(e) => {
            if e.is_remote() {
                eprintln!("Check the network connection or pass --registry-url");
            }
            Err(anyhow::Error::new(e).context(format!(
                "Failed to resolve features of {}",
                dependency.crate_name
            )))
        }
    }
}

fn print_feature(name: &str, enables: &[String]) {
    if enables.is_empty() {
        println!("{}", name);
    } else {
        println!("{} = [{}]", name, enables.join(", "));
    }
}
