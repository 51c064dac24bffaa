use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Serialize;

use apidoc_core::config::{self, ApidocConfig, CONFIG_FILE_NAME};
use apidoc_core::{ResolveResponse, Workspace};

#[derive(Parser)]
#[command(
    name = "apidoc",
    about = "Resolve OpenAPI operations into documentation-ready descriptions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the API projects below a directory
    Projects {
        /// Directory to search
        #[arg(short, long, default_value = ".")]
        base: PathBuf,
    },

    /// List the endpoints of a project
    Endpoints {
        /// Directory the project was discovered under
        #[arg(short, long, default_value = ".")]
        base: PathBuf,

        /// Project root path or name
        #[arg(short, long)]
        project: String,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Resolve one operation
    Resolve {
        /// Directory the project was discovered under
        #[arg(short, long, default_value = ".")]
        base: PathBuf,

        /// Project root path or name
        #[arg(short, long)]
        project: String,

        /// Endpoint name, API path or file reference
        #[arg(short, long)]
        endpoint: String,

        /// HTTP method (defaults to the endpoint's first)
        #[arg(short, long)]
        method: Option<String>,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },

    /// Write a default .apidoc.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Projects { base } => cmd_projects(base).await,

        Commands::Endpoints {
            base,
            project,
            format,
        } => cmd_endpoints(base, &project, format).await,

        Commands::Resolve {
            base,
            project,
            endpoint,
            method,
            format,
        } => cmd_resolve(base, &project, &endpoint, method.as_deref(), format).await,

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apidoc", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load `.apidoc.yaml` from the current directory, or use defaults.
fn load_config() -> Result<ApidocConfig> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    match config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))? {
        Some(cfg) => {
            log::debug!("loaded {}", config_path.display());
            Ok(cfg)
        }
        None => Ok(ApidocConfig::default()),
    }
}

fn print_as<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(value)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

async fn cmd_projects(base: PathBuf) -> Result<()> {
    let workspace = Workspace::new(base, load_config()?);
    let projects = workspace
        .list_projects()
        .await
        .with_context(|| format!("failed to scan {}", workspace.base().display()))?;

    if projects.is_empty() {
        eprintln!("No projects found under {}", workspace.base().display());
        return Ok(());
    }
    for project in &projects {
        let root = if project.root_path.is_empty() {
            "."
        } else {
            project.root_path.as_str()
        };
        println!("{}\t{}\t{} files", project.name, root, project.file_count);
    }
    Ok(())
}

async fn cmd_endpoints(base: PathBuf, project: &str, format: OutputFormat) -> Result<()> {
    let workspace = Workspace::new(base, load_config()?);
    let endpoints = workspace
        .list_endpoints(project)
        .await
        .with_context(|| format!("failed to index project {project}"))?;
    print_as(&endpoints, format)
}

async fn cmd_resolve(
    base: PathBuf,
    project: &str,
    endpoint: &str,
    method: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let workspace = Workspace::new(base, load_config()?);
    let response = workspace
        .resolve_operation(project, endpoint, method)
        .await;
    print_as(&response, format)?;

    if let ResolveResponse::Error { error } = &response {
        anyhow::bail!("could not resolve {endpoint}: {error}");
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
