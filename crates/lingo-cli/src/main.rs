//! lingo CLI - Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lingo::{Configuration, Localizer};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod loader;

#[derive(Parser)]
#[command(name = "lingo")]
#[command(version)]
#[command(about = "Inspect and render localization resources", long_about = None)]
struct Cli {
    /// Directory containing locale files
    #[arg(short, long, value_name = "DIR", default_value = "locales")]
    dir: PathBuf,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded locales
    Locales,

    /// List every key of a locale
    Keys {
        /// Locale tag
        locale: String,
    },

    /// Render a key for a locale
    Render {
        /// Requested locale tag
        locale: String,

        /// Dotted key path
        key: String,

        /// Template data as a JSON object
        #[arg(long)]
        data: Option<String>,

        /// Template variable (NAME=VALUE)
        #[arg(short = 'D', long = "define")]
        defines: Vec<String>,
    },

    /// Report translation coverage against a reference locale
    Coverage {
        /// Reference locale (defaults to the configured default locale)
        #[arg(long)]
        reference: Option<String>,
    },
}

fn load_configuration(path: Option<&Path>) -> Result<Configuration> {
    let Some(path) = path else {
        return Ok(Configuration::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
    Configuration::from_yaml_str(&source)
        .with_context(|| format!("Invalid configuration: {}", path.display()))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lingo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref())?;
    let mut localizer = Localizer::new(config);
    let loaded = loader::load_directory(&mut localizer, &cli.dir)?;
    tracing::debug!(files = loaded, dir = %cli.dir.display(), "Loaded locale directory");

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Locales => commands::locales::execute(&localizer, &mut out),
        Commands::Keys { locale } => commands::keys::execute(&localizer, &locale, &mut out),
        Commands::Render {
            locale,
            key,
            data,
            defines,
        } => commands::render::execute(
            &localizer,
            &commands::render::RenderArgs {
                locale,
                key,
                data,
                defines,
            },
            &mut out,
        ),
        Commands::Coverage { reference } => {
            commands::coverage::execute(&localizer, reference.as_deref(), &mut out)
        }
    }
}
