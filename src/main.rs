//! IdeaFlow - capture, refine and keep ideas
//!
#![doc = "IdeaFlow - AI-assisted idea vault"]
#![doc = "Main entry point for the IdeaFlow command-line application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ideaflow::cli::{Cli, Commands};
use ideaflow::commands::{self, assist, backup, ideas};
use ideaflow::config::Config;
use ideaflow::pipeline::CaptureInput;
use ideaflow::view::SortOrder;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    config.validate()?;

    let vault = commands::open_vault(&config)?;

    match cli.command {
        Commands::Capture {
            text,
            audio,
            no_image,
        } => {
            tracing::info!("Starting capture");
            let input = match (text, audio) {
                (Some(text), _) => CaptureInput::Text(text),
                (None, Some(path)) => CaptureInput::from_audio_file(&path)?,
                (None, None) => anyhow::bail!("capture needs --text or --audio"),
            };
            assist::run_capture(&config, &vault, input, no_image).await?;
        }
        Commands::List {
            search,
            category,
            favorites,
            sort,
            json,
        } => {
            let filter = ideas::build_filter(search, category.as_deref(), favorites)?;
            let order: SortOrder = sort.parse()?;
            ideas::list_ideas(&vault, &filter, order, json)?;
        }
        Commands::Show { id, json } => ideas::show_idea(&vault, &id, json)?,
        Commands::Edit {
            id,
            title,
            transcript,
        } => ideas::edit_idea(&vault, &id, title, transcript)?,
        Commands::Favorite { id } => ideas::toggle_favorite(&vault, &id)?,
        Commands::Delete { id } => ideas::delete_idea(&vault, &id)?,
        Commands::Refine { id } => {
            tracing::info!(id = %id, "Starting refine");
            assist::run_refine(&config, &vault, &id).await?;
        }
        Commands::Expand { id } => {
            tracing::info!(id = %id, "Starting deep dive");
            assist::run_expand(&config, &vault, &id).await?;
        }
        Commands::Chat { id } => {
            tracing::info!(id = %id, "Starting chat");
            assist::run_chat(&config, &vault, &id).await?;
        }
        Commands::Export { dir } => {
            let dir = backup::resolve_export_dir(&config, dir);
            backup::run_export(&vault, &dir)?;
        }
        Commands::Import { file } => backup::run_import(&vault, &file)?,
        Commands::Stats { json } => ideas::show_stats(&vault, json)?,
    }

    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins; otherwise `-v` raises the default from info to debug.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ideaflow=debug" } else { "ideaflow=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
