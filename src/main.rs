use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;

use storyreel::config::AppConfig;
use storyreel::models::{PipelineOptions, StoryRecord};
use storyreel::services::llm::{OpenRouterClient, DEFAULT_MODEL};
use storyreel::services::story::{JsonFileStore, StoryStore};
use storyreel::services::text;
use storyreel::Pipeline;

#[derive(Parser)]
#[command(name = "storyreel", about = "Turn a text prompt into a short vertical video")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a narration script for a topic and store it.
    Generate {
        #[arg(long)]
        topic: String,
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
    },
    /// Run the full pipeline for a stored story.
    Pipeline {
        /// Story id, as printed by `generate`.
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "am_liam")]
        voice: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, default_value = "tiny")]
        model_size: String,
        #[arg(long, default_value_t = 1.0)]
        speed: f32,
        /// Explicit background clip; a random one is picked when omitted.
        #[arg(long)]
        stock_video: Option<PathBuf>,
    },
    /// Normalize narration text and print the result.
    Normalize {
        #[arg(long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    storyreel::utils::logger::init_logger();
    let config = AppConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate { topic, model } => {
            let client = OpenRouterClient::new(
                config.openrouter_base_url.clone(),
                config.openrouter_api_key.clone(),
            );
            let content = client.generate_story(&topic, &model).await?;

            let record = StoryRecord {
                id: uuid::Uuid::new_v4().to_string(),
                topic,
                content,
                model,
                created_at: Utc::now(),
            };
            let store = JsonFileStore::new(config.stories_dir.clone());
            store.insert(&record)?;
            println!("{}", record.id);
        }
        Command::Pipeline {
            id,
            voice,
            language,
            model_size,
            speed,
            stock_video,
        } => {
            let store = JsonFileStore::new(config.stories_dir.clone());
            let options = PipelineOptions {
                voice,
                language,
                model_size,
                speed,
                stock_video_path: stock_video,
            };
            let pipeline = Pipeline::new(config);
            let report = pipeline.run_for_story(&store, &id, &options).await?;
            info!("Pipeline finished for {id}");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Normalize { text } => {
            println!("{}", text::add_pauses(&text::normalize(&text)));
        }
    }

    Ok(())
}
