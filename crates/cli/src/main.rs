use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::{ChatMode, ChatReply, EmotionGenreTable, FinalReply};
use server::{ConversationOrchestrator, ServiceConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Opening question shown before the first message
const OPENING_QUESTION: &str = "오늘 기분이 어때?";

/// MoodyMovie - mood-based movie recommendations in the terminal
#[derive(Parser)]
#[command(name = "moody-movie")]
#[command(about = "Chat about your mood and get movie recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive conversation
    Chat {
        /// Session identifier for this conversation
        #[arg(long, default_value = "terminal")]
        session_id: String,

        #[command(flatten)]
        services: ServiceConfig,
    },

    /// Show the emotion to genre table
    Genres {
        /// JSON file replacing the built-in table
        #[arg(long, env = "MOODY_GENRE_TABLE")]
        genre_table: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(err) => tracing::debug!("No .env file loaded ({})", err),
    }

    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Chat {
            session_id,
            services,
        } => handle_chat(&services, &session_id).await?,
        Commands::Genres { genre_table } => handle_genres(genre_table)?,
    }

    Ok(())
}

/// Handle the 'chat' command
async fn handle_chat(services: &ServiceConfig, session_id: &str) -> Result<()> {
    let orchestrator = services
        .build_orchestrator()
        .context("Failed to initialize orchestrator")?;

    println!("{}", "MoodyMovie (type /quit to exit)".bold().blue());
    println!("{} {}", "bot>".green(), OPENING_QUESTION);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut mode = ChatMode::Emotion;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let text = line.trim();
        if text == "/quit" {
            break;
        }
        mode = send_turn(&orchestrator, session_id, text, mode).await?;
    }

    Ok(())
}

/// Send one message and print the reply; returns the mode for the next turn
async fn send_turn(
    orchestrator: &ConversationOrchestrator,
    session_id: &str,
    text: &str,
    mode: ChatMode,
) -> Result<ChatMode> {
    let start = Instant::now();
    let reply = orchestrator.handle(session_id, text, mode).await?;
    tracing::debug!("Turn answered in {:?}", start.elapsed());

    match reply {
        ChatReply::Message { reply } => {
            println!("{} {}", "bot>".green(), reply);
            Ok(mode)
        }
        ChatReply::Final(final_reply) => {
            print_recommendations(&final_reply);
            // Only switch to free chat once something was actually recommended
            if final_reply.movies.is_empty() {
                Ok(mode)
            } else {
                Ok(ChatMode::Chat)
            }
        }
    }
}

/// Handle the 'genres' command
fn handle_genres(genre_table: Option<PathBuf>) -> Result<()> {
    let table = EmotionGenreTable::load_or_builtin(genre_table.as_deref())
        .context("Failed to load emotion genre table")?;

    println!("{}", "Emotion → TMDB genres".bold().blue());
    for (emotion, genres) in table.iter() {
        let ids = genres
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}{}: {}", "• ".green(), emotion, ids);
    }
    Ok(())
}

/// Helper function to format and print the final turn
fn print_recommendations(reply: &FinalReply) {
    println!("{} {}", "bot>".green(), reply.reply);
    println!("{}Summary: {}", "• ".cyan(), reply.summary);
    match &reply.sub_emotion {
        Some(sub) => println!("{}Emotion: {} ({})", "• ".cyan(), reply.emotion, sub),
        None => println!("{}Emotion: {}", "• ".cyan(), reply.emotion),
    }

    if reply.movies.is_empty() {
        return;
    }
    println!("{}", "Movie Recommendations:".bold().blue());
    for (rank, movie) in reply.movies.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), movie.title);
    }
}
