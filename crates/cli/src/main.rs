//! EduAssist CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Write the default config
//! - `serve`    — Start the HTTP gateway
//! - `ask`      — Run one request through the chat pipeline
//! - `sessions` — List a user's active sessions
//! - `history`  — Show a session's messages
//! - `config`   — Show, validate or locate the config
//! - `doctor`   — Diagnose setup problems

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "eduassist",
    about = "EduAssist — AI teaching assistant for educators",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one prompt through the chat pipeline
    Ask {
        /// The prompt text
        prompt: String,

        /// Requesting user
        #[arg(short, long, env = "EDUASSIST_USER", default_value = "cli-educator")]
        user: String,

        /// Action type (translate, summarize, rewrite, question_generation)
        #[arg(short, long)]
        action: Option<String>,

        /// Action parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,

        /// Educational context as key=value (repeatable)
        #[arg(short = 'c', long = "context")]
        context: Vec<String>,

        /// Continue an existing session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List active sessions of a user
    Sessions {
        #[arg(short, long, env = "EDUASSIST_USER", default_value = "cli-educator")]
        user: String,
    },

    /// Show the messages of one session
    History {
        session_id: String,

        #[arg(short, long, env = "EDUASSIST_USER", default_value = "cli-educator")]
        user: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Diagnose system health
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Load and validate the configuration
    Validate,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask {
            prompt,
            user,
            action,
            params,
            context,
            session,
        } => {
            commands::ask::run(commands::ask::AskArgs {
                prompt,
                user,
                action,
                params,
                context,
                session,
            })
            .await?
        }
        Commands::Sessions { user } => commands::sessions::list(&user).await?,
        Commands::History { session_id, user } => commands::sessions::history(&session_id, &user).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
