//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use ntask_core::config::Config;
use ntask_core::credentials::TokenStore;
use ntask_core::tasks::{Filter, TaskContext};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "ntask")]
#[command(version)]
#[command(about = "NightTask terminal client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Register a new account
    Signup {
        /// Username for the new account (prompted when omitted)
        #[arg(long)]
        username: Option<String>,

        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and clear the stored token
    Logout,

    /// List tasks
    List {
        /// Which tasks to show (all, active, completed)
        #[arg(long, value_name = "VIEW", default_value = "all")]
        filter: Filter,
    },

    /// Add a new task
    Add {
        /// Task title
        #[arg(long)]
        title: String,

        /// Task description
        #[arg(long)]
        description: String,

        /// Context tag (work, personal, learning, other)
        #[arg(long, default_value = "work")]
        context: TaskContext,
    },

    /// Edit a task's title and/or description
    Edit {
        /// The ID of the task to edit
        #[arg(value_name = "TASK_ID")]
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Toggle a task's completion status
    Toggle {
        /// The ID of the task to toggle
        #[arg(value_name = "TASK_ID")]
        id: String,
    },

    /// Delete a task
    Delete {
        /// The ID of the task to delete
        #[arg(value_name = "TASK_ID")]
        id: String,
    },

    /// Remove completed tasks from the local view (the server keeps them)
    ClearCompleted,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the API base URL in the config file
    SetUrl {
        /// Base URL of the NightTask API server
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    let tokens = TokenStore::new();
    tracing::debug!(base_url = ?config.effective_base_url(), "config loaded");

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&config, &tokens, email, password).await
        }
        Commands::Signup {
            username,
            email,
            password,
        } => commands::auth::signup(&config, &tokens, username, email, password).await,
        Commands::Logout => commands::auth::logout(&tokens),

        Commands::List { filter } => commands::tasks::list(&config, &tokens, filter).await,
        Commands::Add {
            title,
            description,
            context,
        } => commands::tasks::add(&config, &tokens, title, description, context).await,
        Commands::Edit {
            id,
            title,
            description,
        } => commands::tasks::edit(&config, &tokens, &id, title, description).await,
        Commands::Toggle { id } => commands::tasks::toggle(&config, &tokens, &id).await,
        Commands::Delete { id } => commands::tasks::delete(&config, &tokens, &id).await,
        Commands::ClearCompleted => commands::tasks::clear_completed(&config, &tokens).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetUrl { url } => commands::config::set_url(&url),
        },
    }
}
