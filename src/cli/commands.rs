use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "supportdesk", version, about = "Customer support chat backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve,

    /// Chat with the support assistant from the terminal
    Chat {
        /// Session to continue; a new one is created when omitted
        #[arg(short, long)]
        session: Option<Uuid>,
    },

    /// Manage chat sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Manage FAQ entries used for direct answers
    Faq {
        #[command(subcommand)]
        action: FaqAction,
    },

    /// Inspect escalation requests
    Escalation {
        #[command(subcommand)]
        action: EscalationAction,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Create a new session
    Create,

    /// List recent sessions
    List,

    /// Print the transcript of a session
    Show { id: Uuid },
}

#[derive(Subcommand)]
pub enum FaqAction {
    /// Add an FAQ entry
    Add {
        #[arg(short, long)]
        question: String,
        #[arg(short, long)]
        answer: String,
    },

    /// List FAQ entries in match order
    List,

    /// Remove an FAQ entry
    Remove { id: i64 },
}

#[derive(Subcommand)]
pub enum EscalationAction {
    /// List the most recent escalations
    List {
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
}
