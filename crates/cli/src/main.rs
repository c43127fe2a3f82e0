//! AceBack CLI - Database migrations and email relay.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! aceback-cli migrate
//!
//! # Send an email through the relay
//! aceback-cli email send --to thrower@example.com --subject "Hi" --html "<p>Hi</p>"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `email send` - Send a transactional email

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "aceback-cli")]
#[command(author, version, about = "AceBack CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Transactional email
    Email {
        #[command(subcommand)]
        action: EmailAction,
    },
}

#[derive(Subcommand)]
enum EmailAction {
    /// Send an email through Resend
    Send {
        /// Recipient address (repeat for several)
        #[arg(long, required = true)]
        to: Vec<String>,

        /// Subject line
        #[arg(short, long)]
        subject: String,

        /// HTML body
        #[arg(long)]
        html: String,

        /// Plain-text body
        #[arg(long)]
        text: Option<String>,

        /// Sender, overriding `EMAIL_FROM`
        #[arg(long)]
        from: Option<String>,

        /// Reply-To address
        #[arg(long)]
        reply_to: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Email { action } => match action {
            EmailAction::Send {
                to,
                subject,
                html,
                text,
                from,
                reply_to,
            } => {
                commands::email::send(commands::email::SendArgs {
                    to,
                    subject,
                    html,
                    text,
                    from,
                    reply_to,
                })
                .await?;
            }
        },
    }
    Ok(())
}
