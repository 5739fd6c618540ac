//! Gmail Vacation Auto-Responder
//!
//! Polls an inbox on a randomized timer and sends a canned auto-reply plus a
//! marker label to every thread the account owner has not yet answered.
//!
//! # Overview
//!
//! - **Authentication**: OAuth2 authentication with token caching
//! - **Detection**: a thread is unanswered iff none of its messages was sent
//!   by the authenticated owner
//! - **Reply**: one canned reply per tick into each unanswered thread
//! - **Labeling**: a "Vacation Reply" marker label, created lazily and reused
//! - **Scheduling**: polling delay re-randomized uniformly on every tick,
//!   ticks strictly serialized
//!
//! # Example Usage
//!
//! ```no_run
//! use vacation_responder::{auth, client::GmailApiClient, config::Config};
//! use vacation_responder::responder::{ReplySettings, Responder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     let hub = auth::initialize_gmail_hub(
//!         "credentials.json".as_ref(),
//!         ".vacation-responder/token.json".as_ref(),
//!     )
//!     .await?;
//!
//!     let client = GmailApiClient::new(hub);
//!     let settings = ReplySettings {
//!         label_name: config.reply.label_name.clone(),
//!         body: config.reply.body.clone(),
//!         dry_run: false,
//!     };
//!     let mut responder = Responder::new(Box::new(client), settings);
//!     let report = responder.run_once().await?;
//!     println!("Replied to {} threads", report.replies_sent);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 authentication and Gmail API initialization
//! - [`cli`] - Command-line interface
//! - [`client`] - `MailClient` seam and the Gmail API implementation
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases
//! - [`labels`] - Marker label find-or-create cache
//! - [`models`] - Thread and message summaries
//! - [`responder`] - The auto-reply workflow
//! - [`scheduler`] - Randomized polling loop

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod labels;
pub mod models;
pub mod responder;
pub mod scheduler;

// Re-export commonly used types for convenience
pub use error::{ResponderError, Result};

pub use client::{GmailApiClient, LabelInfo, MailClient};
pub use config::{Config, ExecutionConfig, PollConfig, ReplyConfig};
pub use labels::LabelStore;
pub use models::{MessageSummary, ThreadSummary};
pub use responder::{ReplySettings, Responder, TickReport};
pub use scheduler::{random_interval, Scheduler};

pub use cli::{Cli, Commands};
