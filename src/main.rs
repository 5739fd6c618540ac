use anyhow::Result;
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;
use vacation_responder::cli::{Cli, Commands};
use vacation_responder::client::GmailApiClient;
use vacation_responder::config::Config;
use vacation_responder::error::ResponderError;
use vacation_responder::responder::{ReplySettings, Responder};
use vacation_responder::scheduler::Scheduler;

#[tokio::main]
async fn main() {
    // Exit with proper code on error
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("\nFor help, run: vacation-responder --help");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install default crypto provider for rustls
    // This is necessary because multiple dependencies use different crypto providers
    // On non-Windows platforms, use aws-lc-rs (better performance, FIPS support)
    // On Windows, use ring (better compatibility, no NASM/CMake required)
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing with level based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("vacation_responder=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("vacation_responder=info,warn,error"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Auth { force } => {
            tracing::info!("Authenticating with Gmail API...");

            // Ensure token cache directory exists
            if let Some(parent) = cli.token_cache.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            // Delete existing token if force flag is set
            if force && cli.token_cache.exists() {
                tokio::fs::remove_file(&cli.token_cache).await?;
                tracing::info!("Removed existing token cache");
            }

            // Initialize Gmail hub (will trigger OAuth flow if needed)
            let hub = vacation_responder::auth::initialize_gmail_hub(
                &cli.credentials,
                &cli.token_cache,
            )
            .await?;

            vacation_responder::auth::secure_token_file(&cli.token_cache).await?;

            println!("Successfully authenticated with Gmail API");
            println!("Token cached at: {:?}", cli.token_cache);

            // Test the connection - must specify scope to avoid triggering additional OAuth flow
            let (_, profile) = hub
                .users()
                .get_profile("me")
                .add_scope("https://www.googleapis.com/auth/gmail.modify")
                .doit()
                .await?;
            println!(
                "Connected to account: {}",
                profile.email_address.unwrap_or_default()
            );

            Ok(())
        }

        Commands::Run { once, dry_run } => {
            let config = Config::load(&cli.config).await?;

            if dry_run || config.execution.dry_run {
                println!("Running in DRY RUN mode - no replies will be sent");
            }

            // Bootstrap failures (bad credentials file, failed exchange) are
            // fatal here, before the polling loop ever starts
            let hub = vacation_responder::auth::initialize_gmail_hub(
                &cli.credentials,
                &cli.token_cache,
            )
            .await?;

            let client = GmailApiClient::new(hub);
            let settings = ReplySettings {
                label_name: config.reply.label_name.clone(),
                body: config.reply.body.clone(),
                dry_run: dry_run || config.execution.dry_run,
            };
            let mut responder = Responder::new(Box::new(client), settings);

            if once {
                let report = responder.run_once().await?;
                println!("\n========================================");
                println!("Tick Summary");
                println!("========================================");
                println!("Threads seen: {}", report.threads_seen);
                println!("Already answered: {}", report.answered);
                println!("Replies sent: {}", report.replies_sent);
                println!("Labels applied: {}", report.labels_applied);
                if report.would_reply > 0 {
                    println!("Would reply (dry run): {}", report.would_reply);
                }
                println!("Skipped: {}", report.skipped);
                println!("Failures: {}", report.failures);
                println!("========================================");
                return Ok(());
            }

            let scheduler = Scheduler::new(
                config.poll.min_interval_ms,
                config.poll.max_interval_ms,
                responder,
            )?;

            tracing::info!(
                "Polling inbox every {}-{}s (randomized)",
                config.poll.min_interval_ms / 1000,
                config.poll.max_interval_ms / 1000
            );

            tokio::select! {
                _ = scheduler.run() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received shutdown signal, stopping");
                }
            }

            Ok(())
        }

        Commands::InitConfig { output, force } => {
            tracing::info!("Generating example configuration file");

            if output.exists() && !force {
                return Err(ResponderError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(&output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nPlease edit this file to customize your settings.");
            println!("Key settings to review:");
            println!("  - poll.min_interval_ms / poll.max_interval_ms: polling window");
            println!("  - reply.label_name: marker label for auto-replied threads");
            println!("  - reply.body: the canned reply text");

            Ok(())
        }
    }
}
