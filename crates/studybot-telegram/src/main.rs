//! StudyBot Telegram binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx cargo run -p studybot-telegram
//! ```

use clap::Parser;
use studybot_core::config;
use studybot_telegram::StudyBot;
use tracing_subscriber::EnvFilter;

/// StudyBot - Telegram learning assistant for Master's programme students
#[derive(Parser, Debug)]
#[command(name = "studybot")]
#[command(about = "Telegram learning assistant for Master's programme students")]
struct Args {
    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load environment variables from the config directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    // Also try a local .env for development
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => "studybot=info,teloxide=warn",
        1 => "studybot=debug,teloxide=info",
        2 => "studybot=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Ensure all state directories exist
    if let Err(e) = config::ensure_all_dirs() {
        tracing::warn!(error = %e, "Failed to create state directories");
    }

    // Create the bot
    let bot = StudyBot::new(&config::state_dir())?;

    // Get bot info
    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\nStudyBot");
            println!("   Bot: @{}", username);
            println!(
                "   Model escalation: {}",
                if bot.has_model() {
                    "enabled"
                } else {
                    "disabled (set ANTHROPIC_API_KEY)"
                }
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\nOpen Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling().await?;

    Ok(())
}
