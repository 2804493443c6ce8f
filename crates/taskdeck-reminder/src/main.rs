use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskdeck_db::Database;
use taskdeck_notify::{create_notifier, NotifierConfig};

#[derive(Parser)]
#[command(name = "taskdeck-reminder")]
struct Cli {
    /// Run a single reminder pass and exit instead of scheduling hourly.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db: Arc<dyn Database> = Arc::new(taskdeck_db::SqliteDatabase::open_default()?);

    let config = NotifierConfig::from_env();
    let Some(recipient) = config.reminder_email.clone() else {
        bail!("TASKDECK_REMINDER_EMAIL is not set");
    };
    let notifier = create_notifier(&config);

    if cli.once {
        let sent = taskdeck_reminder::run_tick(&*db, &*notifier, &recipient, Utc::now()).await?;
        eprintln!("sent {sent} reminders");
        return Ok(());
    }

    eprintln!("taskdeck-reminder scheduling hourly reminder passes");
    taskdeck_reminder::run_scheduler(db, notifier, recipient).await;
    Ok(())
}
