//! Hourly reminder job for tasks coming due.
//!
//! Each tick looks up tasks due tomorrow that are not yet completed and
//! sends one reminder email per task. A failed send is logged and does
//! not stop the remaining tasks from being reminded; nothing records
//! which reminders were already sent, so a task due tomorrow is
//! reminded on every tick until its due date passes.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use tracing::{error, info, warn};

use taskdeck_core::due_date::DUE_DATE_FORMAT;
use taskdeck_db::Database;
use taskdeck_notify::Notifier;

/// Run one reminder pass as of `now`. Returns the number of reminders
/// successfully sent.
pub async fn run_tick(
    db: &dyn Database,
    notifier: &dyn Notifier,
    recipient: &str,
    now: DateTime<Utc>,
) -> Result<usize, taskdeck_db::DbError> {
    let tomorrow = (now + ChronoDuration::days(1))
        .format(DUE_DATE_FORMAT)
        .to_string();
    let due = db.list_tasks_due(&tomorrow).await?;

    let mut sent = 0;
    for task in &due {
        let subject = format!("Reminder: Task \"{}\" is due soon", task.title);
        let body = format!(
            "<p>Task <strong>{}</strong> is due on {}.</p>",
            task.title, tomorrow
        );
        match notifier.send(recipient, &subject, &body).await {
            Ok(()) => sent += 1,
            Err(e) => warn!("reminder send failed for task {}: {e}", task.id),
        }
    }

    if !due.is_empty() {
        info!("reminder tick: {} due tomorrow, {} reminders sent", due.len(), sent);
    }
    Ok(sent)
}

/// Run reminder passes forever, once per hour on the hour.
pub async fn run_scheduler(
    db: Arc<dyn Database>,
    notifier: Arc<dyn Notifier>,
    recipient: String,
) {
    loop {
        tokio::time::sleep(until_next_hour(Utc::now())).await;
        if let Err(e) = run_tick(&*db, &*notifier, &recipient, Utc::now()).await {
            error!("reminder tick failed: {e}");
        }
    }
}

fn until_next_hour(now: DateTime<Utc>) -> std::time::Duration {
    let seconds_into_hour = u64::from(now.minute()) * 60 + u64::from(now.second());
    std::time::Duration::from_secs(3600 - seconds_into_hour.min(3599))
}
