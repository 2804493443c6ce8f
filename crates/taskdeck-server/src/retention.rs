use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use taskdeck_db::{Database, TASK_RETENTION_DAYS};
use tracing::{error, info};

/// Background task that purges rows past their retention window.
///
/// SQLite has no TTL index, so expiry is enforced by a periodic sweep:
/// any task whose expire_at is older than the retention cutoff is
/// deleted. expire_at is fixed at creation time and never refreshed by
/// updates, so a task disappears seven days after it was created.
pub async fn run_retention_sweep(db: Arc<dyn Database>, scan_interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(scan_interval_secs));
    loop {
        ticker.tick().await;
        if let Err(e) = sweep_once(&*db).await {
            error!("retention sweep error: {e}");
        }
    }
}

async fn sweep_once(db: &dyn Database) -> Result<(), taskdeck_db::DbError> {
    let cutoff = Utc::now() - chrono::Duration::days(TASK_RETENTION_DAYS);
    let removed = db.purge_expired_tasks(cutoff).await?;
    if removed > 0 {
        info!("retention sweep removed {removed} expired tasks");
    }
    Ok(())
}
