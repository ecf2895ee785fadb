use chrono::NaiveDateTime;
use sqlx::SqlitePool;

/// Fire-and-forget notification sink. Delivery (bell UI, push, ...) is
/// someone else's problem; this just records the event. Failures are
/// logged and never propagated into reconciliation.
pub struct Notifier {
    pool: SqlitePool,
}

pub struct NotifyRequest<'a> {
    pub kind: &'a str,
    pub title: &'a str,
    pub message: String,
    pub employee_id: Option<i64>,
    pub actor: Option<&'a str>,
    pub deep_link: Option<String>,
    /// Stable key; a second emission with the same key is a no-op.
    pub dedup_key: Option<String>,
}

impl Notifier {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn notify(&self, req: NotifyRequest<'_>, at: NaiveDateTime) {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO notifications \
             (kind, title, message, employee_id, actor, deep_link, dedup_key, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(req.kind)
        .bind(req.title)
        .bind(&req.message)
        .bind(req.employee_id)
        .bind(req.actor)
        .bind(&req.deep_link)
        .bind(&req.dedup_key)
        .bind(at)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, kind = req.kind, "Notification write failed");
        }
    }
}
