use crate::error::Result;
use crate::models::notification::Notification;
use reqwest::Client;
use serde_json::json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Durable notification queue. Enqueue writes a pending row; a background
/// worker drains the queue and delivers each row to the configured webhook,
/// retrying with exponential backoff until `max_attempts` is reached.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    client: Client,
    target_url: String,
}

impl NotificationService {
    pub fn new(pool: PgPool, target_url: String) -> Self {
        Self {
            pool,
            client: Client::new(),
            target_url,
        }
    }

    pub async fn enqueue(&self, user_id: Uuid, title: &str, body: &str) -> Result<Notification> {
        let row = sqlx::query_as::<_, Notification>(
            r#"INSERT INTO notifications (id, user_id, title, body, status)
               VALUES ($1, $2, $3, $4, 'pending')
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn deliver_once(&self, notification_id: Uuid) -> Result<()> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"SELECT * FROM notifications WHERE id = $1 AND is_deleted = FALSE"#,
        )
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await?;

        let payload = json!({
            "user_id": notification.user_id,
            "title": notification.title,
            "body": notification.body,
        });

        let res = self
            .client
            .post(&self.target_url)
            .json(&payload)
            .send()
            .await;

        match res {
            Ok(resp) => {
                let status = resp.status().as_u16() as i32;
                let body = resp.text().await.unwrap_or_default();
                sqlx::query(
                    r#"UPDATE notifications
                       SET http_status = $1,
                           response_body = $2,
                           status = CASE WHEN $1 BETWEEN 200 AND 299 THEN 'sent' ELSE 'failed' END,
                           attempts = attempts + 1,
                           updated_at = NOW()
                       WHERE id = $3"#,
                )
                .bind(status)
                .bind(body)
                .bind(notification.id)
                .execute(&self.pool)
                .await?;
            }
            Err(err) => {
                sqlx::query(
                    r#"UPDATE notifications
                       SET response_body = $1, status = 'failed', attempts = attempts + 1, updated_at = NOW()
                       WHERE id = $2"#,
                )
                .bind(format!("{}", err))
                .bind(notification.id)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    /// Pick and deliver one due notification. Returns false when the queue
    /// is empty so the worker can sleep.
    pub async fn run_once(&self) -> Result<bool> {
        let row_opt = sqlx::query(
            r#"SELECT id FROM notifications
               WHERE status = 'pending'
                 AND (next_retry_at IS NULL OR next_retry_at <= NOW())
                 AND is_deleted = FALSE
               ORDER BY created_at ASC
               FOR UPDATE SKIP LOCKED
               LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row_opt else { return Ok(false) };
        let id: Uuid = row.try_get("id")?;

        let _ = self.deliver_once(id).await;

        let row = sqlx::query(
            r#"SELECT attempts, max_attempts, status FROM notifications WHERE id = $1"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        let attempts: i32 = row.try_get("attempts")?;
        let max_attempts: i32 = row.try_get("max_attempts")?;
        let status: String = row.try_get("status")?;

        if status == "failed" && attempts < max_attempts {
            sqlx::query(
                r#"UPDATE notifications
                   SET status = 'pending',
                       next_retry_at = NOW() + make_interval(secs => LEAST(3600, 30 * power(2::float, GREATEST(0, attempts - 1))::int)),
                       updated_at = NOW()
                   WHERE id = $1"#,
            )
            .bind(id)
            .execute(&self.pool)
            .await?;
        }

        Ok(true)
    }
}
