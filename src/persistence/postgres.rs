//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{DigestSource, Store};
use crate::config::ServerConfig;
use crate::domain::{
    ActivityRow, Developer, DeveloperAccount, DeveloperId, DigestWindow, Message, MessagePayload,
    NewDeveloper, NewMessage, NewThankYou, PreferenceUpdate, Project, ProjectId, ProjectName,
    SummaryFrequency, ThankYouClick, ThankYouPayload,
};
use crate::error::AppError;

const DEVELOPER_COLUMNS: &str = "id, username, email, instant_messages, instant_thank_you, \
                                 summary_frequency, last_summary_sent";

type DeveloperTuple = (i64, String, String, bool, bool, String, DateTime<Utc>);
type ActivityTuple<T> = (i64, String, String, i64, String, i64, String, T, DateTime<Utc>);

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from the configuration and applies the
    /// bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the database cannot be
    /// reached or a migration fails.
    pub async fn connect(config: &ServerConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("migration failed: {e}")))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "database pool ready"
        );
        Ok(Self::new(pool))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

fn developer_from_tuple(row: DeveloperTuple) -> Result<Developer, AppError> {
    let (id, username, email, instant_messages, instant_thank_you, frequency, last_summary_sent) =
        row;
    let summary_frequency: SummaryFrequency = frequency
        .parse()
        .map_err(|_| AppError::Internal(format!("corrupt summary_frequency '{frequency}'")))?;
    Ok(Developer {
        id: DeveloperId::new(id),
        username,
        email,
        instant_messages,
        instant_thank_you,
        summary_frequency,
        last_summary_sent,
    })
}

fn activity_from_tuple<T, P>(row: ActivityTuple<T>, payload: impl FnOnce(T) -> P) -> ActivityRow<P> {
    let (dev_id, username, email, project_id, project_name, item_id, author_id, value, timestamp) =
        row;
    ActivityRow {
        developer_id: DeveloperId::new(dev_id),
        developer_username: username,
        developer_email: email,
        project_id: ProjectId::new(project_id),
        project_name,
        item_id,
        author_id,
        payload: payload(value),
        timestamp,
    }
}

/// Joined digest query over one feedback table, aliased `i`. Binds:
/// `$1` horizon, `$2` daily cadence cutoff, `$3` weekly cadence cutoff,
/// `$4` reference time of the run.
fn digest_query(table: &str, payload_column: &str) -> String {
    format!(
        "SELECT d.id, d.username, d.email, p.id, p.name, i.id, i.user_id, i.{payload_column}, i.timestamp \
         FROM developers d \
         JOIN projects p ON p.developer_id = d.id \
         JOIN {table} i ON i.project_id = p.id \
         WHERE d.summary_frequency <> 'none' \
           AND i.timestamp > $1 \
           AND i.timestamp > d.last_summary_sent \
           AND i.timestamp <= $4 \
           AND ($2::timestamptz IS NULL OR d.summary_frequency <> 'daily' OR d.last_summary_sent < $2) \
           AND ($3::timestamptz IS NULL OR d.summary_frequency <> 'weekly' OR d.last_summary_sent < $3) \
         ORDER BY d.id, p.id, i.timestamp DESC, i.id DESC"
    )
}

#[async_trait]
impl Store for PostgresStore {
    async fn create_developer(&self, new: NewDeveloper) -> Result<Developer, AppError> {
        let sql = format!(
            "INSERT INTO developers (username, email, hashed_password, last_summary_sent) \
             VALUES ($1, $2, $3, $4) RETURNING {DEVELOPER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DeveloperTuple>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.hashed_password)
            .bind(new.registered_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::UsernameTaken(new.username.clone())
                } else {
                    AppError::from(e)
                }
            })?;
        developer_from_tuple(row)
    }

    async fn developer_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DeveloperAccount>, AppError> {
        let sql = format!(
            "SELECT {DEVELOPER_COLUMNS}, hashed_password FROM developers WHERE username = $1"
        );
        let row = sqlx::query_as::<_, (i64, String, String, bool, bool, String, DateTime<Utc>, String)>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(
            |(id, username, email, im, ity, freq, last, hashed_password)| -> Result<_, AppError> {
                Ok(DeveloperAccount {
                    developer: developer_from_tuple((id, username, email, im, ity, freq, last))?,
                    hashed_password,
                })
            },
        )
        .transpose()
    }

    async fn developer_by_id(&self, id: DeveloperId) -> Result<Option<Developer>, AppError> {
        let sql = format!("SELECT {DEVELOPER_COLUMNS} FROM developers WHERE id = $1");
        let row = sqlx::query_as::<_, DeveloperTuple>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.map(developer_from_tuple).transpose()
    }

    async fn update_preferences(
        &self,
        id: DeveloperId,
        update: PreferenceUpdate,
    ) -> Result<Developer, AppError> {
        let sql = format!(
            "UPDATE developers SET \
                 instant_messages = COALESCE($2, instant_messages), \
                 instant_thank_you = COALESCE($3, instant_thank_you), \
                 summary_frequency = COALESCE($4, summary_frequency) \
             WHERE id = $1 RETURNING {DEVELOPER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DeveloperTuple>(&sql)
            .bind(id.get())
            .bind(update.instant_messages)
            .bind(update.instant_thank_you)
            .bind(update.summary_frequency.map(SummaryFrequency::as_str))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::DeveloperNotFound(id))?;
        developer_from_tuple(row)
    }

    async fn mark_summary_sent(
        &self,
        id: DeveloperId,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE developers SET last_summary_sent = GREATEST(last_summary_sent, $2) WHERE id = $1",
        )
        .bind(id.get())
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::DeveloperNotFound(id));
        }
        Ok(())
    }

    async fn create_project(
        &self,
        developer_id: DeveloperId,
        name: &ProjectName,
    ) -> Result<Project, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO projects (name, developer_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(name.as_str())
        .bind(developer_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::ProjectNameTaken(name.to_string())
            } else {
                AppError::from(e)
            }
        })?;

        Ok(Project {
            id: ProjectId::new(id),
            name: name.to_string(),
            developer_id,
        })
    }

    async fn project_by_id(&self, id: ProjectId) -> Result<Option<Project>, AppError> {
        let row = sqlx::query_as::<_, (i64, String, i64)>(
            "SELECT id, name, developer_id FROM projects WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, developer_id)| Project {
            id: ProjectId::new(id),
            name,
            developer_id: DeveloperId::new(developer_id),
        }))
    }

    async fn project_by_name(
        &self,
        developer_id: DeveloperId,
        name: &str,
    ) -> Result<Option<Project>, AppError> {
        let row = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM projects WHERE developer_id = $1 AND name = $2",
        )
        .bind(developer_id.get())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|id| Project {
            id: ProjectId::new(id),
            name: name.to_string(),
            developer_id,
        }))
    }

    async fn projects_for_developer(
        &self,
        developer_id: DeveloperId,
    ) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, name FROM projects WHERE developer_id = $1 ORDER BY id",
        )
        .bind(developer_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Project {
                id: ProjectId::new(id),
                name,
                developer_id,
            })
            .collect())
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO messages (project_id, user_id, content, timestamp) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(new.project_id.get())
        .bind(&new.user_id)
        .bind(&new.content)
        .bind(new.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(Message {
            id,
            project_id: new.project_id,
            user_id: new.user_id,
            content: new.content,
            timestamp: new.timestamp,
        })
    }

    async fn insert_thank_you(&self, new: NewThankYou) -> Result<ThankYouClick, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO thank_you_clicks (project_id, user_id, count, timestamp) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(new.project_id.get())
        .bind(&new.user_id)
        .bind(new.count)
        .bind(new.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(ThankYouClick {
            id,
            project_id: new.project_id,
            user_id: new.user_id,
            count: new.count,
            timestamp: new.timestamp,
        })
    }

    async fn total_clicks(&self, project_id: ProjectId) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(count), 0)::BIGINT FROM thank_you_clicks WHERE project_id = $1",
        )
        .bind(project_id.get())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn message_contents(&self, project_id: ProjectId) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT content FROM messages WHERE project_id = $1 ORDER BY timestamp, id",
        )
        .bind(project_id.get())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent_messages(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, (i64, String, String, DateTime<Utc>)>(
            "SELECT id, user_id, content, timestamp FROM messages \
             WHERE project_id = $1 ORDER BY timestamp DESC, id DESC LIMIT $2",
        )
        .bind(project_id.get())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, user_id, content, timestamp)| Message {
                id,
                project_id,
                user_id,
                content,
                timestamp,
            })
            .collect())
    }

    async fn recent_thank_yous(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<ThankYouClick>, AppError> {
        let rows = sqlx::query_as::<_, (i64, String, i32, DateTime<Utc>)>(
            "SELECT id, user_id, count, timestamp FROM thank_you_clicks \
             WHERE project_id = $1 ORDER BY timestamp DESC, id DESC LIMIT $2",
        )
        .bind(project_id.get())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, user_id, count, timestamp)| ThankYouClick {
                id,
                project_id,
                user_id,
                count,
                timestamp,
            })
            .collect())
    }
}

#[async_trait]
impl DigestSource for PostgresStore {
    async fn unsent_message_rows(
        &self,
        window: &DigestWindow,
    ) -> Result<Vec<ActivityRow<MessagePayload>>, AppError> {
        let sql = digest_query("messages", "content");
        let rows = sqlx::query_as::<_, ActivityTuple<String>>(&sql)
            .bind(window.horizon)
            .bind(window.cadence_cutoff(SummaryFrequency::Daily))
            .bind(window.cadence_cutoff(SummaryFrequency::Weekly))
            .bind(window.now)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| activity_from_tuple(row, |content| MessagePayload { content }))
            .collect())
    }

    async fn unsent_thank_you_rows(
        &self,
        window: &DigestWindow,
    ) -> Result<Vec<ActivityRow<ThankYouPayload>>, AppError> {
        let sql = digest_query("thank_you_clicks", "count");
        let rows = sqlx::query_as::<_, ActivityTuple<i32>>(&sql)
            .bind(window.horizon)
            .bind(window.cadence_cutoff(SummaryFrequency::Daily))
            .bind(window.cadence_cutoff(SummaryFrequency::Weekly))
            .bind(window.now)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| activity_from_tuple(row, |count| ThankYouPayload { count }))
            .collect())
    }
}
