use crate::database::{model::event::EventRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    event::{
        event::{CreateEvent, EventListOptions},
        Event,
    },
    id::{EventId, UserId},
};
use kernel::repository::event::EventRepository;
use shared::error::{AppError, AppResult};
use uuid::Uuid;

#[derive(new)]
pub struct EventRepositoryImpl {
    db: ConnectionPool,
}

// イベント読み取りの共通 SELECT 句。作成者の表示用情報も一緒に引く
const EVENT_COLUMNS: &str = r#"
    SELECT
        e.event_id,
        e.title,
        e.description,
        e.location,
        e.capacity,
        e.starts_at,
        e.rsvp_open_at,
        e.created_at,
        e.created_by,
        u.user_name AS creator_name,
        u.email AS creator_email
    FROM events AS e
    INNER JOIN users AS u ON e.created_by = u.user_id
"#;

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    // イベントを登録する。ID は Rust 側で生成し、INSERT は一度きり。
    // 挿入後に別クエリで取り直すことはしない
    async fn create(&self, event: CreateEvent) -> AppResult<EventId> {
        let event_id = EventId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO events
                (event_id, title, description, location, capacity, starts_at, rsvp_open_at, created_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event_id.raw())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.capacity)
        .bind(event.starts_at)
        .bind(event.rsvp_open_at)
        .bind(event.created_by.raw())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no event record has been created".into(),
            ));
        }

        Ok(event_id)
    }

    // 開催前のイベントを開催日時順に取得する。
    // search はタイトル・説明・場所のいずれかに対する部分一致
    async fn find_all(&self, options: EventListOptions) -> AppResult<Vec<Event>> {
        let sql = format!(
            r#"{EVENT_COLUMNS}
            WHERE e.starts_at >= now()
              AND ($1::text IS NULL
                   OR e.title ILIKE '%' || $1 || '%'
                   OR e.description ILIKE '%' || $1 || '%'
                   OR e.location ILIKE '%' || $1 || '%')
            ORDER BY e.starts_at ASC
            "#
        );
        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(options.search)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>> {
        let sql = format!("{EVENT_COLUMNS} WHERE e.event_id = $1");
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(event_id.raw())
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Event::from))
    }

    async fn find_upcoming_by_ids(&self, event_ids: &[EventId]) -> AppResult<Vec<Event>> {
        let ids: Vec<Uuid> = event_ids.iter().map(|id| id.raw()).collect();
        let sql = format!(
            r#"{EVENT_COLUMNS}
            WHERE e.event_id = ANY($1)
              AND e.starts_at >= now()
            ORDER BY e.starts_at ASC
            "#
        );
        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn find_by_creator(&self, user_id: UserId) -> AppResult<Vec<Event>> {
        let sql = format!(
            r#"{EVENT_COLUMNS}
            WHERE e.created_by = $1
            ORDER BY e.starts_at ASC
            "#
        );
        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(user_id.raw())
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Event::from).collect())
    }
}
