use kernel::model::{event::Event, user::EventCreator};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// events テーブルと users テーブルを JOIN して取得する際に使う型
#[derive(sqlx::FromRow)]
pub struct EventRow {
    pub event_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub capacity: i32,
    pub starts_at: DateTime<Utc>,
    pub rsvp_open_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub creator_name: String,
    pub creator_email: String,
}

impl From<EventRow> for Event {
    fn from(value: EventRow) -> Self {
        let EventRow {
            event_id,
            title,
            description,
            location,
            capacity,
            starts_at,
            rsvp_open_at,
            created_at,
            created_by,
            creator_name,
            creator_email,
        } = value;
        Event {
            event_id: event_id.into(),
            title,
            description,
            location,
            capacity,
            starts_at,
            rsvp_open_at,
            created_at,
            creator: EventCreator {
                user_id: created_by.into(),
                user_name: creator_name,
                email: creator_email,
            },
        }
    }
}
