use crate::model::id::UserId;
use chrono::{DateTime, Utc};
use derive_new::new;

#[derive(new)]
pub struct CreateEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub capacity: i32,
    pub starts_at: DateTime<Utc>,
    pub rsvp_open_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
}

pub struct EventListOptions {
    pub search: Option<String>,
}
