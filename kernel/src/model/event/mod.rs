use crate::model::{id::EventId, user::EventCreator};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct Event {
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub capacity: i32,
    pub starts_at: DateTime<Utc>,
    /// 明示的な受付開始時刻。未設定の場合は created_at + 受付開始遅延が使われる
    pub rsvp_open_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub creator: EventCreator,
}

/// 参加者情報込みのイベントのスナップショット。
/// 表示専用であり、参加可否の判定には使わない。
#[derive(Debug)]
pub struct EventWithAttendees {
    pub event: Event,
    pub attendees: Vec<crate::model::user::Attendee>,
    pub attendee_count: i64,
}
