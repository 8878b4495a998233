use crate::model::user::{AttendeeResponse, EventCreatorResponse};
use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    event::{
        event::{CreateEvent, EventListOptions},
        Event, EventWithAttendees,
    },
    id::{EventId, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub description: String,
    #[garde(length(min = 1))]
    pub location: String,
    #[garde(range(min = 1))]
    pub capacity: i32,
    #[garde(skip)]
    pub starts_at: DateTime<Utc>,
    #[garde(skip)]
    pub rsvp_open_at: Option<DateTime<Utc>>,
}

impl CreateEventRequest {
    pub fn into_event(self, created_by: UserId) -> CreateEvent {
        let CreateEventRequest {
            title,
            description,
            location,
            capacity,
            starts_at,
            rsvp_open_at,
        } = self;
        CreateEvent {
            title,
            description,
            location,
            capacity,
            starts_at,
            rsvp_open_at,
            created_by,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    #[garde(skip)]
    pub search: Option<String>,
}

impl From<EventListQuery> for EventListOptions {
    fn from(value: EventListQuery) -> Self {
        let EventListQuery { search } = value;
        EventListOptions { search }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub items: Vec<EventSummaryResponse>,
}

/// 一覧表示用。参加者の一覧は持たず、人数のみを返す
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummaryResponse {
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub capacity: i32,
    pub starts_at: DateTime<Utc>,
    pub rsvp_open_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub creator: EventCreatorResponse,
    pub attendees_count: i64,
}

impl From<(Event, i64)> for EventSummaryResponse {
    fn from((event, attendees_count): (Event, i64)) -> Self {
        let Event {
            event_id,
            title,
            description,
            location,
            capacity,
            starts_at,
            rsvp_open_at,
            created_at,
            creator,
        } = event;
        Self {
            event_id,
            title,
            description,
            location,
            capacity,
            starts_at,
            rsvp_open_at,
            created_at,
            creator: creator.into(),
            attendees_count,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub capacity: i32,
    pub starts_at: DateTime<Utc>,
    pub rsvp_open_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub creator: EventCreatorResponse,
    pub attendees: Vec<AttendeeResponse>,
    pub attendees_count: i64,
}

impl From<EventWithAttendees> for EventResponse {
    fn from(value: EventWithAttendees) -> Self {
        let EventWithAttendees {
            event,
            attendees,
            attendee_count,
        } = value;
        let Event {
            event_id,
            title,
            description,
            location,
            capacity,
            starts_at,
            rsvp_open_at,
            created_at,
            creator,
        } = event;
        Self {
            event_id,
            title,
            description,
            location,
            capacity,
            starts_at,
            rsvp_open_at,
            created_at,
            creator: creator.into(),
            attendees: attendees.into_iter().map(AttendeeResponse::from).collect(),
            attendees_count: attendee_count,
        }
    }
}
