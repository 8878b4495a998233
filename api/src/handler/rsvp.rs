use crate::{
    extractor::AuthorizedUser,
    model::event::{EventResponse, EventSummaryResponse, EventsResponse},
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use kernel::model::{event::Event, id::EventId};
use registry::AppRegistry;
use shared::error::AppResult;

/// イベントへの参加登録。
/// 受付可否の判定と書き込みはすべて RsvpService 側で行う
pub async fn rsvp_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    registry
        .rsvp_service()
        .try_reserve(event_id, user.id(), Utc::now())
        .await
        .map(EventResponse::from)
        .map(Json)
}

pub async fn cancel_rsvp(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    registry
        .rsvp_service()
        .cancel(event_id, user.id())
        .await
        .map(EventResponse::from)
        .map(Json)
}

// 自分が参加予定のイベント一覧（開催前のもののみ）
pub async fn attending_event_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventsResponse>> {
    let event_ids = registry
        .rsvp_repository()
        .find_event_ids_by_user_id(user.id())
        .await?;
    let events = registry
        .event_repository()
        .find_upcoming_by_ids(&event_ids)
        .await?;

    summarize(&registry, events).await
}

// 自分が作成したイベント一覧
pub async fn created_event_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventsResponse>> {
    let events = registry
        .event_repository()
        .find_by_creator(user.id())
        .await?;

    summarize(&registry, events).await
}

async fn summarize(registry: &AppRegistry, events: Vec<Event>) -> AppResult<Json<EventsResponse>> {
    let mut items = Vec::with_capacity(events.len());
    for event in events {
        let count = registry
            .rsvp_repository()
            .count_by_event_id(event.event_id)
            .await?;
        items.push(EventSummaryResponse::from((event, count)));
    }
    Ok(Json(EventsResponse { items }))
}
