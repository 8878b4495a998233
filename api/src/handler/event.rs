use crate::{
    extractor::AuthorizedUser,
    model::event::{
        CreateEventRequest, EventListQuery, EventResponse, EventSummaryResponse, EventsResponse,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use garde::Validate;
use kernel::model::id::EventId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn register_event(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate(&())?;

    // 受付開始時刻を明示する場合は開催より前でなければならない
    if let Some(open_at) = req.rsvp_open_at {
        if open_at >= req.starts_at {
            return Err(AppError::UnprocessableEntity(
                "rsvpOpenAt must be before startsAt".into(),
            ));
        }
    }

    let event_id = registry
        .event_repository()
        .create(req.into_event(user.id()))
        .await?;

    let snapshot = registry.rsvp_service().snapshot(event_id).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(snapshot))))
}

pub async fn show_event_list(
    Query(query): Query<EventListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventsResponse>> {
    query.validate(&())?;

    let events = registry.event_repository().find_all(query.into()).await?;

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

pub async fn show_event(
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    registry
        .rsvp_service()
        .snapshot(event_id)
        .await
        .map(EventResponse::from)
        .map(Json)
}
