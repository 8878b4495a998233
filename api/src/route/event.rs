use crate::handler::event::{register_event, show_event, show_event_list};
use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

pub fn build_event_routers() -> Router<AppRegistry> {
    let events_routers = Router::new()
        .route("/", post(register_event))
        .route("/", get(show_event_list))
        .route("/:event_id", get(show_event));

    Router::new().nest("/events", events_routers)
}
