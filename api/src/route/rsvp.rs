use crate::handler::rsvp::{attending_event_list, cancel_rsvp, created_event_list, rsvp_event};
use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

pub fn build_rsvp_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/events/:event_id/rsvp", post(rsvp_event).delete(cancel_rsvp))
        .route("/rsvps/user", get(attending_event_list))
        .route("/rsvps/user/created", get(created_event_list))
}
