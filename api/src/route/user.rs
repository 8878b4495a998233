use crate::handler::user::{register_user, show_current_user};
use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

pub fn build_user_routers() -> Router<AppRegistry> {
    let users_routers = Router::new()
        .route("/", post(register_user))
        .route("/me", get(show_current_user));

    Router::new().nest("/users", users_routers)
}
