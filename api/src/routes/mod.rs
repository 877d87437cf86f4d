use axum::Router;

use crate::shared_state::AppState;

mod content;
mod health;
mod links;
mod members;
mod resources;
mod users;

pub fn configure_routes() -> Router<AppState> {
    let api_routes = Router::new()
        .merge(health::configure())
        .merge(users::configure())
        .merge(resources::configure())
        .merge(members::configure())
        .merge(content::configure())
        .merge(links::configure());

    Router::new().nest("/api", api_routes)
}
