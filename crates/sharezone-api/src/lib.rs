pub mod auth;
pub mod error;
pub mod history;
pub mod messages;
pub mod middleware;

use axum::{
    Router,
    routing::{get, post},
};

use crate::auth::AppState;
use crate::middleware::require_auth;

/// Every messaging route, behind bearer authentication.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/messages", post(messages::send_message))
        .route("/messages/recipients", get(messages::list_recipients))
        .route("/messages/inbox", get(messages::list_inbox))
        .route("/messages/unread", get(messages::unread_count))
        .route("/messages/history", get(history::full_history).post(history::filtered_history))
        .route("/messages/{message_id}/reply", post(messages::reply))
        .route(
            "/messages/{message_id}/delete",
            get(messages::preview_delete)
                .post(messages::confirm_delete)
                .delete(messages::cancel_delete),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
