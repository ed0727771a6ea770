//! # qa-api
//!
//! The HTTP command surface and WebSocket event fan-out for the forum.

pub mod handlers;
pub mod middleware;
pub mod socket;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

pub use handlers::{ApiError, AppState};

/// Builds the router with every command route and the event socket.
///
/// # Developer Note
/// Route paths mirror the command names the browser client already uses,
/// so the binary can mount the router at the root.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/comment/addComment", post(handlers::add_comment))
        .route("/answer/addAnswer", post(handlers::add_answer))
        .route("/question/addQuestion", post(handlers::add_question))
        .route("/question/upvoteQuestion", post(handlers::upvote_question))
        .route("/question/downvoteQuestion", post(handlers::downvote_question))
        .route("/question/getQuestionById/{qid}", get(handlers::get_question))
        .route("/socket", get(socket::socket_handler))
        .layer(middleware::trace_layer())
        .layer(cors)
        .with_state(state)
}
