mod dto;
pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod services;
pub mod types;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::write_routes()
}
