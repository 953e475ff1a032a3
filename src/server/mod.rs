pub mod dto;
mod export;
mod projects;
pub mod response;
mod router;
mod templates;
pub mod validation;
mod value_sets;
mod variables;

pub use router::{AppState, create_router};
