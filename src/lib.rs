//! # Confgen
//!
//! A configuration template server, usable both as a standalone binary and as a library.
//!
//! Projects group config templates; each template declares variables through
//! `{{ placeholder }}` references in its content, and template value sets bind
//! per-host values to those variables to render device configurations.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! confgen = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use confgen::server::{AppState, create_router};
//! use confgen::store::SqliteStore;
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/confgen.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState {
//!     store: Arc::new(store),
//!     export_dir: PathBuf::from("./data/export"),
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the binary's CLI argument parsing. Disable with
//!   `default-features = false`.

pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod template;
pub mod types;
