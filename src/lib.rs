//! # Sart
//!
//! Asset inventory and repair ticketing backend, usable both as a standalone
//! binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! sart = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sart::server::{AppState, create_router};
//! use sart::store::{SqliteStore, Store};
//! use sart::types::LocationPath;
//!
//! let store = SqliteStore::new("./data/sart.db").unwrap();
//! store.initialize().unwrap();
//!
//! let path = LocationPath::new("Building 01", "Floor 01", "Area TIC", Some("Technical Support"));
//! let resolved = store.resolve_location(&path).unwrap();
//!
//! let router = create_router(Arc::new(AppState::new(Arc::new(store))));
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `sart` binary. Disable with `default-features = false`.

pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
