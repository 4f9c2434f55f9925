//! # TurfScout
//!
//! A terminal client for the TurfScout turf listing API.
//!
//! ## Features
//! - Paginated turf browser with infinite scroll
//! - Inline update and delete with local reconciliation
//! - Listing creation with optional image upload
//! - Pull-to-refresh
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine owning the listing store)
//! - Network Layer (Tokio runtime)

pub mod constants;
pub mod config;
pub mod models;
pub mod source;
pub mod store;
pub mod ui;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use models::{Credentials, Turf, TurfDraft, TurfId, TurfPatch};
pub use source::ListingSource;
pub use store::{ListingError, ListingPage, ListingStore, PagedListing};
pub use network::ApiClient;
