//! Suivi API client
//!
//! Typed access to the project tracking REST API:
//! - [`TrackingApi`]: the operations screens depend on
//! - [`HttpTrackingApi`]: the reqwest implementation
//! - [`SessionContext`]: explicit signed-in identity (token, user, claims)
//!
//! # Example
//!
//! ```rust,ignore
//! use suivi_api::{ApiConfig, HttpTrackingApi, TrackingApi};
//!
//! let config = ApiConfig::new().with_base_url("https://suivi.example.org/api");
//! let session = HttpTrackingApi::login(&config, "M042", "secret").await?;
//! let api = HttpTrackingApi::new(&config, session)?;
//! let phases = api.list_phases().await?;
//! println!("{} phases, {} skipped", phases.items.len(), phases.skipped);
//! ```

#![warn(unreachable_pub)]

mod client;
mod error;
mod http;
mod session;

pub use client::{endpoints, ApiConfig, TrackingApi};
pub use error::{ApiError, SessionError};
pub use http::HttpTrackingApi;
pub use session::{Claims, SessionContext};
