//! Async client for the Jules API: sessions, their activities, and the
//! source repositories they run against.
//!
//! ```no_run
//! use jules::{CancellationToken, Client, CreateSessionRequest};
//! use std::time::Duration;
//!
//! # async fn demo() -> jules::Result<()> {
//! let client = Client::new(std::env::var("JULES_API_KEY").unwrap_or_default());
//! let session = client
//!     .sessions()
//!     .create(CreateSessionRequest::new("Fix the flaky test", "sources/github/acme/widgets"))
//!     .await?;
//!
//! let done = client
//!     .sessions()
//!     .wait_for_completion(&session.id, Duration::from_secs(10), &CancellationToken::new())
//!     .await?;
//! println!("{}: {}", done.id, done.state);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod activities;
pub mod cli;
mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod page;
pub mod sessions;
pub mod sources;
pub mod types;

pub use activities::{Activities, ActivityList};
pub use client::Client;
pub use error::{Error, Result};
pub use page::{Page, PageRequest};
pub use sessions::{CreateSessionRequest, DEFAULT_POLL_INTERVAL, SessionList, Sessions};
pub use sources::{SourceList, Sources};
pub use tokio_util::sync::CancellationToken;
pub use types::*;
