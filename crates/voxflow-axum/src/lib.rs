//! HTTP facade for voxflow.
//!
//! Exposes synthesis as a plain web API for clients that want a finished
//! file rather than live playback: `POST /speak` returns a complete WAV,
//! `GET /status` probes backend reachability, and a bounded FIFO cache
//! short-circuits repeated utterances.

pub mod bootstrap;
pub mod cache;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use bootstrap::{ServerConfig, serve};
pub use cache::SpeechCache;
pub use error::HttpError;
pub use routes::create_router;
pub use state::{AppState, FacadeContext};
