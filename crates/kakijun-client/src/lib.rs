//! HTTP access to the kanji backend and the query fallback logic.

pub mod api;
pub mod dispatcher;
pub mod error;
pub mod policy;

pub use api::{Endpoint, HttpKanjiApi, KanjiApi};
pub use dispatcher::{DispatchOutcome, QueryDispatcher};
pub use error::ApiError;
pub use policy::{FallbackPolicy, FallbackStep};
