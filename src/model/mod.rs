//! Core data model for the crawl pipeline
//!
//! # Components
//!
//! - `Platform` / `Category`: closed tags selecting the remote hub and item kind
//! - `Source`: one resolved crawl request
//! - `FetchResult`: one item's outcome, written to exactly one output log

mod platform;
mod record;
mod source;

pub use platform::{Category, Platform};
pub use record::{today, FetchResult, ItemStats};
pub use source::Source;
