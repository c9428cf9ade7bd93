//! calrss Core Library
//!
//! This library provides core functionality for generating RSS 2.0 feeds
//! from calendar event data: time windowing, access filtering, the
//! day-by-day merge/dedup engine and feed rendering.

pub mod access;
pub mod error;
pub mod feed;
pub mod rss;
pub mod source;
pub mod types;
pub mod window;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{access::*, feed::*, rss::*, source::*, types::*, window::*};
}
