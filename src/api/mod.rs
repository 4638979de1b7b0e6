//! Outbound HTTP clients
//!
//! - `primary` - Primary provider addon (tried before any fallback)
//! - `metadata` - Cinemeta-compatible metadata resolver
//! - `index` - Subtitle index search + detail-page resolution

pub mod index;
pub mod metadata;
pub mod primary;

pub use index::{IndexClient, IndexError};
pub use metadata::MetadataClient;
pub use primary::PrimaryClient;
