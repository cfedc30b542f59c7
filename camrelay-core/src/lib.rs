//! # camrelay Core
//!
//! Core types, errors, and traits for the camrelay snapshot mirror.
//!
//! This crate provides the foundational building blocks used by all other
//! camrelay crates:
//!
//! - **Types**: Domain models for sources, groups, images, and header metadata
//! - **Errors**: Comprehensive error types with context
//! - **Fingerprints**: Content-addressed identity for cached payloads
//! - **Traits**: The fetcher interface the refresh engine works against
//!
//! ## Example
//!
//! ```rust
//! use camrelay_core::{ImageData, fingerprint};
//!
//! let image = ImageData::new("http://origin/a.jpg", bytes::Bytes::from_static(b"jpegdata!"));
//! assert_eq!(image.fingerprint, fingerprint::fingerprint(b"jpegdata!"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod error;
pub mod fingerprint;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{RelayError, Result};
pub use traits::*;
pub use types::*;
