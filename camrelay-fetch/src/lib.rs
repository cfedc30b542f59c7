//! # camrelay Fetch
//!
//! The network side of the mirror:
//!
//! - **HttpFetcher**: Bounded-timeout HEAD probes and GET transfers over one
//!   shared HTTP client
//! - **RefreshRunner**: Background loop driving one refresh pass per
//!   interval until cancelled
//!
//! ## Example
//!
//! ```rust,ignore
//! use camrelay_fetch::{FetchConfig, HttpFetcher, RefreshRunner};
//!
//! let fetcher = Arc::new(HttpFetcher::with_config(
//!     FetchConfig::new().probe_timeout(Duration::from_secs(5)),
//! ));
//! let runner = RefreshRunner::new(cache, fetcher, Duration::from_secs(60));
//! let cancel = runner.cancel_token();
//! let handle = runner.spawn();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod http;
mod runner;

pub use http::{FetchConfig, HttpFetcher};
pub use runner::RefreshRunner;
