#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Process configuration for the Corn archive service.
//!
//! Layout: `model.rs` (typed configuration), `loader.rs` (environment and
//! properties sources), `validate.rs` (value parsing), `defaults.rs`.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigSources, load};
pub use model::{CornConfig, EngineCommand};
