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

//! Shared test helpers used across the Corn crates.
//! Layout: fixtures.rs (temp directories, files with fixed mtimes), mocks.rs (fake engines).

pub mod fixtures;
pub mod mocks;
