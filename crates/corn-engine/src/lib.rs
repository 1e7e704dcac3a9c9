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

//! Boundary to the external generation engine.
//!
//! The engine interprets a request and writes files into a target workspace;
//! this crate only defines how the service talks to it.
//!
//! Layout: `model.rs` (request and diagnostics), `engine.rs` (collaborator
//! traits), `command.rs` (process-backed engine), `data.rs` (JSON loader).

pub mod command;
pub mod data;
pub mod engine;
pub mod error;
pub mod model;

pub use command::CommandEngine;
pub use data::JsonFileLoader;
pub use engine::{DataLoader, GenerationEngine};
pub use error::{EngineError, EngineResult};
pub use model::{GenerationRequest, ScriptDiagnostic};
