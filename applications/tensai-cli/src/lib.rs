//! Tensai CLI Library
//!
//! Headless terminal front end for the playback engine: configuration,
//! a JSON-file persistence provider, a simulated-clock output sink and the
//! stdin command language.
//!
//! This library exposes the components for testing purposes.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod library;
pub mod presenter;
pub mod resolver;
pub mod sink;
pub mod storage;

pub use app::{App, Flow};
pub use commands::Command;
pub use config::{AppConfig, StorageSettings};
pub use error::{CliError, Result};
pub use library::{import_manifest, LibraryStore};
pub use presenter::TerminalPresenter;
pub use resolver::FsResolver;
pub use sink::ClockSink;
pub use storage::JsonFileStore;
