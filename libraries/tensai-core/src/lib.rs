//! Tensai Core
//!
//! Domain types and collaborator contracts shared by the Tensai playback
//! engine and its front ends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `Settings` and their ids
//! - **Collaborator Contracts**: `LibraryProvider` (where tracks come from) and
//!   `PersistenceProvider` (where library, playlists and settings are stored)
//! - **In-memory implementations**: `MediaLibrary` and `MemoryStore`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! The playback engine only ever holds `Arc<Track>` references handed out by a
//! `LibraryProvider`; it never copies or mutates track fields.
//!
//! # Example
//!
//! ```rust
//! use tensai_core::{LibraryProvider, MediaLibrary, Track};
//! use std::path::PathBuf;
//!
//! let mut library = MediaLibrary::new();
//! let first = library.add_track(Track::from_path("Intro", PathBuf::from("/music/intro.mp3")));
//! let second = library.add_track(Track::from_path("Outro", PathBuf::from("/music/outro.flac")));
//!
//! // "Play this item now": all items rotated so the chosen one is first
//! let queue = library.rotated_from(&second).unwrap();
//! assert_eq!(queue[0].id, second);
//! assert_eq!(queue[1].id, first);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod library;
pub mod persistence;
pub mod types;

pub use error::{CoreError, Result};
pub use library::{LibraryProvider, MediaLibrary};
pub use persistence::{MemoryStore, PersistenceProvider};
pub use types::{
    FileMode, MediaType, Playlist, PlaylistId, Settings, SourceLocator, Track, TrackId,
};
