mod ids;
mod playlist;
mod settings;
mod track;

pub use ids::{PlaylistId, TrackId};
pub use playlist::Playlist;
pub use settings::{FileMode, Settings};
pub use track::{MediaType, SourceLocator, Track};
