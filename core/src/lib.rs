pub mod artwork;
pub mod media;
pub mod roster;
pub mod string_normalization;

// Re-export commonly used items
pub use artwork::{DEFAULT_ARTWORK_SIZE, upscale_artwork};
pub use media::{ArtistQuery, DEFAULT_GENRE, MediaCandidate, artist_names_match};
pub use roster::{ArtistOverride, ManualCandidate, PinnedVideos, Roster, RosterConfig, RosterError};
