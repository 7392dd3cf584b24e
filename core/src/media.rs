use serde::{Deserialize, Serialize};

/// Genre label used when the provider reports none.
pub const DEFAULT_GENRE: &str = "Music";

/// One roster entry to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistQuery {
    pub name: String,
    pub search_phrase: Option<String>,
}

impl ArtistQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search_phrase: None,
        }
    }

    pub fn with_search_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.search_phrase = Some(phrase.into());
        self
    }

    /// The literal term sent to the track search.
    pub fn search_term(&self) -> &str {
        self.search_phrase.as_deref().unwrap_or(&self.name)
    }
}

/// Best-effort media descriptor for one artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCandidate {
    /// Provider id of the matched track. Only meaningful as a UI key.
    pub artist_id: String,
    pub display_name: String,
    pub genre: String,
    pub track_title: String,
    pub artwork_url: String,
    pub preview_url: Option<String>,
    pub is_video_preview: bool,
    pub video_platform_id: Option<String>,
    /// Name of the video strategy that produced `video_platform_id`.
    pub video_source: Option<String>,
}

impl MediaCandidate {
    /// `is_video_preview` may only be set alongside a preview URL.
    pub fn is_consistent(&self) -> bool {
        !self.is_video_preview || self.preview_url.is_some()
    }
}

/// Accepts a music-video hit when its artist field contains the artist we
/// matched on the song search, ignoring case.
///
/// Stylized names ("The" prefixes, punctuation) can produce false negatives;
/// those simply fall through to the video-platform lookup.
pub fn artist_names_match(found: &str, expected: &str) -> bool {
    found.to_lowercase().contains(&expected.to_lowercase())
}
