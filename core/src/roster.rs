//! The configured list of artists and the lookup tables that patch over
//! providers' blind spots for specific names.

use crate::media::{ArtistQuery, MediaCandidate};
use crate::string_normalization::{clean_str, contains_clean};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const BUILTIN_ROSTER: &str = include_str!("../data/roster.json");

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster has no artists")]
    Empty,
    #[error("roster entry {0} has a blank name")]
    BlankName(usize),
    #[error("artist '{0}' is listed more than once")]
    Duplicate(String),
    #[error("pinned video for '{0}' has an empty id")]
    EmptyVideoId(String),
    #[error("failed to read roster file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Literal entry served when the track search finds nothing for an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCandidate {
    pub artist_id: String,
    pub genre: String,
    pub track_title: String,
    pub artwork_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistOverride {
    #[serde(default)]
    pub search_phrase: Option<String>,
    /// Always consult the video platform, even after a native video match.
    #[serde(default)]
    pub force_video_fallback: bool,
    #[serde(default)]
    pub manual: Option<ManualCandidate>,
}

/// On-disk roster shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterConfig {
    pub artists: Vec<String>,
    #[serde(default)]
    pub overrides: BTreeMap<String, ArtistOverride>,
    #[serde(default)]
    pub pinned_videos: BTreeMap<String, String>,
}

/// Hard-coded video ids keyed by a query fragment.
#[derive(Debug, Clone, Default)]
pub struct PinnedVideos {
    // Longest fragment first so "frank ocean pink" beats a bare "frank ocean".
    entries: Vec<(String, String)>,
}

impl PinnedVideos {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(fragment, id)| (clean_str(fragment.as_ref()), id.into()))
            .filter(|(fragment, _)| !fragment.is_empty())
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    pub fn lookup(&self, query: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(fragment, _)| contains_clean(query, fragment))
            .map(|(_, id)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Roster {
    artists: Vec<String>,
    overrides: FxHashMap<String, ArtistOverride>,
    pinned_videos: PinnedVideos,
}

impl Roster {
    pub fn from_config(config: RosterConfig) -> Result<Self, RosterError> {
        if config.artists.is_empty() {
            return Err(RosterError::Empty);
        }

        let mut seen = FxHashSet::default();
        let mut artists = Vec::with_capacity(config.artists.len());
        for (index, name) in config.artists.into_iter().enumerate() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(RosterError::BlankName(index));
            }
            if !seen.insert(clean_str(&name)) {
                return Err(RosterError::Duplicate(name));
            }
            artists.push(name);
        }

        if let Some((fragment, _)) = config
            .pinned_videos
            .iter()
            .find(|(_, id)| id.trim().is_empty())
        {
            return Err(RosterError::EmptyVideoId(fragment.clone()));
        }

        let overrides = config
            .overrides
            .into_iter()
            .map(|(name, entry)| (clean_str(&name), entry))
            .collect();

        Ok(Self {
            artists,
            overrides,
            pinned_videos: PinnedVideos::new(config.pinned_videos),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let config: RosterConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// The roster shipped with the crate.
    pub fn builtin() -> Result<Self, RosterError> {
        Self::from_json(BUILTIN_ROSTER)
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    pub fn override_for(&self, name: &str) -> Option<&ArtistOverride> {
        self.overrides.get(&clean_str(name))
    }

    /// Queries in roster order, with search-phrase overrides applied.
    pub fn queries(&self) -> Vec<ArtistQuery> {
        self.artists
            .iter()
            .map(|name| {
                let query = ArtistQuery::new(name.clone());
                match self
                    .override_for(name)
                    .and_then(|entry| entry.search_phrase.as_ref())
                {
                    Some(phrase) => query.with_search_phrase(phrase.clone()),
                    None => query,
                }
            })
            .collect()
    }

    pub fn forces_video_fallback(&self, name: &str) -> bool {
        self.override_for(name)
            .is_some_and(|entry| entry.force_video_fallback)
    }

    pub fn manual_candidate(&self, name: &str) -> Option<MediaCandidate> {
        let manual = self.override_for(name)?.manual.as_ref()?;
        Some(MediaCandidate {
            artist_id: manual.artist_id.clone(),
            display_name: name.to_string(),
            genre: manual.genre.clone(),
            track_title: manual.track_title.clone(),
            artwork_url: manual.artwork_url.clone(),
            preview_url: None,
            is_video_preview: false,
            video_platform_id: None,
            video_source: None,
        })
    }

    pub fn pinned_videos(&self) -> &PinnedVideos {
        &self.pinned_videos
    }
}
