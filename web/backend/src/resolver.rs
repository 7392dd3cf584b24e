use crate::call::{jitter, with_timeout};
use crate::error::ProviderError;
use crate::itunes::{Entity, ITunesItem, TrackSearch};
use crate::video::VideoChain;
use async_trait::async_trait;
use melograph_core::{
    ArtistQuery, DEFAULT_ARTWORK_SIZE, DEFAULT_GENRE, MediaCandidate, Roster, artist_names_match,
    upscale_artwork,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Pacing and retry rules for the primary track search.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts in total, across rate-limit and network retries.
    pub max_attempts: u32,
    /// Delay before attempt `n` is `pacing_base * n + jitter(pacing_jitter)`.
    pub pacing_base: Duration,
    pub pacing_jitter: Duration,
    /// After a 429/403 on attempt `n`, wait `rate_limit_backoff * n`.
    pub rate_limit_backoff: Duration,
    pub network_retry_delay: Duration,
    /// How many network/timeout failures get a retry.
    pub network_retries: u32,
    /// Timeout for attempt `n` is `attempt_timeout + timeout_step * (n - 1)`.
    pub attempt_timeout: Duration,
    pub timeout_step: Duration,
}

impl RetryPolicy {
    pub fn pacing_delay(&self, attempt: u32) -> Duration {
        self.pacing_base * attempt + jitter(self.pacing_jitter)
    }

    pub fn timeout_for(&self, attempt: u32) -> Duration {
        self.attempt_timeout + self.timeout_step * attempt.saturating_sub(1)
    }

    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        self.rate_limit_backoff * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pacing_base: Duration::from_millis(500),
            pacing_jitter: Duration::from_millis(200),
            rate_limit_backoff: Duration::from_millis(2000),
            network_retry_delay: Duration::from_millis(1000),
            network_retries: 1,
            attempt_timeout: Duration::from_secs(5),
            timeout_step: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub retry: RetryPolicy,
    pub video_preview_timeout: Duration,
    pub video_preview_jitter: Duration,
    pub artwork_size: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            video_preview_timeout: Duration::from_secs(3),
            video_preview_jitter: Duration::from_millis(50),
            artwork_size: DEFAULT_ARTWORK_SIZE,
        }
    }
}

/// How step 1 ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackLookup {
    Found(ITunesItem),
    /// The search answered, with no hit.
    NoMatch,
    /// Retries ran out or the provider failed for good.
    GaveUp,
}

/// Per-artist lookup. Never fails; `None` means nothing usable was found.
#[async_trait]
pub trait ArtistResolver: Send + Sync {
    async fn resolve(&self, query: &ArtistQuery) -> Option<MediaCandidate>;
}

pub struct Resolver {
    tracks: Arc<dyn TrackSearch>,
    videos: Arc<VideoChain>,
    roster: Arc<Roster>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        tracks: Arc<dyn TrackSearch>,
        videos: Arc<VideoChain>,
        roster: Arc<Roster>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            tracks,
            videos,
            roster,
            settings,
        }
    }

    /// Step 1: song search with pacing, rate-limit backoff and one network retry.
    pub async fn find_track(&self, query: &ArtistQuery) -> TrackLookup {
        let policy = &self.settings.retry;
        let term = query.search_term();
        let mut attempt = 0;
        let mut network_retries = 0;

        while attempt < policy.max_attempts {
            attempt += 1;
            sleep(policy.pacing_delay(attempt)).await;

            let outcome = with_timeout(
                policy.timeout_for(attempt),
                self.tracks.search(term, Entity::Song),
            )
            .await;

            match outcome.into_result() {
                Ok(Some(track)) => return TrackLookup::Found(track),
                Ok(None) => return TrackLookup::NoMatch,
                Err(ProviderError::RateLimited(status)) => {
                    warn!(artist = %query.name, status, attempt, "track search rate limited");
                    if attempt < policy.max_attempts {
                        sleep(policy.rate_limit_delay(attempt)).await;
                    }
                }
                Err(err) if err.is_transient() && network_retries < policy.network_retries => {
                    network_retries += 1;
                    warn!(
                        artist = %query.name,
                        error = %err,
                        attempt,
                        "track search failed, retrying"
                    );
                    sleep(policy.network_retry_delay).await;
                }
                Err(err) => {
                    warn!(artist = %query.name, error = %err, attempt, "track search failed");
                    return TrackLookup::GaveUp;
                }
            }
        }

        warn!(artist = %query.name, attempts = attempt, "track search gave up");
        TrackLookup::GaveUp
    }

    /// Step 2: native music-video preview for the matched track.
    async fn find_video_preview(&self, track: &ITunesItem) -> Option<String> {
        let title = track.track_name.as_deref()?;
        let term = format!("{} {}", track.artist_name, title);
        sleep(jitter(self.settings.video_preview_jitter)).await;

        let outcome = with_timeout(
            self.settings.video_preview_timeout,
            self.tracks.search(&term, Entity::MusicVideo),
        )
        .await;

        match outcome.into_result() {
            Ok(Some(video)) if artist_names_match(&video.artist_name, &track.artist_name) => {
                video.preview_url
            }
            Ok(Some(video)) => {
                debug!(
                    expected = %track.artist_name,
                    found = %video.artist_name,
                    "music video belongs to another artist"
                );
                None
            }
            Ok(None) => None,
            Err(err) => {
                debug!(term = %term, error = %err, "music video search failed");
                None
            }
        }
    }

    fn candidate_from_track(&self, query: &ArtistQuery, track: &ITunesItem) -> MediaCandidate {
        MediaCandidate {
            artist_id: track.provider_id().unwrap_or_default(),
            display_name: query.name.clone(),
            genre: track
                .primary_genre_name
                .clone()
                .filter(|genre| !genre.is_empty())
                .unwrap_or_else(|| DEFAULT_GENRE.to_string()),
            track_title: track.track_name.clone().unwrap_or_default(),
            artwork_url: track
                .artwork_url_100
                .as_deref()
                .map(|url| upscale_artwork(url, self.settings.artwork_size))
                .unwrap_or_default(),
            preview_url: track.preview_url.clone(),
            is_video_preview: false,
            video_platform_id: None,
            video_source: None,
        }
    }
}

#[async_trait]
impl ArtistResolver for Resolver {
    async fn resolve(&self, query: &ArtistQuery) -> Option<MediaCandidate> {
        let track = match self.find_track(query).await {
            TrackLookup::Found(track) => track,
            TrackLookup::NoMatch => {
                // Step 4: literal fallback for names the catalog doesn't know.
                let manual = self.roster.manual_candidate(&query.name);
                match &manual {
                    Some(_) => info!(artist = %query.name, "using manual entry"),
                    None => info!(artist = %query.name, "no track found"),
                }
                return manual;
            }
            TrackLookup::GaveUp => return None,
        };

        let mut candidate = self.candidate_from_track(query, &track);

        if let Some(video_preview) = self.find_video_preview(&track).await {
            candidate.preview_url = Some(video_preview);
            candidate.is_video_preview = true;
        }

        // Step 3: video-platform fallback.
        if !candidate.is_video_preview || self.roster.forces_video_fallback(&query.name) {
            let artist = if track.artist_name.is_empty() {
                query.name.as_str()
            } else {
                track.artist_name.as_str()
            };
            let phrase = format!(
                "{} {} official music video",
                artist,
                track.track_name.as_deref().unwrap_or_default()
            );

            if let Some(found) = self.videos.find(&phrase).await {
                candidate.video_platform_id = Some(found.video_id);
                candidate.video_source = Some(found.source);
                // The platform embed replaces the native clip.
                candidate.is_video_preview = false;
                candidate.preview_url = track.preview_url.clone();
            }
        }

        info!(
            artist = %query.name,
            track = %candidate.track_title,
            video = candidate.is_video_preview,
            "resolved"
        );
        Some(candidate)
    }
}
