#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use melograph_core::{ArtistQuery, MediaCandidate, Roster, RosterConfig};
use melograph_web::error::ProviderError;
use melograph_web::itunes::{Entity, ITunesItem, TrackSearch};
use melograph_web::resolver::{ArtistResolver, Resolver, ResolverSettings};
use melograph_web::video::{VideoChain, VideoSearch};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type SearchReply = Result<Option<ITunesItem>, ProviderError>;

pub enum Scripted {
    Reply(SearchReply),
    /// Never answers within any sane timeout.
    Hang,
}

/// Track search that plays back queued replies per entity. An exhausted
/// script answers `Ok(None)`.
#[derive(Default)]
pub struct ScriptedTracks {
    songs: Mutex<VecDeque<Scripted>>,
    videos: Mutex<VecDeque<Scripted>>,
    song_calls: AtomicUsize,
    video_calls: AtomicUsize,
    terms: Mutex<Vec<(Entity, String)>>,
}

impl ScriptedTracks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn song(self, reply: SearchReply) -> Self {
        self.songs.lock().unwrap().push_back(Scripted::Reply(reply));
        self
    }

    pub fn song_hangs(self) -> Self {
        self.songs.lock().unwrap().push_back(Scripted::Hang);
        self
    }

    pub fn video(self, reply: SearchReply) -> Self {
        self.videos.lock().unwrap().push_back(Scripted::Reply(reply));
        self
    }

    pub fn song_calls(&self) -> usize {
        self.song_calls.load(Ordering::SeqCst)
    }

    pub fn video_calls(&self) -> usize {
        self.video_calls.load(Ordering::SeqCst)
    }

    pub fn terms(&self, entity: Entity) -> Vec<String> {
        self.terms
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == entity)
            .map(|(_, term)| term.clone())
            .collect()
    }

    fn next(&self, entity: Entity, term: &str) -> Option<Scripted> {
        self.terms.lock().unwrap().push((entity, term.to_string()));
        match entity {
            Entity::Song => {
                self.song_calls.fetch_add(1, Ordering::SeqCst);
                self.songs.lock().unwrap().pop_front()
            }
            Entity::MusicVideo => {
                self.video_calls.fetch_add(1, Ordering::SeqCst);
                self.videos.lock().unwrap().pop_front()
            }
        }
    }
}

#[async_trait]
impl TrackSearch for ScriptedTracks {
    async fn search(&self, term: &str, entity: Entity) -> SearchReply {
        let next = self.next(entity, term);
        match next {
            Some(Scripted::Reply(reply)) => reply,
            Some(Scripted::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

/// Video strategy answering the same reply to every query.
pub struct FakeVideo {
    name: String,
    reply: Result<Option<String>, ProviderError>,
    delay: Duration,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl FakeVideo {
    pub fn new(name: &str, reply: Result<Option<String>, ProviderError>) -> Arc<Self> {
        Self::delayed(name, reply, Duration::ZERO)
    }

    pub fn delayed(
        name: &str,
        reply: Result<Option<String>, ProviderError>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            reply,
            delay,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn found(name: &str, video_id: &str) -> Arc<Self> {
        Self::new(name, Ok(Some(video_id.to_string())))
    }

    pub fn empty(name: &str) -> Arc<Self> {
        Self::new(name, Ok(None))
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Self::new(name, Err(ProviderError::Status(503)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSearch for FakeVideo {
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn song(artist: &str, track: &str) -> ITunesItem {
    ITunesItem {
        track_id: Some(1_000_001),
        collection_id: Some(2_000_002),
        artist_name: artist.to_string(),
        track_name: Some(track.to_string()),
        primary_genre_name: Some("Alternative".to_string()),
        artwork_url_100: Some(format!(
            "https://is1-ssl.mzstatic.com/image/thumb/{}/100x100bb.jpg",
            artist.replace(' ', "")
        )),
        preview_url: Some(format!("https://audio.example/{}.m4a", track.replace(' ', "-"))),
    }
}

pub fn music_video(artist: &str, track: &str) -> ITunesItem {
    ITunesItem {
        preview_url: Some(format!("https://video.example/{}.m4v", track.replace(' ', "-"))),
        ..song(artist, track)
    }
}

pub fn roster(artists: &[&str]) -> Roster {
    Roster::from_config(RosterConfig {
        artists: artists.iter().map(|name| name.to_string()).collect(),
        ..Default::default()
    })
    .unwrap()
}

pub fn roster_from_json(json: &str) -> Roster {
    Roster::from_json(json).unwrap()
}

pub fn chain(strategies: Vec<Arc<FakeVideo>>) -> Arc<VideoChain> {
    let mut chain = VideoChain::new(Duration::from_secs(3));
    for strategy in strategies {
        chain.push(Box::new(strategy));
    }
    Arc::new(chain)
}

pub fn resolver(tracks: Arc<ScriptedTracks>, videos: Arc<VideoChain>, roster: Roster) -> Resolver {
    Resolver::new(tracks, videos, Arc::new(roster), ResolverSettings::default())
}

pub fn candidate(name: &str) -> MediaCandidate {
    MediaCandidate {
        artist_id: format!("id-{}", name.to_lowercase()),
        display_name: name.to_string(),
        genre: "Music".to_string(),
        track_title: format!("{name} single"),
        artwork_url: String::new(),
        preview_url: None,
        is_video_preview: false,
        video_platform_id: None,
        video_source: None,
    }
}

/// Resolver with per-artist latency and a set of artists that always fail.
#[derive(Default)]
pub struct StubResolver {
    delays: FxHashMap<String, Duration>,
    failing: FxHashSet<String>,
    default_delay: Duration,
    calls: AtomicUsize,
    completion_order: Mutex<Vec<String>>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completion_order.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtistResolver for StubResolver {
    async fn resolve(&self, query: &ArtistQuery) -> Option<MediaCandidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .delays
            .get(&query.name)
            .copied()
            .unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;
        self.completion_order
            .lock()
            .unwrap()
            .push(query.name.clone());

        if self.failing.contains(&query.name) {
            None
        } else {
            Some(candidate(&query.name))
        }
    }
}

pub fn queries(names: &[&str]) -> Vec<ArtistQuery> {
    names.iter().map(|name| ArtistQuery::new(*name)).collect()
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Records every query string an upstream route receives.
#[derive(Clone, Default)]
pub struct SeenQueries(Arc<Mutex<Vec<FxHashMap<String, String>>>>);

impl SeenQueries {
    pub fn record(&self, params: FxHashMap<String, String>) {
        self.0.lock().unwrap().push(params);
    }

    pub fn all(&self) -> Vec<FxHashMap<String, String>> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}
