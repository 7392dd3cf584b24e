use crate::cache::CacheGate;
use crate::cache::clock::SystemClock;
use crate::cache::storage::FileSnapshotStore;
use crate::catalog::ArtistCatalog;
use crate::charts::ChartClient;
use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::itunes::ITunesClient;
use crate::news::NewsClient;
use crate::resolver::{Resolver, ResolverSettings};
use crate::scheduler::{Scheduler, SchedulerSettings};
use crate::video::{InvidiousSearch, PinnedVideoSearch, VideoChain, YouTubeSearch};
use melograph_core::{MediaCandidate, Roster};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AppState {
    pub catalog: ArtistCatalog,
    pub videos: Arc<VideoChain>,
    pub itunes: Arc<ITunesClient>,
    pub charts: ChartClient,
    pub news: NewsClient,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let roster = match &config.roster_path {
            Some(path) => Roster::load(path)?,
            None => Roster::builtin()?,
        };
        let roster = Arc::new(roster);

        let itunes = Arc::new(ITunesClient::new(&config.itunes_base_url)?);
        let charts = ChartClient::new(&config.apple_rss_base_url)?;
        let news = NewsClient::new(
            &config.news_feed_url,
            &config.news_api_base_url,
            config.news_api_key.clone(),
        )?;
        let videos = Arc::new(build_video_chain(config, &roster)?);

        let resolver = Resolver::new(
            itunes.clone(),
            videos.clone(),
            roster.clone(),
            ResolverSettings {
                artwork_size: config.artwork_size,
                ..ResolverSettings::default()
            },
        );
        let scheduler = Scheduler::new(SchedulerSettings {
            concurrency: config.concurrency,
            budget: config.budget,
        });

        let mut gate: CacheGate<Vec<MediaCandidate>> =
            CacheGate::new(config.cache_ttl, Arc::new(SystemClock));
        if let Some(path) = &config.cache_file {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            gate = gate.with_store(Arc::new(FileSnapshotStore::<Vec<MediaCandidate>>::new(
                path.clone(),
            )));
            info!(path = ?path, "persistent artist snapshot enabled");
        }

        let catalog = ArtistCatalog::new(Arc::new(resolver), scheduler, roster.queries(), gate);

        info!(
            artists = roster.len(),
            video_sources = ?videos.names(),
            concurrency = config.concurrency,
            budget_ms = config.budget.as_millis() as u64,
            "app state ready"
        );

        Ok(Self {
            catalog,
            videos,
            itunes,
            charts,
            news,
        })
    }
}

/// Pinned ids first, then YouTube when a key is configured, then the mirrors.
pub fn build_video_chain(config: &AppConfig, roster: &Roster) -> Result<VideoChain, ConfigError> {
    let client = Client::builder().timeout(config.video_timeout).build()?;
    let mut chain = VideoChain::new(config.video_timeout)
        .with_strategy(PinnedVideoSearch::new(roster.pinned_videos().clone()));

    match &config.youtube_api_key {
        Some(key) => chain.push(Box::new(YouTubeSearch::new(
            client.clone(),
            &config.youtube_api_base_url,
            key,
        ))),
        None => warn!("YOUTUBE_API_KEY not set, relying on Invidious mirrors"),
    }

    for instance in &config.invidious_instances {
        chain.push(Box::new(InvidiousSearch::new(client.clone(), instance)));
    }

    Ok(chain)
}
