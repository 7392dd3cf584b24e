use crate::cache::CacheGate;
use crate::resolver::ArtistResolver;
use crate::scheduler::Scheduler;
use melograph_core::{ArtistQuery, MediaCandidate};
use std::sync::Arc;

/// Fixed key the roster snapshot lives under, in memory and on disk.
pub const ARTISTS_CACHE_KEY: &str = "artists-data";

/// The roster, resolved in bulk and memoized behind the cache gate.
pub struct ArtistCatalog {
    resolver: Arc<dyn ArtistResolver>,
    scheduler: Scheduler,
    queries: Vec<ArtistQuery>,
    gate: CacheGate<Vec<MediaCandidate>>,
}

impl ArtistCatalog {
    pub fn new(
        resolver: Arc<dyn ArtistResolver>,
        scheduler: Scheduler,
        queries: Vec<ArtistQuery>,
        gate: CacheGate<Vec<MediaCandidate>>,
    ) -> Self {
        Self {
            resolver,
            scheduler,
            queries,
            gate,
        }
    }

    pub fn queries(&self) -> &[ArtistQuery] {
        &self.queries
    }

    /// Resolved artists in roster order. Empty results are not cached so the
    /// next request tries again.
    pub async fn artists(&self) -> Vec<MediaCandidate> {
        self.gate
            .get_or_compute_if(
                ARTISTS_CACHE_KEY,
                || self.refresh(),
                |artists| !artists.is_empty(),
            )
            .await
    }

    async fn refresh(&self) -> Vec<MediaCandidate> {
        self.scheduler
            .run(self.resolver.as_ref(), &self.queries)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}
