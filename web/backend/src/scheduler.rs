use crate::resolver::ArtistResolver;
use futures::future::join_all;
use melograph_core::{ArtistQuery, MediaCandidate};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_BUDGET: Duration = Duration::from_millis(9_000);

#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    pub concurrency: usize,
    pub budget: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            budget: DEFAULT_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(settings: SchedulerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> SchedulerSettings {
        self.settings
    }

    pub async fn run<R>(&self, resolver: &R, queries: &[ArtistQuery]) -> Vec<Option<MediaCandidate>>
    where
        R: ArtistResolver + ?Sized,
    {
        resolve_all(resolver, queries, self.settings.concurrency, self.settings.budget).await
    }
}

type WorkQueue<'a> = Mutex<VecDeque<(usize, &'a ArtistQuery)>>;
type Slots = Mutex<Vec<Option<MediaCandidate>>>;

/// Resolves `queries` with `concurrency` cooperative workers sharing one FIFO.
///
/// Slot `i` of the output always belongs to `queries[i]`. A slot stays `None`
/// when the resolver found nothing or the budget ran out before the item was
/// picked up. Workers only check the deadline between items, so a call already
/// in flight may finish past the budget.
pub async fn resolve_all<R>(
    resolver: &R,
    queries: &[ArtistQuery],
    concurrency: usize,
    budget: Duration,
) -> Vec<Option<MediaCandidate>>
where
    R: ArtistResolver + ?Sized,
{
    let started = Instant::now();
    let deadline = started + budget;
    let queue: WorkQueue<'_> = Mutex::new(queries.iter().enumerate().collect());
    let slots: Slots = Mutex::new(vec![None; queries.len()]);
    let workers = concurrency.clamp(1, queries.len().max(1));

    join_all(
        (0..workers).map(|worker| run_worker(worker, resolver, &queue, &slots, deadline)),
    )
    .await;

    let slots = slots.into_inner().unwrap_or_else(PoisonError::into_inner);
    let resolved = slots.iter().filter(|slot| slot.is_some()).count();
    info!(
        resolved,
        total = queries.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );
    slots
}

async fn run_worker<R>(
    worker: usize,
    resolver: &R,
    queue: &WorkQueue<'_>,
    slots: &Slots,
    deadline: Instant,
) where
    R: ArtistResolver + ?Sized,
{
    loop {
        if Instant::now() >= deadline {
            debug!(worker, "budget exhausted");
            break;
        }
        let Some((index, query)) = pop_next(queue) else {
            break;
        };
        let candidate = resolver.resolve(query).await;
        store_slot(slots, index, candidate);
    }
}

fn pop_next<'a>(queue: &WorkQueue<'a>) -> Option<(usize, &'a ArtistQuery)> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

fn store_slot(slots: &Slots, index: usize, candidate: Option<MediaCandidate>) {
    slots.lock().unwrap_or_else(PoisonError::into_inner)[index] = candidate;
}
