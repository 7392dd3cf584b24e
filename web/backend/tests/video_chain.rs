mod fixtures;

use fixtures::FakeVideo;
use melograph_core::PinnedVideos;
use melograph_web::video::{PinnedVideoSearch, VideoChain, VideoSearch};
use std::time::Duration;

#[tokio::test]
async fn test_pinned_lookup_matches_fragments() {
    let pinned = PinnedVideoSearch::new(PinnedVideos::new([
        ("frank ocean", "generic"),
        ("frank ocean pink", "pink-matte"),
    ]));

    assert_eq!(
        pinned.search("Frank Ocean Pink + White official music video").await.unwrap().as_deref(),
        Some("pink-matte")
    );
    assert_eq!(
        pinned.search("Frank Ocean Nikes").await.unwrap().as_deref(),
        Some("generic")
    );
    assert_eq!(pinned.search("Lorde Royals").await.unwrap(), None);
}

#[tokio::test]
async fn test_first_hit_wins_and_later_strategies_are_skipped() {
    let first = FakeVideo::found("pinned", "aaa");
    let second = FakeVideo::found("youtube", "bbb");
    let chain = VideoChain::new(Duration::from_secs(3))
        .with_strategy(first.clone())
        .with_strategy(second.clone());

    let found = chain.find("anything").await.unwrap();

    assert_eq!(found.video_id, "aaa");
    assert_eq!(found.source, "pinned");
    assert_eq!(second.calls(), 0);
}

#[tokio::test]
async fn test_empty_ids_are_skipped() {
    let blank = FakeVideo::new("youtube", Ok(Some(String::new())));
    let mirror = FakeVideo::found("invidious:yewtu.be", "ccc");
    let chain = VideoChain::new(Duration::from_secs(3))
        .with_strategy(blank)
        .with_strategy(mirror);

    assert_eq!(chain.find("q").await.unwrap().video_id, "ccc");
}

#[tokio::test(start_paused = true)]
async fn test_slow_strategy_times_out() {
    let slow = FakeVideo::delayed("youtube", Ok(Some("late".into())), Duration::from_secs(10));
    let mirror = FakeVideo::found("invidious:yewtu.be", "ddd");
    let chain = VideoChain::new(Duration::from_secs(3))
        .with_strategy(slow.clone())
        .with_strategy(mirror);

    let started = tokio::time::Instant::now();
    let found = chain.find("q").await.unwrap();

    assert_eq!(found.video_id, "ddd");
    assert_eq!(slow.calls(), 1);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_all_strategies_empty() {
    let chain = VideoChain::new(Duration::from_secs(3))
        .with_strategy(FakeVideo::failing("youtube"))
        .with_strategy(FakeVideo::empty("invidious:yewtu.be"));

    assert!(chain.find("q").await.is_none());
    assert_eq!(chain.len(), 2);
}
