//! End-to-end resolution through a spoof session

use crate::integration::test_utils::{runtime, CountingFetcher, GatedFetcher, NeverFetcher};
use persona::config::PersonaConfig;
use persona::context::{Collaborators, PersonaContext};
use persona::fetch::{MetadataFetcher, StaticFetcher};
use persona::notify::MemoryNotifier;
use persona::prefetch::{PrefetchCache, PrefetchConfig};
use persona::profile::ClientType;
use persona::resolver::SpoofConfig;
use persona::session::SpoofSession;
use persona::settings::MemorySettings;
use persona::types::{ContentId, ContentMetadata};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

fn session(rt: &Runtime, timeout_ms: u64, fetcher: Arc<dyn MetadataFetcher>) -> SpoofSession {
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig { timeout_ms });
    SpoofSession::new(SpoofConfig::default(), cache, fetcher)
}

#[test]
fn test_live_content_switches_profile_after_fetch() {
    let rt = runtime();
    let gated = GatedFetcher::new(Ok(ContentMetadata::new(true, true)));
    let session = session(&rt, 100, gated.clone());

    session.set_player_response_video_id("A", None, false);
    assert_eq!(session.current_profile(), ClientType::AndroidTestsuite);

    gated.open();
    assert!(session.cache().get(true, Duration::from_secs(5)).is_some());
    assert_eq!(session.current_profile(), ClientType::AndroidVr);
    assert_eq!(session.client_type_id(1), 28);
}

#[test]
fn test_first_observation_blocks_until_metadata_arrives() {
    let rt = runtime();
    let session = session(&rt, 5_000, Arc::new(StaticFetcher(ContentMetadata::new(false, false))));

    session.set_player_response_video_id("A", None, false);
    assert_eq!(session.current_profile(), ClientType::TvEmbedded);
}

#[test]
fn test_repeat_observation_does_not_block() {
    let rt = runtime();
    let session = session(&rt, 200, Arc::new(NeverFetcher));

    session.set_player_response_video_id("A", None, false);
    let started = Instant::now();
    session.set_player_response_video_id("A", None, false);
    assert!(started.elapsed() < Duration::from_millis(150));
    assert_eq!(session.current_profile(), ClientType::AndroidTestsuite);
}

#[test]
fn test_shorts_skip_fetching() {
    let rt = runtime();
    let fetcher = CountingFetcher::new(ContentMetadata::new(true, true));
    let session = session(&rt, 1_000, fetcher.clone());

    let params = session.set_player_response_video_id("S", Some("8AEBabc"), false);
    assert_eq!(params.as_deref(), Some("8AEBabc"));
    assert_eq!(session.current_profile(), ClientType::Ios);
    assert_eq!(session.client_version("x"), ClientType::Ios.version());
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn test_live_takes_priority_over_unplayable() {
    let rt = runtime();
    let session = session(&rt, 5_000, Arc::new(StaticFetcher(ContentMetadata::new(true, false))));

    session.set_player_response_video_id("A", None, false);
    assert_eq!(session.current_profile(), ClientType::AndroidVr);
}

#[test]
fn test_resolve_profile_ignores_other_content() {
    let rt = runtime();
    let session = session(&rt, 5_000, Arc::new(StaticFetcher(ContentMetadata::new(true, true))));

    session.set_player_response_video_id("A", None, false);
    assert_eq!(
        session.resolve_profile(&ContentId::new("A"), false),
        ClientType::AndroidVr
    );
    assert_eq!(
        session.resolve_profile(&ContentId::new("B"), false),
        ClientType::AndroidTestsuite
    );
}

#[test]
fn test_disabled_session_passes_originals_through() {
    let rt = runtime();
    let fetcher = CountingFetcher::new(ContentMetadata::new(true, true));
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    let config = SpoofConfig {
        enabled: false,
        ..SpoofConfig::default()
    };
    let session = SpoofSession::new(config, cache, fetcher.clone());

    session.set_player_response_video_id("A", None, false);
    assert_eq!(session.client_type_id(1), 1);
    assert_eq!(session.client_model("Pixel"), "Pixel");
    assert!(!session.force_speed_menu(false));
    assert_eq!(
        session.block_get_watch_request("https://www.youtube.com/get_watch?v=A"),
        "https://www.youtube.com/get_watch?v=A"
    );
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn test_request_blocking_follows_resolved_client() {
    let rt = runtime();
    let session = session(&rt, 5_000, Arc::new(StaticFetcher(ContentMetadata::playable())));

    session.set_player_response_video_id("A", None, false);
    let stripped =
        session.block_init_playback_request("https://rr1.googlevideo.com/initplayback?source=yt&oad=1");
    assert_eq!(stripped, "https://rr1.googlevideo.com/initplayback");

    let blocked = session.block_get_watch_request("https://www.youtube.com/youtubei/v1/get_watch?v=A");
    assert!(blocked.starts_with("https://127.0.0.0"));
}

#[test]
fn test_context_applies_stored_profile_overrides() {
    let rt = runtime();
    let settings = Arc::new(MemorySettings::new());
    persona::settings::catalog::SPOOF_CLIENT_LIVESTREAM
        .save(settings.as_ref(), ClientType::Android)
        .unwrap();

    let context = PersonaContext::new(
        PersonaConfig::default(),
        rt.handle().clone(),
        Collaborators {
            settings,
            fetcher: Arc::new(StaticFetcher(ContentMetadata::new(true, true))),
            notifier: Arc::new(MemoryNotifier::new()),
        },
    )
    .unwrap();

    context.session().set_player_response_video_id("A", None, false);
    assert_eq!(context.session().current_profile(), ClientType::Android);
}
