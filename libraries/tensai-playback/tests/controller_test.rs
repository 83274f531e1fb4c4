//! Transport controller scenario tests
//!
//! Drives the controller through user intents and scripted transport events
//! against a recording output sink.

mod common;

use common::{create_track, id, library_of, missing_track, Harness};
use std::sync::Arc;
use std::time::Duration;
use tensai_core::{LibraryProvider, MediaLibrary};
use tensai_playback::{
    Intent, PlaybackConfig, PlaybackError, PlaybackEvent, PlaybackModes, QueuePosition,
    ShuffleOrder, TransportState, TraversalCursor,
};

async fn start_at(harness: &mut Harness, library: &MediaLibrary, track: &str) {
    harness
        .controller
        .handle_intent(Intent::PlayTrack(id(track)), library)
        .await
        .unwrap();
}

// ===== Basic transport flow =====

#[tokio::test]
async fn play_track_queues_rotated_library() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::new(PlaybackConfig::default());

    start_at(&mut harness, &library, "b").await;

    let queue: Vec<_> = harness
        .controller
        .queue()
        .tracks()
        .iter()
        .map(|t| t.id.as_str().to_string())
        .collect();
    assert_eq!(queue, vec!["b", "c", "a"]);
    assert_eq!(harness.controller.state(), TransportState::Playing);
    assert_eq!(harness.current_id().as_deref(), Some("b"));
    assert_eq!(harness.log.lock().unwrap().plays, 1);
}

#[tokio::test]
async fn load_passes_through_loading_and_paused() {
    let library = library_of(&["a"]);
    let mut harness = Harness::new(PlaybackConfig::default());

    start_at(&mut harness, &library, "a").await;

    let states: Vec<_> = harness
        .controller
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            PlaybackEvent::StateChanged { state } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            TransportState::Loading,
            TransportState::Paused,
            TransportState::Playing
        ]
    );
}

#[tokio::test]
async fn next_walks_queue_then_stops_at_end() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    harness.controller.next().await.unwrap();
    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(1));
    assert_eq!(harness.current_id().as_deref(), Some("b"));

    harness.controller.next().await.unwrap();
    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(2));
    assert_eq!(harness.current_id().as_deref(), Some("c"));

    harness.controller.next().await.unwrap();
    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(2));
    assert_eq!(harness.current_id().as_deref(), Some("c"));
    assert_eq!(harness.log.lock().unwrap().opened.len(), 3);
}

#[tokio::test]
async fn toggle_play_pause() {
    let library = library_of(&["a"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    harness.controller.toggle_play_pause().await.unwrap();
    assert_eq!(harness.controller.state(), TransportState::Paused);
    assert_eq!(harness.log.lock().unwrap().pauses, 1);

    harness.controller.toggle_play_pause().await.unwrap();
    assert_eq!(harness.controller.state(), TransportState::Playing);
    assert_eq!(harness.log.lock().unwrap().plays, 2);
}

#[tokio::test]
async fn toggle_with_nothing_loaded_loads_current_item() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::new(PlaybackConfig::default());

    harness
        .controller
        .handle_intent(Intent::AddToQueue(id("b")), &library)
        .await
        .unwrap();
    assert_eq!(harness.controller.state(), TransportState::Idle);

    harness.controller.toggle_play_pause().await.unwrap();
    assert_eq!(harness.controller.state(), TransportState::Playing);
    assert_eq!(harness.current_id().as_deref(), Some("b"));
}

#[tokio::test]
async fn play_with_empty_queue_reports_no_track() {
    let library = MediaLibrary::new();
    let mut harness = Harness::new(PlaybackConfig::default());

    let result = harness.controller.handle_intent(Intent::Play, &library).await;
    assert!(matches!(result, Err(PlaybackError::NoTrackLoaded)));
}

// ===== Previous =====

#[tokio::test]
async fn previous_late_in_track_restarts_in_place() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    harness.controller.next().await.unwrap();

    harness.set_position(Duration::from_secs(5));
    harness.controller.previous().await.unwrap();

    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(1));
    assert_eq!(harness.current_id().as_deref(), Some("b"));
    assert_eq!(harness.log.lock().unwrap().seeks, vec![Duration::ZERO]);
}

#[tokio::test]
async fn previous_early_in_track_steps_back() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    harness.controller.next().await.unwrap();

    harness.set_position(Duration::from_secs(1));
    harness.controller.previous().await.unwrap();

    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(0));
    assert_eq!(harness.current_id().as_deref(), Some("a"));
    assert!(harness.log.lock().unwrap().seeks.is_empty());
}

#[tokio::test]
async fn previous_restart_works_without_known_duration() {
    let library = library_of(&["a"]);
    let mut harness = Harness::with_duration(PlaybackConfig::default(), None);
    start_at(&mut harness, &library, "a").await;

    harness.set_position(Duration::from_secs(10));
    harness.controller.previous().await.unwrap();

    assert_eq!(harness.log.lock().unwrap().seeks, vec![Duration::ZERO]);
}

#[tokio::test]
async fn previous_at_first_item_is_noop() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    harness.controller.previous().await.unwrap();

    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(0));
    assert_eq!(harness.log.lock().unwrap().opened.len(), 1);
}

// ===== Track end =====

#[tokio::test]
async fn ended_auto_advances() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    harness.emitter().ended();
    harness.pump().await;

    assert_eq!(harness.current_id().as_deref(), Some("b"));
    assert_eq!(harness.controller.state(), TransportState::Playing);
    let history: Vec<_> = harness.controller.history().ids();
    assert_eq!(history, vec![id("b"), id("a")]);
}

#[tokio::test]
async fn ended_at_queue_end_goes_idle() {
    let library = library_of(&["a"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    harness.emitter().ended();
    harness.pump().await;

    assert_eq!(harness.controller.state(), TransportState::Idle);
    assert!(harness.controller.current_track().is_none());
    assert_eq!(harness.log.lock().unwrap().closed, 1);
}

#[tokio::test]
async fn ended_with_auto_play_off_goes_idle() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::new(PlaybackConfig {
        auto_play_next: false,
        ..PlaybackConfig::default()
    });
    start_at(&mut harness, &library, "a").await;

    harness.emitter().ended();
    harness.pump().await;

    assert_eq!(harness.controller.state(), TransportState::Idle);
    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(0));
}

#[tokio::test]
async fn repeat_single_track_restarts_same_load() {
    let library = library_of(&["a"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    harness.controller.toggle_repeat();
    let token = harness.controller.expected_token();

    harness.emitter().ended();
    harness.pump().await;

    let log = harness.log.lock().unwrap();
    assert_eq!(log.opened.len(), 1);
    assert_eq!(log.seeks, vec![Duration::ZERO]);
    assert_eq!(log.plays, 2);
    drop(log);
    assert_eq!(harness.controller.expected_token(), token);
    assert_eq!(harness.controller.state(), TransportState::Playing);
}

#[tokio::test]
async fn repeat_wraps_longer_queue() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::with_modes(PlaybackModes {
        shuffle: false,
        repeat: true,
    });
    start_at(&mut harness, &library, "a").await;
    harness.controller.next().await.unwrap();

    harness.emitter().ended();
    harness.pump().await;

    assert_eq!(harness.current_id().as_deref(), Some("a"));
    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(0));
}

// ===== Stale events =====

#[tokio::test]
async fn events_from_superseded_load_are_ignored() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    let stale = harness.emitter();

    harness.controller.next().await.unwrap();
    harness.controller.drain_events();

    stale.ended();
    stale.error("decoder crashed");
    let results = harness.pump().await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(harness.current_id().as_deref(), Some("b"));
    assert_eq!(harness.controller.state(), TransportState::Playing);
    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(1));
    assert!(!harness.controller.has_pending_events());
}

#[tokio::test]
async fn progress_event_is_formatted() {
    let library = library_of(&["a"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    harness.controller.drain_events();

    harness
        .emitter()
        .progress(Duration::from_secs(45), Some(Duration::from_secs(180)));
    harness.pump().await;

    let events = harness.controller.drain_events();
    match events.as_slice() {
        [PlaybackEvent::Progress(view)] => {
            assert_eq!(view.elapsed, "0:45");
            assert_eq!(view.total, "3:00");
            assert_eq!(view.percent, 25.0);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

// ===== Failures =====

#[tokio::test]
async fn unreadable_source_enters_error_state() {
    let mut library = library_of(&["a"]);
    library.add_track(missing_track("x"));
    let mut harness = Harness::new(PlaybackConfig::default());

    let result = harness
        .controller
        .handle_intent(Intent::PlayTrack(id("x")), &library)
        .await;

    assert!(matches!(
        result,
        Err(PlaybackError::SourceUnreadable { .. })
    ));
    assert_eq!(harness.controller.state(), TransportState::Error);
    assert!(harness.controller.history().is_empty());
    assert!(harness
        .controller
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Error { .. })));

    // No retry; the next intent recovers
    harness.controller.next().await.unwrap();
    assert_eq!(harness.current_id().as_deref(), Some("a"));
    assert_eq!(harness.controller.state(), TransportState::Playing);
}

#[tokio::test]
async fn rejected_play_enters_error_state() {
    let library = library_of(&["a"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    harness.log.lock().unwrap().refuse_play = true;

    let result = harness
        .controller
        .handle_intent(Intent::PlayTrack(id("a")), &library)
        .await;

    assert!(matches!(result, Err(PlaybackError::PlaybackRejected { .. })));
    assert_eq!(harness.controller.state(), TransportState::Error);
    // The load itself succeeded
    assert_eq!(harness.current_id().as_deref(), Some("a"));
    assert_eq!(harness.controller.history().len(), 1);
}

#[tokio::test]
async fn unknown_track_and_playlist_are_reported() {
    let library = library_of(&["a"]);
    let mut harness = Harness::new(PlaybackConfig::default());

    let track = harness
        .controller
        .handle_intent(Intent::PlayTrack(id("zzz")), &library)
        .await;
    assert!(matches!(track, Err(PlaybackError::TrackNotFound(_))));

    let playlist = harness
        .controller
        .handle_intent(Intent::QueuePlaylist("nope".into()), &library)
        .await;
    assert!(matches!(playlist, Err(PlaybackError::PlaylistNotFound(_))));
    assert_eq!(harness.controller.state(), TransportState::Idle);
}

// ===== Queue editing =====

#[tokio::test]
async fn removing_playing_item_is_rejected() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    let result = harness
        .controller
        .handle_intent(Intent::RemoveFromQueue(0), &library)
        .await;

    assert!(matches!(
        result,
        Err(PlaybackError::QueueInvariantViolation { index: 0 })
    ));
    assert_eq!(harness.controller.queue().len(), 3);
}

#[tokio::test]
async fn clear_queue_keeps_playing_item() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    harness.controller.next().await.unwrap();

    harness
        .controller
        .handle_intent(Intent::ClearQueue, &library)
        .await
        .unwrap();

    let queue = harness.controller.queue();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.cursor(), TraversalCursor(0));
    assert_eq!(queue.shuffle_order().as_slice(), &[0]);
    assert_eq!(queue.current().map(|t| t.id.clone()), Some(id("b")));
}

#[tokio::test]
async fn select_under_shuffle_translates_slot() {
    let library = library_of(&["a", "b", "c", "d"]);
    let mut harness = Harness::with_modes(PlaybackModes {
        shuffle: true,
        repeat: false,
    });
    start_at(&mut harness, &library, "a").await;

    harness
        .controller
        .handle_intent(Intent::SelectQueueIndex(2), &library)
        .await
        .unwrap();

    let queue = harness.controller.queue();
    assert_eq!(queue.current_position(), Some(QueuePosition(2)));
    assert_eq!(
        queue.shuffle_order().position_at(queue.cursor()),
        Some(QueuePosition(2))
    );
    assert_eq!(harness.current_id().as_deref(), Some("c"));
}

#[tokio::test]
async fn toggling_shuffle_keeps_current_track() {
    let library = library_of(&["a", "b", "c", "d"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    harness.controller.next().await.unwrap();

    assert!(harness.controller.toggle_shuffle());
    let queue = harness.controller.queue();
    assert_eq!(queue.shuffle_order().as_slice()[0], 1);
    assert_eq!(queue.cursor(), TraversalCursor::START);

    assert!(!harness.controller.toggle_shuffle());
    assert_eq!(harness.controller.queue().cursor(), TraversalCursor(1));
    // Shuffle changes never reload
    assert_eq!(harness.log.lock().unwrap().opened.len(), 2);
}

#[tokio::test]
async fn queue_playlist_appends_to_shuffle_order() {
    let mut library = library_of(&["a", "b", "c"]);
    let playlist = library.create_playlist("Mix").unwrap();
    library.add_to_playlist(&playlist, &id("c")).unwrap();
    library.add_to_playlist(&playlist, &id("b")).unwrap();

    let mut harness = Harness::with_modes(PlaybackModes {
        shuffle: true,
        repeat: false,
    });
    start_at(&mut harness, &library, "a").await;

    harness
        .controller
        .handle_intent(Intent::QueuePlaylist(playlist), &library)
        .await
        .unwrap();

    let queue = harness.controller.queue();
    assert_eq!(queue.len(), 5);
    assert_eq!(&queue.shuffle_order().as_slice()[3..], &[3, 4]);
}

#[tokio::test]
async fn play_playlist_replaces_queue() {
    let mut library = library_of(&["a", "b", "c"]);
    let playlist = library.create_playlist("Evening").unwrap();
    library.add_to_playlist(&playlist, &id("c")).unwrap();
    library.add_to_playlist(&playlist, &id("a")).unwrap();
    let mut harness = Harness::new(PlaybackConfig::default());

    harness
        .controller
        .handle_intent(Intent::PlayPlaylist(playlist), &library)
        .await
        .unwrap();

    assert_eq!(harness.controller.queue().len(), 2);
    assert_eq!(harness.current_id().as_deref(), Some("c"));
}

#[tokio::test]
async fn forgetting_playing_track_pauses_and_refuses() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    let result = harness
        .controller
        .handle_intent(Intent::ForgetTrack(id("a")), &library)
        .await;

    assert!(matches!(
        result,
        Err(PlaybackError::QueueInvariantViolation { .. })
    ));
    assert_eq!(harness.controller.state(), TransportState::Paused);
    assert_eq!(harness.controller.queue().len(), 2);
}

#[tokio::test]
async fn forgetting_queued_track_removes_it() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    harness
        .controller
        .handle_intent(Intent::ForgetTrack(id("b")), &library)
        .await
        .unwrap();

    assert_eq!(harness.controller.queue().len(), 2);
    assert_eq!(harness.controller.state(), TransportState::Playing);
    assert!(harness.controller.queue().position_of(&id("b")).is_none());
}

#[tokio::test]
async fn reset_releases_media_and_empties_session() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    let old = harness.emitter();
    harness.controller.drain_events();

    harness
        .controller
        .handle_intent(Intent::Reset, &library)
        .await
        .unwrap();

    assert_eq!(harness.controller.state(), TransportState::Idle);
    assert!(harness.current_id().is_none());
    assert!(harness.controller.queue().is_empty());
    assert!(harness.controller.history().is_empty());
    assert_eq!(harness.log.lock().unwrap().closed, 1);

    let events = harness.controller.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, PlaybackEvent::HistoryChanged { track_ids } if track_ids.is_empty())));

    // The released load can no longer advance anything
    old.ended();
    harness.pump().await;
    assert_eq!(harness.controller.state(), TransportState::Idle);
    assert!(matches!(
        harness.controller.handle_intent(Intent::Play, &library).await,
        Err(PlaybackError::NoTrackLoaded)
    ));
}

// ===== Settings =====

#[tokio::test]
async fn seek_and_volume_are_clamped() {
    let library = library_of(&["a"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    harness
        .controller
        .handle_intent(Intent::Seek(Duration::from_secs(999)), &library)
        .await
        .unwrap();
    harness
        .controller
        .handle_intent(Intent::SeekPercent(0.5), &library)
        .await
        .unwrap();
    harness
        .controller
        .handle_intent(Intent::SetVolume(3.0), &library)
        .await
        .unwrap();

    let log = harness.log.lock().unwrap();
    assert_eq!(
        log.seeks,
        vec![Duration::from_secs(180), Duration::from_secs(90)]
    );
    assert_eq!(log.volume, 1.0);
}

#[tokio::test]
async fn seek_without_loaded_track_is_reported() {
    let library = MediaLibrary::new();
    let mut harness = Harness::new(PlaybackConfig::default());

    let result = harness
        .controller
        .handle_intent(Intent::Seek(Duration::from_secs(1)), &library)
        .await;
    assert!(matches!(result, Err(PlaybackError::NoTrackLoaded)));
}

#[tokio::test]
async fn auto_play_setting_can_be_switched_off() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;

    harness
        .controller
        .handle_intent(Intent::SetAutoPlayNext(false), &library)
        .await
        .unwrap();
    assert!(!harness.controller.auto_play_next());

    harness.emitter().ended();
    harness.pump().await;
    assert_eq!(harness.controller.state(), TransportState::Idle);
}

#[tokio::test]
async fn transient_handles_are_released_on_supersede() {
    let mut library = MediaLibrary::new();
    let blob = library.add_track(
        tensai_core::Track::new(
            "Dropped file",
            tensai_core::MediaType::Audio,
            tensai_core::SourceLocator::Blob("blob:42".into()),
        )
        .with_id("blob"),
    );
    library.add_track(create_track("b"));
    let mut harness = Harness::new(PlaybackConfig::default());

    harness.controller.play_track(&blob, &library).await.unwrap();
    harness.controller.next().await.unwrap();

    assert_eq!(harness.log.lock().unwrap().released, vec!["blob:42"]);
}

#[tokio::test]
async fn history_records_each_activation_once() {
    let library = library_of(&["a", "b"]);
    let mut harness = Harness::new(PlaybackConfig::default());
    start_at(&mut harness, &library, "a").await;
    harness.controller.next().await.unwrap();
    harness.set_position(Duration::ZERO);
    harness.controller.previous().await.unwrap();

    let history = harness.controller.history().ids();
    assert_eq!(history, vec![id("a"), id("b")]);
    // Shared with the library, not a copy
    let first = library.track(&id("a")).unwrap();
    let session = harness.controller.session();
    assert!(Arc::ptr_eq(&first, session.history.latest().unwrap()));
    assert_eq!(session.queue.len(), 2);
}

#[tokio::test]
async fn explicit_shuffle_order_scenario() {
    let library = library_of(&["a", "b", "c"]);
    let mut harness = Harness::with_modes(PlaybackModes {
        shuffle: true,
        repeat: false,
    });
    start_at(&mut harness, &library, "a").await;
    let installed = {
        let order = ShuffleOrder::from_permutation(vec![0, 2, 1]).unwrap();
        // Controller queue is read-only from outside
        let mut queue = harness.controller.queue().clone();
        assert!(queue.set_shuffle_order(order));
        queue.remove_at(QueuePosition(1)).unwrap();
        queue
    };

    assert_eq!(installed.shuffle_order().as_slice(), &[0, 1]);
    assert_eq!(installed.cursor(), TraversalCursor(0));
    assert_eq!(installed.current().map(|t| t.id.clone()), Some(id("a")));
}
