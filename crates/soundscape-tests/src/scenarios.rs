//! End-to-end playback scenarios.

use crate::support::{asset_dir, session, test_config};
use soundscape_audio::{ContextState, EngineConfig};
use soundscape_core::{Category, Pack, SCENE_COUNT};
use std::sync::Arc;

#[tokio::test]
async fn ambience_at_canvas_left_plays_at_world_left() {
    let assets = asset_dir(Pack::Adventure);
    let (mut s, _mixer, _loader) = session(assets.path(), &test_config());

    let id = s.place(0, "adv-birds", 0.0, 300.0).unwrap();
    s.play();
    let report = s.sync().await;

    assert_eq!(report.started, 1);
    assert_eq!(s.engine().active_ids(), vec![id.clone()]);
    assert_eq!(s.engine().world_position(&id).unwrap().x, -5.0);
    assert_eq!(s.engine().context_state(), ContextState::Running);
}

#[tokio::test]
async fn switching_to_empty_scene_stops_all() {
    let assets = asset_dir(Pack::Adventure);
    let (mut s, _mixer, _loader) = session(assets.path(), &test_config());

    let birds = s.place(0, "adv-birds", 100.0, 100.0).unwrap();
    let hero = s.place(0, "adv-hero", 500.0, 100.0).unwrap();
    s.play();
    s.sync().await;
    assert_eq!(s.engine().active_count(), 2);

    s.select_scene(1).unwrap();
    let report = s.sync().await;
    assert_eq!(report.stopped, 2);
    assert_eq!(s.engine().active_count(), 0);
    assert!(!s.engine().is_active(&birds));
    assert!(!s.engine().is_active(&hero));
}

#[tokio::test(start_paused = true)]
async fn play_all_halts_after_last_scene() {
    let assets = asset_dir(Pack::Adventure);
    let config = EngineConfig {
        sequence_period_ms: 4000,
        ..test_config()
    };
    let (mut s, _mixer, _loader) = session(assets.path(), &config);
    s.place(0, "adv-birds", 100.0, 100.0).unwrap();

    let started = tokio::time::Instant::now();
    s.play_all();
    s.sync().await;

    let mut changes = 0;
    while let Some(state) = s.next_sequence_change().await {
        changes += 1;
        s.sync().await;
        if !state.active {
            assert_eq!(state.index, 0);
            break;
        }
    }

    assert_eq!(changes, SCENE_COUNT);
    assert!(started.elapsed() >= config.sequence_period() * SCENE_COUNT as u32);
    assert!(!s.sequence_state().active);
    assert_eq!(s.sequence_state().index, 0);
    assert!(!s.is_playing());
    assert_eq!(s.engine().active_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_loads_share_one_decode() {
    let assets = asset_dir(Pack::Combat);
    let (s, _mixer, loader) = session(assets.path(), &test_config());
    let cache = Arc::clone(s.engine().cache());

    let url = "/audio/combat/cmb-fire.wav";
    let (a, b) = tokio::join!(cache.load(url), cache.load(url));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(loader.decodes(), 1);
}

#[tokio::test]
async fn music_mute_silences_without_restart() {
    let assets = asset_dir(Pack::Adventure);
    let (mut s, _mixer, _loader) = session(assets.path(), &test_config());

    let hero = s.place(0, "adv-hero", 400.0, 300.0).unwrap();
    s.play();
    s.sync().await;
    let node = s.engine().node_id(&hero).unwrap();
    assert_eq!(s.engine().effective_gain(&hero), Some(1.0));

    s.set_category_muted(Category::Music, true);
    let report = s.sync().await;

    assert_eq!(report.started, 0);
    assert_eq!(report.stopped, 0);
    assert_eq!(s.engine().node_id(&hero), Some(node));
    assert_eq!(s.engine().effective_gain(&hero), Some(0.0));

    s.set_category_muted(Category::Music, false);
    s.sync().await;
    assert_eq!(s.engine().node_id(&hero), Some(node));
    assert_eq!(s.engine().effective_gain(&hero), Some(1.0));
}

#[tokio::test]
async fn missing_asset_is_silent_skip() {
    // Only the adventure assets exist on disk
    let assets = asset_dir(Pack::Adventure);
    let (mut s, _mixer, _loader) = session(assets.path(), &test_config());

    s.switch_pack(Pack::Shelter);
    let rain = s.place(0, "shl-rain", 100.0, 100.0).unwrap();
    s.play();
    let report = s.sync().await;

    assert_eq!(report.failed, 1);
    assert!(!s.engine().is_active(&rain));

    // Play, pause and pack switching still work
    s.switch_pack(Pack::Adventure);
    let birds = s.place(0, "adv-birds", 100.0, 100.0).unwrap();
    s.sync().await;
    assert!(s.engine().is_active(&birds));
    s.pause();
    s.sync().await;
    assert_eq!(s.engine().active_count(), 0);
}

#[tokio::test]
async fn removing_a_source_stops_only_that_voice() {
    let assets = asset_dir(Pack::Adventure);
    let (mut s, _mixer, _loader) = session(assets.path(), &test_config());

    let a = s.place(0, "adv-birds", 100.0, 100.0).unwrap();
    let b = s.place(0, "adv-birds", 600.0, 100.0).unwrap();
    s.play();
    s.sync().await;
    let node_b = s.engine().node_id(&b);

    s.remove(0, &a).unwrap();
    let report = s.sync().await;
    assert_eq!(report.stopped, 1);
    assert!(!s.engine().is_active(&a));
    assert_eq!(s.engine().node_id(&b), node_b);
}
