//! Rendered output through the mixer.

use crate::support::{asset_dir, session, test_config};
use soundscape_audio::EngineConfig;
use soundscape_core::{Category, Pack};

fn channel_energy(block: &[f32]) -> (f32, f32) {
    let left = block.iter().step_by(2).map(|s| s.abs()).sum();
    let right = block.iter().skip(1).step_by(2).map(|s| s.abs()).sum();
    (left, right)
}

#[tokio::test]
async fn canvas_left_is_heard_on_the_left() {
    let assets = asset_dir(Pack::Adventure);
    let (mut s, mut mixer, _loader) = session(assets.path(), &test_config());
    s.place(0, "adv-birds", 0.0, 300.0).unwrap();
    s.play();
    s.sync().await;

    let mut out = vec![0.0f32; 1024];
    mixer.process(&mut out);
    mixer.process(&mut out);
    let (left, right) = channel_energy(&out);
    assert!(left > right * 1.5);
    assert!(right > 0.0);
}

#[tokio::test]
async fn music_is_not_panned() {
    let assets = asset_dir(Pack::Adventure);
    let (mut s, mut mixer, _loader) = session(assets.path(), &test_config());
    s.place(0, "adv-hero", 0.0, 300.0).unwrap();
    s.play();
    s.sync().await;

    let mut out = vec![0.0f32; 512];
    mixer.process(&mut out);
    let (left, right) = channel_energy(&out);
    assert!(left > 0.0);
    assert!((left - right).abs() < 1e-3);
}

#[tokio::test]
async fn muting_music_silences_output() {
    let assets = asset_dir(Pack::Adventure);
    let (mut s, mut mixer, _loader) = session(assets.path(), &test_config());
    s.place(0, "adv-hero", 400.0, 300.0).unwrap();
    s.play();
    s.sync().await;

    let mut out = vec![0.0f32; 256];
    mixer.process(&mut out);
    assert!(out.iter().any(|s| *s != 0.0));

    s.set_category_muted(Category::Music, true);
    s.sync().await;
    mixer.process(&mut out);
    assert!(out.iter().all(|s| *s == 0.0));
    assert_eq!(mixer.voice_count(), 1);
}

#[tokio::test]
async fn pause_fades_out_and_frees_voices() {
    let assets = asset_dir(Pack::Adventure);
    let config = EngineConfig::default();
    let (mut s, mut mixer, _loader) = session(assets.path(), &config);
    s.place(0, "adv-hero", 400.0, 300.0).unwrap();
    s.place(0, "adv-birds", 100.0, 300.0).unwrap();
    s.play();
    s.sync().await;

    let mut out = vec![0.0f32; config.ramp_frames() * 4];
    mixer.process(&mut out);
    assert_eq!(mixer.voice_count(), 2);

    s.pause();
    s.sync().await;
    mixer.process(&mut out);
    let tail = &out[out.len() - 16..];
    assert!(tail.iter().all(|s| *s == 0.0));
    assert_eq!(mixer.voice_count(), 0);
}

#[tokio::test]
async fn moving_the_listener_moves_the_image() {
    let assets = asset_dir(Pack::Adventure);
    let (mut s, mut mixer, _loader) = session(assets.path(), &test_config());
    s.place(0, "adv-birds", 200.0, 300.0).unwrap();
    s.play();
    s.sync().await;

    let mut out = vec![0.0f32; 1024];
    mixer.process(&mut out);
    let (left, right) = channel_energy(&out);
    assert!(left > right);

    // Step to the source's left side: it is now on the listener's right.
    s.set_listener_at(0.0, 300.0, 0.0).unwrap();
    s.sync().await;
    mixer.process(&mut out);
    mixer.process(&mut out);
    let (left, right) = channel_energy(&out);
    assert!(right > left * 1.5);
}
