//! Composition files driving playback.

use crate::support::{asset_dir, session, test_config};
use soundscape_core::{Category, Pack};
use soundscape_scene::{Composition, CompositionFile, PlacedSourceId};

const BACKEND_JSON: &str = r#"{
    "pack": "combat",
    "scenes": [
        {"id": 0, "placedSources": [
            {"id": "fire-1", "sourceId": "cmb-fire", "x": 0, "y": 150.5, "volume": 0.8, "depth": 0.3},
            {"id": "drums-1", "sourceId": "cmb-drums", "x": 500, "y": 300, "volume": 0.6, "muted": true}
        ]},
        {"id": 1, "placedSources": []}, {"id": 2, "placedSources": []},
        {"id": 3, "placedSources": []}, {"id": 4, "placedSources": []},
        {"id": 5, "placedSources": []}, {"id": 6, "placedSources": []},
        {"id": 7, "placedSources": []}, {"id": 8, "placedSources": []},
        {"id": 9, "placedSources": []}, {"id": 10, "placedSources": []},
        {"id": 11, "placedSources": []}, {"id": 12, "placedSources": []},
        {"id": 13, "placedSources": []}, {"id": 14, "placedSources": []},
        {"id": 15, "placedSources": []}
    ],
    "masterVolume": 0.5,
    "musicVolume": 1.0,
    "ambienceVolume": 0.5
}"#;

#[tokio::test]
async fn backend_composition_plays() {
    let assets = asset_dir(Pack::Combat);
    let (mut s, _mixer, _loader) = session(assets.path(), &test_config());

    let file = CompositionFile::from_json(BACKEND_JSON.as_bytes()).unwrap();
    assert_eq!(file.composition.pack, Pack::Combat);
    s.load_composition(&file.composition).unwrap();
    s.play();
    let report = s.sync().await;
    assert_eq!(report.started, 2);

    let fire = PlacedSourceId::new("fire-1");
    let drums = PlacedSourceId::new("drums-1");
    // 0.8 volume * 0.5 ambience * 0.5 master
    assert_eq!(s.engine().effective_gain(&fire), Some(0.2));
    // Muted placements still hold a voice
    assert_eq!(s.engine().effective_gain(&drums), Some(0.0));

    let pos = s.engine().world_position(&fire).unwrap();
    assert_eq!(pos.x, -5.0);
    assert!((pos.z - (150.5 / 600.0 * 10.0 + 0.3 * 5.0) as f32).abs() < 1e-5);
    assert_eq!(s.engine().world_position(&drums), None);
}

#[test]
fn save_load_keeps_precision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("composition.json");

    let mut composition = parse(BACKEND_JSON);
    let p = &mut composition.scenes[0].placed_sources[0];
    p.x = 123.456789012345;
    p.y = 0.1 + 0.2;
    p.depth = -0.333333333333333;
    p.volume = 0.7000000000000001;

    CompositionFile::new(composition.clone())
        .save_to_file(&path)
        .unwrap();
    let loaded = CompositionFile::load_from_file(&path).unwrap();
    assert_eq!(loaded.composition, composition);
}

#[test]
fn features_match_placements() {
    let composition = parse(BACKEND_JSON);
    let features = composition.features();
    assert_eq!(features.num_sources, 2);
    assert_eq!(features.num_music_sources, 1);
    assert_eq!(features.num_ambience_sources, 1);
    assert_eq!(features.avg_sources_per_scene, 2.0 / 16.0);
    assert!(composition.validate().is_ok());
    assert_eq!(
        composition.pack.category_of("cmb-drums"),
        Some(Category::Music)
    );
}

fn parse(json: &str) -> Composition {
    CompositionFile::from_json(json.as_bytes())
        .unwrap()
        .composition
}
