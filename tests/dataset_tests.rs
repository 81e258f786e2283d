use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use wlasl_lib::core::labels::LabelIndex;
use wlasl_lib::core::video::{MemoryBackend, MemoryVideo};
use wlasl_lib::{DatasetConfig, DatasetError, WlaslDataset};

fn write_manifest(dir: &Path, manifest: &serde_json::Value) -> PathBuf {
    let path = dir.join("WLASL.json");
    fs::write(&path, serde_json::to_vec_pretty(manifest).unwrap()).unwrap();
    path
}

fn video_path(dir: &Path, id: &str) -> PathBuf {
    dir.join("videos").join(format!("{}.mp4", id))
}

#[test]
fn test_items_visit_every_instance_in_manifest_order() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = json!([
        {"gloss": "book", "instances": [
            {"video_id": "a1", "frame_start": 0, "signer_id": 1},
            {"video_id": "a2", "frame_start": 1}
        ]},
        {"gloss": "drink", "instances": [
            {"video_id": "b1", "frame_start": 2}
        ]},
        {"gloss": "computer", "instances": [
            {"video_id": "c1", "frame_start": 0},
            {"video_id": "c2", "frame_start": 0},
            {"video_id": "c3", "frame_start": 3}
        ]}
    ]);
    let labels_path = write_manifest(dir.path(), &manifest);

    let mut backend = MemoryBackend::new();
    for id in ["a1", "a2", "b1", "c1", "c2", "c3"] {
        backend.insert(video_path(dir.path(), id), MemoryVideo::numbered(5, 16, 16));
    }
    let dataset = WlaslDataset::new(
        DatasetConfig::new(dir.path().join("videos"), &labels_path),
        Arc::new(backend),
    )
    .unwrap();

    let expected_len: usize = manifest
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["instances"].as_array().unwrap().len())
        .sum();
    assert_eq!(dataset.len(), expected_len);

    let mut visited = Vec::new();
    for i in 0..dataset.len() {
        let item = dataset.item_at(i).unwrap();
        let word = dataset.gloss_word(item.gloss_index).unwrap().to_string();
        visited.push((item.video_id, word));
    }

    let expected: Vec<(String, String)> = manifest
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|g| {
            let word = g["gloss"].as_str().unwrap().to_string();
            g["instances"]
                .as_array()
                .unwrap()
                .iter()
                .map(move |inst| (inst["video_id"].as_str().unwrap().to_string(), word.clone()))
        })
        .collect();
    assert_eq!(visited, expected);

    assert_eq!(dataset.record(0).unwrap().signer_id(), Some(1));
}

#[test]
fn test_single_instance_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let labels_path = write_manifest(
        dir.path(),
        &json!([{"gloss": "hello", "instances": [{"video_id": "00042", "frame_start": 3}]}]),
    );

    let backend = MemoryBackend::new()
        .with_video(video_path(dir.path(), "00042"), MemoryVideo::numbered(10, 32, 32));
    let dataset = WlaslDataset::new(
        DatasetConfig::new(dir.path().join("videos"), &labels_path),
        Arc::new(backend),
    )
    .unwrap();

    let item = dataset.item_at(0).unwrap();
    assert_eq!(item.gloss_index, 0);
    assert_eq!(item.video_id, "00042");
    assert_eq!(dataset.gloss_word(0).unwrap(), "hello");

    // 10 frames starting at 3 -> 7 frames, the first one is frame 3 (level 30)
    let frames = item.extraction.frames();
    assert!(item.extraction.is_complete());
    assert_eq!(frames.len(), 7);
    let first = &frames.frames()[0];
    assert_eq!((first.width, first.height), (226, 226));
    let expected = (30.0f32 / 255.0) * 2.0 - 1.0;
    assert!((first.data[0] - expected).abs() < 1e-5);
    for frame in frames {
        assert!(frame.data.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}

#[test]
fn test_out_of_range_leaves_dataset_usable() {
    let dir = tempfile::tempdir().unwrap();
    let labels_path = write_manifest(
        dir.path(),
        &json!([{"gloss": "yes", "instances": [{"video_id": "y", "frame_start": 0}]}]),
    );
    let backend =
        MemoryBackend::new().with_video(video_path(dir.path(), "y"), MemoryVideo::numbered(2, 8, 8));
    let dataset = WlaslDataset::new(
        DatasetConfig::new(dir.path().join("videos"), &labels_path),
        Arc::new(backend),
    )
    .unwrap();

    for bad in [1, 2, usize::MAX] {
        assert!(matches!(
            dataset.item_at(bad),
            Err(DatasetError::IndexOutOfRange { len: 1, .. })
        ));
    }
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.item_at(0).unwrap().extraction.frames().len(), 2);
}

#[test]
fn test_malformed_manifest_builds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let labels_path = write_manifest(
        dir.path(),
        &json!([
            {"gloss": "ok", "instances": [{"video_id": "1", "frame_start": 0}]},
            {"gloss": "broken"}
        ]),
    );

    let result = WlaslDataset::new(
        DatasetConfig::new(dir.path().join("videos"), &labels_path),
        Arc::new(MemoryBackend::new()),
    );
    assert!(matches!(result, Err(DatasetError::Manifest(_))));
    assert!(LabelIndex::from_path(&labels_path).is_err());
}

#[test]
fn test_dataset_is_shareable_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let labels_path = write_manifest(
        dir.path(),
        &json!([{"gloss": "go", "instances": [
            {"video_id": "g1", "frame_start": 0},
            {"video_id": "g2", "frame_start": 1}
        ]}]),
    );
    let backend = MemoryBackend::new()
        .with_video(video_path(dir.path(), "g1"), MemoryVideo::numbered(4, 8, 8))
        .with_video(video_path(dir.path(), "g2"), MemoryVideo::numbered(4, 8, 8));
    let dataset = Arc::new(
        WlaslDataset::new(
            DatasetConfig::new(dir.path().join("videos"), &labels_path),
            Arc::new(backend),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let dataset = Arc::clone(&dataset);
            std::thread::spawn(move || dataset.item_at(t % 2).unwrap().extraction.frames().len())
        })
        .collect();
    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![4, 3, 4, 3]);
}
