//! Model files on disk, raw and bzip2-compressed.

use std::path::PathBuf;

use skin_face::{load_model, save_model, Error, FaceClassifier, Linear, SupportVectorMachine};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("skin-face-{}-{}", std::process::id(), name))
}

/// A model sized for the default classifier with a small deterministic pattern.
fn classifier_sized_model() -> SupportVectorMachine<Linear> {
    let inputs = 16 * 16 * 9;
    let vectors = (0..3)
        .map(|v| (0..inputs).map(|i| ((i * 7 + v * 13) % 200) as f64 / 100.0 - 1.0).collect())
        .collect();
    SupportVectorMachine::new(inputs, Linear::default(), vectors, vec![0.5, -0.25, 0.125], -0.01).unwrap()
}

fn assert_models_close(a: &SupportVectorMachine<Linear>, b: &SupportVectorMachine<Linear>) {
    assert_eq!(a.number_of_inputs(), b.number_of_inputs());
    assert_eq!(a.support_vectors().len(), b.support_vectors().len());
    for (x, y) in a.support_vectors().iter().flatten().zip(b.support_vectors().iter().flatten()) {
        assert!((x - y).abs() <= 1e-9);
    }
    for (x, y) in a.weights().iter().zip(b.weights()) {
        assert!((x - y).abs() <= 1e-9);
    }
    assert!((a.threshold() - b.threshold()).abs() <= 1e-9);
}

#[test]
fn raw_model_file_round_trip() {
    init_logger();
    let path = temp_path("model.svm");
    let model = classifier_sized_model();
    save_model(&path, &model).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    // Two counts, three vectors with length prefixes, weights with count, threshold
    assert_eq!(bytes.len(), 4 * (2 + 3 * (1 + 2304) + 1 + 3 + 1));

    let loaded = load_model(&path).unwrap();
    assert_models_close(&model, &loaded);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn compressed_model_file_round_trip() {
    init_logger();
    let raw = temp_path("compare.svm");
    let compressed = temp_path("model.svm.bz2");
    let model = classifier_sized_model();
    save_model(&raw, &model).unwrap();
    save_model(&compressed, &model).unwrap();

    // bzip2 stream magic
    let bytes = std::fs::read(&compressed).unwrap();
    assert_eq!(&bytes[..3], b"BZh");

    let loaded = load_model(&compressed).unwrap();
    assert_models_close(&model, &loaded);
    assert_eq!(skin_face::encode(&loaded).unwrap(), std::fs::read(&raw).unwrap());

    let classifier = FaceClassifier::load(&compressed).unwrap();
    assert_eq!(classifier.svm().support_vectors().len(), 3);

    let _ = std::fs::remove_file(&raw);
    let _ = std::fs::remove_file(&compressed);
}

#[test]
fn out_of_range_model_is_not_written() {
    init_logger();
    let path = temp_path("too-large.svm");
    let model = SupportVectorMachine::new(1, Linear::default(), vec![vec![0.5]], vec![1.5], 0.0).unwrap();
    assert!(matches!(save_model(&path, &model), Err(Error::ValueOutOfRange(_))));
    assert!(!path.exists());
}

#[test]
fn missing_and_truncated_files_fail() {
    init_logger();
    assert!(matches!(load_model(temp_path("does-not-exist.svm")), Err(Error::Io(_))));

    let path = temp_path("truncated.svm");
    std::fs::write(&path, [1u8, 0, 0, 0, 1, 0]).unwrap();
    assert!(matches!(load_model(&path), Err(Error::InvalidModel(_))));
    let _ = std::fs::remove_file(&path);
}
