mod common;

use common::*;
use dxd_reader::parser::dxd::MetadataSource;
use dxd_reader::parser::{DxdDataset, DxdError, DxdParser, FileParser, LoaderConfig};
use dxd_reader::{detect_dxd_format, is_dxd_file, load_dxd_files};

#[test]
fn batch_decode_keys_by_path() {
    let first = write_file("batch_a.dxd", &structured_recording(&["A", "B"], 32));
    let second = write_zip(
        "batch_b.dxz",
        &[("batch_b.dxd", structured_recording(&["C"], 64).as_slice())],
    );

    let results = load_dxd_files(&[&first, &second], &LoaderConfig::default()).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[&first].len(), 2);
    assert_eq!(results[&first]["B"].values.len(), 32);
    assert_eq!(results[&second]["C"].values.len(), 64);
    assert_eq!(results[&second]["C"].time.len(), 64);
}

#[test]
fn batch_fails_on_any_bad_file() {
    let good = write_file("batch_good.dxd", &structured_recording(&["A"], 8));
    let missing = temp_path("batch_missing.dxd");

    let err = load_dxd_files(&[&good, &missing], &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, DxdError::NotFound(_)));
}

#[test]
fn detect_reports_metadata_only() {
    let bytes = structured_recording(&["AccX", "AccY", "AccZ"], 100);
    let path = write_zip("detect.dxz", &[("detect.dxd", bytes.as_slice())]);

    let report = detect_dxd_format(&path, &LoaderConfig::default()).unwrap();
    assert!(report.is_compressed);
    assert_eq!(report.num_channels, 3);
    assert_eq!(report.channel_names, vec!["AccX", "AccY", "AccZ"]);
    assert_eq!(report.sample_rates, vec![2000.0; 3]);
    assert_eq!(report.file_size, std::fs::metadata(&path).unwrap().len());
    assert_eq!(report.metadata_source, MetadataSource::Structured);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["metadata_source"], "structured");
}

#[test]
fn sniffing_never_fails() {
    assert!(!is_dxd_file(temp_path("nowhere.dxd")));
    assert!(!is_dxd_file(std::env::temp_dir()));

    let by_extension = write_file("sniff.d7d", &[0u8; 16]);
    assert!(is_dxd_file(&by_extension));

    let vendor = write_file("sniff_vendor.bin", b"\x00\x01DEWESoft recording\x00");
    assert!(is_dxd_file(&vendor));

    let markup = write_file("sniff_markup.dat", b"<?xml version=\"1.0\"?><Setup/>");
    assert!(is_dxd_file(&markup));

    let other = write_file("sniff_other.txt", b"just some notes");
    assert!(!is_dxd_file(&other));

    // a plain zip sniffs as a candidate but is not a DXZ container
    let workbook = write_file("sniff_workbook.xlsx", b"PK\x03\x04 not really a zip");
    assert!(is_dxd_file(&workbook));
    assert!(DxdParser::open(&workbook).is_ok_and(|p| p.is_inferred()));
}

#[test]
fn summary_rows_per_channel() {
    let path = write_file("summary.dxd", &structured_recording(&["A", "B"], 500));
    let df = FileParser::parse_dxd_summary(&path, &LoaderConfig::default()).unwrap();
    assert_eq!(df.height(), 2);
    let samples = df.column("num_samples").unwrap().u64().unwrap();
    assert_eq!(samples.get(0), Some(500));
    let duration = df.column("duration_s").unwrap().f64().unwrap();
    assert_eq!(duration.get(1), Some(0.25));

    let unsupported = write_file("summary.csv", b"a,b");
    assert!(matches!(
        FileParser::parse_file(&unsupported, &LoaderConfig::default()),
        Err(DxdError::FormatError(_))
    ));
}

#[test]
fn dataset_skips_unreadable_files() {
    let dir = temp_path("dataset_dir");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("one.dxd"), structured_recording(&["A"], 10)).unwrap();
    std::fs::write(dir.join("two.dxd"), structured_recording(&["B", "C"], 10)).unwrap();
    std::fs::write(dir.join("broken.dxz"), b"not a zip").unwrap();
    std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

    let df = DxdDataset::from_directory(&dir, &LoaderConfig::default()).unwrap();
    assert_eq!(df.height(), 3);

    let strict = DxdDataset::from_files(&[dir.join("one.dxd"), dir.join("broken.dxz")], &LoaderConfig::default());
    assert!(matches!(strict, Err(DxdError::FormatError(_))));
}
