use std::fs;
use std::io::{Cursor, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use offscrub_archive::{BundleFormat, BundleSource, Error, read_entries};
use zip::write::SimpleFileOptions;

fn zip_bundle(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.add_directory("docs/", options).unwrap();
    for (name, contents) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn tar_gz_bundle(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *contents).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

const SCRIPTS: &[(&str, &[u8])] = &[
    ("OffScrub10.vbs", b"' 2010"),
    ("OffScrub16msi.vbs", b"' 2016 msi"),
    ("OffScrubC2R.vbs", b"' c2r"),
];

#[test]
fn zip_entries_are_enumerated() {
    let (format, entries) = read_entries(&zip_bundle(SCRIPTS)).unwrap();
    assert_eq!(format, BundleFormat::Zip);
    assert_eq!(entries.len(), 4);
    assert!(entries[0].is_dir);
    assert_eq!(entries[3].contents, b"' c2r");
}

#[test]
fn zip_bundle_extracts_files_only() {
    let dir = tempfile::Builder::new()
        .prefix("offscrub-test-zip-")
        .tempdir()
        .unwrap();

    let report = BundleSource::from(zip_bundle(SCRIPTS))
        .extract_to(dir.path())
        .unwrap();

    assert_eq!(report.format, Some(BundleFormat::Zip));
    assert_eq!(report.file_count(), 3);
    assert!(!dir.path().join("docs").exists());
    assert_eq!(fs::read(dir.path().join("OffScrub10.vbs")).unwrap(), b"' 2010");
}

#[test]
fn tar_gz_bundle_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("OffScrub.tar.gz");
    fs::write(&bundle, tar_gz_bundle(SCRIPTS)).unwrap();
    let dest = dir.path().join("out");

    let report = BundleSource::File(bundle).extract_to(&dest).unwrap();

    assert_eq!(report.format, Some(BundleFormat::TarGz));
    assert_eq!(report.total_bytes, SCRIPTS.iter().map(|(_, c)| c.len() as u64).sum::<u64>());
    assert!(dest.join("OffScrubC2R.vbs").is_file());
}

#[test]
fn extraction_overwrites_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("OffScrubC2R.vbs"), b"old contents that are longer").unwrap();

    BundleSource::from(zip_bundle(SCRIPTS))
        .extract_to(dir.path())
        .unwrap();

    assert_eq!(fs::read(dir.path().join("OffScrubC2R.vbs")).unwrap(), b"' c2r");
}

#[test]
fn missing_bundle_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BundleSource::File(dir.path().join("absent.zip"))
        .extract_to(dir.path())
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn malicious_zip_entry_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("dest");
    let bundle = zip_bundle(&[("../escape.vbs", b"x")]);

    let err = BundleSource::from(bundle).extract_to(&dest).unwrap_err();

    assert!(matches!(err, Error::ZipSlip { .. }));
    assert!(!dir.path().join("escape.vbs").exists());
}
