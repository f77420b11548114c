use cbz_core::SequenceNumber;
use cbz_engine::{archive_path, entry_name, package, NormalizedAsset, PackageError};
use pretty_assertions::assert_eq;

mod common;

fn asset(dir: &std::path::Path, index: usize, bytes: &[u8]) -> NormalizedAsset {
    let sequence = SequenceNumber::from_index(index);
    let entry_name = entry_name(sequence, 3);
    let path = dir.join(&entry_name);
    std::fs::write(&path, bytes).unwrap();
    NormalizedAsset {
        sequence,
        entry_name,
        path,
        byte_len: bytes.len() as u64,
    }
}

#[test]
fn round_trip_preserves_bytes_and_order() {
    let work = tempfile::TempDir::new().unwrap();
    let out = tempfile::TempDir::new().unwrap();
    let assets = vec![
        asset(work.path(), 2, b"third"),
        asset(work.path(), 0, b"first"),
        asset(work.path(), 1, b"second"),
    ];

    let archive = package(assets, "My Comic", out.path()).unwrap();

    assert_eq!(archive.asset_count, 3);
    assert_eq!(archive.path, out.path().join("My_Comic.cbz"));
    assert_eq!(
        common::archive_entries(&archive.path),
        vec![
            ("001.jpg".to_string(), b"first".to_vec()),
            ("002.jpg".to_string(), b"second".to_vec()),
            ("003.jpg".to_string(), b"third".to_vec()),
        ]
    );
    assert_eq!(common::dir_names(out.path()), vec!["My_Comic.cbz"]);
}

#[test]
fn numeric_order_wins_over_text_order() {
    let work = tempfile::TempDir::new().unwrap();
    let out = tempfile::TempDir::new().unwrap();
    let mut assets = Vec::new();
    for index in (0..12).rev() {
        let sequence = SequenceNumber::from_index(index);
        let path = work.path().join(format!("{index}.bin"));
        std::fs::write(&path, [index as u8]).unwrap();
        assets.push(NormalizedAsset {
            sequence,
            entry_name: format!("{}.jpg", sequence.get()),
            path,
            byte_len: 1,
        });
    }

    let archive = package(assets, "order", out.path()).unwrap();
    let bodies: Vec<u8> = common::archive_entries(&archive.path)
        .into_iter()
        .map(|(_, bytes)| bytes[0])
        .collect();
    assert_eq!(bodies, (0..12).collect::<Vec<u8>>());
}

#[test]
fn empty_asset_list_writes_nothing() {
    let out = tempfile::TempDir::new().unwrap();
    let err = package(Vec::new(), "Empty", out.path()).unwrap_err();
    assert!(matches!(err, PackageError::Empty));
    assert!(common::dir_names(out.path()).is_empty());
}

#[test]
fn failed_write_leaves_no_archive_or_temp_file() {
    let work = tempfile::TempDir::new().unwrap();
    let out = tempfile::TempDir::new().unwrap();
    let mut missing = asset(work.path(), 1, b"gone");
    std::fs::remove_file(&missing.path).unwrap();
    missing.byte_len = 0;
    let assets = vec![asset(work.path(), 0, b"present"), missing];

    let err = package(assets, "Broken", out.path()).unwrap_err();

    assert!(matches!(err, PackageError::Io(_)));
    assert!(common::dir_names(out.path()).is_empty());
}

#[test]
fn existing_archive_is_replaced() {
    let work = tempfile::TempDir::new().unwrap();
    let out = tempfile::TempDir::new().unwrap();
    let target = archive_path(out.path(), "Again");
    std::fs::write(&target, b"stale").unwrap();

    let archive = package(vec![asset(work.path(), 0, b"fresh")], "Again", out.path()).unwrap();

    assert_eq!(archive.path, target);
    assert_eq!(
        common::archive_entries(&target),
        vec![("001.jpg".to_string(), b"fresh".to_vec())]
    );
}

#[test]
fn archive_name_follows_title_policy() {
    let out = std::path::Path::new("/tmp/out");
    assert_eq!(
        archive_path(out, "A/B: C"),
        out.join("A_B__C.cbz")
    );
}

#[test]
fn long_multibyte_title_fits_through_the_temporary_file() {
    let work = tempfile::TempDir::new().unwrap();
    let out = tempfile::TempDir::new().unwrap();
    let title = "漫".repeat(83);

    let archive = package(vec![asset(work.path(), 0, b"page")], &title, out.path()).unwrap();

    assert_eq!(archive.path, out.path().join(format!("{title}.cbz")));
    assert_eq!(common::dir_names(out.path()), vec![format!("{title}.cbz")]);
}

#[test]
fn failed_write_keeps_the_existing_archive() {
    let work = tempfile::TempDir::new().unwrap();
    let out = tempfile::TempDir::new().unwrap();
    let target = archive_path(out.path(), "Kept");
    std::fs::write(&target, b"previous run").unwrap();
    let missing = asset(work.path(), 0, b"gone");
    std::fs::remove_file(&missing.path).unwrap();

    assert!(package(vec![missing], "Kept", out.path()).is_err());

    assert_eq!(std::fs::read(&target).unwrap(), b"previous run");
    assert_eq!(common::dir_names(out.path()), vec!["Kept.cbz"]);
}

#[test]
fn target_that_cannot_be_replaced_leaves_it_alone() {
    let work = tempfile::TempDir::new().unwrap();
    let out = tempfile::TempDir::new().unwrap();
    let target = archive_path(out.path(), "Occupied");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("keep.txt"), b"x").unwrap();

    let err = package(vec![asset(work.path(), 0, b"page")], "Occupied", out.path()).unwrap_err();

    assert!(matches!(err, PackageError::Rename(_)));
    assert!(target.join("keep.txt").is_file());
    assert_eq!(common::dir_names(out.path()), vec!["Occupied.cbz"]);
}
