use firmpack_core::archive::create_archive;
use firmpack_core::error::PackError;
use firmpack_core::manifest::{build_manifest, VersionSet};
use firmpack_core::verify::{verify_dir, verify_package};
use std::fs;

#[test]
fn fresh_directory_verifies_clean() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("updater.bin"), b"uuu").unwrap();
    fs::write(td.path().join("ecoboot.bin"), b"eee").unwrap();
    build_manifest(td.path(), &VersionSet::default(), None).unwrap();

    let report = verify_dir(td.path()).unwrap();
    assert!(report.all_ok());
    assert_eq!(report.files_ok, 2);
}

#[test]
fn tampered_member_is_flagged() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("updater.bin"), b"uuu").unwrap();
    build_manifest(td.path(), &VersionSet::default(), None).unwrap();

    fs::write(td.path().join("updater.bin"), b"tampered").unwrap();
    let report = verify_dir(td.path()).unwrap();
    assert_eq!(report.files_bad, 1);
    assert!(!report.all_ok());
}

#[test]
fn removed_member_is_counted_missing() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("boot.bin"), b"bbb").unwrap();
    build_manifest(td.path(), &VersionSet::default(), None).unwrap();

    fs::remove_file(td.path().join("boot.bin")).unwrap();
    let report = verify_dir(td.path()).unwrap();
    assert_eq!(report.files_missing, 1);
}

#[test]
fn packaged_archive_roundtrip_verifies() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("updater.bin"), b"uuu").unwrap();
    fs::write(td.path().join("boot.bin"), b"bbb").unwrap();
    build_manifest(td.path(), &VersionSet::default(), None).unwrap();
    let tar_path = create_archive(td.path(), "update.tar").unwrap();

    let report = verify_package(&tar_path).unwrap();
    assert!(report.all_ok());
    assert_eq!(report.files_ok, 2);
}

#[test]
fn missing_archive_is_not_found() {
    let td = tempfile::tempdir().unwrap();
    let err = verify_package(&td.path().join("none.tar")).unwrap_err();
    assert!(matches!(err.downcast_ref::<PackError>(), Some(PackError::NotFound { .. })));
}

#[test]
fn directory_without_manifest_fails() {
    let td = tempfile::tempdir().unwrap();
    let err = verify_dir(td.path()).unwrap_err();
    assert!(matches!(err.downcast_ref::<PackError>(), Some(PackError::NotFound { .. })));
}
