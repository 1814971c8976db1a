use firmpack_core::archive::{create_archive, publish_archive};
use firmpack_core::error::PackError;
use std::fs::{self, File};

fn member_names(tar_path: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = tar::Archive::new(File::open(tar_path).unwrap())
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn archive_holds_every_file_but_not_itself() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a.bin"), b"aaa").unwrap();
    fs::write(td.path().join("b.txt"), b"bbb").unwrap();

    let tar_path = create_archive(td.path(), "update.tar").unwrap();
    assert_eq!(tar_path, td.path().join("update.tar"));
    assert_eq!(member_names(&tar_path), ["a.bin", "b.txt"]);
}

#[test]
fn creating_over_an_existing_archive_fails() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a.bin"), b"aaa").unwrap();

    create_archive(td.path(), "update.tar").unwrap();
    let err = create_archive(td.path(), "update.tar").unwrap_err();
    assert!(matches!(err.downcast_ref::<PackError>(), Some(PackError::ArchiveExists { .. })));
}

#[test]
fn publish_refuses_to_overwrite() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a.bin"), b"aaa").unwrap();
    let tar_path = create_archive(td.path(), "update.tar").unwrap();

    let dest = td.path().join("dest");
    fs::create_dir(&dest).unwrap();
    let published = publish_archive(&tar_path, &dest, "update.tar").unwrap();
    assert_eq!(member_names(&published), ["a.bin"]);

    let err = publish_archive(&tar_path, &dest, "update.tar").unwrap_err();
    assert!(matches!(err.downcast_ref::<PackError>(), Some(PackError::ArchiveExists { .. })));
}
