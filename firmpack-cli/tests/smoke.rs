use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn local_updater_package_end_to_end() {
    let td = assert_fs::TempDir::new().unwrap();
    td.child("my_updater.bin").write_binary(b"updater image bytes").unwrap();

    Command::cargo_bin("firmpack")
        .unwrap()
        .current_dir(td.path())
        .args(["--updater", "my_updater.bin", "--updater-version", "0.0.3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("update.tar"));

    td.child("update.tar").assert(predicate::path::is_file());
    let report = firmpack_core::verify::verify_package(&td.path().join("update.tar")).unwrap();
    assert!(report.all_ok());
}

#[test]
fn boot_image_and_custom_output_name() {
    let td = assert_fs::TempDir::new().unwrap();
    td.child("u.bin").write_binary(b"uuu").unwrap();
    td.child("b.bin").write_binary(b"bbb").unwrap();
    let out = td.child("packages");
    out.create_dir_all().unwrap();

    Command::cargo_bin("firmpack")
        .unwrap()
        .current_dir(td.path())
        .args([
            "-u", "u.bin",
            "-b", "b.bin",
            "--boot-version", "7.7.7",
            "-w", "packages",
            "-o", "nightly.tar",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("nightly.tar"));

    out.child("nightly.tar").assert(predicate::path::is_file());
    let report =
        firmpack_core::verify::verify_package(&out.path().join("nightly.tar")).unwrap();
    assert!(report.all_ok());
}

#[test]
fn existing_package_makes_the_run_fail() {
    let td = assert_fs::TempDir::new().unwrap();
    td.child("u.bin").write_binary(b"uuu").unwrap();
    td.child("update.tar").write_binary(b"old archive").unwrap();

    Command::cargo_bin("firmpack")
        .unwrap()
        .current_dir(td.path())
        .args(["-u", "u.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // The stale package is untouched.
    assert_eq!(std::fs::read(td.path().join("update.tar")).unwrap(), b"old archive");
}

#[test]
fn missing_updater_path_exits_nonzero() {
    let td = assert_fs::TempDir::new().unwrap();

    Command::cargo_bin("firmpack")
        .unwrap()
        .current_dir(td.path())
        .args(["-u", "absent.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
