#![cfg(not(target_arch = "wasm32"))]

use std::fs;
use std::path::Path;

use tempfile::tempdir;

fn write_rom(dir: &Path, name: &str, len: usize) -> String {
    let path = dir.join(name);
    let rom: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(&path, rom).unwrap();
    path.to_str().expect("rom path should be UTF-8").to_string()
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

#[test]
fn save_then_load_a_slot() {
    let tmp = tempdir().unwrap();
    let rom = write_rom(tmp.path(), "Demo.bin", 8192);
    let states = tmp.path().to_str().unwrap();

    let saved = assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
        .args(["save", "--rom", &rom, "--slot", "2", "--frames", "5"])
        .args(["--state-dir", states])
        .assert()
        .success();
    assert!(stdout_of(&saved).contains("saved slot 2"));
    assert!(tmp.path().join("Demo.st2").exists());
    assert!(!tmp.path().join(".Demo.st2.tmp").exists());

    let loaded = assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
        .args(["load", "--rom", &rom, "--slot", "2"])
        .env("VCS_STATE_DIR", states)
        .assert()
        .success();
    assert!(stdout_of(&loaded).contains("loaded slot 2 (5 frames"));
}

#[test]
fn inspect_prints_header_fields() {
    let tmp = tempdir().unwrap();
    let rom = write_rom(tmp.path(), "Demo.bin", 4096);
    let states = tmp.path().to_str().unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
        .args(["save", "--rom", &rom, "--state-dir", states])
        .assert()
        .success();

    let snapshot = tmp.path().join("Demo.st0");
    let inspected = assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
        .arg("inspect")
        .arg(&snapshot)
        .assert()
        .success();
    let out = stdout_of(&inspected);
    assert!(out.contains("identity: Cartridge4K"), "{out}");
    assert!(out.contains("kind:     state"), "{out}");
}

#[test]
fn loading_into_a_different_cartridge_fails() {
    let tmp = tempdir().unwrap();
    let f8 = write_rom(tmp.path(), "Game.bin", 8192);
    let states = tmp.path().to_str().unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
        .args(["save", "--rom", &f8, "--state-dir", states])
        .assert()
        .success();

    // Same file name, different cartridge size, so the slot path matches but the identity does not.
    let k4 = tmp.path().join("other");
    fs::create_dir(&k4).unwrap();
    let k4_rom = write_rom(&k4, "Game.bin", 4096);
    assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
        .args(["load", "--rom", &k4_rom, "--state-dir", states])
        .assert()
        .failure();
}

#[test]
fn missing_slot_and_bad_rom_fail() {
    let tmp = tempdir().unwrap();
    let states = tmp.path().to_str().unwrap();
    let rom = write_rom(tmp.path(), "Demo.bin", 4096);
    let odd = write_rom(tmp.path(), "Odd.bin", 3000);

    assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
        .args(["load", "--rom", &rom, "--slot", "7", "--state-dir", states])
        .assert()
        .failure();
    assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
        .args(["save", "--rom", &odd, "--state-dir", states])
        .assert()
        .failure();
}

#[test]
fn inspect_rejects_empty_and_foreign_files() {
    let tmp = tempdir().unwrap();
    let empty = tmp.path().join("empty.st0");
    fs::write(&empty, b"").unwrap();
    let foreign = tmp.path().join("foreign.st0");
    fs::write(&foreign, [3, 0, 0, 0, 0xe9, 0xff, 0x41]).unwrap();

    for path in [empty, foreign] {
        assert_cmd::cargo::cargo_bin_cmd!("vcs-machine")
            .arg("inspect")
            .arg(&path)
            .assert()
            .failure();
    }
}
