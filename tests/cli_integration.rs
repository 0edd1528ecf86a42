//! Integration tests for the VaultLock CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Passwords and PINs come from the `VAULTLOCK_*` environment variables
//! so nothing prompts, and every project directory carries a
//! `vaultlock.toml` with the cheapest Argon2 settings.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "hunter2-hunter2";

/// Helper: get a Command pointing at the vaultlock binary.
fn vaultlock() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("vaultlock").expect("binary should exist");
    for var in [
        "VAULTLOCK_PASSWORD",
        "VAULTLOCK_PIN",
        "VAULTLOCK_NEW_PASSWORD",
        "VAULTLOCK_NEW_PIN",
        "VAULTLOCK_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Helper: a project directory with fast KDF settings.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("vaultlock.toml")
        .write_str("kdf_memory_kib = 8192\nkdf_iterations = 1\nkdf_parallelism = 1\n")
        .unwrap();
    tmp
}

/// Helper: run `args` in `dir` with the password set.
fn with_password(dir: &TempDir, args: &[&str]) -> Command {
    let mut cmd = vaultlock();
    cmd.args(args)
        .current_dir(dir.path())
        .env("VAULTLOCK_PASSWORD", PASSWORD);
    cmd
}

fn init(dir: &TempDir) {
    with_password(dir, &["init"]).assert().success();
}

/// Helper: key files under the project's key store for `lock` on the default id.
fn lock_key_files(dir: &TempDir, lock: &str) -> Vec<String> {
    let prefix = format!("vaultlock.default.{lock}.");
    let Ok(entries) = std::fs::read_dir(dir.path().join(".vaultlock/keys")) else {
        return Vec::new();
    };
    entries
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".key"))
        .collect()
}

// ---------------------------------------------------------------------------
// Static output
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    vaultlock()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("secret"))
        .stdout(predicate::str::contains("passwd"))
        .stdout(predicate::str::contains("pin"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn version_command_shows_formats() {
    vaultlock()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vaultlock"))
        .stdout(predicate::str::contains("authenticator v1"));
}

#[test]
fn no_args_shows_help() {
    vaultlock()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn completions_for_unknown_shell_fail() {
    vaultlock()
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown shell"));
}

// ---------------------------------------------------------------------------
// Before init
// ---------------------------------------------------------------------------

#[test]
fn get_before_init_fails_with_hint() {
    let dir = project();
    with_password(&dir, &["get", "API_KEY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vaultlock init"));
}

#[test]
fn invalid_id_is_rejected() {
    let dir = project();
    with_password(&dir, &["--id", "../escape", "list"])
        .assert()
        .failure();
}

#[test]
fn short_password_is_refused() {
    let dir = project();
    vaultlock()
        .arg("init")
        .current_dir(dir.path())
        .env("VAULTLOCK_PASSWORD", "short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
    dir.child(".vaultlock/default.bin")
        .assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// Secrets and properties
// ---------------------------------------------------------------------------

#[test]
fn init_set_get_flow() {
    let dir = project();
    init(&dir);
    dir.child(".vaultlock/default.bin")
        .assert(predicate::path::exists());

    // Setting needs no password.
    vaultlock()
        .args(["set", "API_KEY", "sk-12345"])
        .current_dir(dir.path())
        .assert()
        .success();

    with_password(&dir, &["get", "API_KEY"])
        .assert()
        .success()
        .stdout("sk-12345\n");
}

#[test]
fn wrong_password_is_reported() {
    let dir = project();
    init(&dir);
    vaultlock()
        .args(["secret", "s3cret"])
        .current_dir(dir.path())
        .assert()
        .success();

    vaultlock()
        .arg("secret")
        .current_dir(dir.path())
        .env("VAULTLOCK_PASSWORD", "not-the-password")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));

    with_password(&dir, &["secret"])
        .assert()
        .success()
        .stdout("s3cret\n");
}

#[test]
fn list_never_prints_secret_values() {
    let dir = project();
    init(&dir);
    vaultlock()
        .args(["set", "TOKEN", "very-private"])
        .current_dir(dir.path())
        .assert()
        .success();
    vaultlock()
        .args(["public", "set", "owner", "alice"])
        .current_dir(dir.path())
        .assert()
        .success();

    vaultlock()
        .arg("list")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("TOKEN"))
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("vaultlock.default.password"))
        .stdout(predicate::str::contains("very-private").not());

    vaultlock()
        .args(["public", "get", "owner"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout("alice\n");
}

#[test]
fn delete_removes_property() {
    let dir = project();
    init(&dir);
    vaultlock()
        .args(["set", "GONE", "x"])
        .current_dir(dir.path())
        .assert()
        .success();

    vaultlock()
        .args(["delete", "GONE", "--force"])
        .current_dir(dir.path())
        .assert()
        .success();

    with_password(&dir, &["get", "GONE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ---------------------------------------------------------------------------
// Locks
// ---------------------------------------------------------------------------

#[test]
fn pin_lock_can_be_added_and_removed() {
    let dir = project();
    init(&dir);
    vaultlock()
        .args(["set", "API_KEY", "sk-pin"])
        .current_dir(dir.path())
        .assert()
        .success();

    with_password(&dir, &["pin", "add"])
        .env("VAULTLOCK_NEW_PIN", "11111")
        .assert()
        .success();
    assert_eq!(lock_key_files(&dir, "pin").len(), 1);

    vaultlock()
        .args(["--lock", "pin", "get", "API_KEY"])
        .current_dir(dir.path())
        .env("VAULTLOCK_PIN", "11111")
        .assert()
        .success()
        .stdout("sk-pin\n");

    vaultlock()
        .args(["--lock", "pin", "get", "API_KEY"])
        .current_dir(dir.path())
        .env("VAULTLOCK_PIN", "99999")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong PIN"));

    vaultlock()
        .args(["pin", "remove"])
        .current_dir(dir.path())
        .assert()
        .success();
    assert!(lock_key_files(&dir, "pin").is_empty());

    vaultlock()
        .args(["--lock", "pin", "get", "API_KEY"])
        .current_dir(dir.path())
        .env("VAULTLOCK_PIN", "11111")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no PIN lock"));
}

#[test]
fn passwd_rotates_the_password() {
    let dir = project();
    init(&dir);
    vaultlock()
        .args(["set", "API_KEY", "sk-rotate"])
        .current_dir(dir.path())
        .assert()
        .success();

    let before = lock_key_files(&dir, "password");
    assert_eq!(before.len(), 1);

    with_password(&dir, &["passwd"])
        .env("VAULTLOCK_NEW_PASSWORD", "a-brand-new-password")
        .assert()
        .success();

    let after = lock_key_files(&dir, "password");
    assert_eq!(after.len(), 1, "replaced key should be removed: {after:?}");
    assert_ne!(before, after);

    with_password(&dir, &["get", "API_KEY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));

    vaultlock()
        .args(["get", "API_KEY"])
        .current_dir(dir.path())
        .env("VAULTLOCK_PASSWORD", "a-brand-new-password")
        .assert()
        .success()
        .stdout("sk-rotate\n");
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn second_init_needs_force() {
    let dir = project();
    init(&dir);

    with_password(&dir, &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    with_password(&dir, &["init", "--force"]).assert().success();
    assert_eq!(lock_key_files(&dir, "password").len(), 1);
}

#[test]
fn failed_forced_init_keeps_the_existing_authenticator() {
    let dir = project();
    init(&dir);
    vaultlock()
        .args(["secret", "s3cret"])
        .current_dir(dir.path())
        .assert()
        .success();

    vaultlock()
        .args(["init", "--force"])
        .current_dir(dir.path())
        .env("VAULTLOCK_PASSWORD", "short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8 characters"));

    with_password(&dir, &["secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret"));
    assert_eq!(lock_key_files(&dir, "password").len(), 1);
}

#[test]
fn reset_deletes_authenticator_and_keys() {
    let dir = project();
    init(&dir);
    assert_eq!(lock_key_files(&dir, "password").len(), 1);

    vaultlock()
        .args(["reset", "--force"])
        .current_dir(dir.path())
        .assert()
        .success();

    dir.child(".vaultlock/default.bin")
        .assert(predicate::path::missing());
    assert!(lock_key_files(&dir, "password").is_empty());
}

#[test]
fn separate_ids_are_independent() {
    let dir = project();
    init(&dir);
    with_password(&dir, &["--id", "work", "init"]).assert().success();

    vaultlock()
        .args(["--id", "work", "set", "ONLY_WORK", "w"])
        .current_dir(dir.path())
        .assert()
        .success();

    with_password(&dir, &["get", "ONLY_WORK"])
        .assert()
        .failure();
    with_password(&dir, &["--id", "work", "get", "ONLY_WORK"])
        .assert()
        .success()
        .stdout("w\n");
}
