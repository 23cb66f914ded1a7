//! CLI argument and reference-image tests — no pipeline I/O.
//!
//! Every failure here happens before a pipeline adapter is created, so no
//! cassette or server is needed.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mnemosyne");
    cmd.args(["--config", "/nonexistent/mnemosyne.toml"])
        .env_remove("MNEMOSYNE_REPLAY")
        .env_remove("MNEMOSYNE_REC")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_prompt_is_a_usage_error() {
    cmd()
        .args(["--image-path", "ref.png"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--prompt"));
}

#[test]
fn blank_prompt_rejected() {
    cmd()
        .args(["--prompt", "   ", "--image-path", "ref.png"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Prompt must not be empty"));
}

#[test]
fn zero_steps_rejected() {
    cmd()
        .args(["--prompt", "a knight", "--image-path", "ref.png", "--steps", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Steps must be at least 1"));
}

#[test]
fn out_of_range_scale_rejected() {
    cmd()
        .args(["--prompt", "a knight", "--image-path", "ref.png", "--scale", "1.5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported scale"));
}

#[test]
fn unknown_device_rejected() {
    cmd()
        .args(["--prompt", "a knight", "--image-path", "ref.png", "--device", "tpu"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported device"));
}

#[test]
fn missing_reference_image() {
    cmd()
        .args(["--prompt", "a knight", "--image-path", "/nonexistent/knight.png"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("--- Mnemosyne Prototype ---"))
        .stdout(predicate::str::contains("Reference Image: /nonexistent/knight.png"))
        .stderr(predicate::str::contains(
            "Error loading image: Image not found at /nonexistent/knight.png",
        ));
}

#[test]
fn undecodable_reference_image() {
    let path = std::env::temp_dir().join("mnemosyne_cli_not_an_image.png");
    std::fs::write(&path, b"plain text").unwrap();

    cmd()
        .args(["--prompt", "a knight", "--image-path", path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error loading image: Failed to load image"));

    let _ = std::fs::remove_file(&path);
}
