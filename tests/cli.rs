//! Command-line behaviour that does not open a window.

use std::process::Command;

/// Run the player binary and capture output
fn run_player(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_playlist-player"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute playlist-player");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn no_videos_prints_usage_and_fails() {
    let (stdout, _stderr, exit_code) = run_player(&[]);

    assert_eq!(exit_code, 1);
    assert!(stdout.contains("No videos given"));
    assert!(stdout.contains("Usage: playlist-player"));
    assert!(!stdout.contains("Controls:"));
}

#[test]
fn labeled_without_videos_prints_usage() {
    let (stdout, _stderr, exit_code) = run_player(&["--labeled"]);

    assert_eq!(exit_code, 1);
    assert!(stdout.contains("Usage: playlist-player"));
}

#[test]
fn odd_labeled_arguments_need_a_label() {
    let (stdout, _stderr, exit_code) = run_player(&["--labeled", "Cafe A", "a.mp4", "b.mp4"]);

    assert_eq!(exit_code, 1);
    assert!(stdout.contains("Each video must have a label"));
    assert!(stdout.contains("Usage: playlist-player"));
}

#[test]
fn help_lists_options() {
    let (stdout, _stderr, exit_code) = run_player(&["--help"]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Play a list of videos"));
    assert!(stdout.contains("--labeled"));
    assert!(stdout.contains("--windowed"));
    assert!(stdout.contains("[VIDEOS]..."));
}
