use std::{fs, path::PathBuf, process::Command};

fn arcade() -> Command {
    Command::new(env!("CARGO_BIN_EXE_arcade"))
}

fn scratch_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("arcade-cli-{}-{name}.toml", std::process::id()));
    fs::write(&path, contents).expect("write scratch config");
    path
}

#[test]
fn help_lists_both_games() {
    let output = arcade().arg("--help").output().expect("run arcade");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("puzzle"));
    assert!(stdout.contains("tank"));
}

#[test]
fn missing_config_file_fails() {
    let output = arcade()
        .args(["--config", "/definitely/not/here/arcade.toml", "puzzle"])
        .output()
        .expect("run arcade");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"));
}

#[test]
fn unknown_config_key_fails() {
    let path = scratch_config("unknown-key", "[tank]\nspeed = 2\n");

    let output = arcade()
        .args(["--config"])
        .arg(&path)
        .arg("tank")
        .output()
        .expect("run arcade");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
}

#[test]
fn invalid_level_fails() {
    let path = scratch_config("bad-level", "[tank]\nlevel = [\"WWW\", \"W.W\", \"WWW\"]\n");

    let output = arcade()
        .args(["--config"])
        .arg(&path)
        .arg("tank")
        .output()
        .expect("run arcade");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
}
