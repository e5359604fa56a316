#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// 設定キーを環境から外し、空のディレクトリで実行する
fn site_in(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.current_dir(dir);
    for key in siteflow_config::KEYS {
        cmd.env_remove(key);
    }
    cmd
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("静的サイト"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("version"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("siteflow"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// upコマンドのヘルプに上書き用フラグが並ぶことを確認
#[test]
fn test_up_help() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("up")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--domain"))
        .stdout(predicate::str::contains("--zone-id"))
        .stdout(predicate::str::contains("--certificate-arn"))
        .stdout(predicate::str::contains("--distribution-id"))
        .stdout(predicate::str::contains("--repair-alias"))
        .stdout(predicate::str::contains("--dns"))
        .stdout(predicate::str::contains("--json"));
}

/// planコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_plan_help() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("plan")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--env-file"))
        .stdout(predicate::str::contains("--json"));
}

/// 不明なサブコマンドはエラーになる
#[test]
fn test_unknown_command() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("deploy").assert().failure();
}

/// ドメイン未設定は設定エラー (78)
#[test]
fn test_up_without_domain_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    site_in(dir.path())
        .arg("up")
        .assert()
        .code(78)
        .stderr(predicate::str::contains("SITE_FQDN"));
}

#[test]
fn test_plan_without_domain_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    site_in(dir.path()).arg("plan").assert().code(78);
}

/// 明示した .env が存在しない場合も設定エラー
#[test]
fn test_missing_env_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    site_in(dir.path())
        .args(["plan", "--env-file", "missing.env", "--domain", "www.example.com"])
        .assert()
        .code(78);
}

/// スキーム付きのドメインは拒否される
#[test]
fn test_domain_with_scheme_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    site_in(dir.path())
        .args(["up", "--domain", "https://www.example.com"])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("FQDN"));
}

/// .env の不正な真偽値は設定エラー
#[test]
fn test_invalid_bool_in_env_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "SITE_FQDN=www.example.com\nSITE_REPAIR_ALIAS=maybe\n",
    )
    .unwrap();
    site_in(dir.path())
        .arg("up")
        .assert()
        .code(78)
        .stderr(predicate::str::contains("SITE_REPAIR_ALIAS"));
}

/// 不明な DNS モードは設定エラー
#[test]
fn test_unknown_dns_mode_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    site_in(dir.path())
        .args(["plan", "--domain", "www.example.com", "--dns", "cloudflare"])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("SITE_DNS"));
}

/// カレントディレクトリの .env が読み込まれる
#[test]
fn test_env_file_in_working_directory_is_read() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "SITE_FQDN=https://www.example.com\n").unwrap();
    site_in(dir.path())
        .arg("plan")
        .assert()
        .code(78)
        .stderr(predicate::str::contains("FQDN"));
}
