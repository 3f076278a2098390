#![cfg(unix)]

use k6gen::runner::{ProcessRunner, ScriptStorage, TestExecutor};
use k6gen::{ScriptParameters, generate_script};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

/// 模拟 k6：检查脚本、写出报告，并以 `code` 退出
fn install_fake_k6(dir: &Path, code: i32) -> String {
    let path = dir.join("k6");
    let body = format!(
        r#"#!/bin/sh
if [ "$1" != "run" ]; then
  echo "unexpected subcommand $1" 1>&2
  exit 2
fi
echo "execution: local"
echo "script: $(basename "$2")"
grep -q "export default function" "$2" || echo "no default function" 1>&2
name=$(grep -o "'./[^']*_report.html'" "$2" | tr -d "'")
echo "<html></html>" > "$name"
exit {}
"#,
        code
    );
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_generate_save_and_run() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("out");
    let k6 = install_fake_k6(temp_dir.path(), 0);

    let params = ScriptParameters::new("orders api", "10s", "2");
    let script = generate_script("curl 'https://x.test/orders'", &params).unwrap();

    let executor = TestExecutor::new(ScriptStorage::new(&out_dir), ProcessRunner::new(k6));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let outcome = executor
        .run(&script, &params.test_name, Some(tx))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(out_dir.join("orders_api.js").exists());
    assert!(out_dir.join("orders api_report.html").exists());
    assert!(outcome.output.contains("script: orders_api.js"));
    assert!(!outcome.output.contains("no default function"));
    assert!(
        outcome
            .status_message()
            .starts_with("Test completed successfully.")
    );

    let mut streamed = Vec::new();
    while let Some(line) = rx.recv().await {
        streamed.push(line);
    }
    assert_eq!(streamed[0], "execution: local");
}

#[tokio::test]
async fn test_failing_run_reports_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let k6 = install_fake_k6(temp_dir.path(), 99);

    let params = ScriptParameters::default();
    let script = generate_script("curl https://x.test/slow", &params).unwrap();

    let executor = TestExecutor::new(ScriptStorage::new(temp_dir.path()), ProcessRunner::new(k6));
    let outcome = executor.run(&script, &params.test_name, None).await.unwrap();

    assert_eq!(outcome.exit_code, Some(99));
    assert!(
        outcome
            .status_message()
            .starts_with("Test completed with issues (exit code: 99).")
    );
}
