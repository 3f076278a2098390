use crate::{K6genError, Result};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SCRIPT_EXTENSION: &str = "js";

/// 将生成的脚本保存到输出目录
#[derive(Debug, Clone)]
pub struct ScriptStorage {
    output_dir: PathBuf,
}

impl ScriptStorage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `[A-Za-z0-9_-]` 以外的字符替换为 `_`
    pub fn sanitize_name(test_name: &str) -> String {
        test_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// `<output_dir>/<清理后的名称>.js`
    pub fn script_path(&self, test_name: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            Self::sanitize_name(test_name),
            SCRIPT_EXTENSION
        ))
    }

    /// k6 在输出目录中运行时 HTML 报告的位置
    /// 脚本里用的是原始测试名，这里不做清理
    pub fn report_path(&self, test_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}_report.html", test_name))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir)?;
        }
        Ok(())
    }

    /// 写入脚本文件，覆盖旧版本
    pub fn save(&self, script: &str, test_name: &str) -> Result<PathBuf> {
        self.write_script(script, test_name, "No script to save.")
    }

    pub(crate) fn write_script(
        &self,
        script: &str,
        test_name: &str,
        empty_message: &'static str,
    ) -> Result<PathBuf> {
        if script.trim().is_empty() {
            return Err(K6genError::EmptyScript(empty_message));
        }

        self.ensure_dir()?;
        let path = self.script_path(test_name);

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        // 拿到锁之后再清空
        FileExt::lock_exclusive(&file)?;
        file.set_len(0)?;
        file.write_all(script.as_bytes())?;
        file.flush()?;
        drop(file);

        info!("Script saved to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(ScriptStorage::sanitize_name("api-load-test"), "api-load-test");
        assert_eq!(ScriptStorage::sanitize_name("my test/1"), "my_test_1");
        assert_eq!(ScriptStorage::sanitize_name("../etc"), "___etc");
        assert_eq!(ScriptStorage::sanitize_name("café"), "caf_");
    }

    #[test]
    fn test_paths() {
        let storage = ScriptStorage::new("/tmp/out");
        assert_eq!(
            storage.script_path("smoke test"),
            PathBuf::from("/tmp/out/smoke_test.js")
        );
        assert_eq!(
            storage.report_path("smoke test"),
            PathBuf::from("/tmp/out/smoke test_report.html")
        );
    }

    #[test]
    fn test_save_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ScriptStorage::new(temp_dir.path().join("nested").join("dir"));

        let path = storage.save("export default function () {}\n", "smoke").unwrap();
        assert_eq!(path, storage.output_dir().join("smoke.js"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "export default function () {}\n"
        );
    }

    #[test]
    fn test_save_overwrites_shorter() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ScriptStorage::new(temp_dir.path());

        storage.save("a much longer first version\n", "smoke").unwrap();
        let path = storage.save("short\n", "smoke").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "short\n");
    }

    #[test]
    fn test_save_empty_script() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ScriptStorage::new(temp_dir.path());

        let err = storage.save("  \n", "smoke").unwrap_err();
        assert!(matches!(err, K6genError::EmptyScript(_)));
        assert_eq!(err.to_string(), "No script to save.");
        assert!(!storage.script_path("smoke").exists());
    }

    #[test]
    fn test_save_into_file_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let storage = ScriptStorage::new(&blocker);
        let result = storage.save("script", "smoke");
        assert!(matches!(result, Err(K6genError::Io(_))));
    }
}
