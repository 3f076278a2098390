use crate::Result;
use crate::config::{AppConfig, ConfigLoader};
use crate::runner::process::ProcessRunner;
use crate::runner::storage::ScriptStorage;
use crate::runner::types::RunOutcome;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

/// 保存脚本并用 k6 运行
pub struct TestExecutor {
    storage: ScriptStorage,
    process: ProcessRunner,
}

impl TestExecutor {
    pub fn new(storage: ScriptStorage, process: ProcessRunner) -> Self {
        Self { storage, process }
    }

    /// 根据配置和环境变量确定输出目录和 k6 路径
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ScriptStorage::new(ConfigLoader::output_dir(config)),
            ProcessRunner::new(ConfigLoader::k6_path(config)),
        )
    }

    pub fn storage(&self) -> &ScriptStorage {
        &self.storage
    }

    pub fn process(&self) -> &ProcessRunner {
        &self.process
    }

    /// 保存脚本（可能经过手动修改）
    pub fn save(&self, script: &str, test_name: &str) -> Result<PathBuf> {
        self.storage.save(script, test_name)
    }

    /// 先保存脚本，再用 k6 运行到结束
    pub async fn run(
        &self,
        script: &str,
        test_name: &str,
        lines: Option<UnboundedSender<String>>,
    ) -> Result<RunOutcome> {
        let path = self
            .storage
            .write_script(script, test_name, "No script to run.")?;
        self.process.run_streaming(&path, lines).await
    }
}
