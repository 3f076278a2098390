use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

/// 一次 k6 运行的结果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// 被执行脚本的绝对路径
    pub script_path: PathBuf,

    /// 运行时的工作目录，HTML 报告写在这里
    pub report_dir: PathBuf,

    /// 退出码，被信号终止时为 `None`
    pub exit_code: Option<i32>,

    /// 合并后的 stdout 和 stderr，每行一条
    pub output: String,

    /// 开始时间（本地时区）
    pub started_at: DateTime<Local>,

    /// 耗时
    pub elapsed: Duration,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// 给用户看的一行状态信息
    pub fn status_message(&self) -> String {
        let dir = self.report_dir.display();
        match self.exit_code {
            Some(0) => format!("Test completed successfully. Reports saved to {}.", dir),
            Some(code) => format!(
                "Test completed with issues (exit code: {}). Reports saved to {}.",
                code, dir
            ),
            None => "Test terminated before completion (no exit code).".to_string(),
        }
    }

    /// CLI 应使用的退出码
    pub fn exit_status(&self) -> i32 {
        self.exit_code.unwrap_or(1)
    }
}
