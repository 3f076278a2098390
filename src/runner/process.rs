use crate::runner::types::RunOutcome;
use crate::{K6genError, Result};
use chrono::Local;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// 执行 `k6 run <script>` 并收集输出
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    k6_path: String,
}

impl ProcessRunner {
    pub fn new(k6_path: impl Into<String>) -> Self {
        Self {
            k6_path: k6_path.into(),
        }
    }

    pub fn k6_path(&self) -> &str {
        &self.k6_path
    }

    /// 运行到结束，返回收集到的输出
    pub async fn run(&self, script_path: &Path) -> Result<RunOutcome> {
        self.run_streaming(script_path, None).await
    }

    /// 运行到结束，stdout/stderr 的每一行到达时立即转发
    ///
    /// 子进程的工作目录是脚本所在目录，`handleSummary` 写出的报告和脚本放在一起。
    /// 非零退出码不算错误；启动失败和读取失败才返回错误。
    pub async fn run_streaming(
        &self,
        script_path: &Path,
        lines: Option<UnboundedSender<String>>,
    ) -> Result<RunOutcome> {
        let script_path = script_path.canonicalize()?;
        let work_dir = script_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                K6genError::Process(format!("No parent directory for {}", script_path.display()))
            })?;

        let started_at = Local::now();
        let start = Instant::now();

        let mut child = Command::new(&self.k6_path)
            .arg("run")
            .arg(&script_path)
            .current_dir(&work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                K6genError::Process(format!("Failed to start {}: {}", self.k6_path, e))
            })?;
        info!(
            "Executing command: {} run {}",
            self.k6_path,
            script_path.display()
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| K6genError::Process("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| K6genError::Process("stderr not captured".to_string()))?;

        let mut out_reader = BufReader::new(stdout);
        let mut err_reader = BufReader::new(stderr);
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();
        let mut out_done = false;
        let mut err_done = false;
        let mut output = String::new();

        // 按到达顺序交错读取两个管道，未读完的行留在各自的缓冲区里
        while !(out_done && err_done) {
            let (read, from_stdout) = tokio::select! {
                read = out_reader.read_until(b'\n', &mut out_buf), if !out_done => (read, true),
                read = err_reader.read_until(b'\n', &mut err_buf), if !err_done => (read, false),
            };

            let read = match read {
                Ok(read) => read,
                Err(e) => {
                    warn!("Failed to read k6 output: {}", e);
                    if let Err(kill_err) = child.kill().await {
                        debug!("Failed to stop k6 process: {}", kill_err);
                    }
                    return Err(e.into());
                }
            };

            let buf = if from_stdout { &mut out_buf } else { &mut err_buf };
            if read == 0 {
                if from_stdout {
                    out_done = true;
                } else {
                    err_done = true;
                }
                if buf.is_empty() {
                    continue;
                }
            }

            let line = decode_line(buf);
            buf.clear();

            debug!(target: "k6", "{}", line);
            output.push_str(&line);
            output.push('\n');
            if let Some(tx) = &lines
                && tx.send(line).is_err()
            {
                debug!("Output receiver dropped, continuing capture only");
            }
        }

        let status = child.wait().await?;
        let exit_code = status.code();
        match exit_code {
            Some(code) => info!("k6 process exited with code: {}", code),
            None => warn!("k6 process terminated by signal"),
        }

        Ok(RunOutcome {
            script_path,
            report_dir: work_dir,
            exit_code,
            output,
            started_at,
            elapsed: start.elapsed(),
        })
    }
}

/// 去掉行尾换行符，非 UTF-8 字节替换为 U+FFFD
fn decode_line(buf: &[u8]) -> String {
    let mut end = buf.len();
    while end > 0 && matches!(buf[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new("k6")
    }
}
