use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Select, Text};
use k6gen::config::{AppConfig, ConfigLoader, ParameterOverrides};
use k6gen::generator::{ScriptParameters, generate_script};
use k6gen::parser::CurlParser;
use k6gen::runner::{Reporter, TestExecutor};
use tokio::sync::mpsc;
use tracing::{error, info};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// 交互模式下可选的阈值指标
const THRESHOLD_METRICS: [&str; 5] = [
    "http_req_duration",
    "http_req_failed",
    "http_reqs",
    "http_req_waiting",
    "http_req_connecting",
];
const DEFAULT_THRESHOLD_RULE: &str = "p(95)<5000";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 指定配置文件，不自动查找 k6gen.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 运行结束后一次性打印 k6 输出，而不是逐行输出
    #[arg(long, global = true)]
    pub no_stream: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 显示从 cURL 命令中提取出的内容
    Parse {
        #[command(flatten)]
        input: CommandInput,

        /// 输出 JSON 而不是表格
        #[arg(long)]
        json: bool,
    },

    /// 从 cURL 命令生成 k6 脚本
    Generate {
        #[command(flatten)]
        input: CommandInput,

        #[command(flatten)]
        script: ScriptArgs,

        /// 写入指定文件而不是 stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 保存到输出目录，文件名为 <name>.js
        #[arg(long)]
        save: bool,

        /// 保存后用 k6 运行
        #[arg(long)]
        run: bool,
    },

    /// 将脚本（可能经过手动修改）保存到输出目录
    Save(StoredScriptArgs),

    /// 保存脚本到输出目录并用 k6 运行
    Run(StoredScriptArgs),

    /// 交互式输入命令和测试参数
    Interactive,
}

/// cURL 命令的来源
#[derive(Args)]
pub struct CommandInput {
    /// cURL 命令，整体作为一个参数并加引号
    pub command: Option<String>,

    /// 从文件读取 cURL 命令
    #[arg(short, long, conflicts_with = "command")]
    pub file: Option<PathBuf>,
}

impl CommandInput {
    fn read(self) -> Result<String> {
        if let Some(command) = self.command {
            return Ok(command);
        }
        if let Some(path) = self.file {
            return read_file(&path);
        }
        read_stdin("curl command")
    }
}

#[derive(Args)]
pub struct ScriptArgs {
    /// 测试名称
    #[arg(short, long)]
    pub name: Option<String>,

    /// 持续时间，如 30s、1m
    #[arg(short, long)]
    pub duration: Option<String>,

    /// 虚拟用户数
    #[arg(long)]
    pub vus: Option<String>,

    /// 阈值，格式 "metric: expression"，可重复
    #[arg(short, long = "threshold")]
    pub thresholds: Vec<String>,
}

impl From<ScriptArgs> for ParameterOverrides {
    fn from(args: ScriptArgs) -> Self {
        Self {
            test_name: args.name,
            duration: args.duration,
            vus: args.vus,
            thresholds: args.thresholds,
        }
    }
}

#[derive(Args)]
pub struct StoredScriptArgs {
    /// 测试名称，用作文件名
    #[arg(short, long)]
    pub name: Option<String>,

    /// 脚本文件，省略时从 stdin 读取
    #[arg(short, long)]
    pub script: Option<PathBuf>,
}

impl StoredScriptArgs {
    fn resolve(self, config: &AppConfig) -> Result<(String, String)> {
        let name = self.name.unwrap_or_else(|| {
            config
                .script_parameters(ParameterOverrides::default())
                .test_name
        });
        let script = match self.script {
            Some(path) => read_file(&path)?,
            None => read_stdin("script")?,
        };
        Ok((name, script))
    }
}

/// 执行命令，返回进程退出码
pub async fn run(cli: Cli) -> Result<i32> {
    let config = ConfigLoader::load(cli.config.as_deref())?;
    let reporter = Reporter::new(!cli.no_stream);

    match cli.command {
        Commands::Parse { input, json } => {
            let request = CurlParser::parse(&input.read()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&request)?);
            } else {
                reporter.print_request(&request);
            }
            Ok(0)
        }
        Commands::Generate {
            input,
            script,
            output,
            save,
            run,
        } => {
            let command = input.read()?;
            let params = config.script_parameters(script.into());
            let script = generate_script(&command, &params)?;

            if let Some(path) = output {
                fs::write(&path, &script)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Script written to {}", path.display());
            } else if !save && !run {
                print!("{}", script);
            }

            let executor = TestExecutor::from_config(&config);
            if run {
                Ok(run_script(&reporter, &executor, &script, &params.test_name).await)
            } else if save {
                Ok(save_script(&reporter, &executor, &script, &params.test_name))
            } else {
                Ok(0)
            }
        }
        Commands::Save(args) => {
            let (name, script) = args.resolve(&config)?;
            let executor = TestExecutor::from_config(&config);
            Ok(save_script(&reporter, &executor, &script, &name))
        }
        Commands::Run(args) => {
            let (name, script) = args.resolve(&config)?;
            let executor = TestExecutor::from_config(&config);
            Ok(run_script(&reporter, &executor, &script, &name).await)
        }
        Commands::Interactive => interactive(&config, &reporter).await,
    }
}

fn save_script(
    reporter: &Reporter,
    executor: &TestExecutor,
    script: &str,
    test_name: &str,
) -> i32 {
    match executor.save(script, test_name) {
        Ok(path) => {
            reporter.print_saved(&path);
            0
        }
        Err(e) => {
            error!("Error saving script: {}", e);
            reporter.print_save_failure(&e);
            1
        }
    }
}

async fn run_script(
    reporter: &Reporter,
    executor: &TestExecutor,
    script: &str,
    test_name: &str,
) -> i32 {
    reporter.print_run_header(
        &executor.storage().script_path(test_name),
        executor.process().k6_path(),
    );

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let (result, ()) = tokio::join!(executor.run(script, test_name, Some(tx)), async {
        while let Some(line) = rx.recv().await {
            reporter.print_line(&line);
        }
    });

    match result {
        Ok(outcome) => {
            reporter.print_outcome(&outcome);
            outcome.exit_status()
        }
        Err(e) => {
            error!("Error running k6 test: {}", e);
            reporter.print_run_failure(&e);
            1
        }
    }
}

/// 通过提示收集输入，然后保存或运行
async fn interactive(config: &AppConfig, reporter: &Reporter) -> Result<i32> {
    let defaults = config.script_parameters(ParameterOverrides::default());

    let command = Text::new("Enter cURL command:")
        .with_help_message("Paste your cURL command here")
        .prompt()?;
    let test_name = Text::new("Test name:")
        .with_default(&defaults.test_name)
        .prompt()?;
    let duration = Text::new("Duration (e.g., 1m, 30s):")
        .with_default(&defaults.duration)
        .prompt()?;
    let vus = Text::new("Virtual users:")
        .with_default(&defaults.virtual_users)
        .prompt()?;

    let mut thresholds = defaults.thresholds;
    for threshold in &thresholds {
        println!("  threshold: {}", threshold);
    }
    while Confirm::new("Add a performance threshold?")
        .with_default(false)
        .prompt()?
    {
        let metric = Select::new("Metric:", THRESHOLD_METRICS.to_vec()).prompt()?;
        let rule = Text::new("Rule:")
            .with_default(DEFAULT_THRESHOLD_RULE)
            .with_help_message("e.g. p(95)<5000")
            .prompt()?;
        let rule = rule.trim();
        if !rule.is_empty() {
            thresholds.push(format!("{}: {}", metric, rule));
        }
    }

    let params = ScriptParameters {
        test_name,
        duration,
        virtual_users: vus,
        thresholds,
    };
    let script = generate_script(&command, &params)?;
    println!("\n{}", script);

    let executor = TestExecutor::from_config(config);
    let actions = vec!["Save script", "Run test", "Quit"];
    let choice = Select::new("What next?", actions).prompt()?;
    let code = match choice {
        "Save script" => save_script(reporter, &executor, &script, &params.test_name),
        "Run test" => run_script(reporter, &executor, &script, &params.test_name).await,
        _ => 0,
    };
    Ok(code)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_stdin(what: &str) -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("No {} given; pass it as an argument, a file, or on stdin", what);
    }
    Ok(io::read_to_string(stdin)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_args() {
        let cli = Cli::try_parse_from([
            "k6gen",
            "generate",
            "curl 'https://x.test'",
            "--name",
            "smoke",
            "-d",
            "30s",
            "--vus",
            "10",
            "-t",
            "http_reqs: rate<100",
            "-t",
            "http_req_failed: rate<0.01",
            "--save",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                input,
                script,
                save,
                run,
                output,
            } => {
                assert_eq!(input.command.as_deref(), Some("curl 'https://x.test'"));
                assert_eq!(script.name.as_deref(), Some("smoke"));
                assert_eq!(script.duration.as_deref(), Some("30s"));
                assert_eq!(script.vus.as_deref(), Some("10"));
                assert_eq!(script.thresholds.len(), 2);
                assert!(save);
                assert!(!run);
                assert!(output.is_none());
            }
            _ => panic!("Expected generate"),
        }
    }

    #[test]
    fn test_command_and_file_conflict() {
        let result = Cli::try_parse_from([
            "k6gen",
            "parse",
            "curl 'https://x.test'",
            "--file",
            "cmd.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "k6gen", "--config", "k6gen.toml", "run", "--name", "smoke", "--script", "smoke.js",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("k6gen.toml")));
        assert!(!cli.no_stream);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.name.as_deref(), Some("smoke"));
                assert_eq!(args.script, Some(PathBuf::from("smoke.js")));
            }
            _ => panic!("Expected run"),
        }
    }

    #[test]
    fn test_no_stream_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["k6gen", "run", "--script", "smoke.js", "--no-stream"])
            .unwrap();
        assert!(cli.no_stream);
    }

    #[test]
    fn test_overrides_from_args() {
        let args = ScriptArgs {
            name: Some("smoke".to_string()),
            duration: None,
            vus: Some("5".to_string()),
            thresholds: vec![],
        };
        let overrides: ParameterOverrides = args.into();
        assert_eq!(overrides.test_name.as_deref(), Some("smoke"));
        assert_eq!(overrides.duration, None);
        assert_eq!(overrides.vus.as_deref(), Some("5"));
    }
}
