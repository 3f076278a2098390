use crate::config::types::AppConfig;
use crate::{K6genError, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// 覆盖 `[runner] output_dir`
pub const OUTPUT_DIR_ENV: &str = "K6GEN_OUTPUT_DIR";
/// 覆盖 `[runner] k6_path`
pub const K6_PATH_ENV: &str = "K6GEN_K6_PATH";

const DEFAULT_K6_PATH: &str = "k6";

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "k6gen.toml";

    /// 加载指定文件，或自动查找，找不到时使用默认配置
    ///
    /// 显式指定的文件必须能加载；自动找到的文件解析失败时只记录警告
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::find_and_load().unwrap_or_default()),
        }
    }

    /// 从指定路径加载配置
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            K6genError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = toml::from_str(&content).map_err(|e| {
            K6genError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 查找顺序:
    /// 1. 当前目录及其父目录
    /// 2. ~/.config/k6gen/
    pub fn find_and_load() -> Option<AppConfig> {
        let candidate = Self::find_in_current_dir().or_else(Self::find_in_user_dir)?;

        match Self::load_from_path(&candidate) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                None
            }
        }
    }

    fn find_in_current_dir() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("k6gen").join(Self::CONFIG_FILE);

        config_path.exists().then_some(config_path)
    }

    /// k6 可执行文件：环境变量 > 配置文件 > `k6`
    pub fn k6_path(config: &AppConfig) -> String {
        std::env::var(K6_PATH_ENV)
            .ok()
            .or_else(|| config.runner.k6_path.clone())
            .map(|p| expand_path(&p).to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_K6_PATH.to_string())
    }

    /// 输出目录：环境变量 > 配置文件 > 下载目录
    pub fn output_dir(config: &AppConfig) -> PathBuf {
        std::env::var(OUTPUT_DIR_ENV)
            .ok()
            .or_else(|| config.runner.output_dir.clone())
            .map(|dir| expand_path(&dir))
            .unwrap_or_else(default_output_dir)
    }
}

/// 下载目录，其次 `<home>/Downloads`，最后 `./downloads`
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

/// 展开 `${VAR}` 和开头的 `~/`
pub fn expand_path(raw: &str) -> PathBuf {
    let resolved = resolve_env_vars(raw);

    if let Some(rest) = resolved.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(resolved)
}

/// 用环境变量替换 `${VAR}`，未定义的保持原样
pub fn resolve_env_vars(text: &str) -> String {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

    re.replace_all(text, |caps: &Captures| {
        let env_name = &caps[1];
        std::env::var(env_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .to_string()
}
