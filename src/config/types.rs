use crate::generator::ScriptParameters;
use serde::Deserialize;
use std::fmt;

/// 完整的 `k6gen.toml` 配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 脚本参数默认值
    pub defaults: ScriptDefaults,

    /// 脚本保存位置和 k6 路径
    pub runner: RunnerConfig,
}

/// `[defaults]` 部分
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ScriptDefaults {
    pub test_name: Option<String>,
    pub duration: Option<String>,
    pub vus: Option<VirtualUsers>,
    pub thresholds: Vec<String>,
}

/// `vus` 可以写成数字或字符串
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VirtualUsers {
    Count(u64),
    Text(String),
}

impl fmt::Display for VirtualUsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualUsers::Count(n) => write!(f, "{}", n),
            VirtualUsers::Text(s) => write!(f, "{}", s),
        }
    }
}

/// `[runner]` 部分
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RunnerConfig {
    /// k6 可执行文件，未设置时使用 PATH 中的 `k6`
    pub k6_path: Option<String>,

    /// 脚本和报告的保存目录
    pub output_dir: Option<String>,
}

/// 命令行传入的值，`None` 时回退到配置文件
#[derive(Debug, Clone, Default)]
pub struct ParameterOverrides {
    pub test_name: Option<String>,
    pub duration: Option<String>,
    pub vus: Option<String>,
    pub thresholds: Vec<String>,
}

impl AppConfig {
    /// 命令行参数覆盖配置中的默认值
    ///
    /// 命令行给出阈值时整体替换配置中的列表
    pub fn script_parameters(&self, overrides: ParameterOverrides) -> ScriptParameters {
        let defaults = &self.defaults;

        let test_name = overrides
            .test_name
            .or_else(|| defaults.test_name.clone())
            .unwrap_or_else(|| ScriptParameters::DEFAULT_TEST_NAME.to_string());
        let duration = overrides
            .duration
            .or_else(|| defaults.duration.clone())
            .unwrap_or_else(|| ScriptParameters::DEFAULT_DURATION.to_string());
        let vus = overrides
            .vus
            .or_else(|| defaults.vus.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| ScriptParameters::DEFAULT_VIRTUAL_USERS.to_string());

        let thresholds = if overrides.thresholds.is_empty() {
            defaults.thresholds.clone()
        } else {
            overrides.thresholds
        };

        ScriptParameters {
            test_name,
            duration,
            virtual_users: vus,
            thresholds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_builtin_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        let params = config.script_parameters(ParameterOverrides::default());

        assert_eq!(params, ScriptParameters::default());
    }

    #[test]
    fn test_vus_number_or_string() {
        let config: AppConfig = toml::from_str("[defaults]\nvus = 25\n").unwrap();
        assert_eq!(config.defaults.vus, Some(VirtualUsers::Count(25)));

        let config: AppConfig = toml::from_str("[defaults]\nvus = \"${VUS}\"\n").unwrap();
        assert_eq!(
            config.defaults.vus,
            Some(VirtualUsers::Text("${VUS}".to_string()))
        );
    }

    #[test]
    fn test_overrides_win() {
        let config: AppConfig = toml::from_str(
            r#"
[defaults]
test_name = "nightly"
duration = "5m"
vus = 100
thresholds = ["http_req_failed: rate<0.01"]
"#,
        )
        .unwrap();

        let params = config.script_parameters(ParameterOverrides::default());
        assert_eq!(params.test_name, "nightly");
        assert_eq!(params.duration, "5m");
        assert_eq!(params.virtual_users, "100");
        assert_eq!(params.thresholds, vec!["http_req_failed: rate<0.01"]);

        let params = config.script_parameters(ParameterOverrides {
            test_name: Some("smoke".to_string()),
            duration: None,
            vus: Some("10".to_string()),
            thresholds: vec!["http_reqs: rate<100".to_string()],
        });
        assert_eq!(params.test_name, "smoke");
        assert_eq!(params.duration, "5m");
        assert_eq!(params.virtual_users, "10");
        assert_eq!(params.thresholds, vec!["http_reqs: rate<100"]);
    }
}
