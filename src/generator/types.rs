/// 生成脚本时的用户参数
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptParameters {
    /// 测试名称，原样用于报告文件名
    pub test_name: String,

    /// k6 持续时间，如 `30s`、`1m`
    pub duration: String,

    /// 虚拟用户数
    pub virtual_users: String,

    /// `metric: expression` 规则，为空时使用内置默认阈值
    pub thresholds: Vec<String>,
}

impl ScriptParameters {
    pub const DEFAULT_TEST_NAME: &'static str = "api-load-test";
    pub const DEFAULT_DURATION: &'static str = "1m";
    pub const DEFAULT_VIRTUAL_USERS: &'static str = "50";

    pub fn new(
        test_name: impl Into<String>,
        duration: impl Into<String>,
        virtual_users: impl Into<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            duration: duration.into(),
            virtual_users: virtual_users.into(),
            thresholds: Vec::new(),
        }
    }

    /// 添加一条原始 `metric: expression`
    pub fn with_threshold(mut self, threshold: impl Into<String>) -> Self {
        self.thresholds.push(threshold.into());
        self
    }

    /// 分别给出指标和表达式来添加阈值
    pub fn with_rule(self, metric: &str, expression: &str) -> Self {
        self.with_threshold(format!("{}: {}", metric, expression))
    }

    /// 能恰好拆成指标和表达式的阈值
    pub fn threshold_rules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.thresholds.iter().filter_map(|t| split_threshold(t))
    }
}

impl Default for ScriptParameters {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_TEST_NAME,
            Self::DEFAULT_DURATION,
            Self::DEFAULT_VIRTUAL_USERS,
        )
    }
}

/// 按每个 `": "` 拆分 `metric: expression`
///
/// 先去掉末尾的空段，剩下恰好两段时才保留
pub fn split_threshold(entry: &str) -> Option<(&str, &str)> {
    let mut parts: Vec<&str> = entry.split(": ").collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }

    match parts.as_slice() {
        [metric, expression] => Some((*metric, *expression)),
        _ => None,
    }
}
