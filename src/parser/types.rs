use serde::Serialize;

/// 从 cURL 命令中提取出的请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRequest {
    /// HTTP 方法，没有 `-X`/`--request` 时为 GET
    pub method: String,

    /// 请求 URL（必需）
    pub url: String,

    /// 原始 Header 字符串（`Name: value`），保持原始顺序
    pub headers: Vec<String>,

    /// 请求体（可选）
    pub body: Option<String>,
}

impl ParsedRequest {
    pub const DEFAULT_METHOD: &'static str = "GET";

    /// 创建一个 GET 请求
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            method: Self::DEFAULT_METHOD.to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// 按 `": "` 拆成名称和值的 Header，没有分隔符的跳过
    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().filter_map(|h| h.split_once(": "))
    }

    /// 非空的请求体
    pub fn non_empty_body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}

/// 解析错误类型
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 命令中没有 http(s) URL
    #[error("Failed to extract URL from cURL command.")]
    MissingUrl,
}

/// 解析结果类型别名
pub type ParseResult<T> = Result<T, ParseError>;
