use crate::parser::types::{ParseError, ParseResult, ParsedRequest};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// cURL 命令解析器
///
/// 每个字段都在整段文本上独立匹配。带引号的值在配对的引号处结束，
/// 不识别转义引号。
pub struct CurlParser;

impl CurlParser {
    /// 解析 cURL 命令
    pub fn parse(command: &str) -> ParseResult<ParsedRequest> {
        let url = Self::extract_url(command).ok_or(ParseError::MissingUrl)?;

        let request = ParsedRequest {
            method: Self::extract_method(command)
                .unwrap_or(ParsedRequest::DEFAULT_METHOD)
                .to_string(),
            url: url.to_string(),
            headers: Self::extract_headers(command)
                .into_iter()
                .map(str::to_string)
                .collect(),
            body: Self::extract_body(command).map(str::to_string),
        };

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            headers = request.headers.len(),
            has_body = request.body.is_some(),
            "Parsed curl command"
        );

        Ok(request)
    }

    /// 先找带引号的 URL，再找裸 URL（遇到空白截断）
    fn extract_url(command: &str) -> Option<&str> {
        static QUOTED_URL: OnceLock<Regex> = OnceLock::new();
        static BARE_URL: OnceLock<Regex> = OnceLock::new();

        let quoted = QUOTED_URL.get_or_init(|| {
            Regex::new(r#"(?:^|curl|\s)(?:'(https?://[^']+)'|"(https?://[^"]+)")"#).unwrap()
        });
        if let Some(caps) = quoted.captures(command) {
            return first_group(&caps);
        }

        let bare =
            BARE_URL.get_or_init(|| Regex::new(r"(?:^|curl|\s)(https?://\S+)").unwrap());
        bare.captures(command).and_then(|caps| first_group(&caps))
    }

    /// `-X TOKEN` / `--request TOKEN`，只接受大写
    fn extract_method(command: &str) -> Option<&str> {
        static METHOD: OnceLock<Regex> = OnceLock::new();
        let re = METHOD
            .get_or_init(|| Regex::new(r"-X\s+([A-Z]+)|--request\s+([A-Z]+)").unwrap());

        re.captures(command).and_then(|caps| first_group(&caps))
    }

    /// 所有 `-H` / `--header` 的值，保持从左到右的顺序
    fn extract_headers(command: &str) -> Vec<&str> {
        static HEADER: OnceLock<Regex> = OnceLock::new();
        let re = HEADER.get_or_init(|| {
            Regex::new(r#"(?:-H|--header)\s+(?:'([^']+)'|"([^"]+)")"#).unwrap()
        });

        re.captures_iter(command)
            .filter_map(|caps| first_group(&caps))
            .collect()
    }

    /// 最左边的 `-d` / `--data` / `--data-raw`，后面的忽略
    fn extract_body(command: &str) -> Option<&str> {
        static BODY: OnceLock<Regex> = OnceLock::new();
        let re = BODY.get_or_init(|| {
            Regex::new(r#"(?:-d|--data|--data-raw)\s+(?:'([^']+)'|"([^"]+)")"#).unwrap()
        });

        re.captures(command).and_then(|caps| first_group(&caps))
    }
}

/// 第一个参与匹配的捕获组
fn first_group<'h>(caps: &Captures<'h>) -> Option<&'h str> {
    caps.iter().skip(1).flatten().next().map(|m| m.as_str())
}
