pub mod curl;
pub mod types;

// Re-export commonly used types
pub use curl::CurlParser;
pub use types::{ParseError, ParseResult, ParsedRequest};

/// 从字符串解析 cURL 命令
pub fn parse_command(command: &str) -> ParseResult<ParsedRequest> {
    CurlParser::parse(command)
}
