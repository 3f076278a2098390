pub mod k6;
pub mod types;

pub use k6::ScriptComposer;
pub use types::ScriptParameters;

use crate::Result;
use crate::parser::CurlParser;

/// 解析 cURL 命令并生成 k6 脚本
pub fn generate_script(command: &str, params: &ScriptParameters) -> Result<String> {
    let request = CurlParser::parse(command)?;
    Ok(ScriptComposer::compose(&request, params))
}
