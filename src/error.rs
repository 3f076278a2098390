use thiserror::Error;

use crate::parser::ParseError;

#[derive(Error, Debug)]
pub enum K6genError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// 脚本为空时的提示（保存和运行各有一条）
    #[error("{0}")]
    EmptyScript(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),
}

/// Result type for k6gen crate
pub type Result<T> = std::result::Result<T, K6genError>;
