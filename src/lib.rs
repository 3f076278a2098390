pub mod config;
pub mod error;
pub mod generator;
pub mod logger;
pub mod parser;
pub mod runner;

// Re-export commonly used types
pub use error::{K6genError, Result};
pub use generator::{ScriptComposer, ScriptParameters, generate_script};
pub use parser::{CurlParser, ParsedRequest};
