pub mod executor;
pub mod process;
pub mod reporter;
pub mod storage;
pub mod types;

pub use executor::TestExecutor;
pub use process::ProcessRunner;
pub use reporter::Reporter;
pub use storage::ScriptStorage;
pub use types::RunOutcome;
