use crate::domain::model::RunReport;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Appends to `path`, creating it when missing.
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Human-readable location of `path`, used in reports.
    fn location(&self, path: &str) -> String;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs. Spawn failures (program not found) are errors;
/// a non-zero exit is reported through `CommandOutput::success`.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> impl std::future::Future<Output = Result<CommandOutput>> + Send;
}

/// A two-stage migration: `prepare` talks to PocketBase and the filesystem to
/// decide what to move, `execute` moves it.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Plan: Send;

    fn name(&self) -> &str;
    async fn prepare(&self) -> Result<Self::Plan>;
    async fn execute(&self, plan: Self::Plan) -> Result<RunReport>;
}
