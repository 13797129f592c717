use crate::domain::model::PgCommand;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Outcome of a finished external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    pub code: Option<i32>,
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &PgCommand) -> Result<ExitStatus>;
}
