use serde::{Deserialize, Serialize};
use std::fmt;

/// One table row keyed by column name, in column order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Column names plus untyped-by-schema cell values, as a cursor would hand them out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgEndpoint {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
}

pub fn default_port() -> u16 {
    5432
}

impl PgEndpoint {
    pub fn same_server(&self, other: &PgEndpoint) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl fmt::Display for PgEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CopyStrategy {
    /// `pg_dump` to a custom-format archive, then `pg_restore` into the target.
    #[default]
    DumpRestore,
    /// `CREATE DATABASE target TEMPLATE source` on the shared server.
    Template,
}

/// A fully resolved external program invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct PgCommand {
    pub program: String,
    pub args: Vec<String>,
    pub password: Option<String>,
}

impl PgCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            password: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn password(mut self, password: Option<&str>) -> Self {
        self.password = password.map(str::to_string);
        self
    }
}

// Display and Debug both stay free of the password.
impl fmt::Display for PgCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.password.is_some() {
            write!(f, "PGPASSWORD=*** ")?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"') {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PgCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyReport {
    pub strategy: CopyStrategy,
    pub source: String,
    pub target: String,
    pub commands_run: usize,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u128,
}
