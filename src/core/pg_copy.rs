//! Copies one PostgreSQL database into another by driving the client tools.
//!
//! Two strategies are supported. `DumpRestore` works across servers: a
//! custom-format `pg_dump` archive is written to disk and replayed with
//! `pg_restore`. `Template` asks the server to clone the database with
//! `CREATE DATABASE .. TEMPLATE ..`, which is faster but needs both databases
//! on the same server and no open connections to the source.
//!
//! No shell is involved. Passwords travel in `PGPASSWORD`, never on argv.

use crate::domain::model::{CopyReport, CopyStrategy, PgCommand, PgEndpoint};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{CaixaError, Result};
use crate::utils::validation::{
    validate_identifier, validate_non_empty_string, validate_path, validate_range, Validate,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgCopyPlan {
    pub source: PgEndpoint,
    pub target: PgEndpoint,
    pub strategy: CopyStrategy,
    pub dump_file: PathBuf,
    pub keep_dump: bool,
    /// Run `createdb` for the target before restoring.
    pub create_target: bool,
    /// Database to connect to when issuing `CREATE DATABASE`.
    pub maintenance_db: String,
}

impl PgCopyPlan {
    pub fn new(source: PgEndpoint, target: PgEndpoint, strategy: CopyStrategy) -> Self {
        let dump_file = Self::default_dump_file(&source);
        Self {
            source,
            target,
            strategy,
            dump_file,
            keep_dump: false,
            create_target: false,
            maintenance_db: "postgres".to_string(),
        }
    }

    pub fn default_dump_file(source: &PgEndpoint) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        PathBuf::from(format!("{}_{}.dump", source.database, stamp))
    }

    pub fn commands(&self) -> Vec<PgCommand> {
        match self.strategy {
            CopyStrategy::DumpRestore => {
                let dump_file = self.dump_file.to_string_lossy().into_owned();
                let mut commands = Vec::with_capacity(3);

                commands.push(
                    connection_args(PgCommand::new("pg_dump"), &self.source)
                        .arg("--format=custom")
                        .arg("--file")
                        .arg(dump_file.clone())
                        .arg(self.source.database.clone()),
                );

                if self.create_target {
                    commands.push(
                        connection_args(PgCommand::new("createdb"), &self.target)
                            .arg(self.target.database.clone()),
                    );
                }

                commands.push(
                    connection_args(PgCommand::new("pg_restore"), &self.target)
                        .arg("--no-owner")
                        .arg("--dbname")
                        .arg(self.target.database.clone())
                        .arg(dump_file),
                );

                commands
            }
            CopyStrategy::Template => {
                let sql = format!(
                    "CREATE DATABASE {} TEMPLATE {}",
                    quote_identifier(&self.target.database),
                    quote_identifier(&self.source.database)
                );
                vec![connection_args(PgCommand::new("psql"), &self.source)
                    .arg("--dbname")
                    .arg(self.maintenance_db.clone())
                    .arg("--set")
                    .arg("ON_ERROR_STOP=1")
                    .arg("--command")
                    .arg(sql)]
            }
        }
    }
}

fn connection_args(command: PgCommand, endpoint: &PgEndpoint) -> PgCommand {
    command
        .arg("--host")
        .arg(endpoint.host.clone())
        .arg("--port")
        .arg(endpoint.port.to_string())
        .arg("--username")
        .arg(endpoint.user.clone())
        .arg("--no-password")
        .password(endpoint.password.as_deref())
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn validate_endpoint(section: &str, endpoint: &PgEndpoint) -> Result<()> {
    validate_non_empty_string(&format!("{}.host", section), &endpoint.host)?;
    validate_range(&format!("{}.port", section), endpoint.port, 1, u16::MAX)?;
    validate_identifier(&format!("{}.database", section), &endpoint.database)?;
    validate_non_empty_string(&format!("{}.user", section), &endpoint.user)?;
    Ok(())
}

impl Validate for PgCopyPlan {
    fn validate(&self) -> Result<()> {
        validate_endpoint("source", &self.source)?;
        validate_endpoint("target", &self.target)?;

        if self.source.same_server(&self.target) && self.source.database == self.target.database {
            return Err(CaixaError::ConfigValidationError {
                field: "target.database".to_string(),
                message: "Source and target are the same database".to_string(),
            });
        }

        match self.strategy {
            CopyStrategy::DumpRestore => {
                let dump_file = self.dump_file.to_string_lossy();
                validate_path("copy.dump_file", &dump_file)?;
                // pg_restore takes the archive as a positional argument
                if dump_file.starts_with('-') {
                    return Err(CaixaError::InvalidConfigValueError {
                        field: "copy.dump_file".to_string(),
                        value: dump_file.into_owned(),
                        reason: "Dump file must not start with '-'; prefix it with ./".to_string(),
                    });
                }
            }
            CopyStrategy::Template => {
                if !self.source.same_server(&self.target) {
                    return Err(CaixaError::ConfigValidationError {
                        field: "copy.strategy".to_string(),
                        message: format!(
                            "Template copies need both databases on one server, got {}:{} and {}:{}",
                            self.source.host, self.source.port, self.target.host, self.target.port
                        ),
                    });
                }
                validate_identifier("copy.maintenance_db", &self.maintenance_db)?;
            }
        }

        Ok(())
    }
}

pub struct PgCopier<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> PgCopier<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Runs the plan's commands in order and stops at the first failure.
    pub async fn run(&self, plan: &PgCopyPlan) -> Result<CopyReport> {
        plan.validate()?;

        let started_at = chrono::Utc::now();
        let start = Instant::now();
        let commands = plan.commands();

        tracing::info!(
            "Copying {} -> {} ({:?}, {} steps)",
            plan.source,
            plan.target,
            plan.strategy,
            commands.len()
        );

        if plan.strategy == CopyStrategy::DumpRestore {
            ensure_parent_dir(&plan.dump_file).await?;
        }

        for (step, command) in commands.iter().enumerate() {
            tracing::info!("[{}/{}] {}", step + 1, commands.len(), command);
            let status = self.runner.run(command).await?;

            if !status.success() {
                tracing::error!("{} exited with {:?}", command.program, status.code);
                return Err(CaixaError::CommandFailed {
                    program: command.program.clone(),
                    code: status.code,
                });
            }
        }

        if plan.strategy == CopyStrategy::DumpRestore && !plan.keep_dump {
            remove_dump(&plan.dump_file).await;
        }

        let elapsed = start.elapsed();
        tracing::info!("Copy finished in {:?}", elapsed);

        Ok(CopyReport {
            strategy: plan.strategy,
            source: plan.source.to_string(),
            target: plan.target.to_string(),
            commands_run: commands.len(),
            started_at,
            elapsed_ms: elapsed.as_millis(),
        })
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

async fn remove_dump(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed dump file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove dump file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(host: &str, port: u16, database: &str) -> PgEndpoint {
        PgEndpoint {
            host: host.to_string(),
            port,
            database: database.to_string(),
            user: "usuario".to_string(),
            password: Some("senha".to_string()),
        }
    }

    #[test]
    fn test_dump_restore_commands() {
        let mut plan = PgCopyPlan::new(
            endpoint("localhost", 5432, "banco_origem"),
            endpoint("localhost", 5433, "banco_destino"),
            CopyStrategy::DumpRestore,
        );
        plan.dump_file = PathBuf::from("backup.dump");

        let commands = plan.commands();
        assert_eq!(commands.len(), 2);

        assert_eq!(commands[0].program, "pg_dump");
        assert_eq!(
            commands[0].args,
            [
                "--host",
                "localhost",
                "--port",
                "5432",
                "--username",
                "usuario",
                "--no-password",
                "--format=custom",
                "--file",
                "backup.dump",
                "banco_origem"
            ]
        );

        assert_eq!(commands[1].program, "pg_restore");
        assert!(commands[1].args.ends_with(&[
            "--dbname".to_string(),
            "banco_destino".to_string(),
            "backup.dump".to_string()
        ]));
        assert!(commands[1].args.contains(&"5433".to_string()));
    }

    #[test]
    fn test_create_target_inserts_createdb() {
        let mut plan = PgCopyPlan::new(
            endpoint("a", 5432, "src"),
            endpoint("b", 5432, "dst"),
            CopyStrategy::DumpRestore,
        );
        plan.create_target = true;

        let programs: Vec<String> = plan.commands().into_iter().map(|c| c.program).collect();
        assert_eq!(programs, ["pg_dump", "createdb", "pg_restore"]);
    }

    #[test]
    fn test_template_command() {
        let plan = PgCopyPlan::new(
            endpoint("localhost", 5432, "banco_origem"),
            endpoint("localhost", 5432, "banco_destino"),
            CopyStrategy::Template,
        );

        let commands = plan.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "psql");
        assert!(commands[0]
            .args
            .windows(2)
            .any(|pair| pair[0] == "--set" && pair[1] == "ON_ERROR_STOP=1"));
        assert_eq!(
            commands[0].args.last().map(String::as_str),
            Some("CREATE DATABASE \"banco_destino\" TEMPLATE \"banco_origem\"")
        );
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_template_requires_same_server() {
        let plan = PgCopyPlan::new(
            endpoint("localhost", 5432, "a"),
            endpoint("localhost", 5433, "b"),
            CopyStrategy::Template,
        );
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_dump_file_starting_with_dash_rejected() {
        let mut plan = PgCopyPlan::new(
            endpoint("a", 5432, "src"),
            endpoint("b", 5432, "dst"),
            CopyStrategy::DumpRestore,
        );
        plan.dump_file = PathBuf::from("--clean");

        match plan.validate() {
            Err(CaixaError::InvalidConfigValueError { field, .. }) => assert_eq!(field, "copy.dump_file"),
            other => panic!("expected dump file rejection, got {:?}", other),
        }

        plan.dump_file = PathBuf::from("./--clean");
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_same_database_rejected() {
        let plan = PgCopyPlan::new(
            endpoint("localhost", 5432, "a"),
            endpoint("localhost", 5432, "a"),
            CopyStrategy::DumpRestore,
        );
        assert!(plan.validate().is_err());
    }

    #[derive(Clone, Default)]
    struct CountingRunner {
        calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl CommandRunner for CountingRunner {
        async fn run(&self, _command: &PgCommand) -> Result<crate::domain::ports::ExitStatus> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(crate::domain::ports::ExitStatus { code: Some(0) })
        }
    }

    #[test]
    fn test_copier_keeps_dump_when_asked() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut plan = PgCopyPlan::new(
            endpoint("a", 5432, "src"),
            endpoint("b", 5432, "dst"),
            CopyStrategy::DumpRestore,
        );
        plan.dump_file = dir.path().join("src.dump");
        plan.keep_dump = true;
        std::fs::write(&plan.dump_file, b"archive").unwrap();

        let runner = CountingRunner::default();
        let report = tokio_test::block_on(PgCopier::new(runner.clone()).run(&plan)).unwrap();

        assert_eq!(report.commands_run, 2);
        assert_eq!(runner.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert!(plan.dump_file.exists());
    }

    #[test]
    fn test_copier_validates_before_running() {
        let plan = PgCopyPlan::new(
            endpoint("a", 5432, "src"),
            endpoint("a", 5432, "bad name"),
            CopyStrategy::DumpRestore,
        );

        let runner = CountingRunner::default();
        let result = tokio_test::block_on(PgCopier::new(runner.clone()).run(&plan));

        assert!(matches!(result, Err(CaixaError::InvalidConfigValueError { .. })));
        assert_eq!(runner.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_password_never_displayed() {
        let plan = PgCopyPlan::new(
            endpoint("localhost", 5432, "a"),
            endpoint("localhost", 5433, "b"),
            CopyStrategy::DumpRestore,
        );
        for command in plan.commands() {
            assert_eq!(command.password.as_deref(), Some("senha"));
            assert!(!command.to_string().contains("senha"));
            assert!(!format!("{:?}", command).contains("senha"));
        }
    }
}
