pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::ProcessRunner;
pub use config::PgCopyConfig;
pub use crate::core::pg_copy::{PgCopier, PgCopyPlan};
pub use crate::core::tax_id::{is_valid_cnpj, is_valid_cpf, TaxIdError};
pub use utils::error::{CaixaError, Result};
