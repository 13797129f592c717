pub mod pg_copy;
pub mod qr;
pub mod rows;
pub mod tax_id;
pub mod text;

pub use crate::domain::model::{CopyReport, CopyStrategy, PgCommand, PgEndpoint, Record, Table};
pub use crate::domain::ports::{CommandRunner, ExitStatus};
pub use crate::utils::error::Result;
