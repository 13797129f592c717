use crate::adapters::ProcessRunner;
use crate::config::cli::{Command, DocumentArgs, PgCopyArgs, QrArgs, RowsArgs};
use crate::config::toml_config::{endpoint_from_url, PgCopyConfig};
use crate::core::pg_copy::{PgCopier, PgCopyPlan};
use crate::core::tax_id::{self, TaxIdKind};
use crate::core::{qr, rows, text, CommandRunner};
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, Validate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{Read, Write};

/// `Rejected` means the command ran but some input failed its check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
}

pub async fn execute<W: Write>(command: &Command, out: &mut W) -> Result<Outcome> {
    execute_with_runner(command, &ProcessRunner::new(), out).await
}

pub async fn execute_with_runner<R, W>(command: &Command, runner: &R, out: &mut W) -> Result<Outcome>
where
    R: CommandRunner + Clone,
    W: Write,
{
    match command {
        Command::Qr(args) => run_qr(args, out),
        Command::Cpf(args) => run_documents(TaxIdKind::Cpf, args, out),
        Command::Cnpj(args) => run_documents(TaxIdKind::Cnpj, args, out),
        Command::Uuid { values } => {
            let mut outcome = Outcome::Success;
            for value in values {
                let valid = text::is_uuid(value);
                if !valid {
                    outcome = Outcome::Rejected;
                }
                writeln!(out, "{}\t{}", value, if valid { "valid" } else { "invalid" })?;
            }
            Ok(outcome)
        }
        Command::Pascal { values } => {
            for value in values {
                writeln!(out, "{}", text::snake_to_pascal(value))?;
            }
            Ok(Outcome::Success)
        }
        Command::Unescape { values } => {
            for value in values {
                writeln!(out, "{}", text::decode_html_entities(value))?;
            }
            Ok(Outcome::Success)
        }
        Command::Accents { values } => {
            for value in values {
                writeln!(out, "{}", text::normalize_accents(value))?;
            }
            Ok(Outcome::Success)
        }
        Command::Rows(args) => run_rows(args, out),
        Command::PgCopy(args) => run_pg_copy(args, runner.clone(), out).await,
    }
}

fn run_qr<W: Write>(args: &QrArgs, out: &mut W) -> Result<Outcome> {
    let data = match (&args.data, &args.input) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => {
            tracing::debug!("Reading QR payload from {}", path.display());
            std::fs::read_to_string(path)?
        }
        (None, None) => {
            tracing::debug!("Reading QR payload from stdin");
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let rendered = qr::render_ascii(data.trim_end_matches(['\r', '\n']), &args.options()?)?;
    out.write_all(rendered.as_bytes())?;
    Ok(Outcome::Success)
}

fn run_documents<W: Write>(kind: TaxIdKind, args: &DocumentArgs, out: &mut W) -> Result<Outcome> {
    if let Some(count) = args.generate {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        for _ in 0..count {
            let generated = match kind {
                TaxIdKind::Cpf => tax_id::generate_cpf(&mut rng),
                TaxIdKind::Cnpj => tax_id::generate_cnpj(&mut rng),
            };
            if args.format {
                writeln!(out, "{}", generated)?;
            } else {
                writeln!(out, "{}", tax_id::strip_non_digits(&generated))?;
            }
        }
        return Ok(Outcome::Success);
    }

    let mut outcome = Outcome::Success;
    for value in &args.values {
        let checked = match kind {
            TaxIdKind::Cpf => tax_id::validate_cpf(value),
            TaxIdKind::Cnpj => tax_id::validate_cnpj(value),
        };

        match checked {
            Ok(()) => {
                let shown = if args.format {
                    match kind {
                        TaxIdKind::Cpf => tax_id::format_cpf(value),
                        TaxIdKind::Cnpj => tax_id::format_cnpj(value),
                    }
                    .unwrap_or_else(|| value.clone())
                } else {
                    value.clone()
                };
                writeln!(out, "{}\tvalid", shown)?;
            }
            Err(e) => {
                outcome = Outcome::Rejected;
                tracing::debug!("{} rejected: {:?}", value, e);
                writeln!(out, "{}\tinvalid: {}", value, e)?;
            }
        }
    }

    Ok(outcome)
}

fn run_rows<W: Write>(args: &RowsArgs, out: &mut W) -> Result<Outcome> {
    let file = std::fs::File::open(&args.file)?;
    let table = rows::read_csv_table(file, args.delimiter_byte()?)?;
    let records = rows::table_to_json(table)?;

    tracing::info!("Converted {} rows from {}", records.len(), args.file.display());

    if args.pretty {
        serde_json::to_writer_pretty(&mut *out, &records)?;
    } else {
        serde_json::to_writer(&mut *out, &records)?;
    }
    writeln!(out)?;
    Ok(Outcome::Success)
}

pub fn build_plan(args: &PgCopyArgs) -> Result<PgCopyPlan> {
    if let Some(path) = &args.config {
        tracing::info!("Loading copy settings from {}", path.display());
        return PgCopyConfig::from_file(path)?.into_plan();
    }

    let source = endpoint_from_url("source", validate_required_field("source", &args.source)?)?;
    let target = endpoint_from_url("target", validate_required_field("target", &args.target)?)?;

    let mut plan = PgCopyPlan::new(source, target, args.strategy);
    if let Some(dump_file) = &args.dump_file {
        plan.dump_file = dump_file.clone();
    }
    plan.keep_dump = args.keep_dump;
    plan.create_target = args.create_target;
    plan.validate()?;
    Ok(plan)
}

async fn run_pg_copy<R: CommandRunner, W: Write>(
    args: &PgCopyArgs,
    runner: R,
    out: &mut W,
) -> Result<Outcome> {
    let plan = build_plan(args)?;

    if args.dry_run {
        tracing::info!("Dry run, nothing will be executed");
        for command in plan.commands() {
            writeln!(out, "{}", command)?;
        }
        return Ok(Outcome::Success);
    }

    let report = PgCopier::new(runner).run(&plan).await?;
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(Outcome::Success)
}
