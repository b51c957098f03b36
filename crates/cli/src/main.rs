use clap::{Parser, Subcommand, ValueEnum};
use lab_core::seed::{apply_seed, read_seed_file};
use lab_core::validation::{is_valid_date, is_valid_email, is_valid_national_id, is_valid_phone};
use lab_core::{next_exam_id, ExamCatalog, PatientRegistry};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lab")]
#[command(about = "Lab back office developer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single validator against a value
    Check {
        /// Which validator to run
        kind: CheckKind,
        /// Value to validate
        value: String,
    },
    /// Print the id the catalog would assign to the next exam of a seed file
    NextExamId {
        /// JSON or YAML seed file
        seed_file: PathBuf,
    },
    /// Load a seed file into empty registries and report what was accepted
    ValidateSeed {
        /// JSON or YAML seed file
        seed_file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CheckKind {
    /// `V-` or `E-` followed by 6 to 8 digits
    NationalId,
    /// `YYYY-MM-DD` calendar date
    Date,
    Email,
    /// Mobile or landline phone number
    Phone,
}

fn check(kind: CheckKind, value: &str) -> bool {
    match kind {
        CheckKind::NationalId => is_valid_national_id(value),
        CheckKind::Date => is_valid_date(value),
        CheckKind::Email => is_valid_email(value),
        CheckKind::Phone => is_valid_phone(value),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lab_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check { kind, value }) => {
            if check(kind, &value) {
                println!("valid: {value}");
            } else {
                println!("invalid: {value}");
                std::process::exit(1);
            }
        }
        Some(Commands::NextExamId { seed_file }) => {
            let seed = read_seed_file(&seed_file)?;
            let catalog = ExamCatalog::new();
            apply_seed(seed, &PatientRegistry::new(), &catalog).await;
            let exams = catalog.list_all().await;
            println!("{}", next_exam_id(&exams)?);
        }
        Some(Commands::ValidateSeed { seed_file }) => {
            let seed = read_seed_file(&seed_file)?;
            let report = apply_seed(seed, &PatientRegistry::new(), &ExamCatalog::new()).await;
            println!(
                "Patients: {} accepted, {} skipped",
                report.patients_loaded, report.patients_skipped
            );
            println!(
                "Exams: {} accepted, {} skipped",
                report.exams_loaded, report.exams_skipped
            );
            if report.skipped() > 0 {
                std::process::exit(1);
            }
        }
        None => {
            println!("Use 'lab --help' for commands");
        }
    }

    Ok(())
}
