use anyhow::Context;
use clap::{Parser, Subcommand};
use fhir::Patient;
use hospice_core::constants::{ENV_HOSPICE_EOB_EVENT, ENV_HOSPICE_EOB_STAGE};
use hospice_core::{AdmissionService, CoreConfig};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hospice")]
#[command(about = "Hospice ADT^A01 ingest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an ADT^A01 message and print the extracted fields
    Parse {
        /// HL7 message file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Run the admission workflow and print the FHIR Patient
    Admit {
        /// HL7 message file (stdin when omitted)
        file: Option<PathBuf>,
        /// Medical record number overriding PID-3
        #[arg(long)]
        mrn: Option<String>,
        /// SOC/ROC visit type
        #[arg(long)]
        soc_roc_type: Option<String>,
        /// Patient acuity level
        #[arg(long)]
        acuity_level: Option<String>,
        /// Print the admission record instead of the Patient
        #[arg(long)]
        record: bool,
    },
    /// List the segments of a message with their field counts
    Segments {
        /// HL7 message file (stdin when omitted)
        file: Option<PathBuf>,
        /// Only list occurrences of this segment type (e.g. PID)
        #[arg(long)]
        code: Option<String>,
    },
    /// Strictly parse a FHIR Patient JSON file and summarise it
    Inspect {
        /// FHIR Patient JSON file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Parse { file }) => {
            let raw = read_input(file.as_deref())?;
            let parsed = hl7::parse_adt_a01(&raw)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Some(Commands::Admit {
            file,
            mrn,
            soc_roc_type,
            acuity_level,
            record,
        }) => {
            let raw = read_input(file.as_deref())?;
            let cfg = CoreConfig::from_env_values(
                std::env::var(ENV_HOSPICE_EOB_EVENT).ok(),
                std::env::var(ENV_HOSPICE_EOB_STAGE).ok(),
            );
            let attributes: BTreeMap<String, String> = [
                ("mrn", mrn),
                ("soc_roc_type", soc_roc_type),
                ("acuity_level", acuity_level),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_owned(), v)))
            .collect();

            let service = AdmissionService::new(Arc::new(cfg));
            let admission = service.admit(&raw, attributes, chrono::Utc::now())?;
            if record {
                println!("{}", serde_json::to_string_pretty(&admission.record)?);
            } else {
                println!("{}", Patient::render(&admission.patient)?);
            }
        }
        Some(Commands::Segments { file, code }) => {
            let raw = read_input(file.as_deref())?;
            let message = hl7::Message::parse(&raw)?;
            let segments: Vec<&hl7::Segment> = match code.as_deref() {
                Some(code) => message.occurrences(&code.trim().to_uppercase()),
                None => message.segments().iter().collect(),
            };
            for (index, segment) in segments.into_iter().enumerate() {
                println!(
                    "{:>3}  {:<4} {} fields",
                    index + 1,
                    segment.code(),
                    segment.len().saturating_sub(1)
                );
            }
        }
        Some(Commands::Inspect { file }) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let patient = Patient::parse(&text)?;
            let name = patient.name.first();
            println!("MRN: {}", patient.mrn().unwrap_or("-"));
            println!(
                "Name: {}, {}",
                name.and_then(|n| n.family.as_deref()).unwrap_or("-"),
                name.map(|n| n.given.join(" ")).unwrap_or_default()
            );
            println!("Gender: {}", patient.gender.as_str());
            println!("Birth date: {}", patient.birth_date.as_deref().unwrap_or("-"));
            println!("Extensions: {}", patient.extension.len());
        }
        None => {
            println!("Use 'hospice --help' for commands");
        }
    }

    Ok(())
}

/// Read a whole file, or stdin when no path is given.
fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
