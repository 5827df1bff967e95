//! Campaign Wizard developer tool.
//!
//! Normalizes stored campaign records and prints the step validation
//! report the authoring wizard would show for them.

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_core::draft::CampaignDraft;
use campaign_core::record::CampaignRecord;
use campaign_wizard::{required_fields, StepValidation, StepValidator, WizardStep};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "campaign-wizard")]
#[command(about = "Campaign authoring wizard developer tool")]
#[command(version)]
struct Cli {
    /// Minimum description length (overrides config)
    #[arg(long, env = "CAMPAIGN_WIZARD__VALIDATION__MIN_DESCRIPTION_CHARS")]
    min_description_chars: Option<usize>,

    /// Campaign length below which a warning is reported (overrides config)
    #[arg(long, env = "CAMPAIGN_WIZARD__VALIDATION__RECOMMENDED_MIN_CAMPAIGN_DAYS")]
    recommended_min_campaign_days: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a stored campaign record
    Check {
        /// Path to the record JSON file
        record: PathBuf,

        /// Only validate this step (1-4)
        #[arg(long)]
        step: Option<u8>,

        /// Date to treat as today, YYYY-MM-DD (default: local date)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Print the canonical form of a stored campaign record
    Normalize {
        /// Path to the record JSON file
        record: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct StepReport {
    step: u8,
    title: &'static str,
    #[serde(flatten)]
    validation: StepValidation,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    campaign_id: Option<Uuid>,
    is_valid: bool,
    required_fields: Vec<String>,
    steps: Vec<StepReport>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so reports on stdout stay machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_wizard=info,campaign_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(chars) = cli.min_description_chars {
        config.validation.min_description_chars = chars;
    }
    if let Some(days) = cli.recommended_min_campaign_days {
        config.validation.recommended_min_campaign_days = days;
    }

    match cli.command {
        Commands::Check { record, step, today } => cmd_check(&config, record, step, today),
        Commands::Normalize { record } => cmd_normalize(record),
    }
}

fn load_draft(path: &Path) -> anyhow::Result<(CampaignRecord, CampaignDraft)> {
    let record =
        CampaignRecord::from_path(path).with_context(|| format!("Failed to read record {}", path.display()))?;
    let draft = CampaignDraft::from_record(record.clone());
    info!(path = %path.display(), campaign_id = ?draft.identity, "Record loaded");
    Ok((record, draft))
}

fn cmd_check(config: &AppConfig, path: PathBuf, step: Option<u8>, today: Option<NaiveDate>) -> anyhow::Result<()> {
    let (_, draft) = load_draft(&path)?;

    let mut validator = StepValidator::new(config.validation.clone());
    if let Some(today) = today {
        validator = validator.with_today(today);
    }

    let steps: Vec<WizardStep> = match step {
        Some(number) => vec![WizardStep::from_number(number)
            .with_context(|| format!("Unknown step {}, expected 1-4", number))?],
        None => WizardStep::ALL.to_vec(),
    };

    let reports: Vec<StepReport> = steps
        .into_iter()
        .map(|step| StepReport {
            step: step.number(),
            title: step.title(),
            validation: validator.validate(step, &draft),
        })
        .collect();

    let report = CheckReport {
        campaign_id: draft.identity,
        is_valid: reports.iter().all(|r| r.validation.is_valid),
        required_fields: required_fields(&draft).iter().map(|f| f.to_string()).collect(),
        steps: reports,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_normalize(path: PathBuf) -> anyhow::Result<()> {
    let (record, draft) = load_draft(&path)?;
    let canonical = draft.to_record(record.status);
    println!("{}", serde_json::to_string_pretty(&canonical)?);
    Ok(())
}
