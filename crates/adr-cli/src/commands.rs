use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span, warn};

use adr_artifacts::{ArtifactBundle, ArtifactSummary};
use adr_core::{AssessmentConfig, AssessmentContext};
use adr_ingest::read_cases;
use adr_model::{CaseField, ColumnMetadata, DerivedField, FieldKind};

use crate::cli::{ArtifactArgs, AssessArgs, ColumnsArgs};
use crate::summary::apply_table_style;
use adr_cli::logging::redact_value;
use adr_cli::output::{CaseOutcome, to_json};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Result of an `assess` run.
pub struct AssessRun {
    pub model_id: String,
    pub outcomes: Vec<CaseOutcome>,
    pub output: Option<PathBuf>,
    pub context: AssessmentContext,
}

impl AssessRun {
    pub fn has_errors(&self) -> bool {
        self.outcomes.iter().any(|o| o.error.is_some())
    }
}

fn assessment_config(args: &AssessArgs) -> Result<AssessmentConfig> {
    let mut config = match &args.config {
        Some(path) => AssessmentConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => AssessmentConfig::default(),
    };
    if let Some(dir) = &args.artifacts_dir {
        config.artifacts_dir = dir.clone();
    }
    if let Some(path) = &args.background {
        config.background_path = path.clone();
    }
    if let Some(k) = args.clusters {
        config.explainer.background_clusters = k;
    }
    if let Some(seed) = args.seed {
        config.explainer.seed = seed;
    }
    if args.max_coalitions.is_some() {
        config.explainer.max_coalitions = args.max_coalitions;
    }
    if args.today.is_some() {
        config.features.today = args.today;
    }
    Ok(config)
}

pub fn run_assess(args: &AssessArgs) -> Result<AssessRun> {
    let config = assessment_config(args)?;
    let context =
        AssessmentContext::initialize(&config).context("initialize assessment context")?;

    let cases = read_cases(&args.cases)
        .with_context(|| format!("read cases from {}", args.cases.display()))?;
    info!(cases = cases.len(), path = %args.cases.display(), "loaded cases");

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(cases.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .context("progress bar template")?
                .progress_chars("#>-"),
        );
        bar.set_message("assessing");
        bar
    };

    let start = Instant::now();
    let mut outcomes = Vec::with_capacity(cases.len());
    for (idx, case) in cases.iter().enumerate() {
        let _span = info_span!("case", index = idx).entered();
        let outcome = match context.assess(case) {
            Ok(assessment) => CaseOutcome::assessed(idx, assessment),
            Err(error) => {
                let patient = case.patient_name.as_deref().unwrap_or("-");
                warn!(
                    case = idx,
                    patient = %redact_value(patient),
                    %error,
                    "case could not be assessed"
                );
                CaseOutcome::failed(idx, error)
            }
        };
        outcomes.push(outcome);
        progress.inc(1);
    }
    progress.finish_and_clear();
    info!(
        cases = outcomes.len(),
        duration_ms = start.elapsed().as_millis(),
        "assessment complete"
    );

    let json = to_json(&outcomes).context("serialize assessments")?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        }
        None => println!("{json}"),
    }

    Ok(AssessRun {
        model_id: context.model_id().to_string(),
        outcomes,
        output: args.output.clone(),
        context,
    })
}

pub fn run_verify(args: &ArtifactArgs) -> Result<ArtifactSummary> {
    let bundle = ArtifactBundle::load(&args.artifacts_dir)
        .with_context(|| format!("load artifacts from {}", args.artifacts_dir.display()))?;
    Ok(bundle.summary())
}

pub fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let metadata = match &args.artifacts_dir {
        Some(dir) => Some(
            ArtifactBundle::load(dir)
                .with_context(|| format!("load artifacts from {}", dir.display()))?
                .metadata,
        ),
        None => None,
    };

    let mut table = Table::new();
    let mut header = vec!["Column", "Kind", "Source"];
    if metadata.is_some() {
        header.push("Model role");
    }
    table.set_header(header);
    apply_table_style(&mut table);

    let raw = CaseField::all()
        .into_iter()
        .map(|field| (field.name(), field.kind(), "report"));
    let derived = DerivedField::all()
        .into_iter()
        .map(|field| (field.name(), FieldKind::Numeric, "derived"));
    for (name, kind, source) in raw.chain(derived) {
        let mut row = vec![name.clone(), kind_name(kind).to_string(), source.to_string()];
        if let Some(metadata) = &metadata {
            row.push(model_role(metadata, &name));
        }
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}

pub fn run_model_info(args: &ArtifactArgs) -> Result<()> {
    let bundle = ArtifactBundle::load(&args.artifacts_dir)
        .with_context(|| format!("load artifacts from {}", args.artifacts_dir.display()))?;
    let json = serde_json::to_string_pretty(&bundle.info).context("serialize model info")?;
    println!("{json}");
    Ok(())
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Categorical => "categorical",
        FieldKind::Numeric => "numeric",
        FieldKind::Date => "date",
        FieldKind::Boolean => "boolean",
    }
}

fn model_role(metadata: &ColumnMetadata, name: &str) -> String {
    let role = if metadata.is_categorical(name) {
        "one-hot"
    } else if metadata.is_numerical(name) {
        "scaled"
    } else if metadata.is_boolean(name) {
        "flag"
    } else if metadata.date_columns.iter().any(|c| c == name) {
        "date (dropped)"
    } else if metadata.columns_to_drop.iter().any(|c| c == name) {
        "dropped"
    } else {
        "-"
    };
    role.to_string()
}
