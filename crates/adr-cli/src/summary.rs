use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use adr_artifacts::ArtifactSummary;
use adr_core::feature_label;
use adr_model::{CausalityAssessment, CausalityLevel};

use adr_cli::output::{CaseOutcome, level_counts};

use crate::commands::AssessRun;

pub fn print_assess_summary(run: &AssessRun, top: usize) {
    eprintln!("Model: {}", run.model_id);
    if let Some(path) = &run.output {
        eprintln!("Output: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Case"),
        header_cell("Level"),
        header_cell("Top features"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for outcome in &run.outcomes {
        let (level, features) = match (&outcome.assessment, &outcome.error) {
            (Some(assessment), _) => (
                level_cell(assessment.level),
                Cell::new(top_features(run, assessment, top)),
            ),
            (None, error) => (
                Cell::new("error").fg(Color::Red).add_attribute(Attribute::Bold),
                Cell::new(error.as_deref().unwrap_or("-")).fg(Color::Red),
            ),
        };
        table.add_row(vec![Cell::new(outcome.case), level, features]);
    }
    eprintln!("{table}");
    print_level_totals(&run.outcomes);
}

/// Strongest contributions towards the assessed level, one per line.
fn top_features(run: &AssessRun, assessment: &CausalityAssessment, top: usize) -> String {
    let artifacts = run.context.artifacts();
    let Some(bundle) = &assessment.explanation else {
        return "-".to_string();
    };
    let Some(class) = artifacts
        .ordinal
        .levels()
        .iter()
        .position(|level| *level == assessment.level)
    else {
        return "-".to_string();
    };
    bundle
        .top_contributions(class, top)
        .iter()
        .map(|c| {
            format!(
                "{} {:+.3}",
                feature_label(&c.feature, &artifacts.metadata),
                c.contribution
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_level_totals(outcomes: &[CaseOutcome]) {
    let (counts, failed) = level_counts(outcomes);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Level"), header_cell("Cases")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (level, count) in counts {
        table.add_row(vec![level_cell(level), count_cell(count, Color::Reset)]);
    }
    table.add_row(vec![
        Cell::new("failed").fg(Color::Red),
        count_cell(failed, Color::Red),
    ]);
    eprintln!("{table}");
}

pub fn print_verify_summary(summary: &ArtifactSummary) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Artifact"), header_cell("Value")]);
    apply_table_style(&mut table);
    let checksums = if summary.checksums_verified {
        Cell::new("verified").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        dim_cell("no manifest")
    };
    let classes: Vec<&str> = summary.classes.iter().map(CausalityLevel::as_str).collect();
    let rows = [
        ("Directory", Cell::new(summary.artifacts_dir.display())),
        ("Model", Cell::new(&summary.model_id)),
        ("Classifier", Cell::new(summary.classifier)),
        ("Checksums", checksums),
        ("Categorical columns", Cell::new(summary.categorical_columns)),
        ("Numerical columns", Cell::new(summary.numerical_columns)),
        ("Boolean columns", Cell::new(summary.boolean_columns)),
        ("Date columns", Cell::new(summary.date_columns)),
        ("Dropped columns", Cell::new(summary.dropped_columns)),
        ("One-hot outputs", Cell::new(summary.one_hot_outputs)),
        ("Prediction columns", Cell::new(summary.prediction_columns)),
        ("Classes", Cell::new(classes.join(", "))),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name).add_attribute(Attribute::Bold), value]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn level_cell(level: CausalityLevel) -> Cell {
    let color = match level {
        CausalityLevel::Certain => Color::Red,
        CausalityLevel::Likely => Color::Yellow,
        CausalityLevel::Possible => Color::Cyan,
        CausalityLevel::Unlikely => Color::Green,
        CausalityLevel::Unclassified | CausalityLevel::Unclassifiable => Color::DarkGrey,
    };
    Cell::new(level).fg(color).add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
