use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use skirnir::config::AppConfig;
use skirnir::error::AppError;
use skirnir::workflows::assessment::{
    parse_report_csv, AssessmentReport, Category, ScoringEngine, Selection,
};
use skirnir::workflows::upload::UploadOutcome;

use crate::infra::live_orchestrator;

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Answer one category, e.g. --choose "Moisture=Rarely moist" (repeatable)
    #[arg(long = "choose", value_parser = crate::infra::parse_choice, required = true)]
    pub(crate) choices: Vec<(Category, String)>,
}

#[derive(Args, Debug)]
pub(crate) struct UploadArgs {
    /// File to upload to the destination container
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct InspectArgs {
    /// Local assessment CSV to parse and re-sum
    pub(crate) path: PathBuf,
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = ScoringEngine::standard()?;

    let mut selection = Selection::new();
    for (category, option) in args.choices {
        selection.choose(category, option);
    }

    let report = AssessmentReport::generate(&engine, &selection, Utc::now())?;
    for row in report.summary.rows() {
        println!("{}: {} (Score: {})", row.category.label(), row.option, row.score);
    }
    println!("Total Score: {}", report.summary.total());

    let orchestrator = live_orchestrator(&config);
    orchestrator.stage(report.filename.clone(), report.csv.clone().into_bytes())?;
    finish_upload(&orchestrator, &report.filename).await
}

pub(crate) async fn run_upload(args: UploadArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let bytes = std::fs::read(&args.path)?;
    let filename = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());

    let orchestrator = live_orchestrator(&config);
    orchestrator.stage(filename.clone(), bytes)?;
    finish_upload(&orchestrator, &filename).await
}

pub(crate) async fn run_gallery() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let orchestrator = live_orchestrator(&config);

    let entries = orchestrator.refresh_gallery().await?;
    if entries.is_empty() {
        println!("Container '{}' is empty", orchestrator.container());
        return Ok(());
    }

    println!("Container '{}':", orchestrator.container());
    for entry in entries {
        println!("- [{:?}] {}", entry.kind, entry.name);
    }
    Ok(())
}

pub(crate) fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let file = std::fs::File::open(&args.path)?;
    let parsed = parse_report_csv(file)?;

    for row in &parsed.rows {
        println!("{}: {} (Score: {})", row.category, row.option, row.score);
    }
    println!("Total Score: {}", parsed.total);
    Ok(())
}

async fn finish_upload(
    orchestrator: &crate::infra::LiveOrchestrator,
    filename: &str,
) -> Result<(), AppError> {
    match orchestrator.upload().await? {
        UploadOutcome::Success => {
            println!("Successfully finished upload of {filename}");
            println!(
                "Container '{}' now holds {} object(s)",
                orchestrator.container(),
                orchestrator.gallery().len()
            );
            Ok(())
        }
        UploadOutcome::Failure(reason) => {
            println!("Upload failed: {reason}");
            Ok(())
        }
    }
}
