use std::io::Cursor;
use std::sync::Arc;

use chrono::Utc;
use clap::Args;

use skirnir::error::AppError;
use skirnir::workflows::assessment::{
    parse_report_csv, AssessmentReport, Category, ScoringEngine, Selection,
};
use skirnir::workflows::upload::{UploadOrchestrator, UploadOutcome};

use crate::infra::InMemoryStorage;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Answer one category, e.g. --choose "Moisture=Rarely moist"
    /// (repeatable; defaults to a complete low-risk questionnaire)
    #[arg(long = "choose", value_parser = crate::infra::parse_choice)]
    pub(crate) choices: Vec<(Category, String)>,
}

fn default_selection(engine: &ScoringEngine) -> Selection {
    let mut selection = Selection::new();
    for category in Category::ordered() {
        if let Some((option, _)) = engine.table().options(category).last() {
            selection.choose(category, option.clone());
        }
    }
    selection
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let engine = ScoringEngine::standard()?;

    let selection = if args.choices.is_empty() {
        default_selection(&engine)
    } else {
        let mut selection = Selection::new();
        for (category, option) in args.choices {
            selection.choose(category, option);
        }
        selection
    };

    println!("Assessment demo (offline, in-memory storage)\n");
    let report = AssessmentReport::generate(&engine, &selection, Utc::now())?;
    for row in report.summary.rows() {
        println!("{}: {} (Score: {})", row.category.label(), row.option, row.score);
    }
    println!("Total Score: {}", report.summary.total());
    println!("Generated {} ({} bytes)", report.filename, report.csv.len());

    let storage = Arc::new(InMemoryStorage::default());
    storage.seed("ward-entrance.png");
    let orchestrator = UploadOrchestrator::new(
        Arc::clone(&storage),
        Arc::clone(&storage),
        storage,
        "upload",
        5,
    );

    orchestrator.stage(report.filename.clone(), report.csv.clone().into_bytes())?;
    match orchestrator.upload().await? {
        UploadOutcome::Success => println!("\nSuccessfully finished upload"),
        UploadOutcome::Failure(reason) => println!("\nUpload failed: {reason}"),
    }

    println!("\nGallery ({} entries):", orchestrator.gallery().len());
    for entry in orchestrator.gallery() {
        println!("- [{:?}] {}", entry.kind, entry.name);
    }

    println!("\nRe-reading the uploaded report, as the gallery modal would:");
    let parsed = parse_report_csv(Cursor::new(report.csv.as_bytes()))?;
    for row in &parsed.rows {
        println!("{}: {} (Score: {})", row.category, row.option, row.score);
    }
    println!("Recomputed total: {}", parsed.total);

    Ok(())
}
