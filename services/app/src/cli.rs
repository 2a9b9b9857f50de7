use crate::commands::{
    run_gallery, run_inspect, run_submit, run_upload, InspectArgs, SubmitArgs, UploadArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use skirnir::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SKIRNIR",
    about = "Run the assessment upload service or drive its workflows from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a questionnaire selection and upload the generated CSV
    Submit(SubmitArgs),
    /// Upload an arbitrary file to the destination container
    Upload(UploadArgs),
    /// List the destination container as the gallery would show it
    Gallery,
    /// Parse a local assessment CSV and re-sum its score column
    Inspect(InspectArgs),
    /// Run an offline end-to-end demo against in-memory storage
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Submit(args) => run_submit(args).await,
        Command::Upload(args) => run_upload(args).await,
        Command::Gallery => run_gallery().await,
        Command::Inspect(args) => run_inspect(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
