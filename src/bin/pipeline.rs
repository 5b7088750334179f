//! Command-line entry point for running the pipeline without the web UI.

use clap::{Parser, Subcommand};

use battlecard_generator::config::Config;
use battlecard_generator::pipeline::{Pipeline, split_list};
use battlecard_generator::render::DEFAULT_TEMPLATE;
use battlecard_generator::telemetry::init_telemetry;

#[derive(Parser)]
#[command(name = "pipeline", version, about = "Generate competitor battlecards from news coverage")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Comma-separated competitor names
    #[arg(long, short)]
    competitors: String,
    /// Comma-separated industry keywords
    #[arg(long, short, default_value = "")]
    keywords: String,
}

#[derive(Subcommand)]
enum Command {
    /// Collect news, analyze it and generate battlecards
    Run(RunArgs),
    /// Render saved battlecards as PDF and text files
    Design {
        #[arg(long, short, default_value = DEFAULT_TEMPLATE)]
        template: String,
    },
    /// Run followed by design
    All {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, short, default_value = DEFAULT_TEMPLATE)]
        template: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let telemetry_guard = init_telemetry(&config)?;

    let result = execute(cli.command, &config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Pipeline command failed");
    }

    telemetry_guard.shutdown();
    result
}

async fn execute(command: Command, config: &Config) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;

    match command {
        Command::Run(args) => run(&pipeline, &args).await,
        Command::Design { template } => design(&pipeline, &template).await,
        Command::All { run: args, template } => {
            run(&pipeline, &args).await?;
            design(&pipeline, &template).await
        }
    }
}

async fn run(pipeline: &Pipeline, args: &RunArgs) -> anyhow::Result<()> {
    let competitors = split_list(&args.competitors);
    let keywords = split_list(&args.keywords);

    let summary = pipeline.run_pipeline(&competitors, &keywords).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn design(pipeline: &Pipeline, template: &str) -> anyhow::Result<()> {
    let summary = pipeline.design_battlecards(template).await?;
    for card in &summary.cards {
        println!(
            "{}",
            pipeline.store().battlecards_dir().join(&card.pdf).display()
        );
    }
    Ok(())
}
