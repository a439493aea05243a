use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use eyre::Result;
use tracing_subscriber::EnvFilter;

use mchat_bedrock::generate::BedrockGenerator;
use mchat_cli::commands::{self, OutputOptions, ScoreInput};
use mchat_cli::config::{self, CredentialSource, MchatConfig};
use mchat_cli::screen::{Screen, stdin_events};
use mchat_cli::session::ScreeningSession;
use mchat_core::models::patient::ExaminerPosition;
use mchat_export::styles::DocumentStyles;

#[derive(Parser, Debug)]
#[command(name = "mchat")]
#[command(about = "M-CHAT-R autism screening", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (defaults to ~/.config/mchat/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the questionnaire items and the scoring rules
    Questions,
    /// Run a screening interactively
    Screen(RunArgs),
    /// Score a JSON answer file
    Score {
        /// File with `{"answers": {"1": "yes", ...}, "patient": {...}}`
        #[arg(short, long)]
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Show or update the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Skip the generated analysis
    #[arg(long)]
    no_insights: bool,

    /// Write a PDF report
    #[arg(long)]
    pdf: bool,

    /// Write a DOCX report
    #[arg(long)]
    docx: bool,

    /// Print the full report to stdout
    #[arg(long)]
    print: bool,

    /// Directory for exported reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Bedrock model id, overriding the config
    #[arg(long)]
    model_id: Option<String>,

    /// AWS region, overriding the config
    #[arg(long)]
    region: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current configuration with credentials redacted
    Show,
    /// Create or update the configuration file
    Init {
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        model_id: Option<String>,
        /// Use a named AWS profile instead of the default credential chain
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// TrueType font to embed in PDF exports
        #[arg(long)]
        pdf_font: Option<PathBuf>,
        #[arg(long)]
        examiner_name: Option<String>,
        /// director, manager, teacher or specialist
        #[arg(long)]
        examiner_position: Option<ExaminerPosition>,
        /// Disable the generated analysis by default
        #[arg(long)]
        no_insights: bool,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let config = config::load_config(&config_path)?;

    match cli.command {
        Commands::Questions => {
            let instrument = commands::lookup_instrument("mchat_r")?;
            commands::questions(instrument.as_ref(), &mut std::io::stdout().lock())?;
        }
        Commands::Screen(run) => {
            let generator = build_generator(&config, &run).await?;
            let instrument = commands::lookup_instrument("mchat_r")?;
            let session = ScreeningSession::new(instrument, commands::new_patient(&config));
            let screen = Screen::new(
                session,
                generator,
                stdin_events(),
                std::io::stdout(),
                output_dir(&config, &run),
            );
            screen.with_styles(document_styles(&config)).run().await?;
        }
        Commands::Score { input, json, run } => {
            let contents = std::fs::read_to_string(&input)
                .map_err(|e| eyre::eyre!("failed to read {}: {e}", input.display()))?;
            let score_input: ScoreInput = serde_json::from_str(&contents)?;
            let generator = build_generator(&config, &run).await?;
            let options = OutputOptions {
                print: run.print,
                json,
                pdf: run.pdf,
                docx: run.docx,
                output_dir: output_dir(&config, &run),
                styles: document_styles(&config),
            };
            let mut stdout = std::io::stdout().lock();
            commands::score(
                score_input,
                &config,
                generator.as_deref(),
                &options,
                &mut stdout,
            )
            .await?;
            stdout.flush()?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config_show(&config, &config_path, &mut std::io::stdout().lock())?;
            }
            ConfigAction::Init {
                region,
                model_id,
                profile,
                output_dir,
                pdf_font,
                examiner_name,
                examiner_position,
                no_insights,
            } => {
                let mut updated = config;
                if let Some(region) = region {
                    updated.region = region;
                }
                if let Some(model_id) = model_id {
                    updated.model_id = model_id;
                }
                if let Some(profile_name) = profile {
                    updated.credentials = CredentialSource::Profile { profile_name };
                }
                if output_dir.is_some() {
                    updated.output_dir = output_dir;
                }
                if pdf_font.is_some() {
                    updated.pdf_font = pdf_font;
                }
                if let Some(name) = examiner_name {
                    updated.examiner_name = name;
                }
                if let Some(position) = examiner_position {
                    updated.examiner_position = position;
                }
                if no_insights {
                    updated.generate_analysis = false;
                }
                config::save_config(&updated, &config_path)?;
                commands::config_show(&updated, &config_path, &mut std::io::stdout().lock())?;
            }
        },
    }

    Ok(())
}

async fn build_generator(
    config: &MchatConfig,
    run: &RunArgs,
) -> Result<Option<Arc<BedrockGenerator>>> {
    if run.no_insights || !config.generate_analysis {
        return Ok(None);
    }
    let region = run.region.as_deref().unwrap_or(&config.region);
    let model_id = run.model_id.as_deref().unwrap_or(&config.model_id);
    let sdk_config = mchat_cli::aws::build_aws_config(region, &config.credentials).await;
    let generator = BedrockGenerator::new(&sdk_config, model_id)?;
    tracing::info!(model = generator.model_id(), region, "analysis enabled");
    Ok(Some(Arc::new(generator)))
}

fn document_styles(config: &MchatConfig) -> DocumentStyles {
    DocumentStyles {
        pdf_font: config.pdf_font.clone(),
        ..DocumentStyles::default()
    }
}

fn output_dir(config: &MchatConfig, run: &RunArgs) -> PathBuf {
    run.output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}
