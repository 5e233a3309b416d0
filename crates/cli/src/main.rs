mod render;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use speechgrade_core::audio::domain::audio_clip::AudioClip;
use speechgrade_core::audio::infrastructure::whisper_api_transcriber::WhisperApiTranscriber;
use speechgrade_core::pipeline::analysis_logger::LogAnalysisLogger;
use speechgrade_core::pipeline::analyze_speech_use_case::{AnalysisRequest, AnalyzeSpeechUseCase};
use speechgrade_core::rubric::domain::criterion_registry::CriterionRegistry;
use speechgrade_core::rubric::infrastructure::rubric_file::RubricFile;
use speechgrade_core::scoring::infrastructure::openai_scorer::OpenAiScorer;
use speechgrade_core::shared::constants::AUDIO_EXTENSIONS;
use speechgrade_core::shared::settings::ServiceSettings;

/// Fluency metrics and rubric-based scoring for spoken answers.
#[derive(Parser)]
#[command(name = "speechgrade", version)]
struct Cli {
    /// Rubric file (defaults to the user config directory).
    #[arg(long, global = true)]
    rubric: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe an audio answer, compute fluency, and score it against the rubric.
    Analyze(AnalyzeArgs),
    /// View or edit the scoring rubric.
    #[command(subcommand)]
    Rubric(RubricCommand),
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Audio file (mp3, wav or m4a).
    audio: PathBuf,

    /// Topic or question the speaker was answering.
    #[arg(long)]
    topic: String,

    /// API key for the transcription and scoring services.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the API base URL from settings.
    #[arg(long)]
    api_base_url: Option<String>,

    /// Override the transcription model from settings.
    #[arg(long)]
    transcription_model: Option<String>,

    /// Override the scoring model from settings.
    #[arg(long)]
    scoring_model: Option<String>,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum RubricCommand {
    /// List criteria in scoring order.
    List,
    /// Append a criterion.
    Add {
        name: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Remove the criterion at a position shown by `list` (1-based).
    Remove { position: usize },
    /// Restore the default criteria.
    Reset,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let rubric_path = match cli.rubric {
        Some(path) => path,
        None => RubricFile::default_path()?,
    };

    match cli.command {
        Command::Analyze(args) => run_analyze(args, &rubric_path),
        Command::Rubric(cmd) => run_rubric(cmd, &rubric_path),
    }
}

fn run_analyze(args: AnalyzeArgs, rubric_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let clip = load_clip(&args.audio)?;

    let mut settings = ServiceSettings::load();
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    if let Some(model) = args.transcription_model {
        settings.transcription_model = model;
    }
    if let Some(model) = args.scoring_model {
        settings.scoring_model = model;
    }

    let rubric = RubricFile::load(rubric_path)?;

    let mut use_case = AnalyzeSpeechUseCase::new(
        Box::new(WhisperApiTranscriber::new(&settings)?),
        Box::new(OpenAiScorer::new(&settings)?),
        Box::new(LogAnalysisLogger::new()),
    );

    eprintln!(
        "Analyzing {} against {} criteria...",
        args.audio.display(),
        rubric.len()
    );
    let request = AnalysisRequest {
        audio: Some(clip),
        topic: args.topic,
        credential: args.api_key.unwrap_or_default(),
    };

    match use_case.run(request, &rubric) {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&render::report_json(&report))?);
            } else {
                println!("{}", render::report_tables(&report));
            }
            Ok(())
        }
        Err(failure) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&render::failure_json(&failure))?);
            } else if let Some(ref fluency) = failure.fluency {
                println!("{}", render::fluency_table(fluency));
            }
            Err(failure.into())
        }
    }
}

fn run_rubric(cmd: RubricCommand, rubric_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut rubric = RubricFile::load(rubric_path)?;

    match cmd {
        RubricCommand::List => {
            println!("{}", render::rubric_table(&rubric));
            return Ok(());
        }
        RubricCommand::Add { name, description } => {
            rubric.add(name, description)?;
        }
        RubricCommand::Remove { position } => {
            let index = position
                .checked_sub(1)
                .ok_or("Positions start at 1; see `speechgrade rubric list`")?;
            let removed = rubric.remove(index)?;
            log::info!("Removed criterion '{}'", removed.name);
        }
        RubricCommand::Reset => rubric.reset_to_defaults(),
    }

    warn_if_unscorable(&rubric);
    RubricFile::save(&rubric, rubric_path)?;
    println!("{}", render::rubric_table(&rubric));
    log::info!("Rubric written to {}", rubric_path.display());
    Ok(())
}

fn warn_if_unscorable(rubric: &CriterionRegistry) {
    if rubric.is_empty() {
        log::warn!("Rubric is empty; analysis will fail until a criterion is added");
    }
}

fn load_clip(path: &Path) -> Result<AudioClip, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Audio file not found: {}", path.display()).into());
    }
    let clip = AudioClip::from_path(path)?;
    if !clip.has_supported_extension() {
        return Err(format!(
            "Audio must be one of: {}, got '{}'",
            AUDIO_EXTENSIONS.join(", "),
            path.display()
        )
        .into());
    }
    Ok(clip)
}
