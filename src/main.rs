//! study-helper CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use study_helper::{
    analytics::AnalyticsAggregator,
    commands::{
        cmd_document, cmd_ingest, cmd_init, cmd_quiz_analytics, cmd_quiz_create, cmd_quiz_list,
        cmd_quiz_results, cmd_quiz_show, cmd_quiz_submit, cmd_search, cmd_status,
        cmd_user_analytics, load_answers_file, parse_answer_arg, print_created_quiz,
        print_document, print_grade_report, print_ingest_stats, print_init, print_quiz,
        print_quiz_analytics, print_quiz_list, print_quiz_results, print_search_results,
        print_status, print_user_analytics, IngestOptions, InitOptions, SearchOptions,
    },
    config::Config,
    db::Database,
    error::{Error, Result},
    generate::create_generator,
    grading::GradingEngine,
    index::DocumentIndex,
    progress::LogWriterFactory,
    quiz::{CreateQuizRequest, QuestionType, QuizCatalog, QuizGenerator},
    search::SearchEngine,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "study-helper")]
#[command(version, about = "Document search with LLM-generated quizzes", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize study-helper configuration and database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Ingest files or directories into the document index
    Ingest {
        /// Files or directories to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// MIME type to use instead of guessing from the extension
        #[arg(long)]
        mime: Option<String>,
    },

    /// Show a stored document
    Document {
        /// Document ID (e.g. file001)
        file_id: String,
    },

    /// Search documents
    Search {
        /// The search query
        query: String,

        /// Restrict to file types (comma separated: txt,pdf,docx)
        #[arg(short = 't', long = "type")]
        file_type: Option<String>,

        /// Sort order: relevance or name
        #[arg(short, long)]
        sort: Option<String>,

        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Results per page
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Create, take and review quizzes
    Quiz {
        #[command(subcommand)]
        action: QuizAction,
    },

    /// Submission analytics
    Analytics {
        #[command(subcommand)]
        target: AnalyticsTarget,
    },

    /// Show system status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum QuizAction {
    /// Generate a quiz from stored documents
    Create {
        /// Document IDs to draw questions from
        #[arg(required = true)]
        file_ids: Vec<String>,

        /// Quiz name
        #[arg(long)]
        name: String,

        /// Topic to focus on
        #[arg(long)]
        topic: String,

        /// Difficulty label passed to the model
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Number of questions
        #[arg(short = 'n', long, default_value = "5")]
        count: u32,

        /// Question type: mcq or true_false
        #[arg(long = "type", default_value = "mcq")]
        question_type: String,

        /// Extra instructions for the model
        #[arg(long)]
        instructions: Option<String>,
    },

    /// Show a quiz without its answers
    Show {
        quiz_id: String,
    },

    /// List quizzes, newest first
    List {
        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Submit answers to a quiz
    Submit {
        quiz_id: String,

        /// Answer as QUESTION_ID=ANSWER (repeatable)
        #[arg(short, long = "answer")]
        answers: Vec<String>,

        /// JSON file with [{"question_id": ..., "selected_answer": ...}]
        #[arg(long)]
        answers_file: Option<PathBuf>,

        /// User ID (a fresh anonymous ID is used when omitted)
        #[arg(long)]
        user: Option<String>,
    },

    /// Show every user's results for a quiz
    Results {
        quiz_id: String,
    },
}

#[derive(Subcommand)]
enum AnalyticsTarget {
    /// Statistics for a quiz
    Quiz {
        quiz_id: String,

        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        end: Option<String>,
    },

    /// Statistics for a user
    User {
        user_id: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn emit<T: Serialize>(json: bool, value: &T, print: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    // Handle init command specially (doesn't need existing config)
    if let Commands::Init { force } = cli.command {
        let options = InitOptions {
            base_dir: init_base_dir(cli.config),
            force,
        };
        let config = cmd_init(options).await?;
        print_init(&config);
        return Ok(());
    }

    // Handle completions command (doesn't need config/db)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "study-helper", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let db = Database::new(&config.paths.db_file).await?;
    let json = cli.json;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Ingest { paths, mime } => {
            let index = DocumentIndex::new(db);
            let stats = cmd_ingest(&index, &paths, IngestOptions { mime }).await?;
            emit(json, &stats, print_ingest_stats)?;
        }

        Commands::Document { file_id } => {
            let index = DocumentIndex::new(db);
            let doc = cmd_document(&index, &file_id).await?;
            emit(json, &doc, print_document)?;
        }

        Commands::Search {
            query,
            file_type,
            sort,
            page,
            limit,
        } => {
            let engine = SearchEngine::new(db);
            let options = SearchOptions {
                types: file_type,
                sort,
                page,
                limit,
            };
            let results = cmd_search(&config, &engine, &query, options).await?;
            emit(json, &results, |r| print_search_results(&query, r))?;
        }

        Commands::Quiz { action } => handle_quiz(&config, db, action, json).await?,

        Commands::Analytics { target } => {
            let aggregator = AnalyticsAggregator::new(db);
            match target {
                AnalyticsTarget::Quiz { quiz_id, start, end } => {
                    let report =
                        cmd_quiz_analytics(&aggregator, &quiz_id, start.as_deref(), end.as_deref())
                            .await?;
                    emit(json, &report, print_quiz_analytics)?;
                }
                AnalyticsTarget::User { user_id } => {
                    let report = cmd_user_analytics(&aggregator, &user_id).await?;
                    emit(json, &report, print_user_analytics)?;
                }
            }
        }

        Commands::Status => {
            let status = cmd_status(&config, &db).await?;
            emit(json, &status, print_status)?;
        }
    }

    Ok(())
}

async fn handle_quiz(config: &Config, db: Database, action: QuizAction, json: bool) -> Result<()> {
    match action {
        QuizAction::Create {
            file_ids,
            name,
            topic,
            difficulty,
            count,
            question_type,
            instructions,
        } => {
            let question_type: QuestionType = question_type.parse()?;
            let generator = QuizGenerator::new(db, create_generator(&config.generation)?);
            let request = CreateQuizRequest {
                file_ids,
                name,
                difficulty,
                topic,
                question_count: count,
                question_type,
                custom_instructions: instructions,
            };
            let created = cmd_quiz_create(&generator, &request).await?;
            emit(json, &created, print_created_quiz)?;
        }

        QuizAction::Show { quiz_id } => {
            let catalog = QuizCatalog::new(db);
            let details = cmd_quiz_show(&catalog, &quiz_id).await?;
            emit(json, &details, print_quiz)?;
        }

        QuizAction::List { page, limit } => {
            let catalog = QuizCatalog::new(db);
            let page = cmd_quiz_list(&catalog, page, limit).await?;
            emit(json, &page, print_quiz_list)?;
        }

        QuizAction::Submit {
            quiz_id,
            answers,
            answers_file,
            user,
        } => {
            let mut parsed = match answers_file {
                Some(path) => load_answers_file(&path)?,
                None => Vec::new(),
            };
            for arg in &answers {
                parsed.push(parse_answer_arg(arg)?);
            }

            let engine = GradingEngine::new(db);
            let report = cmd_quiz_submit(&engine, &quiz_id, user, &parsed).await?;
            emit(json, &report, print_grade_report)?;
        }

        QuizAction::Results { quiz_id } => {
            let engine = GradingEngine::new(db);
            let results = cmd_quiz_results(&engine, &quiz_id).await?;
            emit(json, &results, print_quiz_results)?;
        }
    }

    Ok(())
}

/// Base directory for `init`: a `.toml` path means its parent, any other
/// path is taken as the directory itself
fn init_base_dir(config: Option<PathBuf>) -> PathBuf {
    match config {
        Some(path) if path.extension().is_some_and(|e| e == "toml") => path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_base_dir),
        Some(path) => path,
        None => Config::default_base_dir(),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}. Run 'study-helper init' first.",
            config_path.display()
        )));
    }

    Config::load(&config_path)
}
