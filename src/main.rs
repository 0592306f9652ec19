mod config;
mod db;
mod error;
mod import;
mod models;
mod selector;
mod session;
mod stats;
mod store;
mod tracker;
mod tui;
mod weak_topics;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::{Env, Target};
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::{get_db_path, get_log_path, resolve_user, QuizConfig, WeakTopicCriteria};
use db::Database;
use models::{JsonOutput, Question, QuizMode};

#[derive(Parser)]
#[command(name = "mathbubble")]
#[command(about = "An adaptive maths quiz with lives, streaks and weak-topic training")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Play as this registered user (defaults to $MATHBUBBLE_USER)
    #[arg(long, short, global = true)]
    user: Option<String>,

    /// Play as an untracked guest
    #[arg(long, global = true, conflicts_with = "user")]
    guest: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Import questions from a JSONL file
    Import {
        /// Path to the .jsonl file
        file: PathBuf,
    },

    /// Manage questions
    #[command(subcommand)]
    Question(QuestionCommands),

    /// Show answer statistics for the current user
    Stats,

    /// List topics that need practice
    Weak,

    /// Launch the interactive quiz
    Play {
        /// Start a training run on weak topics straight away
        #[arg(long, conflicts_with = "practice")]
        training: bool,

        /// Start a practice run straight away
        #[arg(long)]
        practice: bool,

        /// Questions per quiz
        #[arg(long, short)]
        questions: Option<usize>,

        /// Seed for question shuffling
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// List questions
    List {
        /// Filter by topic
        #[arg(long, short)]
        topic: Option<String>,
    },

    /// Add a multiple-choice question
    Add {
        /// Topic the question belongs to
        topic: String,

        /// Question text
        prompt: String,

        /// Answer options separated by '|'
        #[arg(long, short)]
        options: String,

        /// Zero-based index of the correct option
        #[arg(long, short)]
        correct: i64,
    },

    /// Show a question with its options
    Show {
        /// Question ID
        id: i64,
    },
}

fn init_logging(to_file: bool) {
    let env = Env::default().default_filter_or(if to_file { "info" } else { "warn" });
    let mut builder = env_logger::Builder::from_env(env);

    // Keep log lines off the terminal while the UI owns it
    if to_file {
        match File::options().create(true).append(true).open(get_log_path()) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(matches!(cli.command, Commands::Play { .. }));

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_db_path();
    let db = Database::open(&db_path)?;
    db.init()?;

    let user = resolve_user(cli.user.as_deref(), cli.guest);
    log::debug!("database {} user {}", db_path.display(), user.id);

    match cli.command {
        Commands::Init => {
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", db_path.display());
            }
        }

        Commands::Import { file } => {
            let reader = BufReader::new(File::open(&file)?);
            let report = import::import_questions(&db, reader)?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&report))?);
            } else {
                println!(
                    "Imported {} questions from {} ({} skipped).",
                    report.inserted,
                    file.display(),
                    report.skipped
                );
            }
        }

        Commands::Question(question_cmd) => match question_cmd {
            QuestionCommands::List { topic } => {
                let questions = db.list_questions(topic.as_deref())?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&questions))?);
                } else if questions.is_empty() {
                    println!("No questions found.");
                } else {
                    println!("{:<6} {:<20} QUESTION", "ID", "TOPIC");
                    println!("{}", "-".repeat(70));
                    for q in questions {
                        println!(
                            "{:<6} {:<20} {}",
                            q.id,
                            truncate(&q.topic, 18),
                            truncate(&q.prompt.replace('\n', " "), 44)
                        );
                    }
                }
            }

            QuestionCommands::Add {
                topic,
                prompt,
                options,
                correct,
            } => {
                let option_list: Vec<String> = options
                    .split('|')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();

                // Same checks the selector applies before a question is played
                Question::new(0, topic.as_str(), prompt.as_str(), option_list.clone(), correct)?;

                let options_json = serde_json::to_string(&option_list)?;
                let id = db.add_question(&topic, &prompt, &options_json, correct)?;

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "id": id,
                            "topic": topic
                        })))?
                    );
                } else {
                    println!("Added question {} to '{}'.", id, topic);
                }
            }

            QuestionCommands::Show { id } => match db.get_question(id)? {
                Some(stored) => {
                    let question = stored.parse()?;
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&question))?);
                    } else {
                        println!("[{}] {}", question.topic, question.prompt);
                        println!();
                        for (i, option) in question.options.iter().enumerate() {
                            let mark = if question.is_correct(i) { "*" } else { " " };
                            println!("{} {}. {}", mark, Question::option_letter(i), option);
                        }
                    }
                }
                None if cli.json => {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::<()>::err("Question not found"))?
                    );
                }
                None => println!("Question not found."),
            },
        },

        Commands::Stats => {
            let stats = stats::load_user_stats(&db, Some(&user));
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&stats))?);
            } else {
                if user.is_guest {
                    println!("Playing as guest, no history is kept.");
                    println!();
                }
                println!("=== Quiz Statistics ===");
                println!("Questions answered: {}", stats.total_questions);
                println!("Accuracy: {}%", stats.accuracy_rate);
                println!("Current streak: {}", stats.current_streak);
                println!("Weakest topic: {}", stats.weakest_topic);

                if !stats.topic_stats.is_empty() {
                    println!();
                    println!("{:<24} {:>8} {:>9}", "TOPIC", "CORRECT", "ACCURACY");
                    println!("{}", "-".repeat(43));
                    for stat in stats.topic_stats.values() {
                        println!(
                            "{:<24} {:>8} {:>8}%",
                            truncate(&stat.topic, 22),
                            format!("{}/{}", stat.correct, stat.total),
                            stat.accuracy_percent()
                        );
                    }
                }
            }
        }

        Commands::Weak => {
            let weak = weak_topics::find_weak_topics(
                &db,
                Some(&user),
                &WeakTopicCriteria::default(),
            );
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&weak))?);
            } else if weak.is_empty() {
                println!("No weak topics found. Try practice mode to build a profile.");
            } else {
                println!("{:<4} {:<24} {:>9} {:>9}", "#", "TOPIC", "ACCURACY", "ATTEMPTS");
                println!("{}", "-".repeat(49));
                for (i, w) in weak.iter().enumerate() {
                    println!(
                        "{:<4} {:<24} {:>8}% {:>9}",
                        i + 1,
                        truncate(&w.topic, 22),
                        (w.accuracy * 100.0).round() as u32,
                        w.attempts
                    );
                }
            }
        }

        Commands::Play {
            training,
            practice,
            questions,
            seed,
        } => {
            let config = QuizConfig::default().with_questions(questions);
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let start = if training {
                Some(QuizMode::Training)
            } else if practice {
                Some(QuizMode::Practice)
            } else {
                None
            };
            log::info!("starting play as {} ({:?})", user.id, start);
            tui::run(db, user, config, rng, start)?;
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
