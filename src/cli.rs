//! CLI interface for orato

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::coach::{weekly_task, Activity, Coach, ConversationRole, WEEKLY_TASKS};
use crate::config::{self, Config};
use crate::credentials;
use crate::gateway::{LlmGateway, OpenAiClient};
use crate::progress::trend::RECENT_WINDOW;
use crate::progress::{Advice, ProgressStore, StoreError, TrendSummary};
use crate::types::{ChatMessage, Session};

#[derive(Parser)]
#[command(name = "orato")]
#[command(about = "Communication coach with conversation practice, drills, and progress tracking", long_about = None)]
#[command(version)]
struct Cli {
    /// Conversation partner for the default chat session
    #[arg(short, long, value_enum, default_value = "job-interviewer")]
    role: ConversationRole,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an open conversation practice session
    Chat {
        /// Conversation partner persona
        #[arg(short, long, value_enum, default_value = "job-interviewer")]
        role: ConversationRole,
    },
    /// Run a prompted speaking drill
    Drill {
        /// Drill activity
        #[arg(short, long, value_enum)]
        activity: Activity,
    },
    /// Work through a weekly presentation task
    Present {
        /// Task week (1-10)
        #[arg(short, long, default_value = "1")]
        week: usize,
    },
    /// Show progress history and trend
    Progress {
        /// Smooth the daily series with a trailing rolling window of N days
        #[arg(short, long)]
        rolling: Option<usize>,
        /// Ask the coach for tips tailored to your trend
        #[arg(short, long)]
        advice: bool,
    },
    /// Configure the coach
    Config {
        /// Set the chat API key
        #[arg(long)]
        set_api_key: Option<String>,
        /// Remove the stored API key
        #[arg(long)]
        delete_api_key: bool,
        /// Set the chat model
        #[arg(long)]
        set_model: Option<String>,
        /// Set the API base URL
        #[arg(long)]
        set_base_url: Option<String>,
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Default to a chat session when no command is given
    match cli.command {
        None => {
            run_chat(cli.role).await?;
        }
        Some(Commands::Chat { role }) => {
            run_chat(role).await?;
        }
        Some(Commands::Drill { activity }) => {
            run_drill(activity).await?;
        }
        Some(Commands::Present { week }) => {
            run_present(week).await?;
        }
        Some(Commands::Progress { rolling, advice }) => {
            show_progress(rolling, advice).await?;
        }
        Some(Commands::Config {
            set_api_key,
            delete_api_key,
            set_model,
            set_base_url,
            show,
        }) => {
            if let Some(key) = set_api_key {
                credentials::set_api_key(&key)?;
                println!("API key stored.");
            } else if delete_api_key {
                credentials::delete_api_key()?;
                println!("API key removed.");
            } else if let Some(model) = set_model {
                let mut config = Config::load()?;
                config.api.model = model;
                config.save()?;
                println!("Model set to {}.", config.api.model);
            } else if let Some(url) = set_base_url {
                let mut config = Config::load()?;
                config.api.base_url = url.trim_end_matches('/').to_string();
                config.save()?;
                println!("Base URL set to {}.", config.api.base_url);
            } else if show {
                show_config()?;
            } else {
                println!("Configuration options:");
                println!("  --set-api-key <key>   Set the chat API key");
                println!("  --delete-api-key      Remove the stored API key");
                println!("  --set-model <id>      Set the chat model");
                println!("  --set-base-url <url>  Set the API base URL");
                println!("  --show                Display current configuration");
            }
        }
    }

    Ok(())
}

/// Interactive conversation practice loop
async fn run_chat(role: ConversationRole) -> Result<()> {
    println!("Conversation practice with a {}.", role.label());
    println!("Type 'feedback' for a session review, 'history' for the transcript,");
    println!("and 'exit' to end the session.\n");

    if !credentials::has_api_key() {
        println!("Error: No API key set.");
        println!("Run: orato config --set-api-key YOUR_KEY");
        return Ok(());
    }

    let config = Config::load()?;
    let coach = build_coach(&config)?;
    let mut session = Session::new();

    loop {
        let Some(input) = prompt_line("> ")? else { break };
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("Goodbye!");
                break;
            }
            "history" => {
                if session.is_empty() {
                    println!("Nothing said yet.\n");
                } else {
                    println!("\n=== Session Transcript ===");
                    println!("{}", session.transcript());
                    println!("==========================\n");
                }
                continue;
            }
            "feedback" => {
                if session.is_empty() {
                    println!("Say something first, then ask for feedback.\n");
                    continue;
                }
                let spinner = thinking_spinner("Reviewing your session...");
                let result = coach.session_feedback(&session).await;
                spinner.finish_and_clear();
                match result {
                    Ok(feedback) => println!("\n{}\n", feedback),
                    Err(e) => println!("Error: {}\n", e),
                }
                continue;
            }
            _ => {}
        }

        session.push(ChatMessage::user(input));

        let spinner = thinking_spinner("Thinking...");
        let result = coach.conversational_reply(role, &session).await;
        spinner.finish_and_clear();
        match result {
            Ok(reply) => {
                println!("\n{}\n", reply.text);
                session.push(ChatMessage::assistant(reply.text));
            }
            Err(e) => {
                println!("Error: {}\n", e);
            }
        }
    }

    Ok(())
}

/// Prompted drill loop: respond, get scored feedback, move to the next prompt
async fn run_drill(activity: Activity) -> Result<()> {
    println!("{} drill.", activity.label());
    println!(
        "Respond to each {}, or type 'exit' to stop.\n",
        activity.prompt_noun().to_lowercase()
    );

    if !credentials::has_api_key() {
        println!("Error: No API key set.");
        println!("Run: orato config --set-api-key YOUR_KEY");
        return Ok(());
    }

    let config = Config::load()?;
    let coach = build_coach(&config)?;

    let spinner = thinking_spinner("Generating a prompt...");
    let result = coach.practice_prompt(activity).await;
    spinner.finish_and_clear();
    let mut current = match result {
        Ok(prompt) => prompt,
        Err(e) => {
            println!("Error: {}", e);
            return Ok(());
        }
    };

    loop {
        println!("{}: {}\n", activity.prompt_noun(), current);

        let Some(response) = prompt_line("> ")? else { break };
        if response.is_empty() {
            continue;
        }
        if matches!(response.to_lowercase().as_str(), "exit" | "quit") {
            println!("Goodbye!");
            break;
        }

        let spinner = thinking_spinner("Evaluating your response...");
        let result = coach.drill_feedback(&response, activity, &current).await;
        spinner.finish_and_clear();
        match result {
            Ok(outcome) => {
                println!("\n{}\n", outcome.feedback);
                match outcome.next_prompt {
                    Some(next) => current = next,
                    None => println!(
                        "Keeping the current {}.\n",
                        activity.prompt_noun().to_lowercase()
                    ),
                }
            }
            Err(e) => println!("Error: {}\n", e),
        }
    }

    Ok(())
}

/// One-shot presentation task: show the task, take a response, evaluate it
async fn run_present(week: usize) -> Result<()> {
    let Some(task) = weekly_task(week) else {
        println!("Week must be between 1 and {}.", WEEKLY_TASKS.len());
        return Ok(());
    };

    println!("Week {} presentation task:\n", week);
    println!("{}\n", task);

    if !credentials::has_api_key() {
        println!("Error: No API key set.");
        println!("Run: orato config --set-api-key YOUR_KEY");
        return Ok(());
    }

    let config = Config::load()?;
    let coach = build_coach(&config)?;

    let Some(response) = prompt_line("Your presentation text: ")? else {
        return Ok(());
    };
    if response.is_empty() {
        println!("Nothing to evaluate.");
        return Ok(());
    }

    let spinner = thinking_spinner("Evaluating your presentation...");
    let result = coach.presentation_feedback(&response, task).await;
    spinner.finish_and_clear();
    match result {
        Ok(feedback) => println!("\n{}", feedback),
        Err(e) => println!("Error: {}", e),
    }

    Ok(())
}

/// Print the score history with trend statistics, optionally with tips
async fn show_progress(rolling: Option<usize>, advice: bool) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;

    let records = match store.read_all() {
        Ok(records) => records,
        Err(StoreError::NoHistory) => {
            println!("No progress recorded yet. Complete a practice session to start tracking.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let Some(summary) = TrendSummary::from_history(&records) else {
        println!("No progress recorded yet. Complete a practice session to start tracking.");
        return Ok(());
    };

    println!("=== Daily Average Scores ===");
    let series = match rolling {
        Some(window) => summary.rolling_daily_average(window),
        None => summary.daily_average.clone(),
    };
    for (date, mean) in &series {
        println!("  {}  {:.2}/10", date, mean);
    }
    println!();
    println!("Average daily change: {:+.2} points", summary.average_daily_delta);
    println!();
    println!("=== Recent Averages (last {} sessions) ===", RECENT_WINDOW);
    for (criterion, mean) in &summary.recent_averages {
        println!("  {:<16} {:.1}/10", criterion.label(), mean);
    }

    if advice {
        if !credentials::has_api_key() {
            println!();
            println!("Tips need an API key. Run: orato config --set-api-key YOUR_KEY");
            return Ok(());
        }
        let coach = build_coach(&config)?;
        let spinner = thinking_spinner("Looking over your trend...");
        let result = coach.trend_advice().await;
        spinner.finish_and_clear();
        match result? {
            Advice::NoHistory => println!("\nNo history to advise on yet."),
            Advice::Tips(tips) => {
                println!();
                println!("=== Coaching Tips ===");
                println!("{}", tips);
            }
        }
    }

    Ok(())
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    println!("Config file: {}", config::config_path()?.display());
    println!("Base URL:    {}", config.api.base_url);
    println!("Model:       {}", config.api.model);
    println!("Progress:    {}", store.path().display());
    println!(
        "API key:     {}",
        if credentials::has_api_key() {
            "set"
        } else {
            "not set"
        }
    );
    Ok(())
}

fn build_coach(config: &Config) -> Result<Coach> {
    let api_key = credentials::get_api_key()?;
    let client = OpenAiClient::with_endpoint(api_key, &config.api.base_url, &config.api.model);
    let store = open_store(config)?;
    Ok(Coach::new(LlmGateway::new(client), store))
}

fn open_store(config: &Config) -> Result<ProgressStore> {
    match &config.storage.progress_path {
        Some(path) => Ok(ProgressStore::with_path(path.clone())),
        None => ProgressStore::open_default(),
    }
}

/// Print a prompt and read one trimmed line; None on end of input
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn thinking_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.dim} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
