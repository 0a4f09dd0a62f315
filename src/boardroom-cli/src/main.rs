//! Boardroom CLI - simulated corporate strategy meetings.
//!
//! Runs a numbered meeting scenario between AI executive personas using an
//! OpenAI-compatible API, with optional text-to-speech output.

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use boardroom_core::{
    BackendConfig, ChatBackend, Config, KokoroRenderer, MeetingEvent, MeetingSession, OpenAiBackend,
    Persona, Scenario, available_scenarios, default_config,
};
use clap::Parser;
use colored::{Color, Colorize};

#[derive(Parser)]
#[command(
    name = "boardroom",
    version,
    about = "Simulated executive strategy meetings between AI personas",
    long_about = "Runs scripted boardroom meetings where AI personas for each executive \
                  role discuss strategy, debate, and record a transcript."
)]
struct Cli {
    /// Scenario number to run (see --list)
    #[arg(value_name = "SCENARIO", default_value_t = 1)]
    scenario: u32,

    /// Enable text-to-speech output with per-role voices
    #[arg(long)]
    audio: bool,

    /// TOML configuration file overriding the built-in executive roster
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List available scenarios and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.list {
        print_scenarios();
        return;
    }

    let scenario = match Scenario::from_number(cli.scenario) {
        Ok(s) => s,
        Err(_) => {
            eprintln!(
                "{} Unknown scenario '{}'.",
                "Error:".red().bold(),
                cli.scenario
            );
            print_scenarios();
            process::exit(1);
        }
    };

    // The credential check is a precondition: no persona call is attempted
    // without a key.
    let api_key = match require_api_key(env::var("OPENAI_API_KEY").ok()) {
        Some(key) => key,
        None => {
            eprintln!(
                "{}",
                "Error: OPENAI_API_KEY environment variable is not set.".red()
            );
            eprintln!();
            eprintln!("{}", "To run a meeting you need to:".yellow());
            eprintln!("  1. Get an API key from your OpenAI-compatible provider");
            eprintln!("  2. Put OPENAI_API_KEY=your_key in a .env file, or");
            eprintln!("  3. export OPENAI_API_KEY=your_key");
            process::exit(1);
        }
    };

    let api_base = env::var("OPENAI_API_BASE")
        .or_else(|_| env::var("OPENAI_BASE_URL"))
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                process::exit(1);
            }
        },
        None => default_config(),
    };

    print_banner(&config, scenario);

    let backend: Arc<dyn ChatBackend> =
        Arc::new(OpenAiBackend::new(BackendConfig::new(api_base, api_key)));

    let personas: Vec<Persona> = config
        .build_personas()
        .into_iter()
        .map(|p| p.with_backend(backend.clone()))
        .collect();

    let mut session = match MeetingSession::new(personas) {
        Ok(session) => session
            .with_chair(&config.meeting.chair)
            .with_callback(create_console_callback()),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    if cli.audio {
        println!(
            "{}",
            "Audio output enabled. Personas will speak their statements.".cyan()
        );
        match KokoroRenderer::new(config.voices.clone()).await {
            Ok(renderer) => {
                session = session.with_audio(Box::new(renderer));
            }
            Err(e) => {
                // Meetings proceed without audio
                eprintln!(
                    "{} {e}",
                    "Warning: could not initialize TTS, continuing without audio.".yellow()
                );
            }
        }
    }

    if let Err(e) = scenario.run(&mut session).await {
        eprintln!();
        eprintln!("{} {}", "Error during meeting:".red().bold(), e);
        eprintln!(
            "{}",
            "Make sure your OpenAI API key is valid and you have sufficient credits.".yellow()
        );
        process::exit(1);
    }

    println!();
    println!("{}", "═".repeat(80).bright_green());
    println!(
        "{}",
        format!(
            "  Meeting completed. Transcript saved to {}",
            scenario.transcript_path()
        )
        .bright_green()
        .bold()
    );
    println!("{}", "═".repeat(80).bright_green());
}

/// Credential precondition: a meeting never starts without a usable key.
fn require_api_key(value: Option<String>) -> Option<String> {
    value.filter(|key| !key.trim().is_empty())
}

fn print_scenarios() {
    println!("{}", "Available scenarios:".bold());
    for scenario in available_scenarios() {
        println!("  {}. {}", scenario.number(), scenario.title());
    }
    println!();
    println!("Usage: boardroom [SCENARIO] [--audio]");
}

fn print_banner(config: &Config, scenario: Scenario) {
    println!();
    println!("{}", "═".repeat(80).bright_cyan());
    println!(
        "{}",
        format!("{:^80}", format!("{} - {}", config.meeting.company, scenario.title()))
            .bright_cyan()
            .bold()
    );
    println!("{}", "═".repeat(80).bright_cyan());
    println!();
    println!("{}", "Attendees:".bold());
    for spec in &config.personas {
        println!(
            "  - {} {} {}",
            spec.name.bright_white(),
            format!("({})", spec.title).color(role_color(&spec.role_key)),
            format!("[{}]", spec.model).dimmed()
        );
    }
    println!();
}

/// One console color per executive role, matching the transcript headers.
fn role_color(role_key: &str) -> Color {
    match role_key {
        "ceo" => Color::Magenta,
        "cfo" => Color::Yellow,
        "cto" => Color::Cyan,
        "coo" => Color::Green,
        "marketing" => Color::Blue,
        _ => Color::White,
    }
}

/// Create a callback that prints meeting events to the console.
fn create_console_callback() -> Box<dyn Fn(MeetingEvent) + Send + Sync> {
    Box::new(move |event| match event {
        MeetingEvent::SectionStart { heading } => {
            println!();
            println!("{}", "═".repeat(80).bright_cyan());
            println!("{}", format!("{heading:^80}").bright_cyan().bold());
            println!("{}", "═".repeat(80).bright_cyan());
            println!();
        }
        MeetingEvent::SpeakerStart {
            role_key,
            name,
            title,
        } => {
            println!(
                "{} {}",
                format!("[{title}]").color(role_color(&role_key)).bold(),
                format!("- {name}").dimmed()
            );
        }
        MeetingEvent::SpeakerStatement { text, .. } => {
            for line in wrap_text(&text, 76).lines() {
                println!("  {line}");
            }
            println!();
        }
        MeetingEvent::MeetingEnd => {
            // Closing banner is printed in main
        }
    })
}

/// Simple greedy word wrap.
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}
