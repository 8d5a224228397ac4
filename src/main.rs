//! smart-mouse - vision-driven pointer automation
//!
//! Captures the screen, detects text and button-shaped regions, matches a
//! free-text query against them, and drives the pointer at the winner.

mod capture;
mod controller;
mod input;
mod render;
mod vision;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::capture::XcapScreen;
use crate::controller::{AutomationController, MatchOutcome};
use crate::input::{EnigoPointer, PointerButton};
use crate::vision::detection::DetectorConfig;
use crate::vision::ocr::{OcrConfig, TesseractOcr};
use crate::vision::Synthesizer;

/// smart-mouse - click UI elements by describing them
#[derive(Parser, Debug)]
#[command(name = "smart-mouse")]
#[command(about = "Vision-driven pointer automation: find UI elements by text and click them")]
struct Args {
    /// OCR language passed to tesseract
    #[arg(long, default_value = "eng")]
    lang: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Click the element best matching the query text, then exit
    Click {
        /// Free-text description of the element
        query: String,
    },
    /// Analyze the screen and write an annotated screenshot, then exit
    Show {
        /// Where to write the annotated screenshot
        #[arg(long, default_value = "detections.png")]
        output: PathBuf,
    },
}

/// One parsed interactive-loop command
#[derive(Debug, Clone, PartialEq)]
enum LoopCommand {
    Click(String),
    RightClick(String),
    DoubleClick(String),
    Move(String),
    Show,
    Refresh,
    Quit,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Collaborator setup; any failure here is fatal and exits non-zero.
    let screen = XcapScreen::primary()?;
    let pointer = EnigoPointer::new()?;
    let ocr = TesseractOcr::new(OcrConfig {
        language: args.lang.clone(),
        ..OcrConfig::default()
    })?;
    let synthesizer = Synthesizer::new(Box::new(ocr), DetectorConfig::default());
    let mut controller =
        AutomationController::new(Box::new(screen), Box::new(pointer), synthesizer);

    match args.command {
        Some(Command::Click { query }) => {
            report(&query, controller.click_on(&query, PointerButton::Left)?);
        }
        Some(Command::Show { output }) => {
            let count = controller.show(&output)?;
            println!("{count} candidates rendered to {}", output.display());
        }
        None => command_loop(&mut controller)?,
    }

    Ok(())
}

/// Interactive command loop over stdin
fn command_loop(controller: &mut AutomationController) -> Result<()> {
    print_menu();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break; // EOF behaves like quit
        };
        let line = line?;

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            LoopCommand::Quit => break,
            LoopCommand::Refresh => {
                let count = controller.refresh()?;
                println!("detected {count} ui candidates");
            }
            LoopCommand::Show => {
                let output = PathBuf::from("detections.png");
                let count = controller.show(&output)?;
                println!("{count} candidates rendered to {}", output.display());
            }
            LoopCommand::Click(query) => {
                report(&query, controller.click_on(&query, PointerButton::Left)?);
            }
            LoopCommand::RightClick(query) => {
                report(&query, controller.click_on(&query, PointerButton::Right)?);
            }
            LoopCommand::DoubleClick(query) => {
                report(&query, controller.double_click_on(&query)?);
            }
            LoopCommand::Move(query) => {
                report(&query, controller.move_to(&query)?);
            }
        }
    }

    info!("command loop finished");
    Ok(())
}

/// Parse one interactive line: a command word, then the rest as free text
fn parse_command(line: &str) -> Result<LoopCommand, String> {
    let trimmed = line.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    let with_arg = |build: fn(String) -> LoopCommand| {
        if rest.is_empty() {
            Err(format!("'{word}' needs a target, e.g. '{word} Submit'"))
        } else {
            Ok(build(rest.to_string()))
        }
    };

    match word {
        "click" => with_arg(LoopCommand::Click),
        "right" => with_arg(LoopCommand::RightClick),
        "double" => with_arg(LoopCommand::DoubleClick),
        "move" => with_arg(LoopCommand::Move),
        "show" => Ok(LoopCommand::Show),
        "refresh" => Ok(LoopCommand::Refresh),
        "quit" => Ok(LoopCommand::Quit),
        "" => Err("enter a command, or 'quit' to exit".to_string()),
        other => Err(format!("unknown command '{other}'")),
    }
}

/// Print the operator-facing outcome of a query-driven operation
fn report(query: &str, outcome: MatchOutcome) {
    match outcome {
        MatchOutcome::Matched { text, x, y } => {
            println!("matched '{text}' at ({x}, {y})");
        }
        MatchOutcome::NoMatch => {
            println!("could not find an element matching: {query}");
        }
    }
}

fn print_menu() {
    println!("=== smart-mouse ===");
    println!("Commands:");
    println!("  click <text>    - click the element matching text");
    println!("  right <text>    - right-click the element");
    println!("  double <text>   - double-click the element");
    println!("  move <text>     - move the pointer to the element");
    println!("  show            - write an annotated screenshot");
    println!("  refresh         - re-run screen analysis");
    println!("  quit            - exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_with_arguments_take_the_rest_of_the_line() {
        assert_eq!(
            parse_command("click Submit order"),
            Ok(LoopCommand::Click("Submit order".to_string()))
        );
        assert_eq!(
            parse_command("right  spaced   target "),
            Ok(LoopCommand::RightClick("spaced   target".to_string()))
        );
        assert_eq!(
            parse_command("double icon"),
            Ok(LoopCommand::DoubleClick("icon".to_string()))
        );
        assert_eq!(
            parse_command("move OK"),
            Ok(LoopCommand::Move("OK".to_string()))
        );
    }

    #[test]
    fn bare_commands_parse_without_arguments() {
        assert_eq!(parse_command("show"), Ok(LoopCommand::Show));
        assert_eq!(parse_command(" refresh "), Ok(LoopCommand::Refresh));
        assert_eq!(parse_command("quit"), Ok(LoopCommand::Quit));
    }

    #[test]
    fn missing_argument_is_rejected() {
        assert!(parse_command("click").is_err());
        assert!(parse_command("move   ").is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(parse_command("frobnicate").is_err());
        assert!(parse_command("").is_err());
    }
}
