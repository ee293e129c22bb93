use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    spool::LocalSpool, DisplayState, HttpAnswerStore, InputView, QuestionBank, Step,
    SurveyController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod input;
mod render;

use input::{parse_command, Command, HELP};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    /// JSON question bank; the built-in survey is used when omitted.
    #[arg(long)]
    questions: Option<PathBuf>,
    /// Where answer sets are kept when the server cannot be reached.
    #[arg(long, default_value = "survey-spool.jsonl")]
    spool: PathBuf,
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();
    let args = Args::parse();

    let bank = match &args.questions {
        Some(path) => QuestionBank::from_path(path)?,
        None => QuestionBank::builtin(),
    };
    let store = HttpAnswerStore::new(&args.server_url, Duration::from_secs(args.timeout_secs))?;
    let spool = LocalSpool::new(args.spool);
    info!(server_url = %store.base_url(), questions = bank.len(), "starting survey");

    let mut controller = SurveyController::new(bank, store);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut spool_error: Option<String> = None;
    println!("{}", render::render(&controller.session().view()));
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let Some(command) = parse_command(&line) else {
            println!("Unrecognised input. Type h for help.");
            continue;
        };
        if command == Command::Quit {
            break;
        }
        match handle(&mut controller, &spool, command).await {
            Ok(Some(error)) => spool_error = Some(error),
            Ok(None) => {}
            Err(error) => println!("{error}"),
        }
        if controller.session().display_state() == DisplayState::InProgress {
            spool_error = None;
        }
        println!();
        println!(
            "{}",
            render::render_screen(controller.session().view(), spool_error.as_deref())
        );
    }

    Ok(())
}

fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Runs one command. `Ok(Some(_))` carries the error of a failed attempt to
/// spool answers the server did not accept.
async fn handle(
    controller: &mut SurveyController<HttpAnswerStore>,
    spool: &LocalSpool,
    command: Command,
) -> Result<Option<String>> {
    match command {
        Command::Value(value) => {
            let session = controller.session_mut();
            let index = session.current_index();
            match session.view().input {
                InputView::Slider { .. } => session.set_slider_value(index, value)?,
                InputView::Options { .. } => {
                    let position = usize::try_from(value.saturating_sub(1))
                        .context("options are numbered from 1")?;
                    session.choose(index, position)?;
                }
            }
        }
        Command::Next => {
            if let Step::Completed(report) = controller.advance().await? {
                if !report.accepted {
                    match spool.append(&report.answer_set) {
                        Ok(_) => info!(path = %spool.path().display(), "answers spooled locally"),
                        Err(error) => {
                            let error = format!("{error:#}");
                            warn!(%error, "failed to spool answers");
                            return Ok(Some(error));
                        }
                    }
                }
            }
        }
        Command::Previous => controller.session_mut().retreat()?,
        Command::Restart => controller.session_mut().restart(),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
    }
}
