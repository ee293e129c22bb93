//! Text rendering of the derived session view.

use std::fmt::Write;

use client_core::{DisplayState, InputView, SessionView};
use shared::domain::InputKind;

const PROGRESS_WIDTH: usize = 20;

pub fn render(view: &SessionView) -> String {
    let mut out = String::new();
    if view.display == DisplayState::Completed {
        render_completion(&mut out, view);
        return out;
    }

    let filled = ((view.progress * PROGRESS_WIDTH as f64).round() as usize).min(PROGRESS_WIDTH);
    let _ = writeln!(
        out,
        "[{}{}] Question {} of {}   Score: {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        view.question_number,
        view.total_questions,
        view.score
    );
    let _ = writeln!(out, "{}", view.prompt);

    match &view.input {
        InputView::Options { kind, options } => {
            for (position, option) in options.iter().enumerate() {
                let marker = if option.selected { "(*)" } else { "( )" };
                let label = match kind {
                    InputKind::Emoji => format!("{} {}", option.label, option.value),
                    _ => option.label.clone(),
                };
                let _ = writeln!(out, "  {marker} {}. {label}", position + 1);
            }
        }
        InputView::Slider { min, max, value } => {
            let current = value.map_or_else(|| "not set".to_string(), |v| v.to_string());
            let _ = writeln!(out, "  slider {min}..={max}, current: {current}");
        }
    }

    let mut actions = Vec::new();
    if view.can_go_previous {
        actions.push("[p] Previous".to_string());
    }
    if view.can_go_next {
        actions.push(format!("[n] {}", view.next_label));
    }
    actions.push("[h] Help".to_string());
    let _ = write!(out, "{}", actions.join("  "));
    out
}

/// Front of the completion notice when answers the server did not accept
/// could not be written to the local spool either.
pub const UNSAVED_ANSWERS_NOTICE: &str =
    "Unable to reach the survey server, and your answers could not be saved on this device";

/// Renders the view, replacing its notice with the spool error when the
/// rejected answers were not kept locally.
pub fn render_screen(mut view: SessionView, spool_error: Option<&str>) -> String {
    if let Some(error) = spool_error {
        view.notice = Some(format!("{UNSAVED_ANSWERS_NOTICE}: {error}"));
    }
    render(&view)
}

fn render_completion(out: &mut String, view: &SessionView) {
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "! {notice}");
    }
    let _ = writeln!(out, "Thank you for completing the survey!");
    let _ = writeln!(
        out,
        "Your final score: {}",
        view.final_score.unwrap_or(view.score)
    );
    let _ = write!(out, "[r] Restart  [q] Quit");
}
