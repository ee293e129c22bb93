//! Respondent keystrokes to survey commands.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Option position (1-based) or slider value, depending on the question.
    Value(i64),
    Next,
    Previous,
    Restart,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if let Ok(value) = line.parse::<i64>() {
        return Some(Command::Value(value));
    }
    match line.to_ascii_lowercase().as_str() {
        "n" | "next" | "f" | "finish" => Some(Command::Next),
        "p" | "prev" | "previous" | "back" => Some(Command::Previous),
        "r" | "restart" => Some(Command::Restart),
        "h" | "help" | "?" => Some(Command::Help),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

pub const HELP: &str = "\
Commands:
  <number>   pick an option by its number, or set the slider value
  n          next question (finishes the survey on the last one)
  p          previous question
  r          restart from the first question
  q          quit";
