//! The line-oriented command vocabulary.
//!
//! Short inputs are commands; anything three or more characters long whose
//! third character is not a space is a shot name and fires every camera.
//! Parsing is pure so the vocabulary is testable without a console.

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty input: show the command list.
    Help,
    Quit,
    FindCameras,
    NameCameras,
    /// `ff [pattern]`: show or change the filename format.
    Template(Option<String>),
    /// `md`: flip sequential/concurrent capture.
    ToggleMode,
    ChangeDir(Option<String>),
    ListDir { all: bool },
    /// A shot name that triggers a capture session.
    Shoot(String),
    Unknown(String),
}

pub fn parse(line: &str) -> Command {
    let cmd = line.trim();
    if cmd.is_empty() {
        return Command::Help;
    }
    // Commands are at most two characters, optionally followed by a space
    // and a parameter. Everything else long enough is a shot name.
    let is_command = cmd.chars().count() < 3 || cmd.chars().nth(2) == Some(' ');
    if !is_command {
        return Command::Shoot(cmd.to_string());
    }

    let head: String = cmd.chars().take(2).collect();
    let param: String = cmd.chars().skip(3).collect();
    let param = if param.is_empty() { None } else { Some(param) };

    match head.as_str() {
        "q" => Command::Quit,
        "fc" => Command::FindCameras,
        "cn" => Command::NameCameras,
        "ff" => Command::Template(param),
        "md" => Command::ToggleMode,
        "cd" => Command::ChangeDir(param),
        "ls" => Command::ListDir {
            all: param.as_deref() == Some("-a"),
        },
        _ => Command::Unknown(cmd.to_string()),
    }
}

pub const HELP: &str = r#"Commands:
  fc - find cameras
  cn - camera names
  ff - filename format (ex. "{0} - {1}.jpg")
  md - capture mode (sequential or concurrent)
  cd - change directory
  ls - list directory contents
  q  - quit

Photo capture:
  Anything more than 3 letters is considered a photo shot name,
  and will trigger photo capture for the cameras."#;
