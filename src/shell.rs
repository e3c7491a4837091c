//! The interactive tethering shell.
//!
//! Owns all console interaction: the prompt, y/n confirmations, and the
//! per-command flows. Everything below this module is non-blocking with
//! respect to the console; the shell is the only place that reads stdin.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::capture::CaptureStatus;
use crate::commands::{self, Command};
use crate::devices::{DiscoveryError, RenameError};
use crate::fs_nav;
use crate::naming::NamingTemplate;
use crate::session::{Session, IDENTIFY_FILE};
use crate::tool::CameraTool;

/// Print `prompt_text` and block for one line of input. End of input is
/// surfaced as `UnexpectedEof` so the command loop can exit cleanly.
fn read_input(prompt_text: &str) -> io::Result<String> {
    print!("{}", prompt_text);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
    }
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> io::Result<bool> {
    let answer = read_input(&format!("{} (y/n) ", question))?;
    Ok(answer.to_lowercase().starts_with('y'))
}

pub struct Shell<T: CameraTool> {
    session: Session<T>,
}

impl<T: CameraTool> Shell<T> {
    pub fn new(session: Session<T>) -> Self {
        Self { session }
    }

    /// Run the command loop until the user quits or input ends. Every
    /// failure inside a command becomes a message; only the quit command
    /// (or end of input) leaves the loop.
    pub fn run(&mut self) -> io::Result<()> {
        println!("Welcome to the multicam tethering shell.");
        if let Err(e) = self.discover_and_name() {
            if e.kind() != io::ErrorKind::UnexpectedEof {
                return Err(e);
            }
            println!();
            return Ok(());
        }
        loop {
            let cwd = std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "?".to_string());
            let line = match read_input(&format!("{} > ", cwd)) {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    println!();
                    break;
                }
                Err(e) => return Err(e),
            };
            match self.dispatch(commands::parse(&line)) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    println!();
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Returns `Ok(false)` when the loop should end.
    fn dispatch(&mut self, command: Command) -> io::Result<bool> {
        match command {
            Command::Help => println!("{}", commands::HELP),
            Command::Quit => {
                if confirm("Are you sure you want to quit?")? {
                    println!("Quitting...");
                    return Ok(false);
                }
            }
            Command::FindCameras => self.find_cameras()?,
            Command::NameCameras => self.name_cameras()?,
            Command::Template(param) => self.edit_template(param)?,
            Command::ToggleMode => {
                let mode = self.session.toggle_mode();
                println!("Capture mode: {}", mode);
            }
            Command::ChangeDir(param) => self.change_dir(param)?,
            Command::ListDir { all } => self.list_dir(all),
            Command::Shoot(shot) => self.shoot(&shot)?,
            Command::Unknown(cmd) => {
                println!("Unknown command \"{}\". Press Enter for the command list.", cmd);
            }
        }
        Ok(true)
    }

    fn find_cameras(&mut self) -> io::Result<()> {
        if !self.session.registry().is_empty() {
            println!("Current camera list:");
            println!();
            print!("{}", self.session.registry().table());
            println!();
            if !confirm("Search for cameras?")? {
                return Ok(());
            }
        }
        self.discover_and_name()
    }

    fn discover_and_name(&mut self) -> io::Result<()> {
        match self.session.discover() {
            Err(DiscoveryError::ToolUnavailable(e)) => {
                println!("Camera query failed: {}", e);
            }
            Err(DiscoveryError::NoneFound) => {
                println!("No cameras found! Make sure that cameras are connected by USB and powered on.");
                println!("If a camera is accessible as an external drive, you may have to \"Eject...\" it first.");
            }
            Ok(count) => {
                println!("{} cameras found:", count);
                println!();
                print!("{}", self.session.registry().table());
                println!();
                self.name_all_cameras()?;
                println!();
                print!("{}", self.session.registry().table());
            }
        }
        Ok(())
    }

    fn name_cameras(&mut self) -> io::Result<()> {
        if self.session.registry().is_empty() {
            println!("There are no cameras to name. Use fc command to find cameras.");
            return Ok(());
        }
        println!("Current camera list:");
        println!();
        print!("{}", self.session.registry().table());
        println!();
        if confirm("Rename all cameras?")? {
            self.name_all_cameras()?;
        }
        Ok(())
    }

    /// Walk the registry in order: photograph each camera, show the shot,
    /// and ask (until non-empty) what to call it. Photographing is the only
    /// reliable way to tell which physical camera an address belongs to.
    fn name_all_cameras(&mut self) -> io::Result<()> {
        println!("The camera name is part of the filename for");
        println!("  all pictures taken with it.");
        println!("Choose a different name for every camera.");
        println!();
        for index in 0..self.session.registry().len() {
            println!("Taking a picture with camera {}!", index);
            let _ = self.session.identify_capture(index);
            self.session.present(Path::new(IDENTIFY_FILE));
            loop {
                let name = read_input(&format!("Enter name for camera {}: ", index))?;
                match self.session.rename(index, &name) {
                    Ok(()) => break,
                    Err(RenameError::EmptyName) => continue,
                    Err(e) => {
                        println!("{}", e);
                        break;
                    }
                }
            }
        }
        println!("All cameras have been named!");
        Ok(())
    }

    fn edit_template(&mut self, param: Option<String>) -> io::Result<()> {
        println!("Filename format: \"{}\"", self.session.template().pattern());
        let param = match param {
            Some(p) => Some(p),
            None => {
                println!("{{0}} for shot name, and {{1}} for camera name");
                let input = read_input("Set to: ")?;
                if input.is_empty() {
                    None
                } else {
                    Some(input)
                }
            }
        };
        match param {
            Some(pattern) => {
                self.session.set_template(NamingTemplate::new(pattern));
                println!("Filename format: \"{}\"", self.session.template().pattern());
            }
            None => println!("No change"),
        }
        Ok(())
    }

    fn change_dir(&self, param: Option<String>) -> io::Result<()> {
        let path = match param {
            Some(p) => p,
            None => read_input("Change directory to: ")?,
        };
        if path.is_empty() {
            println!("No change");
            return Ok(());
        }
        let path = Path::new(&path);
        if fs_nav::change_dir(path) {
            return Ok(());
        }
        println!("Path does not exist: {}", fs_nav::absolute(path).display());
        if confirm("Make new directory?")? {
            if fs_nav::make_dir(path) {
                if !fs_nav::change_dir(path) {
                    println!("Could not change to {}", fs_nav::absolute(path).display());
                }
            } else {
                println!("Could not make directory");
            }
        }
        Ok(())
    }

    fn list_dir(&self, all: bool) {
        let listing = match fs_nav::list_dir(Path::new(".")) {
            Ok(listing) => listing,
            Err(e) => {
                println!("Could not list directory: {}", e);
                return;
            }
        };
        if listing.dirs.is_empty() {
            println!("No folders.");
        } else {
            println!("Folders:\n  {}", listing.dirs.join("\n  "));
        }
        if listing.files.is_empty() {
            println!("No files.");
        } else {
            let max = if all { listing.files.len() } else { 10 };
            let shown: Vec<&str> = listing.files.iter().take(max).map(String::as_str).collect();
            println!("Files:\n  {}", shown.join("\n  "));
            if listing.files.len() > max {
                println!(
                    "...and {} more. Show all with \"ls -a\"",
                    listing.files.len() - max
                );
            }
        }
    }

    fn shoot(&mut self, shot: &str) -> io::Result<()> {
        if self.session.registry().is_empty() {
            println!("There are no cameras connected. Use fc command to find cameras.");
            return Ok(());
        }
        let mut prompt_failed = None;
        let outcomes = self.session.shoot(shot, |collisions| {
            match confirm("File with same name already exists. Overwrite?") {
                Ok(true) => true,
                Ok(false) => {
                    println!("Aborting capture sequence. File already exists:");
                    for path in collisions {
                        println!("  {}", fs_nav::absolute(path).display());
                    }
                    false
                }
                Err(e) => {
                    prompt_failed = Some(e);
                    false
                }
            }
        });
        if let Some(e) = prompt_failed {
            return Err(e);
        }
        if let Some(outcomes) = outcomes {
            let done = outcomes
                .iter()
                .filter(|o| o.status == CaptureStatus::Completed)
                .count();
            if done < outcomes.len() {
                println!("{} of {} captures succeeded.", done, outcomes.len());
            }
        }
        Ok(())
    }
}
