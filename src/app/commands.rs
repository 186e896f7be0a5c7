use super::App;
use crate::ingest;
use crate::utils;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Import(&'a str),
    Play,
    Stop,
    Clear,
    Help,
    Unknown(String),
}

fn parse_command(input: &str) -> Option<Command<'_>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut words = trimmed.split_whitespace();
    let name = words.next()?;
    let command = name.to_ascii_lowercase();
    let args = trimmed[name.len()..].trim();

    Some(match command.as_str() {
        "q" | "quit" | "exit" => Command::Quit,
        "i" | "import" | "add" => Command::Import(args),
        "play" | "start" => Command::Play,
        "stop" | "pause" => Command::Stop,
        "clear" => Command::Clear,
        "h" | "help" => Command::Help,
        _ => Command::Unknown(command),
    })
}

impl App {
    /// Enter command mode.
    pub fn enter_command_mode(&mut self) {
        self.ui.command_mode = true;
        self.ui.command_buffer.clear();
    }

    /// Exit command mode without executing.
    pub fn exit_command_mode(&mut self) {
        self.ui.command_mode = false;
        self.ui.command_buffer.clear();
    }

    pub fn command_input(&mut self, c: char) {
        self.ui.command_buffer.push(c);
    }

    pub fn command_backspace(&mut self) {
        self.ui.command_buffer.pop();
    }

    /// Execute the current command.
    pub fn execute_command(&mut self) {
        let cmd = self.ui.command_buffer.trim().to_string();
        self.ui.command_mode = false;
        self.ui.command_buffer.clear();

        let Some(command) = parse_command(&cmd) else {
            return;
        };

        match command {
            Command::Quit => {
                self.ui.should_quit = true;
            }

            Command::Import(args) => {
                if args.is_empty() {
                    self.ui.status_message = Some("Usage: :import <file or directory>".to_string());
                } else {
                    self.import_path(args);
                }
            }

            Command::Play => {
                self.slideshow.start(Instant::now());
                self.ui.status_message = Some("Slideshow playing".to_string());
            }

            Command::Stop => {
                self.slideshow.stop();
                self.ui.status_message = Some("Slideshow paused".to_string());
            }

            Command::Clear => {
                let removed = self.store.total();
                self.store.replace_all(Vec::new());
                self.reset_thumbnail_cache();
                self.ui.status_message = Some(format!("Removed {} wallpapers", removed));
            }

            Command::Help => {
                self.ui.show_help = true;
            }

            Command::Unknown(command) => {
                self.ui.status_message = Some(format!("Unknown command: {}", command));
            }
        }
    }

    /// Import a file or directory from command mode.
    ///
    /// Runs on the tokio runtime driving the TUI; the event loop blocks until
    /// the batch is done, so the user sees a single refresh.
    fn import_path(&mut self, raw: &str) {
        let path = utils::expand_tilde(raw);
        let sources = ingest::collect_sources(
            &[path.clone()],
            self.config.library.recursive,
            &self.config.library.extensions,
        );
        if sources.is_empty() {
            self.ui.status_message = Some(format!("Nothing to import at {}", path.display()));
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("import requested without an async runtime");
            self.ui.status_message = Some("Import unavailable".to_string());
            return;
        };

        let store = &mut self.store;
        let ingest = &self.ingest;
        let report =
            tokio::task::block_in_place(|| handle.block_on(store.import_batch(ingest, &sources)));

        info!(path = %path.display(), added = report.added, "import from command mode");
        self.ui.status_message = Some(format!(
            "Imported {} (skipped {}, failed {})",
            report.added, report.skipped, report.failed
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Command};

    #[test]
    fn parse_known_aliases() {
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("QUIT"), Some(Command::Quit));
        assert_eq!(parse_command("pause"), Some(Command::Stop));
        assert_eq!(parse_command("start"), Some(Command::Play));
        assert_eq!(parse_command("clear"), Some(Command::Clear));
    }

    #[test]
    fn import_keeps_path_with_spaces() {
        assert_eq!(
            parse_command("import   ~/Pictures/My Posters  "),
            Some(Command::Import("~/Pictures/My Posters"))
        );
        assert_eq!(parse_command("import"), Some(Command::Import("")));
    }

    #[test]
    fn parse_unknown_command_is_lowercased() {
        assert_eq!(
            parse_command("FoObAr arg"),
            Some(Command::Unknown("foobar".to_string()))
        );
    }

    #[test]
    fn parse_empty_command_returns_none() {
        assert_eq!(parse_command("   "), None);
        assert_eq!(parse_command(""), None);
    }
}
