//! Text commands and the controller that applies them.
//!
//! [`SearchController`] is the only writer of the shared search. Chat
//! commands, status bar clicks and IPC setters all go through it, so the status
//! indicator is refreshed after every change no matter where it came from.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::SharedSearch;
use crate::entity::TargetSource;
use crate::error::{Error, IntoCoreError, Result};
use crate::glob_detect::has_wildcards;
use crate::notice::Notice;
use crate::search::{PatternKind, SearchState};
use crate::status::{ClickAction, StatusIndicator, StatusSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub help: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "esp",
        aliases: &["espsearch"],
        help: "Mark entities whose name contains the given text, ignoring case",
    },
    CommandSpec {
        name: "espg",
        aliases: &["espglob"],
        help: "Mark entities whose whole name matches the given glob, ignoring case",
    },
    CommandSpec {
        name: "espr",
        aliases: &["espregex"],
        help: "Mark entities whose name matches the given regex, ignoring case",
    },
    CommandSpec {
        name: "espt",
        aliases: &["esptarget"],
        help: "Search for the name of your current target",
    },
    CommandSpec {
        name: "espc",
        aliases: &["espclear"],
        help: "Clear the current search",
    },
];

/// One line per command, e.g. "/espg, /espglob: Mark entities ...".
pub fn command_help() -> String {
    COMMANDS
        .iter()
        .map(|spec| {
            let mut names = vec![format!("/{}", spec.name)];
            names.extend(spec.aliases.iter().map(|alias| format!("/{alias}")));
            format!("{}: {}", names.join(", "), spec.help)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { kind: PatternKind, pattern: String },
    /// A search command without an argument: report instead of setting.
    Report,
    SearchTarget,
    Clear,
}

impl Command {
    /// Parse a full command line such as `/espg Gua*`.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, args) = match line.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args),
            None => (line, ""),
        };
        Self::from_parts(name, args)
    }

    /// `name` may carry a leading `/` and is matched case-insensitively.
    pub fn from_parts(name: &str, args: &str) -> Result<Self> {
        let bare = name.trim().trim_start_matches('/').to_ascii_lowercase();
        let spec = COMMANDS
            .iter()
            .find(|spec| spec.name == bare || spec.aliases.contains(&bare.as_str()))
            .ok_or_else(|| Error::UnknownCommand(name.trim().to_string()))?;

        let pattern = args.trim();
        let kind = match spec.name {
            "esp" => PatternKind::Substring,
            "espg" => PatternKind::Glob,
            "espr" => PatternKind::Regex,
            "espt" => return Ok(Command::SearchTarget),
            "espc" => return Ok(Command::Clear),
            _ => return Err(Error::Internal("command table entry without a handler")),
        };

        if pattern.is_empty() {
            return Ok(Command::Report);
        }
        Ok(Command::Set {
            kind,
            pattern: pattern.to_string(),
        })
    }
}

pub struct SearchController<St, T> {
    search: SharedSearch,
    status: St,
    targets: T,
}

impl<St, T> SearchController<St, T>
where
    St: StatusSink,
    T: TargetSource,
{
    /// Pushes the initial indicator to `status` before returning.
    pub fn new(search: SharedSearch, status: St, targets: T) -> Self {
        let controller = Self {
            search,
            status,
            targets,
        };
        if let Err(err) = controller.refresh_status() {
            tracing::error!(?err, "Failed to publish initial status");
        }
        controller
    }

    /// Controller over a fresh, empty search.
    pub fn with_empty_search(status: St, targets: T) -> Self {
        Self::new(Arc::new(RwLock::new(SearchState::new())), status, targets)
    }

    pub fn search(&self) -> &SharedSearch {
        &self.search
    }

    pub fn status(&self) -> &St {
        &self.status
    }

    pub fn targets(&self) -> &T {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut T {
        &mut self.targets
    }

    /// Run `f` against a read-locked snapshot of the search.
    pub fn read<R>(&self, f: impl FnOnce(&SearchState) -> R) -> Result<R> {
        let guard = self
            .search
            .read()
            .with_lock_error(Error::AcquireSearchLock)?;
        Ok(f(&*guard))
    }

    /// Apply `f` under the write lock and republish the status indicator
    /// before releasing it, so sinks see updates in the order the search
    /// changed.
    fn mutate(&self, f: impl FnOnce(&mut SearchState) -> Result<()>) -> Result<()> {
        let mut guard = self
            .search
            .write()
            .with_lock_error(Error::AcquireSearchLock)?;
        f(&mut *guard)?;
        self.status.update(&StatusIndicator::for_search(&guard));
        Ok(())
    }

    pub fn refresh_status(&self) -> Result<()> {
        // Held across the update so a concurrent setter cannot publish first.
        let guard = self
            .search
            .read()
            .with_lock_error(Error::AcquireSearchLock)?;
        self.status.update(&StatusIndicator::for_search(&guard));
        Ok(())
    }

    pub fn set_substring(&self, text: &str) -> Result<()> {
        self.mutate(|search| {
            search.set_substring(text);
            Ok(())
        })
    }

    pub fn set_glob(&self, pattern: &str) -> Result<()> {
        self.mutate(|search| search.set_glob(pattern))
    }

    pub fn set_regex(&self, pattern: &str) -> Result<()> {
        self.mutate(|search| search.set_regex(pattern))
    }

    pub fn set(&self, kind: PatternKind, pattern: &str) -> Result<()> {
        match kind {
            PatternKind::Substring => self.set_substring(pattern),
            PatternKind::Glob => self.set_glob(pattern),
            PatternKind::Regex => self.set_regex(pattern),
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.mutate(|search| {
            search.clear();
            Ok(())
        })
    }

    pub fn current_notice(&self) -> Result<Notice> {
        self.read(Notice::current_search)
    }

    pub fn execute(&self, command: &Command) -> Result<Vec<Notice>> {
        tracing::debug!(?command, "Executing command");
        match command {
            Command::Report => Ok(vec![self.current_notice()?]),
            Command::Clear => {
                self.clear()?;
                Ok(vec![Notice::cleared()])
            }
            Command::SearchTarget => {
                let name = self
                    .targets
                    .current_target_name()
                    .ok_or(Error::NoTarget)?;
                self.set_substring(&name)?;
                self.confirm(PatternKind::Substring, Vec::new())
            }
            Command::Set { kind, pattern } => {
                self.set(*kind, pattern)?;
                let mut notices = Vec::new();
                if *kind == PatternKind::Glob && !has_wildcards(pattern) {
                    tracing::warn!(pattern = pattern.as_str(), "Glob pattern without wildcards");
                    notices.push(Notice::glob_matches_exactly(pattern));
                }
                self.confirm(*kind, notices)
            }
        }
    }

    /// Append the "now searching" confirmation, checking the set actually took.
    fn confirm(&self, expected: PatternKind, mut notices: Vec<Notice>) -> Result<Vec<Notice>> {
        let confirmation = self.read(|search| match search.describe_active() {
            Some((kind, _)) if kind == expected => Ok(Notice::current_search(search)),
            _ => Err(Error::Internal("search did not hold the pattern that was just set")),
        })??;
        notices.insert(0, confirmation);
        Ok(notices)
    }

    /// Parse and run a command line, turning any failure into a notice.
    pub fn run_line(&self, line: &str) -> Vec<Notice> {
        match Command::parse(line).and_then(|command| self.execute(&command)) {
            Ok(notices) => notices,
            Err(err) => {
                tracing::debug!(?err, line, "Command failed");
                vec![Notice::from_error(&err)]
            }
        }
    }

    /// Handle a click on the status bar entry.
    pub fn click_status(&self) -> Vec<Notice> {
        let action = match self.read(|search| StatusIndicator::for_search(search).on_click) {
            Ok(action) => action,
            Err(err) => return vec![Notice::from_error(&err)],
        };
        let command = match action {
            ClickAction::ClearSearch => Command::Clear,
            ClickAction::AnnounceSearch => Command::Report,
        };
        self.execute(&command)
            .unwrap_or_else(|err| vec![Notice::from_error(&err)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use crate::status::LatestStatus;

    #[derive(Default)]
    struct Targets {
        soft: Option<String>,
        hard: Option<String>,
    }

    impl TargetSource for Targets {
        fn soft_target_name(&self) -> Option<String> {
            self.soft.clone()
        }

        fn hard_target_name(&self) -> Option<String> {
            self.hard.clone()
        }
    }

    fn controller() -> SearchController<LatestStatus, Targets> {
        SearchController::with_empty_search(LatestStatus::new(), Targets::default())
    }

    fn status_code(c: &SearchController<LatestStatus, Targets>) -> String {
        c.status().get().map(|s| s.text).unwrap_or_default()
    }

    #[test]
    fn parses_names_aliases_and_arguments() {
        assert_eq!(
            Command::parse("/esp  goblin  ").unwrap(),
            Command::Set {
                kind: PatternKind::Substring,
                pattern: "goblin".into()
            }
        );
        assert_eq!(
            Command::parse("/ESPGLOB Gua*").unwrap(),
            Command::Set {
                kind: PatternKind::Glob,
                pattern: "Gua*".into()
            }
        );
        assert_eq!(
            Command::parse("espr ^A.*z$").unwrap(),
            Command::Set {
                kind: PatternKind::Regex,
                pattern: "^A.*z$".into()
            }
        );
        assert_eq!(Command::parse("/espg").unwrap(), Command::Report);
        assert_eq!(Command::parse("/espt").unwrap(), Command::SearchTarget);
        assert_eq!(Command::parse("/espclear").unwrap(), Command::Clear);
        assert!(matches!(
            Command::parse("/espx foo"),
            Err(Error::UnknownCommand(name)) if name == "/espx"
        ));
    }

    #[test]
    fn initial_status_is_published() {
        let c = controller();
        assert_eq!(status_code(&c), "N");
    }

    #[test]
    fn set_commands_update_status_and_confirm() {
        let c = controller();

        let notices = c.run_line("/esp gob");
        assert_eq!(notices, vec![Notice::info("Searching by substring for `gob`")]);
        assert_eq!(status_code(&c), "S");

        let notices = c.run_line("/espr ^gob");
        assert_eq!(notices.len(), 1);
        assert_eq!(status_code(&c), "R");

        c.run_line("/espc");
        assert_eq!(status_code(&c), "N");
    }

    #[test]
    fn glob_without_wildcards_warns_but_applies() {
        let c = controller();
        let notices = c.run_line("/espg Guardian");

        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].level, NoticeLevel::Info);
        assert_eq!(notices[1].level, NoticeLevel::Warning);
        assert_eq!(c.read(|s| s.glob().to_string()).unwrap(), "Guardian");
    }

    #[test]
    fn invalid_pattern_keeps_previous_search_and_status() {
        let c = controller();
        c.run_line("/esp gob");

        let notices = c.run_line("/espr [");
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].text.contains("check your syntax"));
        assert_eq!(c.read(|s| s.substring().to_string()).unwrap(), "gob");
        assert_eq!(status_code(&c), "S");
    }

    #[test]
    fn empty_argument_reports_without_changing() {
        let c = controller();
        c.run_line("/espg Gua*");

        let notices = c.run_line("/esp");
        assert_eq!(notices, vec![Notice::info("Searching by glob for `Gua*`")]);
        assert_eq!(c.read(|s| s.glob().to_string()).unwrap(), "Gua*");
    }

    #[test]
    fn target_search_prefers_soft_target() {
        let mut c = controller();
        let notices = c.run_line("/espt");
        assert_eq!(notices, vec![Notice::from_error(&Error::NoTarget)]);

        c.targets_mut().hard = Some("Goblin".into());
        c.run_line("/espt");
        assert_eq!(c.read(|s| s.substring().to_string()).unwrap(), "Goblin");

        c.targets_mut().soft = Some("Imp".into());
        c.run_line("/espt");
        assert_eq!(c.read(|s| s.substring().to_string()).unwrap(), "Imp");
    }

    #[test]
    fn status_click_clears_or_announces() {
        let c = controller();

        let notices = c.click_status();
        assert!(notices[0].text.starts_with("No active search."));

        c.run_line("/esp gob");
        let notices = c.click_status();
        assert_eq!(notices, vec![Notice::cleared()]);
        assert!(!c.read(SearchState::has_any).unwrap());
    }
}
