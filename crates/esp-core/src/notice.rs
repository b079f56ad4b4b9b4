//! User-facing messages produced by commands and session events.
//!
//! The host decides how to show them (chat, toast, log). Everything a user
//! reads about the search goes through here so the wording stays in one place.

use std::fmt;

use serde::Serialize;

use crate::command::command_help;
use crate::error::Error;
use crate::search::SearchState;

pub const NOTICE_PREFIX: &str = "[ESP]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn current_search(search: &SearchState) -> Self {
        match search.describe_active() {
            Some((kind, pattern)) => Self::info(format!("Searching by {kind} for `{pattern}`")),
            None => Self::info(format!("No active search. {}", usage_hint())),
        }
    }

    pub fn cleared() -> Self {
        Self::info("Search cleared")
    }

    pub fn glob_matches_exactly(pattern: &str) -> Self {
        Self::warning(format!(
            "Glob `{pattern}` has no wildcards, so it only matches names that are exactly `{pattern}`. \
             Use `*{pattern}*` to match names containing it."
        ))
    }

    pub fn entered_pvp(markers_hidden: bool) -> Self {
        if markers_hidden {
            Self::warning("PvP detected, markers are hidden until you leave PvP content")
        } else {
            Self::warning(
                "PvP detected, markers are still shown. Using them in PvP may be against the rules",
            )
        }
    }

    /// User wording for an error. Pattern compile details never reach the user.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::InvalidPattern { kind } => Self::error(format!(
                "That {kind} pattern is invalid, please check your syntax"
            )),
            Error::NoTarget => Self::error("You don't have a target"),
            Error::UnknownCommand(name) => {
                let help = command_help();
                Self::error(format!("Unknown command `{name}`. Available commands:\n{help}"))
            }
            Error::UnknownEndpoint(name) => Self::error(format!("Unknown IPC endpoint `{name}`")),
            Error::UnexpectedPayload(endpoint) => {
                Self::error(format!("IPC endpoint `{endpoint}` takes no payload"))
            }
            _ => Self::error("Something went wrong internally. This is a bug, please report it"),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{NOTICE_PREFIX} {}", self.text),
            NoticeLevel::Warning => write!(f, "{NOTICE_PREFIX} Warning: {}", self.text),
            NoticeLevel::Error => write!(f, "{NOTICE_PREFIX} Error: {}", self.text),
        }
    }
}

pub fn usage_hint() -> &'static str {
    "Use /esp <text>, /espg <glob> or /espr <regex> to search, /espt to search for your target."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::PatternKind;

    #[test]
    fn describes_active_search() {
        let mut search = SearchState::new();
        search.set_glob("Gua*").unwrap();
        let notice = Notice::current_search(&search);
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.text, "Searching by glob for `Gua*`");
    }

    #[test]
    fn describes_missing_search_with_usage() {
        let notice = Notice::current_search(&SearchState::new());
        assert!(notice.text.starts_with("No active search."));
        assert!(notice.text.contains("/espg"));
    }

    #[test]
    fn invalid_pattern_hides_parser_details() {
        let notice = Notice::from_error(&Error::InvalidPattern {
            kind: PatternKind::Regex,
        });
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, "That regex pattern is invalid, please check your syntax");
    }

    #[test]
    fn unknown_command_lists_every_command_with_help() {
        let notice = Notice::from_error(&Error::UnknownCommand("/espx".into()));
        assert!(notice.text.starts_with("Unknown command `/espx`."));
        for line in [
            "/esp, /espsearch: Mark entities whose name contains",
            "/espg, /espglob: Mark entities whose whole name matches",
            "/espc, /espclear: Clear the current search",
        ] {
            assert!(notice.text.contains(line), "missing `{line}` in {}", notice.text);
        }
    }

    #[test]
    fn internal_errors_read_as_bugs() {
        let notice = Notice::from_error(&Error::Internal("unreachable dispatch"));
        assert!(notice.text.contains("bug"));
        assert!(!notice.text.contains("unreachable dispatch"));
    }

    #[test]
    fn display_adds_prefix_and_level() {
        assert_eq!(Notice::cleared().to_string(), "[ESP] Search cleared");
        assert_eq!(
            Notice::from_error(&Error::NoTarget).to_string(),
            "[ESP] Error: You don't have a target"
        );
    }
}
