//! Endpoints other processes use to read and drive the search.
//!
//! Endpoint names are the stable contract; replies are plain strings or
//! booleans so any IPC transport can carry them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::command::SearchController;
use crate::entity::TargetSource;
use crate::error::{Error, Result};
use crate::search::PatternKind;
use crate::status::StatusSink;

pub const ENDPOINT_PREFIX: &str = "XivEsp.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpcEndpoint {
    GetSubstring,
    GetGlob,
    GetRegex,
    GetUnifiedSearch,
    HasAnySearch,
    ClearSearch,
    SetSubstring,
    SetGlob,
    SetRegex,
}

impl IpcEndpoint {
    pub const ALL: [IpcEndpoint; 9] = [
        IpcEndpoint::GetSubstring,
        IpcEndpoint::GetGlob,
        IpcEndpoint::GetRegex,
        IpcEndpoint::GetUnifiedSearch,
        IpcEndpoint::HasAnySearch,
        IpcEndpoint::ClearSearch,
        IpcEndpoint::SetSubstring,
        IpcEndpoint::SetGlob,
        IpcEndpoint::SetRegex,
    ];

    /// Name without the shared prefix.
    fn short_name(self) -> &'static str {
        match self {
            IpcEndpoint::GetSubstring => "GetSubstring",
            IpcEndpoint::GetGlob => "GetGlob",
            IpcEndpoint::GetRegex => "GetRegex",
            IpcEndpoint::GetUnifiedSearch => "GetUnifiedSearch",
            IpcEndpoint::HasAnySearch => "HasAnySearch",
            IpcEndpoint::ClearSearch => "ClearSearch",
            IpcEndpoint::SetSubstring => "SetSubstring",
            IpcEndpoint::SetGlob => "SetGlob",
            IpcEndpoint::SetRegex => "SetRegex",
        }
    }

    pub fn name(self) -> String {
        format!("{ENDPOINT_PREFIX}{}", self.short_name())
    }

    /// Queries return a value; the rest are fire-and-forget commands.
    pub fn is_query(self) -> bool {
        matches!(
            self,
            IpcEndpoint::GetSubstring
                | IpcEndpoint::GetGlob
                | IpcEndpoint::GetRegex
                | IpcEndpoint::GetUnifiedSearch
                | IpcEndpoint::HasAnySearch
        )
    }
}

impl fmt::Display for IpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ENDPOINT_PREFIX}{}", self.short_name())
    }
}

/// Accepts names with or without the `XivEsp.` prefix.
impl FromStr for IpcEndpoint {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let short = name.strip_prefix(ENDPOINT_PREFIX).unwrap_or(name);
        IpcEndpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.short_name() == short)
            .ok_or_else(|| Error::UnknownEndpoint(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IpcReply {
    Text(String),
    Flag(bool),
    Done,
}

impl<St, T> SearchController<St, T>
where
    St: StatusSink,
    T: TargetSource,
{
    /// Serve one IPC call. Setters treat a missing payload as empty text,
    /// which clears the search. Queries refuse a payload.
    pub fn ipc_call(&self, endpoint: IpcEndpoint, payload: Option<&str>) -> Result<IpcReply> {
        tracing::debug!(%endpoint, ?payload, "IPC call");
        if endpoint.is_query() && payload.is_some() {
            return Err(Error::UnexpectedPayload(endpoint));
        }
        let payload = payload.unwrap_or_default();
        match endpoint {
            IpcEndpoint::GetSubstring => self.read(|s| IpcReply::Text(s.substring().to_string())),
            IpcEndpoint::GetGlob => self.read(|s| IpcReply::Text(s.glob().to_string())),
            IpcEndpoint::GetRegex => self.read(|s| IpcReply::Text(s.regex().to_string())),
            IpcEndpoint::GetUnifiedSearch => self.read(|s| IpcReply::Text(s.unified())),
            IpcEndpoint::HasAnySearch => self.read(|s| IpcReply::Flag(s.has_any())),
            IpcEndpoint::ClearSearch => self.clear().map(|()| IpcReply::Done),
            IpcEndpoint::SetSubstring => self
                .set(PatternKind::Substring, payload)
                .map(|()| IpcReply::Done),
            IpcEndpoint::SetGlob => self.set(PatternKind::Glob, payload).map(|()| IpcReply::Done),
            IpcEndpoint::SetRegex => self
                .set(PatternKind::Regex, payload)
                .map(|()| IpcReply::Done),
        }
    }

    /// [`SearchController::ipc_call`] addressed by endpoint name.
    pub fn ipc_call_by_name(&self, name: &str, payload: Option<&str>) -> Result<IpcReply> {
        let endpoint = name.parse::<IpcEndpoint>()?;
        self.ipc_call(endpoint, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::LatestStatus;

    struct NoTargets;

    impl TargetSource for NoTargets {
        fn soft_target_name(&self) -> Option<String> {
            None
        }

        fn hard_target_name(&self) -> Option<String> {
            None
        }
    }

    fn controller() -> SearchController<LatestStatus, NoTargets> {
        SearchController::with_empty_search(LatestStatus::new(), NoTargets)
    }

    fn text(reply: IpcReply) -> String {
        match reply {
            IpcReply::Text(text) => text,
            other => panic!("expected text reply, got {other:?}"),
        }
    }

    #[test]
    fn endpoint_names_round_trip() {
        for endpoint in IpcEndpoint::ALL {
            assert_eq!(endpoint.name().parse::<IpcEndpoint>().unwrap(), endpoint);
            assert_eq!(endpoint.to_string(), endpoint.name());
        }
        assert_eq!(
            "GetGlob".parse::<IpcEndpoint>().unwrap(),
            IpcEndpoint::GetGlob
        );
        assert!(matches!(
            "XivEsp.Nope".parse::<IpcEndpoint>(),
            Err(Error::UnknownEndpoint(_))
        ));
    }

    #[test]
    fn queries_reflect_the_single_active_pattern() {
        let c = controller();
        assert_eq!(text(c.ipc_call(IpcEndpoint::GetUnifiedSearch, None).unwrap()), "N");
        assert_eq!(
            c.ipc_call(IpcEndpoint::HasAnySearch, None).unwrap(),
            IpcReply::Flag(false)
        );

        c.ipc_call(IpcEndpoint::SetGlob, Some("Gua*")).unwrap();
        assert_eq!(text(c.ipc_call(IpcEndpoint::GetGlob, None).unwrap()), "Gua*");
        assert_eq!(text(c.ipc_call(IpcEndpoint::GetSubstring, None).unwrap()), "");
        assert_eq!(text(c.ipc_call(IpcEndpoint::GetRegex, None).unwrap()), "");
        assert_eq!(
            text(c.ipc_call(IpcEndpoint::GetUnifiedSearch, None).unwrap()),
            "G:Gua*"
        );
        assert_eq!(
            c.ipc_call(IpcEndpoint::HasAnySearch, None).unwrap(),
            IpcReply::Flag(true)
        );
    }

    #[test]
    fn setters_refresh_status_and_reject_bad_patterns() {
        let c = controller();
        c.ipc_call_by_name("XivEsp.SetRegex", Some("^A.*z$")).unwrap();
        assert_eq!(c.status().get().unwrap().text, "R");

        let err = c.ipc_call(IpcEndpoint::SetRegex, Some("(")).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { kind: PatternKind::Regex }));
        assert_eq!(text(c.ipc_call(IpcEndpoint::GetRegex, None).unwrap()), "^A.*z$");

        c.ipc_call(IpcEndpoint::ClearSearch, None).unwrap();
        assert_eq!(c.status().get().unwrap().text, "N");
    }

    #[test]
    fn setter_without_payload_clears() {
        let c = controller();
        c.ipc_call(IpcEndpoint::SetSubstring, Some("imp")).unwrap();
        c.ipc_call(IpcEndpoint::SetSubstring, None).unwrap();
        assert_eq!(
            c.ipc_call(IpcEndpoint::HasAnySearch, None).unwrap(),
            IpcReply::Flag(false)
        );
    }

    #[test]
    fn queries_refuse_a_payload() {
        let c = controller();
        c.ipc_call(IpcEndpoint::SetSubstring, Some("imp")).unwrap();

        for endpoint in IpcEndpoint::ALL.into_iter().filter(|e| e.is_query()) {
            let err = c.ipc_call(endpoint, Some("x")).unwrap_err();
            assert!(matches!(err, Error::UnexpectedPayload(e) if e == endpoint), "{endpoint}");
        }
        assert_eq!(text(c.ipc_call(IpcEndpoint::GetSubstring, None).unwrap()), "imp");
        assert!(!IpcEndpoint::SetGlob.is_query());
        assert!(!IpcEndpoint::ClearSearch.is_query());
    }

    #[test]
    fn replies_serialize_flat() {
        assert_eq!(serde_json::to_string(&IpcReply::Text("S:imp".into())).unwrap(), "\"S:imp\"");
        assert_eq!(serde_json::to_string(&IpcReply::Flag(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&IpcReply::Done).unwrap(), "null");
    }
}
