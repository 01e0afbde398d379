use serde::{Deserialize, Serialize};

/// Identity assigned to every fetch a controller starts. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FetchId(pub u64);

impl FetchId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for FetchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Initial,
    Filter,
    Refresh,
    LoadMore,
    Retry,
}

impl FetchKind {
    /// Only pagination requests extend the current result list.
    pub fn appends(self) -> bool {
        matches!(self, FetchKind::LoadMore)
    }

    pub fn is_refresh(self) -> bool {
        matches!(self, FetchKind::Refresh)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FetchKind::Initial => "initial",
            FetchKind::Filter => "filter",
            FetchKind::Refresh => "refresh",
            FetchKind::LoadMore => "load_more",
            FetchKind::Retry => "retry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListPhase {
    Idle,
    Loading,
    LoadingMore,
    Refreshing,
    Settled,
    Error,
}
