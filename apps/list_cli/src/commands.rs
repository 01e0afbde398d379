//! Stdin lines mapped to controller operations.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    LoadMore,
    Refresh,
    Retry,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            ":more" | ":m" => Command::LoadMore,
            ":refresh" | ":r" => Command::Refresh,
            ":retry" => Command::Retry,
            ":quit" | ":q" => Command::Quit,
            other if other.starts_with(':') => Command::Unknown(other.to_string()),
            other => Command::Search(other.to_string()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Search(_) => "search",
            Command::LoadMore => "load_more",
            Command::Refresh => "refresh",
            Command::Retry => "retry",
            Command::Quit => "quit",
            Command::Unknown(_) => "unknown",
        }
    }
}
