mod list_chats;
mod report;
mod shared;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Report,
    ListChats,
}

impl RunMode {
    fn from_env() -> Self {
        Self::parse(&std::env::var("RUN_MODE").unwrap_or_else(|_| "report".into()))
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "list_chats" | "chats" => Self::ListChats,
            _ => Self::Report,
        }
    }
}

pub fn run_from_env() -> Result<()> {
    match RunMode::from_env() {
        RunMode::Report => report::run(),
        RunMode::ListChats => list_chats::run(),
    }
}
