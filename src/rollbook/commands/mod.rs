use crate::config::RollbookConfig;
use crate::model::Invoice;
use std::path::PathBuf;
use uuid::Uuid;

pub mod attendance;
pub mod bookings;
pub mod config;
pub mod helpers;
pub mod init;
pub mod invoices;
pub mod students;

#[derive(Debug, Clone)]
pub struct RollbookPaths {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Outcome of a mutating command.
///
/// A command that had nothing to do (incomplete input, status already set)
/// returns an empty `affected_ids` and an info message explaining why.
#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_ids: Vec<Uuid>,
    pub invoices: Vec<Invoice>,
    pub config: Option<RollbookConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_affected(mut self, id: Uuid) -> Self {
        self.affected_ids.push(id);
        self
    }

    pub fn with_config(mut self, config: RollbookConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Whether anything was written.
    pub fn is_noop(&self) -> bool {
        self.affected_ids.is_empty() && self.invoices.is_empty()
    }
}
