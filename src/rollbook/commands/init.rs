use crate::commands::{CmdMessage, CmdResult, RollbookPaths};
use crate::error::Result;
use std::fs;

pub fn run(paths: &RollbookPaths) -> Result<CmdResult> {
    fs::create_dir_all(&paths.data_dir)?;
    tracing::debug!(dir = %paths.data_dir.display(), "data directory ready");
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Initialized rollbook data at {}",
        paths.data_dir.display()
    ))))
}
