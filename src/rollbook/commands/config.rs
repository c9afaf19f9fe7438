use crate::commands::{CmdMessage, CmdResult, RollbookPaths};
use crate::config::RollbookConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(paths: &RollbookPaths, action: ConfigAction) -> Result<CmdResult> {
    let dir = &paths.data_dir;
    match action {
        ConfigAction::ShowAll => {
            let config = RollbookConfig::load(dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = RollbookConfig::load(dir)?;
            let message = match config.get(&key) {
                Some(val) => CmdMessage::info(val),
                None => CmdMessage::error(format!("Unknown config key: {}", key)),
            };
            Ok(CmdResult::default().with_message(message))
        }
        ConfigAction::Set(key, value) => {
            let mut config = RollbookConfig::load(dir)?;
            if let Err(e) = config.set(&key, &value) {
                return Ok(CmdResult::default().with_message(CmdMessage::error(e)));
            }
            config.save(dir)?;
            let display_val = config.get(&key).unwrap_or(value);
            tracing::debug!(%key, value = %display_val, "config updated");
            Ok(CmdResult::default()
                .with_config(config)
                .with_message(CmdMessage::success(format!(
                    "{} set to {}",
                    key, display_val
                ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;

    fn paths(dir: &tempfile::TempDir) -> RollbookPaths {
        RollbookPaths {
            data_dir: dir.path().to_path_buf(),
        }
    }

    #[test]
    fn set_persists_and_show_reads_back() {
        let temp = tempfile::tempdir().unwrap();
        let paths = paths(&temp);

        run(&paths, ConfigAction::Set("page-size".into(), "4".into())).unwrap();
        let shown = run(&paths, ConfigAction::ShowKey("page-size".into())).unwrap();
        assert_eq!(shown.messages[0].content, "4");

        let all = run(&paths, ConfigAction::ShowAll).unwrap();
        assert_eq!(all.config.unwrap().page_size, 4);
    }

    #[test]
    fn invalid_values_are_reported_not_saved() {
        let temp = tempfile::tempdir().unwrap();
        let paths = paths(&temp);

        let result = run(&paths, ConfigAction::Set("page-size".into(), "0".into())).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert!(!temp.path().join("config.json").exists());

        let unknown = run(&paths, ConfigAction::ShowKey("theme".into())).unwrap();
        assert_eq!(unknown.messages[0].level, MessageLevel::Error);
    }
}
