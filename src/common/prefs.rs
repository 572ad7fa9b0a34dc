use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONSOLE_EXPANDED_KEY: &str = "console-expanded";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// 本地偏好设置，保存为一个 JSON 对象文件。
///
/// 损坏的条目在读取时被丢弃并写回默认值。
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // 第二个值表示文件存在但无法解析
    fn read_map(&self) -> (Map<String, Value>, bool) {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(_) => return (Map::new(), false),
        };
        match serde_json::from_str::<Map<String, Value>>(&data) {
            Ok(map) => (map, false),
            Err(e) => {
                warn!("偏好设置文件已损坏，将重新生成: {}", e);
                (Map::new(), true)
            }
        }
    }

    fn reset<T: Serialize>(&self, map: &mut Map<String, Value>, key: &str, default: &T) {
        let Ok(value) = serde_json::to_value(default) else {
            return;
        };
        map.insert(key.to_string(), value);
        if let Err(e) = self.write_map(map) {
            warn!("{}", e);
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, data)
            .with_context(|| format!("写入偏好设置失败: {}", self.path.display()))
    }

    /// 读取一个值；缺失时返回默认值，损坏时写回默认值
    pub fn get<T>(&self, key: &str, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        let (mut map, corrupted) = self.read_map();
        let Some(raw) = map.get(key).cloned() else {
            if corrupted {
                self.reset(&mut map, key, &default);
            }
            return default;
        };
        match serde_json::from_value::<T>(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("偏好设置 {} 无效，已重置: {}", key, e);
                self.reset(&mut map, key, &default);
                default
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let (mut map, _) = self.read_map();
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_map(&map)
    }

    pub fn console_expanded(&self) -> bool {
        self.get(CONSOLE_EXPANDED_KEY, false)
    }

    pub fn set_console_expanded(&self, expanded: bool) -> Result<()> {
        self.set(CONSOLE_EXPANDED_KEY, &expanded)
    }

    pub fn theme(&self) -> Theme {
        self.get(THEME_KEY, Theme::default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set(THEME_KEY, &theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PreferenceStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("prefs.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let (_dir, prefs) = store();
        assert!(!prefs.console_expanded());
        assert_eq!(prefs.theme(), Theme::System);
    }

    #[test]
    fn values_persist_across_instances() {
        let (dir, prefs) = store();
        prefs.set_console_expanded(true).unwrap();
        prefs.set_theme(Theme::Dark).unwrap();

        let reopened = PreferenceStore::new(dir.path().join("prefs.json"));
        assert!(reopened.console_expanded());
        assert_eq!(reopened.theme(), Theme::Dark);

        let raw = fs::read_to_string(reopened.path()).unwrap();
        assert!(raw.contains("\"console-expanded\": true"));
        assert!(raw.contains("\"theme\": \"dark\""));
    }

    #[test]
    fn corrupted_entry_is_reset_to_default() {
        let (_dir, prefs) = store();
        fs::write(prefs.path(), r#"{"theme": "sepia", "console-expanded": true}"#).unwrap();
        assert_eq!(prefs.theme(), Theme::System);
        // 其他条目不受影响
        assert!(prefs.console_expanded());

        let raw: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(prefs.path()).unwrap()).unwrap();
        assert_eq!(raw[THEME_KEY], Value::String("system".into()));
    }

    #[test]
    fn corrupted_file_is_replaced_on_write() {
        let (_dir, prefs) = store();
        fs::write(prefs.path(), "not json").unwrap();
        assert!(!prefs.console_expanded());
        let raw: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(prefs.path()).unwrap()).unwrap();
        assert_eq!(raw[CONSOLE_EXPANDED_KEY], Value::Bool(false));
        prefs.set_console_expanded(true).unwrap();
        assert!(prefs.console_expanded());
    }
}
