//! 令牌持久化
//!
//! 令牌是不透明的 bearer 字符串，客户端不做任何校验。持久化位置只有一个槽位，
//! 以固定键 [`TOKEN_KEY`] 保存。

use crate::error::Result;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// 持久化令牌使用的固定键
pub const TOKEN_KEY: &str = "auth_token";

/// 令牌存储
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// 读取已持久化的令牌，无副作用
    fn read(&self) -> Option<String>;

    /// 持久化令牌（幂等）
    fn write(&self, token: &str) -> Result<()>;

    /// 删除已持久化的令牌
    fn clear(&self) -> Result<()>;
}

/// 基于 JSON 键值文件的令牌存储
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => {
                warn!("Session file {:?} is not a JSON object, ignoring it", self.path);
                Ok(Map::new())
            }
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(map)
            .map_err(|e| crate::error::Error::Decode(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Option<String> {
        match self.load() {
            Ok(map) => map.get(TOKEN_KEY).and_then(Value::as_str).map(str::to_string),
            Err(e) => {
                warn!("Failed to read session file {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn write(&self, token: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.save(&map)?;
        debug!("Token persisted to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut map = self.load()?;
        if map.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }

        if map.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            self.save(&map)?;
        }
        debug!("Token removed from {:?}", self.path);
        Ok(())
    }
}

/// 内存令牌存储，进程退出即丢失
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn write(&self, token: &str) -> Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.read(), None);
        store.write("3f9a1c0e7b2d4a55").unwrap();
        assert_eq!(store.read().as_deref(), Some("3f9a1c0e7b2d4a55"));

        // 幂等
        store.write("3f9a1c0e7b2d4a55").unwrap();
        assert_eq!(store.read().as_deref(), Some("3f9a1c0e7b2d4a55"));

        store.clear().unwrap();
        assert_eq!(store.read(), None);
        assert!(!store.path().exists());

        // 清空不存在的值不报错
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.write("tk").unwrap();
        store.clear().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let map: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(map["theme"], "dark");
        assert!(map.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert_eq!(store.read(), None);
        store.write("tk").unwrap();
        assert_eq!(store.read().as_deref(), Some("tk"));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.read(), None);
        store.write("abc").unwrap();
        assert_eq!(store.read().as_deref(), Some("abc"));
        store.clear().unwrap();
        assert_eq!(store.read(), None);
    }
}
