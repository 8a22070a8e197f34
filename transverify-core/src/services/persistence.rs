use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Result, ReviewError};
use crate::model::snapshot::SessionSnapshot;

/// Durable key-value slot holding one whole session snapshot.
pub trait SessionStore {
    /// `Ok(None)` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<SessionSnapshot>>;

    /// Replace whatever is stored under `key`.
    fn save(&mut self, key: &str, snapshot: &SessionSnapshot) -> Result<()>;

    fn clear(&mut self, key: &str) -> Result<()>;
}

/// Load a snapshot, treating every failure as "nothing stored".
pub fn load_or_absent(store: &dyn SessionStore, key: &str) -> Option<SessionSnapshot> {
    let mut snapshot = match store.load(key) {
        Ok(Some(s)) => s,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!("discarding stored session {key:?}: {e}");
            return None;
        }
    };

    if snapshot.pairs.is_empty() {
        return None;
    }

    if let Err(e) = snapshot.validate() {
        tracing::error!("discarding stored session {key:?}: {e}");
        return None;
    }

    if snapshot.clamp_cursor() {
        tracing::warn!(
            "stored cursor was past the end; moved to {}",
            snapshot.cursor
        );
    }

    Some(snapshot)
}

/// One pretty-printed JSON file per key inside `dir`.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", safe_key(key)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &str) -> Result<Option<SessionSnapshot>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&path)
            .map_err(|e| ReviewError::PersistenceRead(format!("{}: {e}", path.display())))?;

        serde_json::from_str::<SessionSnapshot>(&data)
            .map(Some)
            .map_err(|e| ReviewError::PersistenceRead(format!("{}: {e}", path.display())))
    }

    fn save(&mut self, key: &str, snapshot: &SessionSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| ReviewError::PersistenceWrite(e.to_string()))?;

        write_atomic(&self.path_for(key), json.as_bytes())
            .map_err(|e| ReviewError::PersistenceWrite(e.to_string()))
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| ReviewError::PersistenceWrite(e.to_string()))?;
        }
        Ok(())
    }
}

/// Raw JSON per key, shared between clones. Used where no disk is wanted.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put arbitrary text in a slot, bypassing serialization.
    pub fn put_raw(&self, key: &str, raw: &str) {
        self.slots.borrow_mut().insert(key.to_string(), raw.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<SessionSnapshot>> {
        match self.slots.borrow().get(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| ReviewError::PersistenceRead(e.to_string())),
        }
    }

    fn save(&mut self, key: &str, snapshot: &SessionSnapshot) -> Result<()> {
        let raw = serde_json::to_string(snapshot)
            .map_err(|e| ReviewError::PersistenceWrite(e.to_string()))?;
        self.slots.borrow_mut().insert(key.to_string(), raw);
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, bytes)?;

    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "session".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

/// Keys become file names: keep `[A-Za-z0-9_.-]`, replace the rest.
fn safe_key(key: &str) -> String {
    let out: String = key
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect();

    let out = out.trim_matches('.');
    if out.is_empty() {
        "session".to_string()
    } else {
        out.to_string()
    }
}
