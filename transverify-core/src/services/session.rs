use serde::{Deserialize, Serialize};

use crate::config::Dialect;
use crate::error::{Result, ReviewError};
use crate::model::pair::TranslationPair;
use crate::model::snapshot::SessionSnapshot;
use crate::services::clipboard::Clipboard;
use crate::services::export::{self, Download, DownloadSink};
use crate::services::navigation;
use crate::services::pairing::build_pairs;
use crate::services::persistence::{self, SessionStore};
use crate::services::store::{Progress, VerificationStore};

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[serde(alias = "en", alias = "source")]
    English,
    #[serde(alias = "ar", alias = "candidate")]
    Arabic,
}

/// Boundary collaborators, injected so tests can swap in fakes.
pub struct SessionPorts {
    pub store: Box<dyn SessionStore>,
    pub clipboard: Box<dyn Clipboard>,
    pub sink: Box<dyn DownloadSink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub initialized: bool,
    pub english_rows: usize,
    pub arabic_rows: usize,
    pub cursor: Option<usize>,
    pub can_go_previous: bool,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewEntry {
    pub index: usize,
    pub id: usize,
    pub verified: bool,
    pub is_current: bool,
    pub preview: String,
}

pub struct ReviewSession {
    key: String,
    ports: SessionPorts,
    export_dialect: Dialect,

    english_rows: Vec<String>,
    arabic_rows: Vec<String>,

    // pairs are built at most once per session
    initialized: bool,
    store: VerificationStore,
    cursor: usize,
}

impl ReviewSession {
    /// Start a session, resuming the stored snapshot under `key` if there is a usable one.
    pub fn open(key: impl Into<String>, ports: SessionPorts, export_dialect: Dialect) -> Self {
        let key = key.into();
        let restored = persistence::load_or_absent(&*ports.store, &key);

        let mut session = Self {
            key,
            ports,
            export_dialect,
            english_rows: Vec::new(),
            arabic_rows: Vec::new(),
            initialized: false,
            store: VerificationStore::default(),
            cursor: 0,
        };

        if let Some(snapshot) = restored {
            tracing::info!(
                "resumed session with {} pairs at {}",
                snapshot.pairs.len(),
                snapshot.cursor
            );
            session.store = VerificationStore::new(snapshot.pairs);
            session.cursor = snapshot.cursor;
            session.initialized = true;
        }

        session
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn cursor(&self) -> Option<usize> {
        (!self.store.is_empty()).then_some(self.cursor)
    }

    pub fn store(&self) -> &VerificationStore {
        &self.store
    }

    pub fn current(&self) -> Option<&TranslationPair> {
        self.store.get(self.cursor)
    }

    /// Replace one side's rows. Pairs get built the first time both sides are non-empty.
    ///
    /// Returns true when this call built the pair sequence.
    pub fn load_rows(&mut self, side: Side, rows: Vec<String>) -> bool {
        match side {
            Side::English => self.english_rows = rows,
            Side::Arabic => self.arabic_rows = rows,
        }

        if self.initialized {
            tracing::debug!("{side:?} rows loaded into an initialized session; pairs unchanged");
            return false;
        }

        if self.english_rows.is_empty() || self.arabic_rows.is_empty() {
            return false;
        }

        let pairs = build_pairs(&self.english_rows, &self.arabic_rows);
        if pairs.is_empty() {
            return false;
        }

        tracing::info!("built {} pairs", pairs.len());
        self.store = VerificationStore::new(pairs);
        self.cursor = 0;
        self.initialized = true;
        self.autosave();
        true
    }

    pub fn save_current(&mut self, text: &str) -> Result<()> {
        self.require_pairs()?;
        self.store.save(self.cursor, text)?;
        self.cursor = navigation::after_save(self.store.pairs(), self.cursor);
        self.autosave();
        Ok(())
    }

    pub fn skip(&mut self) -> Result<()> {
        self.require_pairs()?;
        self.cursor = navigation::skip(self.store.pairs(), self.cursor);
        self.autosave();
        Ok(())
    }

    pub fn previous(&mut self) -> Result<()> {
        self.require_pairs()?;
        if navigation::can_go_previous(self.cursor) {
            self.cursor = navigation::previous(self.cursor);
            self.autosave();
        }
        Ok(())
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.require_pairs()?;
        self.cursor = navigation::select_index(self.store.pairs(), index)?;
        self.autosave();
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            initialized: self.initialized,
            english_rows: self.english_rows.len(),
            arabic_rows: self.arabic_rows.len(),
            cursor: self.cursor(),
            can_go_previous: !self.store.is_empty() && navigation::can_go_previous(self.cursor),
            progress: self.store.progress(),
        }
    }

    pub fn overview(&self) -> Vec<OverviewEntry> {
        self.store
            .pairs()
            .iter()
            .enumerate()
            .map(|(index, p)| OverviewEntry {
                index,
                id: p.id,
                verified: p.verified,
                is_current: index == self.cursor,
                preview: p.source.chars().take(PREVIEW_CHARS).collect(),
            })
            .collect()
    }

    pub fn export(&self) -> Result<String> {
        export::generate_csv(&export::rows_from_pairs(self.store.pairs()), self.export_dialect)
    }

    pub fn download(&mut self, file_name: &str) -> Result<Download> {
        let content = self.export()?;
        self.ports.sink.download(&content, file_name)
    }

    /// Copy the current English text. Failures are logged, never raised.
    pub fn copy_source(&mut self) -> bool {
        let Some(text) = self.current().map(|p| p.source.clone()) else {
            return false;
        };

        match self.ports.clipboard.copy(&text) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("{e}");
                false
            }
        }
    }

    /// Forget everything, including the stored snapshot.
    pub fn reset(&mut self) -> Result<()> {
        self.ports.store.clear(&self.key)?;
        self.english_rows.clear();
        self.arabic_rows.clear();
        self.store = VerificationStore::default();
        self.cursor = 0;
        self.initialized = false;
        tracing::info!("session {:?} reset", self.key);
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.store.pairs().to_vec(), self.cursor)
    }

    fn require_pairs(&self) -> Result<()> {
        if self.store.is_empty() {
            Err(ReviewError::NoSession)
        } else {
            Ok(())
        }
    }

    fn autosave(&mut self) {
        if self.store.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        if let Err(e) = self.ports.store.save(&self.key, &snapshot) {
            tracing::error!("autosave dropped: {e}");
        }
    }
}
