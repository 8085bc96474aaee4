use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use uuid::Uuid;

use crate::document::SummaryResult;
use crate::plan::{Plan, PlanError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub result: SummaryResult,
}

/// What a plan is allowed to see of the history.
#[derive(Debug)]
pub struct HistoryView<'a> {
    pub items: &'a [HistoryItem],
    pub hidden: usize,
}

/// Past summaries, newest first, cached in a local JSON file.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    items: Vec<HistoryItem>,
}

impl HistoryStore {
    /// Loads the history file; a missing file is an empty history.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read history file: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse history file: {}", path.display()))?
        } else {
            Vec::new()
        };
        debug!("Loaded {} history items from {}", items.len(), path.display());
        Ok(Self { path, items })
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prepends a result and persists the history.
    pub fn record(&mut self, result: SummaryResult) -> Result<&HistoryItem> {
        let item = HistoryItem {
            id: Uuid::new_v4(),
            result,
        };
        info!("Recording history item {}", item.id);
        self.items.insert(0, item);
        self.save()?;
        Ok(&self.items[0])
    }

    /// Finds an item by full id or by a unique id prefix.
    ///
    /// Items beyond the plan's history limit are refused, not hidden.
    pub fn find(&self, id: &str, plan: Plan) -> Result<Option<&HistoryItem>, PlanError> {
        let id = id.trim().to_ascii_lowercase();
        if id.is_empty() {
            return Ok(None);
        }
        let mut matches = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.id.to_string().starts_with(&id));
        let (position, item) = match (matches.next(), matches.next()) {
            (Some(found), None) => found,
            _ => return Ok(None),
        };
        if plan.history_limit().is_some_and(|limit| position >= limit) {
            return Err(PlanError::RequiresPro {
                feature: "older history items".to_string(),
            });
        }
        Ok(Some(item))
    }

    pub fn clear(&mut self) -> Result<()> {
        info!("Clearing {} history items", self.items.len());
        self.items.clear();
        self.save()
    }

    pub fn visible(&self, plan: Plan) -> HistoryView<'_> {
        let shown = plan
            .history_limit()
            .map_or(self.items.len(), |limit| limit.min(self.items.len()));
        HistoryView {
            items: &self.items[..shown],
            hidden: self.items.len() - shown,
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create history directory: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))?;
        Ok(())
    }
}
