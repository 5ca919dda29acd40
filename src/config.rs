//! Two-tier JSON configuration for the script panel.
//!
//! Every root directory carries two documents at its top level: a
//! team-shared one distributed through version control and a per-user local
//! one. Overrides merge field-by-field with local precedence; the favorites
//! ordering lives only in the local document.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::{Result, ScriptPanelError};

/// Team-shared document filename at the top of a root directory.
pub const SHARED_CONFIG_FILE: &str = "shared_config.json";
/// Per-user document filename at the top of a root directory.
pub const LOCAL_CONFIG_FILE: &str = "local_config.json";

/// Per-script display override record.
///
/// Every field is optional. Fields equal to the computed default are never
/// written, so the documents stay minimal and diff-friendly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
}

impl ScriptOverride {
    /// True when every field is unset; an empty override is deleted from
    /// the document rather than written as `{}`.
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.tooltip.is_none()
            && self.icon_name.is_none()
            && self.icon_path.is_none()
    }

    /// Field-wise merge, `local` winning wherever it has a value.
    fn merged_with(&self, local: &ScriptOverride) -> ScriptOverride {
        ScriptOverride {
            label: local.label.clone().or_else(|| self.label.clone()),
            tooltip: local.tooltip.clone().or_else(|| self.tooltip.clone()),
            icon_name: local.icon_name.clone().or_else(|| self.icon_name.clone()),
            icon_path: local.icon_path.clone().or_else(|| self.icon_path.clone()),
        }
    }
}

/// One configuration document (shared or local).
///
/// `BTreeMap` keeps the serialized key order stable so shared documents
/// diff cleanly under version control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub script_configs: BTreeMap<String, ScriptOverride>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub favorites: Vec<String>,
}

/// Load a configuration document.
///
/// A missing file is an empty document; a present-but-invalid one is a
/// hard [`ScriptPanelError::ConfigCorrupt`]. Historical flat-shaped
/// documents are upgraded on read.
#[instrument(name = "config_load", skip_all, fields(path = %path.display()))]
pub fn load_document(path: &Path) -> Result<ConfigDocument> {
    if !path.exists() {
        debug!("config file not found, using empty document");
        return Ok(ConfigDocument::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let value: Value =
        serde_json::from_str(&content).map_err(|source| ScriptPanelError::ConfigCorrupt {
            path: path.to_path_buf(),
            source,
        })?;

    migrate_document(value, path)
}

/// Upgrade historical document shapes to the current schema.
///
/// The oldest documents stored overrides as a flat map at the top level,
/// with an optional per-entry `is_favorite` flag instead of the separate
/// ordered `favorites` list. Those load here as if they had been written
/// with the current shape; the next write persists the upgraded form.
fn migrate_document(value: Value, path: &Path) -> Result<ConfigDocument> {
    let corrupt = |source| ScriptPanelError::ConfigCorrupt {
        path: path.to_path_buf(),
        source,
    };

    let is_current_shape = value
        .as_object()
        .map(|obj| obj.contains_key("script_configs") || obj.contains_key("favorites"))
        .unwrap_or(false);
    if is_current_shape {
        return serde_json::from_value(value).map_err(corrupt);
    }

    let entries = match value {
        Value::Object(entries) => entries,
        // not an object at all: surface the shape mismatch as corruption
        other => return serde_json::from_value(other).map_err(corrupt),
    };

    let mut doc = ConfigDocument::default();
    for (relative_path, entry) in entries {
        let Value::Object(mut fields) = entry else {
            continue;
        };
        if matches!(fields.remove("is_favorite"), Some(Value::Bool(true))) {
            doc.favorites.push(relative_path.clone());
        }
        let script_override: ScriptOverride =
            serde_json::from_value(Value::Object(fields)).map_err(corrupt)?;
        if !script_override.is_empty() {
            doc.script_configs.insert(relative_path, script_override);
        }
    }

    if !doc.script_configs.is_empty() || !doc.favorites.is_empty() {
        info!(
            entry_count = doc.script_configs.len(),
            favorite_count = doc.favorites.len(),
            "migrated legacy flat config document"
        );
    }
    Ok(doc)
}

/// Merge a shared and a local document with local precedence.
///
/// `script_configs` merges per key and per field, so a local tweak to one
/// script's label never erases shared values for other fields or other
/// scripts. `favorites` is list-valued and replaced wholesale; shared
/// documents do not store favorites by convention, so the shared list only
/// surfaces when the local one is absent.
pub fn merge_documents(shared: &ConfigDocument, local: &ConfigDocument) -> ConfigDocument {
    let mut script_configs = shared.script_configs.clone();
    for (key, local_override) in &local.script_configs {
        let merged = match script_configs.get(key) {
            Some(shared_override) => shared_override.merged_with(local_override),
            None => local_override.clone(),
        };
        script_configs.insert(key.clone(), merged);
    }

    let favorites = if local.favorites.is_empty() {
        shared.favorites.clone()
    } else {
        local.favorites.clone()
    };

    ConfigDocument {
        script_configs,
        favorites,
    }
}

/// Write a document with stable key order and 2-space indentation, using
/// an atomic temp-write + rename. Creates parent directories on first use.
#[instrument(name = "config_save", skip_all, fields(path = %path.display()))]
pub fn write_document(path: &Path, doc: &ConfigDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
    }

    let json =
        serde_json::to_string_pretty(doc).context("failed to serialize config document")?;

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &json)
        .with_context(|| format!("failed to write temp config file: {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename temp file to {}", path.display()))?;

    debug!(bytes = json.len(), "saved config document");
    Ok(())
}

/// Store one script's override in the document at `path`, or delete its
/// entry when the override has been reduced to all defaults.
pub fn save_script_override(
    path: &Path,
    relative_key: &str,
    script_override: &ScriptOverride,
) -> Result<()> {
    let mut doc = load_document(path)?;

    if script_override.is_empty() {
        if doc.script_configs.remove(relative_key).is_none() {
            debug!(key = relative_key, "override already at defaults, nothing to write");
            return Ok(());
        }
    } else {
        doc.script_configs
            .insert(relative_key.to_string(), script_override.clone());
    }

    write_document(path, &doc)
}

/// Read the ordered favorites list from a local document.
pub fn get_favorites(local_config_path: &Path) -> Result<Vec<String>> {
    Ok(load_document(local_config_path)?.favorites)
}

/// Replace the favorites list in a local document, preserving every other
/// top-level key already present.
pub fn set_favorites(local_config_path: &Path, favorites: Vec<String>) -> Result<()> {
    let mut doc = load_document(local_config_path)?;
    doc.favorites = favorites;
    write_document(local_config_path, &doc)
}
