//! Script discovery and the in-memory registry behind the panel.
//!
//! `populate` walks every configured root's `scripts/` tree, materializes a
//! [`Script`] per file with config overrides merged in, and rebuilds the
//! ordered favorites list. Folder expand/collapse state is the one piece of
//! state that survives a refresh.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::config::{self, ScriptOverride};
use crate::error::{Result, ResultExt, ScriptPanelError};
use crate::extension::{NoopExtension, PanelExtension};

/// Files whose name contains this marker become registry entries.
pub const SCRIPT_EXTENSION: &str = ".py";

/// A user-configured root folder holding a `scripts/` tree plus the two
/// configuration documents.
#[derive(Debug, Clone)]
pub struct RootDir {
    pub path: PathBuf,
}

impl RootDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RootDir { path: path.into() }
    }

    /// Basename used to prefix display dirs when several roots are active.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.path.join("scripts")
    }

    pub fn shared_config_path(&self) -> PathBuf {
        self.path.join(config::SHARED_CONFIG_FILE)
    }

    pub fn local_config_path(&self) -> PathBuf {
        self.path.join(config::LOCAL_CONFIG_FILE)
    }
}

/// One discovered script file, filename defaults merged with overrides.
#[derive(Debug, Clone)]
pub struct Script {
    /// Absolute path on disk; identity key within a single run.
    pub path: PathBuf,
    /// Path relative to the owning root's `scripts/` folder, forward
    /// slashes. The stable config key: survives relocating the root.
    pub relative_path: String,
    /// Folder-grouping string for display, root-prefixed only when more
    /// than one root is configured.
    pub relative_dir: String,
    /// Root directory this script was discovered under.
    pub root: PathBuf,
    pub label: String,
    pub tooltip: Option<String>,
    pub icon_name: Option<String>,
    pub icon_path: Option<String>,
    pub is_favorited: bool,
}

impl Script {
    /// Display-name default: the filename without extension. An override
    /// is only persisted when it differs from this.
    pub fn default_label(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn apply_override(&mut self, ov: &ScriptOverride) {
        if let Some(label) = non_empty(&ov.label) {
            self.label = label;
        }
        if let Some(tooltip) = non_empty(&ov.tooltip) {
            self.tooltip = Some(tooltip);
        }
        if let Some(icon_name) = non_empty(&ov.icon_name) {
            self.icon_name = Some(icon_name);
        }
        if let Some(icon_path) = non_empty(&ov.icon_path) {
            self.icon_path = Some(icon_path);
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Editable display fields as they come back from the host's edit box.
/// Empty strings mean "use the default".
#[derive(Debug, Clone, Default)]
pub struct OverrideEdit {
    pub label: String,
    pub tooltip: String,
    pub icon_name: String,
    pub icon_path: String,
}

/// Display grouping path: `{root_name}/{relative_dir}`, collapsing to just
/// the root name at the walk root and to the bare relative dir when a
/// single root is configured.
fn display_relative_dir(root_name: &str, relative_dir: &str) -> String {
    if relative_dir.is_empty() {
        root_name.to_string()
    } else if root_name.is_empty() {
        relative_dir.to_string()
    } else {
        format!("{root_name}/{relative_dir}")
    }
}

/// The in-memory registry the panel renders from.
///
/// Rebuilt wholesale by [`ScriptRegistry::populate`]; owned by the host
/// integration layer and passed into command handlers rather than living
/// in a process-wide global.
pub struct ScriptRegistry {
    scripts: Vec<Script>,
    favorites: Vec<String>,
    roots: Vec<RootDir>,
    expanded_dirs: HashMap<String, bool>,
    extension: Box<dyn PanelExtension>,
}

impl Default for ScriptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::with_extension(Box::new(NoopExtension))
    }

    /// Build a registry with an explicitly registered studio extension.
    pub fn with_extension(extension: Box<dyn PanelExtension>) -> Self {
        ScriptRegistry {
            scripts: Vec::new(),
            favorites: Vec::new(),
            roots: Vec::new(),
            expanded_dirs: HashMap::new(),
            extension,
        }
    }

    pub fn set_extension(&mut self, extension: Box<dyn PanelExtension>) {
        self.extension = extension;
    }

    /// Rebuild the registry from the given roots (full rebuild, not
    /// incremental). Falls back to the extension's default roots when the
    /// list is empty. Expand/collapse state is kept so user toggles
    /// survive a refresh.
    #[instrument(name = "populate_scripts", skip_all, fields(root_count = root_paths.len()))]
    pub fn populate(&mut self, root_paths: &[PathBuf]) -> Result<()> {
        self.scripts.clear();
        self.favorites.clear();

        let root_paths: Vec<PathBuf> = if root_paths.is_empty() {
            self.extension.default_root_paths()
        } else {
            root_paths.to_vec()
        };

        self.roots = root_paths
            .iter()
            .map(|p| RootDir::new(PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref())))
            .collect();

        let single_root = self.roots.len() == 1;
        let roots = self.roots.clone();
        for root in &roots {
            self.populate_root(root, single_root)?;
        }

        self.refresh_favorites()?;

        info!(
            script_count = self.scripts.len(),
            favorite_count = self.favorites.len(),
            "populated script registry"
        );
        Ok(())
    }

    fn populate_root(&mut self, root: &RootDir, single_root: bool) -> Result<()> {
        let scripts_dir = root.scripts_dir();
        if !scripts_dir.exists() {
            warn!(path = %scripts_dir.display(), "scripts folder not found, skipping root");
            return Ok(());
        }

        // forced empty for a single root so the panel skips one nesting level
        let root_name = if single_root { String::new() } else { root.name() };

        // merge once per root, not once per file
        let shared = config::load_document(&root.shared_config_path())?;
        let local = config::load_document(&root.local_config_path())?;
        let merged = config::merge_documents(&shared, &local);

        for entry in WalkDir::new(&scripts_dir).sort_by_file_name() {
            let Some(entry) = entry.warn_on_err() else {
                continue;
            };

            let Ok(rel) = entry.path().strip_prefix(&scripts_dir) else {
                continue;
            };
            let rel_str = rel.to_string_lossy().replace('\\', "/");

            if entry.file_type().is_dir() {
                let display_dir = display_relative_dir(&root_name, &rel_str);
                // a root's own top-level entry starts expanded, everything
                // else collapsed; existing keys are never touched
                let default_state = rel_str.is_empty();
                self.expanded_dirs.entry(display_dir).or_insert(default_state);
                continue;
            }

            if !entry.file_type().is_file() {
                continue;
            }
            if !entry.file_name().to_string_lossy().contains(SCRIPT_EXTENSION) {
                continue;
            }

            let parent_rel = rel
                .parent()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();

            let mut script = Script {
                path: entry.path().to_path_buf(),
                relative_path: rel_str,
                relative_dir: display_relative_dir(&root_name, &parent_rel),
                root: root.path.clone(),
                label: String::new(),
                tooltip: None,
                icon_name: None,
                icon_path: None,
                is_favorited: false,
            };
            script.label = script.default_label();

            if let Some(ov) = merged.script_configs.get(&script.relative_path) {
                script.apply_override(ov);
            }

            debug!(path = %script.path.display(), label = %script.label, "discovered script");
            self.scripts.push(script);
        }

        Ok(())
    }

    /// Rebuild the ordered favorites list from each root's local document.
    ///
    /// Document order is user-controlled and preserved. Entries with no
    /// matching script on disk are skipped; they stay in the file untouched.
    #[instrument(name = "refresh_favorites", skip_all)]
    pub fn refresh_favorites(&mut self) -> Result<()> {
        self.favorites.clear();
        for script in &mut self.scripts {
            script.is_favorited = false;
        }

        let roots = self.roots.clone();
        for root in &roots {
            for relative_path in config::get_favorites(&root.local_config_path())? {
                let Some(script) = self
                    .scripts
                    .iter_mut()
                    .find(|s| s.relative_path == relative_path)
                else {
                    debug!(key = %relative_path, "favorite has no matching script, skipping");
                    continue;
                };
                script.is_favorited = true;
                self.favorites.push(relative_path);
            }
        }

        Ok(())
    }

    /// Scripts whose label contains every whitespace-separated filter
    /// token, case-insensitively. An empty filter matches everything.
    /// Iteration order is the discovery order of the last populate.
    pub fn filter_scripts<'a>(&'a self, filter: &str) -> impl Iterator<Item = &'a Script> {
        let tokens: Vec<String> = filter
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        self.scripts.iter().filter(move |script| {
            let label = script.label.to_lowercase();
            tokens.iter().all(|token| label.contains(token))
        })
    }

    /// Display dirs that still hold a match under the active filter. The
    /// drawer renders these even when collapsed, so searching reveals
    /// matches inside closed folders.
    pub fn filter_dirs(&self, filter: &str) -> HashSet<String> {
        self.filter_scripts(filter)
            .map(|script| script.relative_dir.clone())
            .collect()
    }

    /// Lookup by absolute path, the identity key within a run.
    pub fn script_at(&self, path: &Path) -> Option<&Script> {
        self.scripts.iter().find(|script| script.path == path)
    }

    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    /// Ordered favorite relative paths, in local-document order.
    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn roots(&self) -> &[RootDir] {
        &self.roots
    }

    /// First configured root; default target for new scripts and the
    /// open-folder action.
    pub fn primary_root(&self) -> Option<&RootDir> {
        self.roots.first()
    }

    pub fn is_expanded(&self, relative_dir: &str) -> bool {
        self.expanded_dirs.get(relative_dir).copied().unwrap_or(false)
    }

    pub fn set_expanded(&mut self, relative_dir: &str, expanded: bool) {
        self.expanded_dirs.insert(relative_dir.to_string(), expanded);
    }

    pub fn toggle_expanded(&mut self, relative_dir: &str) {
        let state = self.is_expanded(relative_dir);
        self.set_expanded(relative_dir, !state);
    }

    /// Dirs currently toggled open.
    pub fn expanded_dirs(&self) -> impl Iterator<Item = &str> {
        self.expanded_dirs
            .iter()
            .filter(|(_, &open)| open)
            .map(|(dir, _)| dir.as_str())
    }

    /// Every dir known to the panel, expanded or not.
    pub fn all_relative_dirs(&self) -> impl Iterator<Item = &str> {
        self.expanded_dirs.keys().map(String::as_str)
    }

    /// Add or remove a script from its root's local favorites and persist.
    /// Unknown paths and redundant toggles are no-ops.
    #[instrument(name = "toggle_favorite", skip(self))]
    pub fn toggle_favorite(&mut self, relative_path: &str, favorited: bool) -> Result<()> {
        let Some(root) = self.owning_root(relative_path) else {
            debug!("no script with this relative path, ignoring");
            return Ok(());
        };
        let local_path = root.local_config_path();

        let mut favorites = config::get_favorites(&local_path)?;
        let position = favorites.iter().position(|f| f == relative_path);
        let changed = match (favorited, position) {
            (true, None) => {
                favorites.push(relative_path.to_string());
                true
            }
            (false, Some(idx)) => {
                favorites.remove(idx);
                true
            }
            _ => false,
        };

        if changed {
            config::set_favorites(&local_path, favorites)?;
        }

        self.refresh_favorites()
    }

    /// Move a favorite one slot in its root's local list, wrapping at both
    /// ends: the first entry moved up lands at the bottom, the last entry
    /// moved down lands at the top. Steps other than one slot are rejected.
    #[instrument(name = "reorder_favorite", skip(self))]
    pub fn reorder_favorite(&mut self, relative_path: &str, direction: i32) -> Result<()> {
        if direction != 1 && direction != -1 {
            return Err(ScriptPanelError::InvalidReorderStep { direction });
        }

        let Some(root) = self.owning_root(relative_path) else {
            debug!("no script with this relative path, ignoring");
            return Ok(());
        };
        let local_path = root.local_config_path();

        let mut favorites = config::get_favorites(&local_path)?;
        let Some(current) = favorites.iter().position(|f| f == relative_path) else {
            debug!("not in the favorites list, ignoring");
            return Ok(());
        };

        // remove-then-reinsert rotation, not a pairwise swap
        let len = favorites.len() as i64;
        let new_index = (current as i64 + i64::from(direction)).rem_euclid(len) as usize;
        let entry = favorites.remove(current);
        favorites.insert(new_index, entry);

        config::set_favorites(&local_path, favorites)?;
        self.refresh_favorites()
    }

    /// Persist the edit-box fields for the script at `script_path`,
    /// keeping the stored record minimal: fields equal to their computed
    /// defaults are dropped, and a record reduced to all defaults is
    /// deleted outright. Writes to the owning root's shared or local
    /// document per `to_local`.
    #[instrument(name = "save_override", skip(self, edit), fields(path = %script_path.display(), to_local))]
    pub fn save_override(
        &mut self,
        script_path: &Path,
        edit: &OverrideEdit,
        to_local: bool,
    ) -> Result<()> {
        let Some(idx) = self.scripts.iter().position(|s| s.path == script_path) else {
            debug!("no script at this path, ignoring");
            return Ok(());
        };

        let (relative_path, default_label, root) = {
            let script = &self.scripts[idx];
            (
                script.relative_path.clone(),
                script.default_label(),
                RootDir::new(script.root.clone()),
            )
        };

        let ov = ScriptOverride {
            label: Some(edit.label.clone()).filter(|l| !l.is_empty() && *l != default_label),
            tooltip: Some(edit.tooltip.clone()).filter(|t| !t.is_empty()),
            icon_name: Some(edit.icon_name.clone()).filter(|n| !n.is_empty()),
            icon_path: Some(edit.icon_path.clone()).filter(|p| !p.is_empty()),
        };

        let config_path = if to_local {
            root.local_config_path()
        } else {
            root.shared_config_path()
        };
        config::save_script_override(&config_path, &relative_path, &ov)?;

        // reflect the edit in memory without a full repopulate
        let script = &mut self.scripts[idx];
        script.label = match &ov.label {
            Some(label) => label.clone(),
            None => default_label,
        };
        script.tooltip = ov.tooltip;
        script.icon_name = ov.icon_name;
        script.icon_path = ov.icon_path;

        Ok(())
    }

    /// Host callback after it runs a script; forwards to the registered
    /// extension hook.
    pub fn notify_script_executed(&self, path: &Path) {
        self.extension.on_script_executed(path);
    }

    fn owning_root(&self, relative_path: &str) -> Option<RootDir> {
        let script = self
            .scripts
            .iter()
            .find(|s| s.relative_path == relative_path)?;
        self.roots.iter().find(|r| r.path == script.root).cloned()
    }
}

#[cfg(test)]
#[path = "scripts_tests.rs"]
mod tests;
