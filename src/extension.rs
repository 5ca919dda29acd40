//! Studio-integration contract.
//!
//! A studio pipeline registers one implementation explicitly at startup
//! (`ScriptRegistry::with_extension`); there is no module scanning or
//! subclass discovery. Every hook has a default no-op body, so a partial
//! implementation only overrides what it cares about.

use std::path::{Path, PathBuf};

/// Capability hooks a studio integration can provide to the panel core.
pub trait PanelExtension {
    /// Roots to seed the panel with when the user has configured none.
    fn default_root_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Called after the host has executed a script.
    fn on_script_executed(&self, _path: &Path) {}
}

/// Stand-in used until the host registers a real extension.
#[derive(Debug, Default)]
pub struct NoopExtension;

impl PanelExtension for NoopExtension {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_extension_has_no_default_roots() {
        assert!(NoopExtension.default_root_paths().is_empty());
    }

    #[test]
    fn test_partial_impl_only_overrides_roots() {
        struct StudioExtension;
        impl PanelExtension for StudioExtension {
            fn default_root_paths(&self) -> Vec<PathBuf> {
                vec![PathBuf::from("/studio/tools")]
            }
        }

        let ext = StudioExtension;
        assert_eq!(ext.default_root_paths(), vec![PathBuf::from("/studio/tools")]);
        // the executed hook stays a no-op
        ext.on_script_executed(Path::new("/studio/tools/scripts/foo.py"));
    }
}
