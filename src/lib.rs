//! Core registry and configuration engine for a scripts panel.
//!
//! Discovers Python scripts under configured root folders, merges shared
//! and per-user JSON display overrides with local precedence, and tracks
//! the favorites ordering and folder expand state the host panel renders
//! from. The host UI (drawing, input, icon previews, editor windows) lives
//! outside this crate and calls in through [`scripts::ScriptRegistry`].

pub mod config;
pub mod error;
pub mod extension;
pub mod logging;
pub mod script_creation;
pub mod scripts;

pub use error::{Result, ScriptPanelError};
pub use scripts::{OverrideEdit, RootDir, Script, ScriptRegistry};
