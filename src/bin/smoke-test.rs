//! Smoke test binary for the registry and config store.
//!
//! Run with: cargo run --bin smoke-test -- <root_dir> [filter]
//!
//! This exercises:
//! 1. Registry population from a real root directory
//! 2. Label filtering
//! 3. Favorites round-trip (toggle on, reorder, toggle off)
//! 4. Expand-state defaults

use std::path::PathBuf;
use std::process::ExitCode;

use script_panel::error::ResultExt;
use script_panel::{logging, ScriptRegistry};

fn main() -> ExitCode {
    let _guard = logging::init();

    let mut args = std::env::args().skip(1);
    let Some(root_arg) = args.next() else {
        eprintln!("usage: smoke-test <root_dir> [filter]");
        return ExitCode::FAILURE;
    };
    let filter = args.next().unwrap_or_default();
    let root = PathBuf::from(shellexpand::tilde(&root_arg).as_ref());

    println!("=== script-panel smoke test ===\n");

    println!("1. Populating from {}...", root.display());
    let mut registry = ScriptRegistry::new();
    if registry.populate(std::slice::from_ref(&root)).log_err().is_none() {
        return ExitCode::FAILURE;
    }
    println!(
        "   {} scripts, {} favorites\n",
        registry.scripts().len(),
        registry.favorites().len()
    );

    println!("2. Listing scripts (filter: {filter:?})...");
    for script in registry.filter_scripts(&filter) {
        let star = if script.is_favorited { "*" } else { " " };
        let dir = if script.relative_dir.is_empty() {
            "<top>"
        } else {
            script.relative_dir.as_str()
        };
        println!("   {star} [{dir}] {}", script.label);
    }
    println!();

    println!("3. Favorites round-trip...");
    match registry.scripts().first().map(|s| s.relative_path.clone()) {
        Some(first) => {
            let ok = registry.toggle_favorite(&first, true).log_err().is_some()
                && registry.reorder_favorite(&first, -1).log_err().is_some()
                && registry.toggle_favorite(&first, false).log_err().is_some();
            if !ok {
                return ExitCode::FAILURE;
            }
            println!("   toggled, reordered and untoggled {first}");
        }
        None => println!("   SKIPPED: no scripts discovered"),
    }
    println!();

    println!("4. Expand state...");
    for dir in registry.all_relative_dirs() {
        let name = if dir.is_empty() { "<top>" } else { dir };
        println!("   {name} -> {}", registry.is_expanded(dir));
    }

    ExitCode::SUCCESS
}
