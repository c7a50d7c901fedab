//! The `learnpath validate` command.

use std::path::PathBuf;

use anyhow::Result;

use learnpath_core::parser;

pub fn execute(modules_path: PathBuf) -> Result<()> {
    let modules = if modules_path.is_dir() {
        parser::load_module_directory(&modules_path)?
    } else {
        vec![parser::parse_module(&modules_path)?]
    };

    let mut total_warnings = 0;

    for module in &modules {
        println!(
            "Module: {} {} ({} lessons, {} exercises)",
            module.code,
            module.name,
            module.lessons.len(),
            module.exercises.len()
        );

        let warnings = parser::validate_module(module);
        for w in &warnings {
            let prefix = w
                .task_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All modules valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
