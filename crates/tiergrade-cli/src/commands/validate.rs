//! The `tiergrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(rules_path: PathBuf) -> Result<()> {
    let sets = if rules_path.is_dir() {
        tiergrade_core::parser::load_rule_directory(&rules_path)?
    } else {
        vec![tiergrade_core::parser::parse_rule_set(&rules_path)?]
    };

    let mut total_warnings = 0;

    for set in &sets {
        println!("Rule set: {} ({} questions)", set.name, set.questions.len());

        let warnings = tiergrade_core::parser::validate_rule_set(set);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All rule sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
