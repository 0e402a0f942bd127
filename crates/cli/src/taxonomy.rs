//! `fscape taxonomy` — inspect the cuisine taxonomy.

use std::path::PathBuf;

use clap::Subcommand;

use foodscape_taxonomy::Taxonomy;

use crate::exit_codes::{EXIT_TAXONOMY_AMBIGUOUS, EXIT_TAXONOMY_INVALID};
use crate::CliError;

#[derive(Subcommand)]
pub enum TaxonomyCommands {
    /// List categories, hierarchy, and trigger counts
    List {
        /// Custom taxonomy TOML (defaults to the built-in table)
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report trigger phrases claimed by multiple categories
    #[command(after_help = "\
First-match-wins means a shared phrase always resolves to the category
listed first; this command surfaces those collisions. Exits non-zero
when any exist.")]
    Lint {
        /// Custom taxonomy TOML (defaults to the built-in table)
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_taxonomy(cmd: TaxonomyCommands) -> Result<(), CliError> {
    match cmd {
        TaxonomyCommands::List { taxonomy, json } => cmd_list(taxonomy, json),
        TaxonomyCommands::Lint { taxonomy, json } => cmd_lint(taxonomy, json),
    }
}

/// Load a custom table, or the built-in one when no path is given.
pub(crate) fn load_taxonomy(path: &Option<PathBuf>) -> Result<Taxonomy, CliError> {
    match path {
        Some(path) => {
            let input = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
            Taxonomy::from_toml(&input).map_err(|e| CliError {
                code: EXIT_TAXONOMY_INVALID,
                message: e.to_string(),
                hint: None,
            })
        }
        None => Ok(Taxonomy::builtin()),
    }
}

fn cmd_list(taxonomy_path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let taxonomy = load_taxonomy(&taxonomy_path)?;

    if json {
        let json_str = serde_json::to_string_pretty(taxonomy.entries())
            .map_err(|e| CliError::io(format!("JSON serialization error: {}", e)))?;
        println!("{json_str}");
        return Ok(());
    }

    for entry in taxonomy.entries() {
        let hierarchy = [&entry.region, &entry.subregion, &entry.sub_subregion]
            .iter()
            .filter_map(|level| level.as_deref())
            .collect::<Vec<_>>()
            .join(" / ");
        let hierarchy = if hierarchy.is_empty() {
            "(no region)".to_string()
        } else {
            hierarchy
        };
        println!(
            "{:<28} {:<55} {} trigger(s)",
            entry.label,
            hierarchy,
            entry.triggers.len(),
        );
    }

    Ok(())
}

fn cmd_lint(taxonomy_path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let taxonomy = load_taxonomy(&taxonomy_path)?;
    let ambiguous = taxonomy.ambiguous_triggers();

    if json {
        let json_str = serde_json::to_string_pretty(&ambiguous)
            .map_err(|e| CliError::io(format!("JSON serialization error: {}", e)))?;
        println!("{json_str}");
    } else if ambiguous.is_empty() {
        eprintln!("no ambiguous triggers");
    } else {
        for a in &ambiguous {
            // First label listed is the one that wins.
            println!("{:<20} {}", a.trigger, a.labels.join(" > "));
        }
    }

    if ambiguous.is_empty() {
        Ok(())
    } else {
        Err(CliError {
            code: EXIT_TAXONOMY_AMBIGUOUS,
            message: format!("{} ambiguous trigger(s)", ambiguous.len()),
            hint: Some("reorder or remove shared triggers to silence this".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lint_finds_known_collisions() {
        let err = cmd_lint(None, false).unwrap_err();
        assert_eq!(err.code, EXIT_TAXONOMY_AMBIGUOUS);
    }

    #[test]
    fn custom_table_without_collisions_lints_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tax.toml");
        std::fs::write(
            &path,
            "[[category]]\nlabel = \"Thai\"\ntriggers = [\"thai\"]\n",
        )
        .unwrap();
        cmd_lint(Some(path), false).unwrap();
    }

    #[test]
    fn invalid_custom_table_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tax.toml");
        std::fs::write(
            &path,
            "[[category]]\nlabel = \"A\"\ntriggers = []\n",
        )
        .unwrap();
        let err = load_taxonomy(&Some(path)).unwrap_err();
        assert_eq!(err.code, EXIT_TAXONOMY_INVALID);
        assert!(err.message.contains("no triggers"));
    }
}
