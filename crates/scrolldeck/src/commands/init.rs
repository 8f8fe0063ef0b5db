use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::content::DeckContent;

/// Write the built-in deck so it can be edited.
pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Pass --force to overwrite it.",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, DeckContent::builtin_source())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} {}", "Wrote".green().bold(), path.display());
    println!("Present it with: scrolldeck {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_deck_and_refuses_overwrite() {
        let dir = std::env::temp_dir().join(format!("scrolldeck-init-{}", std::process::id()));
        let path = dir.join("deck.yaml");
        run(&path, false).unwrap();

        let deck = DeckContent::load(&path).unwrap();
        assert_eq!(deck.slides.len(), 7);
        assert_eq!(deck.base_path, dir);

        assert!(run(&path, false).is_err());
        run(&path, true).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
