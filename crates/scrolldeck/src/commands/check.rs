use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::content::{DeckContent, MediaKind};

/// Validate a deck and list its slides, flagging media that will fall
/// back to a placeholder.
pub fn run(file: &Path, quiet: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let deck = DeckContent::load(file)?;
    let missing = missing_media(&deck);

    if quiet {
        return Ok(());
    }

    let title = deck.title.as_deref().unwrap_or("(untitled)");
    println!("{} {}", "Deck:".bold(), title);
    for (i, slide) in deck.slides.iter().enumerate() {
        let widget = slide
            .widget
            .map(|w| format!(" [{}]", w.name()).cyan().to_string())
            .unwrap_or_default();
        println!("  {:>2}. {:<14} {}{}", i + 1, slide.id, slide.title, widget);
    }
    if !deck.features.is_empty() {
        println!("{} {}", "Stack cards:".bold(), deck.features.len());
    }

    if missing.is_empty() {
        println!("{}", "OK".green().bold());
    } else {
        println!(
            "{} {} media file(s) not found, placeholders will be shown:",
            "Warning:".yellow().bold(),
            missing.len()
        );
        for path in &missing {
            println!("  {path}");
        }
    }
    Ok(())
}

/// Image paths that do not resolve to a file. Videos are never played,
/// so they are not checked.
pub fn missing_media(deck: &DeckContent) -> Vec<String> {
    let slide_media = deck.slides.iter().filter_map(|s| s.media());
    let card_media = deck.features.iter().filter_map(|c| c.media());
    slide_media
        .chain(card_media)
        .filter(|m| m.kind == MediaKind::Image)
        .filter(|m| !deck.resolve_media(m.path).exists())
        .map(|m| m.path.to_string())
        .collect()
}
