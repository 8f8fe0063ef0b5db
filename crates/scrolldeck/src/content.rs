use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const BUILTIN_DECK: &str = include_str!("../assets/membership-pitch.yaml");

/// Everything a deck shows: the ordered slides and the cards of the
/// feature stack. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    pub slides: Vec<Slide>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<StackCard>,

    /// Directory media paths are resolved against.
    #[serde(skip)]
    pub base_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bullets: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<SlideWidget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiers: Vec<Tier>,
}

/// Live widget mounted inside a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideWidget {
    RevenueEstimator,
    FeatureStack,
}

impl SlideWidget {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RevenueEstimator => "revenue-estimator",
            Self::FeatureStack => "feature-stack",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackCard {
    pub title: String,
    pub member: String,
    pub association: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// A resolved reference to the media shown next to a slide's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaRef<'a> {
    pub kind: MediaKind,
    pub path: &'a str,
    pub alt: &'a str,
}

impl Slide {
    /// Video takes precedence over a still image.
    pub fn media(&self) -> Option<MediaRef<'_>> {
        let alt = self.placeholder.as_deref().unwrap_or(&self.title);
        if let Some(video) = self.video.as_deref() {
            return Some(MediaRef {
                kind: MediaKind::Video,
                path: video,
                alt,
            });
        }
        self.image.as_deref().map(|path| MediaRef {
            kind: MediaKind::Image,
            path,
            alt,
        })
    }
}

impl StackCard {
    pub fn media(&self) -> Option<MediaRef<'_>> {
        let alt = self.placeholder.as_deref().unwrap_or(&self.title);
        self.image.as_deref().map(|path| MediaRef {
            kind: MediaKind::Image,
            path,
            alt,
        })
    }
}

impl DeckContent {
    /// The deck compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_DECK, Path::new("."))
    }

    pub fn builtin_source() -> &'static str {
        BUILTIN_DECK
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let base_path = path.parent().unwrap_or(Path::new("."));
        Self::parse(&contents, base_path)
            .with_context(|| format!("Invalid deck in {}", path.display()))
    }

    pub fn parse(source: &str, base_path: &Path) -> Result<Self> {
        let mut content: DeckContent = serde_yaml::from_str(source)?;
        content.base_path = base_path.to_path_buf();
        content.validate()?;
        Ok(content)
    }

    /// Presence checks only; slide copy is trusted.
    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            anyhow::bail!("Deck has no slides");
        }

        let mut ids = HashSet::new();
        let mut widgets = HashSet::new();
        for (i, slide) in self.slides.iter().enumerate() {
            if slide.id.trim().is_empty() {
                anyhow::bail!("Slide {} has an empty id", i + 1);
            }
            if !ids.insert(slide.id.as_str()) {
                anyhow::bail!("Duplicate slide id: {}", slide.id);
            }
            if let Some(widget) = slide.widget {
                if !widgets.insert(widget) {
                    anyhow::bail!(
                        "Widget {} appears on more than one slide (second on '{}')",
                        widget.name(),
                        slide.id
                    );
                }
            }
        }

        if widgets.contains(&SlideWidget::FeatureStack) && self.features.is_empty() {
            anyhow::bail!("A feature-stack slide needs at least one entry under `features`");
        }
        Ok(())
    }

    /// Index of the slide hosting `widget`, if any.
    pub fn widget_slide(&self, widget: SlideWidget) -> Option<usize> {
        self.slides.iter().position(|s| s.widget == Some(widget))
    }

    pub fn resolve_media(&self, path: &str) -> PathBuf {
        resolve_against(&self.base_path, path)
    }
}

/// Relative media paths are relative to the deck file.
pub fn resolve_against(base_path: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_path.join(p)
    }
}
