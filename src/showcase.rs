//! Showcase content with static defaults.
//!
//! Marketing collections (headline stats, testimonials, partner brands) come
//! from a content source. Each collection independently falls back to a
//! built-in default when the source has none, has an empty list, or cannot
//! be read at all. The result is read-only.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Collections as delivered by a content source. Any may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteContent {
    pub stats: Option<Vec<Stat>>,
    pub testimonials: Option<Vec<Testimonial>>,
    pub brands: Option<Vec<Brand>>,
}

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where showcase collections come from.
pub trait ContentSource {
    fn fetch(&self) -> Result<RemoteContent, ContentError>;
}

/// No remote content; every collection uses its default.
pub struct NoContent;

impl ContentSource for NoContent {
    fn fetch(&self) -> Result<RemoteContent, ContentError> {
        Ok(RemoteContent::default())
    }
}

/// Reads collections from a JSON file. A missing file means no content.
pub struct FileContent {
    path: PathBuf,
}

impl FileContent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for FileContent {
    fn fetch(&self) -> Result<RemoteContent, ContentError> {
        if !self.path.exists() {
            return Ok(RemoteContent::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Where each collection in a [`Showcase`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Remote,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Showcase {
    pub stats: Vec<Stat>,
    pub testimonials: Vec<Testimonial>,
    pub brands: Vec<Brand>,
    pub origins: ShowcaseOrigins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShowcaseOrigins {
    pub stats: Origin,
    pub testimonials: Origin,
    pub brands: Origin,
}

fn pick<T>(remote: Option<Vec<T>>, default: fn() -> Vec<T>) -> (Vec<T>, Origin) {
    match remote {
        Some(items) if !items.is_empty() => (items, Origin::Remote),
        _ => (default(), Origin::Default),
    }
}

impl Showcase {
    pub fn load(source: &dyn ContentSource) -> Self {
        let remote = source.fetch().unwrap_or_else(|err| {
            warn!(
                target = "showcase::load",
                error = %err,
                "showcase content unavailable; using defaults"
            );
            RemoteContent::default()
        });
        let (stats, stats_origin) = pick(remote.stats, default_stats);
        let (testimonials, testimonials_origin) = pick(remote.testimonials, default_testimonials);
        let (brands, brands_origin) = pick(remote.brands, default_brands);
        Self {
            stats,
            testimonials,
            brands,
            origins: ShowcaseOrigins {
                stats: stats_origin,
                testimonials: testimonials_origin,
                brands: brands_origin,
            },
        }
    }
}

pub fn default_stats() -> Vec<Stat> {
    [
        ("2,400+", "Curated products"),
        ("180", "Partner brands"),
        ("48h", "Average sample turnaround"),
    ]
    .into_iter()
    .map(|(value, label)| Stat {
        value: value.to_string(),
        label: label.to_string(),
    })
    .collect()
}

pub fn default_testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial {
            quote: "The moodboard made it easy to agree on finishes with our client in one meeting."
                .to_string(),
            author: "Interior designer".to_string(),
            role: Some("Residential studio".to_string()),
        },
        Testimonial {
            quote: "We shared one link with the whole family and everyone could flip through it."
                .to_string(),
            author: "Homeowner".to_string(),
            role: None,
        },
    ]
}

pub fn default_brands() -> Vec<Brand> {
    ["Atelier Nord", "Casa Terra", "Lumen & Co", "Oakline"]
        .into_iter()
        .map(|name| Brand {
            name: name.to_string(),
            logo: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Broken;

    impl ContentSource for Broken {
        fn fetch(&self) -> Result<RemoteContent, ContentError> {
            Err(ContentError::Io(std::io::Error::other("cms offline")))
        }
    }

    #[test]
    fn no_content_uses_all_defaults() {
        let showcase = Showcase::load(&NoContent);
        assert_eq!(showcase.stats, default_stats());
        assert_eq!(showcase.testimonials, default_testimonials());
        assert_eq!(showcase.brands, default_brands());
        assert_eq!(showcase.origins.stats, Origin::Default);
    }

    #[test]
    fn each_collection_falls_back_independently() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("showcase.json");
        fs::write(
            &path,
            r#"{"stats": [{"value": "12", "label": "Showrooms"}], "testimonials": []}"#,
        )
        .unwrap();
        let showcase = Showcase::load(&FileContent::new(&path));
        assert_eq!(showcase.stats.len(), 1);
        assert_eq!(showcase.origins.stats, Origin::Remote);
        assert_eq!(showcase.testimonials, default_testimonials());
        assert_eq!(showcase.origins.testimonials, Origin::Default);
        assert_eq!(showcase.origins.brands, Origin::Default);
    }

    #[test]
    fn missing_file_is_no_content() {
        let tmp = TempDir::new().unwrap();
        let showcase = Showcase::load(&FileContent::new(tmp.path().join("absent.json")));
        assert_eq!(showcase.brands, default_brands());
    }

    #[test]
    fn unreadable_source_uses_defaults() {
        let showcase = Showcase::load(&Broken);
        assert_eq!(showcase.stats, default_stats());
    }

    #[test]
    fn defaults_are_non_empty() {
        assert!(!default_stats().is_empty());
        assert!(!default_testimonials().is_empty());
        assert!(!default_brands().is_empty());
    }
}
