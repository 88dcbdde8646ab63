use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    styles: HashMap<String, String>,
    batches: HashMap<String, BatchEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        style: Option<String>,
    },
}

impl BatchEntry {
    fn as_path(&self) -> &str {
        match self {
            BatchEntry::Path(path) => path,
            BatchEntry::Detailed { path, .. } => path,
        }
    }

    fn style(&self) -> Option<&str> {
        match self {
            BatchEntry::Path(_) => None,
            BatchEntry::Detailed { style, .. } => style.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Base styles a view is created with.
pub mod styles {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.styles.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.styles, "style", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.styles, "style", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.styles, "style", name)?;
        Ok(resolve_path(rel))
    }
}

/// Animation config inputs, optionally paired with the base style they expect.
pub mod batches {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.batches.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.batches, "batch", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.batches, "batch", name)?;
        super::load_json(entry.as_path())
    }

    /// Base style paired with the batch, loaded through `styles`.
    pub fn style<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        let entry = lookup(&MANIFEST.batches, "batch", name)?;
        match entry.style() {
            Some(style) => super::styles::load(style).map(Some),
            None => Ok(None),
        }
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.batches, "batch", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}
