use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use url::Url;
use walkdir::WalkDir;

use crate::error::LoadError;

pub const DEFAULT_PACKS_PATH: &str = "data/emoticon_pack.csv";
pub const DEFAULT_EMOTICONS_PATH: &str = "data/emoticons.csv";
const BASE_KEY: &str = "CATALOG_BASE";
const SEARCH_DEPTH: usize = 5;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Location holding `data/` and `images/`. Always ends with `/`.
    pub base: Url,
    pub packs_path: String,
    pub emoticons_path: String,
    pub probe_enabled: bool,
    pub probe_concurrency: usize,
    pub probe_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl CatalogConfig {
    pub fn with_base(raw: &str) -> Result<Self> {
        Ok(Self {
            base: parse_base(raw)?,
            packs_path: DEFAULT_PACKS_PATH.to_string(),
            emoticons_path: DEFAULT_EMOTICONS_PATH.to_string(),
            probe_enabled: true,
            probe_concurrency: 8,
            probe_timeout: Duration::from_millis(3000),
            fetch_timeout: Duration::from_secs(30),
        })
    }

    pub fn dataset_url(&self, relative: &str, what: &'static str) -> Result<Url, LoadError> {
        self.base
            .join(relative)
            .map_err(|e| LoadError::UnsupportedScheme {
                what,
                url: format!("{}{} ({})", self.base, relative, e),
            })
    }
}

/// Accepts an `http(s)://` or `file://` URL, or a directory path.
/// The result always ends with `/` so relative joins stay inside it.
pub fn parse_base(raw: &str) -> Result<Url, LoadError> {
    let invalid = |reason: String| LoadError::InvalidBase {
        base: raw.to_string(),
        reason,
    };

    let mut url = match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "file") => url,
        _ => {
            let dir = Path::new(raw)
                .canonicalize()
                .map_err(|e| invalid(e.to_string()))?;
            Url::from_directory_path(&dir).map_err(|_| invalid("not an absolute directory".into()))?
        }
    };

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Base from the command line, then `.env`, then a filesystem search that is saved to `.env`.
pub fn resolve_base(cli_base: Option<&str>, packs_path: &str) -> Result<String> {
    if let Some(base) = cli_base {
        return Ok(base.to_string());
    }

    let env_path = Path::new(".env");
    if env_path.exists() {
        if let Ok(base) = load_from_env(env_path) {
            info!("Loaded catalog base from .env");
            return Ok(base);
        }
    }

    info!("No catalog base given. Searching filesystem...");
    let base = find_base(packs_path)?;
    info!("Found catalog base: {:?}", base);

    let base = base.display().to_string();
    save_to_env(env_path, &base)?;
    info!("Saved catalog base to .env");
    Ok(base)
}

/// Finds the packs dataset near the working directory and returns the
/// directory it is relative to.
fn find_base(packs_path: &str) -> Result<PathBuf> {
    let relative = Path::new(packs_path);
    let file_name = relative
        .file_name()
        .ok_or_else(|| anyhow!("Invalid packs path '{}'", packs_path))?;

    let root = std::env::current_dir()?;
    let roots = std::iter::once(root.as_path()).chain(root.parent());

    for search_root in roots {
        let found = WalkDir::new(search_root)
            .max_depth(SEARCH_DEPTH)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() == file_name)
            .find_map(|e| base_for(e.path(), relative));

        if let Some(base) = found {
            return Ok(base);
        }
    }

    Err(anyhow!(
        "Could not find '{}' in nearby directories.",
        packs_path
    ))
}

/// `/site/data/emoticon_pack.csv` with relative `data/emoticon_pack.csv` gives `/site`.
fn base_for(found: &Path, relative: &Path) -> Option<PathBuf> {
    let mut base = found;
    for _ in relative.components() {
        base = base.parent()?;
    }
    found.ends_with(relative).then(|| base.to_path_buf())
}

fn load_from_env(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line?;
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == BASE_KEY && !value.trim().is_empty() {
                return Ok(value.trim().to_string());
            }
        }
    }

    Err(anyhow!("No {} in .env file", BASE_KEY))
}

fn save_to_env(path: &Path, base: &str) -> Result<()> {
    let mut file = File::create(path).context("Failed to create .env file")?;
    writeln!(file, "{}={}", BASE_KEY, base)?;
    Ok(())
}
