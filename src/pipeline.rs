use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use tracing::info;

use crate::catalog::filter::{self, PackSelector};
use crate::catalog::joiner::{self, PackTable};
use crate::catalog::locator::ImageLocator;
use crate::catalog::model::{EmoticonRecord, Pack};
use crate::catalog::probe::ExistenceProbe;
use crate::error::LoadError;
use crate::ingest::{delimited, fetch};
use crate::utils::config::CatalogConfig;

/// Fully joined datasets. Read-only after load; a reload builds a new one.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub packs: Vec<Pack>,
    pub emoticons: Vec<EmoticonRecord>,
}

impl Catalog {
    pub fn filter(&self, selector: &PackSelector, query: &str) -> Vec<&EmoticonRecord> {
        filter::filter(&self.emoticons, selector, query)
    }
}

/// Fetches both datasets concurrently, then joins every emoticon and probes
/// its image on a pool of `probe_concurrency` threads.
pub fn load_catalog(config: &CatalogConfig, probe: &dyn ExistenceProbe) -> Result<Catalog> {
    info!("Loading catalog from {}", config.base);

    let packs_url = config.dataset_url(&config.packs_path, "packs")?;
    let emoticons_url = config.dataset_url(&config.emoticons_path, "emoticons")?;

    let client = Client::builder()
        .timeout(config.fetch_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let (packs_text, emoticons_text) = rayon::join(
        || fetch::fetch_text(&client, &packs_url, "packs"),
        || fetch::fetch_text(&client, &emoticons_url, "emoticons"),
    );
    let packs_text = packs_text?;
    let emoticons_text = emoticons_text?;
    info!(
        "Fetched datasets: packs {} bytes, emoticons {} bytes",
        packs_text.len(),
        emoticons_text.len()
    );

    let pack_table = PackTable::from_rows(&delimited::parse(&packs_text));
    let raw_emoticons = delimited::parse(&emoticons_text);
    info!(
        "Parsed {} packs and {} emoticon rows",
        pack_table.packs.len(),
        raw_emoticons.len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.probe_concurrency.max(1))
        .build()
        .context("Failed to build probe thread pool")?;

    let progress = ProgressBar::new(raw_emoticons.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}") {
        progress.set_style(style);
    }
    progress.set_message("Resolving images");

    let locator = ImageLocator::new(&config.base, probe);
    let emoticons =
        pool.install(|| joiner::join(&pack_table, &raw_emoticons, &locator, &progress));
    progress.finish_and_clear();

    let verified = emoticons.iter().filter(|e| e.img_verified).count();
    info!(
        "Joined {} emoticons ({} images verified, {} unverified)",
        emoticons.len(),
        verified,
        emoticons.len() - verified
    );

    Ok(Catalog {
        packs: pack_table.packs,
        emoticons,
    })
}

/// Surfaces the typed load failure behind an `anyhow` error, if there is one.
pub fn load_error(err: &anyhow::Error) -> Option<&LoadError> {
    err.downcast_ref::<LoadError>()
}
