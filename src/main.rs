mod catalog;
mod error;
mod ingest;
mod pipeline;
mod utils;
mod view;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use crate::catalog::filter::PackSelector;
use crate::catalog::probe::{DefaultProbe, DisabledProbe, ExistenceProbe};
use crate::pipeline::load_catalog;
use crate::utils::config::{self, CatalogConfig};
use crate::view::ViewState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL or directory containing `data/` and `images/`
    #[arg(short, long)]
    base: Option<String>,

    #[arg(long, default_value = config::DEFAULT_PACKS_PATH)]
    packs: String,

    #[arg(long, default_value = config::DEFAULT_EMOTICONS_PATH)]
    emoticons: String,

    /// Pack id, or `all`
    #[arg(short, long, default_value = PackSelector::ALL)]
    pack: String,

    #[arg(short, long, default_value = "")]
    query: String,

    #[arg(long)]
    json: bool,

    /// Print the pack selector options and exit
    #[arg(long)]
    packs_list: bool,

    #[arg(short, long)]
    interactive: bool,

    #[arg(long)]
    no_probe: bool,

    #[arg(long, default_value_t = 8)]
    probe_concurrency: usize,

    #[arg(long, default_value_t = 3000)]
    probe_timeout_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let args = Args::parse();

    let base = config::resolve_base(args.base.as_deref(), &args.packs)?;
    let mut config = CatalogConfig::with_base(&base)?;
    config.packs_path = args.packs.clone();
    config.emoticons_path = args.emoticons.clone();
    config.probe_enabled = !args.no_probe;
    config.probe_concurrency = args.probe_concurrency.max(1);
    config.probe_timeout = Duration::from_millis(args.probe_timeout_ms);

    let probe: Box<dyn ExistenceProbe> = if config.probe_enabled {
        Box::new(DefaultProbe::new(config.probe_timeout).context("Failed to build probe client")?)
    } else {
        Box::new(DisabledProbe)
    };

    let catalog = match load_catalog(&config, probe.as_ref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            match pipeline::load_error(&e) {
                Some(load) => error!("Catalog load aborted: {}", load),
                None => error!("Catalog load failed: {:#}", e),
            }
            return Err(e);
        }
    };
    info!(
        "Loaded {} packs and {} emoticons",
        catalog.packs.len(),
        catalog.emoticons.len()
    );

    let state = ViewState {
        selector: PackSelector::parse(&args.pack),
        query: args.query.clone(),
    };

    let stdout = io::stdout();
    if args.packs_list {
        view::render_pack_options(&catalog.packs, &mut stdout.lock())?;
    } else if args.interactive {
        view::run_interactive(&catalog, state)?;
    } else if args.json {
        view::render_json(&state.visible(&catalog), &mut stdout.lock())?;
    } else {
        view::render_text(&state.visible(&catalog), &mut stdout.lock())?;
    }

    Ok(())
}
