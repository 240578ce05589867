use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::fetcher::DEFAULT_FEED_PATH;
use crate::hydrate::{DEFAULT_CONTAINER_ID, DEFAULT_FALLBACK_SELECTOR, HydrateConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Page HTML to hydrate.
    #[arg(long)]
    pub input: PathBuf,

    /// Base URL of the campaign site; the feed path is resolved against it.
    #[arg(long)]
    pub base_url: Url,

    /// Path of the feed endpoint returning `{ "posts": [...] }`.
    #[arg(long, default_value = DEFAULT_FEED_PATH)]
    pub feed_path: String,

    /// Output HTML file. Defaults to `hydrated.html`.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Id of the element the feed cards are appended to.
    #[arg(long, default_value = DEFAULT_CONTAINER_ID)]
    pub container_id: String,

    /// Selector of the embed shown when there is no feed data.
    #[arg(long, default_value = DEFAULT_FALLBACK_SELECTOR)]
    pub fallback_selector: String,

    /// HTTP User-Agent used for the feed request.
    #[arg(long, default_value = "campaign-feed-hydrate/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}

impl Args {
    pub fn hydrate_config(&self) -> HydrateConfig {
        HydrateConfig {
            container_id: self.container_id.clone(),
            fallback_selector: self.fallback_selector.clone(),
        }
    }
}
