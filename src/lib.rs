mod audit;
mod builtin;
mod cli;
mod dom;
mod effects;
mod error;
mod fetcher;
mod hydrate;
mod page;
mod post;
mod progress;
mod render;
mod triggers;
mod watcher;

use std::path::PathBuf;

use anyhow::Context as _;

pub use cli::{Args as CliArgs, ProgressMode};
pub use effects::{HeroAction, HeroState, MenuState};
pub use error::FeedError;
pub use fetcher::{FeedFetcher, FeedResult};
pub use hydrate::{FeedSlot, HydrateConfig, HydrateOutcome, Hydrator, POPULATED_CLASS};
pub use page::{Page, Session, Viewport};
pub use post::{PostRecord, parse_feed};
pub use render::{format_post_date, render_post, truncate_message};
pub use triggers::{Event, Trigger, Triggers};
pub use watcher::{IntersectionWatcher, Layout, Margin, Rect, WatchOptions};

/// Reads a page, hydrates its feed container once, audits the cards and
/// writes the result. A page that keeps its fallback is still written.
pub async fn run(args: CliArgs) -> anyhow::Result<HydrateOutcome> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    progress.set_stage("reading page");
    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let mut page = Page::parse(&html, Viewport::default())?;

    let fetcher = FeedFetcher::new(&args.user_agent, &args.base_url, &args.feed_path)?;
    let hydrator = Hydrator::new(fetcher, &args.hydrate_config())?;

    progress.set_stage("fetching feed");
    let outcome = page.hydrate_feed(&hydrator).await;

    progress.set_stage("auditing cards");
    let out_html = page.to_html().context("serialize hydrated page")?;
    if let HydrateOutcome::Populated { cards } = outcome {
        audit::assert_appended_cards_safe(&out_html, &args.container_id, cards)?;
    }

    progress.set_stage("writing output");
    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("hydrated.html"));
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    std::fs::write(&out_path, out_html)
        .with_context(|| format!("write {}", out_path.display()))?;

    progress.finish(format!("{outcome:?}"));
    tracing::info!(?outcome, out = %out_path.display(), "page written");
    Ok(outcome)
}
