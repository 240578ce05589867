use anyhow::anyhow;
use kuchiki::iter::NodeIterator as _;
use kuchiki::{NodeRef, Selectors};

use crate::dom;
use crate::fetcher::{FeedFetcher, FeedResult};
use crate::post::PostRecord;
use crate::render::{self, CARD_CLASS};
use crate::watcher::{self, IntersectionWatcher};

pub const DEFAULT_CONTAINER_ID: &str = "facebook-feed";
pub const DEFAULT_FALLBACK_SELECTOR: &str = ".facebook-wrapper .fb-page";
/// Set on the container once cards are in; stylesheets use it to hide the
/// fallback embed.
pub const POPULATED_CLASS: &str = "has-posts";

const MESSAGE_SELECTOR: &str = ".fb-card-message";

#[derive(Debug, Clone)]
pub struct HydrateConfig {
    pub container_id: String,
    pub fallback_selector: String,
}

impl Default for HydrateConfig {
    fn default() -> Self {
        Self {
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            fallback_selector: DEFAULT_FALLBACK_SELECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// The page has no feed container.
    NoContainer,
    /// Cards were already inserted by an earlier run.
    AlreadyPopulated,
    /// No usable data; the fallback embed stays visible.
    Fallback,
    Populated { cards: usize },
}

/// Where the feed goes in a page: the container and the fallback embed.
pub struct FeedSlot {
    container_id: String,
    fallback: Selectors,
}

impl FeedSlot {
    pub fn new(config: &HydrateConfig) -> anyhow::Result<Self> {
        let fallback = Selectors::compile(&config.fallback_selector)
            .map_err(|()| anyhow!("invalid fallback selector {:?}", config.fallback_selector))?;
        Ok(Self {
            container_id: config.container_id.clone(),
            fallback,
        })
    }

    pub fn container(&self, document: &NodeRef) -> Option<NodeRef> {
        dom::find_by_id(document, &self.container_id)
    }

    /// Applies a fetch result to the page. Cards are rendered first and
    /// appended together afterwards, then registered for their entrance.
    pub fn fill(
        &self,
        document: &NodeRef,
        result: FeedResult,
        entrances: &mut IntersectionWatcher,
    ) -> HydrateOutcome {
        let Some(container) = self.container(document) else {
            return HydrateOutcome::NoContainer;
        };
        if dom::has_class(&container, POPULATED_CLASS) {
            return HydrateOutcome::AlreadyPopulated;
        }
        let Some(posts) = result.into_posts() else {
            return HydrateOutcome::Fallback;
        };

        let cards = build_cards(&posts);

        dom::add_class(&container, POPULATED_CLASS);
        self.hide_fallback(document);
        for card in &cards {
            container.append(card.clone());
        }

        let count = cards.len();
        entrances.watch(cards, watcher::play_entrance);
        HydrateOutcome::Populated { cards: count }
    }

    fn hide_fallback(&self, document: &NodeRef) {
        let embed = document
            .descendants()
            .elements()
            .find(|el| self.fallback.matches(el));
        if let Some(embed) = embed {
            dom::set_style(embed.as_node(), "display", "none");
        }
    }
}

/// Parsing normalizes text (CR to LF, NUL dropped), so message text is put
/// back as a literal text node after the markup is parsed.
fn build_cards(posts: &[PostRecord]) -> Vec<NodeRef> {
    let fragment = dom::parse_document(&render::render_cards(posts).into_string());
    let cards: Vec<NodeRef> = fragment
        .descendants()
        .filter(|node| dom::has_class(node, CARD_CLASS))
        .collect();
    for (card, post) in cards.iter().zip(posts) {
        card.detach();
        if let Some(message) = post.message.as_deref() {
            restore_message(card, message);
        }
    }
    cards
}

fn restore_message(card: &NodeRef, message: &str) {
    let Ok(Some(paragraph)) = dom::select_first(card, MESSAGE_SELECTOR) else {
        return;
    };
    for child in paragraph.children().collect::<Vec<_>>() {
        child.detach();
    }
    paragraph.append(NodeRef::new_text(render::truncate_message(
        message,
        render::MESSAGE_LIMIT,
    )));
}

pub struct Hydrator {
    fetcher: FeedFetcher,
    slot: FeedSlot,
}

impl Hydrator {
    pub fn new(fetcher: FeedFetcher, config: &HydrateConfig) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher,
            slot: FeedSlot::new(config)?,
        })
    }

    /// Fetches the feed once and fills the page's container with cards.
    /// Pages without a container are left alone and nothing is fetched.
    pub async fn hydrate(
        &self,
        document: &NodeRef,
        entrances: &mut IntersectionWatcher,
    ) -> HydrateOutcome {
        match self.slot.container(document) {
            None => return HydrateOutcome::NoContainer,
            Some(c) if dom::has_class(&c, POPULATED_CLASS) => {
                return HydrateOutcome::AlreadyPopulated;
            }
            Some(_) => {}
        }

        let result = self.fetcher.fetch_feed().await;
        let outcome = self.slot.fill(document, result, entrances);
        tracing::info!(endpoint = %self.fetcher.endpoint(), ?outcome, "feed hydration finished");
        outcome
    }
}
