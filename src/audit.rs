//! Last check on hydrated output before it is written.
//!
//! Cards carry remote content, so nothing inside them may execute, load
//! from a non-web scheme, or give an opened page a handle on the opener.

use kuchiki::NodeRef;
use kuchiki::iter::NodeIterator as _;

use crate::dom;
use crate::post::is_web_url;
use crate::render::CARD_CLASS;

const ACTIVE_ELEMENTS: [&str; 6] = ["script", "iframe", "object", "embed", "style", "link"];

/// Audits the last `appended` cards of the container with id `container_id`.
/// Cards the page already carried are the author's and are left alone.
pub fn assert_appended_cards_safe(
    html: &str,
    container_id: &str,
    appended: usize,
) -> anyhow::Result<()> {
    if appended == 0 {
        return Ok(());
    }
    let doc = dom::parse_document(html);
    let Some(container) = dom::find_by_id(&doc, container_id) else {
        anyhow::bail!("card audit failed: container #{container_id} is missing from the output");
    };
    let cards: Vec<NodeRef> = container
        .children()
        .filter(|node| dom::has_class(node, CARD_CLASS))
        .collect();
    if cards.len() < appended {
        anyhow::bail!(
            "card audit failed: expected {appended} cards in #{container_id}, found {}",
            cards.len()
        );
    }
    for card in &cards[cards.len() - appended..] {
        assert_card_safe(card)?;
    }
    Ok(())
}

fn assert_card_safe(card: &NodeRef) -> anyhow::Result<()> {
    for el in card.inclusive_descendants().elements() {
        let name = el.name.local.as_ref();
        if ACTIVE_ELEMENTS.contains(&name) {
            anyhow::bail!("card audit failed: <{name}> inside a feed card");
        }

        let attrs = el.attributes.borrow();
        for (attr_name, attr) in attrs.map.iter() {
            let attr_name = attr_name.local.as_ref();
            if attr_name.starts_with("on") {
                anyhow::bail!("card audit failed: <{name} {attr_name}> is an event handler");
            }
            if matches!(attr_name, "href" | "src") && !is_web_url(&attr.value) {
                anyhow::bail!(
                    "card audit failed: <{name} {attr_name}=\"{}\"> is not an http(s) url",
                    attr.value
                );
            }
        }

        if attrs.get("target") == Some("_blank") {
            let rel = attrs.get("rel").unwrap_or("");
            let has = |token: &str| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case(token));
            if !(has("noopener") && has("noreferrer")) {
                anyhow::bail!("card audit failed: <{name} target=_blank> without noopener noreferrer");
            }
        }
    }
    Ok(())
}
