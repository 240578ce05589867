use std::fmt::Write as _;

use chrono::{DateTime, Datelike as _, FixedOffset, Locale, SecondsFormat};
use maud::{Markup, html};

use crate::post::PostRecord;

pub const MESSAGE_LIMIT: usize = 220;
pub const CARD_CLASS: &str = "fb-card";

const ELLIPSIS: char = '…';
const IMAGE_ALT: &str = "Facebook opslag";
const LINK_LABEL: &str = "Læs på Facebook →";
const DATE_LOCALE: Locale = Locale::da_DK;
const DATE_FORMAT: &str = "%-d. %B %Y";

/// Renders one post into a self-contained card.
///
/// Each part is present only when its field is. All text goes through maud's
/// escaping, so remote content never becomes markup.
pub fn render_post(post: &PostRecord) -> Markup {
    let date = post.created_at.as_deref().map(|raw| {
        let parsed = parse_post_time(raw);
        let datetime = parsed.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true));
        let text = parsed.map(|t| format_date(&t)).unwrap_or_default();
        (datetime, text)
    });

    html! {
        article class=(CARD_CLASS) data-post-id=[post.id.as_deref()] {
            @if let Some(src) = post.image_url.as_deref() {
                div class="fb-card-image" {
                    img src=(src) alt=(IMAGE_ALT);
                }
            }
            div class="fb-card-content" {
                @if let Some((datetime, text)) = &date {
                    time class="fb-card-date" datetime=[datetime.as_deref()] { (text) }
                }
                @if let Some(message) = post.message.as_deref() {
                    p class="fb-card-message" { (truncate_message(message, MESSAGE_LIMIT)) }
                }
                @if let Some(href) = post.permalink_url.as_deref() {
                    a class="fb-card-link" href=(href) target="_blank" rel="noopener noreferrer" {
                        (LINK_LABEL)
                    }
                }
            }
        }
    }
}

/// Renders every post, in order, into one fragment.
pub fn render_cards(posts: &[PostRecord]) -> Markup {
    html! {
        @for post in posts {
            (render_post(post))
        }
    }
}

/// Keeps `text` as-is up to `limit` characters. Longer text keeps its first
/// `limit - 1` characters followed by a single ellipsis.
pub fn truncate_message(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some(_) => {
            let keep = limit.saturating_sub(1);
            let mut out: String = text.chars().take(keep).collect();
            out.push(ELLIPSIS);
            out
        }
    }
}

/// Long Danish date (`1. marts 2024`), or an empty string when the input
/// cannot be understood.
pub fn format_post_date(raw: &str) -> String {
    parse_post_time(raw)
        .map(|t| format_date(&t))
        .unwrap_or_default()
}

fn parse_post_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()?;
    // Zero time is what the feed server emits when it could not parse a date.
    if parsed.year() <= 1 {
        return None;
    }
    Some(parsed)
}

fn format_date(t: &DateTime<FixedOffset>) -> String {
    let mut out = String::new();
    if write!(out, "{}", t.format_localized(DATE_FORMAT, DATE_LOCALE)).is_err() {
        return String::new();
    }
    out
}
