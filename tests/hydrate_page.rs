use std::path::{Path, PathBuf};

use campaign_feed_hydrate::{CliArgs, HydrateOutcome, POPULATED_CLASS, ProgressMode};
use httpmock::Method::GET;
use httpmock::MockServer;
use tempfile::tempdir;
use url::Url;

const FEED_PATH: &str = "/api/facebook/feed";

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="da">
  <head><title>Soma Mayel</title></head>
  <body>
    <section class="facebook-wrapper">
      <div id="facebook-feed"></div>
      <div class="fb-page" data-href="https://www.facebook.com/SomamayelRV"></div>
    </section>
  </body>
</html>"#;

fn read_to_string(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn args(input: PathBuf, out: PathBuf, base_url: Url) -> CliArgs {
    CliArgs {
        input,
        base_url,
        feed_path: FEED_PATH.to_string(),
        out: Some(out),
        container_id: "facebook-feed".to_string(),
        fallback_selector: ".facebook-wrapper .fb-page".to_string(),
        user_agent: "test-agent".to_string(),
        progress: ProgressMode::Never,
    }
}

/// Serves `body` with `status` from the feed path, hydrates `page` and
/// returns the outcome and the written HTML.
async fn hydrate_with(status: u16, body: &str, page: &str) -> (HydrateOutcome, String, usize) {
    let server = MockServer::start();
    let feed = server.mock(|when, then| {
        when.method(GET).path(FEED_PATH);
        then.status(status)
            .header("Content-Type", "application/json")
            .body(body);
    });

    let tmp = tempdir().unwrap();
    let input = tmp.path().join("index.html");
    let out = tmp.path().join("out/index.html");
    std::fs::write(&input, page).unwrap();

    let base_url = Url::parse(&server.url("/")).unwrap();
    let outcome = campaign_feed_hydrate::run(args(input, out.clone(), base_url))
        .await
        .unwrap();
    (outcome, read_to_string(&out), feed.hits())
}

fn assert_fallback_only(html: &str) {
    assert!(!html.contains("fb-card"), "unexpected cards in {html}");
    assert!(!html.contains(POPULATED_CLASS));
    assert!(!html.contains("display: none"));
    assert!(html.contains(r#"<div class="fb-page""#));
}

#[tokio::test]
async fn hydrates_message_and_link_card() {
    let (outcome, html, hits) = hydrate_with(
        200,
        r#"{"posts":[{"message":"Hello","permalink_url":"https://x"}]}"#,
        INDEX_HTML,
    )
    .await;

    assert_eq!(hits, 1);
    assert_eq!(outcome, HydrateOutcome::Populated { cards: 1 });
    assert!(html.contains(POPULATED_CLASS));
    assert!(html.contains(r#"<p class="fb-card-message">Hello</p>"#));
    assert!(html.contains(r#"href="https://x""#));
    assert!(html.contains(r#"rel="noopener noreferrer""#));
    assert!(!html.contains("fb-card-image"));
    assert!(!html.contains("fb-card-date"));
    assert!(html.contains(r#"style="display: none;""#));
    assert!(html.contains("@keyframes fadeInUp"));
}

#[tokio::test]
async fn hydrates_date_only_card() {
    let (outcome, html, _) = hydrate_with(
        200,
        r#"{"posts":[{"created_time":"2024-03-01T00:00:00Z"}]}"#,
        INDEX_HTML,
    )
    .await;

    assert_eq!(outcome, HydrateOutcome::Populated { cards: 1 });
    assert!(html.contains(">1. marts 2024</time>"));
    assert!(!html.contains("fb-card-message"));
    assert!(!html.contains("fb-card-image"));
    assert!(!html.contains("fb-card-link"));
}

#[tokio::test]
async fn keeps_response_order() {
    let (outcome, html, _) = hydrate_with(
        200,
        r#"{"posts":[{"id":"a","message":"A"},{"id":"b","message":"B","full_picture":"https://cdn.example/b.jpg"},{"id":"c","message":"C"}]}"#,
        INDEX_HTML,
    )
    .await;

    assert_eq!(outcome, HydrateOutcome::Populated { cards: 3 });
    let a = html.find(r#"data-post-id="a""#).unwrap();
    let b = html.find(r#"data-post-id="b""#).unwrap();
    let c = html.find(r#"data-post-id="c""#).unwrap();
    assert!(a < b && b < c);
    assert_eq!(html.matches(r#"class="fb-card-image""#).count(), 1);
}

#[tokio::test]
async fn empty_feed_keeps_fallback() {
    let (outcome, html, hits) = hydrate_with(200, r#"{"posts":[]}"#, INDEX_HTML).await;
    assert_eq!(hits, 1);
    assert_eq!(outcome, HydrateOutcome::Fallback);
    assert_fallback_only(&html);
}

#[tokio::test]
async fn broken_feeds_behave_like_empty() {
    for (status, body) in [
        (200, "not json"),
        (200, r#"{"data":[]}"#),
        (200, r#"{"posts":"soon"}"#),
        (500, r#"{"posts":[{"message":"Hello"}]}"#),
        (404, "missing"),
    ] {
        let (outcome, html, _) = hydrate_with(status, body, INDEX_HTML).await;
        assert_eq!(outcome, HydrateOutcome::Fallback, "{status} {body}");
        assert_fallback_only(&html);
    }
}

#[tokio::test]
async fn pages_without_container_skip_the_request() {
    let page = "<!doctype html><html><head></head><body><main>Om Soma</main></body></html>";
    let (outcome, html, hits) =
        hydrate_with(200, r#"{"posts":[{"message":"Hello"}]}"#, page).await;
    assert_eq!(hits, 0);
    assert_eq!(outcome, HydrateOutcome::NoContainer);
    assert!(!html.contains("fb-card"));
}

#[tokio::test]
async fn unreachable_endpoint_keeps_fallback() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("index.html");
    let out = tmp.path().join("index.out.html");
    std::fs::write(&input, INDEX_HTML).unwrap();

    // Nothing listens on port 9 locally.
    let base_url = Url::parse("http://127.0.0.1:9/").unwrap();
    let outcome = campaign_feed_hydrate::run(args(input, out.clone(), base_url))
        .await
        .unwrap();
    assert_eq!(outcome, HydrateOutcome::Fallback);
    assert_fallback_only(&read_to_string(&out));
}

#[tokio::test]
async fn markup_in_messages_stays_text() {
    let (outcome, html, _) = hydrate_with(
        200,
        r#"{"posts":[{"message":"<script>alert(1)</script>","permalink_url":"javascript:alert(1)"}]}"#,
        INDEX_HTML,
    )
    .await;
    assert_eq!(outcome, HydrateOutcome::Populated { cards: 1 });
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("javascript:"));
    assert!(!html.contains("fb-card-link"));
}

#[tokio::test]
async fn authored_cards_with_relative_links_are_left_alone() {
    let populated = r#"<!doctype html><html><head></head><body>
<section class="facebook-wrapper">
  <div id="facebook-feed" class="has-posts"><article class="fb-card"><a href="/om">Om Soma</a></article></div>
  <div class="fb-page"></div>
</section></body></html>"#;
    let (outcome, html, hits) =
        hydrate_with(200, r#"{"posts":[{"message":"Hello"}]}"#, populated).await;
    assert_eq!(hits, 0);
    assert_eq!(outcome, HydrateOutcome::AlreadyPopulated);
    assert!(html.contains(r#"href="/om""#));

    let elsewhere = r#"<!doctype html><html><head></head><body>
<article class="fb-card"><a href="/nyheder">Nyheder</a></article>
<section class="facebook-wrapper">
  <div id="facebook-feed"></div>
  <div class="fb-page"></div>
</section></body></html>"#;
    let (outcome, _, _) = hydrate_with(200, r#"{"posts":[]}"#, elsewhere).await;
    assert_eq!(outcome, HydrateOutcome::Fallback);
    let (outcome, html, _) =
        hydrate_with(200, r#"{"posts":[{"message":"Hello"}]}"#, elsewhere).await;
    assert_eq!(outcome, HydrateOutcome::Populated { cards: 1 });
    assert!(html.contains(r#"href="/nyheder""#));
}
