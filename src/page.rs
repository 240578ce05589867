//! A page session: the document plus everything the site's script wires up
//! on load (menu toggle, scroll effects, lazy images, entrance animations and
//! the feed).

use kuchiki::NodeRef;

use crate::builtin;
use crate::dom;
use crate::effects::{self, HeroAction, HeroState, MenuState};
use crate::hydrate::{HydrateOutcome, Hydrator};
use crate::triggers::{Event, Trigger, Triggers};
use crate::watcher::{self, IntersectionWatcher, Layout, Rect, WatchOptions};

pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";
pub const ENTRANCE_SELECTOR: &str = ".issue-card, .news-card, .intro-wrapper, .fb-card";

const NAV_TOGGLE_ID: &str = "navToggle";
const NAV_MENU_ID: &str = "navMenu";
const NAVBAR_ID: &str = "navbar";
const HERO_ID: &str = "heroVideo";
const HERO_VIDEO_ID: &str = "heroVideoElement";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    fn at(&self, scroll_y: f64) -> Rect {
        Rect::new(0.0, scroll_y, self.width, self.height)
    }
}

/// State the handlers read and write.
pub struct Session {
    pub document: NodeRef,
    pub viewport: Viewport,
    pub hero: HeroState,
    pub menu: MenuState,
    pub images: IntersectionWatcher,
    pub entrances: IntersectionWatcher,
}

pub struct Page {
    session: Session,
    triggers: Triggers<Session>,
    scroll_y: f64,
}

impl Page {
    pub fn parse(html: &str, viewport: Viewport) -> anyhow::Result<Self> {
        Self::from_document(dom::parse_document(html), viewport)
    }

    pub fn from_document(document: NodeRef, viewport: Viewport) -> anyhow::Result<Self> {
        install_effects_style(&document);

        let mut images = IntersectionWatcher::new(WatchOptions::LAZY_IMAGES);
        images.watch(
            dom::select_all(&document, LAZY_IMAGE_SELECTOR)?,
            watcher::reveal_lazy_image,
        );
        let mut entrances = IntersectionWatcher::new(WatchOptions::ENTRANCE);
        entrances.watch(
            dom::select_all(&document, ENTRANCE_SELECTOR)?,
            watcher::play_entrance,
        );

        let menu = MenuState {
            open: dom::find_by_id(&document, NAV_MENU_ID)
                .is_some_and(|m| dom::has_class(&m, "active")),
        };

        let mut triggers = Triggers::default();
        triggers.register(Trigger::click(&format!("#{NAV_TOGGLE_ID}"))?, toggle_menu);
        triggers.register(Trigger::click(".nav-link")?, close_menu);
        triggers.register(Trigger::Scroll, mark_navbar);
        triggers.register(Trigger::Scroll, pause_hero);
        triggers.register(Trigger::Scroll, load_images);
        triggers.register(Trigger::Scroll, animate_entrances);

        tracing::debug!(
            lazy_images = images.len(),
            entrances = entrances.len(),
            "page wired"
        );

        Ok(Self {
            session: Session {
                document,
                viewport,
                hero: HeroState::default(),
                menu,
                images,
                entrances,
            },
            triggers,
            scroll_y: 0.0,
        })
    }

    pub fn document(&self) -> &NodeRef {
        &self.session.document
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn register(
        &mut self,
        trigger: Trigger,
        handler: impl FnMut(&mut Session, &Event<'_>) + 'static,
    ) {
        self.triggers.register(trigger, handler);
    }

    /// Returns how many handlers ran.
    pub fn click(&mut self, target: &NodeRef) -> usize {
        self.triggers
            .dispatch(&mut self.session, &Event::Click { target })
    }

    pub fn click_id(&mut self, id: &str) -> usize {
        match dom::find_by_id(&self.session.document, id) {
            Some(target) => self.click(&target),
            None => 0,
        }
    }

    /// Moves the viewport to `y` and runs the scroll handlers.
    pub fn scroll_to(&mut self, y: f64, layout: &dyn Layout) -> usize {
        self.scroll_y = y;
        self.triggers
            .dispatch(&mut self.session, &Event::Scroll { y, layout })
    }

    pub async fn hydrate_feed(&mut self, hydrator: &Hydrator) -> HydrateOutcome {
        hydrator
            .hydrate(&self.session.document, &mut self.session.entrances)
            .await
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        dom::serialize(&self.session.document)
    }
}

fn install_effects_style(document: &NodeRef) {
    let marker = format!("style[{}]", builtin::STYLE_MARKER);
    if matches!(dom::select_first(document, &marker), Ok(Some(_))) {
        return;
    }
    let Ok(Some(head)) = dom::select_first(document, "head") else {
        return;
    };
    let snippet = dom::parse_document(&format!(
        "<style {}>{}</style>",
        builtin::STYLE_MARKER,
        builtin::FADE_IN_UP_CSS
    ));
    if let Ok(Some(style)) = dom::select_first(&snippet, "style") {
        head.append(style);
    }
}

fn toggle_menu(s: &mut Session, _: &Event<'_>) {
    let Some(menu) = dom::find_by_id(&s.document, NAV_MENU_ID) else {
        return;
    };
    s.menu = s.menu.toggled();
    if s.menu.open {
        dom::add_class(&menu, "active");
    } else {
        dom::remove_class(&menu, "active");
    }
    style_menu_bars(s);
}

fn close_menu(s: &mut Session, _: &Event<'_>) {
    if let Some(menu) = dom::find_by_id(&s.document, NAV_MENU_ID) {
        dom::remove_class(&menu, "active");
    }
    s.menu = MenuState::closed();
    style_menu_bars(s);
}

fn style_menu_bars(s: &Session) {
    let Some(toggle) = dom::find_by_id(&s.document, NAV_TOGGLE_ID) else {
        return;
    };
    let Ok(bars) = dom::select_all(&toggle, "span") else {
        return;
    };
    for (bar, (property, value)) in bars.iter().zip(s.menu.bar_styles()) {
        dom::set_style(bar, property, value);
    }
}

fn mark_navbar(s: &mut Session, event: &Event<'_>) {
    let Event::Scroll { y, .. } = event else {
        return;
    };
    let Some(navbar) = dom::find_by_id(&s.document, NAVBAR_ID) else {
        return;
    };
    if effects::navbar_scrolled(*y) {
        dom::add_class(&navbar, "scrolled");
    } else {
        dom::remove_class(&navbar, "scrolled");
    }
}

fn pause_hero(s: &mut Session, event: &Event<'_>) {
    let Event::Scroll { y, layout } = event else {
        return;
    };
    let (Some(hero), Some(video)) = (
        dom::find_by_id(&s.document, HERO_ID),
        dom::find_by_id(&s.document, HERO_VIDEO_ID),
    ) else {
        return;
    };

    let hero_height = layout.bounds(&hero).map_or(0.0, |b| b.height);
    let (state, action) = effects::hero_on_scroll(s.hero, *y, hero_height);
    s.hero = state;

    match action {
        Some(HeroAction::Pause { opacity }) => {
            dom::set_attr(&video, "data-state", "paused");
            dom::set_style(&hero, "opacity", &opacity.to_string());
        }
        Some(HeroAction::Play) => {
            dom::set_attr(&video, "data-state", "playing");
            dom::set_style(&hero, "opacity", "1");
        }
        None => {}
    }
}

fn load_images(s: &mut Session, event: &Event<'_>) {
    if let Event::Scroll { y, layout } = event {
        let loaded = s.images.check(s.viewport.at(*y), *layout);
        if loaded > 0 {
            tracing::trace!(loaded, "lazy images revealed");
        }
    }
}

fn animate_entrances(s: &mut Session, event: &Event<'_>) {
    if let Event::Scroll { y, layout } = event {
        s.entrances.check(s.viewport.at(*y), *layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head><title>Soma</title></head><body>
<nav id="navbar">
  <button id="navToggle"><span></span><span></span><span></span></button>
  <ul id="navMenu"><li><a class="nav-link" href="/om">Om</a></li></ul>
</nav>
<section id="heroVideo"><video id="heroVideoElement" autoplay muted></video></section>
<main id="mainContent">
  <div class="issue-card" id="issue"></div>
  <img id="pic" src="placeholder.gif" data-src="soma.jpg">
</main>
</body></html>"#;

    fn layout(node: &NodeRef) -> Option<Rect> {
        match dom::attr(node, "id")?.as_str() {
            "heroVideo" => Some(Rect::new(0.0, 0.0, 1280.0, 600.0)),
            "issue" => Some(Rect::new(0.0, 1000.0, 400.0, 300.0)),
            "pic" => Some(Rect::new(0.0, 1600.0, 400.0, 300.0)),
            _ => None,
        }
    }

    fn page() -> Page {
        Page::parse(PAGE, Viewport::default()).unwrap()
    }

    fn by_id(page: &Page, id: &str) -> NodeRef {
        dom::find_by_id(page.document(), id).unwrap()
    }

    #[test]
    fn installs_keyframes_once() {
        let page = page();
        let html = page.to_html().unwrap();
        assert_eq!(html.matches("@keyframes fadeInUp").count(), 1);

        let again = Page::from_document(page.document().clone(), Viewport::default()).unwrap();
        let html = again.to_html().unwrap();
        assert_eq!(html.matches("@keyframes fadeInUp").count(), 1);
    }

    #[test]
    fn menu_toggles_and_link_closes() {
        let mut page = page();
        let menu = by_id(&page, "navMenu");

        assert_eq!(page.click_id("navToggle"), 1);
        assert!(dom::has_class(&menu, "active"));
        assert!(page.session().menu.open);
        let bars = dom::select_all(&by_id(&page, "navToggle"), "span").unwrap();
        assert_eq!(dom::style(&bars[1], "opacity").as_deref(), Some("0"));

        let link = dom::select_first(page.document(), ".nav-link").unwrap().unwrap();
        page.click(&link);
        assert!(!dom::has_class(&menu, "active"));
        assert!(!page.session().menu.open);
        assert_eq!(dom::style(&bars[0], "transform").as_deref(), Some("none"));

        assert_eq!(page.click_id("missing"), 0);
    }

    #[test]
    fn menu_open_in_markup_starts_open() {
        let mut page = Page::parse(
            r#"<button id="navToggle"><span></span><span></span><span></span></button><ul id="navMenu" class="nav-menu active"></ul>"#,
            Viewport::default(),
        )
        .unwrap();
        assert!(page.session().menu.open);

        page.click_id("navToggle");
        assert!(!page.session().menu.open);
        assert!(!dom::has_class(&by_id(&page, "navMenu"), "active"));
    }

    #[test]
    fn scroll_effects() {
        let mut page = page();
        let navbar = by_id(&page, "navbar");
        let hero = by_id(&page, "heroVideo");
        let video = by_id(&page, "heroVideoElement");

        page.scroll_to(40.0, &layout);
        assert!(!dom::has_class(&navbar, "scrolled"));
        assert!(page.session().hero.playing);

        page.scroll_to(300.0, &layout);
        assert!(dom::has_class(&navbar, "scrolled"));
        assert!(!page.session().hero.playing);
        assert_eq!(dom::attr(&video, "data-state").as_deref(), Some("paused"));
        assert_eq!(dom::style(&hero, "opacity").as_deref(), Some("0.5"));

        page.scroll_to(0.0, &layout);
        assert!(page.session().hero.playing);
        assert_eq!(dom::attr(&video, "data-state").as_deref(), Some("playing"));
        assert_eq!(dom::style(&hero, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn lazy_images_and_entrances_fire_once() {
        let mut page = page();
        let pic = by_id(&page, "pic");
        let issue = by_id(&page, "issue");

        page.scroll_to(0.0, &layout);
        assert_eq!(dom::attr(&pic, "src").as_deref(), Some("placeholder.gif"));
        assert_eq!(dom::style(&issue, "animation"), None);

        page.scroll_to(800.0, &layout);
        assert!(dom::style(&issue, "animation").is_some());
        assert!(page.session().entrances.is_empty());
        // Image top at 1600, viewport bottom 1600 plus 50px margin.
        assert_eq!(dom::attr(&pic, "src").as_deref(), Some("soma.jpg"));
        assert!(page.session().images.is_empty());

        // Clearing the style and scrolling back does not replay it.
        dom::set_style(&issue, "animation", "none");
        page.scroll_to(0.0, &layout);
        page.scroll_to(800.0, &layout);
        assert_eq!(dom::style(&issue, "animation").as_deref(), Some("none"));
    }

    #[test]
    fn extra_handlers_run_after_built_ins() {
        let mut page = page();
        page.register(Trigger::Scroll, |s, _| {
            let navbar = dom::find_by_id(&s.document, "navbar").unwrap();
            assert!(dom::has_class(&navbar, "scrolled"));
            dom::add_class(&navbar, "seen");
        });
        page.scroll_to(200.0, &layout);
        assert!(dom::has_class(&by_id(&page, "navbar"), "seen"));
    }
}
