//! One-shot viewport intersection watching.
//!
//! The document tree has no layout of its own, so geometry comes from a
//! [`Layout`]. A watched element fires its callback the first time it
//! intersects the (margin-adjusted) viewport at or above the threshold and is
//! then dropped from the watch list.

use std::rc::Rc;

use kuchiki::NodeRef;

use crate::dom;

pub const ENTRANCE_ANIMATION: &str = "fadeInUp 0.6s ease forwards";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rects. Touching edges count as a zero-area overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    fn grow(&self, m: &Margin) -> Rect {
        Rect::new(
            self.x - m.left,
            self.y - m.top,
            self.width + m.left + m.right,
            self.height + m.top + m.bottom,
        )
    }
}

/// Root margin in px. Positive values grow the viewport, negative shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn bottom(px: f64) -> Self {
        Self {
            top: 0.0,
            right: 0.0,
            bottom: px,
            left: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Fraction of the element's area that must be visible.
    pub threshold: f64,
    pub margin: Margin,
}

impl WatchOptions {
    /// Start loading slightly before an image scrolls in.
    pub const LAZY_IMAGES: WatchOptions = WatchOptions {
        threshold: 0.0,
        margin: Margin::bottom(50.0),
    };

    /// Animate once a tenth of the element is well inside the viewport.
    pub const ENTRANCE: WatchOptions = WatchOptions {
        threshold: 0.1,
        margin: Margin::bottom(-50.0),
    };
}

/// Where elements sit on the page, in document coordinates.
pub trait Layout {
    fn bounds(&self, node: &NodeRef) -> Option<Rect>;
}

impl<F> Layout for F
where
    F: Fn(&NodeRef) -> Option<Rect>,
{
    fn bounds(&self, node: &NodeRef) -> Option<Rect> {
        self(node)
    }
}

pub type OnEnter = Rc<dyn Fn(&NodeRef)>;

pub struct IntersectionWatcher {
    options: WatchOptions,
    watched: Vec<(NodeRef, OnEnter)>,
}

impl IntersectionWatcher {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            watched: Vec::new(),
        }
    }

    pub fn options(&self) -> WatchOptions {
        self.options
    }

    /// Starts watching `elements`. Elements already being watched keep their
    /// original callback.
    pub fn watch<I, F>(&mut self, elements: I, on_enter: F)
    where
        I: IntoIterator<Item = NodeRef>,
        F: Fn(&NodeRef) + 'static,
    {
        let on_enter: OnEnter = Rc::new(on_enter);
        for node in elements {
            if self.is_watching(&node) {
                continue;
            }
            self.watched.push((node, on_enter.clone()));
        }
    }

    pub fn is_watching(&self, node: &NodeRef) -> bool {
        self.watched.iter().any(|(n, _)| n == node)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Fires callbacks for every watched element now visible in `viewport`
    /// and stops watching them. Returns how many fired.
    pub fn check(&mut self, viewport: Rect, layout: &dyn Layout) -> usize {
        let root = viewport.grow(&self.options.margin);
        let threshold = self.options.threshold;

        let mut entered = Vec::new();
        self.watched.retain(|(node, on_enter)| {
            let visible = layout
                .bounds(node)
                .is_some_and(|b| is_visible(&b, &root, threshold));
            if visible {
                entered.push((node.clone(), on_enter.clone()));
            }
            !visible
        });

        for (node, on_enter) in &entered {
            on_enter(node);
        }
        entered.len()
    }
}

fn is_visible(bounds: &Rect, root: &Rect, threshold: f64) -> bool {
    let Some(overlap) = bounds.intersection(root) else {
        return false;
    };
    let area = bounds.area();
    let ratio = if area == 0.0 { 1.0 } else { overlap.area() / area };
    ratio >= threshold
}

/// Swaps the placeholder source of a lazy image for the real one.
pub fn reveal_lazy_image(node: &NodeRef) {
    if let Some(src) = dom::attr(node, "data-src") {
        dom::set_attr(node, "src", src);
    }
    dom::add_class(node, "loaded");
}

pub fn play_entrance(node: &NodeRef) {
    dom::set_style(node, "animation", ENTRANCE_ANIMATION);
}
