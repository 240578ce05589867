//! Scroll and menu state for the page chrome, as pure transitions.

pub const NAVBAR_SCROLL_OFFSET: f64 = 50.0;
pub const HERO_PAUSE_OFFSET: f64 = 100.0;

pub fn navbar_scrolled(scroll_y: f64) -> bool {
    scroll_y > NAVBAR_SCROLL_OFFSET
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroState {
    pub playing: bool,
}

impl Default for HeroState {
    fn default() -> Self {
        Self { playing: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeroAction {
    Pause { opacity: f64 },
    Play,
}

/// Pauses the hero video once the page scrolls past it and resumes it when
/// the page returns to the top. Nothing happens between transitions.
pub fn hero_on_scroll(
    state: HeroState,
    scroll_y: f64,
    hero_height: f64,
) -> (HeroState, Option<HeroAction>) {
    if scroll_y > HERO_PAUSE_OFFSET && state.playing {
        let opacity = if hero_height > 0.0 {
            (1.0 - scroll_y / hero_height).max(0.0)
        } else {
            0.0
        };
        (HeroState { playing: false }, Some(HeroAction::Pause { opacity }))
    } else if scroll_y <= HERO_PAUSE_OFFSET && !state.playing {
        (HeroState { playing: true }, Some(HeroAction::Play))
    } else {
        (state, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
    pub open: bool,
}

/// Inline styles for the three hamburger bars: `(property, value)` each.
pub type BarStyles = [(&'static str, &'static str); 3];

const BARS_OPEN: BarStyles = [
    ("transform", "rotate(45deg) translateY(8px)"),
    ("opacity", "0"),
    ("transform", "rotate(-45deg) translateY(-8px)"),
];

const BARS_CLOSED: BarStyles = [("transform", "none"), ("opacity", "1"), ("transform", "none")];

impl MenuState {
    pub fn toggled(self) -> Self {
        Self { open: !self.open }
    }

    pub fn closed() -> Self {
        Self { open: false }
    }

    pub fn bar_styles(self) -> BarStyles {
        if self.open { BARS_OPEN } else { BARS_CLOSED }
    }
}
