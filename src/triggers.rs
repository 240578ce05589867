use anyhow::anyhow;
use kuchiki::{NodeRef, Selectors};

use crate::watcher::Layout;

/// What a handler is registered against.
pub enum Trigger {
    /// A click on any element matching the selector.
    Click(Selectors),
    Scroll,
}

impl Trigger {
    pub fn click(selector: &str) -> anyhow::Result<Self> {
        let selectors = Selectors::compile(selector)
            .map_err(|()| anyhow!("invalid click selector {selector:?}"))?;
        Ok(Trigger::Click(selectors))
    }

    fn matches(&self, event: &Event<'_>) -> bool {
        match (self, event) {
            (Trigger::Click(selectors), Event::Click { target }) => (*target)
                .clone()
                .into_element_ref()
                .is_some_and(|el| selectors.matches(&el)),
            (Trigger::Scroll, Event::Scroll { .. }) => true,
            _ => false,
        }
    }
}

pub enum Event<'a> {
    Click { target: &'a NodeRef },
    Scroll { y: f64, layout: &'a dyn Layout },
}

pub type Handler<S> = Box<dyn FnMut(&mut S, &Event<'_>)>;

/// Handlers in registration order. Dispatch runs every handler whose trigger
/// matches, synchronously, in that order.
pub struct Triggers<S> {
    handlers: Vec<(Trigger, Handler<S>)>,
}

impl<S> Default for Triggers<S> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<S> Triggers<S> {
    pub fn register<F>(&mut self, trigger: Trigger, handler: F)
    where
        F: FnMut(&mut S, &Event<'_>) + 'static,
    {
        self.handlers.push((trigger, Box::new(handler)));
    }

    /// Returns how many handlers ran.
    pub fn dispatch(&mut self, state: &mut S, event: &Event<'_>) -> usize {
        let mut ran = 0;
        for (trigger, handler) in &mut self.handlers {
            if trigger.matches(event) {
                handler(state, event);
                ran += 1;
            }
        }
        ran
    }
}
