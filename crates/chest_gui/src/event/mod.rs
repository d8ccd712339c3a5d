//! Slot events: behaviour bound to a single GUI cell.
//!
//! A [`GuiItem`](crate::GuiItem) carries a [`SlotEvents`] set. When the
//! interaction router resolves a click onto that item, every bound event runs
//! in insertion order. Each event decides for itself whether the click type
//! concerns it (see [`ClickFilter`]), and a failing event never stops its
//! siblings.

pub mod builtin;

use crate::container::GuiContainer;
use crate::context::GuiContext;
use crate::error::{GuiError, GuiResult};
use crate::types::{ClickType, InventoryAction, ItemStack};
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Click information
// ============================================================================

/// Allow-list of click types an event reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickFilter {
    accepted: HashSet<ClickType>,
}

impl ClickFilter {
    pub fn only<I: IntoIterator<Item = ClickType>>(clicks: I) -> Self {
        Self {
            accepted: clicks.into_iter().collect(),
        }
    }

    /// Accepts every click type, keyboard ones included.
    pub fn any() -> Self {
        Self::only([
            ClickType::Left,
            ClickType::ShiftLeft,
            ClickType::Right,
            ClickType::ShiftRight,
            ClickType::WindowBorderLeft,
            ClickType::WindowBorderRight,
            ClickType::Middle,
            ClickType::NumberKey,
            ClickType::DoubleClick,
            ClickType::Drop,
            ClickType::ControlDrop,
            ClickType::Creative,
            ClickType::SwapOffhand,
            ClickType::Unknown,
        ])
    }

    pub fn accepts(&self, click: ClickType) -> bool {
        self.accepted.contains(&click)
    }
}

impl Default for ClickFilter {
    fn default() -> Self {
        Self::only([
            ClickType::Left,
            ClickType::Right,
            ClickType::Middle,
            ClickType::ShiftLeft,
            ClickType::ShiftRight,
        ])
    }
}

/// A click after it has been resolved onto the container grid.
#[derive(Debug, Clone)]
pub struct ClickInfo {
    /// Linear viewport slot, row-major from 0
    pub slot: usize,
    /// 1-based viewport row
    pub row: usize,
    /// 1-based viewport column
    pub col: usize,
    pub click: ClickType,
    pub action: InventoryAction,
    /// Name of the topmost layer holding an item at the clicked cell
    pub layer: Option<String>,
    /// Item on the player's cursor, if the host reported one
    pub cursor: Option<ItemStack>,
}

// ============================================================================
// Event trait
// ============================================================================

/// Behaviour bound to a GUI cell.
pub trait GuiEvent: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether this event reacts to the given click type.
    fn accepts(&self, click: ClickType) -> bool {
        ClickFilter::default().accepts(click)
    }

    /// Runs the event. Container changes happen directly on `container`;
    /// anything touching other containers goes through `ctx`.
    fn execute(
        &self,
        container: &mut GuiContainer,
        ctx: &mut GuiContext<'_>,
        click: &ClickInfo,
    ) -> GuiResult<()>;
}

static NEXT_EVENT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Handle returned when an event is bound to a slot; used to unbind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventToken(u64);

impl EventToken {
    fn next() -> Self {
        Self(NEXT_EVENT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Event set
// ============================================================================

/// Ordered set of events bound to one slot.
///
/// Insertion order is dispatch order. Binding the same `Arc` twice is a no-op
/// that returns the original token.
#[derive(Clone, Default)]
pub struct SlotEvents {
    events: Vec<(EventToken, Arc<dyn GuiEvent>)>,
}

impl SlotEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: Arc<dyn GuiEvent>) -> EventToken {
        if let Some((token, _)) = self.events.iter().find(|(_, e)| Arc::ptr_eq(e, &event)) {
            return *token;
        }
        let token = EventToken::next();
        self.events.push((token, event));
        token
    }

    pub fn remove(&mut self, token: EventToken) -> bool {
        let before = self.events.len();
        self.events.retain(|(t, _)| *t != token);
        self.events.len() != before
    }

    pub fn contains(&self, token: EventToken) -> bool {
        self.events.iter().any(|(t, _)| *t == token)
    }

    pub fn contains_event(&self, event: &Arc<dyn GuiEvent>) -> bool {
        self.events.iter().any(|(_, e)| Arc::ptr_eq(e, event))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Cheap copy of the bound events, detached from the owning item so they
    /// can run against a mutably borrowed container.
    pub fn snapshot(&self) -> Vec<Arc<dyn GuiEvent>> {
        self.events.iter().map(|(_, e)| e.clone()).collect()
    }

    /// Runs every bound event against `container`. See [`fire_events`].
    pub fn execute(
        &self,
        container: &mut GuiContainer,
        ctx: &mut GuiContext<'_>,
        click: &ClickInfo,
    ) -> usize {
        fire_events(&self.snapshot(), container, ctx, click)
    }
}

/// Runs `events` in order, skipping those that do not accept the click.
///
/// Errors and panics are isolated per event and recorded on the context.
/// Returns how many events ran (failed ones included).
pub fn fire_events(
    events: &[Arc<dyn GuiEvent>],
    container: &mut GuiContainer,
    ctx: &mut GuiContext<'_>,
    click: &ClickInfo,
) -> usize {
    let mut executed = 0;
    for event in events {
        if !event.accepts(click.click) {
            continue;
        }
        executed += 1;
        debug!("Firing slot event '{}' at slot {}", event.name(), click.slot);

        let result = catch_unwind(AssertUnwindSafe(|| event.execute(container, ctx, click)))
            .unwrap_or_else(|panic| Err(GuiError::from_panic(panic)));

        if let Err(e) = result {
            ctx.report_failure(&format!("Slot event '{}'", event.name()), &e);
        }
    }
    executed
}
