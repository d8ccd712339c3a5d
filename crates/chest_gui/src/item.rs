//! A single interactive cell: display descriptors plus bound slot events.

use crate::event::{EventToken, GuiEvent, SlotEvents};
use crate::types::ItemStack;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`GuiItem`].
///
/// Two items holding equal stacks are still different items; modules that
/// need to know "is this still the item I placed" compare ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One interactive cell of a layer.
///
/// `base` is what the cell is meant to show; `view` is what is currently
/// rendered and may be swapped out per render (animations do this). Any write
/// to the view marks the item changed so the next diff push resends it.
pub struct GuiItem {
    id: ItemId,
    base: ItemStack,
    view: ItemStack,
    movable: bool,
    changed: bool,
    events: SlotEvents,
}

impl GuiItem {
    /// Creates an unmovable item with no events. Fresh items start changed.
    pub fn new(item: ItemStack) -> Self {
        Self {
            id: ItemId::next(),
            view: item.clone(),
            base: item,
            movable: false,
            changed: true,
            events: SlotEvents::new(),
        }
    }

    /// Builder form of [`GuiItem::set_movable`].
    pub fn movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    /// Builder form of [`GuiItem::add_event`].
    pub fn with_event(mut self, event: Arc<dyn GuiEvent>) -> Self {
        self.events.add(event);
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn base_item(&self) -> &ItemStack {
        &self.base
    }

    /// Replaces the base item only; the view keeps showing the old stack
    /// until [`GuiItem::reset_view_item`] or [`GuiItem::set_item`].
    pub fn set_base_item(&mut self, item: ItemStack) {
        self.base = item;
    }

    pub fn view_item(&self) -> &ItemStack {
        &self.view
    }

    pub fn set_view_item(&mut self, item: ItemStack) {
        self.view = item;
        self.changed = true;
    }

    /// Replaces both base and view.
    pub fn set_item(&mut self, item: ItemStack) {
        self.view = item.clone();
        self.base = item;
        self.changed = true;
    }

    /// Points the view back at the base item. Does not touch the changed flag.
    pub fn reset_view_item(&mut self) {
        self.view = self.base.clone();
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn set_movable(&mut self, movable: bool) {
        self.movable = movable;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    /// Returns the changed flag and clears it.
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }

    // Read-through accessors on the view item

    pub fn name(&self) -> &str {
        self.view.display_name()
    }

    pub fn lore(&self) -> &[String] {
        &self.view.lore
    }

    pub fn amount(&self) -> u8 {
        self.view.amount
    }

    pub fn material(&self) -> &str {
        &self.view.material
    }

    pub fn meta(&self) -> &BTreeMap<String, Value> {
        &self.view.meta
    }

    // Events

    pub fn events(&self) -> &SlotEvents {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut SlotEvents {
        &mut self.events
    }

    pub fn add_event(&mut self, event: Arc<dyn GuiEvent>) -> EventToken {
        self.events.add(event)
    }

    pub fn remove_event(&mut self, token: EventToken) -> bool {
        self.events.remove(token)
    }

    pub fn contains_event(&self, token: EventToken) -> bool {
        self.events.contains(token)
    }

    pub fn reset_events(&mut self) {
        self.events.clear();
    }
}

impl Clone for GuiItem {
    /// Clones get a fresh identity; events are shared by reference.
    fn clone(&self) -> Self {
        Self {
            id: ItemId::next(),
            base: self.base.clone(),
            view: self.view.clone(),
            movable: self.movable,
            changed: self.changed,
            events: self.events.clone(),
        }
    }
}

impl std::fmt::Debug for GuiItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuiItem")
            .field("id", &self.id)
            .field("view", &self.view.display_name())
            .field("movable", &self.movable)
            .field("changed", &self.changed)
            .field("events", &self.events.len())
            .finish()
    }
}

impl From<ItemStack> for GuiItem {
    fn from(item: ItemStack) -> Self {
        GuiItem::new(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::builtin::MessageEvent;

    #[test]
    fn test_view_defaults_to_base() {
        let item = GuiItem::new(ItemStack::new("minecraft:stone").with_name("Stone"));
        assert_eq!(item.view_item(), item.base_item());
        assert_eq!(item.name(), "Stone");
        assert!(item.is_changed());
        assert!(!item.is_movable());
    }

    #[test]
    fn test_view_override_and_reset() {
        let mut item = GuiItem::new(ItemStack::new("minecraft:stone"));
        assert!(item.take_changed());
        assert!(!item.is_changed());

        item.set_view_item(ItemStack::new("minecraft:glass"));
        assert!(item.is_changed());
        assert_eq!(item.material(), "minecraft:glass");
        assert_eq!(item.base_item().material, "minecraft:stone");

        item.set_changed(false);
        item.reset_view_item();
        assert_eq!(item.material(), "minecraft:stone");
        // Resetting leaves flag handling to the caller
        assert!(!item.is_changed());
    }

    #[test]
    fn test_set_item_replaces_both() {
        let mut item = GuiItem::new(ItemStack::new("minecraft:stone"));
        item.set_changed(false);
        item.set_item(ItemStack::new("minecraft:dirt").with_amount(4));
        assert_eq!(item.base_item().material, "minecraft:dirt");
        assert_eq!(item.amount(), 4);
        assert!(item.is_changed());
    }

    #[test]
    fn test_clone_has_new_identity() {
        let item = GuiItem::new(ItemStack::new("minecraft:stone"));
        let copy = item.clone();
        assert_ne!(item.id(), copy.id());
        assert_eq!(item.view_item(), copy.view_item());
    }

    #[test]
    fn test_event_binding() {
        let mut item = GuiItem::new(ItemStack::new("minecraft:paper"));
        let event: Arc<dyn GuiEvent> = Arc::new(MessageEvent::new("hi"));
        let token = item.add_event(event.clone());
        assert_eq!(item.add_event(event), token);
        assert!(item.contains_event(token));
        assert_eq!(item.events().len(), 1);

        assert!(item.remove_event(token));
        assert!(!item.contains_event(token));

        item.add_event(Arc::new(MessageEvent::new("a")));
        item.reset_events();
        assert!(item.events().is_empty());
    }
}
