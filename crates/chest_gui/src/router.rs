//! Raw inventory interactions in, slot events out.
//!
//! The host adapter forwards every click and drag on a GUI view. The router
//! maps the raw slot onto the viewport, decides whether the host should cancel
//! the vanilla item movement, mirrors permitted movements into the layer model
//! and fires the events bound to the clicked cell.

use crate::container::GuiContainer;
use crate::event::{fire_events, ClickInfo};
use crate::item::GuiItem;
use crate::manager::GuiManager;
use crate::types::{ClickType, InventoryAction, ItemStack, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// How far players may move items in and out of the top inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveLimit {
    /// Nothing moves; every top-inventory interaction is cancelled
    #[default]
    Locked,
    /// Movable items may be taken and empty cells may be filled
    MovableOnly,
    /// Vanilla behaviour everywhere
    Free,
}

/// A click as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInteraction {
    /// Raw slot in the combined view: the GUI's cells first, then the
    /// player's own inventory
    pub slot: usize,
    pub click: ClickType,
    pub action: InventoryAction,
    /// Item on the cursor before the click
    pub cursor: Option<ItemStack>,
}

impl RawInteraction {
    pub fn new(slot: usize, click: ClickType, action: InventoryAction) -> Self {
        Self {
            slot,
            click,
            action,
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: ItemStack) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// A drag as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDrag {
    /// Raw slots the drag spread items over
    pub slots: Vec<usize>,
    pub cursor: Option<ItemStack>,
}

/// What the host adapter should do with the vanilla interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickOutcome {
    /// The host must cancel the vanilla item movement
    pub cancelled: bool,
    /// Slot events that ran
    pub events_fired: usize,
    /// Layer holding the clicked item, if any
    pub layer: Option<String>,
}

impl ClickOutcome {
    fn cancelled(cancelled: bool) -> Self {
        Self {
            cancelled,
            ..Self::default()
        }
    }
}

/// Routes a click on the player's open GUI. Clicks without an open GUI are
/// left alone.
pub fn route_click(manager: &GuiManager, player: PlayerId, raw: &RawInteraction) -> ClickOutcome {
    let Some(handle) = manager.current(player) else {
        return ClickOutcome::default();
    };
    let policy = manager.settings().move_limit;

    let outcome = manager.with_container(player, &handle, |container, ctx| {
        if raw.slot >= container.size() {
            return ClickOutcome::cancelled(cancels_bottom_click(policy, raw));
        }

        let row = container.slot_to_row(raw.slot);
        let col = container.slot_to_col(raw.slot);
        let resolved = container
            .resolve(row, col)
            .map(|(layer, item)| (layer.name().to_string(), item.is_movable(), item.events().snapshot()));

        let movable = resolved.as_ref().map(|(_, movable, _)| *movable);
        let cancelled = cancels_top_click(policy, raw, movable);
        if !cancelled {
            mirror_click(container, row, col, raw);
        }

        let (layer, events) = match resolved {
            Some((layer, _, events)) => (Some(layer), events),
            None => (None, Vec::new()),
        };
        trace!(
            "Player {} clicked slot {} ({}, {}) layer {:?}, {} events",
            player,
            raw.slot,
            row,
            col,
            layer,
            events.len()
        );

        let info = ClickInfo {
            slot: raw.slot,
            row,
            col,
            click: raw.click,
            action: raw.action,
            layer: layer.clone(),
            cursor: raw.cursor.clone(),
        };
        let events_fired = fire_events(&events, container, ctx, &info);

        ClickOutcome {
            cancelled,
            events_fired,
            layer,
        }
    });

    if manager.is_current(player, &handle) {
        if let Err(e) = manager.update(player) {
            warn!("Post-click update failed for player {}: {}", player, e);
        }
    }
    outcome
}

/// Routes a drag. Drags never fire events; they are only allowed to reach
/// the GUI under [`MoveLimit::Free`].
pub fn route_drag(manager: &GuiManager, player: PlayerId, drag: &RawDrag) -> ClickOutcome {
    let Some(handle) = manager.current(player) else {
        return ClickOutcome::default();
    };
    let size = handle.lock().size();
    let touches_gui = drag.slots.iter().any(|&slot| slot < size);
    ClickOutcome::cancelled(touches_gui && manager.settings().move_limit != MoveLimit::Free)
}

/// Clicks in the player's own inventory only matter when they would push
/// items into the GUI.
fn cancels_bottom_click(policy: MoveLimit, raw: &RawInteraction) -> bool {
    if policy == MoveLimit::Free {
        return false;
    }
    raw.click.is_shift()
        || matches!(
            raw.action,
            InventoryAction::MoveToOtherInventory | InventoryAction::CollectToCursor
        )
}

fn cancels_top_click(policy: MoveLimit, raw: &RawInteraction, movable: Option<bool>) -> bool {
    match policy {
        MoveLimit::Locked => true,
        MoveLimit::Free => false,
        MoveLimit::MovableOnly => match (raw.action, movable) {
            (InventoryAction::PickupAll, Some(true)) => false,
            (InventoryAction::SwapWithCursor, Some(true)) => raw.cursor.is_none(),
            (action, None) if action.is_place() => raw.cursor.is_none(),
            _ => true,
        },
    }
}

/// Applies an allowed vanilla movement to the layer model so the next
/// render agrees with what the client shows.
fn mirror_click(container: &mut GuiContainer, row: usize, col: usize, raw: &RawInteraction) {
    match raw.action {
        InventoryAction::PickupAll => {
            container.remove_item(row, col);
        }
        InventoryAction::SwapWithCursor => {
            if let (Some(item), Some(cursor)) = (container.get_item_mut(row, col), raw.cursor.clone()) {
                item.set_item(cursor);
            }
        }
        InventoryAction::PlaceAll | InventoryAction::PlaceSome | InventoryAction::PlaceOne => {
            let Some(mut cursor) = raw.cursor.clone() else {
                return;
            };
            if raw.action == InventoryAction::PlaceOne {
                cursor.amount = 1;
            }
            if container.get_item(row, col).is_none() {
                if let Err(e) = container.set_item(row, col, GuiItem::new(cursor).movable(true)) {
                    warn!("Could not mirror placement at ({}, {}): {}", row, col, e);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(action: InventoryAction) -> RawInteraction {
        RawInteraction::new(0, ClickType::Left, action)
    }

    #[test]
    fn test_locked_cancels_everything_on_top() {
        assert!(cancels_top_click(MoveLimit::Locked, &click(InventoryAction::PickupAll), Some(true)));
        assert!(cancels_top_click(MoveLimit::Locked, &click(InventoryAction::Nothing), None));
    }

    #[test]
    fn test_movable_only_rules() {
        let policy = MoveLimit::MovableOnly;
        assert!(!cancels_top_click(policy, &click(InventoryAction::PickupAll), Some(true)));
        assert!(cancels_top_click(policy, &click(InventoryAction::PickupAll), Some(false)));
        assert!(cancels_top_click(policy, &click(InventoryAction::PickupHalf), Some(true)));

        let place = click(InventoryAction::PlaceAll).with_cursor(ItemStack::new("minecraft:dirt"));
        assert!(!cancels_top_click(policy, &place, None));
        assert!(cancels_top_click(policy, &place, Some(true)));
    }

    #[test]
    fn test_bottom_inventory_shift_moves() {
        let shift = RawInteraction::new(40, ClickType::ShiftLeft, InventoryAction::MoveToOtherInventory);
        assert!(cancels_bottom_click(MoveLimit::Locked, &shift));
        assert!(cancels_bottom_click(MoveLimit::MovableOnly, &shift));
        assert!(!cancels_bottom_click(MoveLimit::Free, &shift));

        let plain = RawInteraction::new(40, ClickType::Left, InventoryAction::PickupAll);
        assert!(!cancels_bottom_click(MoveLimit::Locked, &plain));
    }
}
