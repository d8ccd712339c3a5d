//! # Chest GUI
//!
//! A runtime for chest-inventory user interfaces on block-game servers. The
//! host server reports clicks, drags, closes and ticks; this crate keeps the
//! model of every open GUI and tells the host what each player should see.
//!
//! ## Core Concepts
//!
//! - **Items**: a [`GuiItem`] is one interactive cell. It carries the stack the
//!   client shows, a movability flag, a change flag and the slot events bound
//!   to it.
//! - **Layers**: a [`GuiLayer`] is a named grid of optional items that may be
//!   larger than the inventory and scrolled. Overlay layers never scroll.
//! - **Containers**: a [`GuiContainer`] stacks layers (last added on top) and
//!   hosts modules. The item a player sees in a cell is the one from the
//!   topmost layer that has something there.
//! - **Modules**: [`GuiModule`] implementations hook into open, update and
//!   close to fill layers: paged lists, navigation buttons, periodic logic,
//!   trees and animations ship with the crate.
//! - **Sessions**: the [`GuiManager`] tracks the open container and the
//!   back/forward history of every player, renders to the [`GuiHost`] and
//!   routes raw interactions to slot events.
//!
//! ## Quick Start
//!
//! ```rust
//! use chest_gui::*;
//! use std::sync::Arc;
//!
//! let host = Arc::new(RecordingHost::new());
//! let manager = GuiManager::new(host.clone(), GuiSettings::default());
//! let player = PlayerId::new();
//!
//! let mut menu = manager.create_container("Main Menu", 3, 9).unwrap();
//! menu.add_layer(GuiLayer::new("buttons", 3, 9)).unwrap();
//! menu.set_item(
//!     2,
//!     5,
//!     GuiItem::new(ItemStack::new("minecraft:barrier").with_name("Close"))
//!         .with_event(Arc::new(CloseEvent::new())),
//! )
//! .unwrap();
//!
//! manager.open(player, ContainerHandle::new(menu)).unwrap();
//! assert_eq!(host.last_view(player).unwrap().title, "Main Menu");
//!
//! // Slot 13 is row 2, column 5
//! let outcome = manager.handle_click(
//!     player,
//!     &RawInteraction::new(13, ClickType::Left, InventoryAction::PickupAll),
//! );
//! assert!(outcome.cancelled);
//! assert!(manager.current(player).is_none());
//! ```
//!
//! ## Failure Handling
//!
//! Wiring mistakes (duplicate layer names, unknown modules, coordinates
//! outside a grid) are reported as [`GuiError`]s where they happen. Failures
//! inside slot events and module hooks, including panics, are logged and
//! isolated: sibling handlers still run and the player gets one generic
//! failure message per pass.

pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod event;
pub mod host;
pub mod item;
pub mod layer;
pub mod manager;
pub mod module;
pub mod navigation;
pub mod router;
pub mod scheduler;
pub mod search;
pub mod types;

pub use config::GuiSettings;
pub use container::{ContainerHandle, ContainerId, GuiContainer, SlotMatch, MAX_COLS, MAX_ROWS};
pub use context::{GuiAction, GuiContext};
pub use error::{GuiError, GuiResult};
pub use event::builtin::{
    CallbackEvent, ClearLayerEvent, CloseEvent, GiveItemEvent, ListPageEvent, MessageEvent, NavDirection,
    NavigateEvent, OpenEvent, OpenNewEvent, PageTurn, PlaySoundEvent, RenameEvent, ScrollEvent,
};
pub use event::{ClickFilter, ClickInfo, EventToken, GuiEvent, SlotEvents};
pub use host::{GuiHost, HostCall, RecordingHost, RenderSnapshot};
pub use item::{GuiItem, ItemId};
pub use layer::GuiLayer;
pub use manager::{GuiManager, PlayerGui};
pub use module::animation::AnimationModule;
pub use module::list::{ListArea, ListModule};
pub use module::navigation::NavigationModule;
pub use module::runtime::RuntimeModule;
pub use module::tree::{branch_path, BranchStyle, TreeModule, TreeNode};
pub use module::{GuiModule, ModuleId};
pub use navigation::NavigationSystem;
pub use router::{ClickOutcome, MoveLimit, RawDrag, RawInteraction};
pub use scheduler::{TaskHandle, TickScheduler};
pub use types::{ClickType, InventoryAction, ItemStack, PlayerId, Sound};
