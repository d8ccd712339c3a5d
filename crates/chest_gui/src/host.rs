//! Outbound boundary to the host server.
//!
//! The runtime never talks to a client directly. Everything a player sees or
//! receives goes through a [`GuiHost`], which a server adapter implements on
//! top of its own inventory and chat APIs.

use crate::types::{ItemStack, PlayerId, Sound};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Resolved, row-major view of a container as the client should show it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub title: String,
    pub rows: usize,
    pub cols: usize,
    pub slots: Vec<Option<ItemStack>>,
}

impl RenderSnapshot {
    /// Item at a 1-based viewport coordinate.
    pub fn at(&self, row: usize, col: usize) -> Option<&ItemStack> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return None;
        }
        self.slots.get((row - 1) * self.cols + (col - 1))?.as_ref()
    }

    /// Slots whose content differs from `previous`. A snapshot of another
    /// shape differs everywhere.
    pub fn diff(&self, previous: &RenderSnapshot) -> Vec<(usize, Option<ItemStack>)> {
        if self.rows != previous.rows || self.cols != previous.cols {
            return self.slots.iter().cloned().enumerate().collect();
        }
        self.slots
            .iter()
            .zip(&previous.slots)
            .enumerate()
            .filter(|(_, (now, before))| now != before)
            .map(|(slot, (now, _))| (slot, now.clone()))
            .collect()
    }
}

/// Per-player output surface of the host server.
pub trait GuiHost: Send + Sync {
    /// Opens (or reopens) an inventory view with the full snapshot.
    fn open_view(&self, player: PlayerId, snapshot: &RenderSnapshot);

    /// Pushes changed slots into the already open view.
    fn update_slots(&self, player: PlayerId, slots: &[(usize, Option<ItemStack>)]);

    /// Closes the player's inventory view.
    fn close_view(&self, player: PlayerId);

    fn send_message(&self, player: PlayerId, message: &str);

    fn play_sound(&self, player: PlayerId, sound: &Sound);

    fn give_item(&self, player: PlayerId, item: ItemStack);
}

/// One call made against a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    OpenView(PlayerId, RenderSnapshot),
    UpdateSlots(PlayerId, Vec<(usize, Option<ItemStack>)>),
    CloseView(PlayerId),
    Message(PlayerId, String),
    Sound(PlayerId, Sound),
    GiveItem(PlayerId, ItemStack),
}

/// Host that only records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Returns and forgets every recorded call.
    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Most recent full snapshot opened for `player`.
    pub fn last_view(&self, player: PlayerId) -> Option<RenderSnapshot> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            HostCall::OpenView(p, snapshot) if *p == player => Some(snapshot.clone()),
            _ => None,
        })
    }

    /// Snapshot of what `player` sees now: the last opened view with every
    /// later slot update applied. `None` once the view was closed.
    pub fn current_view(&self, player: PlayerId) -> Option<RenderSnapshot> {
        let mut view: Option<RenderSnapshot> = None;
        for call in self.calls.lock().iter() {
            match call {
                HostCall::OpenView(p, snapshot) if *p == player => view = Some(snapshot.clone()),
                HostCall::CloseView(p) if *p == player => view = None,
                HostCall::UpdateSlots(p, slots) if *p == player => {
                    if let Some(view) = view.as_mut() {
                        for (slot, item) in slots {
                            if let Some(cell) = view.slots.get_mut(*slot) {
                                *cell = item.clone();
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        view
    }

    pub fn messages(&self, player: PlayerId) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Message(p, text) if *p == player => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

impl GuiHost for RecordingHost {
    fn open_view(&self, player: PlayerId, snapshot: &RenderSnapshot) {
        self.record(HostCall::OpenView(player, snapshot.clone()));
    }

    fn update_slots(&self, player: PlayerId, slots: &[(usize, Option<ItemStack>)]) {
        self.record(HostCall::UpdateSlots(player, slots.to_vec()));
    }

    fn close_view(&self, player: PlayerId) {
        self.record(HostCall::CloseView(player));
    }

    fn send_message(&self, player: PlayerId, message: &str) {
        self.record(HostCall::Message(player, message.to_string()));
    }

    fn play_sound(&self, player: PlayerId, sound: &Sound) {
        self.record(HostCall::Sound(player, sound.clone()));
    }

    fn give_item(&self, player: PlayerId, item: ItemStack) {
        self.record(HostCall::GiveItem(player, item));
    }
}
