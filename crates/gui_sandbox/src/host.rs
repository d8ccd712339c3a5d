//! A host adapter with no real clients behind it: every call is logged and
//! counted.

use chest_gui::{GuiHost, ItemStack, PlayerId, RenderSnapshot, Sound};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct HostStats {
    pub views_opened: AtomicU64,
    pub slots_updated: AtomicU64,
    pub views_closed: AtomicU64,
    pub messages: AtomicU64,
}

/// Prints what each player would see instead of sending packets.
#[derive(Debug, Default)]
pub struct ConsoleHost {
    stats: HostStats,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &HostStats {
        &self.stats
    }

    /// One text line per row, `.` for empty cells.
    pub fn draw(snapshot: &RenderSnapshot) -> Vec<String> {
        (1..=snapshot.rows)
            .map(|row| {
                (1..=snapshot.cols)
                    .map(|col| match snapshot.at(row, col) {
                        Some(item) => format!("[{:^10.10}]", item.display_name()),
                        None => format!("[{:^10}]", "."),
                    })
                    .collect::<String>()
            })
            .collect()
    }
}

impl GuiHost for ConsoleHost {
    fn open_view(&self, player: PlayerId, snapshot: &RenderSnapshot) {
        self.stats.views_opened.fetch_add(1, Ordering::Relaxed);
        info!("🪟 {} opened \"{}\" ({}x{})", player, snapshot.title, snapshot.rows, snapshot.cols);
        for line in Self::draw(snapshot) {
            debug!("   {}", line);
        }
    }

    fn update_slots(&self, player: PlayerId, slots: &[(usize, Option<ItemStack>)]) {
        self.stats.slots_updated.fetch_add(slots.len() as u64, Ordering::Relaxed);
        for (slot, item) in slots {
            debug!(
                "🔁 {} slot {} -> {}",
                player,
                slot,
                item.as_ref().map_or("empty", |i| i.display_name())
            );
        }
    }

    fn close_view(&self, player: PlayerId) {
        self.stats.views_closed.fetch_add(1, Ordering::Relaxed);
        info!("🚪 {} view closed", player);
    }

    fn send_message(&self, player: PlayerId, message: &str) {
        self.stats.messages.fetch_add(1, Ordering::Relaxed);
        info!("💬 {} <- {}", player, message);
    }

    fn play_sound(&self, player: PlayerId, sound: &Sound) {
        debug!("🔊 {} <- {} (volume {}, pitch {})", player, sound.key, sound.volume, sound.pitch);
    }

    fn give_item(&self, player: PlayerId, item: ItemStack) {
        info!("🎁 {} received {} x{}", player, item.display_name(), item.amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_marks_empty_cells() {
        let snapshot = RenderSnapshot {
            title: "t".to_string(),
            rows: 1,
            cols: 2,
            slots: vec![Some(ItemStack::new("minecraft:stone").with_name("Stone")), None],
        };
        let lines = ConsoleHost::draw(&snapshot);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Stone"));
        assert!(lines[0].contains('.'));
    }

    #[test]
    fn test_calls_are_counted() {
        let host = ConsoleHost::new();
        let player = PlayerId::new();
        host.update_slots(player, &[(0, None), (1, None)]);
        host.send_message(player, "hi");
        host.close_view(player);
        assert_eq!(host.stats().slots_updated.load(Ordering::Relaxed), 2);
        assert_eq!(host.stats().messages.load(Ordering::Relaxed), 1);
        assert_eq!(host.stats().views_closed.load(Ordering::Relaxed), 1);
    }
}
