//! Frame animation of view items.

use super::{schedule_module_task, GuiModule};
use crate::container::GuiContainer;
use crate::context::GuiContext;
use crate::error::{GuiError, GuiResult};
use crate::scheduler::TaskHandle;
use crate::types::{ItemStack, PlayerId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Animation {
    row: usize,
    col: usize,
    frames: Vec<ItemStack>,
}

/// Cycles the view item of selected viewport cells through a list of
/// frames, advancing one frame every `interval` ticks. The base items are
/// never touched, and views are reset to them when the container closes.
///
/// Each viewer has its own timer and frame counter.
pub struct AnimationModule {
    interval: u64,
    animations: Vec<Animation>,
    frames: HashMap<PlayerId, u64>,
    tasks: HashMap<PlayerId, TaskHandle>,
}

impl AnimationModule {
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            animations: Vec::new(),
            frames: HashMap::new(),
            tasks: HashMap::new(),
        }
    }

    /// Animates whatever item sits at the viewport cell. Empty frame lists
    /// are ignored.
    pub fn animate<I>(mut self, row: usize, col: usize, frames: I) -> Self
    where
        I: IntoIterator<Item = ItemStack>,
    {
        let frames: Vec<ItemStack> = frames.into_iter().collect();
        if !frames.is_empty() {
            self.animations.push(Animation { row, col, frames });
        }
        self
    }

    /// Frames shown to `player` since the container was opened.
    pub fn frame(&self, player: PlayerId) -> u64 {
        self.frames.get(&player).copied().unwrap_or(0)
    }

    /// Moves every animation to the next frame for `player`.
    pub fn advance(&mut self, player: PlayerId, container: &mut GuiContainer) {
        let frame = self.frames.entry(player).or_insert(0);
        *frame += 1;
        let frame = *frame;
        self.apply(frame, container);
    }

    fn apply(&self, frame: u64, container: &mut GuiContainer) {
        for animation in &self.animations {
            let index = (frame % animation.frames.len() as u64) as usize;
            if let Some(item) = container.get_item_mut(animation.row, animation.col) {
                if item.view_item() != &animation.frames[index] {
                    item.set_view_item(animation.frames[index].clone());
                }
            }
        }
    }

    fn reset(&self, container: &mut GuiContainer) {
        for animation in &self.animations {
            if let Some(item) = container.get_item_mut(animation.row, animation.col) {
                item.reset_view_item();
                item.set_changed(true);
            }
        }
    }
}

impl GuiModule for AnimationModule {
    fn on_open(&mut self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        if self.interval == 0 {
            return Err(GuiError::InvalidPeriod);
        }
        if let Some(previous) = self.tasks.remove(&ctx.player()) {
            previous.cancel();
        }
        self.frames.insert(ctx.player(), 0);
        let task = schedule_module_task::<AnimationModule, _>(ctx, self.interval, self.interval, |animation, container, player| {
            animation.advance(player, container);
            Ok(())
        })?;
        self.tasks.insert(ctx.player(), task);
        Ok(())
    }

    /// Other modules may have rebuilt the cells during the update pass, so
    /// the current frame is applied again once they are done.
    fn after_update(&mut self, container: &mut GuiContainer, ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        self.apply(self.frame(ctx.player()), container);
        Ok(())
    }

    fn on_close(&mut self, container: &mut GuiContainer, ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        if let Some(task) = self.tasks.remove(&ctx.player()) {
            task.cancel();
        }
        self.frames.remove(&ctx.player());
        self.reset(container);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::GuiItem;
    use crate::layer::GuiLayer;

    #[test]
    fn test_frames_cycle_and_reset() {
        let mut container = GuiContainer::new("anim", 1, 9).unwrap();
        container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
        container
            .set_item(1, 1, GuiItem::new(ItemStack::new("minecraft:clock")))
            .unwrap();
        container.clear_changed();
        let player = PlayerId::new();

        let mut animation = AnimationModule::new(5).animate(
            1,
            1,
            [ItemStack::new("minecraft:red_wool"), ItemStack::new("minecraft:blue_wool")],
        );

        animation.advance(player, &mut container);
        let item = container.get_item(1, 1).unwrap();
        assert_eq!(item.material(), "minecraft:blue_wool");
        assert_eq!(item.base_item().material, "minecraft:clock");
        assert!(item.is_changed());

        animation.advance(player, &mut container);
        assert_eq!(container.get_item(1, 1).unwrap().material(), "minecraft:red_wool");

        animation.reset(&mut container);
        assert_eq!(container.get_item(1, 1).unwrap().material(), "minecraft:clock");
    }

    #[test]
    fn test_frame_counters_are_per_viewer() {
        let mut container = GuiContainer::new("anim", 1, 9).unwrap();
        container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
        let (alex, sam) = (PlayerId::new(), PlayerId::new());
        let mut animation = AnimationModule::new(5).animate(1, 1, [ItemStack::new("minecraft:stone")]);

        animation.advance(alex, &mut container);
        animation.advance(sam, &mut container);
        animation.advance(alex, &mut container);

        assert_eq!(animation.frame(alex), 2);
        assert_eq!(animation.frame(sam), 1);
        assert_eq!(animation.frame(PlayerId::new()), 0);
    }
}
