//! Periodic user logic while a container is open.

use super::{schedule_module_task, GuiModule};
use crate::container::GuiContainer;
use crate::context::GuiContext;
use crate::error::GuiResult;
use crate::scheduler::TaskHandle;
use crate::types::PlayerId;
use std::collections::HashMap;
use tracing::debug;

/// Receives the container, the viewer and how many times it ran for that
/// viewer since the container was opened (starting at 1).
pub type RuntimeCallback = dyn FnMut(&mut GuiContainer, PlayerId, u64) -> GuiResult<()> + Send;

/// Calls a function every `period` ticks for each player viewing the
/// container. The first call happens one full period after open, and the
/// timer is cancelled by the close hook.
pub struct RuntimeModule {
    period: u64,
    callback: Box<RuntimeCallback>,
    tasks: HashMap<PlayerId, TaskHandle>,
    invocations: HashMap<PlayerId, u64>,
}

impl RuntimeModule {
    pub fn new<F>(period: u64, callback: F) -> Self
    where
        F: FnMut(&mut GuiContainer, PlayerId, u64) -> GuiResult<()> + Send + 'static,
    {
        Self {
            period,
            callback: Box::new(callback),
            tasks: HashMap::new(),
            invocations: HashMap::new(),
        }
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    /// Calls made for `player` since the last open.
    pub fn invocations(&self, player: PlayerId) -> u64 {
        self.invocations.get(&player).copied().unwrap_or(0)
    }

    pub fn is_running(&self, player: PlayerId) -> bool {
        self.tasks.get(&player).is_some_and(|t| !t.is_cancelled())
    }

    fn fire(&mut self, container: &mut GuiContainer, player: PlayerId) -> GuiResult<()> {
        let count = self.invocations.entry(player).or_insert(0);
        *count += 1;
        (self.callback)(container, player, *count)
    }
}

impl GuiModule for RuntimeModule {
    fn on_open(&mut self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        let player = ctx.player();
        if let Some(previous) = self.tasks.remove(&player) {
            previous.cancel();
        }
        self.invocations.insert(player, 0);

        let task = schedule_module_task::<RuntimeModule, _>(ctx, self.period, self.period, |runtime, container, player| {
            runtime.fire(container, player)
        })?;
        debug!("Runtime task {} started for player {}", task.id(), player);
        self.tasks.insert(player, task);
        Ok(())
    }

    fn on_close(&mut self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        if let Some(task) = self.tasks.remove(&ctx.player()) {
            task.cancel();
            debug!("Runtime task {} stopped for player {}", task.id(), ctx.player());
        }
        Ok(())
    }
}
