//! Pluggable lifecycle participants.
//!
//! Modules are registered on a container under an id the application picks and
//! are looked up again by id plus concrete type. Every hook is optional.
//!
//! An update pass is two-phase: every module's [`GuiModule::on_update`] runs
//! first (layout), then every module's [`GuiModule::after_update`] (observe and
//! finalise). A module that wants to see the final layout of its siblings puts
//! its work in the second phase.

pub mod animation;
pub mod list;
pub mod navigation;
pub mod runtime;
pub mod tree;

use crate::container::GuiContainer;
use crate::context::GuiContext;
use crate::error::{GuiError, GuiResult};
use crate::scheduler::TaskHandle;
use crate::types::PlayerId;
use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use tracing::warn;

/// Upcast helper so boxed modules can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait GuiModule: AsAny + Send {
    /// Called once when the module is registered on a container.
    fn on_attach(&mut self, _id: &ModuleId) {}

    fn on_open(&mut self, _container: &mut GuiContainer, _ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        Ok(())
    }

    /// Mutate phase of an update pass.
    fn on_update(&mut self, _container: &mut GuiContainer, _ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        Ok(())
    }

    /// Observe phase of an update pass; runs after every module's `on_update`.
    fn after_update(&mut self, _container: &mut GuiContainer, _ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        Ok(())
    }

    fn on_close(&mut self, _container: &mut GuiContainer, _ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        Ok(())
    }
}

/// Schedules a repeating task that calls `task` on the module currently
/// running a hook, for the player the hook runs for.
///
/// Each run locks the container, pulls the module out with
/// [`GuiContainer::with_module`], and pushes an update to the player if the
/// container is still the one they have open. Failures are reported like any
/// other hook failure. The task is owned by the player's session, so it also
/// dies with a disconnect.
pub(crate) fn schedule_module_task<T, F>(
    ctx: &GuiContext<'_>,
    delay: u64,
    period: u64,
    mut task: F,
) -> GuiResult<TaskHandle>
where
    T: GuiModule,
    F: FnMut(&mut T, &mut GuiContainer, PlayerId) -> GuiResult<()> + Send + 'static,
{
    let id = ctx
        .module_id()
        .cloned()
        .ok_or_else(|| GuiError::Handler("module task scheduled outside of a module hook".to_string()))?;
    let player = ctx.player();
    let handle = ctx.handle().clone();
    let manager = ctx.manager().downgrade();

    ctx.manager().schedule_for(player, delay, period, move || {
        let Some(manager) = manager.upgrade() else {
            return;
        };
        manager.with_container(player, &handle, |container, ctx| {
            let result = container
                .with_module::<T, _>(&id, |module, container| task(module, container, player))
                .and_then(|result| result);
            if let Err(e) = result {
                ctx.report_failure(&format!("Module '{}' task", id), &e);
            }
        });
        if manager.is_current(player, &handle) {
            if let Err(e) = manager.update(player) {
                warn!("Update after module '{}' task failed for player {}: {}", id, player, e);
            }
        }
    })
}

/// Application-chosen key a module is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ModuleId> for ModuleId {
    fn from(id: &ModuleId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for ModuleId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}
