//! Dispatch context handed to module hooks and slot events.
//!
//! A context lives for exactly one dispatch pass (an open, update or close
//! pass, or one click). It gives handlers access to the acting player, the
//! host and the scheduler, and collects actions that must wait until the
//! container being dispatched is unlocked again.

use crate::config::GuiSettings;
use crate::container::ContainerHandle;
use crate::error::GuiError;
use crate::host::GuiHost;
use crate::manager::GuiManager;
use crate::module::ModuleId;
use crate::scheduler::TickScheduler;
use crate::types::PlayerId;
use tracing::error;

/// Work that touches a container other than the one being dispatched, or the
/// player's session as a whole. Applied in queue order once the pass ends.
#[derive(Debug, Clone)]
pub enum GuiAction {
    /// Open a container for the acting player, recording history
    Open(ContainerHandle),
    /// Close the acting player's view
    Close,
    /// Step back in the named navigation context
    Back(String),
    /// Step forward in the named navigation context
    Forward(String),
}

pub struct GuiContext<'a> {
    manager: &'a GuiManager,
    player: PlayerId,
    handle: &'a ContainerHandle,
    module: Option<ModuleId>,
    actions: Vec<GuiAction>,
    failures: usize,
}

impl<'a> GuiContext<'a> {
    pub(crate) fn new(manager: &'a GuiManager, player: PlayerId, handle: &'a ContainerHandle) -> Self {
        Self {
            manager,
            player,
            handle,
            module: None,
            actions: Vec::new(),
            failures: 0,
        }
    }

    /// The player this pass runs for.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn manager(&self) -> &'a GuiManager {
        self.manager
    }

    pub fn host(&self) -> &'a dyn GuiHost {
        self.manager.host()
    }

    pub fn scheduler(&self) -> &'a TickScheduler {
        self.manager.scheduler()
    }

    pub fn settings(&self) -> &'a GuiSettings {
        self.manager.settings()
    }

    /// Handle of the container being dispatched.
    pub fn handle(&self) -> &'a ContainerHandle {
        self.handle
    }

    /// Id of the module whose hook is running, `None` inside slot events.
    pub fn module_id(&self) -> Option<&ModuleId> {
        self.module.as_ref()
    }

    pub(crate) fn set_module(&mut self, module: Option<ModuleId>) {
        self.module = module;
    }

    pub fn queue(&mut self, action: GuiAction) {
        self.actions.push(action);
    }

    pub fn open(&mut self, handle: ContainerHandle) {
        self.queue(GuiAction::Open(handle));
    }

    pub fn close(&mut self) {
        self.queue(GuiAction::Close);
    }

    pub fn back(&mut self, navigation: impl Into<String>) {
        self.queue(GuiAction::Back(navigation.into()));
    }

    pub fn forward(&mut self, navigation: impl Into<String>) {
        self.queue(GuiAction::Forward(navigation.into()));
    }

    pub fn pending_actions(&self) -> &[GuiAction] {
        &self.actions
    }

    /// Records an isolated handler failure. The pass keeps going.
    pub(crate) fn report_failure(&mut self, what: &str, err: &GuiError) {
        error!("{} failed for player {}: {}", what, self.player, err);
        self.failures += 1;
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Sends the generic failure notice once if anything failed, then hands
    /// back the queued actions.
    pub(crate) fn finish(self) -> Vec<GuiAction> {
        if self.failures > 0 {
            self.manager
                .host()
                .send_message(self.player, &self.manager.settings().failure_message);
        }
        self.actions
    }
}
