//! Per-player session store and the open/update/close driver.
//!
//! [`GuiManager`] is the entry point a host adapter talks to. It owns the host
//! handle, the settings, the tick scheduler and one [`PlayerGui`] per player
//! that has touched a GUI. Sessions are created lazily and evicted by
//! [`GuiManager::handle_disconnect`].
//!
//! Locking rule: a session map guard is never held while a container is being
//! locked. Containers may look at sessions while locked (the navigation module
//! does), so taking the locks the other way round would deadlock.

use crate::config::GuiSettings;
use crate::container::{ContainerHandle, GuiContainer};
use crate::context::{GuiAction, GuiContext};
use crate::error::{GuiError, GuiResult};
use crate::host::{GuiHost, RenderSnapshot};
use crate::navigation::NavigationSystem;
use crate::router::{self, ClickOutcome, RawDrag, RawInteraction};
use crate::scheduler::{TaskHandle, TickScheduler};
use crate::types::PlayerId;
use dashmap::DashMap;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

// ============================================================================
// Per-player state
// ============================================================================

/// Everything the runtime remembers about one player.
#[derive(Debug, Default)]
pub struct PlayerGui {
    current: Option<ContainerHandle>,
    navigations: HashMap<String, NavigationSystem>,
    last_render: Option<RenderSnapshot>,
    tasks: Vec<TaskHandle>,
}

impl PlayerGui {
    pub fn current(&self) -> Option<&ContainerHandle> {
        self.current.as_ref()
    }

    pub fn navigation(&self, navigation: &str) -> Option<&NavigationSystem> {
        self.navigations.get(navigation)
    }

    /// Names of the navigation contexts this player has used.
    pub fn navigation_ids(&self) -> impl Iterator<Item = &str> {
        self.navigations.keys().map(String::as_str)
    }

    fn navigation_mut(&mut self, navigation: &str, capacity: usize) -> &mut NavigationSystem {
        self.navigations
            .entry(navigation.to_string())
            .or_insert_with(|| NavigationSystem::new(capacity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// Ordinary open: the previous container goes into history
    Record,
    /// History move: back/forward stacks were already adjusted
    Navigate,
}

// ============================================================================
// Manager
// ============================================================================

pub struct GuiManager {
    host: Arc<dyn GuiHost>,
    settings: GuiSettings,
    scheduler: TickScheduler,
    sessions: DashMap<PlayerId, PlayerGui>,
    this: Weak<GuiManager>,
}

impl GuiManager {
    pub fn new(host: Arc<dyn GuiHost>, settings: GuiSettings) -> Arc<Self> {
        info!(
            "GUI manager ready (limits {}x{}, move limit {:?})",
            settings.max_rows, settings.max_cols, settings.move_limit
        );
        Arc::new_cyclic(|this| Self {
            host,
            settings,
            scheduler: TickScheduler::new(),
            sessions: DashMap::new(),
            this: this.clone(),
        })
    }

    pub fn host(&self) -> &dyn GuiHost {
        self.host.as_ref()
    }

    pub fn settings(&self) -> &GuiSettings {
        &self.settings
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Weak self reference for scheduled tasks that must not keep the
    /// manager alive.
    pub fn downgrade(&self) -> Weak<GuiManager> {
        self.this.clone()
    }

    /// Builds a container with the configured size limits and default
    /// navigation context.
    pub fn create_container(&self, title: impl Into<String>, rows: usize, cols: usize) -> GuiResult<GuiContainer> {
        Ok(
            GuiContainer::with_limits(title, rows, cols, self.settings.max_rows, self.settings.max_cols)?
                .in_navigation(self.settings.default_navigation.clone()),
        )
    }

    // ========================================================================
    // Session access
    // ========================================================================

    pub fn current(&self, player: PlayerId) -> Option<ContainerHandle> {
        self.sessions.get(&player).and_then(|s| s.current.clone())
    }

    pub fn is_current(&self, player: PlayerId, handle: &ContainerHandle) -> bool {
        self.current(player).as_ref() == Some(handle)
    }

    /// Runs `f` against the player's history in `navigation`, creating the
    /// session and the context on first use.
    pub fn with_navigation<R>(&self, player: PlayerId, navigation: &str, f: impl FnOnce(&mut NavigationSystem) -> R) -> R {
        let mut session = self.sessions.entry(player).or_default();
        f(session.navigation_mut(navigation, self.settings.max_history))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn has_session(&self, player: PlayerId) -> bool {
        self.sessions.contains_key(&player)
    }

    /// Schedules a repeating task owned by `player`; it is cancelled when the
    /// player disconnects.
    pub fn schedule_for<F>(&self, player: PlayerId, delay: u64, period: u64, task: F) -> GuiResult<TaskHandle>
    where
        F: FnMut() + Send + 'static,
    {
        let handle = self.scheduler.schedule_repeating(delay, period, task)?;
        let mut session = self.sessions.entry(player).or_default();
        session.tasks.retain(|t| !t.is_cancelled());
        session.tasks.push(handle.clone());
        Ok(handle)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Locks `handle`, runs `f` with a fresh context, then applies whatever
    /// actions `f` queued once the lock is released.
    pub fn with_container<R>(
        &self,
        player: PlayerId,
        handle: &ContainerHandle,
        f: impl FnOnce(&mut GuiContainer, &mut GuiContext<'_>) -> R,
    ) -> R {
        let (result, actions) = {
            let mut container = handle.lock();
            let mut ctx = GuiContext::new(self, player, handle);
            let result = f(&mut container, &mut ctx);
            (result, ctx.finish())
        };
        self.apply_actions(player, actions);
        result
    }

    fn apply_actions(&self, player: PlayerId, actions: Vec<GuiAction>) {
        for action in actions {
            let result = match action {
                GuiAction::Open(handle) => self.open(player, handle),
                GuiAction::Close => self.close(player).map(|_| ()),
                GuiAction::Back(navigation) => self.back(player, &navigation).map(|_| ()),
                GuiAction::Forward(navigation) => self.forward(player, &navigation).map(|_| ()),
            };
            if let Err(e) = result {
                warn!("Deferred GUI action failed for player {}: {}", player, e);
            }
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shows `handle` to `player`, recording the previously open container in
    /// the target's navigation history.
    ///
    /// Opening the container that is already open only re-renders it.
    pub fn open(&self, player: PlayerId, handle: ContainerHandle) -> GuiResult<()> {
        self.open_with(player, handle, Transition::Record)
    }

    fn open_with(&self, player: PlayerId, handle: ContainerHandle, transition: Transition) -> GuiResult<()> {
        let previous = self.current(player);
        if previous.as_ref() == Some(&handle) {
            debug!("Container {} already open for player {}, refreshing", handle.id(), player);
            return self.refresh(player, &handle, true);
        }

        if let Some(previous) = &previous {
            self.run_close(player, previous);
        }

        let navigation = handle.lock().navigation_id().to_string();
        {
            let mut session = self.sessions.entry(player).or_default();
            let nav = session.navigation_mut(&navigation, self.settings.max_history);
            if transition == Transition::Record {
                if let Some(previous) = previous {
                    nav.add_back(previous);
                }
                nav.reset_forward();
            }
            nav.set_recent(Some(handle.clone()));
            session.current = Some(handle.clone());
            session.last_render = None;
        }

        self.with_container(player, &handle, |container, ctx| {
            container.open(ctx);
            self.push_render(player, container, true);
        });

        self.with_navigation(player, &navigation, |nav| nav.set_flag(false));
        Ok(())
    }

    /// Runs an update pass on the player's open container and pushes the
    /// changes.
    pub fn update(&self, player: PlayerId) -> GuiResult<()> {
        let handle = self.current(player).ok_or(GuiError::NoOpenContainer(player))?;
        self.refresh(player, &handle, false)
    }

    fn refresh(&self, player: PlayerId, handle: &ContainerHandle, full: bool) -> GuiResult<()> {
        self.with_container(player, handle, |container, ctx| {
            container.update(ctx);
            self.push_render(player, container, full);
        });
        Ok(())
    }

    /// Closes the player's view from the server side. Returns `false` when
    /// nothing was open.
    pub fn close(&self, player: PlayerId) -> GuiResult<bool> {
        let Some(handle) = self.take_current(player) else {
            return Ok(false);
        };
        self.run_close(player, &handle);
        self.host.close_view(player);
        Ok(true)
    }

    /// The client closed the inventory on its own; run close hooks without
    /// asking the host to close anything.
    pub fn handle_inventory_closed(&self, player: PlayerId) -> bool {
        match self.take_current(player) {
            Some(handle) => {
                self.run_close(player, &handle);
                true
            }
            None => false,
        }
    }

    /// Drops everything known about a player that left the server.
    pub fn handle_disconnect(&self, player: PlayerId) {
        if let Some(handle) = self.take_current(player) {
            self.run_close(player, &handle);
        }
        if let Some((_, session)) = self.sessions.remove(&player) {
            for task in &session.tasks {
                task.cancel();
            }
            debug!(
                "Evicted GUI session of player {} ({} tasks cancelled)",
                player,
                session.tasks.len()
            );
        }
    }

    /// Closes every open view. Used on shutdown.
    pub fn close_all(&self) {
        let players: Vec<PlayerId> = self.sessions.iter().map(|entry| *entry.key()).collect();
        for player in players {
            if let Err(e) = self.close(player) {
                warn!("Failed to close GUI of player {}: {}", player, e);
            }
        }
    }

    fn take_current(&self, player: PlayerId) -> Option<ContainerHandle> {
        let mut session = self.sessions.get_mut(&player)?;
        session.last_render = None;
        session.current.take()
    }

    fn run_close(&self, player: PlayerId, handle: &ContainerHandle) {
        self.with_container(player, handle, |container, ctx| container.close(ctx));
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Steps back in `navigation`. Returns `false` when there is no history.
    pub fn back(&self, player: PlayerId, navigation: &str) -> GuiResult<bool> {
        self.step(player, navigation, true)
    }

    pub fn forward(&self, player: PlayerId, navigation: &str) -> GuiResult<bool> {
        self.step(player, navigation, false)
    }

    fn step(&self, player: PlayerId, navigation: &str, back: bool) -> GuiResult<bool> {
        let current = self.current(player);
        let target = self.with_navigation(player, navigation, |nav| {
            let target = if back { nav.remove_back() } else { nav.remove_forward() }?;
            if let Some(current) = current {
                if back {
                    nav.add_forward(current);
                } else {
                    nav.add_back(current);
                }
            }
            nav.set_flag(true);
            Some(target)
        });

        match target {
            Some(target) => {
                debug!(
                    "Player {} navigating {} in '{}'",
                    player,
                    if back { "back" } else { "forward" },
                    navigation
                );
                self.open_with(player, target, Transition::Navigate)?;
                self.with_navigation(player, navigation, |nav| nav.set_flag(false));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ========================================================================
    // Input and ticking
    // ========================================================================

    pub fn handle_click(&self, player: PlayerId, interaction: &RawInteraction) -> ClickOutcome {
        router::route_click(self, player, interaction)
    }

    pub fn handle_drag(&self, player: PlayerId, drag: &RawDrag) -> ClickOutcome {
        router::route_drag(self, player, drag)
    }

    /// Advances the scheduler by one tick.
    pub fn tick(&self) -> usize {
        self.scheduler.tick()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Sends the container's view to the host: a full snapshot when forced or
    /// when the title changed, a slot diff otherwise.
    fn push_render(&self, player: PlayerId, container: &mut GuiContainer, full: bool) {
        let snapshot = container.render();
        let title_changed = container.take_title_changed();
        let flagged = container.changed_slots();
        container.clear_changed();

        let previous = self
            .sessions
            .get_mut(&player)
            .and_then(|mut s| s.last_render.replace(snapshot.clone()));

        match previous {
            Some(previous) if !full && !title_changed => {
                let mut slots: BTreeSet<usize> = snapshot.diff(&previous).into_iter().map(|(slot, _)| slot).collect();
                slots.extend(flagged);
                if slots.is_empty() {
                    return;
                }
                let changes: Vec<_> = slots
                    .into_iter()
                    .filter_map(|slot| snapshot.slots.get(slot).map(|item| (slot, item.clone())))
                    .collect();
                self.host.update_slots(player, &changes);
            }
            _ => self.host.open_view(player, &snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};
    use crate::item::GuiItem;
    use crate::layer::GuiLayer;
    use crate::types::ItemStack;

    fn setup() -> (Arc<RecordingHost>, Arc<GuiManager>) {
        let host = Arc::new(RecordingHost::new());
        let manager = GuiManager::new(host.clone(), GuiSettings::default());
        (host, manager)
    }

    fn menu(manager: &GuiManager, title: &str) -> ContainerHandle {
        let mut container = manager.create_container(title, 1, 9).unwrap();
        container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
        ContainerHandle::new(container)
    }

    #[test]
    fn test_open_renders_full_view() {
        let (host, manager) = setup();
        let player = PlayerId::new();
        let handle = menu(&manager, "Main");
        handle
            .lock()
            .set_item(1, 1, GuiItem::new(ItemStack::new("minecraft:compass")))
            .unwrap();

        manager.open(player, handle.clone()).unwrap();

        let view = host.last_view(player).unwrap();
        assert_eq!(view.title, "Main");
        assert_eq!(view.slots[0].as_ref().unwrap().material, "minecraft:compass");
        assert!(manager.is_current(player, &handle));
    }

    #[test]
    fn test_update_pushes_only_changes() {
        let (host, manager) = setup();
        let player = PlayerId::new();
        let handle = menu(&manager, "Main");
        manager.open(player, handle.clone()).unwrap();
        host.take_calls();

        manager.update(player).unwrap();
        assert!(host.calls().is_empty());

        handle
            .lock()
            .set_item(1, 3, GuiItem::new(ItemStack::new("minecraft:apple")))
            .unwrap();
        manager.update(player).unwrap();

        let calls = host.take_calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            HostCall::UpdateSlots(p, slots) => {
                assert_eq!(*p, player);
                assert_eq!(slots.len(), 1);
                assert_eq!(slots[0].0, 2);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_title_change_reopens_view() {
        let (host, manager) = setup();
        let player = PlayerId::new();
        let handle = menu(&manager, "Old");
        manager.open(player, handle.clone()).unwrap();
        host.take_calls();

        handle.lock().set_title("New");
        manager.update(player).unwrap();

        let calls = host.take_calls();
        assert!(matches!(&calls[..], [HostCall::OpenView(_, snapshot)] if snapshot.title == "New"));
    }

    #[test]
    fn test_update_without_container_is_an_error() {
        let (_, manager) = setup();
        let player = PlayerId::new();
        assert!(matches!(manager.update(player), Err(GuiError::NoOpenContainer(p)) if p == player));
        assert!(!manager.close(player).unwrap());
    }

    #[test]
    fn test_history_recording_and_stepping() {
        let (_, manager) = setup();
        let player = PlayerId::new();
        let x = menu(&manager, "X");
        let y = menu(&manager, "Y");

        manager.open(player, x.clone()).unwrap();
        manager.open(player, y.clone()).unwrap();
        manager.with_navigation(player, "default", |nav| {
            assert_eq!(nav.get_back(), Some(&x));
            assert!(!nav.has_forward());
        });

        assert!(manager.back(player, "default").unwrap());
        assert!(manager.is_current(player, &x));
        manager.with_navigation(player, "default", |nav| {
            assert!(!nav.has_back());
            assert_eq!(nav.get_forward(), Some(&y));
            assert!(!nav.is_flagged());
        });

        assert!(!manager.back(player, "default").unwrap());
        assert!(manager.is_current(player, &x));
    }

    #[test]
    fn test_fresh_open_clears_forward() {
        let (_, manager) = setup();
        let player = PlayerId::new();
        let (x, y, z) = (menu(&manager, "X"), menu(&manager, "Y"), menu(&manager, "Z"));

        manager.open(player, x).unwrap();
        manager.open(player, y).unwrap();
        manager.back(player, "default").unwrap();
        manager.open(player, z).unwrap();

        manager.with_navigation(player, "default", |nav| {
            assert!(!nav.has_forward());
            assert_eq!(nav.back_len(), 1);
        });
    }

    #[test]
    fn test_disconnect_evicts_session_and_tasks() {
        let (_, manager) = setup();
        let player = PlayerId::new();
        manager.open(player, menu(&manager, "X")).unwrap();
        let task = manager.schedule_for(player, 1, 1, || {}).unwrap();
        assert_eq!(manager.session_count(), 1);

        manager.handle_disconnect(player);
        assert_eq!(manager.session_count(), 0);
        assert!(task.is_cancelled());
        assert!(manager.current(player).is_none());
    }

    #[test]
    fn test_client_close_skips_host_close() {
        let (host, manager) = setup();
        let player = PlayerId::new();
        manager.open(player, menu(&manager, "X")).unwrap();
        host.take_calls();

        assert!(manager.handle_inventory_closed(player));
        assert!(host.calls().is_empty());
        assert!(manager.current(player).is_none());

        manager.open(player, menu(&manager, "Y")).unwrap();
        assert!(manager.close(player).unwrap());
        assert!(matches!(host.calls().last(), Some(HostCall::CloseView(p)) if *p == player));
    }
}
