//! Integration tests for per-player sessions: navigation history, module
//! lifecycle ordering, periodic modules and the move policy.

use chest_gui::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn setup_with(settings: GuiSettings) -> (Arc<RecordingHost>, Arc<GuiManager>, PlayerId) {
    let host = Arc::new(RecordingHost::new());
    let manager = GuiManager::new(host.clone(), settings);
    (host, manager, PlayerId::new())
}

fn setup() -> (Arc<RecordingHost>, Arc<GuiManager>, PlayerId) {
    setup_with(GuiSettings::default())
}

fn click(slot: usize) -> RawInteraction {
    RawInteraction::new(slot, ClickType::Left, InventoryAction::PickupAll)
}

/// 2x9 menu with back/forward buttons at (1, 1) and (1, 9).
fn nav_menu(manager: &GuiManager, title: &str) -> GuiContainer {
    let mut container = manager.create_container(title, 2, 9).unwrap();
    container.add_layer(GuiLayer::new("content", 2, 9)).unwrap();
    container
        .add_module("nav", Box::new(NavigationModule::new((1, 1), (1, 9))))
        .unwrap();
    container
}

fn history(manager: &GuiManager, player: PlayerId) -> (Vec<ContainerHandle>, Vec<ContainerHandle>) {
    manager.with_navigation(player, "default", |nav| {
        (nav.back_entries().cloned().collect(), nav.forward_entries().cloned().collect())
    })
}

#[test]
fn test_navigation_round_trip() {
    let (host, manager, player) = setup();

    let y = ContainerHandle::new(nav_menu(&manager, "Y"));
    let mut x = nav_menu(&manager, "X");
    x.set_item(
        2,
        5,
        GuiItem::new(ItemStack::new("minecraft:oak_door").with_name("To Y")).with_event(Arc::new(OpenEvent::new(y.clone()))),
    )
    .unwrap();
    let x = ContainerHandle::new(x);

    manager.open(player, x.clone()).unwrap();
    assert!(host.current_view(player).unwrap().at(1, 1).is_none());

    // X -> Y through the door
    manager.handle_click(player, &click(13));
    assert!(manager.is_current(player, &y));
    let before = history(&manager, player);
    assert_eq!(before, (vec![x.clone()], vec![]));
    assert_eq!(host.current_view(player).unwrap().at(1, 1).unwrap().display_name(), "Back");

    // Back to X
    manager.handle_click(player, &click(0));
    assert!(manager.is_current(player, &x));
    assert_eq!(history(&manager, player), (vec![], vec![y.clone()]));
    let view = host.current_view(player).unwrap();
    assert_eq!(view.title, "X");
    assert!(view.at(1, 1).is_none());
    assert_eq!(view.at(1, 9).unwrap().display_name(), "Forward");

    // Forward to Y again
    manager.handle_click(player, &click(8));
    assert!(manager.is_current(player, &y));
    assert_eq!(history(&manager, player), before);
    manager.with_navigation(player, "default", |nav| assert!(!nav.is_flagged()));
}

#[test]
fn test_reopening_same_container_does_not_duplicate_history() {
    let (host, manager, player) = setup();
    let a = ContainerHandle::new(nav_menu(&manager, "A"));
    let b = ContainerHandle::new(nav_menu(&manager, "B"));

    manager.open(player, a.clone()).unwrap();
    manager.open(player, a.clone()).unwrap();
    assert_eq!(history(&manager, player), (vec![], vec![]));

    manager.open(player, b.clone()).unwrap();
    manager.open(player, b.clone()).unwrap();
    assert_eq!(history(&manager, player), (vec![a.clone()], vec![]));

    let opens = host
        .calls()
        .iter()
        .filter(|call| matches!(call, HostCall::OpenView(..)))
        .count();
    assert_eq!(opens, 4);
}

#[test]
fn test_history_depth_is_capped() {
    let settings = GuiSettings {
        max_history: 3,
        ..GuiSettings::default()
    };
    let (_, manager, player) = setup_with(settings);
    let menus: Vec<_> = (0..6)
        .map(|i| ContainerHandle::new(nav_menu(&manager, &format!("M{}", i))))
        .collect();
    for menu in &menus {
        manager.open(player, menu.clone()).unwrap();
    }

    let (back, _) = history(&manager, player);
    assert_eq!(back, menus[2..5].to_vec());
}

#[test]
fn test_separate_navigation_contexts() {
    let (_, manager, player) = setup();
    let shop = ContainerHandle::new(nav_menu(&manager, "Shop").in_navigation("shop"));
    let checkout = ContainerHandle::new(nav_menu(&manager, "Checkout").in_navigation("shop"));
    let settings = ContainerHandle::new(nav_menu(&manager, "Settings"));

    manager.open(player, shop.clone()).unwrap();
    manager.open(player, checkout.clone()).unwrap();
    manager.open(player, settings).unwrap();

    manager.with_navigation(player, "shop", |nav| {
        assert_eq!(nav.get_back(), Some(&shop));
    });
    manager.with_navigation(player, "default", |nav| {
        assert_eq!(nav.get_back(), Some(&checkout));
    });

    assert!(manager.back(player, "shop").unwrap());
    assert!(manager.is_current(player, &shop));
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    fail_update: bool,
}

impl Recorder {
    fn push(&self, hook: &str) {
        self.log.lock().push(format!("{}.{}", self.name, hook));
    }
}

impl GuiModule for Recorder {
    fn on_open(&mut self, _: &mut GuiContainer, _: &mut GuiContext<'_>) -> GuiResult<()> {
        self.push("open");
        Ok(())
    }

    fn on_update(&mut self, _: &mut GuiContainer, _: &mut GuiContext<'_>) -> GuiResult<()> {
        self.push("update");
        if self.fail_update {
            return Err(GuiError::Handler("layout broke".to_string()));
        }
        Ok(())
    }

    fn after_update(&mut self, _: &mut GuiContainer, _: &mut GuiContext<'_>) -> GuiResult<()> {
        self.push("after");
        Ok(())
    }

    fn on_close(&mut self, _: &mut GuiContainer, _: &mut GuiContext<'_>) -> GuiResult<()> {
        self.push("close");
        Ok(())
    }
}

#[test]
fn test_module_lifecycle_order_and_isolation() {
    let (host, manager, player) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut container = manager.create_container("lifecycle", 1, 9).unwrap();
    for (name, fail_update) in [("a", true), ("b", false)] {
        container
            .add_module(
                name,
                Box::new(Recorder {
                    name,
                    log: log.clone(),
                    fail_update,
                }),
            )
            .unwrap();
    }

    manager.open(player, ContainerHandle::new(container)).unwrap();
    assert_eq!(
        *log.lock(),
        vec!["a.open", "b.open", "a.update", "b.update", "a.after", "b.after"]
    );
    assert_eq!(host.messages(player).len(), 1);

    log.lock().clear();
    manager.close(player).unwrap();
    assert_eq!(*log.lock(), vec!["b.close", "a.close"]);
}

/// Inspects the module registry from inside its own open hook.
struct Inspector {
    seen: Arc<Mutex<Vec<String>>>,
}

impl GuiModule for Inspector {
    fn on_open(&mut self, container: &mut GuiContainer, _: &mut GuiContext<'_>) -> GuiResult<()> {
        let mut seen = self.seen.lock();
        seen.push(format!("contains self: {}", container.contains_module("inspector")));
        seen.push(format!("sibling page: {:?}", container.module::<ListModule>("list").map(|l| l.page())));
        seen.push(format!(
            "self lookup busy: {}",
            matches!(container.module::<Inspector>("inspector"), Err(GuiError::ModuleBusy(_)))
        ));
        seen.push(format!("self removable: {}", container.remove_module("inspector").is_some()));
        let duplicate = container.add_module("list", Box::new(ListModule::new("base", ListArea::new(1, 1, 1, 9))));
        seen.push(format!("duplicate rejected: {}", matches!(duplicate, Err(GuiError::DuplicateModule(_)))));
        let fresh = container.add_module("late", Box::new(Recorder {
            name: "late",
            log: Arc::new(Mutex::new(Vec::new())),
            fail_update: false,
        }));
        seen.push(format!("fresh accepted: {}", fresh.is_ok()));
        Ok(())
    }
}

#[test]
fn test_hooks_see_the_module_registry() {
    let (_, manager, player) = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut container = manager.create_container("registry", 1, 9).unwrap();
    container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
    container
        .add_module("list", Box::new(ListModule::new("base", ListArea::new(1, 1, 1, 9))))
        .unwrap();
    container
        .add_module("inspector", Box::new(Inspector { seen: seen.clone() }))
        .unwrap();
    let handle = ContainerHandle::new(container);
    manager.open(player, handle.clone()).unwrap();

    assert_eq!(
        *seen.lock(),
        vec![
            "contains self: true",
            "sibling page: Ok(0)",
            "self lookup busy: true",
            "self removable: false",
            "duplicate rejected: true",
            "fresh accepted: true",
        ]
    );
    let ids: Vec<String> = handle.lock().module_ids().map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["list", "inspector", "late"]);
}

#[test]
fn test_runtime_module_fires_every_period_until_closed() {
    let (_, manager, player) = setup();
    let fired = Arc::new(AtomicU64::new(0));
    let counts = Arc::new(Mutex::new(Vec::new()));

    let mut container = manager.create_container("clock", 1, 9).unwrap();
    container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
    let (fired_in, counts_in) = (fired.clone(), counts.clone());
    container
        .add_module(
            "clock",
            Box::new(RuntimeModule::new(20, move |container, _, count| {
                fired_in.fetch_add(1, Ordering::SeqCst);
                counts_in.lock().push(count);
                container.set_item(
                    1,
                    1,
                    GuiItem::new(ItemStack::new("minecraft:clock").with_amount(count as u8)),
                )?;
                Ok(())
            })),
        )
        .unwrap();
    let handle = ContainerHandle::new(container);
    manager.open(player, handle.clone()).unwrap();

    for tick in 1..=60u64 {
        manager.tick();
        assert_eq!(fired.load(Ordering::SeqCst), tick / 20, "after tick {}", tick);
    }
    assert_eq!(*counts.lock(), vec![1, 2, 3]);
    assert_eq!(handle.lock().get_item(1, 1).unwrap().amount(), 3);

    manager.close(player).unwrap();
    for _ in 0..100 {
        manager.tick();
    }
    assert_eq!(fired.load(Ordering::SeqCst), 3);
    assert!(!handle.lock().module::<RuntimeModule>("clock").unwrap().is_running(player));
    assert_eq!(manager.scheduler().pending(), 0);
}

#[test]
fn test_runtime_module_skips_tick_when_closed_in_same_tick() {
    let (_, manager, player) = setup();
    let fired = Arc::new(AtomicU64::new(0));

    // Queued before the module's own timer, so it runs first on tick 20
    let weak = manager.downgrade();
    manager.scheduler().schedule_once(20, move || {
        if let Some(manager) = weak.upgrade() {
            manager.close(player).unwrap();
        }
    });

    let mut container = manager.create_container("clock", 1, 9).unwrap();
    let fired_in = fired.clone();
    container
        .add_module(
            "clock",
            Box::new(RuntimeModule::new(20, move |_, _, _| {
                fired_in.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
        )
        .unwrap();
    let handle = ContainerHandle::new(container);
    manager.open(player, handle.clone()).unwrap();

    for _ in 0..40 {
        manager.tick();
    }
    assert!(manager.current(player).is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(handle.lock().module::<RuntimeModule>("clock").unwrap().invocations(player), 0);
}

#[test]
fn test_runtime_updates_reach_the_player() {
    let (host, manager, player) = setup();
    let mut container = manager.create_container("clock", 1, 9).unwrap();
    container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
    container
        .add_module(
            "clock",
            Box::new(RuntimeModule::new(5, |container, _, count| {
                container.set_item(1, 2, GuiItem::new(ItemStack::new("minecraft:clock").with_amount(count as u8)))?;
                Ok(())
            })),
        )
        .unwrap();
    manager.open(player, ContainerHandle::new(container)).unwrap();

    for _ in 0..10 {
        manager.tick();
    }
    assert_eq!(host.current_view(player).unwrap().at(1, 2).unwrap().amount, 2);
}

#[test]
fn test_disconnect_stops_runtime_and_evicts_session() {
    let (_, manager, player) = setup();
    let fired = Arc::new(AtomicU64::new(0));
    let mut container = manager.create_container("clock", 1, 9).unwrap();
    let fired_in = fired.clone();
    container
        .add_module(
            "clock",
            Box::new(RuntimeModule::new(1, move |_, _, _| {
                fired_in.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
        )
        .unwrap();
    manager.open(player, ContainerHandle::new(container)).unwrap();
    manager.tick();
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    manager.handle_disconnect(player);
    manager.tick();
    manager.tick();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(manager.session_count(), 0);
}

#[test]
fn test_movable_only_policy_mirrors_moves() {
    let settings = GuiSettings {
        move_limit: MoveLimit::MovableOnly,
        ..GuiSettings::default()
    };
    let (_, manager, player) = setup_with(settings);
    let mut container = manager.create_container("stash", 1, 9).unwrap();
    container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
    container
        .set_item(1, 1, GuiItem::new(ItemStack::new("minecraft:emerald")).movable(true))
        .unwrap();
    container
        .set_item(1, 2, GuiItem::new(ItemStack::new("minecraft:bedrock")))
        .unwrap();
    let handle = ContainerHandle::new(container);
    manager.open(player, handle.clone()).unwrap();

    let taken = manager.handle_click(player, &click(0));
    assert!(!taken.cancelled);
    assert!(handle.lock().get_item(1, 1).is_none());

    let denied = manager.handle_click(player, &click(1));
    assert!(denied.cancelled);
    assert!(handle.lock().get_item(1, 2).is_some());

    let placed = manager.handle_click(
        player,
        &RawInteraction::new(4, ClickType::Left, InventoryAction::PlaceAll).with_cursor(ItemStack::new("minecraft:apple")),
    );
    assert!(!placed.cancelled);
    let container = handle.lock();
    let apple = container.get_item(1, 5).unwrap();
    assert_eq!(apple.material(), "minecraft:apple");
    assert!(apple.is_movable());
}

#[test]
fn test_drags_and_bottom_inventory_under_locked_policy() {
    let (_, manager, player) = setup();
    let mut container = manager.create_container("locked", 1, 9).unwrap();
    container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
    manager.open(player, ContainerHandle::new(container)).unwrap();

    let drag = RawDrag {
        slots: vec![3, 12],
        cursor: Some(ItemStack::new("minecraft:sand").with_amount(2)),
    };
    assert!(manager.handle_drag(player, &drag).cancelled);

    let bottom_only = RawDrag {
        slots: vec![12, 13],
        cursor: None,
    };
    assert!(!manager.handle_drag(player, &bottom_only).cancelled);

    let shift = RawInteraction::new(20, ClickType::ShiftLeft, InventoryAction::MoveToOtherInventory);
    assert!(manager.handle_click(player, &shift).cancelled);
    assert!(!manager.handle_click(player, &click(20)).cancelled);

    let stranger = PlayerId::new();
    assert_eq!(manager.handle_click(stranger, &click(0)), ClickOutcome::default());
}

#[test]
fn test_rename_reopens_view_with_new_title() {
    let (host, manager, player) = setup();
    let mut container = manager.create_container("Old", 1, 9).unwrap();
    container.add_layer(GuiLayer::new("base", 1, 9)).unwrap();
    container
        .set_item(1, 1, GuiItem::new(ItemStack::new("minecraft:name_tag")).with_event(Arc::new(RenameEvent::new("New"))))
        .unwrap();
    manager.open(player, ContainerHandle::new(container)).unwrap();
    host.take_calls();

    manager.handle_click(player, &click(0));
    let calls = host.take_calls();
    assert!(matches!(&calls[..], [HostCall::OpenView(_, view)] if view.title == "New"));
}
