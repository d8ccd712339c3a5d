//! Demo menus and the scripted session the sandbox replays.
//!
//! The main menu links to a paged catalogue, a freshly built skill tree and a
//! ticking clock. A scripted player walks through them with raw slot clicks
//! the same way a real client would.

use crate::host::ConsoleHost;
use anyhow::{anyhow, Result};
use chest_gui::{
    AnimationModule, BranchStyle, CallbackEvent, ClickType, ContainerHandle, GiveItemEvent, GuiContainer, GuiError,
    GuiItem, GuiLayer, GuiManager, GuiResult, InventoryAction, ItemStack, ListArea, ListModule, ListPageEvent,
    MessageEvent, NavigationModule, OpenEvent, OpenNewEvent, PageTurn, PlaySoundEvent, PlayerId, RawInteraction,
    RenameEvent, RuntimeModule, Sound, TreeModule, TreeNode,
};
use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const CATALOGUE_MODULE: &str = "catalogue";

fn button(material: &str, name: &str) -> GuiItem {
    GuiItem::new(ItemStack::new(material).with_name(name))
}

/// Slot index of a 1-based cell in a nine-wide container.
pub fn slot(row: usize, col: usize) -> usize {
    (row - 1) * 9 + (col - 1)
}

// ============================================================================
// Menus
// ============================================================================

/// Four rows: a three-row paged list of every material, page buttons in the
/// corners and navigation in the middle of the bottom row.
pub fn catalogue(manager: &GuiManager) -> GuiResult<GuiContainer> {
    let mut container = manager.create_container("Catalogue", 4, 9)?;
    container.add_layer(GuiLayer::new("content", 4, 9))?;

    let entries = ["stone", "gold_ingot", "gold_block", "iron_ingot", "diamond", "emerald", "redstone"]
        .iter()
        .cycle()
        .take(60)
        .enumerate()
        .map(|(i, material)| {
            GuiItem::new(
                ItemStack::new(format!("minecraft:{}", material))
                    .with_name(format!("{} #{}", material.replace('_', " "), i + 1))
                    .with_lore([format!("Entry {} of 60", i + 1)]),
            )
        });
    container.add_module(
        CATALOGUE_MODULE,
        Box::new(
            ListModule::new("content", ListArea::new(1, 1, 3, 9))
                .with_items(entries)
                .with_previous_button(4, 1, ItemStack::new("minecraft:arrow").with_name("Previous"))
                .with_next_button(4, 9, ItemStack::new("minecraft:arrow").with_name("Next")),
        ),
    )?;
    container.add_module("nav", Box::new(NavigationModule::new((4, 4), (4, 6))))?;

    let search = button("minecraft:spyglass", "Only gold").with_event(Arc::new(CallbackEvent::new(
        "search_gold",
        |container, _, _| {
            container.with_module::<ListModule, _>(CATALOGUE_MODULE, |list, _| match list.search_query() {
                Some(_) => list.clear_search(),
                None => list.search("gold"),
            })
        },
    )));
    let first = button("minecraft:compass", "First page")
        .with_event(Arc::new(ListPageEvent::new(CATALOGUE_MODULE, PageTurn::To(0))));
    let content = container.require_layer_mut("content")?;
    content.set_absolute(4, 5, search)?;
    content.set_absolute(4, 2, first)?;
    Ok(container)
}

/// A small skill tree, rebuilt on every visit.
pub fn skill_tree(player: PlayerId) -> GuiResult<GuiContainer> {
    let mut container = GuiContainer::new(format!("Skills of {}", player), 5, 9)?;
    container.add_layer(GuiLayer::new("tree", 5, 9))?;

    let skill = |material: &str, name: &str| GuiItem::new(ItemStack::new(material).with_name(name));
    let tree = TreeModule::new("tree", ItemStack::new("minecraft:white_stained_glass_pane").with_name(" "))
        .with_style(BranchStyle::VerticalFirst)
        .with_root(
            TreeNode::new(1, 5, skill("minecraft:wooden_sword", "Basics"))
                .with_child(
                    TreeNode::new(3, 2, skill("minecraft:iron_sword", "Swordsmanship"))
                        .with_child(TreeNode::new(5, 2, skill("minecraft:diamond_sword", "Mastery"))),
                )
                .with_child(TreeNode::new(3, 8, skill("minecraft:bow", "Archery"))),
        );
    container.add_module("tree", Box::new(tree))?;
    container.add_module("nav", Box::new(NavigationModule::new((5, 9), (5, 8))))?;
    Ok(container)
}

/// A clock that counts the seconds the player has been looking at it.
pub fn clock(manager: &GuiManager) -> GuiResult<GuiContainer> {
    let mut container = manager.create_container("Clock", 3, 9)?;
    container.add_layer(GuiLayer::new("face", 3, 9))?;
    container.set_item(2, 5, button("minecraft:clock", "0 seconds"))?;
    container.add_module(
        "ticker",
        Box::new(RuntimeModule::new(20, |container, _, seconds| {
            let item = container
                .get_item_mut(2, 5)
                .ok_or_else(|| GuiError::Handler("clock face is missing".to_string()))?;
            item.set_item(ItemStack::new("minecraft:clock").with_name(format!("{} seconds", seconds)));
            Ok(())
        })),
    )?;
    container.add_module("nav", Box::new(NavigationModule::new((3, 1), (3, 9))))?;
    Ok(container)
}

/// The hub every other menu is reached from.
pub fn main_menu(manager: &GuiManager) -> GuiResult<ContainerHandle> {
    let catalogue = ContainerHandle::new(catalogue(manager)?);
    let clock = ContainerHandle::new(clock(manager)?);

    let mut container = manager.create_container("Main Menu", 3, 9)?;
    container.add_layer(GuiLayer::new("content", 3, 9))?;
    container.set_item(1, 5, button("minecraft:beacon", "Welcome"))?;
    container.set_item(
        2,
        2,
        button("minecraft:chest", "Catalogue").with_event(Arc::new(OpenEvent::new(catalogue))),
    )?;
    container.set_item(
        2,
        4,
        button("minecraft:experience_bottle", "Skills").with_event(Arc::new(OpenNewEvent::new(skill_tree))),
    )?;
    container.set_item(
        2,
        6,
        button("minecraft:cake", "Free cake")
            .with_event(Arc::new(GiveItemEvent::new(ItemStack::new("minecraft:cake"))))
            .with_event(Arc::new(PlaySoundEvent::new(Sound::new("entity.player.levelup").with_pitch(1.5))))
            .with_event(Arc::new(MessageEvent::new("Enjoy!"))),
    )?;
    container.set_item(
        2,
        8,
        button("minecraft:clock", "Clock").with_event(Arc::new(OpenEvent::new(clock))),
    )?;
    container.set_item(
        3,
        5,
        button("minecraft:name_tag", "Rename").with_event(Arc::new(RenameEvent::new("Main Menu (renamed)"))),
    )?;
    container.set_item(
        3,
        3,
        button("minecraft:lever", "Broken lever").with_event(Arc::new(CallbackEvent::new("broken", |_, _, _| {
            Err(GuiError::Handler("the lever is rusted shut".to_string()))
        }))),
    )?;
    container.add_module(
        "welcome",
        Box::new(AnimationModule::new(10).animate(
            1,
            5,
            [
                ItemStack::new("minecraft:beacon").with_name("Welcome"),
                ItemStack::new("minecraft:sea_lantern").with_name("Welcome"),
            ],
        )),
    )?;
    container.add_module("nav", Box::new(NavigationModule::new((3, 1), (3, 9))))?;
    Ok(ContainerHandle::new(container))
}

// ============================================================================
// Scripted session
// ============================================================================

#[derive(Debug, Clone)]
pub enum Step {
    Open,
    Click(usize),
    CloseInventory,
    Disconnect,
}

/// What the scripted player does, keyed by the tick it happens on.
pub fn script() -> Vec<(u64, Step)> {
    vec![
        (1, Step::Open),
        (3, Step::Click(slot(2, 2))),  // catalogue
        (5, Step::Click(slot(4, 9))),  // next page
        (7, Step::Click(slot(4, 5))),  // search "gold"
        (9, Step::Click(slot(4, 4))),  // back to main
        (11, Step::Click(slot(3, 9))), // forward to catalogue
        (13, Step::Click(slot(4, 4))), // back again
        (15, Step::Click(slot(2, 4))), // skill tree
        (17, Step::CloseInventory),
        (19, Step::Open),
        (21, Step::Click(slot(2, 6))), // cake
        (23, Step::Click(slot(3, 3))), // broken lever
        (25, Step::Click(slot(3, 5))), // rename
        (27, Step::Click(slot(2, 8))), // clock
        (120, Step::Click(slot(3, 1))),
        (140, Step::Disconnect),
    ]
}

/// Drives the menus for one scripted player.
pub struct Sandbox {
    manager: Arc<GuiManager>,
    host: Arc<ConsoleHost>,
    player: PlayerId,
    main_menu: ContainerHandle,
    steps: VecDeque<(u64, Step)>,
}

impl Sandbox {
    pub fn new(manager: Arc<GuiManager>, host: Arc<ConsoleHost>) -> Result<Self> {
        let main_menu = main_menu(&manager).map_err(|e| anyhow!("failed to build main menu: {e}"))?;
        Ok(Self {
            manager,
            host,
            player: PlayerId::new(),
            main_menu,
            steps: script().into(),
        })
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn remaining_steps(&self) -> usize {
        self.steps.len()
    }

    /// Plays every step due at `tick`.
    pub fn replay(&mut self, tick: u64) {
        while self.steps.front().is_some_and(|(at, _)| *at <= tick) {
            let Some((_, step)) = self.steps.pop_front() else {
                break;
            };
            self.apply(step);
        }
    }

    fn apply(&self, step: Step) {
        debug!("▶️ {:?}", step);
        match step {
            Step::Open => {
                if let Err(e) = self.manager.open(self.player, self.main_menu.clone()) {
                    warn!("Could not open main menu: {}", e);
                }
            }
            Step::Click(slot) => {
                let outcome = self.manager.handle_click(
                    self.player,
                    &RawInteraction::new(slot, ClickType::Left, InventoryAction::PickupAll),
                );
                debug!(
                    "Click on slot {} fired {} event(s), cancelled: {}",
                    slot, outcome.events_fired, outcome.cancelled
                );
            }
            Step::CloseInventory => {
                self.manager.handle_inventory_closed(self.player);
            }
            Step::Disconnect => {
                self.manager.handle_disconnect(self.player);
            }
        }
    }

    /// Advances the scheduler once per interval until `budget` ticks ran.
    pub async fn run(&mut self, interval_ms: u64, budget: u64) -> Result<()> {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        for tick in 1..=budget {
            interval.tick().await;
            let ran = self.manager.tick();
            if ran > 0 {
                debug!("⏱️ Tick {} ran {} task(s)", tick, ran);
            }
            self.replay(tick);
        }
        info!("Tick budget of {} exhausted ({} scripted steps left)", budget, self.remaining_steps());
        Ok(())
    }

    pub fn report(&self) {
        let stats = self.host.stats();
        info!(
            "📊 views opened: {}, slots updated: {}, views closed: {}, messages: {}, sessions left: {}",
            stats.views_opened.load(Ordering::Relaxed),
            stats.slots_updated.load(Ordering::Relaxed),
            stats.views_closed.load(Ordering::Relaxed),
            stats.messages.load(Ordering::Relaxed),
            self.manager.session_count()
        );
    }
}
