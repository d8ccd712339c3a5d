//! Ready-made slot events.

use super::{ClickFilter, ClickInfo, GuiEvent};
use crate::container::{ContainerHandle, GuiContainer};
use crate::context::GuiContext;
use crate::error::GuiResult;
use crate::module::list::ListModule;
use crate::module::ModuleId;
use crate::types::{ClickType, ItemStack, PlayerId, Sound};
use std::sync::Arc;

/// Adds a `with_clicks` builder to an event holding a `clicks: ClickFilter`.
macro_rules! click_filtered {
    ($event:ty) => {
        impl $event {
            /// Restricts the click types this event reacts to.
            pub fn with_clicks(mut self, clicks: ClickFilter) -> Self {
                self.clicks = clicks;
                self
            }
        }
    };
}

/// Gives the clicking player a copy of an item.
pub struct GiveItemEvent {
    item: ItemStack,
    clicks: ClickFilter,
}

impl GiveItemEvent {
    pub fn new(item: ItemStack) -> Self {
        Self {
            item,
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(GiveItemEvent);

impl GuiEvent for GiveItemEvent {
    fn name(&self) -> &str {
        "give_item"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        ctx.host().give_item(ctx.player(), self.item.clone());
        Ok(())
    }
}

/// Plays a sound to the clicking player.
pub struct PlaySoundEvent {
    sound: Sound,
    clicks: ClickFilter,
}

impl PlaySoundEvent {
    pub fn new(sound: Sound) -> Self {
        Self {
            sound,
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(PlaySoundEvent);

impl GuiEvent for PlaySoundEvent {
    fn name(&self) -> &str {
        "play_sound"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        ctx.host().play_sound(ctx.player(), &self.sound);
        Ok(())
    }
}

/// Sends a chat message to the clicking player.
pub struct MessageEvent {
    text: String,
    clicks: ClickFilter,
}

impl MessageEvent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(MessageEvent);

impl GuiEvent for MessageEvent {
    fn name(&self) -> &str {
        "message"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        ctx.host().send_message(ctx.player(), &self.text);
        Ok(())
    }
}

/// Opens an existing container instance.
pub struct OpenEvent {
    target: ContainerHandle,
    clicks: ClickFilter,
}

impl OpenEvent {
    pub fn new(target: ContainerHandle) -> Self {
        Self {
            target,
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(OpenEvent);

impl GuiEvent for OpenEvent {
    fn name(&self) -> &str {
        "open"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        ctx.open(self.target.clone());
        Ok(())
    }
}

pub type ContainerFactory = dyn Fn(PlayerId) -> GuiResult<GuiContainer> + Send + Sync;

/// Builds a fresh container on every click and opens it.
pub struct OpenNewEvent {
    factory: Arc<ContainerFactory>,
    clicks: ClickFilter,
}

impl OpenNewEvent {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(PlayerId) -> GuiResult<GuiContainer> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(OpenNewEvent);

impl GuiEvent for OpenNewEvent {
    fn name(&self) -> &str {
        "open_new"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        let container = (self.factory)(ctx.player())?;
        ctx.open(ContainerHandle::new(container));
        Ok(())
    }
}

/// Closes the player's view.
pub struct CloseEvent {
    clicks: ClickFilter,
}

impl CloseEvent {
    pub fn new() -> Self {
        Self {
            clicks: ClickFilter::default(),
        }
    }
}

impl Default for CloseEvent {
    fn default() -> Self {
        Self::new()
    }
}

click_filtered!(CloseEvent);

impl GuiEvent for CloseEvent {
    fn name(&self) -> &str {
        "close"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, _: &mut GuiContainer, ctx: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        ctx.close();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Back,
    Forward,
}

/// Moves through the player's navigation history.
///
/// Without an explicit context the clicked container's navigation id is used.
pub struct NavigateEvent {
    direction: NavDirection,
    navigation: Option<String>,
    clicks: ClickFilter,
}

impl NavigateEvent {
    pub fn new(direction: NavDirection) -> Self {
        Self {
            direction,
            navigation: None,
            clicks: ClickFilter::default(),
        }
    }

    pub fn in_context(mut self, navigation: impl Into<String>) -> Self {
        self.navigation = Some(navigation.into());
        self
    }

    pub fn direction(&self) -> NavDirection {
        self.direction
    }
}

click_filtered!(NavigateEvent);

impl GuiEvent for NavigateEvent {
    fn name(&self) -> &str {
        match self.direction {
            NavDirection::Back => "navigate_back",
            NavDirection::Forward => "navigate_forward",
        }
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(
        &self,
        container: &mut GuiContainer,
        ctx: &mut GuiContext<'_>,
        _: &ClickInfo,
    ) -> GuiResult<()> {
        let navigation = self
            .navigation
            .clone()
            .unwrap_or_else(|| container.navigation_id().to_string());
        match self.direction {
            NavDirection::Back => ctx.back(navigation),
            NavDirection::Forward => ctx.forward(navigation),
        }
        Ok(())
    }
}

/// Empties every cell of a named layer.
pub struct ClearLayerEvent {
    layer: String,
    clicks: ClickFilter,
}

impl ClearLayerEvent {
    pub fn new(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(ClearLayerEvent);

impl GuiEvent for ClearLayerEvent {
    fn name(&self) -> &str {
        "clear_layer"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, container: &mut GuiContainer, _: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        container.require_layer_mut(&self.layer)?.clear();
        Ok(())
    }
}

/// Changes the container title. The new title reaches the client on the next
/// update push, which reopens the view.
pub struct RenameEvent {
    title: String,
    clicks: ClickFilter,
}

impl RenameEvent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(RenameEvent);

impl GuiEvent for RenameEvent {
    fn name(&self) -> &str {
        "rename"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, container: &mut GuiContainer, _: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        container.set_title(self.title.clone());
        Ok(())
    }
}

/// Pans the container's global scroll offset.
pub struct ScrollEvent {
    rows: isize,
    cols: isize,
    clicks: ClickFilter,
}

impl ScrollEvent {
    pub fn new(rows: isize, cols: isize) -> Self {
        Self {
            rows,
            cols,
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(ScrollEvent);

impl GuiEvent for ScrollEvent {
    fn name(&self) -> &str {
        "scroll"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(&self, container: &mut GuiContainer, _: &mut GuiContext<'_>, _: &ClickInfo) -> GuiResult<()> {
        container.add_row_offset(self.rows);
        container.add_col_offset(self.cols);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn {
    Next,
    Previous,
    To(usize),
}

/// Turns the page of a list module registered on the clicked container.
pub struct ListPageEvent {
    module: ModuleId,
    turn: PageTurn,
    clicks: ClickFilter,
}

impl ListPageEvent {
    pub fn new(module: impl Into<ModuleId>, turn: PageTurn) -> Self {
        Self {
            module: module.into(),
            turn,
            clicks: ClickFilter::default(),
        }
    }

    pub fn turn(&self) -> PageTurn {
        self.turn
    }
}

click_filtered!(ListPageEvent);

impl GuiEvent for ListPageEvent {
    fn name(&self) -> &str {
        "list_page"
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(
        &self,
        container: &mut GuiContainer,
        ctx: &mut GuiContext<'_>,
        _: &ClickInfo,
    ) -> GuiResult<()> {
        let player = ctx.player();
        let turn = self.turn;
        container.with_module::<ListModule, _>(&self.module, |list, container| match turn {
            PageTurn::Next => list.next_page(player, container),
            PageTurn::Previous => list.previous_page(player, container),
            PageTurn::To(index) => list.to_list_page(index, player, container),
        })?
    }
}

pub type EventCallback =
    dyn Fn(&mut GuiContainer, &mut GuiContext<'_>, &ClickInfo) -> GuiResult<()> + Send + Sync;

/// Closure-backed event for one-off behaviour.
pub struct CallbackEvent {
    name: String,
    callback: Box<EventCallback>,
    clicks: ClickFilter,
}

impl CallbackEvent {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut GuiContainer, &mut GuiContext<'_>, &ClickInfo) -> GuiResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callback: Box::new(callback),
            clicks: ClickFilter::default(),
        }
    }
}

click_filtered!(CallbackEvent);

impl GuiEvent for CallbackEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, click: ClickType) -> bool {
        self.clicks.accepts(click)
    }

    fn execute(
        &self,
        container: &mut GuiContainer,
        ctx: &mut GuiContext<'_>,
        click: &ClickInfo,
    ) -> GuiResult<()> {
        (self.callback)(container, ctx, click)
    }
}
