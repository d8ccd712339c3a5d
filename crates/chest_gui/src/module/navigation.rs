//! Back/forward buttons driven by the player's navigation history.

use super::GuiModule;
use crate::container::GuiContainer;
use crate::context::GuiContext;
use crate::error::GuiResult;
use crate::event::builtin::{NavDirection, NavigateEvent};
use crate::item::GuiItem;
use crate::types::ItemStack;
use std::sync::Arc;

/// Layer the buttons are drawn into when none is configured.
pub const NAVIGATION_LAYER: &str = "navigation";

#[derive(Debug, Clone)]
struct NavButton {
    row: usize,
    col: usize,
    item: ItemStack,
}

/// Draws a back and a forward button into an overlay layer. A button is
/// only shown while its history stack has an entry; otherwise the optional
/// placeholder is drawn in its place.
pub struct NavigationModule {
    layer: String,
    navigation: Option<String>,
    back: NavButton,
    forward: NavButton,
    placeholder: Option<ItemStack>,
}

impl NavigationModule {
    pub fn new(back: (usize, usize), forward: (usize, usize)) -> Self {
        Self {
            layer: NAVIGATION_LAYER.to_string(),
            navigation: None,
            back: NavButton {
                row: back.0,
                col: back.1,
                item: ItemStack::new("minecraft:arrow").with_name("Back"),
            },
            forward: NavButton {
                row: forward.0,
                col: forward.1,
                item: ItemStack::new("minecraft:arrow").with_name("Forward"),
            },
            placeholder: None,
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// Uses a fixed navigation context instead of the container's own.
    pub fn in_context(mut self, navigation: impl Into<String>) -> Self {
        self.navigation = Some(navigation.into());
        self
    }

    pub fn with_back_item(mut self, item: ItemStack) -> Self {
        self.back.item = item;
        self
    }

    pub fn with_forward_item(mut self, item: ItemStack) -> Self {
        self.forward.item = item;
        self
    }

    pub fn with_placeholder(mut self, item: ItemStack) -> Self {
        self.placeholder = Some(item);
        self
    }

    fn draw(
        &self,
        container: &mut GuiContainer,
        navigation: &str,
        button: &NavButton,
        direction: NavDirection,
        shown: bool,
    ) -> GuiResult<()> {
        let (rows, cols) = (container.rows(), container.cols());
        let layer = container.ensure_layer(&self.layer, rows, cols, true);

        let item = if shown {
            Some(
                GuiItem::new(button.item.clone())
                    .with_event(Arc::new(NavigateEvent::new(direction).in_context(navigation))),
            )
        } else {
            self.placeholder.clone().map(GuiItem::new)
        };

        // Same look as last time: keep the cell untouched
        let current = layer.get_absolute(button.row, button.col).map(|i| i.view_item().clone());
        let wanted = item.as_ref().map(|i| i.view_item().clone());
        if current == wanted && current.is_some() {
            return Ok(());
        }

        match item {
            Some(item) => {
                layer.set_absolute(button.row, button.col, item)?;
            }
            None => {
                layer.remove_absolute(button.row, button.col);
            }
        }
        Ok(())
    }
}

impl GuiModule for NavigationModule {
    fn on_update(&mut self, container: &mut GuiContainer, ctx: &mut GuiContext<'_>) -> GuiResult<()> {
        let navigation = self
            .navigation
            .clone()
            .unwrap_or_else(|| container.navigation_id().to_string());
        let (has_back, has_forward) = ctx
            .manager()
            .with_navigation(ctx.player(), &navigation, |nav| (nav.has_back(), nav.has_forward()));

        self.draw(container, &navigation, &self.back, NavDirection::Back, has_back)?;
        self.draw(container, &navigation, &self.forward, NavDirection::Forward, has_forward)
    }
}
