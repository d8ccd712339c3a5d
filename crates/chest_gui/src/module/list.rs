//! Paged list of items inside a rectangle of one layer, with optional search.

use super::{GuiModule, ModuleId};
use crate::container::GuiContainer;
use crate::context::GuiContext;
use crate::error::{GuiError, GuiResult};
use crate::event::builtin::{ListPageEvent, PageTurn};
use crate::item::GuiItem;
use crate::search;
use crate::types::{ItemStack, PlayerId};
use std::sync::Arc;
use tracing::debug;

/// Inclusive rectangle in absolute layer coordinates. Corners are
/// normalised on construction, so `top <= bottom` and `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListArea {
    top: usize,
    left: usize,
    bottom: usize,
    right: usize,
}

impl ListArea {
    pub fn new(top: usize, left: usize, bottom: usize, right: usize) -> Self {
        Self {
            top: top.min(bottom),
            left: left.min(right),
            bottom: top.max(bottom),
            right: left.max(right),
        }
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn bottom(&self) -> usize {
        self.bottom
    }

    pub fn right(&self) -> usize {
        self.right
    }

    pub fn rows(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn cols(&self) -> usize {
        self.right - self.left + 1
    }

    /// Number of cells, i.e. items per page.
    pub fn capacity(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Cells row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.top..=self.bottom).flat_map(move |row| (self.left..=self.right).map(move |col| (row, col)))
    }
}

#[derive(Debug, Clone)]
struct PageButton {
    row: usize,
    col: usize,
    item: ItemStack,
}

pub struct ListModule {
    id: Option<ModuleId>,
    layer: String,
    area: ListArea,
    items: Vec<GuiItem>,
    page: usize,
    query: Option<String>,
    previous: Option<PageButton>,
    next: Option<PageButton>,
}

impl ListModule {
    pub fn new(layer: impl Into<String>, area: ListArea) -> Self {
        Self {
            id: None,
            layer: layer.into(),
            area,
            items: Vec::new(),
            page: 0,
            query: None,
            previous: None,
            next: None,
        }
    }

    pub fn with_items<I: IntoIterator<Item = GuiItem>>(mut self, items: I) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    /// Hot cell that turns to the previous page, shown only when there is one.
    pub fn with_previous_button(mut self, row: usize, col: usize, item: ItemStack) -> Self {
        self.previous = Some(PageButton { row, col, item });
        self
    }

    pub fn with_next_button(mut self, row: usize, col: usize, item: ItemStack) -> Self {
        self.next = Some(PageButton { row, col, item });
        self
    }

    pub fn items(&self) -> &[GuiItem] {
        &self.items
    }

    pub fn set_items<I: IntoIterator<Item = GuiItem>>(&mut self, items: I) {
        self.items = items.into_iter().collect();
        self.page = self.page.min(self.page_count() - 1);
    }

    pub fn push_item(&mut self, item: GuiItem) {
        self.items.push(item);
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.area.capacity()
    }

    /// Always at least one, even for an empty list.
    pub fn page_count(&self) -> usize {
        let size = self.page_size().max(1);
        self.visible().len().div_ceil(size).max(1)
    }

    pub fn search_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Narrows the list to items whose name or lore matches `query`, and goes
    /// back to the first page.
    pub fn search(&mut self, query: impl Into<String>) {
        self.query = Some(query.into());
        self.page = 0;
    }

    pub fn clear_search(&mut self) {
        self.query = None;
        self.page = 0;
    }

    /// Items the current search lets through, in list order.
    pub fn visible(&self) -> Vec<&GuiItem> {
        match &self.query {
            Some(query) => self.items.iter().filter(|i| search::matches_item(i, query)).collect(),
            None => self.items.iter().collect(),
        }
    }

    /// Jumps to page `index` (clamped to the last page) and redraws.
    pub fn to_list_page(&mut self, index: usize, player: PlayerId, container: &mut GuiContainer) -> GuiResult<()> {
        self.page = index.min(self.page_count() - 1);
        debug!("List page {} of {} for player {}", self.page + 1, self.page_count(), player);
        self.render(container)
    }

    pub fn next_page(&mut self, player: PlayerId, container: &mut GuiContainer) -> GuiResult<()> {
        self.to_list_page(self.page + 1, player, container)
    }

    pub fn previous_page(&mut self, player: PlayerId, container: &mut GuiContainer) -> GuiResult<()> {
        self.to_list_page(self.page.saturating_sub(1), player, container)
    }

    /// Writes the current page and the page-turn cells into the layer.
    pub fn render(&self, container: &mut GuiContainer) -> GuiResult<()> {
        let page_size = self.page_size();
        let page_count = self.page_count();
        let page: Vec<GuiItem> = self
            .visible()
            .into_iter()
            .skip(self.page * page_size)
            .take(page_size)
            .map(|item| {
                let mut item = item.clone();
                item.set_changed(false);
                item
            })
            .collect();

        let layer = container.require_layer_mut(&self.layer)?;
        let mut page = page.into_iter();
        for (row, col) in self.area.cells() {
            match page.next() {
                Some(item) => {
                    layer.set_absolute(row, col, item)?;
                }
                None => {
                    layer.remove_absolute(row, col);
                }
            }
        }

        let buttons = [
            (&self.previous, PageTurn::Previous, self.page > 0),
            (&self.next, PageTurn::Next, self.page + 1 < page_count),
        ];
        for (button, turn, shown) in buttons {
            let Some(button) = button else {
                continue;
            };
            if !shown {
                layer.remove_absolute(button.row, button.col);
                continue;
            }
            let mut item = GuiItem::new(button.item.clone());
            item.set_changed(false);
            if let Some(id) = &self.id {
                item.add_event(Arc::new(ListPageEvent::new(id, turn)));
            }
            layer.set_absolute(button.row, button.col, item)?;
        }
        Ok(())
    }
}

impl GuiModule for ListModule {
    fn on_attach(&mut self, id: &ModuleId) {
        self.id = Some(id.clone());
    }

    fn on_open(&mut self, container: &mut GuiContainer, _: &mut GuiContext<'_>) -> GuiResult<()> {
        if container.layer(&self.layer).is_none() {
            return Err(GuiError::LayerNotFound(self.layer.clone()));
        }
        Ok(())
    }

    fn on_update(&mut self, container: &mut GuiContainer, _: &mut GuiContext<'_>) -> GuiResult<()> {
        self.page = self.page.min(self.page_count() - 1);
        self.render(container)
    }
}
