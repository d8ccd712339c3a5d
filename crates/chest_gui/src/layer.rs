//! Layers: z-ordered grids of optional items.
//!
//! Coordinates are 1-based. A layer's declared `rows x cols` is its logical
//! extent; the container's `rows x cols` is the viewport. When the extent is
//! larger than the viewport the layer can be panned through its own offsets
//! (and, unless it is an overlay, the container's global offsets).
//!
//! "Absolute" accessors address the backing grid directly. The plain
//! accessors address the viewport and translate through the layer's own
//! offset. Reads outside the grid come back empty; writes outside the grid
//! are an error.

use crate::error::{GuiError, GuiResult};
use crate::item::GuiItem;

#[derive(Debug, Clone)]
pub struct GuiLayer {
    name: String,
    rows: usize,
    cols: usize,
    view_rows: usize,
    view_cols: usize,
    row_offset: usize,
    col_offset: usize,
    overlay: bool,
    cells: Vec<Option<GuiItem>>,
}

impl GuiLayer {
    /// Creates an empty non-overlay layer. Until the layer is added to a
    /// container, its viewport equals its extent.
    pub fn new(name: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self {
            name: name.into(),
            rows,
            cols,
            view_rows: rows,
            view_cols: cols,
            row_offset: 0,
            col_offset: 0,
            overlay: false,
            cells: vec![None; rows * cols],
        }
    }

    /// Builder form of [`GuiLayer::set_overlay`].
    pub fn overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Visible `(rows, cols)` window size.
    pub fn viewport(&self) -> (usize, usize) {
        (self.view_rows, self.view_cols)
    }

    /// Overlay layers ignore every scroll offset and stay fixed in the view.
    pub fn is_overlay(&self) -> bool {
        self.overlay
    }

    pub fn set_overlay(&mut self, overlay: bool) {
        self.overlay = overlay;
    }

    pub fn toggle_overlay(&mut self) {
        self.overlay = !self.overlay;
    }

    /// Called when the layer joins a container.
    pub(crate) fn attach(&mut self, view_rows: usize, view_cols: usize) {
        self.view_rows = view_rows;
        self.view_cols = view_cols;
        self.row_offset = self.row_offset.min(self.max_row_offset());
        self.col_offset = self.col_offset.min(self.max_col_offset());
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return None;
        }
        Some((row - 1) * self.cols + (col - 1))
    }

    fn checked_index(&self, row: usize, col: usize) -> GuiResult<usize> {
        self.index(row, col).ok_or(GuiError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })
    }

    // ========================================================================
    // Absolute access (backing grid)
    // ========================================================================

    pub fn get_absolute(&self, row: usize, col: usize) -> Option<&GuiItem> {
        self.index(row, col).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_absolute_mut(&mut self, row: usize, col: usize) -> Option<&mut GuiItem> {
        let index = self.index(row, col)?;
        self.cells[index].as_mut()
    }

    /// Places an item, returning whatever was there before.
    pub fn set_absolute(&mut self, row: usize, col: usize, item: GuiItem) -> GuiResult<Option<GuiItem>> {
        let index = self.checked_index(row, col)?;
        Ok(self.cells[index].replace(item))
    }

    pub fn remove_absolute(&mut self, row: usize, col: usize) -> Option<GuiItem> {
        self.index(row, col).and_then(|i| self.cells[i].take())
    }

    // ========================================================================
    // Viewport access (through the layer's own offset)
    // ========================================================================

    fn to_absolute(&self, row: usize, col: usize) -> (usize, usize) {
        (row + self.row_offset, col + self.col_offset)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&GuiItem> {
        let (r, c) = self.to_absolute(row, col);
        self.get_absolute(r, c)
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut GuiItem> {
        let (r, c) = self.to_absolute(row, col);
        self.get_absolute_mut(r, c)
    }

    pub fn set(&mut self, row: usize, col: usize, item: GuiItem) -> GuiResult<Option<GuiItem>> {
        let (r, c) = self.to_absolute(row, col);
        self.set_absolute(r, c, item)
    }

    pub fn remove(&mut self, row: usize, col: usize) -> Option<GuiItem> {
        let (r, c) = self.to_absolute(row, col);
        self.remove_absolute(r, c)
    }

    /// Reads a viewport cell with extra scroll applied on top of the layer's
    /// own offset. Overlays ignore both.
    pub(crate) fn get_scrolled(&self, row: usize, col: usize, extra_rows: usize, extra_cols: usize) -> Option<&GuiItem> {
        let (r, c) = self.scrolled_absolute(row, col, extra_rows, extra_cols);
        self.get_absolute(r, c)
    }

    pub(crate) fn get_scrolled_mut(
        &mut self,
        row: usize,
        col: usize,
        extra_rows: usize,
        extra_cols: usize,
    ) -> Option<&mut GuiItem> {
        let (r, c) = self.scrolled_absolute(row, col, extra_rows, extra_cols);
        self.get_absolute_mut(r, c)
    }

    pub(crate) fn scrolled_absolute(&self, row: usize, col: usize, extra_rows: usize, extra_cols: usize) -> (usize, usize) {
        if self.overlay {
            (row, col)
        } else {
            (
                row + self.row_offset + extra_rows,
                col + self.col_offset + extra_cols,
            )
        }
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Empties every cell; the grid itself is kept.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    /// Puts a clone of `item` into every empty cell.
    pub fn fill_empty(&mut self, item: &GuiItem) {
        for cell in self.cells.iter_mut().filter(|c| c.is_none()) {
            *cell = Some(item.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn item_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupied cells as `(row, col, item)` in absolute coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &GuiItem)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_ref().map(|item| (i / cols + 1, i % cols + 1, item)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut GuiItem)> {
        let cols = self.cols;
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_mut().map(|item| (i / cols + 1, i % cols + 1, item)))
    }

    // ========================================================================
    // Offsets
    // ========================================================================

    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    pub fn col_offset(&self) -> usize {
        self.col_offset
    }

    pub fn max_row_offset(&self) -> usize {
        self.rows.saturating_sub(self.view_rows)
    }

    pub fn max_col_offset(&self) -> usize {
        self.cols.saturating_sub(self.view_cols)
    }

    /// Sets the row offset, clamped to `[0, rows - viewport rows]`.
    pub fn set_row_offset(&mut self, offset: usize) {
        self.row_offset = offset.min(self.max_row_offset());
    }

    pub fn set_col_offset(&mut self, offset: usize) {
        self.col_offset = offset.min(self.max_col_offset());
    }

    pub fn add_row_offset(&mut self, delta: isize) {
        self.set_row_offset(self.row_offset.saturating_add_signed(delta));
    }

    pub fn add_col_offset(&mut self, delta: isize) {
        self.set_col_offset(self.col_offset.saturating_add_signed(delta));
    }

    // ========================================================================
    // Slot conversion
    // ========================================================================

    /// 1-based viewport row of a linear slot index.
    pub fn slot_to_row(&self, slot: usize) -> usize {
        slot / self.view_cols.max(1) + 1
    }

    /// 1-based viewport column of a linear slot index.
    pub fn slot_to_col(&self, slot: usize) -> usize {
        slot % self.view_cols.max(1) + 1
    }

    /// Linear slot index of a viewport cell, `None` outside the viewport.
    pub fn slot_of(&self, row: usize, col: usize) -> Option<usize> {
        if row == 0 || col == 0 || row > self.view_rows || col > self.view_cols {
            return None;
        }
        Some((row - 1) * self.view_cols + (col - 1))
    }
}
