//! The composed GUI: a stack of layers plus the modules that drive them.
//!
//! Compositing rule: layers are stacked in insertion order and the last added
//! layer is on top. The effective item at a viewport cell is the item from
//! the topmost layer holding one there after scroll translation. Overlay
//! layers never scroll but do not get any compositing priority.

use crate::context::GuiContext;
use crate::error::{GuiError, GuiResult};
use crate::host::RenderSnapshot;
use crate::item::GuiItem;
use crate::layer::GuiLayer;
use crate::module::{GuiModule, ModuleId};
use crate::types::PlayerId;
use parking_lot::{Mutex, MutexGuard};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Largest chest-style inventory the host can show.
pub const MAX_ROWS: usize = 6;
pub const MAX_COLS: usize = 9;

/// Navigation context used when a container does not name one.
pub const DEFAULT_NAVIGATION: &str = "default";

// ============================================================================
// Shared handle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub Uuid);

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared, lockable reference to a container.
///
/// Equality is identity: two handles are equal when they point at the same
/// container instance. Navigation history stores handles.
#[derive(Clone)]
pub struct ContainerHandle {
    id: ContainerId,
    inner: Arc<Mutex<GuiContainer>>,
}

impl ContainerHandle {
    pub fn new(container: GuiContainer) -> Self {
        Self {
            id: ContainerId(Uuid::new_v4()),
            inner: Arc::new(Mutex::new(container)),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn lock(&self) -> MutexGuard<'_, GuiContainer> {
        self.inner.lock()
    }
}

impl PartialEq for ContainerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ContainerHandle {}

impl std::fmt::Debug for ContainerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerHandle").field("id", &self.id).finish()
    }
}

// ============================================================================
// Matched slots
// ============================================================================

/// A visible cell handed to [`GuiContainer::for_matched_slots`] callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMatch {
    pub slot: usize,
    pub row: usize,
    pub col: usize,
    /// Name of the layer the effective item lives in
    pub layer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Update,
    AfterUpdate,
    Close,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Phase::Open => "open",
            Phase::Update => "update",
            Phase::AfterUpdate => "after-update",
            Phase::Close => "close",
        }
    }
}

// ============================================================================
// Container
// ============================================================================

pub struct GuiContainer {
    title: String,
    title_changed: bool,
    rows: usize,
    cols: usize,
    row_offset: usize,
    col_offset: usize,
    navigation: String,
    layers: Vec<GuiLayer>,
    /// `None` while the module is out running a hook
    modules: Vec<(ModuleId, Option<Box<dyn GuiModule>>)>,
}

impl GuiContainer {
    /// Creates an empty container within the default 6x9 chest limits.
    pub fn new(title: impl Into<String>, rows: usize, cols: usize) -> GuiResult<Self> {
        Self::with_limits(title, rows, cols, MAX_ROWS, MAX_COLS)
    }

    /// Creates an empty container, validating the size against custom limits.
    pub fn with_limits(
        title: impl Into<String>,
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    ) -> GuiResult<Self> {
        if rows == 0 || cols == 0 || rows > max_rows || cols > max_cols {
            return Err(GuiError::InvalidDimensions {
                rows,
                cols,
                max_rows,
                max_cols,
            });
        }
        Ok(Self {
            title: title.into(),
            title_changed: false,
            rows,
            cols,
            row_offset: 0,
            col_offset: 0,
            navigation: DEFAULT_NAVIGATION.to_string(),
            layers: Vec::new(),
            modules: Vec::new(),
        })
    }

    /// Builder form of [`GuiContainer::set_navigation_id`].
    pub fn in_navigation(mut self, navigation: impl Into<String>) -> Self {
        self.navigation = navigation.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Renames the container. Hosts cannot rename an open inventory, so the
    /// next push reopens the view.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.title_changed = true;
        }
    }

    pub(crate) fn take_title_changed(&mut self) -> bool {
        std::mem::replace(&mut self.title_changed, false)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of visible slots.
    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    /// Navigation context this container records history into.
    pub fn navigation_id(&self) -> &str {
        &self.navigation
    }

    pub fn set_navigation_id(&mut self, navigation: impl Into<String>) {
        self.navigation = navigation.into();
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Pushes a layer on top of the stack. Names must be unique.
    pub fn add_layer(&mut self, mut layer: GuiLayer) -> GuiResult<&mut GuiLayer> {
        if self.layer_index(layer.name()).is_some() {
            return Err(GuiError::DuplicateLayer(layer.name().to_string()));
        }
        layer.attach(self.rows, self.cols);
        let index = self.layers.len();
        self.layers.push(layer);
        Ok(&mut self.layers[index])
    }

    /// Returns the named layer, creating an empty one on top if missing.
    pub fn ensure_layer(&mut self, name: &str, rows: usize, cols: usize, overlay: bool) -> &mut GuiLayer {
        let index = match self.layer_index(name) {
            Some(index) => index,
            None => {
                let mut layer = GuiLayer::new(name, rows, cols).overlay(overlay);
                layer.attach(self.rows, self.cols);
                self.layers.push(layer);
                self.layers.len() - 1
            }
        };
        &mut self.layers[index]
    }

    pub fn remove_layer(&mut self, name: &str) -> Option<GuiLayer> {
        let index = self.layer_index(name)?;
        let layer = self.layers.remove(index);
        self.row_offset = self.row_offset.min(self.max_row_offset());
        self.col_offset = self.col_offset.min(self.max_col_offset());
        Some(layer)
    }

    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name() == name)
    }

    pub fn layer(&self, name: &str) -> Option<&GuiLayer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut GuiLayer> {
        self.layers.iter_mut().find(|l| l.name() == name)
    }

    /// Like [`GuiContainer::layer_mut`] but a missing layer is an error.
    pub fn require_layer_mut(&mut self, name: &str) -> GuiResult<&mut GuiLayer> {
        self.layer_mut(name)
            .ok_or_else(|| GuiError::LayerNotFound(name.to_string()))
    }

    /// Layer by z-index, 0 being the bottom.
    pub fn layer_at(&self, index: usize) -> Option<&GuiLayer> {
        self.layers.get(index)
    }

    pub fn layer_at_mut(&mut self, index: usize) -> Option<&mut GuiLayer> {
        self.layers.get_mut(index)
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> &[GuiLayer] {
        &self.layers
    }

    // ========================================================================
    // Composited cell access
    // ========================================================================

    /// Index of the topmost layer with an item at a viewport cell.
    fn top_layer_at(&self, row: usize, col: usize) -> Option<usize> {
        let (dr, dc) = (self.row_offset, self.col_offset);
        self.layers
            .iter()
            .rposition(|layer| layer.get_scrolled(row, col, dr, dc).is_some())
    }

    /// The effective item at a viewport cell, or `None` if every layer is
    /// empty there.
    pub fn get_item(&self, row: usize, col: usize) -> Option<&GuiItem> {
        self.resolve(row, col).map(|(_, item)| item)
    }

    pub fn get_item_mut(&mut self, row: usize, col: usize) -> Option<&mut GuiItem> {
        let index = self.top_layer_at(row, col)?;
        let (dr, dc) = (self.row_offset, self.col_offset);
        self.layers[index].get_scrolled_mut(row, col, dr, dc)
    }

    /// The effective item together with the layer it comes from.
    pub fn resolve(&self, row: usize, col: usize) -> Option<(&GuiLayer, &GuiItem)> {
        let index = self.top_layer_at(row, col)?;
        let layer = &self.layers[index];
        layer
            .get_scrolled(row, col, self.row_offset, self.col_offset)
            .map(|item| (layer, item))
    }

    /// Writes into the topmost layer that already has an item at the cell,
    /// or into the top layer when the cell is empty everywhere.
    pub fn set_item(&mut self, row: usize, col: usize, item: GuiItem) -> GuiResult<Option<GuiItem>> {
        let index = self
            .top_layer_at(row, col)
            .or_else(|| self.layers.len().checked_sub(1))
            .ok_or(GuiError::NoLayers)?;
        let (dr, dc) = (self.row_offset, self.col_offset);
        let layer = &mut self.layers[index];
        let (r, c) = layer.scrolled_absolute(row, col, dr, dc);
        layer.set_absolute(r, c, item)
    }

    /// Removes the effective item at a viewport cell.
    pub fn remove_item(&mut self, row: usize, col: usize) -> Option<GuiItem> {
        let index = self.top_layer_at(row, col)?;
        let (dr, dc) = (self.row_offset, self.col_offset);
        let layer = &mut self.layers[index];
        let (r, c) = layer.scrolled_absolute(row, col, dr, dc);
        layer.remove_absolute(r, c)
    }

    /// Viewport row of a linear slot.
    pub fn slot_to_row(&self, slot: usize) -> usize {
        slot / self.cols + 1
    }

    pub fn slot_to_col(&self, slot: usize) -> usize {
        slot % self.cols + 1
    }

    /// Calls `callback` for every visible cell whose effective item satisfies
    /// `matcher`. Returns how many cells matched.
    pub fn for_matched_slots<M, F>(&mut self, player: PlayerId, matcher: M, mut callback: F) -> usize
    where
        M: Fn(&SlotMatch, &GuiItem) -> bool,
        F: FnMut(PlayerId, &SlotMatch, &mut GuiItem),
    {
        let mut matched = 0;
        for slot in 0..self.size() {
            let (row, col) = (self.slot_to_row(slot), self.slot_to_col(slot));
            let Some((layer, item)) = self.resolve(row, col) else {
                continue;
            };
            let found = SlotMatch {
                slot,
                row,
                col,
                layer: layer.name().to_string(),
            };
            if !matcher(&found, item) {
                continue;
            }
            if let Some(item) = self.get_item_mut(row, col) {
                callback(player, &found, item);
                matched += 1;
            }
        }
        matched
    }

    // ========================================================================
    // Global scroll
    // ========================================================================

    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    pub fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Largest row offset that keeps the viewport inside the tallest
    /// scrolling layer.
    pub fn max_row_offset(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| !l.is_overlay())
            .map(|l| l.rows().saturating_sub(self.rows))
            .max()
            .unwrap_or(0)
    }

    pub fn max_col_offset(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| !l.is_overlay())
            .map(|l| l.cols().saturating_sub(self.cols))
            .max()
            .unwrap_or(0)
    }

    pub fn set_row_offset(&mut self, offset: usize) {
        self.row_offset = offset.min(self.max_row_offset());
    }

    pub fn set_col_offset(&mut self, offset: usize) {
        self.col_offset = offset.min(self.max_col_offset());
    }

    /// Scrolls vertically, clamping instead of rejecting out-of-range moves.
    pub fn add_row_offset(&mut self, delta: isize) {
        self.set_row_offset(self.row_offset.saturating_add_signed(delta));
    }

    pub fn add_col_offset(&mut self, delta: isize) {
        self.set_col_offset(self.col_offset.saturating_add_signed(delta));
    }

    // ========================================================================
    // Modules
    // ========================================================================

    /// Registers a module under an application-chosen id.
    ///
    /// Modules registered from inside a hook join the next pass, not the one
    /// currently running.
    pub fn add_module(&mut self, id: impl Into<ModuleId>, mut module: Box<dyn GuiModule>) -> GuiResult<()> {
        let id = id.into();
        if self.contains_module(&id) {
            return Err(GuiError::DuplicateModule(id.to_string()));
        }
        module.on_attach(&id);
        self.modules.push((id, Some(module)));
        Ok(())
    }

    /// Also true for a module that is busy running a hook.
    pub fn contains_module(&self, id: &str) -> bool {
        self.modules.iter().any(|(m, _)| m.as_str() == id)
    }

    /// Returns `None` when the module is unknown or is the one running the
    /// current hook.
    pub fn remove_module(&mut self, id: &str) -> Option<Box<dyn GuiModule>> {
        let index = self.module_index(id)?;
        if self.modules[index].1.is_none() {
            warn!("Module '{}' cannot be removed while it runs a hook", id);
            return None;
        }
        self.modules.remove(index).1
    }

    /// Module ids in dispatch order.
    pub fn module_ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.modules.iter().map(|(id, _)| id)
    }

    fn module_index(&self, id: &str) -> Option<usize> {
        self.modules.iter().position(|(m, _)| m.as_str() == id)
    }

    /// Typed lookup. Sibling modules are reachable from inside a hook; the
    /// module running the hook itself reports [`GuiError::ModuleBusy`].
    pub fn module<T: GuiModule>(&self, id: &str) -> GuiResult<&T> {
        let (_, slot) = self
            .modules
            .iter()
            .find(|(m, _)| m.as_str() == id)
            .ok_or_else(|| GuiError::ModuleNotFound(id.to_string()))?;
        let module = slot.as_ref().ok_or_else(|| GuiError::ModuleBusy(id.to_string()))?;
        (**module)
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| GuiError::ModuleTypeMismatch {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn module_mut<T: GuiModule>(&mut self, id: &str) -> GuiResult<&mut T> {
        let (_, slot) = self
            .modules
            .iter_mut()
            .find(|(m, _)| m.as_str() == id)
            .ok_or_else(|| GuiError::ModuleNotFound(id.to_string()))?;
        let module = slot.as_mut().ok_or_else(|| GuiError::ModuleBusy(id.to_string()))?;
        (**module)
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| GuiError::ModuleTypeMismatch {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Runs `f` with the module lifted out of the container so both can be
    /// borrowed mutably. The module keeps its id and position meanwhile.
    pub fn with_module<T, R>(&mut self, id: &str, f: impl FnOnce(&mut T, &mut GuiContainer) -> R) -> GuiResult<R>
    where
        T: GuiModule,
    {
        self.module::<T>(id)?;
        let mut module = self.take_module(id).ok_or_else(|| GuiError::ModuleBusy(id.to_string()))?;
        let result = match (*module).as_any_mut().downcast_mut::<T>() {
            Some(typed) => Ok(f(typed, self)),
            None => Err(GuiError::ModuleTypeMismatch {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            }),
        };
        self.restore_module(id, module);
        result
    }

    fn take_module(&mut self, id: &str) -> Option<Box<dyn GuiModule>> {
        let index = self.module_index(id)?;
        self.modules[index].1.take()
    }

    fn restore_module(&mut self, id: &str, module: Box<dyn GuiModule>) {
        match self.module_index(id) {
            Some(index) => self.modules[index].1 = Some(module),
            None => self.modules.push((ModuleId::from(id), Some(module))),
        }
    }

    // ========================================================================
    // Lifecycle dispatch
    // ========================================================================

    /// Open hooks in registration order, then one full update pass.
    pub fn open(&mut self, ctx: &mut GuiContext<'_>) {
        debug!("Opening '{}' for player {}", self.title, ctx.player());
        self.dispatch(ctx, Phase::Open);
        self.update(ctx);
    }

    /// Mutate phase for every module, then observe phase for every module.
    pub fn update(&mut self, ctx: &mut GuiContext<'_>) {
        self.dispatch(ctx, Phase::Update);
        self.dispatch(ctx, Phase::AfterUpdate);
    }

    /// Close hooks in reverse registration order.
    pub fn close(&mut self, ctx: &mut GuiContext<'_>) {
        debug!("Closing '{}' for player {}", self.title, ctx.player());
        self.dispatch(ctx, Phase::Close);
    }

    /// Lifts out one module at a time, so siblings stay reachable from the
    /// running hook. Modules removed by an earlier hook are skipped.
    fn dispatch(&mut self, ctx: &mut GuiContext<'_>, phase: Phase) {
        let mut ids: Vec<ModuleId> = self.modules.iter().map(|(id, _)| id.clone()).collect();
        if phase == Phase::Close {
            ids.reverse();
        }

        let previous = ctx.module_id().cloned();
        for id in ids {
            let Some(mut module) = self.take_module(&id) else {
                continue;
            };
            ctx.set_module(Some(id.clone()));
            let result = catch_unwind(AssertUnwindSafe(|| match phase {
                Phase::Open => module.on_open(self, ctx),
                Phase::Update => module.on_update(self, ctx),
                Phase::AfterUpdate => module.after_update(self, ctx),
                Phase::Close => module.on_close(self, ctx),
            }))
            .unwrap_or_else(|panic| Err(GuiError::from_panic(panic)));
            self.restore_module(&id, module);

            if let Err(e) = result {
                ctx.report_failure(&format!("Module '{}' {} hook", id, phase.label()), &e);
            }
        }
        ctx.set_module(previous);
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Resolves every visible cell to the view item shown there.
    pub fn render(&self) -> RenderSnapshot {
        let slots = (0..self.size())
            .map(|slot| {
                self.get_item(self.slot_to_row(slot), self.slot_to_col(slot))
                    .map(|item| item.view_item().clone())
            })
            .collect();
        RenderSnapshot {
            title: self.title.clone(),
            rows: self.rows,
            cols: self.cols,
            slots,
        }
    }

    /// Visible slots whose effective item is flagged as changed.
    pub fn changed_slots(&self) -> Vec<usize> {
        (0..self.size())
            .filter(|&slot| {
                self.get_item(self.slot_to_row(slot), self.slot_to_col(slot))
                    .is_some_and(GuiItem::is_changed)
            })
            .collect()
    }

    /// Clears the changed flag on every item of every layer.
    pub fn clear_changed(&mut self) {
        for layer in &mut self.layers {
            for (_, _, item) in layer.iter_mut() {
                item.set_changed(false);
            }
        }
    }
}

impl std::fmt::Debug for GuiContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuiContainer")
            .field("title", &self.title)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("row_offset", &self.row_offset)
            .field("col_offset", &self.col_offset)
            .field("layers", &self.layers.iter().map(GuiLayer::name).collect::<Vec<_>>())
            .field("modules", &self.modules.iter().map(|(id, _)| id).collect::<Vec<_>>())
            .finish()
    }
}
