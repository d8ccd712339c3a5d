//! Node trees with orthogonal branch connectors.

use super::GuiModule;
use crate::container::GuiContainer;
use crate::context::GuiContext;
use crate::error::GuiResult;
use crate::item::GuiItem;
use crate::layer::GuiLayer;
use crate::types::ItemStack;

/// Which leg of the L-shaped connector is drawn first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchStyle {
    /// Across the parent's row, then along the child's column
    #[default]
    HorizontalFirst,
    /// Along the parent's column, then across the child's row
    VerticalFirst,
}

/// Cells strictly between `from` and `to` on an L-shaped route.
///
/// ```rust
/// use chest_gui::module::tree::{branch_path, BranchStyle};
///
/// let path = branch_path((1, 1), (3, 3), BranchStyle::HorizontalFirst);
/// assert_eq!(path, vec![(1, 2), (1, 3), (2, 3)]);
/// ```
pub fn branch_path(from: (usize, usize), to: (usize, usize), style: BranchStyle) -> Vec<(usize, usize)> {
    let corner = match style {
        BranchStyle::HorizontalFirst => (from.0, to.1),
        BranchStyle::VerticalFirst => (to.0, from.1),
    };

    let mut path = Vec::new();
    let mut push = |cell: (usize, usize)| {
        if cell != from && cell != to && path.last() != Some(&cell) {
            path.push(cell);
        }
    };
    for cell in straight(from, corner) {
        push(cell);
    }
    for cell in straight(corner, to) {
        push(cell);
    }
    path
}

/// Cells from `a` to `b` inclusive along a single row or column.
fn straight(a: (usize, usize), b: (usize, usize)) -> Vec<(usize, usize)> {
    fn span(from: usize, to: usize) -> Vec<usize> {
        if from <= to {
            (from..=to).collect()
        } else {
            (to..=from).rev().collect()
        }
    }
    if a.0 == b.0 {
        span(a.1, b.1).into_iter().map(|col| (a.0, col)).collect()
    } else {
        span(a.0, b.0).into_iter().map(|row| (row, a.1)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub row: usize,
    pub col: usize,
    pub item: GuiItem,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(row: usize, col: usize, item: GuiItem) -> Self {
        Self {
            row,
            col,
            item,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Redraws a forest into its layer on every update: branches first, then
/// the nodes on top of them.
pub struct TreeModule {
    layer: String,
    style: BranchStyle,
    branch: ItemStack,
    roots: Vec<TreeNode>,
}

impl TreeModule {
    pub fn new(layer: impl Into<String>, branch: ItemStack) -> Self {
        Self {
            layer: layer.into(),
            style: BranchStyle::default(),
            branch,
            roots: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: BranchStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_root(mut self, root: TreeNode) -> Self {
        self.roots.push(root);
        self
    }

    pub fn roots_mut(&mut self) -> &mut Vec<TreeNode> {
        &mut self.roots
    }

    pub fn render(&self, container: &mut GuiContainer) -> GuiResult<()> {
        let layer = container.require_layer_mut(&self.layer)?;
        layer.clear();
        for root in &self.roots {
            self.draw_branches(layer, root)?;
        }
        for root in &self.roots {
            Self::draw_nodes(layer, root)?;
        }
        Ok(())
    }

    fn draw_branches(&self, layer: &mut GuiLayer, node: &TreeNode) -> GuiResult<()> {
        for child in &node.children {
            for (row, col) in branch_path((node.row, node.col), (child.row, child.col), self.style) {
                let mut branch = GuiItem::new(self.branch.clone());
                branch.set_changed(false);
                layer.set_absolute(row, col, branch)?;
            }
            self.draw_branches(layer, child)?;
        }
        Ok(())
    }

    fn draw_nodes(layer: &mut GuiLayer, node: &TreeNode) -> GuiResult<()> {
        let mut item = node.item.clone();
        item.set_changed(false);
        layer.set_absolute(node.row, node.col, item)?;
        for child in &node.children {
            Self::draw_nodes(layer, child)?;
        }
        Ok(())
    }
}

impl GuiModule for TreeModule {
    fn on_update(&mut self, container: &mut GuiContainer, _: &mut GuiContext<'_>) -> GuiResult<()> {
        self.render(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuiError;

    fn node(row: usize, col: usize, name: &str) -> TreeNode {
        TreeNode::new(row, col, GuiItem::new(ItemStack::new("minecraft:book").with_name(name)))
    }

    #[test]
    fn test_horizontal_first_route() {
        assert_eq!(
            branch_path((2, 2), (4, 5), BranchStyle::HorizontalFirst),
            vec![(2, 3), (2, 4), (2, 5), (3, 5)]
        );
        assert_eq!(
            branch_path((4, 5), (2, 2), BranchStyle::HorizontalFirst),
            vec![(4, 4), (4, 3), (4, 2), (3, 2)]
        );
    }

    #[test]
    fn test_vertical_first_route() {
        assert_eq!(
            branch_path((1, 1), (3, 3), BranchStyle::VerticalFirst),
            vec![(2, 1), (3, 1), (3, 2)]
        );
    }

    #[test]
    fn test_adjacent_and_straight_routes() {
        assert!(branch_path((1, 1), (1, 2), BranchStyle::HorizontalFirst).is_empty());
        assert_eq!(
            branch_path((1, 1), (4, 1), BranchStyle::HorizontalFirst),
            vec![(2, 1), (3, 1)]
        );
    }

    #[test]
    fn test_nodes_drawn_over_branches() {
        let mut container = GuiContainer::new("skills", 5, 9).unwrap();
        container.add_layer(GuiLayer::new("tree", 5, 9)).unwrap();

        let tree = TreeModule::new("tree", ItemStack::new("minecraft:glass_pane"))
            .with_style(BranchStyle::VerticalFirst)
            .with_root(
                node(1, 5, "root")
                    .with_child(node(3, 3, "left"))
                    .with_child(node(3, 7, "right").with_child(node(5, 7, "leaf"))),
            );
        tree.render(&mut container).unwrap();

        let at = |row, col| container.get_item(row, col).map(|i| i.name().to_string());
        assert_eq!(at(1, 5).as_deref(), Some("root"));
        assert_eq!(at(2, 5).as_deref(), Some("minecraft:glass_pane"));
        assert_eq!(at(3, 5).as_deref(), Some("minecraft:glass_pane"));
        assert_eq!(at(3, 4).as_deref(), Some("minecraft:glass_pane"));
        assert_eq!(at(3, 3).as_deref(), Some("left"));
        assert_eq!(at(4, 7).as_deref(), Some("minecraft:glass_pane"));
        assert_eq!(at(5, 7).as_deref(), Some("leaf"));
        assert!(at(1, 1).is_none());
    }

    #[test]
    fn test_out_of_range_node_is_an_error() {
        let mut container = GuiContainer::new("skills", 2, 9).unwrap();
        container.add_layer(GuiLayer::new("tree", 2, 9)).unwrap();
        let tree = TreeModule::new("tree", ItemStack::new("minecraft:glass_pane"))
            .with_root(node(1, 1, "root").with_child(node(4, 1, "lost")));

        assert!(matches!(
            tree.render(&mut container),
            Err(GuiError::OutOfBounds { .. })
        ));
    }
}
