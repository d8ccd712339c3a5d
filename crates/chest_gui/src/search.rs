//! Loose text matching used by list search.

use crate::item::GuiItem;

/// Lowercases and drops every whitespace character.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case- and space-insensitive substring match.
///
/// ```rust
/// use chest_gui::search::matches;
///
/// assert!(matches("My Cool Sword", "mycool"));
/// assert!(!matches("My Cool Sword", "mycool!"));
/// ```
pub fn matches(text: &str, query: &str) -> bool {
    normalize(text).contains(&normalize(query))
}

/// Matches `query` against an item's display name and each lore line.
pub fn matches_item(item: &GuiItem, query: &str) -> bool {
    let query = normalize(query);
    normalize(item.name()).contains(&query) || item.lore().iter().any(|line| normalize(line).contains(&query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemStack;

    #[test]
    fn test_fuzzy_match() {
        assert!(matches("My Cool Sword", "mycool"));
        assert!(matches("My Cool Sword", "COOL sw"));
        assert!(!matches("My Cool Sword", "mycool!"));
        assert!(matches("anything", ""));
    }

    #[test]
    fn test_item_match_checks_lore_lines() {
        let item = GuiItem::new(
            ItemStack::new("minecraft:book")
                .with_name("Ledger")
                .with_lore(["Owned by Steve", "Worth 12 gold"]),
        );
        assert!(matches_item(&item, "ledger"));
        assert!(matches_item(&item, "12gold"));
        assert!(!matches_item(&item, "owned by alex"));
    }
}
