//! Core value types shared by every part of the GUI runtime.
//!
//! These mirror what the host server hands us (player identities, click and
//! inventory-action categories) and what we hand back (display item
//! descriptors and sounds).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Identity
// ============================================================================

/// Unique identifier for a player connected to the host server.
///
/// A wrapper around UUID so player ids cannot be confused with container or
/// task ids.
///
/// # Examples
///
/// ```rust
/// use chest_gui::PlayerId;
///
/// let player = PlayerId::new();
/// let parsed = PlayerId::from_str(&player.to_string()).unwrap();
/// assert_eq!(player, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a player ID from its hyphenated UUID form.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Display descriptors
// ============================================================================

/// What a single inventory cell looks like on the client.
///
/// The runtime never interprets `material` or `meta`; they are passed through
/// to the host untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Host material key, e.g. `"minecraft:diamond_sword"`
    pub material: String,
    /// Stack size shown on the client
    #[serde(default = "default_amount")]
    pub amount: u8,
    /// Custom display name
    #[serde(default)]
    pub name: Option<String>,
    /// Lore lines shown under the name
    #[serde(default)]
    pub lore: Vec<String>,
    /// Free-form item metadata forwarded to the host
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

fn default_amount() -> u8 {
    1
}

impl ItemStack {
    /// Creates a single item of the given material with no name or lore.
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            amount: 1,
            name: None,
            lore: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_lore<I, S>(mut self, lore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lore = lore.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_amount(mut self, amount: u8) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// The name players see: the custom name if set, the material otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.material)
    }
}

/// A sound played to a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    pub key: String,
    pub volume: f32,
    pub pitch: f32,
}

impl Sound {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            volume: 1.0,
            pitch: 1.0,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }
}

// ============================================================================
// Interaction categories
// ============================================================================

/// How the player clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickType {
    Left,
    ShiftLeft,
    Right,
    ShiftRight,
    WindowBorderLeft,
    WindowBorderRight,
    Middle,
    NumberKey,
    DoubleClick,
    Drop,
    ControlDrop,
    Creative,
    SwapOffhand,
    Unknown,
}

impl ClickType {
    pub fn is_shift(self) -> bool {
        matches!(self, ClickType::ShiftLeft | ClickType::ShiftRight)
    }

    pub fn is_keyboard(self) -> bool {
        matches!(
            self,
            ClickType::NumberKey | ClickType::Drop | ClickType::ControlDrop | ClickType::SwapOffhand
        )
    }
}

/// What the host's inventory logic would do with the click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryAction {
    Nothing,
    PickupAll,
    PickupSome,
    PickupHalf,
    PickupOne,
    PlaceAll,
    PlaceSome,
    PlaceOne,
    SwapWithCursor,
    DropAllCursor,
    DropOneCursor,
    DropAllSlot,
    DropOneSlot,
    MoveToOtherInventory,
    HotbarMoveAndReadd,
    HotbarSwap,
    CloneStack,
    CollectToCursor,
    Unknown,
}

impl InventoryAction {
    /// Actions that take the item out of the clicked slot.
    pub fn is_pickup(self) -> bool {
        matches!(
            self,
            InventoryAction::PickupAll
                | InventoryAction::PickupSome
                | InventoryAction::PickupHalf
                | InventoryAction::PickupOne
                | InventoryAction::DropAllSlot
                | InventoryAction::DropOneSlot
                | InventoryAction::MoveToOtherInventory
                | InventoryAction::HotbarMoveAndReadd
                | InventoryAction::HotbarSwap
        )
    }

    /// Actions that put the cursor item into the clicked slot.
    pub fn is_place(self) -> bool {
        matches!(
            self,
            InventoryAction::PlaceAll | InventoryAction::PlaceSome | InventoryAction::PlaceOne
        )
    }
}
