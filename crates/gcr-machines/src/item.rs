//! Item stacks held in machine slots.

use gcr_nbt::NbtCompound;
use tracing::warn;

/// Item id of the empty slot.
pub const AIR: &str = "minecraft:air";

/// Default maximum stack size for items.
pub const DEFAULT_MAX_COUNT: u16 = 64;

/// A stack of identical items.
///
/// `count == 0` or an air/empty id means the slot is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    /// Namespaced item id, e.g. `"minecraft:coal"`.
    pub item: String,
    pub count: u16,
    /// Largest count a single stack of this item may hold.
    pub max_count: u16,
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

impl ItemStack {
    /// An empty slot.
    pub const fn empty() -> Self {
        Self {
            item: String::new(),
            count: 0,
            max_count: DEFAULT_MAX_COUNT,
        }
    }

    pub fn new(item: impl Into<String>, count: u16) -> Self {
        Self {
            item: item.into(),
            count,
            max_count: DEFAULT_MAX_COUNT,
        }
    }

    /// Same stack with a different maximum stack size (e.g. 16 for buckets).
    pub fn with_max_count(mut self, max_count: u16) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item.is_empty() || self.item == AIR
    }

    /// Whether `other` could merge into this stack (same item, both non-empty).
    pub fn can_stack_with(&self, other: &ItemStack) -> bool {
        !self.is_empty() && !other.is_empty() && self.item == other.item
    }

    /// Copy of this stack with a different count.
    pub fn copy_with_count(&self, count: u16) -> Self {
        Self {
            item: self.item.clone(),
            count,
            max_count: self.max_count,
        }
    }

    /// Remove up to `amount` items, returning them as a new stack.
    pub fn split(&mut self, amount: u16) -> ItemStack {
        if self.is_empty() || amount == 0 {
            return ItemStack::empty();
        }
        let taken = amount.min(self.count);
        let result = self.copy_with_count(taken);
        self.count -= taken;
        if self.count == 0 {
            *self = ItemStack::empty();
        }
        result
    }

    /// Serialize as `{id, Count}`. Slot index is added by the inventory.
    ///
    /// `Count` is a byte, so counts above 127 are clamped.
    pub fn to_nbt(&self) -> NbtCompound {
        let mut c = NbtCompound::new();
        c.put_string("id", self.item.clone());
        let count = i8::try_from(self.count).unwrap_or_else(|_| {
            warn!(item = %self.item, count = self.count, "stack count clamped to 127 on save");
            i8::MAX
        });
        c.put_byte("Count", count);
        c
    }

    /// Parse `{id, Count}`; returns an empty stack for air or non-positive counts.
    ///
    /// The stack limit belongs to the item type and is not part of the save:
    /// loaded stacks get [`DEFAULT_MAX_COUNT`], and callers holding items with
    /// a smaller limit reapply it with [`with_max_count`](Self::with_max_count).
    pub fn from_nbt(c: &NbtCompound) -> ItemStack {
        let id = c.get_string("id");
        let count = c.get_byte("Count");
        if id.is_empty() || id == AIR || count <= 0 {
            return ItemStack::empty();
        }
        ItemStack::new(id, count as u16)
    }
}
