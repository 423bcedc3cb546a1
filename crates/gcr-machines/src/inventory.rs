//! Fixed-size machine inventories.
//!
//! The machine only needs four operations from its inventory: read a slot,
//! extract from a slot, insert into a slot, and ask what an insertion would
//! leave behind without committing it.

use std::ops::Range;

use gcr_nbt::{NbtCompound, NbtTag};

use crate::error::MachineError;
use crate::item::ItemStack;

/// Per-slot item limit, independent of the item's own stack size.
pub const SLOT_LIMIT: u16 = 64;

static EMPTY: ItemStack = ItemStack::empty();

/// A fixed number of item slots owned by one block entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInventory {
    slots: Vec<ItemStack>,
}

impl MachineInventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| ItemStack::empty()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(ItemStack::is_empty)
    }

    /// The stack in `slot`. Out-of-range slots read as empty.
    pub fn get(&self, slot: usize) -> &ItemStack {
        self.slots.get(slot).unwrap_or(&EMPTY)
    }

    /// Replace the contents of `slot`.
    pub fn set(&mut self, slot: usize, stack: ItemStack) -> Result<(), MachineError> {
        let size = self.slots.len();
        let target = self
            .slots
            .get_mut(slot)
            .ok_or(MachineError::SlotOutOfRange { slot, size })?;
        *target = stack;
        Ok(())
    }

    /// Remove up to `amount` items from `slot`.
    pub fn extract(&mut self, slot: usize, amount: u16) -> ItemStack {
        match self.slots.get_mut(slot) {
            Some(stack) => stack.split(amount),
            None => ItemStack::empty(),
        }
    }

    /// Insert `stack` into `slot`, returning what did not fit.
    pub fn insert(&mut self, slot: usize, stack: ItemStack) -> ItemStack {
        let accepted = self.acceptable_count(slot, &stack);
        if accepted == 0 {
            return stack;
        }
        let remainder = stack.copy_with_count(stack.count - accepted);
        // acceptable_count > 0 implies the slot exists
        let target = &mut self.slots[slot];
        if target.is_empty() {
            *target = stack.copy_with_count(accepted);
        } else {
            target.count += accepted;
        }
        if remainder.count == 0 {
            ItemStack::empty()
        } else {
            remainder
        }
    }

    /// What [`insert`](Self::insert) would return, without changing the slot.
    pub fn simulate_insert(&self, slot: usize, stack: &ItemStack) -> ItemStack {
        let accepted = self.acceptable_count(slot, stack);
        if accepted == stack.count {
            ItemStack::empty()
        } else {
            stack.copy_with_count(stack.count - accepted)
        }
    }

    fn acceptable_count(&self, slot: usize, stack: &ItemStack) -> u16 {
        if stack.is_empty() {
            return 0;
        }
        let Some(current) = self.slots.get(slot) else {
            return 0;
        };
        let limit = stack.max_count.min(SLOT_LIMIT);
        if current.is_empty() {
            stack.count.min(limit)
        } else if current.can_stack_with(stack) {
            let limit = limit.min(current.max_count);
            limit.saturating_sub(current.count).min(stack.count)
        } else {
            0
        }
    }

    /// A 3×3 crafting view over nine consecutive slots.
    pub fn crafting_view(&self, range: Range<usize>) -> CraftingView<'_> {
        debug_assert_eq!(range.len(), CraftingView::SIZE);
        CraftingView {
            slots: &self.slots[range],
        }
    }

    /// Serialize non-empty slots as an `Items` list of `{Slot, id, Count}`.
    pub fn write_nbt(&self, tag: &mut NbtCompound) {
        let items = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, stack)| !stack.is_empty())
            .map(|(slot, stack)| {
                let mut c = stack.to_nbt();
                c.put_byte("Slot", slot as i8);
                NbtTag::Compound(c)
            })
            .collect();
        tag.put_list("Items", items);
    }

    /// Replace all slots from an `Items` list. Out-of-range slots are skipped.
    pub fn read_nbt(&mut self, tag: &NbtCompound) {
        self.slots.iter_mut().for_each(|s| *s = ItemStack::empty());
        for entry in tag.get_list("Items") {
            let Some(c) = entry.as_compound() else {
                continue;
            };
            let slot = c.get_byte("Slot");
            if slot < 0 || slot as usize >= self.slots.len() {
                continue;
            }
            self.slots[slot as usize] = ItemStack::from_nbt(c);
        }
    }
}

/// Read-only 3×3 grid of input slots, row-major.
#[derive(Debug, Clone, Copy)]
pub struct CraftingView<'a> {
    slots: &'a [ItemStack],
}

impl<'a> CraftingView<'a> {
    pub const WIDTH: usize = 3;
    pub const HEIGHT: usize = 3;
    pub const SIZE: usize = Self::WIDTH * Self::HEIGHT;

    pub fn new(slots: &'a [ItemStack]) -> Self {
        Self { slots }
    }

    /// Stack at column `x`, row `y`.
    pub fn at(&self, x: usize, y: usize) -> &'a ItemStack {
        self.slots.get(y * Self::WIDTH + x).unwrap_or(&EMPTY)
    }

    pub fn stacks(&self) -> impl Iterator<Item = &'a ItemStack> {
        self.slots.iter()
    }
}
