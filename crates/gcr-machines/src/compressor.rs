//! The compressor block entity and its per-tick state machine.
//!
//! Slots 0-8 form a 3×3 input grid, slot 9 holds fuel and slot 10 receives
//! the crafted result. Each tick the machine decides whether to burn a new
//! fuel item, whether the input grid still matches a compressing recipe, and
//! whether to advance crafting progress. Progress only moves while the
//! status is [`CompressorStatus::Processing`].

use std::ops::Range;

use gcr_nbt::{read_nbt, write_nbt, NbtCompound, NbtRoot};
use rand::{Rng, RngCore};
use tracing::{debug, trace, warn};

use crate::effects::{BlockPos, SoundCategory, SoundEvent, WorldEffects};
use crate::error::MachineError;
use crate::fuel::FuelTable;
use crate::inventory::{CraftingView, MachineInventory};
use crate::item::ItemStack;
use crate::recipe::{has_compressing_recipe, resolve_compressing_result, RecipeLookup};

pub const INPUT_SLOTS: Range<usize> = 0..9;
pub const FUEL_INPUT_SLOT: usize = 9;
pub const OUTPUT_SLOT: usize = 10;
pub const INVENTORY_SIZE: usize = 11;

/// Ticks needed to finish one craft (10 seconds).
pub const DEFAULT_MAX_PROGRESS: i32 = 200;

/// Progress interval between anvil sounds in the second half of a craft.
const SOUND_INTERVAL: i32 = 40;
const SOUND_VOLUME: f32 = 0.3;

/// Operating phase shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressorStatus {
    /// Out of fuel, or nothing craftable to spend fuel on.
    #[default]
    Inactive,
    /// Burning fuel but the input grid no longer matches a recipe.
    Idle,
    Processing,
}

impl CompressorStatus {
    pub fn name(&self) -> &'static str {
        match self {
            CompressorStatus::Inactive => "Inactive",
            CompressorStatus::Idle => "Idle",
            CompressorStatus::Processing => "Processing",
        }
    }
}

/// Compressor flavor; decides whether the fuel slot is used at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressorVariant {
    /// Burns furnace fuel from slot 9.
    #[default]
    Fuelled,
    /// Powered externally; the host drives the status through
    /// [`CompressorBlockEntity::set_status`].
    Electric,
}

impl CompressorVariant {
    pub fn should_use_fuel(&self) -> bool {
        matches!(self, CompressorVariant::Fuelled)
    }

    /// Block entity ID string for NBT serialization.
    pub fn nbt_id(&self) -> &'static str {
        match self {
            CompressorVariant::Fuelled => "galacticraft-rewoven:compressor",
            CompressorVariant::Electric => "galacticraft-rewoven:electric_compressor",
        }
    }

    pub fn from_nbt_id(id: &str) -> Option<Self> {
        match id {
            "galacticraft-rewoven:compressor" => Some(CompressorVariant::Fuelled),
            "galacticraft-rewoven:electric_compressor" => Some(CompressorVariant::Electric),
            _ => None,
        }
    }
}

/// World collaborators a compressor needs for one tick.
pub struct TickContext<'a> {
    pub recipes: &'a dyn RecipeLookup,
    pub fuel: &'a dyn FuelTable,
    pub effects: &'a mut dyn WorldEffects,
    pub rng: &'a mut dyn RngCore,
}

#[derive(Debug, Clone)]
pub struct CompressorBlockEntity {
    pos: BlockPos,
    variant: CompressorVariant,
    status: CompressorStatus,
    progress: i32,
    max_progress: i32,
    fuel_time: i32,
    /// Burn time of the last fuel item. Not saved: a reloaded machine shows
    /// an empty fuel gauge until it burns its next item.
    max_fuel_time: i32,
    inventory: MachineInventory,
}

impl CompressorBlockEntity {
    /// A freshly placed fuelled compressor.
    pub fn new(pos: BlockPos) -> Self {
        Self::with_variant(pos, CompressorVariant::Fuelled)
    }

    pub fn with_variant(pos: BlockPos, variant: CompressorVariant) -> Self {
        Self {
            pos,
            variant,
            status: CompressorStatus::Inactive,
            progress: 0,
            max_progress: DEFAULT_MAX_PROGRESS,
            fuel_time: 0,
            max_fuel_time: 0,
            inventory: MachineInventory::new(INVENTORY_SIZE),
        }
    }

    /// Override the craft duration. Values below 1 are raised to 1.
    pub fn with_max_progress(mut self, max_progress: i32) -> Self {
        self.max_progress = max_progress.max(1);
        self
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    pub fn variant(&self) -> CompressorVariant {
        self.variant
    }

    pub fn status(&self) -> CompressorStatus {
        self.status
    }

    pub fn progress(&self) -> i32 {
        self.progress
    }

    pub fn max_progress(&self) -> i32 {
        self.max_progress
    }

    pub fn fuel_time(&self) -> i32 {
        self.fuel_time
    }

    pub fn max_fuel_time(&self) -> i32 {
        self.max_fuel_time
    }

    pub fn inventory(&self) -> &MachineInventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut MachineInventory {
        &mut self.inventory
    }

    pub fn should_use_fuel(&self) -> bool {
        self.variant.should_use_fuel()
    }

    /// Set the status directly. Used by hosts of the electric variant, whose
    /// power supply lives outside this crate.
    pub fn set_status(&mut self, status: CompressorStatus) {
        if self.status != status {
            debug!(
                pos = %self.pos,
                from = self.status.name(),
                to = status.name(),
                "compressor status"
            );
            self.status = status;
        }
    }

    fn input_view(&self) -> CraftingView<'_> {
        self.inventory.crafting_view(INPUT_SLOTS)
    }

    fn has_recipe(&self, recipes: &dyn RecipeLookup) -> bool {
        has_compressing_recipe(recipes, &self.input_view())
    }

    /// The result of the current grid, if a recipe matches and the output
    /// slot can take all of it.
    fn craftable_result(&self, recipes: &dyn RecipeLookup) -> Option<ItemStack> {
        let view = self.input_view();
        if !has_compressing_recipe(recipes, &view) {
            return None;
        }
        let result = resolve_compressing_result(recipes, &view);
        self.can_put_stack_in_result_slot(&result).then_some(result)
    }

    fn can_put_stack_in_result_slot(&self, stack: &ItemStack) -> bool {
        self.inventory.simulate_insert(OUTPUT_SLOT, stack).is_empty()
    }

    /// Advance the machine by one world tick.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) {
        if self.should_use_fuel() {
            if self.fuel_time <= 0 {
                let fuel = self.inventory.get(FUEL_INPUT_SLOT);
                if fuel.is_empty() {
                    // Out of fuel and nothing to refill from.
                    self.set_status(CompressorStatus::Inactive);
                    return;
                }
                let Some(burn_time) = ctx.fuel.burn_time(&fuel.item) else {
                    trace!(pos = %self.pos, item = %fuel.item, "fuel slot holds a non-fuel item");
                    self.set_status(CompressorStatus::Inactive);
                    return;
                };
                if self.craftable_result(ctx.recipes).is_none() {
                    // Nothing to craft; keep the fuel.
                    self.set_status(CompressorStatus::Inactive);
                    return;
                }
                let burn_time = i32::try_from(burn_time).unwrap_or(i32::MAX);
                self.max_fuel_time = burn_time;
                self.fuel_time = burn_time;
                let burned = self.inventory.extract(FUEL_INPUT_SLOT, 1);
                debug!(pos = %self.pos, item = %burned.item, burn_time, "compressor consumed fuel");
                self.set_status(CompressorStatus::Processing);
            }
            self.fuel_time -= 1;
        }

        if self.status == CompressorStatus::Processing && !self.has_recipe(ctx.recipes) {
            self.set_status(CompressorStatus::Idle);
        }

        if self.status != CompressorStatus::Processing {
            return;
        }
        let Some(result) = self.craftable_result(ctx.recipes) else {
            return;
        };

        self.progress += 1;
        trace!(
            pos = %self.pos,
            progress = self.progress,
            fuel_time = self.fuel_time,
            "compressor tick"
        );

        if self.progress % SOUND_INTERVAL == 0 && self.progress > self.max_progress / 2 {
            let pitch = ctx.rng.gen::<f32>() * 0.1 + 0.9;
            ctx.effects.play_sound(
                self.pos,
                SoundEvent::AnvilLand,
                SoundCategory::Blocks,
                SOUND_VOLUME,
                pitch,
            );
        }

        if self.progress == self.max_progress {
            self.progress = 0;
            self.craft_item(result);
        }
    }

    /// Take one item from every input slot and deposit `result`.
    ///
    /// # Panics
    ///
    /// If the output slot cannot take `result`; the tick checks capacity
    /// before crafting.
    fn craft_item(&mut self, result: ItemStack) {
        for slot in INPUT_SLOTS {
            self.inventory.extract(slot, 1);
        }
        debug!(pos = %self.pos, item = %result.item, count = result.count, "compressor crafted");
        let leftover = self.inventory.insert(OUTPUT_SLOT, result);
        assert!(
            leftover.is_empty(),
            "compressor output slot overflowed by {} after capacity was checked",
            leftover.count
        );
    }

    // -------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------

    /// Write this machine into `tag`. `FuelTime` is only written by
    /// fuel-burning variants; `max_fuel_time` is never written.
    pub fn write_nbt(&self, tag: &mut NbtCompound) {
        tag.put_string("id", self.variant.nbt_id());
        tag.put_int("x", self.pos.x);
        tag.put_int("y", self.pos.y);
        tag.put_int("z", self.pos.z);
        self.inventory.write_nbt(tag);

        tag.put_int("Progress", self.progress);
        if self.should_use_fuel() {
            tag.put_int("FuelTime", self.fuel_time);
        }
    }

    /// Restore saved state. Mirrors [`write_nbt`](Self::write_nbt); missing
    /// keys read as 0. The craft length is not saved, so set it on `self`
    /// before calling this or progress past the default length is dropped.
    pub fn read_nbt(&mut self, tag: &NbtCompound) {
        self.inventory.read_nbt(tag);

        self.progress = tag.get_int("Progress");
        if !(0..self.max_progress).contains(&self.progress) {
            warn!(
                pos = %self.pos,
                progress = self.progress,
                max_progress = self.max_progress,
                "saved progress out of range, resetting"
            );
            self.progress = 0;
        }

        if self.should_use_fuel() {
            self.fuel_time = tag.get_int("FuelTime");
        }
    }

    /// Build a compressor from a saved compound, picking the variant from `id`.
    pub fn from_nbt(tag: &NbtCompound) -> Result<Self, MachineError> {
        Self::from_nbt_with_max_progress(tag, DEFAULT_MAX_PROGRESS)
    }

    /// Like [`from_nbt`](Self::from_nbt) for hosts that run a non-default
    /// craft length.
    pub fn from_nbt_with_max_progress(
        tag: &NbtCompound,
        max_progress: i32,
    ) -> Result<Self, MachineError> {
        let id = tag.get_string("id");
        let variant = CompressorVariant::from_nbt_id(id)
            .ok_or_else(|| MachineError::UnknownBlockEntity(id.to_string()))?;
        let pos = BlockPos::new(tag.get_int("x"), tag.get_int("y"), tag.get_int("z"));
        let mut entity = Self::with_variant(pos, variant).with_max_progress(max_progress);
        entity.read_nbt(tag);
        Ok(entity)
    }

    /// Serialize to binary NBT.
    pub fn to_nbt_bytes(&self) -> Result<Vec<u8>, MachineError> {
        let mut compound = NbtCompound::new();
        self.write_nbt(&mut compound);
        let mut buf = Vec::new();
        write_nbt(&mut buf, &NbtRoot::new("", compound))?;
        Ok(buf)
    }

    /// Parse from binary NBT.
    pub fn from_nbt_bytes(data: &[u8]) -> Result<Self, MachineError> {
        let root = read_nbt(&mut &data[..])?;
        Self::from_nbt(&root.compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::effects::SoundLog;
    use crate::fuel::FuelValueTable;
    use crate::recipe::{
        Ingredient, RecipeManager, ShapedCompressingRecipe, ShapelessCompressingRecipe,
    };

    const IRON: &str = "minecraft:iron_ingot";
    const COAL: &str = "minecraft:coal";
    const COMPRESSED_IRON: &str = "galacticraft-rewoven:compressed_iron";

    struct World {
        recipes: RecipeManager,
        fuel: FuelValueTable,
        sounds: SoundLog,
        rng: StdRng,
    }

    impl World {
        fn new() -> Self {
            Self::with_recipes(RecipeManager::with_defaults())
        }

        fn with_recipes(recipes: RecipeManager) -> Self {
            Self {
                recipes,
                fuel: FuelValueTable::vanilla(),
                sounds: SoundLog::default(),
                rng: StdRng::seed_from_u64(7),
            }
        }

        fn tick(&mut self, be: &mut CompressorBlockEntity) {
            let mut ctx = TickContext {
                recipes: &self.recipes,
                fuel: &self.fuel,
                effects: &mut self.sounds,
                rng: &mut self.rng,
            };
            be.tick(&mut ctx);
        }

        fn tick_n(&mut self, be: &mut CompressorBlockEntity, n: usize) {
            for _ in 0..n {
                self.tick(be);
            }
        }
    }

    fn compressor() -> CompressorBlockEntity {
        CompressorBlockEntity::new(BlockPos::new(0, 64, 0))
    }

    /// Two iron ingots (the compressed iron recipe) and `coal` coal.
    fn loaded_compressor(coal: u16) -> CompressorBlockEntity {
        let mut be = compressor();
        let inv = be.inventory_mut();
        inv.set(0, ItemStack::new(IRON, 10)).unwrap();
        inv.set(4, ItemStack::new(IRON, 10)).unwrap();
        if coal > 0 {
            inv.set(FUEL_INPUT_SLOT, ItemStack::new(COAL, coal)).unwrap();
        }
        be
    }

    #[test]
    fn placement_defaults() {
        let be = compressor();
        assert_eq!(be.status(), CompressorStatus::Inactive);
        assert_eq!(be.progress(), 0);
        assert_eq!(be.fuel_time(), 0);
        assert_eq!(be.max_fuel_time(), 0);
        assert_eq!(be.max_progress(), 200);
        assert_eq!(be.inventory().len(), 11);
    }

    #[test]
    fn empty_fuel_slot_goes_inactive_without_progress() {
        let mut world = World::new();
        let mut be = loaded_compressor(0);
        be.status = CompressorStatus::Processing;
        be.progress = 50;
        world.tick(&mut be);
        assert_eq!(be.status(), CompressorStatus::Inactive);
        assert_eq!(be.progress(), 50);
        assert_eq!(be.fuel_time(), 0);
    }

    #[test]
    fn first_fuel_burns_and_progresses_same_tick() {
        let mut world = World::new();
        let mut be = loaded_compressor(1);
        world.tick(&mut be);

        assert!(be.inventory().get(FUEL_INPUT_SLOT).is_empty());
        assert_eq!(be.max_fuel_time(), 1600);
        // Set to 1600 then decremented within the same tick.
        assert_eq!(be.fuel_time(), 1599);
        assert_eq!(be.status(), CompressorStatus::Processing);
        assert_eq!(be.progress(), 1);
    }

    #[test]
    fn fuel_kept_when_nothing_to_craft() {
        let mut world = World::new();
        let mut be = compressor();
        be.inventory_mut()
            .set(FUEL_INPUT_SLOT, ItemStack::new(COAL, 3))
            .unwrap();
        world.tick_n(&mut be, 5);
        assert_eq!(be.status(), CompressorStatus::Inactive);
        assert_eq!(be.inventory().get(FUEL_INPUT_SLOT).count, 3);
        assert_eq!(be.fuel_time(), 0);
    }

    #[test]
    fn non_fuel_item_is_not_burned() {
        let mut world = World::new();
        let mut be = loaded_compressor(0);
        be.inventory_mut()
            .set(FUEL_INPUT_SLOT, ItemStack::new("minecraft:stone", 4))
            .unwrap();
        world.tick(&mut be);
        assert_eq!(be.status(), CompressorStatus::Inactive);
        assert_eq!(be.inventory().get(FUEL_INPUT_SLOT).count, 4);
        assert_eq!(be.progress(), 0);
    }

    #[test]
    fn full_output_blocks_refuel() {
        let mut world = World::new();
        let mut be = loaded_compressor(1);
        be.inventory_mut()
            .set(OUTPUT_SLOT, ItemStack::new(COMPRESSED_IRON, 64))
            .unwrap();
        world.tick(&mut be);
        assert_eq!(be.status(), CompressorStatus::Inactive);
        assert_eq!(be.inventory().get(FUEL_INPUT_SLOT).count, 1);
    }

    #[test]
    fn progress_increases_by_one_per_tick() {
        let mut world = World::new();
        let mut be = loaded_compressor(1);
        for expected in 1..200 {
            world.tick(&mut be);
            assert_eq!(be.progress(), expected);
            assert!(be.inventory().get(OUTPUT_SLOT).is_empty());
        }
    }

    #[test]
    fn full_cycle_crafts_once_at_max_progress() {
        let mut world = World::new();
        let mut be = loaded_compressor(1);
        world.tick_n(&mut be, 200);

        assert_eq!(be.progress(), 0);
        assert_eq!(be.inventory().get(0).count, 9);
        assert_eq!(be.inventory().get(4).count, 9);
        assert_eq!(be.inventory().get(OUTPUT_SLOT), &ItemStack::new(COMPRESSED_IRON, 1));
        assert_eq!(be.fuel_time(), 1400);
        assert_eq!(be.status(), CompressorStatus::Processing);
    }

    #[test]
    fn impact_sound_in_second_half() {
        let mut world = World::new();
        let mut be = loaded_compressor(1);
        world.tick_n(&mut be, 200);

        // progress 120, 160, 200
        assert_eq!(world.sounds.played.len(), 3);
        for sound in &world.sounds.played {
            assert_eq!(sound.sound, SoundEvent::AnvilLand);
            assert_eq!(sound.category, SoundCategory::Blocks);
            assert_eq!(sound.pos, be.pos());
            assert!((sound.volume - 0.3).abs() < f32::EPSILON);
            assert!((0.9..1.0).contains(&sound.pitch));
        }
    }

    #[test]
    fn craft_at_199_takes_one_from_every_input() {
        let mut recipes = RecipeManager::new();
        recipes.register_shapeless(ShapelessCompressingRecipe {
            id: "test:iron_block".into(),
            network_id: 0,
            ingredients: (0..9).map(|_| Ingredient::of(IRON)).collect(),
            result: ItemStack::new("test:iron_block", 2),
        })
        .unwrap();
        let mut world = World::with_recipes(recipes);
        let mut be = compressor();
        for slot in INPUT_SLOTS {
            be.inventory_mut().set(slot, ItemStack::new(IRON, 3)).unwrap();
        }
        be.status = CompressorStatus::Processing;
        be.fuel_time = 100;
        be.progress = 199;

        world.tick(&mut be);

        assert_eq!(be.progress(), 0);
        for slot in INPUT_SLOTS {
            assert_eq!(be.inventory().get(slot).count, 2);
        }
        assert_eq!(be.inventory().get(OUTPUT_SLOT), &ItemStack::new("test:iron_block", 2));
        assert_eq!(be.fuel_time(), 99);
    }

    #[test]
    fn removing_inputs_goes_idle_but_keeps_burning() {
        let mut world = World::new();
        let mut be = loaded_compressor(1);
        world.tick_n(&mut be, 10);
        be.inventory_mut().extract(0, 64);

        world.tick(&mut be);
        assert_eq!(be.status(), CompressorStatus::Idle);
        assert_eq!(be.progress(), 10);
        assert_eq!(be.fuel_time(), 1589);
    }

    #[test]
    fn idle_stays_idle_until_next_refuel() {
        let mut world = World::new();
        let mut be = loaded_compressor(1);
        world.tick(&mut be);
        let removed = be.inventory_mut().extract(0, 64);
        world.tick(&mut be);
        assert_eq!(be.status(), CompressorStatus::Idle);

        be.inventory_mut().insert(0, removed);
        world.tick_n(&mut be, 5);
        assert_eq!(be.status(), CompressorStatus::Idle);
        assert_eq!(be.progress(), 1);
    }

    #[test]
    fn output_filling_up_mid_craft_stalls_progress() {
        let mut world = World::new();
        let mut be = loaded_compressor(1);
        world.tick_n(&mut be, 20);
        be.inventory_mut()
            .set(OUTPUT_SLOT, ItemStack::new("minecraft:dirt", 1))
            .unwrap();
        world.tick_n(&mut be, 5);
        assert_eq!(be.status(), CompressorStatus::Processing);
        assert_eq!(be.progress(), 20);
        assert_eq!(be.fuel_time(), 1600 - 25);
    }

    #[test]
    fn exhausted_fuel_without_recipe_reports_inactive_not_idle() {
        let mut world = World::new();
        let mut be = compressor();
        be.inventory_mut()
            .set(FUEL_INPUT_SLOT, ItemStack::new(COAL, 1))
            .unwrap();
        be.status = CompressorStatus::Processing;
        be.fuel_time = 0;
        world.tick(&mut be);
        assert_eq!(be.status(), CompressorStatus::Inactive);
        assert_eq!(be.inventory().get(FUEL_INPUT_SLOT).count, 1);
    }

    #[test]
    fn second_coal_burns_when_first_runs_out() {
        let mut world = World::new();
        let mut be = loaded_compressor(2);
        world.tick_n(&mut be, 1600);
        assert_eq!(be.fuel_time(), 0);
        assert_eq!(be.inventory().get(FUEL_INPUT_SLOT).count, 1);
        assert_eq!(be.inventory().get(OUTPUT_SLOT).count, 8);

        world.tick(&mut be);
        assert!(be.inventory().get(FUEL_INPUT_SLOT).is_empty());
        assert_eq!(be.fuel_time(), 1599);
    }

    #[test]
    fn shapeless_result_wins_in_machine() {
        let mut recipes = RecipeManager::new();
        recipes.register_shaped(ShapedCompressingRecipe {
            id: "test:shaped".into(),
            network_id: 0,
            width: 1,
            height: 2,
            pattern: vec![Ingredient::of(IRON), Ingredient::of(IRON)],
            result: ItemStack::new("test:from_shaped", 1),
        })
        .unwrap();
        recipes.register_shapeless(ShapelessCompressingRecipe {
            id: "test:shapeless".into(),
            network_id: 0,
            ingredients: vec![Ingredient::of(IRON), Ingredient::of(IRON)],
            result: ItemStack::new("test:from_shapeless", 1),
        })
        .unwrap();
        let mut world = World::with_recipes(recipes);
        let mut be = compressor();
        be.inventory_mut().set(0, ItemStack::new(IRON, 1)).unwrap();
        be.inventory_mut().set(3, ItemStack::new(IRON, 1)).unwrap();
        be.inventory_mut()
            .set(FUEL_INPUT_SLOT, ItemStack::new(COAL, 1))
            .unwrap();
        world.tick_n(&mut be, 200);
        assert_eq!(be.inventory().get(OUTPUT_SLOT).item, "test:from_shapeless");
    }

    #[test]
    fn save_load_keeps_progress_and_fuel_time_but_not_max_fuel_time() {
        let mut world = World::new();
        let mut be = loaded_compressor(3);
        world.tick_n(&mut be, 57);

        let bytes = be.to_nbt_bytes().unwrap();
        let loaded = CompressorBlockEntity::from_nbt_bytes(&bytes).unwrap();

        assert_eq!(loaded.pos(), be.pos());
        assert_eq!(loaded.progress(), 57);
        assert_eq!(loaded.fuel_time(), be.fuel_time());
        assert_eq!(loaded.inventory(), be.inventory());
        // Known limitation: the fuel gauge maximum is not persisted.
        assert_eq!(be.max_fuel_time(), 1600);
        assert_eq!(loaded.max_fuel_time(), 0);
        // Status is recomputed by the next tick.
        assert_eq!(loaded.status(), CompressorStatus::Inactive);
    }

    #[test]
    fn saved_keys() {
        let mut be = loaded_compressor(1);
        be.progress = 12;
        be.fuel_time = 300;
        let mut tag = NbtCompound::new();
        be.write_nbt(&mut tag);
        assert_eq!(tag.get_string("id"), "galacticraft-rewoven:compressor");
        assert_eq!(tag.get_int("Progress"), 12);
        assert_eq!(tag.get_int("FuelTime"), 300);
        assert!(!tag.contains("MaxFuelTime"));
        assert_eq!(tag.get_list("Items").len(), 3);
    }

    #[test]
    fn electric_variant_skips_fuel_entirely() {
        let mut world = World::new();
        let pos = BlockPos::new(1, 2, 3);
        let mut be = CompressorBlockEntity::with_variant(pos, CompressorVariant::Electric);
        be.inventory_mut().set(0, ItemStack::new(IRON, 2)).unwrap();
        be.inventory_mut().set(1, ItemStack::new(IRON, 2)).unwrap();
        be.inventory_mut()
            .set(FUEL_INPUT_SLOT, ItemStack::new(COAL, 1))
            .unwrap();

        world.tick(&mut be);
        assert_eq!(be.status(), CompressorStatus::Inactive);
        assert_eq!(be.progress(), 0);

        be.set_status(CompressorStatus::Processing);
        world.tick_n(&mut be, 3);
        assert_eq!(be.progress(), 3);
        assert_eq!(be.fuel_time(), 0);
        assert_eq!(be.inventory().get(FUEL_INPUT_SLOT).count, 1);
    }

    #[test]
    fn electric_variant_does_not_persist_fuel_time() {
        let mut be =
            CompressorBlockEntity::with_variant(BlockPos::default(), CompressorVariant::Electric);
        be.progress = 5;
        be.fuel_time = 40;
        let mut tag = NbtCompound::new();
        be.write_nbt(&mut tag);
        assert!(!tag.contains("FuelTime"));

        tag.put_int("FuelTime", 999);
        let loaded = CompressorBlockEntity::from_nbt(&tag).unwrap();
        assert_eq!(loaded.variant(), CompressorVariant::Electric);
        assert_eq!(loaded.progress(), 5);
        assert_eq!(loaded.fuel_time(), 0);
    }

    #[test]
    fn missing_keys_load_as_zero() {
        let mut tag = NbtCompound::new();
        tag.put_string("id", "galacticraft-rewoven:compressor");
        let loaded = CompressorBlockEntity::from_nbt(&tag).unwrap();
        assert_eq!(loaded.progress(), 0);
        assert_eq!(loaded.fuel_time(), 0);
        assert_eq!(loaded.pos(), BlockPos::new(0, 0, 0));
    }

    #[test]
    fn out_of_range_progress_is_reset() {
        let mut tag = NbtCompound::new();
        tag.put_string("id", "galacticraft-rewoven:compressor");
        tag.put_int("Progress", 250);
        let loaded = CompressorBlockEntity::from_nbt(&tag).unwrap();
        assert_eq!(loaded.progress(), 0);
    }

    #[test]
    fn unknown_block_entity_rejected() {
        let mut tag = NbtCompound::new();
        tag.put_string("id", "minecraft:furnace");
        assert!(matches!(
            CompressorBlockEntity::from_nbt(&tag),
            Err(MachineError::UnknownBlockEntity(_))
        ));
    }

    #[test]
    fn custom_max_progress() {
        let mut world = World::new();
        let mut be = loaded_compressor(1).with_max_progress(20);
        world.tick_n(&mut be, 20);
        assert_eq!(be.inventory().get(OUTPUT_SLOT).count, 1);
        // 40 never exceeds a 20-tick craft, so no sound.
        assert!(world.sounds.played.is_empty());
    }

    #[test]
    fn long_craft_progress_survives_reload() {
        let mut world = World::new();
        let pos = BlockPos::new(7, 64, 7);
        let mut be = CompressorBlockEntity::with_variant(pos, CompressorVariant::Electric)
            .with_max_progress(300);
        be.inventory_mut().set(0, ItemStack::new(IRON, 4)).unwrap();
        be.inventory_mut().set(1, ItemStack::new(IRON, 4)).unwrap();
        be.set_status(CompressorStatus::Processing);
        world.tick_n(&mut be, 250);
        assert_eq!(be.progress(), 250);

        let mut tag = NbtCompound::new();
        be.write_nbt(&mut tag);
        let mut loaded = CompressorBlockEntity::from_nbt_with_max_progress(&tag, 300).unwrap();
        assert_eq!(loaded.progress(), 250);
        assert_eq!(loaded.max_progress(), 300);

        loaded.set_status(CompressorStatus::Processing);
        world.tick_n(&mut loaded, 50);
        assert_eq!(loaded.progress(), 0);
        assert_eq!(loaded.inventory().get(OUTPUT_SLOT).item, COMPRESSED_IRON);
    }
}
