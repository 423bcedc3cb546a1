//! Container menus: identifiers, block-position addressed factories and the
//! compressor screen model.

use std::collections::HashMap;

use crate::compressor::{
    CompressorBlockEntity, CompressorStatus, CompressorVariant, FUEL_INPUT_SLOT, INPUT_SLOTS,
    OUTPUT_SLOT,
};
use crate::effects::BlockPos;
use crate::error::MachineError;
use crate::fuel::FuelTable;
use crate::item::ItemStack;
use crate::level::MachineLevel;

pub const MOD_ID: &str = "galacticraft-rewoven";

pub const PLAYER_INVENTORY_CONTAINER: &str = "galacticraft-rewoven:player_inventory_container";
pub const COAL_GENERATOR_CONTAINER: &str = "galacticraft-rewoven:coal_generator_container";
pub const BASIC_SOLAR_PANEL_CONTAINER: &str = "galacticraft-rewoven:basic_solar_panel_container";
pub const CIRCUIT_FABRICATOR_CONTAINER: &str = "galacticraft-rewoven:circuit_fabricator_container";
pub const COMPRESSOR_CONTAINER: &str = "galacticraft-rewoven:compressor_container";
pub const ELECTRIC_COMPRESSOR_CONTAINER: &str =
    "galacticraft-rewoven:electric_compressor_container";
pub const ENERGY_STORAGE_MODULE_CONTAINER: &str =
    "galacticraft-rewoven:energy_storage_module_container";
pub const REFINERY_CONTAINER: &str = "galacticraft-rewoven:refinery_container";
pub const OXYGEN_COLLECTOR_CONTAINER: &str = "galacticraft-rewoven:oxygen_collector_container";

/// Every container identifier the mod defines.
pub const ALL_CONTAINERS: [&str; 9] = [
    PLAYER_INVENTORY_CONTAINER,
    COAL_GENERATOR_CONTAINER,
    BASIC_SOLAR_PANEL_CONTAINER,
    CIRCUIT_FABRICATOR_CONTAINER,
    COMPRESSOR_CONTAINER,
    ELECTRIC_COMPRESSOR_CONTAINER,
    ENERGY_STORAGE_MODULE_CONTAINER,
    REFINERY_CONTAINER,
    OXYGEN_COLLECTOR_CONTAINER,
];

/// Builds a menu for the block entity at a position.
pub type MenuFactory =
    Box<dyn Fn(u32, BlockPos, &MachineLevel) -> Result<CompressorMenu, MachineError>>;

/// Container identifier -> factory.
#[derive(Default)]
pub struct MenuRegistry {
    factories: HashMap<String, MenuFactory>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with factories for the menus backed by this crate's machines.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(COMPRESSOR_CONTAINER, compressor_factory(CompressorVariant::Fuelled));
        registry.register(
            ELECTRIC_COMPRESSOR_CONTAINER,
            compressor_factory(CompressorVariant::Electric),
        );
        registry
    }

    pub fn register(&mut self, id: impl Into<String>, factory: MenuFactory) {
        self.factories.insert(id.into(), factory);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Open the menu `id` for the block at `pos`.
    pub fn open(
        &self,
        id: &str,
        sync_id: u32,
        pos: BlockPos,
        level: &MachineLevel,
    ) -> Result<CompressorMenu, MachineError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| MachineError::UnknownMenu(id.to_string()))?;
        factory(sync_id, pos, level)
    }
}

fn compressor_factory(variant: CompressorVariant) -> MenuFactory {
    Box::new(move |sync_id: u32, pos: BlockPos, level: &MachineLevel| {
        let entity = level
            .get(pos)
            .filter(|be| be.variant() == variant)
            .ok_or_else(|| {
                MachineError::UnknownBlockEntity(format!("no {} at {pos}", variant.nbt_id()))
            })?;
        Ok(CompressorMenu::new(sync_id, entity))
    })
}

/// What a menu slot is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Input,
    Fuel,
    Output,
}

/// One slot as laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSlot {
    /// Index in the machine inventory.
    pub index: usize,
    pub kind: SlotKind,
    pub x: i32,
    pub y: i32,
}

/// Values synced to the client each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressorProperties {
    pub status: CompressorStatus,
    pub progress: i32,
    pub max_progress: i32,
    pub fuel_time: i32,
    pub max_fuel_time: i32,
}

impl CompressorProperties {
    pub fn of(entity: &CompressorBlockEntity) -> Self {
        Self {
            status: entity.status(),
            progress: entity.progress(),
            max_progress: entity.max_progress(),
            fuel_time: entity.fuel_time(),
            max_fuel_time: entity.max_fuel_time(),
        }
    }
}

/// Server-side model of an open compressor screen.
#[derive(Debug, Clone)]
pub struct CompressorMenu {
    pub sync_id: u32,
    pub pos: BlockPos,
    pub variant: CompressorVariant,
    pub slots: Vec<MenuSlot>,
    pub properties: CompressorProperties,
}

impl CompressorMenu {
    pub fn new(sync_id: u32, entity: &CompressorBlockEntity) -> Self {
        let mut slots: Vec<MenuSlot> = INPUT_SLOTS
            .map(|index| MenuSlot {
                index,
                kind: SlotKind::Input,
                x: 17 + (index % 3) as i32 * 18,
                y: 17 + (index / 3) as i32 * 18,
            })
            .collect();
        if entity.should_use_fuel() {
            slots.push(MenuSlot {
                index: FUEL_INPUT_SLOT,
                kind: SlotKind::Fuel,
                x: 83,
                y: 47,
            });
        }
        slots.push(MenuSlot {
            index: OUTPUT_SLOT,
            kind: SlotKind::Output,
            x: 143,
            y: 36,
        });

        Self {
            sync_id,
            pos: entity.pos(),
            variant: entity.variant(),
            slots,
            properties: CompressorProperties::of(entity),
        }
    }

    pub fn menu_type(&self) -> &'static str {
        match self.variant {
            CompressorVariant::Fuelled => COMPRESSOR_CONTAINER,
            CompressorVariant::Electric => ELECTRIC_COMPRESSOR_CONTAINER,
        }
    }

    /// Re-read synced values after the machine ticked.
    pub fn refresh(&mut self, entity: &CompressorBlockEntity) {
        self.properties = CompressorProperties::of(entity);
    }

    /// Whether a player may place `stack` into inventory slot `index`.
    pub fn can_insert(&self, index: usize, stack: &ItemStack, fuel: &dyn FuelTable) -> bool {
        match self.slots.iter().find(|s| s.index == index).map(|s| s.kind) {
            Some(SlotKind::Input) => true,
            Some(SlotKind::Fuel) => fuel.is_fuel(&stack.item),
            Some(SlotKind::Output) | None => false,
        }
    }

    /// Crafting arrow length in pixels for an arrow `width` pixels wide.
    pub fn progress_scaled(&self, width: i32) -> i32 {
        let p = &self.properties;
        if p.max_progress <= 0 {
            return 0;
        }
        p.progress * width / p.max_progress
    }

    /// Flame height in pixels. Empty whenever the burn maximum is unknown,
    /// which includes every reloaded machine until its next refuel.
    pub fn fuel_scaled(&self, height: i32) -> i32 {
        let p = &self.properties;
        if p.max_fuel_time <= 0 {
            return 0;
        }
        p.fuel_time.max(0) * height / p.max_fuel_time
    }
}
