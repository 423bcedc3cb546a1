//! Fuel burn times.

use std::collections::HashMap;

/// Maps combustible items to the number of ticks one item keeps a machine running.
pub trait FuelTable {
    /// Burn time in ticks, or `None` if the item is not a fuel.
    fn burn_time(&self, item: &str) -> Option<u32>;

    fn is_fuel(&self, item: &str) -> bool {
        self.burn_time(item).is_some()
    }
}

/// Furnace fuel values, injected into machines rather than looked up globally.
#[derive(Debug, Clone)]
pub struct FuelValueTable {
    fuel_map: HashMap<String, u32>,
}

impl Default for FuelValueTable {
    fn default() -> Self {
        Self::vanilla()
    }
}

impl FuelTable for FuelValueTable {
    fn burn_time(&self, item: &str) -> Option<u32> {
        self.fuel_map.get(item).copied()
    }
}

impl FuelValueTable {
    /// A table with no fuels.
    pub fn empty() -> Self {
        Self {
            fuel_map: HashMap::new(),
        }
    }

    /// The standard furnace fuel values.
    pub fn vanilla() -> Self {
        let mut fuel_map = HashMap::new();
        let mut fuel = |item: &str, ticks: u32| {
            fuel_map.insert(item.to_string(), ticks);
        };

        fuel("minecraft:lava_bucket", 20000);
        fuel("minecraft:coal_block", 16000);
        fuel("minecraft:dried_kelp_block", 4000);
        fuel("minecraft:blaze_rod", 2400);
        fuel("minecraft:coal", 1600);
        fuel("minecraft:charcoal", 1600);
        for wood in ["oak", "spruce", "birch", "jungle", "acacia", "dark_oak"] {
            fuel(&format!("minecraft:{wood}_log"), 300);
            fuel(&format!("minecraft:{wood}_planks"), 300);
            fuel(&format!("minecraft:{wood}_slab"), 150);
            fuel(&format!("minecraft:{wood}_sapling"), 100);
        }
        for tool in ["pickaxe", "axe", "shovel", "sword", "hoe"] {
            fuel(&format!("minecraft:wooden_{tool}"), 200);
        }
        fuel("minecraft:crafting_table", 300);
        fuel("minecraft:bookshelf", 300);
        fuel("minecraft:chest", 300);
        fuel("minecraft:bow", 300);
        fuel("minecraft:fishing_rod", 300);
        fuel("minecraft:ladder", 300);
        fuel("minecraft:stick", 100);
        fuel("minecraft:bowl", 100);
        fuel("minecraft:white_wool", 100);
        fuel("minecraft:white_carpet", 67);
        fuel("minecraft:bamboo", 50);
        fuel("minecraft:scaffolding", 400);

        Self { fuel_map }
    }

    /// Add or replace one entry.
    pub fn with_override(mut self, item: impl Into<String>, ticks: u32) -> Self {
        self.fuel_map.insert(item.into(), ticks);
        self
    }

    pub fn len(&self) -> usize {
        self.fuel_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fuel_map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_values() {
        let table = FuelValueTable::vanilla();
        assert_eq!(table.burn_time("minecraft:coal"), Some(1600));
        assert_eq!(table.burn_time("minecraft:stick"), Some(100));
        assert_eq!(table.burn_time("minecraft:lava_bucket"), Some(20000));
        assert_eq!(table.burn_time("minecraft:oak_planks"), Some(300));
        assert!(table.burn_time("minecraft:stone").is_none());
    }

    #[test]
    fn override_adds_mod_fuel() {
        let table =
            FuelValueTable::empty().with_override("galacticraft-rewoven:fuel_canister", 1000);
        assert!(table.is_fuel("galacticraft-rewoven:fuel_canister"));
        assert!(!table.is_fuel("minecraft:coal"));
        assert_eq!(table.len(), 1);
    }
}
