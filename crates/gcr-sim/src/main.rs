mod config;

use std::path::Path;

use config::{MachineEntry, SimConfig, VariantKind};
use gcr_machines::compressor::OUTPUT_SLOT;
use gcr_machines::effects::{BlockPos, TracingEffects};
use gcr_machines::fuel::FuelValueTable;
use gcr_machines::level::MachineLevel;
use gcr_machines::menu::{
    CompressorMenu, MenuRegistry, COMPRESSOR_CONTAINER, ELECTRIC_COMPRESSOR_CONTAINER,
};
use gcr_machines::recipe::RecipeManager;
use gcr_machines::{
    CompressorBlockEntity, CompressorStatus, CompressorVariant, ItemStack, MachineError,
};
use tracing::{error, info, warn};

/// Width and height of the progress arrow and fuel flame in the compressor screen.
const PROGRESS_ARROW_WIDTH: i32 = 24;
const FUEL_FLAME_HEIGHT: i32 = 14;

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "machines.toml".into());
    let config = match SimConfig::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "GCR machine simulator v{} ({} ticks, seed {})",
        env!("CARGO_PKG_VERSION"),
        config.simulation.ticks,
        config.simulation.seed
    );

    if let Err(e) = run(&config) {
        error!("Simulation failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: &SimConfig) -> Result<(), MachineError> {
    let recipes = load_recipes(config)?;
    info!("Recipes: {} compressing recipes registered", recipes.len());

    let mut fuel = FuelValueTable::vanilla();
    for (item, ticks) in &config.fuel.extra {
        fuel = fuel.with_override(item.clone(), *ticks);
    }
    info!("Fuel: {} burnable items", fuel.len());

    let mut level = MachineLevel::new(
        recipes,
        fuel,
        Box::new(TracingEffects),
        config.simulation.seed,
    )
    .with_max_progress(config.compressor.max_progress);

    let save_path = Path::new(&config.simulation.save_path);
    if config.simulation.resume && save_path.exists() {
        let data = std::fs::read(save_path)?;
        let root = gcr_nbt::read_gzip(&data)?;
        level.load_nbt(&root)?;
        let powered = restore_power(&mut level, &config.simulation.machines);
        info!(
            "Resumed {} machines from {} ({} powered)",
            level.len(),
            save_path.display(),
            powered
        );
    } else {
        for entry in &config.simulation.machines {
            level.place(build_machine(entry, config.compressor.max_progress)?);
        }
    }

    if level.is_empty() {
        warn!("No machines placed; nothing to simulate");
    }

    let registry = MenuRegistry::with_defaults();
    let mut menus = Vec::new();
    for (sync_id, machine) in (1u32..).zip(level.machines()) {
        let container = match machine.variant() {
            CompressorVariant::Fuelled => COMPRESSOR_CONTAINER,
            CompressorVariant::Electric => ELECTRIC_COMPRESSOR_CONTAINER,
        };
        menus.push((machine.pos(), registry.open(container, sync_id, machine.pos(), &level)?));
    }

    for _ in 0..config.simulation.ticks {
        level.tick();
        let interval = config.simulation.report_interval;
        if interval > 0 && level.time() as u64 % interval == 0 {
            report(&level, &mut menus);
        }
    }
    report(&level, &mut menus);

    let bytes = gcr_nbt::write_gzip(&level.to_nbt())?;
    std::fs::write(save_path, &bytes)?;
    info!(
        "Saved {} machines to {} ({} bytes)",
        level.len(),
        save_path.display(),
        bytes.len()
    );
    Ok(())
}

fn load_recipes(config: &SimConfig) -> Result<RecipeManager, MachineError> {
    let mut recipes = if config.recipes.builtin {
        RecipeManager::with_defaults()
    } else {
        RecipeManager::new()
    };
    if let Some(dir) = &config.recipes.directory {
        let dir = Path::new(dir);
        if dir.is_dir() {
            recipes.load_dir(&config.recipes.namespace, dir)?;
        } else {
            warn!("Recipe directory {} not found, skipping", dir.display());
        }
    }
    Ok(recipes)
}

fn build_machine(
    entry: &MachineEntry,
    max_progress: i32,
) -> Result<CompressorBlockEntity, MachineError> {
    let [x, y, z] = entry.pos;
    let variant = match entry.variant {
        VariantKind::Fuelled => CompressorVariant::Fuelled,
        VariantKind::Electric => CompressorVariant::Electric,
    };
    let mut machine = CompressorBlockEntity::with_variant(BlockPos::new(x, y, z), variant)
        .with_max_progress(max_progress);
    for slot in &entry.slots {
        machine
            .inventory_mut()
            .set(slot.index, ItemStack::new(slot.item.clone(), slot.count))?;
    }
    if entry.powered {
        if variant == CompressorVariant::Electric {
            machine.set_status(CompressorStatus::Processing);
        } else {
            warn!("Ignoring `powered` on fuelled compressor at {}", machine.pos());
        }
    }
    Ok(machine)
}

/// Power is not part of the save, so switch electric machines marked
/// `powered` back on after a resume. Returns how many were powered.
fn restore_power(level: &mut MachineLevel, entries: &[MachineEntry]) -> usize {
    let mut powered = 0;
    for entry in entries.iter().filter(|e| e.powered) {
        let [x, y, z] = entry.pos;
        let pos = BlockPos::new(x, y, z);
        match level.get_mut(pos) {
            Some(machine) if machine.variant() == CompressorVariant::Electric => {
                machine.set_status(CompressorStatus::Processing);
                powered += 1;
            }
            Some(_) => warn!("Ignoring `powered` on fuelled compressor at {pos}"),
            None => warn!("No saved machine at {pos} to power"),
        }
    }
    powered
}

fn report(level: &MachineLevel, menus: &mut [(BlockPos, CompressorMenu)]) {
    for (pos, menu) in menus.iter_mut() {
        let Some(machine) = level.get(*pos) else {
            continue;
        };
        menu.refresh(machine);
        let output = machine.inventory().get(OUTPUT_SLOT);
        info!(
            "[t={}] {} {}: {} progress {}/{} (arrow {}/{}) fuel {}/{} (flame {}/{}) output {}x{}",
            level.time(),
            machine.variant().nbt_id(),
            pos,
            machine.status().name(),
            machine.progress(),
            machine.max_progress(),
            menu.progress_scaled(PROGRESS_ARROW_WIDTH),
            PROGRESS_ARROW_WIDTH,
            machine.fuel_time(),
            machine.max_fuel_time(),
            menu.fuel_scaled(FUEL_FLAME_HEIGHT),
            FUEL_FLAME_HEIGHT,
            output.count,
            output.item,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gcr_machines::compressor::INPUT_SLOTS;

    const IRON: &str = "minecraft:iron_ingot";

    fn level(max_progress: i32) -> MachineLevel {
        MachineLevel::new(
            RecipeManager::with_defaults(),
            FuelValueTable::vanilla(),
            Box::new(TracingEffects),
            0,
        )
        .with_max_progress(max_progress)
    }

    fn electric_entry(pos: [i32; 3]) -> MachineEntry {
        let toml_str = format!(
            r#"
            pos = [{}, {}, {}]
            variant = "electric"
            powered = true

            [[slot]]
            index = 0
            item = "{IRON}"
            count = 4

            [[slot]]
            index = 1
            item = "{IRON}"
            count = 4
            "#,
            pos[0], pos[1], pos[2]
        );
        toml::from_str(&toml_str).unwrap()
    }

    #[test]
    fn build_machine_applies_slots_and_power() {
        let machine = build_machine(&electric_entry([1, 2, 3]), 300).unwrap();
        assert_eq!(machine.pos(), BlockPos::new(1, 2, 3));
        assert_eq!(machine.max_progress(), 300);
        assert_eq!(machine.status(), CompressorStatus::Processing);
        assert_eq!(machine.inventory().get(INPUT_SLOTS.start).count, 4);
    }

    #[test]
    fn resumed_electric_machine_keeps_working() {
        let entries = vec![electric_entry([0, 64, 0])];
        let mut first = level(300);
        first.place(build_machine(&entries[0], 300).unwrap());
        for _ in 0..250 {
            first.tick();
        }
        let bytes = gcr_nbt::write_gzip(&first.to_nbt()).unwrap();

        let mut resumed = level(300);
        resumed.load_nbt(&gcr_nbt::read_gzip(&bytes).unwrap()).unwrap();
        assert_eq!(restore_power(&mut resumed, &entries), 1);
        for _ in 0..10 {
            resumed.tick();
        }
        let machine = resumed.get(BlockPos::new(0, 64, 0)).unwrap();
        assert_eq!(machine.status(), CompressorStatus::Processing);
        assert_eq!(machine.progress(), 260);
        assert_eq!(machine.max_progress(), 300);
    }

    #[test]
    fn restore_power_skips_missing_machines() {
        let mut level = level(200);
        assert_eq!(restore_power(&mut level, &[electric_entry([9, 9, 9])]), 0);
    }
}
