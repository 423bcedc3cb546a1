//! A level holding placed compressors and the shared collaborators they tick against.

use std::collections::BTreeMap;

use gcr_nbt::{NbtCompound, NbtRoot, NbtTag};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::compressor::{CompressorBlockEntity, TickContext, DEFAULT_MAX_PROGRESS};
use crate::effects::{BlockPos, WorldEffects};
use crate::error::MachineError;
use crate::fuel::FuelValueTable;
use crate::recipe::RecipeManager;

/// Placed machines plus the recipe manager, fuel table, sound sink and
/// random source they share.
pub struct MachineLevel {
    machines: BTreeMap<BlockPos, CompressorBlockEntity>,
    recipes: RecipeManager,
    fuel: FuelValueTable,
    effects: Box<dyn WorldEffects>,
    rng: StdRng,
    time: i64,
    /// Craft length given to machines rebuilt by [`load_nbt`](Self::load_nbt).
    max_progress: i32,
}

impl MachineLevel {
    pub fn new(
        recipes: RecipeManager,
        fuel: FuelValueTable,
        effects: Box<dyn WorldEffects>,
        seed: u64,
    ) -> Self {
        Self {
            machines: BTreeMap::new(),
            recipes,
            fuel,
            effects,
            rng: StdRng::seed_from_u64(seed),
            time: 0,
            max_progress: DEFAULT_MAX_PROGRESS,
        }
    }

    /// Craft length for loaded machines. Match what placed machines were
    /// built with, since saves do not record it.
    pub fn with_max_progress(mut self, max_progress: i32) -> Self {
        self.max_progress = max_progress.max(1);
        self
    }

    pub fn max_progress(&self) -> i32 {
        self.max_progress
    }

    pub fn recipes(&self) -> &RecipeManager {
        &self.recipes
    }

    pub fn fuel(&self) -> &FuelValueTable {
        &self.fuel
    }

    /// Ticks elapsed since the level was created or loaded.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// Place a machine, returning any machine it replaced.
    pub fn place(&mut self, machine: CompressorBlockEntity) -> Option<CompressorBlockEntity> {
        debug!(pos = %machine.pos(), variant = ?machine.variant(), "placed compressor");
        self.machines.insert(machine.pos(), machine)
    }

    /// Remove the machine at `pos`. Its inventory goes with it.
    pub fn remove(&mut self, pos: BlockPos) -> Option<CompressorBlockEntity> {
        self.machines.remove(&pos)
    }

    pub fn get(&self, pos: BlockPos) -> Option<&CompressorBlockEntity> {
        self.machines.get(&pos)
    }

    pub fn get_mut(&mut self, pos: BlockPos) -> Option<&mut CompressorBlockEntity> {
        self.machines.get_mut(&pos)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn machines(&self) -> impl Iterator<Item = &CompressorBlockEntity> {
        self.machines.values()
    }

    /// Tick every machine once, in block position order.
    pub fn tick(&mut self) {
        for machine in self.machines.values_mut() {
            let mut ctx = TickContext {
                recipes: &self.recipes,
                fuel: &self.fuel,
                effects: &mut *self.effects,
                rng: &mut self.rng,
            };
            machine.tick(&mut ctx);
        }
        self.time += 1;
    }

    /// Snapshot as `{Time, BlockEntities: [...]}`.
    pub fn to_nbt(&self) -> NbtRoot {
        let entities = self
            .machines
            .values()
            .map(|machine| {
                let mut c = NbtCompound::new();
                machine.write_nbt(&mut c);
                NbtTag::Compound(c)
            })
            .collect();

        let mut root = NbtCompound::new();
        root.insert("Time", NbtTag::Long(self.time));
        root.put_list("BlockEntities", entities);
        NbtRoot::new("", root)
    }

    /// Replace all machines with those saved in `root`.
    ///
    /// Entries that are not compressors are skipped with a warning so that a
    /// level written by a newer version still loads.
    pub fn load_nbt(&mut self, root: &NbtRoot) -> Result<usize, MachineError> {
        self.machines.clear();
        self.time = root
            .compound
            .get("Time")
            .and_then(NbtTag::as_long)
            .unwrap_or(0);

        for entry in root.compound.get_list("BlockEntities") {
            let Some(c) = entry.as_compound() else {
                continue;
            };
            match CompressorBlockEntity::from_nbt_with_max_progress(c, self.max_progress) {
                Ok(machine) => {
                    self.machines.insert(machine.pos(), machine);
                }
                Err(MachineError::UnknownBlockEntity(id)) => {
                    warn!(%id, "skipping unknown block entity");
                }
                Err(e) => return Err(e),
            }
        }
        info!(machines = self.machines.len(), time = self.time, "loaded level");
        Ok(self.machines.len())
    }
}
