//! Galacticraft machine block entities: the compressor's tick controller and
//! the inventory, recipe, fuel, sound and menu plumbing around it.

pub mod compressor;
pub mod effects;
pub mod error;
pub mod fuel;
pub mod inventory;
pub mod item;
pub mod level;
pub mod menu;
pub mod recipe;

pub use compressor::{CompressorBlockEntity, CompressorStatus, CompressorVariant, TickContext};
pub use error::MachineError;
pub use item::ItemStack;
