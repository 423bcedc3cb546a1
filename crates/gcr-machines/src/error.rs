//! Machine error types.
//!
//! Only the load paths (recipe data files, saved block entities, host slot
//! writes) can fail. The tick path never returns an error: running out of
//! fuel or output space is a status change, not a failure.

use gcr_nbt::NbtError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("slot {slot} out of range for inventory of {size} slots")]
    SlotOutOfRange { slot: usize, size: usize },

    #[error("unknown recipe type: {0}")]
    UnknownRecipeType(String),

    #[error("invalid recipe {id}: {reason}")]
    InvalidRecipe { id: String, reason: String },

    #[error("recipe JSON: {0}")]
    RecipeJson(#[from] serde_json::Error),

    #[error("unknown block entity id: {0:?}")]
    UnknownBlockEntity(String),

    #[error("menu type not registered: {0}")]
    UnknownMenu(String),

    #[error("NBT: {0}")]
    Nbt(#[from] NbtError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
