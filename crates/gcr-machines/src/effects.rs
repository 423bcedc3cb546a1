//! World side effects a machine can trigger.

use std::fmt;

use tracing::debug;

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    AnvilLand,
}

impl SoundEvent {
    pub fn id(&self) -> &'static str {
        match self {
            SoundEvent::AnvilLand => "minecraft:block.anvil.land",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCategory {
    Master,
    Blocks,
    Ambient,
}

/// Sink for sounds played by machines.
pub trait WorldEffects {
    fn play_sound(
        &mut self,
        pos: BlockPos,
        sound: SoundEvent,
        category: SoundCategory,
        volume: f32,
        pitch: f32,
    );
}

/// One recorded sound.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedSound {
    pub pos: BlockPos,
    pub sound: SoundEvent,
    pub category: SoundCategory,
    pub volume: f32,
    pub pitch: f32,
}

/// Keeps every sound it is asked to play.
#[derive(Debug, Default)]
pub struct SoundLog {
    pub played: Vec<PlayedSound>,
}

impl WorldEffects for SoundLog {
    fn play_sound(
        &mut self,
        pos: BlockPos,
        sound: SoundEvent,
        category: SoundCategory,
        volume: f32,
        pitch: f32,
    ) {
        self.played.push(PlayedSound {
            pos,
            sound,
            category,
            volume,
            pitch,
        });
    }
}

/// Reports sounds through `tracing` and discards them.
#[derive(Debug, Default)]
pub struct TracingEffects;

impl WorldEffects for TracingEffects {
    fn play_sound(
        &mut self,
        pos: BlockPos,
        sound: SoundEvent,
        category: SoundCategory,
        volume: f32,
        pitch: f32,
    ) {
        debug!(%pos, sound = sound.id(), ?category, volume, pitch, "play sound");
    }
}
