use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub compressor: CompressorSection,
    #[serde(default)]
    pub recipes: RecipesSection,
    #[serde(default)]
    pub fuel: FuelSection,
    pub simulation: SimulationSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct CompressorSection {
    /// Ticks per craft. Default: 200 (10 seconds).
    #[serde(default = "default_max_progress")]
    pub max_progress: i32,
}

fn default_max_progress() -> i32 {
    200
}

impl Default for CompressorSection {
    fn default() -> Self {
        Self {
            max_progress: default_max_progress(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecipesSection {
    /// Register the built-in compressing recipes before loading data files.
    #[serde(default = "default_true")]
    pub builtin: bool,
    /// Directory of recipe JSON files. Unset = built-ins only.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    "galacticraft-rewoven".into()
}

impl Default for RecipesSection {
    fn default() -> Self {
        Self {
            builtin: true,
            directory: None,
            namespace: default_namespace(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FuelSection {
    /// Extra or replacement burn times in ticks, keyed by item id.
    #[serde(default)]
    pub extra: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
pub struct SimulationSection {
    pub ticks: u64,
    #[serde(default)]
    pub seed: u64,
    /// Log machine state every N ticks. 0 = only at the end.
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
    #[serde(default = "default_save_path")]
    pub save_path: String,
    /// Continue from `save_path` when it exists instead of placing `machine` entries.
    #[serde(default)]
    pub resume: bool,
    #[serde(default, rename = "machine")]
    pub machines: Vec<MachineEntry>,
}

fn default_report_interval() -> u64 {
    100
}

fn default_save_path() -> String {
    "level.dat".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    #[default]
    Fuelled,
    Electric,
}

#[derive(Debug, Deserialize)]
pub struct MachineEntry {
    pub pos: [i32; 3],
    #[serde(default)]
    pub variant: VariantKind,
    /// Electric machines only: start in the processing state.
    #[serde(default)]
    pub powered: bool,
    #[serde(default, rename = "slot")]
    pub slots: Vec<SlotEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SlotEntry {
    pub index: usize,
    pub item: String,
    #[serde(default = "default_count")]
    pub count: u16,
}

fn default_count() -> u16 {
    1
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

impl SimConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
