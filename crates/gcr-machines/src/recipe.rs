//! Compressing recipes.
//!
//! The compressor knows two recipe kinds: shapeless (any arrangement of the
//! ingredients in the 3×3 grid) and shaped (a pattern that may sit anywhere
//! in the grid and may be mirrored). When both kinds match the same grid the
//! shapeless recipe wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::MachineError;
use crate::inventory::CraftingView;
use crate::item::ItemStack;

pub const SHAPELESS_COMPRESSING: &str = "galacticraft-rewoven:compressing_shapeless";
pub const SHAPED_COMPRESSING: &str = "galacticraft-rewoven:compressing_shaped";

static EMPTY_CELL: Ingredient = Ingredient::EMPTY;

/// A set of acceptable items for one grid cell.
///
/// The empty ingredient matches only an empty slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingredient {
    pub items: Vec<String>,
}

impl Ingredient {
    pub const EMPTY: Ingredient = Ingredient { items: Vec::new() };

    pub fn of(item: impl Into<String>) -> Self {
        Self {
            items: vec![item.into()],
        }
    }

    pub fn any_of<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn test(&self, stack: &ItemStack) -> bool {
        if self.items.is_empty() {
            return stack.is_empty();
        }
        !stack.is_empty() && self.items.iter().any(|i| *i == stack.item)
    }
}

/// Which recipe family a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeKind {
    ShapelessCompressing,
    ShapedCompressing,
}

impl RecipeKind {
    /// Recipe `type` string used in data files.
    pub fn type_id(&self) -> &'static str {
        match self {
            RecipeKind::ShapelessCompressing => SHAPELESS_COMPRESSING,
            RecipeKind::ShapedCompressing => SHAPED_COMPRESSING,
        }
    }
}

/// Behavior shared by both compressing recipe kinds.
pub trait CompressingRecipe {
    fn id(&self) -> &str;
    fn kind(&self) -> RecipeKind;
    fn matches(&self, input: &CraftingView<'_>) -> bool;
    /// The stack produced by crafting `input`. Callers check `matches` first.
    fn craft(&self, input: &CraftingView<'_>) -> ItemStack;
}

/// Order-independent recipe.
#[derive(Debug, Clone)]
pub struct ShapelessCompressingRecipe {
    pub id: String,
    /// Sequential registry ID.
    pub network_id: u32,
    pub ingredients: Vec<Ingredient>,
    pub result: ItemStack,
}

impl CompressingRecipe for ShapelessCompressingRecipe {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> RecipeKind {
        RecipeKind::ShapelessCompressing
    }

    fn matches(&self, input: &CraftingView<'_>) -> bool {
        let stacks: Vec<&ItemStack> = input.stacks().filter(|s| !s.is_empty()).collect();
        if stacks.len() != self.ingredients.len() {
            return false;
        }
        let mut used = vec![false; stacks.len()];
        assign_ingredients(&self.ingredients, &stacks, &mut used)
    }

    fn craft(&self, _input: &CraftingView<'_>) -> ItemStack {
        self.result.clone()
    }
}

/// Give every ingredient its own stack; backtracks because ingredients
/// accepting several items can overlap.
fn assign_ingredients(
    ingredients: &[Ingredient],
    stacks: &[&ItemStack],
    used: &mut [bool],
) -> bool {
    let Some((first, rest)) = ingredients.split_first() else {
        return true;
    };
    for i in 0..stacks.len() {
        if used[i] || !first.test(stacks[i]) {
            continue;
        }
        used[i] = true;
        if assign_ingredients(rest, stacks, used) {
            return true;
        }
        used[i] = false;
    }
    false
}

/// Pattern recipe, at most 3×3.
#[derive(Debug, Clone)]
pub struct ShapedCompressingRecipe {
    pub id: String,
    pub network_id: u32,
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` cells.
    pub pattern: Vec<Ingredient>,
    pub result: ItemStack,
}

impl ShapedCompressingRecipe {
    /// The pattern must fit the 3×3 grid and hold exactly `width * height` cells.
    fn check_shape(&self) -> Result<(), String> {
        if !(1..=CraftingView::WIDTH).contains(&self.width)
            || !(1..=CraftingView::HEIGHT).contains(&self.height)
        {
            return Err(format!(
                "pattern is {}x{}, must be within 3x3",
                self.width, self.height
            ));
        }
        if self.pattern.len() != self.width * self.height {
            return Err(format!(
                "pattern has {} cells, expected {}",
                self.pattern.len(),
                self.width * self.height
            ));
        }
        Ok(())
    }

    fn matches_at(&self, input: &CraftingView<'_>, x0: usize, y0: usize, mirrored: bool) -> bool {
        for y in 0..CraftingView::HEIGHT {
            for x in 0..CraftingView::WIDTH {
                let inside = x >= x0 && y >= y0 && x - x0 < self.width && y - y0 < self.height;
                let ingredient = if inside {
                    let (dx, dy) = (x - x0, y - y0);
                    let col = if mirrored { self.width - dx - 1 } else { dx };
                    &self.pattern[col + dy * self.width]
                } else {
                    &EMPTY_CELL
                };
                if !ingredient.test(input.at(x, y)) {
                    return false;
                }
            }
        }
        true
    }
}

impl CompressingRecipe for ShapedCompressingRecipe {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> RecipeKind {
        RecipeKind::ShapedCompressing
    }

    fn matches(&self, input: &CraftingView<'_>) -> bool {
        if self.check_shape().is_err() {
            return false;
        }
        for x0 in 0..=CraftingView::WIDTH - self.width {
            for y0 in 0..=CraftingView::HEIGHT - self.height {
                if self.matches_at(input, x0, y0, true) || self.matches_at(input, x0, y0, false) {
                    return true;
                }
            }
        }
        false
    }

    fn craft(&self, _input: &CraftingView<'_>) -> ItemStack {
        self.result.clone()
    }
}

/// Host recipe manager contract: first recipe of `kind` matching `input`.
pub trait RecipeLookup {
    fn first_match(&self, kind: RecipeKind, input: &CraftingView<'_>)
        -> Option<&dyn CompressingRecipe>;
}

/// The matching recipe for `input`, shapeless before shaped.
pub fn find_compressing_recipe<'r>(
    lookup: &'r dyn RecipeLookup,
    input: &CraftingView<'_>,
) -> Option<&'r dyn CompressingRecipe> {
    lookup
        .first_match(RecipeKind::ShapelessCompressing, input)
        .or_else(|| lookup.first_match(RecipeKind::ShapedCompressing, input))
}

pub fn has_compressing_recipe(lookup: &dyn RecipeLookup, input: &CraftingView<'_>) -> bool {
    find_compressing_recipe(lookup, input).is_some()
}

/// Craft `input` through whichever recipe matches, shapeless first.
///
/// # Panics
///
/// If no recipe matches. Callers must confirm a match with
/// [`has_compressing_recipe`] before asking for the result.
pub fn resolve_compressing_result(
    lookup: &dyn RecipeLookup,
    input: &CraftingView<'_>,
) -> ItemStack {
    match find_compressing_recipe(lookup, input) {
        Some(recipe) => recipe.craft(input),
        None => panic!(
            "neither a shapeless nor a shaped compressing recipe matched when the result was \
             requested; has_compressing_recipe must be checked first"
        ),
    }
}

// -----------------------------------------------------------------------
// Registry
// -----------------------------------------------------------------------

/// Registry of compressing recipes, matched in registration order.
#[derive(Debug, Default)]
pub struct RecipeManager {
    shapeless: Vec<ShapelessCompressingRecipe>,
    shaped: Vec<ShapedCompressingRecipe>,
}

impl RecipeLookup for RecipeManager {
    fn first_match(
        &self,
        kind: RecipeKind,
        input: &CraftingView<'_>,
    ) -> Option<&dyn CompressingRecipe> {
        match kind {
            RecipeKind::ShapelessCompressing => self
                .shapeless
                .iter()
                .find(|r| r.matches(input))
                .map(|r| r as &dyn CompressingRecipe),
            RecipeKind::ShapedCompressing => self
                .shaped
                .iter()
                .find(|r| r.matches(input))
                .map(|r| r as &dyn CompressingRecipe),
        }
    }
}

impl RecipeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the mod's built-in compressing recipes.
    pub fn with_defaults() -> Self {
        let mut manager = Self::new();

        macro_rules! shapeless {
            ($name:expr, [$($input:expr),+], $out:expr, $count:expr) => {
                manager.push_shapeless(ShapelessCompressingRecipe {
                    id: format!("galacticraft-rewoven:{}", $name),
                    network_id: 0,
                    ingredients: vec![$(Ingredient::of($input)),+],
                    result: ItemStack::new($out, $count),
                });
            };
        }

        shapeless!(
            "compressed_iron",
            ["minecraft:iron_ingot", "minecraft:iron_ingot"],
            "galacticraft-rewoven:compressed_iron",
            1
        );
        shapeless!(
            "compressed_copper",
            ["galacticraft-rewoven:copper_ingot", "galacticraft-rewoven:copper_ingot"],
            "galacticraft-rewoven:compressed_copper",
            1
        );
        shapeless!(
            "compressed_tin",
            ["galacticraft-rewoven:tin_ingot", "galacticraft-rewoven:tin_ingot"],
            "galacticraft-rewoven:compressed_tin",
            1
        );
        shapeless!(
            "compressed_aluminum",
            ["galacticraft-rewoven:aluminum_ingot", "galacticraft-rewoven:aluminum_ingot"],
            "galacticraft-rewoven:compressed_aluminum",
            1
        );
        shapeless!(
            "compressed_steel",
            ["galacticraft-rewoven:compressed_iron", "minecraft:coal", "minecraft:coal"],
            "galacticraft-rewoven:compressed_steel",
            1
        );

        manager.push_shaped(ShapedCompressingRecipe {
            id: "galacticraft-rewoven:compressed_bronze".to_string(),
            network_id: 0,
            width: 1,
            height: 2,
            pattern: vec![
                Ingredient::of("galacticraft-rewoven:compressed_copper"),
                Ingredient::of("galacticraft-rewoven:compressed_tin"),
            ],
            result: ItemStack::new("galacticraft-rewoven:compressed_bronze", 1),
        });
        manager.push_shaped(ShapedCompressingRecipe {
            id: "galacticraft-rewoven:heavy_plating".to_string(),
            network_id: 0,
            width: 3,
            height: 1,
            pattern: vec![
                Ingredient::of("galacticraft-rewoven:compressed_bronze"),
                Ingredient::of("galacticraft-rewoven:compressed_steel"),
                Ingredient::of("galacticraft-rewoven:compressed_aluminum"),
            ],
            result: ItemStack::new("galacticraft-rewoven:heavy_plating", 2),
        });

        manager
    }

    pub fn shapeless_recipes(&self) -> &[ShapelessCompressingRecipe] {
        &self.shapeless
    }

    pub fn shaped_recipes(&self) -> &[ShapedCompressingRecipe] {
        &self.shaped
    }

    pub fn len(&self) -> usize {
        self.shapeless.len() + self.shaped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapeless.is_empty() && self.shaped.is_empty()
    }

    fn next_network_id(&self) -> u32 {
        let max_shapeless = self.shapeless.iter().map(|r| r.network_id).max().unwrap_or(0);
        let max_shaped = self.shaped.iter().map(|r| r.network_id).max().unwrap_or(0);
        max_shapeless.max(max_shaped) + 1
    }

    /// Register a shapeless recipe. Returns the assigned network_id.
    pub fn register_shapeless(
        &mut self,
        recipe: ShapelessCompressingRecipe,
    ) -> Result<u32, MachineError> {
        if recipe.ingredients.is_empty() || recipe.ingredients.len() > CraftingView::SIZE {
            return Err(invalid(&recipe.id, "shapeless recipes need 1 to 9 ingredients"));
        }
        check_result(&recipe.id, &recipe.result)?;
        Ok(self.push_shapeless(recipe))
    }

    /// Register a shaped recipe. Returns the assigned network_id.
    pub fn register_shaped(
        &mut self,
        recipe: ShapedCompressingRecipe,
    ) -> Result<u32, MachineError> {
        recipe
            .check_shape()
            .map_err(|reason| invalid(&recipe.id, reason))?;
        check_result(&recipe.id, &recipe.result)?;
        Ok(self.push_shaped(recipe))
    }

    fn push_shapeless(&mut self, mut recipe: ShapelessCompressingRecipe) -> u32 {
        let id = self.next_network_id();
        recipe.network_id = id;
        debug!(recipe = %recipe.id, network_id = id, "registered shapeless compressing recipe");
        self.shapeless.push(recipe);
        id
    }

    fn push_shaped(&mut self, mut recipe: ShapedCompressingRecipe) -> u32 {
        let id = self.next_network_id();
        recipe.network_id = id;
        debug!(recipe = %recipe.id, network_id = id, "registered shaped compressing recipe");
        self.shaped.push(recipe);
        id
    }

    /// Parse one recipe data file and register it under `id`.
    pub fn load_json(&mut self, id: &str, json: &str) -> Result<u32, MachineError> {
        let raw: RawRecipe = serde_json::from_str(json)?;
        let result = raw.result.into_stack();
        match raw.kind.as_str() {
            SHAPELESS_COMPRESSING => {
                let ingredients = raw
                    .ingredients
                    .into_iter()
                    .map(RawIngredient::into_ingredient)
                    .collect();
                self.register_shapeless(ShapelessCompressingRecipe {
                    id: id.to_string(),
                    network_id: 0,
                    ingredients,
                    result,
                })
            }
            SHAPED_COMPRESSING => {
                let (width, height, pattern) = parse_pattern(id, &raw.pattern, raw.key)?;
                self.register_shaped(ShapedCompressingRecipe {
                    id: id.to_string(),
                    network_id: 0,
                    width,
                    height,
                    pattern,
                    result,
                })
            }
            other => Err(MachineError::UnknownRecipeType(other.to_string())),
        }
    }

    /// Load every `*.json` file in `dir`; the recipe id is
    /// `<namespace>:<file stem>`. Returns the number of recipes loaded.
    pub fn load_dir(&mut self, namespace: &str, dir: &Path) -> Result<usize, MachineError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let id = format!("{namespace}:{stem}");
            let json = fs::read_to_string(&path)?;
            match self.load_json(&id, &json) {
                Ok(_) => loaded += 1,
                // Other recipe types share the data directory.
                Err(MachineError::UnknownRecipeType(kind)) => {
                    warn!(recipe = %id, %kind, "skipping non-compressing recipe");
                }
                Err(e) => return Err(e),
            }
        }
        info!(count = loaded, dir = %dir.display(), "loaded compressing recipes");
        Ok(loaded)
    }
}

/// Results must be a real stack no larger than the item's stack limit.
fn check_result(id: &str, result: &ItemStack) -> Result<(), MachineError> {
    if result.is_empty() {
        return Err(invalid(id, "result must be a non-empty stack"));
    }
    if result.count > result.max_count {
        return Err(invalid(
            id,
            format!(
                "result count {} exceeds stack limit {}",
                result.count, result.max_count
            ),
        ));
    }
    Ok(())
}

fn invalid(id: &str, reason: impl Into<String>) -> MachineError {
    MachineError::InvalidRecipe {
        id: id.to_string(),
        reason: reason.into(),
    }
}

fn parse_pattern(
    id: &str,
    rows: &[String],
    key: BTreeMap<String, RawIngredient>,
) -> Result<(usize, usize, Vec<Ingredient>), MachineError> {
    let height = rows.len();
    if height == 0 || height > CraftingView::HEIGHT {
        return Err(invalid(id, "pattern must have 1 to 3 rows"));
    }
    let width = rows[0].chars().count();
    if width == 0 || width > CraftingView::WIDTH {
        return Err(invalid(id, "pattern rows must be 1 to 3 wide"));
    }

    let mut symbols: BTreeMap<char, Ingredient> = BTreeMap::new();
    for (symbol, ingredient) in key {
        let mut chars = symbol.chars();
        match (chars.next(), chars.next()) {
            (Some(' '), None) => return Err(invalid(id, "' ' is reserved for empty cells")),
            (Some(c), None) => {
                symbols.insert(c, ingredient.into_ingredient());
            }
            _ => return Err(invalid(id, format!("key {symbol:?} is not a single character"))),
        }
    }

    let mut pattern = Vec::with_capacity(width * height);
    for row in rows {
        if row.chars().count() != width {
            return Err(invalid(id, "pattern rows differ in width"));
        }
        for c in row.chars() {
            if c == ' ' {
                pattern.push(Ingredient::EMPTY);
                continue;
            }
            let ingredient = symbols
                .get(&c)
                .ok_or_else(|| invalid(id, format!("pattern symbol {c:?} missing from key")))?;
            pattern.push(ingredient.clone());
        }
    }
    Ok((width, height, pattern))
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    ingredients: Vec<RawIngredient>,
    #[serde(default)]
    pattern: Vec<String>,
    #[serde(default)]
    key: BTreeMap<String, RawIngredient>,
    result: RawResult,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    item: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIngredient {
    One(RawItem),
    AnyOf(Vec<RawItem>),
}

impl RawIngredient {
    fn into_ingredient(self) -> Ingredient {
        match self {
            RawIngredient::One(i) => Ingredient::of(i.item),
            RawIngredient::AnyOf(items) => Ingredient::any_of(items.into_iter().map(|i| i.item)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawResult {
    item: String,
    #[serde(default = "default_result_count")]
    count: u16,
}

fn default_result_count() -> u16 {
    1
}

impl RawResult {
    fn into_stack(self) -> ItemStack {
        ItemStack::new(self.item, self.count)
    }
}
