//! Built-in palette catalog cycled by the master node.

use synchro_wire::{GradientPalette, GradientStop, Palette16};

const RAINBOW: &[GradientStop] = &[
    GradientStop::new(0, 255, 0, 0),
    GradientStop::new(42, 255, 255, 0),
    GradientStop::new(85, 0, 255, 0),
    GradientStop::new(128, 0, 255, 255),
    GradientStop::new(170, 0, 0, 255),
    GradientStop::new(213, 255, 0, 255),
    GradientStop::new(255, 255, 0, 0),
];

const LAVA: &[GradientStop] = &[
    GradientStop::new(0, 0, 0, 0),
    GradientStop::new(64, 128, 0, 0),
    GradientStop::new(128, 255, 0, 0),
    GradientStop::new(192, 255, 128, 0),
    GradientStop::new(255, 255, 255, 255),
];

const OCEAN: &[GradientStop] = &[
    GradientStop::new(0, 0, 0, 64),
    GradientStop::new(96, 0, 0, 255),
    GradientStop::new(160, 0, 128, 255),
    GradientStop::new(224, 0, 255, 255),
    GradientStop::new(255, 255, 255, 255),
];

const FOREST: &[GradientStop] = &[
    GradientStop::new(0, 0, 64, 0),
    GradientStop::new(96, 34, 139, 34),
    GradientStop::new(160, 85, 107, 47),
    GradientStop::new(255, 144, 238, 144),
];

const PARTY: &[GradientStop] = &[
    GradientStop::new(0, 85, 0, 171),
    GradientStop::new(51, 255, 0, 128),
    GradientStop::new(102, 255, 0, 0),
    GradientStop::new(153, 255, 128, 0),
    GradientStop::new(204, 255, 255, 0),
    GradientStop::new(255, 85, 0, 171),
];

const HEAT: &[GradientStop] = &[
    GradientStop::new(0, 0, 0, 0),
    GradientStop::new(85, 255, 0, 0),
    GradientStop::new(170, 255, 255, 0),
    GradientStop::new(255, 255, 255, 255),
];

const BUILTIN: &[(&str, &[GradientStop])] = &[
    ("rainbow", RAINBOW),
    ("lava", LAVA),
    ("ocean", OCEAN),
    ("forest", FOREST),
    ("party", PARTY),
    ("heat", HEAT),
];

/// Named catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Display name
    pub name: &'static str,
    /// Gradient definition
    pub gradient: GradientPalette,
}

/// Ordered list of palettes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Catalog from explicit entries
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The built-in catalog
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .filter_map(|&(name, stops)| {
                GradientPalette::new(stops)
                    .ok()
                    .map(|gradient| CatalogEntry { name, gradient })
            })
            .collect();
        Self { entries }
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Name of the catalog entry that expands to `palette`, if any
    pub fn identify(&self, palette: &Palette16) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.gradient.to_palette16() == *palette)
            .map(|entry| entry.name)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
