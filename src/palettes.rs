//! Palette registry for loading and accessing color palettes
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! access by name.
//!
//! Palette types:
//! - `sequential`: Gradient from low to high values
//! - `diverging`: Gradient with a neutral midpoint (the middle color maps to zero)

use log::{debug, error, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../palettes.json");

/// Default diverging palette name
pub const DEFAULT_DIVERGING_PALETTE: &str = "Seismic";

/// Default sequential palette name
pub const DEFAULT_SEQUENTIAL_PALETTE: &str = "Viridis";

/// Fallback for unparsable colors
const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];

static PALETTE_REGISTRY: OnceLock<PaletteRegistry> = OnceLock::new();

/// Global palette registry, initialized lazily on first access
pub fn palette_registry() -> &'static PaletteRegistry {
    PALETTE_REGISTRY.get_or_init(|| {
        PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
            error!("Failed to load palettes.json: {}", e);
            PaletteRegistry::default()
        })
    })
}

/// Palette type as defined in palettes.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    Sequential,
    Diverging,
}

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub palette_type: PaletteType,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by index (wraps around)
    pub fn get_color(&self, index: usize) -> [u8; 3] {
        if self.colors.is_empty() {
            return FALLBACK_GRAY;
        }
        let idx = index % self.colors.len();
        parse_hex_color(&self.colors[idx]).unwrap_or(FALLBACK_GRAY)
    }

    /// Get all colors as RGB arrays
    pub fn get_colors_rgb(&self) -> Vec<[u8; 3]> {
        self.colors
            .iter()
            .filter_map(|hex| parse_hex_color(hex))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// All palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
    sequential_names: Vec<String>,
    diverging_names: Vec<String>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();

        for def in definitions {
            let name = def.name.clone();
            match def.palette_type {
                PaletteType::Sequential => registry.sequential_names.push(name.clone()),
                PaletteType::Diverging => registry.diverging_names.push(name.clone()),
            }
            registry.palettes.insert(name.to_lowercase(), def);
        }

        debug!(
            "PaletteRegistry: loaded {} palettes ({} sequential, {} diverging)",
            registry.palettes.len(),
            registry.sequential_names.len(),
            registry.diverging_names.len()
        );

        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    pub fn default_sequential(&self) -> Option<&PaletteDefinition> {
        self.get(DEFAULT_SEQUENTIAL_PALETTE)
    }

    pub fn default_diverging(&self) -> Option<&PaletteDefinition> {
        self.get(DEFAULT_DIVERGING_PALETTE)
    }

    /// Resolve a palette of the requested type
    ///
    /// Uses the named palette when it exists and has the right type, otherwise
    /// falls back to the default palette for that type.
    pub fn resolve(&self, name: Option<&str>, palette_type: PaletteType) -> Option<&PaletteDefinition> {
        if let Some(name) = name {
            match self.get(name) {
                Some(def) if def.palette_type == palette_type => return Some(def),
                Some(def) => warn!(
                    "Palette '{}' is {:?}, expected {:?}; using default",
                    def.name, def.palette_type, palette_type
                ),
                None => warn!("Unknown palette '{}'; using default", name),
            }
        }

        match palette_type {
            PaletteType::Sequential => self.default_sequential(),
            PaletteType::Diverging => self.default_diverging(),
        }
    }

    pub fn sequential_palettes(&self) -> &[String] {
        &self.sequential_names
    }

    pub fn diverging_palettes(&self) -> &[String] {
        &self.diverging_names
    }
}

/// Parse a hex color string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - both without the leading `#`
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');

    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        warn!("Invalid hex color length '{}': {}", hex, hex.len());
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some([r, g, b])
}
