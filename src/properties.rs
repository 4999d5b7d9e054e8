//! Plot property definitions with defaults from corrplot.json
//!
//! corrplot.json is embedded at compile time and declares every recognized
//! property with its kind, default value and (for enumerations) valid values.
//! Defaults live in ONE place; the reader below never hardcodes fallbacks.

use log::{error, warn};
use std::collections::HashMap;
use std::sync::OnceLock;

/// corrplot.json embedded at compile time
const PROPERTIES_JSON: &str = include_str!("../corrplot.json");

/// Property definition from corrplot.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    pub description: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Enumerated,
    Double,
    Integer,
    Boolean,
}

impl PropertyKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "StringProperty" => Some(Self::String),
            "EnumeratedProperty" => Some(Self::Enumerated),
            "DoubleProperty" => Some(Self::Double),
            "IntegerProperty" => Some(Self::Integer),
            "BooleanProperty" => Some(Self::Boolean),
            _ => None,
        }
    }
}

/// Registry of all plot properties with their defaults
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a property document (same layout as corrplot.json)
    pub fn from_json(json: &str) -> Result<Self, String> {
        let json: serde_json::Value =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {}", e))?;

        let properties_array = json["properties"]
            .as_array()
            .ok_or("missing 'properties' array")?;

        let mut properties = HashMap::new();

        for prop in properties_array {
            let name = prop["name"]
                .as_str()
                .ok_or("property missing 'name'")?
                .to_string();

            let kind_str = prop["kind"]
                .as_str()
                .ok_or_else(|| format!("property '{}' missing 'kind'", name))?;
            let kind = PropertyKind::parse(kind_str)
                .ok_or_else(|| format!("unknown property kind: {}", kind_str))?;

            let default_value = prop["defaultValue"].as_str().unwrap_or("").to_string();
            let description = prop["description"].as_str().unwrap_or("").to_string();

            let valid_values = if kind == PropertyKind::Enumerated {
                prop["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
            } else {
                None
            };

            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    default_value,
                    description,
                    valid_values,
                },
            );
        }

        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All property names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.properties.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(PROPERTIES_JSON).unwrap_or_else(|e| {
            error!("Failed to load corrplot.json: {}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed property reader
///
/// Returns user-set values when present and valid, otherwise the default from
/// corrplot.json. Invalid user values are logged and replaced by the default.
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    pub fn new(user_values: &HashMap<String, String>) -> Self {
        let registry = registry();
        let user_values = user_values
            .iter()
            .filter(|(_, v)| !v.is_empty()) // Empty = not set
            .filter(|(name, _)| {
                let known = registry.get_property(name).is_some();
                if !known {
                    warn!("Ignoring unknown property '{}'", name);
                }
                known
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self { user_values }
    }

    fn default_of(&self, name: &str) -> &'static str {
        registry().get_default(name).unwrap_or("")
    }

    /// Get string property (user value or default)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        self.default_of(name).to_string()
    }

    /// Get optional string property (None if empty)
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        let value = self.get_string(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Get enumerated property with validation
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = self.default_of(name);

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.clone();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value, name, valid_values, default
            );
        }

        default.to_string()
    }

    /// Get f64 property
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = self.default_of(name).parse::<f64>().unwrap_or(0.0);

        match self.user_values.get(name) {
            None => default,
            Some(value) => match value.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!(
                        "Invalid numeric value '{}' for property '{}'. Using default: {}",
                        value, name, default
                    );
                    default
                }
            },
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        let default = self.default_of(name).parse::<f64>().unwrap_or(0.0);

        if value >= min && value <= max {
            value
        } else {
            warn!(
                "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
                value, name, min, max, default
            );
            default
        }
    }

    /// Get i64 property
    pub fn get_i64(&self, name: &str) -> i64 {
        let default = self.default_of(name).parse::<i64>().unwrap_or(0);

        match self.user_values.get(name) {
            None => default,
            Some(value) => value.trim().parse::<i64>().unwrap_or_else(|_| {
                warn!(
                    "Invalid integer value '{}' for property '{}'. Using default: {}",
                    value, name, default
                );
                default
            }),
        }
    }

    /// Get i64 property with range validation
    pub fn get_i64_in_range(&self, name: &str, min: i64, max: i64) -> i64 {
        let value = self.get_i64(name);
        let default = self.default_of(name).parse::<i64>().unwrap_or(0);

        if (min..=max).contains(&value) {
            value
        } else {
            warn!(
                "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
                value, name, min, max, default
            );
            default
        }
    }

    /// Get boolean property ("true"/"false")
    pub fn get_bool(&self, name: &str) -> bool {
        let default = self.default_of(name).eq_ignore_ascii_case("true");

        match self.user_values.get(name).map(|v| v.to_lowercase()) {
            None => default,
            Some(v) if v == "true" => true,
            Some(v) if v == "false" => false,
            Some(other) => {
                warn!(
                    "Invalid boolean value '{}' for property '{}'. Using default: {}",
                    other, name, default
                );
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(pairs: &[(&str, &str)]) -> PropertyReader {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PropertyReader::new(&values)
    }

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("annotation.mode").is_some());
        assert!(reg.get_property("significance.threshold").is_some());
        assert!(reg.get_property("figure.width").is_some());
        assert_eq!(
            reg.get_property("annotate.diagonal").map(|p| p.kind),
            Some(PropertyKind::Boolean)
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("color.scale"), Some("diverging"));
        assert_eq!(reg.get_default("annotation.mode"), Some("marker"));
        assert_eq!(reg.get_default("significance.threshold"), Some("0.05"));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("annotation.mode", "text"));
        assert!(reg.is_valid_enum_value("annotation.mode", "MARKER"));
        assert!(!reg.is_valid_enum_value("annotation.mode", "invalid"));
    }

    #[test]
    fn test_reader_defaults() {
        let r = reader(&[]);
        assert_eq!(r.get_enum("annotation.mode"), "marker");
        assert_eq!(r.get_f64("significance.threshold"), 0.05);
        assert_eq!(r.get_i64("figure.width"), 800);
        assert!(r.get_bool("annotate.diagonal"));
        assert_eq!(r.get_optional_string("legend.title"), None);
    }

    #[test]
    fn test_reader_user_values() {
        let r = reader(&[
            ("annotation.mode", "text"),
            ("significance.threshold", "0.01"),
            ("figure.width", "1200"),
            ("annotate.diagonal", "False"),
            ("legend.title", "r"),
        ]);
        assert_eq!(r.get_enum("annotation.mode"), "text");
        assert_eq!(r.get_f64("significance.threshold"), 0.01);
        assert_eq!(r.get_i64("figure.width"), 1200);
        assert!(!r.get_bool("annotate.diagonal"));
        assert_eq!(r.get_optional_string("legend.title"), Some("r".to_string()));
    }

    #[test]
    fn test_reader_invalid_values_fall_back() {
        let r = reader(&[
            ("annotation.mode", "sparkles"),
            ("significance.threshold", "abc"),
            ("figure.width", "50"),
            ("annotate.diagonal", "maybe"),
            ("marker.scale.factor", "2.0"),
        ]);
        assert_eq!(r.get_enum("annotation.mode"), "marker");
        assert_eq!(r.get_f64("significance.threshold"), 0.05);
        assert_eq!(r.get_i64_in_range("figure.width", 100, 10_000), 800);
        assert!(r.get_bool("annotate.diagonal"));
        assert_eq!(r.get_f64_in_range("marker.scale.factor", 0.0, 1.0), 0.9);
    }

    #[test]
    fn test_reader_ignores_unknown_and_empty() {
        let r = reader(&[("no.such.property", "1"), ("legend.title", "")]);
        assert_eq!(r.get_string("no.such.property"), "");
        assert_eq!(r.get_optional_string("legend.title"), None);
    }

    #[test]
    fn test_from_json_rejects_unknown_kind() {
        let json = r#"{"properties": [{"name": "x", "kind": "ColorProperty"}]}"#;
        assert!(PropertyRegistry::from_json(json).is_err());
    }
}
