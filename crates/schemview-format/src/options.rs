use serde::{Deserialize, Serialize};

pub const DEFAULT_SCHEMATIC_NAME: &str = "Unnamed";

/// How to pick between the two bit-packed layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPreference {
    /// Infer from the word-array length.
    #[default]
    Auto,
    Spanning,
    NonSpanning,
}

/// Knobs shared by both adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub bit_layout: LayoutPreference,
    /// Litematic region to decode. Defaults to the first region key in
    /// lexicographic order.
    pub region: Option<String>,
    /// Name used when the file carries none.
    pub default_name: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            bit_layout: LayoutPreference::Auto,
            region: None,
            default_name: DEFAULT_SCHEMATIC_NAME.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: DecodeOptions =
            serde_json::from_str(r#"{ "bit_layout": "non_spanning" }"#).unwrap();
        assert_eq!(options.bit_layout, LayoutPreference::NonSpanning);
        assert_eq!(options.region, None);
        assert_eq!(options.default_name, DEFAULT_SCHEMATIC_NAME);
    }

    #[test]
    fn test_empty_json_is_default() {
        let options: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, DecodeOptions::default());
    }
}
