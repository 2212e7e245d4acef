//! Block-state descriptors such as `minecraft:oak_stairs[facing=north]`.

use std::collections::BTreeMap;
use std::fmt;

const AIR_IDS: [&str; 3] = ["air", "cave_air", "void_air"];
const DEFAULT_NAMESPACE: &str = "minecraft";

/// The descriptor with any `[...]` property suffix removed.
pub fn base_id(descriptor: &str) -> &str {
    descriptor
        .split_once('[')
        .map_or(descriptor, |(base, _)| base)
}

/// True for the air variants, with or without the `minecraft:` namespace.
/// Case-insensitive, and properties are ignored.
pub fn is_air(descriptor: &str) -> bool {
    let base = base_id(descriptor);
    let path = match base.split_once(':') {
        Some((namespace, path)) if namespace.eq_ignore_ascii_case(DEFAULT_NAMESPACE) => path,
        Some(_) => return false,
        None => base,
    };
    AIR_IDS.iter().any(|air| path.eq_ignore_ascii_case(air))
}

/// A block identifier plus its properties. `Display` renders the canonical
/// descriptor: properties sorted by key, omitted entirely when empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BlockState {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    pub fn new(name: impl Into<String>) -> Self {
        BlockState {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Parses a descriptor. Malformed property pairs (no `=`) are dropped.
    pub fn parse(descriptor: &str) -> Self {
        let (name, props) = match descriptor.split_once('[') {
            Some((name, rest)) => (name, rest.strip_suffix(']').unwrap_or(rest)),
            None => (descriptor, ""),
        };
        let properties = props
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
            .collect();
        BlockState {
            name: name.trim().to_owned(),
            properties,
        }
    }

    pub fn is_air(&self) -> bool {
        is_air(&self.name)
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.properties.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("]")
    }
}
