//! YAML input for spinestat configs.
//!
//! Enum values are written as single-key maps (`{ flag: name }`,
//! `{ not: { true_category: 0 } }`) rather than YAML tags, so the same
//! document shape also reads as JSON.

use serde::Deserialize;
use serde_yaml_ng::with::singleton_map_recursive;

use crate::Result;

/// Parse a YAML document, accepting single-key maps for enum variants at any depth.
pub fn from_yaml_str<'de, T: Deserialize<'de>>(text: &'de str) -> Result<T> {
    Ok(singleton_map_recursive::deserialize(serde_yaml_ng::Deserializer::from_str(text))?)
}

/// [`from_yaml_str`] over raw bytes.
pub fn from_yaml_slice<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    Ok(singleton_map_recursive::deserialize(serde_yaml_ng::Deserializer::from_slice(bytes))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Shape {
        Empty,
        Named(String),
        Nested(Box<Shape>),
    }

    #[test]
    fn test_single_key_maps_at_any_depth() {
        let m: BTreeMap<String, Vec<Shape>> =
            from_yaml_str("a: [ empty, { named: x }, { nested: { named: y } } ]").unwrap();
        assert_eq!(
            m["a"],
            vec![
                Shape::Empty,
                Shape::Named("x".into()),
                Shape::Nested(Box::new(Shape::Named("y".into())))
            ]
        );
    }

    #[test]
    fn test_errors_map_to_yaml_variant() {
        let err = from_yaml_slice::<Shape>(b"{ unknown: 1 }").unwrap_err();
        assert!(matches!(err, crate::Error::Yaml(_)), "got {:?}", err);
    }
}
