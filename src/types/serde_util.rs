//! Serde helpers.

use serde::{Deserialize, Deserializer};

/// Deserialize into `Option<Option<T>>`, distinguishing an absent field
/// (outer `None`, leave unchanged) from an explicit `null` (inner `None`,
/// clear the column). Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "double_option")]
        email: Option<Option<String>>,
    }

    #[test]
    fn absent_field_is_outer_none() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(p.email, None);
    }

    #[test]
    fn null_field_clears() {
        let p: Payload = serde_json::from_str(r#"{"email": null}"#).unwrap();
        assert_eq!(p.email, Some(None));
    }

    #[test]
    fn value_field_sets() {
        let p: Payload = serde_json::from_str(r#"{"email": "a@b.c"}"#).unwrap();
        assert_eq!(p.email, Some(Some("a@b.c".to_string())));
    }
}
