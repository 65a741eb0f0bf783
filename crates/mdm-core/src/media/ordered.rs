//! Serde helpers for a JSON object kept as an ordered list of `(name, Format)`.

use serde::de::{MapAccess, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

use super::Format;

pub(super) fn serialize<S>(formats: &[(String, Format)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(formats.iter().map(|(k, v)| (k, v)))
}

pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, Format)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, Format)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a map of format name to format")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out: Vec<(String, Format)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, format)) = map.next_entry::<String, Format>()? {
                // Later duplicates replace earlier ones, keeping the first position.
                match out.iter_mut().find(|(n, _)| *n == name) {
                    Some(slot) => slot.1 = format,
                    None => out.push((name, format)),
                }
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(OrderedVisitor)
}
