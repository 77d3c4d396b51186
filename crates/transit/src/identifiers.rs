//! Type-safe identifiers for GTFS entities.
//!
//! All identifiers use Arc<str> so the same id can be shared by the stop list,
//! every shape that visits the stop and the engine's visitation map.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.cmp(&other.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
                Ok(Self::new(s))
            }
        }
    };
}

impl_identifier!(StopIdentifier);
impl_identifier!(RouteIdentifier);
impl_identifier!(TripIdentifier);
impl_identifier!(ShapeIdentifier);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = StopIdentifier::new("stop_123");
        let id2 = StopIdentifier::new("stop_123");
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0)); // Clone shares Arc
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(StopIdentifier::new("test"), 42);

        assert_eq!(map.get(&StopIdentifier::new("test")), Some(&42));
    }

    #[test]
    fn test_identifier_ordering() {
        let mut ids = vec![
            RouteIdentifier::new("b"),
            RouteIdentifier::new("a"),
            RouteIdentifier::new("c"),
        ];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_identifier_display() {
        let id = RouteIdentifier::new("route_1");
        assert_eq!(format!("{}", id), "route_1");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_identifier_serializes_as_string() {
        let id = ShapeIdentifier::new("shape_9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"shape_9\"");

        let back: ShapeIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
