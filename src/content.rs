//! # Content Lists
//!
//! Item and location names consumed by the bundle builder. Two layouts exist:
//!
//! - the nested layout, grouped as `items: {normal, trap, filler, prog}` and
//!   `locations: {chatroom, prog}`;
//! - the legacy flat layout with sibling arrays `items`, `progitems`,
//!   `trapitems`, `filleritems`, `locations` and `proglocations`.
//!
//! The layout is detected once, when a document enters the crate, by
//! [`ContentDocument::from_value`]. Normalization and validation both branch
//! on the resulting variant instead of probing the raw value again.
//!
//! ```rust
//! use chatipelago_admin::content::ManualEntry;
//! use chatipelago_admin::validation::{validate_content, FlatCounts};
//!
//! let entry = ManualEntry {
//!     items: "Sword\nShield\n".to_string(),
//!     ..ManualEntry::default()
//! };
//! let doc = entry.normalize().expect("one box has content");
//! assert!(validate_content(&doc, &FlatCounts::current()).is_valid());
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::{json_type_name, LoadError};
use crate::validation::FlatCounts;

/// Uploaded content files larger than this are rejected before parsing.
pub const MAX_CONTENT_FILE_BYTES: u64 = 1024 * 1024;

pub const FLAT_ITEMS: &str = "items";
pub const FLAT_PROG_ITEMS: &str = "progitems";
pub const FLAT_TRAP_ITEMS: &str = "trapitems";
pub const FLAT_FILLER_ITEMS: &str = "filleritems";
pub const FLAT_LOCATIONS: &str = "locations";
pub const FLAT_PROG_LOCATIONS: &str = "proglocations";

pub const ITEM_GROUPS: [&str; 4] = ["normal", "trap", "filler", "prog"];
pub const LOCATION_GROUPS: [&str; 2] = ["chatroom", "prog"];

/// A content document as it arrived, tagged with its detected layout.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentDocument {
    /// Root mapping whose `items` is itself a mapping.
    Nested(Map<String, Value>),
    /// Root mapping whose `items` is a list, a scalar, or missing.
    Flat(Map<String, Value>),
    /// Anything that is not a mapping at all.
    Unrecognized(Value),
}

impl ContentDocument {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                if matches!(map.get(FLAT_ITEMS), Some(Value::Object(_))) {
                    ContentDocument::Nested(map)
                } else {
                    ContentDocument::Flat(map)
                }
            }
            other => ContentDocument::Unrecognized(other),
        }
    }

    /// Parse YAML (or JSON, which YAML accepts) into a tagged document.
    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        if text.trim().is_empty() {
            return Ok(ContentDocument::Unrecognized(Value::Null));
        }
        let value: Value = serde_yaml::from_str(text)?;
        Ok(Self::from_value(value))
    }

    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(value))
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, ContentDocument::Nested(_))
    }

    /// Map the flat layout onto the nested one.
    ///
    /// Nested and unrecognized documents come back untouched. Missing or null
    /// flat fields become empty lists; present values move across as they are,
    /// so a malformed field is still visible to the validator afterwards.
    /// Keys outside the flat layout are carried over.
    pub fn normalize(self) -> Self {
        let mut map = match self {
            ContentDocument::Flat(map) => map,
            other => return other,
        };

        let mut take = |key: &str| match map.remove(key) {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(value) => value,
        };
        let items = json!({
            "normal": take(FLAT_ITEMS),
            "trap": take(FLAT_TRAP_ITEMS),
            "filler": take(FLAT_FILLER_ITEMS),
            "prog": take(FLAT_PROG_ITEMS),
        });
        let locations = json!({
            "chatroom": take(FLAT_LOCATIONS),
            "prog": take(FLAT_PROG_LOCATIONS),
        });

        debug!(
            "Normalized flat content layout ({} extra keys kept)",
            map.len()
        );
        map.insert(FLAT_ITEMS.to_string(), items);
        map.insert(FLAT_LOCATIONS.to_string(), locations);
        ContentDocument::Nested(map)
    }

    /// Advisory list sizes for display next to the expected counts.
    pub fn counts(&self) -> ContentCounts {
        fn len(value: Option<&Value>) -> usize {
            value.and_then(Value::as_array).map_or(0, Vec::len)
        }
        fn nested<'a>(map: &'a Map<String, Value>, key: &str, name: &str) -> Option<&'a Value> {
            map.get(key).and_then(|g| g.get(name))
        }

        match self {
            ContentDocument::Nested(map) => ContentCounts {
                generic: len(nested(map, FLAT_ITEMS, "normal")),
                progression: len(nested(map, FLAT_ITEMS, "prog")),
                trap: len(nested(map, FLAT_ITEMS, "trap")),
                filler: len(nested(map, FLAT_ITEMS, "filler")),
                locations: len(nested(map, FLAT_LOCATIONS, "chatroom")),
                priority_locations: len(nested(map, FLAT_LOCATIONS, "prog")),
            },
            ContentDocument::Flat(map) => ContentCounts {
                generic: len(map.get(FLAT_ITEMS)),
                progression: len(map.get(FLAT_PROG_ITEMS)),
                trap: len(map.get(FLAT_TRAP_ITEMS)),
                filler: len(map.get(FLAT_FILLER_ITEMS)),
                locations: len(map.get(FLAT_LOCATIONS)),
                priority_locations: len(map.get(FLAT_PROG_LOCATIONS)),
            },
            ContentDocument::Unrecognized(_) => ContentCounts::default(),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ContentDocument::Nested(map) | ContentDocument::Flat(map) => Value::Object(map),
            ContentDocument::Unrecognized(value) => value,
        }
    }
}

/// List sizes of a document. These never fail validation on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentCounts {
    pub generic: usize,
    pub progression: usize,
    pub trap: usize,
    pub filler: usize,
    pub locations: usize,
    pub priority_locations: usize,
}

impl ContentCounts {
    /// One `label: n / target` line per list.
    pub fn render(&self, targets: &FlatCounts) -> Vec<String> {
        let mut lines = vec![
            format!("Generic Items: {} / {}", self.generic, targets.items),
            format!("Progression Items: {} / {}", self.progression, targets.prog_items),
            format!("Trap Items: {} / {}", self.trap, targets.trap_items),
        ];
        if let Some(filler) = targets.filler_items {
            lines.push(format!("Filler Items: {} / {}", self.filler, filler));
        }
        lines.push(format!("Locations: {} / {}", self.locations, targets.locations));
        lines.push(format!(
            "Priority Locations: {} / {}",
            self.priority_locations, targets.prog_locations
        ));
        lines
    }
}

/// Split a free-text box into trimmed, non-empty lines.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// The five free-text boxes of the manual entry form, one name per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualEntry {
    pub items: String,
    pub prog_items: String,
    pub trap_items: String,
    pub locations: String,
    pub prog_locations: String,
}

impl ManualEntry {
    /// Build a nested document from the boxes.
    ///
    /// Returns `None` when every box is empty: no content is different from
    /// an empty but valid content list.
    pub fn normalize(&self) -> Option<ContentDocument> {
        let items = parse_lines(&self.items);
        let prog_items = parse_lines(&self.prog_items);
        let trap_items = parse_lines(&self.trap_items);
        let locations = parse_lines(&self.locations);
        let prog_locations = parse_lines(&self.prog_locations);

        if items.is_empty()
            && prog_items.is_empty()
            && trap_items.is_empty()
            && locations.is_empty()
            && prog_locations.is_empty()
        {
            return None;
        }

        let spec = ContentSpec {
            items: ItemLists {
                normal: items,
                trap: trap_items,
                filler: Vec::new(),
                prog: prog_items,
            },
            locations: LocationLists {
                chatroom: locations,
                prog: prog_locations,
            },
        };
        Some(spec.into_document())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemLists {
    pub normal: Vec<String>,
    pub trap: Vec<String>,
    pub filler: Vec<String>,
    pub prog: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationLists {
    pub chatroom: Vec<String>,
    pub prog: Vec<String>,
}

/// Canonical content list, ready to be sent to the bundle builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSpec {
    pub items: ItemLists,
    pub locations: LocationLists,
}

impl ContentSpec {
    /// Normalize a document and extract the typed lists.
    ///
    /// Entries are trimmed and blank ones dropped. Numbers and booleans are
    /// written out as text; any other entry type is rejected.
    pub fn from_document(doc: ContentDocument) -> Result<Self, LoadError> {
        let map = match doc.normalize() {
            ContentDocument::Nested(map) => map,
            _ => return Err(LoadError::NotAMapping),
        };

        let items = group(&map, FLAT_ITEMS)?;
        let locations = group(&map, FLAT_LOCATIONS)?;
        Ok(ContentSpec {
            items: ItemLists {
                normal: leaf(items, FLAT_ITEMS, "normal")?,
                trap: leaf(items, FLAT_ITEMS, "trap")?,
                filler: leaf(items, FLAT_ITEMS, "filler")?,
                prog: leaf(items, FLAT_ITEMS, "prog")?,
            },
            locations: LocationLists {
                chatroom: leaf(locations, FLAT_LOCATIONS, "chatroom")?,
                prog: leaf(locations, FLAT_LOCATIONS, "prog")?,
            },
        })
    }

    pub fn into_document(self) -> ContentDocument {
        let ContentSpec { items, locations } = self;
        ContentDocument::from_value(json!({
            "items": {
                "normal": items.normal,
                "trap": items.trap,
                "filler": items.filler,
                "prog": items.prog,
            },
            "locations": {
                "chatroom": locations.chatroom,
                "prog": locations.prog,
            },
        }))
    }

    /// YAML payload for the bundle builder, keys in canonical order.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn is_empty(&self) -> bool {
        self.items.normal.is_empty()
            && self.items.trap.is_empty()
            && self.items.filler.is_empty()
            && self.items.prog.is_empty()
            && self.locations.chatroom.is_empty()
            && self.locations.prog.is_empty()
    }
}

fn group<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Map<String, Value>>, LoadError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(group)) => Ok(Some(group)),
        Some(_) => Err(LoadError::InvalidGroup {
            path: key.to_string(),
            expected: "a mapping",
        }),
    }
}

fn leaf(
    group: Option<&Map<String, Value>>,
    group_name: &str,
    name: &str,
) -> Result<Vec<String>, LoadError> {
    let path = format!("{group_name}.{name}");
    let entries = match group.and_then(|g| g.get(name)) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(LoadError::InvalidGroup {
                path,
                expected: "an array",
            })
        }
    };

    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let text = match entry {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(LoadError::InvalidEntry {
                    path,
                    index: index + 1,
                    found: json_type_name(other),
                })
            }
        };
        if !text.is_empty() {
            out.push(text);
        }
    }
    Ok(out)
}

/// Read an uploaded content file.
///
/// Only `.yaml`/`.yml` files up to [`MAX_CONTENT_FILE_BYTES`] are accepted.
pub async fn load_content_file(path: impl AsRef<Path>) -> Result<ContentDocument, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if !matches!(extension.as_deref(), Some("yaml" | "yml")) {
        return Err(LoadError::UnsupportedExtension);
    }

    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| LoadError::io(path, e))?;
    if meta.len() > MAX_CONTENT_FILE_BYTES {
        return Err(LoadError::TooLarge { size: meta.len() });
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::io(path, e))?;
    debug!("Read content file {} ({} bytes)", path.display(), text.len());
    ContentDocument::from_yaml_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_layout_once() {
        let nested = ContentDocument::from_value(json!({"items": {"normal": []}}));
        assert!(nested.is_nested());

        let flat = ContentDocument::from_value(json!({"items": ["a"], "locations": ["b"]}));
        assert!(matches!(flat, ContentDocument::Flat(_)));

        let missing = ContentDocument::from_value(json!({"progitems": ["a"]}));
        assert!(matches!(missing, ContentDocument::Flat(_)));

        let scalar = ContentDocument::from_value(json!("hello"));
        assert!(matches!(scalar, ContentDocument::Unrecognized(_)));
    }

    #[test]
    fn flat_fields_map_onto_groups() {
        let doc = ContentDocument::from_value(json!({
            "items": ["a", "b"],
            "progitems": ["p"],
            "trapitems": ["t"],
            "filleritems": ["f"],
            "locations": ["l"],
            "proglocations": ["pl"],
        }))
        .normalize();

        let ContentDocument::Nested(map) = doc else {
            panic!("expected nested layout");
        };
        assert_eq!(map["items"]["normal"], json!(["a", "b"]));
        assert_eq!(map["items"]["prog"], json!(["p"]));
        assert_eq!(map["items"]["trap"], json!(["t"]));
        assert_eq!(map["items"]["filler"], json!(["f"]));
        assert_eq!(map["locations"]["chatroom"], json!(["l"]));
        assert_eq!(map["locations"]["prog"], json!(["pl"]));
    }

    #[test]
    fn null_flat_fields_become_empty() {
        let doc = ContentDocument::from_value(json!({"items": null, "locations": ["x"]})).normalize();
        let ContentDocument::Nested(map) = doc else {
            panic!("expected nested layout");
        };
        assert_eq!(map["items"]["normal"], json!([]));
        assert_eq!(map["locations"]["chatroom"], json!(["x"]));
    }

    #[test]
    fn malformed_flat_field_survives_normalization() {
        let doc = ContentDocument::from_value(json!({"items": "not a list"})).normalize();
        let ContentDocument::Nested(map) = doc else {
            panic!("expected nested layout");
        };
        assert_eq!(map["items"]["normal"], json!("not a list"));
    }

    #[test]
    fn parse_lines_trims_and_skips_blanks() {
        assert_eq!(parse_lines("  a \r\n\r\n b\n   \nc"), vec!["a", "b", "c"]);
        assert!(parse_lines("\n \r\n").is_empty());
    }

    #[test]
    fn typed_spec_trims_and_stringifies() {
        let doc = ContentDocument::from_value(json!({
            "items": {"normal": [" Sword ", "", 7, true], "prog": ["Key"]},
            "locations": {"chatroom": ["Lobby"]},
        }));
        let spec = ContentSpec::from_document(doc).unwrap();
        assert_eq!(spec.items.normal, vec!["Sword", "7", "true"]);
        assert_eq!(spec.items.prog, vec!["Key"]);
        assert!(spec.items.trap.is_empty());
        assert_eq!(spec.locations.chatroom, vec!["Lobby"]);
    }

    #[test]
    fn typed_spec_rejects_nested_entries() {
        let doc = ContentDocument::from_value(json!({
            "items": {"normal": ["ok", {"name": "bad"}]},
            "locations": {},
        }));
        let err = ContentSpec::from_document(doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "items.normal entry 2 must be a string (found mapping)"
        );
    }

    #[test]
    fn typed_spec_converts_back_to_a_nested_document() {
        let spec = ContentSpec {
            items: ItemLists {
                normal: vec!["Sword".into()],
                filler: vec!["Pebble".into()],
                ..ItemLists::default()
            },
            locations: LocationLists {
                chatroom: vec!["Lobby".into()],
                prog: vec!["Vault".into()],
            },
        };
        let doc = spec.clone().into_document();
        assert!(doc.is_nested());
        assert_eq!(ContentSpec::from_document(doc).unwrap(), spec);
    }

    #[test]
    fn yaml_keeps_canonical_key_order() {
        let spec = ContentSpec {
            items: ItemLists {
                normal: vec!["Sword".into()],
                ..ItemLists::default()
            },
            locations: LocationLists::default(),
        };
        let yaml = spec.to_yaml().unwrap();
        let order: Vec<usize> = ["items:", "normal:", "trap:", "filler:", "prog:", "locations:", "chatroom:"]
            .iter()
            .map(|key| yaml.find(key).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "unexpected order in:\n{yaml}");
    }

    #[test]
    fn empty_yaml_is_unrecognized() {
        let doc = ContentDocument::from_yaml_str("  \n").unwrap();
        assert_eq!(doc, ContentDocument::Unrecognized(Value::Null));
    }
}
