//! Product catalog normalization.
//!
//! Catalog files come from several exporters and disagree on key spelling
//! and shape. Everything is funnelled into [`CatalogEntry`] here, once, and
//! the resulting [`CatalogIndex`] is read-only afterwards.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};

use crate::color::{hex_to_lab, Lab};

/// A catalog field that can be spelled several ways in source records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Sku,
    Name,
    Url,
    Lab,
    Hex,
    Category,
}

/// Accepted keys per field, highest priority first.
static FIELD_KEYS: [(Field, &[&str]); 6] = [
    (Field::Sku, &["sku", "SKU", "id", "ID"]),
    (Field::Name, &["name", "title", "product_name", "ProductName"]),
    (Field::Url, &["url", "link", "product_url", "ProductURL"]),
    (Field::Lab, &["lab", "Lab", "LAB"]),
    (Field::Hex, &["hex", "Hex", "color_hex", "ColorHex"]),
    (Field::Category, &["type", "product_type", "category"]),
];

const LAB_L_KEYS: &[&str] = &["L", "l"];
const LAB_A_KEYS: &[&str] = &["a", "A"];
const LAB_B_KEYS: &[&str] = &["b", "B"];

impl Field {
    pub fn keys(self) -> &'static [&'static str] {
        FIELD_KEYS
            .iter()
            .find(|(field, _)| *field == self)
            .map_or(&[][..], |&(_, keys)| keys)
    }
}

/// Whether a JSON value counts as "set": not null, false, zero or "".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First present value among `keys`, in order.
pub(crate) fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_present(value))
}

/// A loosely-typed source record. Non-object records behave as empty ones.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> RawRecord<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            fields: value.as_object(),
        }
    }

    /// The value of the highest-priority spelling of `field` that is present.
    pub fn get(&self, field: Field) -> Option<&'a Value> {
        first_present(self.fields?, field.keys())
    }

    /// Textual value of `field`. Numbers are rendered in decimal; any other
    /// kind of value counts as absent.
    pub fn text(&self, field: Field) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Supplied Lab, either `[L, a, b]` or `{"L": .., "a": .., "b": ..}`.
    ///
    /// Only the winning `lab` spelling is looked at; if it is malformed the
    /// record has no Lab even when another spelling would have been valid.
    pub fn lab(&self) -> Option<Lab> {
        lab_from_value(self.get(Field::Lab)?)
    }

    pub fn hex(&self) -> Option<String> {
        match self.get(Field::Hex)? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

fn lab_from_value(value: &Value) -> Option<Lab> {
    let (l, a, b) = match value {
        Value::Array(items) => match items.as_slice() {
            [l, a, b] => (l.as_f64()?, a.as_f64()?, b.as_f64()?),
            _ => return None,
        },
        Value::Object(map) => (
            lab_component(map, LAB_L_KEYS)?,
            lab_component(map, LAB_A_KEYS)?,
            lab_component(map, LAB_B_KEYS)?,
        ),
        _ => return None,
    };
    Some(Lab::new(l, a, b))
}

/// First non-null spelling of a component, which must then be a number.
fn lab_component(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())?
        .as_f64()
}

/// One sellable product with whatever color information its record carried.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub sku: String,
    pub name: String,
    pub url: String,
    pub category: String,
    pub lab: Option<Lab>,
    pub hex: Option<String>,
    derived: OnceCell<Option<Lab>>,
}

impl CatalogEntry {
    /// An entry with no color yet; name defaults to the sku.
    pub fn new(sku: impl Into<String>) -> Self {
        let sku = sku.into();
        Self {
            name: sku.clone(),
            sku,
            url: String::new(),
            category: String::new(),
            lab: None,
            hex: None,
            derived: OnceCell::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_lab(mut self, lab: Lab) -> Self {
        self.lab = Some(lab);
        self
    }

    pub fn with_hex(mut self, hex: impl Into<String>) -> Self {
        self.hex = Some(hex.into());
        self.derived = OnceCell::new();
        self
    }

    /// Build an entry from the record at `index` in the source sequence.
    pub fn from_record(record: RawRecord<'_>, index: usize) -> Self {
        let sku = record
            .text(Field::Sku)
            .unwrap_or_else(|| format!("item_{index}"));
        let name = record.text(Field::Name).unwrap_or_else(|| sku.clone());
        Self {
            sku,
            name,
            url: record.text(Field::Url).unwrap_or_default(),
            category: record.text(Field::Category).unwrap_or_default(),
            lab: record.lab(),
            hex: record.hex(),
            derived: OnceCell::new(),
        }
    }

    /// The color to rank with: the supplied Lab, else the hex fallback
    /// converted on first use and cached.
    pub fn color(&self) -> Option<Lab> {
        self.lab.or_else(|| {
            *self
                .derived
                .get_or_init(|| self.hex.as_deref().and_then(hex_to_lab))
        })
    }

    /// True when the record carried neither a Lab nor a hex string. Entries
    /// with an unparseable hex are only discovered at ranking time.
    pub fn lacks_color(&self) -> bool {
        self.lab.is_none() && self.hex.is_none()
    }
}

/// The normalized catalog, in source order.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
}

impl CatalogIndex {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Normalize a raw catalog: a bare array, or an object holding the array
    /// under `products` or `items`. Any other shape yields an empty index.
    pub fn normalize(raw: &Value) -> Self {
        let records = source_records(raw).unwrap_or_else(|| {
            warn!("catalog root is not an array or a products/items object, ignoring it");
            &[][..]
        });

        let entries: Vec<CatalogEntry> = records
            .iter()
            .enumerate()
            .map(|(index, value)| CatalogEntry::from_record(RawRecord::new(value), index))
            .collect();

        let colorless = entries.iter().filter(|e| e.lacks_color()).count();
        for entry in entries.iter().filter(|e| e.lacks_color()) {
            debug!("catalog entry {} has no lab or hex, it will never match", entry.sku);
        }
        info!(
            "catalog normalized: {} entries, {} without color",
            entries.len(),
            colorless
        );

        Self { entries }
    }

    /// Parse and normalize catalog JSON. Invalid JSON yields an empty index.
    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(raw) => Self::normalize(&raw),
            Err(err) => {
                warn!("catalog is not valid JSON ({err}), using an empty catalog");
                Self::default()
            }
        }
    }

    /// Read and normalize a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        let raw: Value = serde_json::from_str(&text)
            .with_context(|| format!("catalog is not valid JSON: {}", path.display()))?;
        Ok(Self::normalize(&raw))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose category equals `category`, ignoring ASCII case.
    pub fn in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.category.eq_ignore_ascii_case(category))
    }
}

impl<'a> IntoIterator for &'a CatalogIndex {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn source_records(raw: &Value) -> Option<&[Value]> {
    match raw {
        Value::Array(items) => Some(items),
        Value::Object(map) => ["products", "items"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice),
        _ => None,
    }
}
