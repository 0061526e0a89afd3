// Layer preparation: the dictionary-building pass.
//
// Turns a stream of source features into the flat shape the wire format
// wants: per-layer key and value dictionaries, per-feature tag index
// pairs, and command-encoded geometry. Keys and values are interned
// first-seen-wins, so feature order alone fixes dictionary order and the
// same input always produces the same tile.
//
// No validation happens here: geometry is encoded as given, and the
// preparer does not check winding, extent bounds, or ring closure.

use std::borrow::Cow;
use std::collections::HashMap;

use log::trace;

use crate::mvt::geometry::{self, GeomType};
use crate::mvt::proto;
use crate::mvt::value::{self, TypedValue};

use super::source::{FeatureSource, SourceError};

/// Written when `LayerOptions::version` is absent.
pub const DEFAULT_VERSION: u32 = 1;
/// Written when `LayerOptions::extent` is absent.
pub const DEFAULT_EXTENT: u32 = 4096;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-layer header overrides.
///
/// `None` means "use the default", so an explicit `Some(0)` really writes
/// zero. Defaults are schema version 1 and the conventional 4096 extent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerOptions {
    pub version: Option<u32>,
    pub extent: Option<u32>,
}

// ---------------------------------------------------------------------------
// Prepared (wire-shaped) layer
// ---------------------------------------------------------------------------

/// A feature flattened to wire shape: dictionary tag pairs and command
/// words instead of maps and rings.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFeature {
    pub id: Option<u64>,
    pub geom_type: GeomType,
    pub tags: Vec<u32>,
    pub geometry: Vec<u32>,
}

/// A layer with its dictionaries built, ready to serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLayer {
    pub name: String,
    pub version: u32,
    pub extent: u32,
    pub keys: Vec<String>,
    pub values: Vec<TypedValue>,
    pub features: Vec<PreparedFeature>,
}

/// Flatten `source` into a [`PreparedLayer`] named `name`.
///
/// Keys are interned by their text, values by type-tagged text (see
/// [`value::wrap`]), both first-seen-wins in feature order. Feature ids
/// survive only when they are non-negative integral JSON numbers.
pub fn prepare_layer<S>(
    name: &str,
    source: &S,
    options: &LayerOptions,
) -> Result<PreparedLayer, SourceError>
where
    S: FeatureSource + ?Sized,
{
    let mut layer = PreparedLayer {
        name: name.to_owned(),
        version: options.version.unwrap_or(DEFAULT_VERSION),
        extent: options.extent.unwrap_or(DEFAULT_EXTENT),
        keys: Vec::new(),
        values: Vec::new(),
        features: Vec::with_capacity(source.len()),
    };

    let mut key_slots: HashMap<String, u32> = HashMap::new();
    let mut value_slots: HashMap<String, u32> = HashMap::new();

    for index in 0..source.len() {
        let feature = source.feature(index)?;

        let mut tags = Vec::with_capacity(2 * feature.properties.len());
        for (key, json) in feature.properties.iter() {
            let key_slot = match key_slots.get(key) {
                Some(&slot) => slot,
                None => {
                    let slot = layer.keys.len() as u32;
                    layer.keys.push(key.clone());
                    key_slots.insert(key.clone(), slot);
                    slot
                }
            };

            let (value, intern_key) = value::wrap(json);
            let value_slot = match value_slots.get(&intern_key) {
                Some(&slot) => slot,
                None => {
                    let slot = layer.values.len() as u32;
                    layer.values.push(value);
                    value_slots.insert(intern_key, slot);
                    slot
                }
            };

            tags.push(key_slot);
            tags.push(value_slot);
        }

        layer.features.push(PreparedFeature {
            id: feature.id.as_ref().and_then(value::integer_id),
            geom_type: feature.geom_type,
            tags,
            geometry: geometry::encode_rings(&feature.rings),
        });
    }

    trace!(
        "prepared layer '{}': {} features, {} keys, {} values",
        layer.name,
        layer.features.len(),
        layer.keys.len(),
        layer.values.len()
    );

    Ok(layer)
}

// ---------------------------------------------------------------------------
// Conversion to schema messages
// ---------------------------------------------------------------------------

impl<'a> From<&'a PreparedFeature> for proto::Feature<'a> {
    fn from(feature: &'a PreparedFeature) -> Self {
        Self {
            id: feature.id,
            tags: Cow::Borrowed(&feature.tags),
            geom_type: feature.geom_type,
            geometry: Cow::Borrowed(&feature.geometry),
        }
    }
}

impl<'a> From<&'a PreparedLayer> for proto::Layer<'a> {
    fn from(layer: &'a PreparedLayer) -> Self {
        Self {
            version: layer.version,
            name: Cow::Borrowed(layer.name.as_str()),
            features: layer.features.iter().map(proto::Feature::from).collect(),
            keys: layer
                .keys
                .iter()
                .map(|key| Cow::Borrowed(key.as_str()))
                .collect(),
            values: layer.values.iter().map(proto::Value::from).collect(),
            extent: layer.extent,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
