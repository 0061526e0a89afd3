// In-memory tile model and the feature source abstraction.
//
// A layer is an ordered list of features; a feature is a geometry (rings
// of tile-local integer points) plus a JSON property map and an optional
// id. Layer preparation pulls features through the `FeatureSource` trait,
// so callers can feed the encoder from their own storage (or from a
// parsed tile) without first materializing a `TileLayer`.

use std::borrow::Cow;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::mvt::geometry::{GeomType, GeometryError, Ring};

/// Feature properties as parsed JSON: string keys, dynamically typed values.
pub type PropertyMap = serde_json::Map<String, JsonValue>;

// ---------------------------------------------------------------------------
// Source error
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("feature index {index} out of bounds for source of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A feature's tag list does not pair up (odd length).
    #[error("feature tag list has odd length {count}")]
    OddTagCount { count: usize },

    /// A tag referenced a key or value slot the layer does not have.
    #[error("tag index {index} out of bounds for {table} table of length {len}")]
    TagOutOfBounds {
        table: &'static str,
        index: u32,
        len: usize,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

// ---------------------------------------------------------------------------
// Feature source trait
// ---------------------------------------------------------------------------

/// One feature as seen by the layer preparer.
///
/// Borrows from the source where it can; sources that decode on the fly
/// (such as a parsed layer) hand over owned data instead.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFeature<'a> {
    pub geom_type: GeomType,
    pub rings: Cow<'a, [Ring]>,
    pub properties: Cow<'a, PropertyMap>,
    pub id: Option<JsonValue>,
}

/// Random-access supply of features for one layer.
pub trait FeatureSource {
    /// Number of features in the source.
    fn len(&self) -> usize;

    /// Fetch the feature at `index`.
    fn feature(&self, index: usize) -> Result<SourceFeature<'_>, SourceError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: FeatureSource + ?Sized> FeatureSource for &S {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn feature(&self, index: usize) -> Result<SourceFeature<'_>, SourceError> {
        (**self).feature(index)
    }
}

// ---------------------------------------------------------------------------
// In-memory model
// ---------------------------------------------------------------------------

/// A single feature: geometry rings, properties, optional id.
///
/// Geometry is always a list of rings, whatever the type: a point feature
/// keeps all its points in one ring, a line feature keeps one ring per
/// linestring, a polygon feature one ring per closed ring.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TileFeature {
    pub geom_type: GeomType,
    pub geometry: Vec<Ring>,
    pub properties: PropertyMap,
    pub id: Option<JsonValue>,
}

impl TileFeature {
    pub fn new(geom_type: GeomType, geometry: Vec<Ring>) -> Self {
        Self {
            geom_type,
            geometry,
            properties: PropertyMap::new(),
            id: None,
        }
    }

    /// Point or multipoint feature; every point lives in the single ring.
    pub fn points(points: Ring) -> Self {
        Self::new(GeomType::Point, vec![points])
    }

    /// Linestring feature, one ring per linestring.
    pub fn line_strings(lines: Vec<Ring>) -> Self {
        Self::new(GeomType::LineString, lines)
    }

    /// Polygon feature, one ring per polygon ring.
    pub fn polygons(rings: Vec<Ring>) -> Self {
        Self::new(GeomType::Polygon, rings)
    }

    pub fn with_id(mut self, id: impl Into<JsonValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.properties.insert(key.into(), value.into());
    }
}

impl<'a> From<&'a TileFeature> for SourceFeature<'a> {
    fn from(feature: &'a TileFeature) -> Self {
        Self {
            geom_type: feature.geom_type,
            rings: Cow::Borrowed(&feature.geometry),
            properties: Cow::Borrowed(&feature.properties),
            id: feature.id.clone(),
        }
    }
}

/// An ordered list of features destined for one layer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TileLayer {
    pub features: Vec<TileFeature>,
}

impl TileLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: TileFeature) {
        self.features.push(feature);
    }
}

impl FeatureSource for [TileFeature] {
    fn len(&self) -> usize {
        self.len()
    }

    fn feature(&self, index: usize) -> Result<SourceFeature<'_>, SourceError> {
        self.get(index)
            .map(SourceFeature::from)
            .ok_or(SourceError::IndexOutOfBounds {
                index,
                len: self.len(),
            })
    }
}

impl FeatureSource for TileLayer {
    fn len(&self) -> usize {
        self.features.len()
    }

    fn feature(&self, index: usize) -> Result<SourceFeature<'_>, SourceError> {
        self.features.as_slice().feature(index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
