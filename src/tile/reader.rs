// Parsed-tile views over encoded bytes.
//
// `ParsedTile` borrows the input buffer and keeps the decoded schema
// messages; layer views stay cheap (strings and packed arrays borrow the
// buffer) and geometry is only decoded when a feature is pulled through
// the `FeatureSource` trait. That trait impl is what lets a parsed layer
// feed straight back into layer preparation, so re-encoding a tile and
// encoding fresh features are the same code path.

use std::borrow::Cow;

use quick_protobuf::{BytesReader, MessageRead};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::mvt::geometry::decode_rings;
use crate::mvt::proto;

use super::source::{FeatureSource, PropertyMap, SourceError, SourceFeature};

// ---------------------------------------------------------------------------
// Read error
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed tile protobuf: {0}")]
    Proto(#[from] quick_protobuf::Error),
}

// ---------------------------------------------------------------------------
// Parsed tile
// ---------------------------------------------------------------------------

/// A decoded tile borrowing the byte buffer it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTile<'a> {
    message: proto::Tile<'a>,
}

impl<'a> ParsedTile<'a> {
    /// Parse a full tile message from raw (uncompressed) bytes.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, ReadError> {
        let mut reader = BytesReader::from_bytes(bytes);
        let message = proto::Tile::from_reader(&mut reader, bytes)?;
        Ok(Self { message })
    }

    /// Layer views in tile order.
    pub fn layers<'t>(&'t self) -> impl Iterator<Item = ParsedLayer<'t>> {
        self.message.layers.iter().map(|message| ParsedLayer { message })
    }

    /// Find a layer by name.
    pub fn layer<'t>(&'t self, name: &str) -> Option<ParsedLayer<'t>> {
        self.layers().find(|layer| layer.name() == name)
    }
}

// ---------------------------------------------------------------------------
// Parsed layer
// ---------------------------------------------------------------------------

/// One layer of a [`ParsedTile`].
#[derive(Debug, Clone, Copy)]
pub struct ParsedLayer<'t> {
    message: &'t proto::Layer<'t>,
}

impl<'t> ParsedLayer<'t> {
    pub fn name(&self) -> &'t str {
        &self.message.name
    }

    pub fn version(&self) -> u32 {
        self.message.version
    }

    pub fn extent(&self) -> u32 {
        self.message.extent
    }
}

impl FeatureSource for ParsedLayer<'_> {
    fn len(&self) -> usize {
        self.message.features.len()
    }

    /// Decode the feature at `index` back into model form.
    ///
    /// Geometry is decoded from command words, tags are resolved against
    /// the layer dictionaries, and wire values come back as JSON values
    /// (both integer families as numbers, empty values as null).
    fn feature(&self, index: usize) -> Result<SourceFeature<'_>, SourceError> {
        let feature =
            self.message
                .features
                .get(index)
                .ok_or(SourceError::IndexOutOfBounds {
                    index,
                    len: self.message.features.len(),
                })?;

        if feature.tags.len() % 2 != 0 {
            return Err(SourceError::OddTagCount {
                count: feature.tags.len(),
            });
        }

        let mut properties = PropertyMap::new();
        for pair in feature.tags.chunks(2) {
            let key = self.message.keys.get(pair[0] as usize).ok_or_else(|| {
                SourceError::TagOutOfBounds {
                    table: "key",
                    index: pair[0],
                    len: self.message.keys.len(),
                }
            })?;
            let value = self.message.values.get(pair[1] as usize).ok_or_else(|| {
                SourceError::TagOutOfBounds {
                    table: "value",
                    index: pair[1],
                    len: self.message.values.len(),
                }
            })?;
            properties.insert(key.clone().into_owned(), json_value(value));
        }

        Ok(SourceFeature {
            geom_type: feature.geom_type,
            rings: Cow::Owned(decode_rings(&feature.geometry)?),
            properties: Cow::Owned(properties),
            id: feature.id.map(JsonValue::from),
        })
    }
}

/// Wire value to JSON value. A value with no field set (legal protobuf,
/// never produced by this encoder) and a non-finite double both map to
/// null, since JSON numbers cannot carry them.
fn json_value(value: &proto::Value) -> JsonValue {
    if let Some(ref s) = value.string_value {
        JsonValue::String(s.clone().into_owned())
    } else if let Some(f) = value.float_value {
        finite_number(f64::from(f))
    } else if let Some(d) = value.double_value {
        finite_number(d)
    } else if let Some(i) = value.int_value {
        JsonValue::from(i)
    } else if let Some(u) = value.uint_value {
        JsonValue::from(u)
    } else if let Some(s) = value.sint_value {
        JsonValue::from(s)
    } else if let Some(b) = value.bool_value {
        JsonValue::Bool(b)
    } else {
        JsonValue::Null
    }
}

fn finite_number(f: f64) -> JsonValue {
    serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvt::geometry::{CMD_CLOSE_PATH, GeomType, GeometryError, command};
    use quick_protobuf::{MessageWrite, Writer};
    use serde_json::json;

    fn tile_bytes(tile: &proto::Tile) -> Vec<u8> {
        let mut out = Vec::with_capacity(tile.get_size());
        let mut writer = Writer::new(&mut out);
        tile.write_message(&mut writer).unwrap();
        out
    }

    fn one_layer_tile() -> proto::Tile<'static> {
        proto::Tile {
            layers: vec![proto::Layer {
                version: 2,
                name: Cow::Borrowed("poi"),
                features: vec![proto::Feature {
                    id: Some(42),
                    tags: Cow::Borrowed(&[0, 0, 1, 1][..]),
                    geom_type: GeomType::Point,
                    geometry: Cow::Borrowed(&[9, 50, 34][..]),
                }],
                keys: vec![Cow::Borrowed("name"), Cow::Borrowed("height")],
                values: vec![
                    proto::Value {
                        string_value: Some(Cow::Borrowed("summit")),
                        ..Default::default()
                    },
                    proto::Value {
                        double_value: Some(12.5),
                        ..Default::default()
                    },
                ],
                extent: 4096,
            }],
        }
    }

    #[test]
    fn parses_layer_headers_and_lookup() {
        let bytes = tile_bytes(&one_layer_tile());
        let tile = ParsedTile::from_bytes(&bytes).unwrap();

        assert_eq!(tile.layers().count(), 1);
        let layer = tile.layer("poi").unwrap();
        assert_eq!(layer.name(), "poi");
        assert_eq!(layer.version(), 2);
        assert_eq!(layer.extent(), 4096);
        assert!(tile.layer("missing").is_none());
    }

    #[test]
    fn feature_comes_back_in_model_form() {
        let bytes = tile_bytes(&one_layer_tile());
        let tile = ParsedTile::from_bytes(&bytes).unwrap();
        let layer = tile.layer("poi").unwrap();

        assert_eq!(layer.len(), 1);
        let feature = layer.feature(0).unwrap();
        assert_eq!(feature.geom_type, GeomType::Point);
        assert_eq!(feature.rings.as_ref(), [vec![(25, 17)]]);
        assert_eq!(feature.id, Some(json!(42)));
        assert_eq!(feature.properties.get("name"), Some(&json!("summit")));
        assert_eq!(feature.properties.get("height"), Some(&json!(12.5)));
    }

    #[test]
    fn every_wire_value_family_maps_to_json() {
        let values = [
            (
                proto::Value {
                    float_value: Some(1.5),
                    ..Default::default()
                },
                json!(1.5),
            ),
            (
                proto::Value {
                    int_value: Some(-3),
                    ..Default::default()
                },
                json!(-3),
            ),
            (
                proto::Value {
                    uint_value: Some(99),
                    ..Default::default()
                },
                json!(99),
            ),
            (
                proto::Value {
                    sint_value: Some(-17),
                    ..Default::default()
                },
                json!(-17),
            ),
            (
                proto::Value {
                    bool_value: Some(false),
                    ..Default::default()
                },
                json!(false),
            ),
            (proto::Value::default(), JsonValue::Null),
            (
                proto::Value {
                    double_value: Some(f64::NAN),
                    ..Default::default()
                },
                JsonValue::Null,
            ),
        ];
        for (wire, expected) in &values {
            assert_eq!(json_value(wire), *expected);
        }
    }

    #[test]
    fn odd_tag_list_is_rejected() {
        let layer = proto::Layer {
            features: vec![proto::Feature {
                tags: Cow::Borrowed(&[0][..]),
                ..Default::default()
            }],
            keys: vec![Cow::Borrowed("k")],
            values: vec![proto::Value::default()],
            ..Default::default()
        };
        let view = ParsedLayer { message: &layer };
        assert!(matches!(
            view.feature(0),
            Err(SourceError::OddTagCount { count: 1 })
        ));
    }

    #[test]
    fn out_of_range_tag_is_rejected() {
        let layer = proto::Layer {
            features: vec![proto::Feature {
                tags: Cow::Borrowed(&[0, 5][..]),
                ..Default::default()
            }],
            keys: vec![Cow::Borrowed("k")],
            values: vec![proto::Value::default()],
            ..Default::default()
        };
        let view = ParsedLayer { message: &layer };
        assert!(matches!(
            view.feature(0),
            Err(SourceError::TagOutOfBounds {
                table: "value",
                index: 5,
                ..
            })
        ));
    }

    #[test]
    fn amplifying_close_path_geometry_is_rejected() {
        // A few bytes of repeated ClosePath must surface as an error, not
        // materialize millions of points.
        let layer = proto::Layer {
            features: vec![proto::Feature {
                geometry: Cow::Owned(vec![9, 0, 0, command(CMD_CLOSE_PATH, 1 << 24)]),
                ..Default::default()
            }],
            ..Default::default()
        };
        let view = ParsedLayer { message: &layer };
        assert!(matches!(
            view.feature(0),
            Err(SourceError::Geometry(GeometryError::ClosePathRepeat(_)))
        ));
    }

    #[test]
    fn truncated_buffer_is_a_proto_error() {
        let bytes = tile_bytes(&one_layer_tile());
        assert!(ParsedTile::from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }
}
