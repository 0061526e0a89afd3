// Tile serialization: feature sources to wire bytes.
//
// The entry points here run the two-stage pipeline: prepare each source
// into wire shape, then write a single `Tile` message. A tile with no
// layers serializes to zero bytes, which is a legal (empty) message.

use log::debug;
use quick_protobuf::{MessageWrite, Writer};
use thiserror::Error;

use crate::mvt::proto;

use super::prepare::{self, LayerOptions, PreparedLayer};
use super::reader::ParsedTile;
use super::source::{FeatureSource, SourceError};

// ---------------------------------------------------------------------------
// Encode error
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("protobuf write failed: {0}")]
    Proto(#[from] quick_protobuf::Error),
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Encode named feature sources into one tile, layers in input order.
///
/// `options` applies to every layer. Layer names are written as given;
/// nothing deduplicates or reorders them.
pub fn encode_layers<'a, S, I>(layers: I, options: &LayerOptions) -> Result<Vec<u8>, EncodeError>
where
    S: FeatureSource + ?Sized + 'a,
    I: IntoIterator<Item = (&'a str, &'a S)>,
{
    let mut prepared = Vec::new();
    for (name, source) in layers {
        prepared.push(prepare::prepare_layer(name, source, options)?);
    }
    encode_prepared(&prepared)
}

/// Encode one named source as a complete single-layer tile.
pub fn encode_layer<S>(
    name: &str,
    source: &S,
    options: &LayerOptions,
) -> Result<Vec<u8>, EncodeError>
where
    S: FeatureSource + ?Sized,
{
    encode_layers([(name, source)], options)
}

/// Re-encode a parsed tile, preserving each layer's name, version, and
/// extent.
///
/// Features pass through the same preparation as fresh input, so foreign
/// `int_value` and `float_value` dictionary entries normalize to the
/// families this encoder writes.
pub fn reencode_tile(tile: &ParsedTile<'_>) -> Result<Vec<u8>, EncodeError> {
    let mut prepared = Vec::new();
    for layer in tile.layers() {
        let options = LayerOptions {
            version: Some(layer.version()),
            extent: Some(layer.extent()),
        };
        prepared.push(prepare::prepare_layer(layer.name(), &layer, &options)?);
    }
    encode_prepared(&prepared)
}

/// Serialize already-prepared layers as one `Tile` message.
pub fn encode_prepared(layers: &[PreparedLayer]) -> Result<Vec<u8>, EncodeError> {
    let message = proto::Tile {
        layers: layers.iter().map(proto::Layer::from).collect(),
    };

    let mut out = Vec::with_capacity(message.get_size());
    let mut writer = Writer::new(&mut out);
    message.write_message(&mut writer)?;

    debug!("encoded tile: {} layers, {} bytes", layers.len(), out.len());
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
