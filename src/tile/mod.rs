// Tile building pipeline: model, preparation, serialization, reading.
//
// # Modules
//
// - `source`    - In-memory tile model and the `FeatureSource` trait
// - `prepare`   - Dictionary interning and per-feature flattening
// - `serialize` - Feature sources to wire bytes
// - `reader`    - Parsed views over encoded tiles

pub mod prepare;
pub mod reader;
pub mod serialize;
pub mod source;

// Re-export key types for convenience.
pub use prepare::{
    DEFAULT_EXTENT, DEFAULT_VERSION, LayerOptions, PreparedFeature, PreparedLayer, prepare_layer,
};
pub use reader::{ParsedLayer, ParsedTile, ReadError};
pub use serialize::{EncodeError, encode_layer, encode_layers, encode_prepared, reencode_tile};
pub use source::{
    FeatureSource, PropertyMap, SourceError, SourceFeature, TileFeature, TileLayer,
};
