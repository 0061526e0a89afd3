// Mapbox Vector Tile wire format (vector-tile-spec 2.1).
//
// This module covers the format-level pieces: the command-stream geometry
// encoding, the typed value model for layer dictionaries, and the protobuf
// schema messages themselves.
//
// # Modules
//
// - `geometry` - MoveTo/LineTo/ClosePath command words and zigzag deltas
// - `value`    - Typed dictionary values and JSON classification
// - `proto`    - vector_tile schema messages (quick-protobuf bindings)

pub mod geometry;
pub mod proto;
pub mod value;

// Re-export key types for convenience.
pub use geometry::{
    GeomType, GeometryError, Ring, TilePoint, decode_rings, encode_rings, unzigzag, zigzag,
};
pub use value::{TypedValue, integer_id, wrap};
