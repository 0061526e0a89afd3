//! Oxitile: Mapbox Vector Tile (MVT) encoding in Rust.
//!
//! The crate provides:
//! - The wire-format pieces: geometry commands, typed values, and the
//!   `vector_tile` schema messages (`mvt`)
//! - A tile-building pipeline from in-memory feature layers to protobuf
//!   bytes, plus parsed read-back views (`tile`)
//!
//! # Quick Start
//!
//! ```
//! use oxitile::tile::{LayerOptions, TileFeature, TileLayer, serialize};
//!
//! let mut feature = TileFeature::points(vec![(25, 17)]);
//! feature.add_property("name", "summit");
//!
//! let mut layer = TileLayer::new();
//! layer.push(feature);
//!
//! let bytes = serialize::encode_layer("poi", &layer, &LayerOptions::default()).unwrap();
//! assert!(!bytes.is_empty());
//! ```

pub mod mvt;
pub mod tile;
