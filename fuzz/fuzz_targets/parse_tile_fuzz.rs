#![no_main]
use libfuzzer_sys::fuzz_target;
use oxitile::tile::{FeatureSource, ParsedTile};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the parser, only return errors.
    let Ok(tile) = ParsedTile::from_bytes(data) else {
        return;
    };

    // Walking every feature exercises tag resolution and geometry decode.
    for layer in tile.layers() {
        let _ = layer.name();
        let _ = layer.version();
        let _ = layer.extent();
        for index in 0..layer.len() {
            let _ = layer.feature(index);
        }
    }
});
