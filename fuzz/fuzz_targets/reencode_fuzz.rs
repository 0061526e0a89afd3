#![no_main]
use libfuzzer_sys::fuzz_target;
use oxitile::tile::{ParsedTile, serialize};

fuzz_target!(|data: &[u8]| {
    let Ok(tile) = ParsedTile::from_bytes(data) else {
        return;
    };

    // Re-encoding a parseable tile may reject malformed features, but must
    // not panic; whatever it emits must parse again.
    let Ok(reencoded) = serialize::reencode_tile(&tile) else {
        return;
    };
    ParsedTile::from_bytes(&reencoded).expect("re-encoded tile must parse");
});
