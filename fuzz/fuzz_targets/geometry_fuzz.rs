#![no_main]
use libfuzzer_sys::fuzz_target;
use oxitile::mvt::geometry;

fuzz_target!(|data: &[u8]| {
    let words: Vec<u32> = data
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    // Arbitrary command streams must never panic the decoder.
    let Ok(rings) = geometry::decode_rings(&words) else {
        return;
    };

    // Decoded rings are never empty, so re-encoding them must decode back
    // to the same rings.
    let reencoded = geometry::encode_rings(&rings);
    let again = geometry::decode_rings(&reencoded).expect("re-encoded stream must decode");
    assert_eq!(again, rings);
});
