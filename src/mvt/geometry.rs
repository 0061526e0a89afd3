// Geometry command streams.
//
// A feature's geometry is a flat sequence of u32 words: command words
// packing (repeat count << 3 | command id), followed by zigzag-encoded
// coordinate deltas relative to a running cursor. The cursor starts at
// (0, 0) for each feature and persists across rings, so a ring's MoveTo
// delta is relative to the previous ring's last point.

use thiserror::Error;

/// A tile-local integer coordinate pair.
pub type TilePoint = (i32, i32);

/// One ring: an ordered list of points. Rings travel verbatim through the
/// encoder; nothing is inserted, removed, or reordered.
pub type Ring = Vec<TilePoint>;

// ---------------------------------------------------------------------------
// Geometry type
// ---------------------------------------------------------------------------

/// Wire geometry type of a feature (vector_tile.proto `GeomType`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GeomType {
    #[default]
    Unknown = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
}

impl From<i32> for GeomType {
    fn from(value: i32) -> Self {
        match value {
            1 => Self::Point,
            2 => Self::LineString,
            3 => Self::Polygon,
            _ => Self::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Command words and zigzag deltas
// ---------------------------------------------------------------------------

/// MoveTo: start a new ring at cursor + delta, once per repeat.
pub const CMD_MOVE_TO: u32 = 1;
/// LineTo: extend the current ring by one point per repeat.
pub const CMD_LINE_TO: u32 = 2;
/// ClosePath: append a copy of the current ring's first point. Never
/// written by [`encode_rings`]; accepted by [`decode_rings`] for interop
/// with writers that close polygon rings explicitly.
pub const CMD_CLOSE_PATH: u32 = 7;

/// Packs a command id and repeat count into one command word.
#[inline]
pub fn command(id: u32, count: u32) -> u32 {
    (count << 3) | (id & 0x7)
}

/// Zigzag-encodes a signed delta so small magnitudes stay small varints.
#[inline]
pub fn zigzag(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag`].
#[inline]
pub fn unzigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes rings into a command/delta stream.
///
/// Each ring becomes `MoveTo(1)` plus the delta to its first point, and
/// when more points follow, `LineTo(n-1)` plus one delta pair per
/// remaining point. Rings with no points are skipped. Polygon rings are
/// not closed here: a consumer that requires an explicit ClosePath must
/// receive rings whose closing point is already present.
///
/// Deltas wrap in i32, matching [`decode_rings`], so the roundtrip holds
/// over the full coordinate plane.
pub fn encode_rings(rings: &[Ring]) -> Vec<u32> {
    let mut out = Vec::with_capacity(rings.iter().map(|r| 2 * r.len() + 2).sum());
    let (mut x, mut y) = (0i32, 0i32);

    for ring in rings {
        let Some((&first, rest)) = ring.split_first() else {
            continue;
        };
        out.push(command(CMD_MOVE_TO, 1));
        push_delta(&mut out, &mut x, &mut y, first);
        if !rest.is_empty() {
            debug_assert!(rest.len() < (1 << 29), "ring too long for one LineTo command word");
            out.push(command(CMD_LINE_TO, rest.len() as u32));
            for &point in rest {
                push_delta(&mut out, &mut x, &mut y, point);
            }
        }
    }
    out
}

#[inline]
fn push_delta(out: &mut Vec<u32>, x: &mut i32, y: &mut i32, (px, py): TilePoint) {
    out.push(zigzag(px.wrapping_sub(*x)));
    out.push(zigzag(py.wrapping_sub(*y)));
    *x = px;
    *y = py;
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Errors from [`decode_rings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The stream ended in the middle of a command's coordinate pairs.
    #[error("geometry stream truncated mid-command")]
    Truncated,
    /// Command id other than MoveTo, LineTo, or ClosePath.
    #[error("unknown geometry command id {0}")]
    UnknownCommand(u32),
    /// LineTo issued before any MoveTo opened a ring.
    #[error("LineTo before any MoveTo")]
    OrphanLineTo,
    /// MoveTo or LineTo with a repeat count of zero.
    #[error("command id {0} with zero repeat count")]
    ZeroRepeat(u32),
    /// ClosePath with a repeat count other than one.
    #[error("ClosePath repeat count {0}, must be 1")]
    ClosePathRepeat(u32),
}

/// Decodes a command/delta stream back into rings.
///
/// MoveTo opens a new ring per repeated point, LineTo extends the current
/// ring, ClosePath appends a copy of the ring's first point. Repeat
/// counts are validated (MoveTo/LineTo at least one, ClosePath exactly
/// one), so decoded output never outgrows the input stream. Cursor
/// arithmetic wraps on overflow so malformed streams cannot panic.
pub fn decode_rings(stream: &[u32]) -> Result<Vec<Ring>, GeometryError> {
    let mut rings = Vec::new();
    let mut current: Option<Ring> = None;
    let (mut x, mut y) = (0i32, 0i32);
    let mut words = stream.iter().copied();

    while let Some(word) = words.next() {
        let (id, count) = (word & 0x7, word >> 3);
        match id {
            CMD_MOVE_TO | CMD_LINE_TO => {
                if count == 0 {
                    return Err(GeometryError::ZeroRepeat(id));
                }
                for _ in 0..count {
                    let dx = words.next().ok_or(GeometryError::Truncated)?;
                    let dy = words.next().ok_or(GeometryError::Truncated)?;
                    x = x.wrapping_add(unzigzag(dx));
                    y = y.wrapping_add(unzigzag(dy));
                    if id == CMD_MOVE_TO {
                        if let Some(ring) = current.take() {
                            rings.push(ring);
                        }
                        current = Some(Vec::new());
                    }
                    match current.as_mut() {
                        Some(ring) => ring.push((x, y)),
                        None => return Err(GeometryError::OrphanLineTo),
                    }
                }
            }
            CMD_CLOSE_PATH => {
                // Repeats consume no parameters; the wire fixes this count at 1.
                if count != 1 {
                    return Err(GeometryError::ClosePathRepeat(count));
                }
                if let Some(ring) = current.as_mut() {
                    if let Some(&first) = ring.first() {
                        ring.push(first);
                    }
                }
            }
            other => return Err(GeometryError::UnknownCommand(other)),
        }
    }
    if let Some(ring) = current.take() {
        rings.push(ring);
    }
    Ok(rings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
