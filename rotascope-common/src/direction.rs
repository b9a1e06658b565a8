//! Rotation-direction lookup (C2).
//!
//! Two static maps classify a pair of signs (`{-1, 0, +1}`) into a compass
//! direction or a quadrant position; a third static map combines a direction
//! and a position into a clockwise/anticlockwise vote. Absence from the
//! third map means "unclassifiable" and contributes `0` to the majority
//! vote (§4.2, §4.6 Step 6).

/// Sign of a scalar, collapsed to the three values the classification
/// tables are keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Neg,
    Zero,
    Pos,
}

impl Sign {
    pub fn of(v: f64) -> Self {
        if v > 0.0 {
            Sign::Pos
        } else if v < 0.0 {
            Sign::Neg
        } else {
            Sign::Zero
        }
    }
}

/// Compass direction of an acceleration-vector delta (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaDirection {
    Ne,
    Se,
    Sw,
    Nw,
    N,
    S,
    E,
    W,
    Unknown,
}

/// Quadrant/semicircle position of an acceleration vector (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Lb,
    Lt,
    Rt,
    Rb,
    B,
    T,
    L,
    R,
    Unknown,
}

/// Map `(sign(delta_east), sign(delta_up))` to a compass direction.
pub fn delta_direction(east: Sign, up: Sign) -> DeltaDirection {
    use Sign::*;
    match (east, up) {
        (Pos, Pos) => DeltaDirection::Ne,
        (Pos, Neg) => DeltaDirection::Se,
        (Neg, Neg) => DeltaDirection::Sw,
        (Neg, Pos) => DeltaDirection::Nw,
        (Zero, Pos) => DeltaDirection::N,
        (Zero, Neg) => DeltaDirection::S,
        (Pos, Zero) => DeltaDirection::E,
        (Neg, Zero) => DeltaDirection::W,
        (Zero, Zero) => DeltaDirection::Unknown,
    }
}

/// Map `(sign(east), sign(up))` to a quadrant/semicircle position.
pub fn position(east: Sign, up: Sign) -> Position {
    use Sign::*;
    match (east, up) {
        (Pos, Pos) => Position::Lb,
        (Pos, Neg) => Position::Lt,
        (Neg, Neg) => Position::Rt,
        (Neg, Pos) => Position::Rb,
        (Zero, Pos) => Position::B,
        (Zero, Neg) => Position::T,
        (Pos, Zero) => Position::L,
        (Neg, Zero) => Position::R,
        (Zero, Zero) => Position::Unknown,
    }
}

/// Final (direction, position) -> clockwise(+1)/anticlockwise(-1) table
/// (§6, 24 entries). Any pair absent from this table is
/// unclassifiable and returns `None`.
pub fn classify(direction: DeltaDirection, pos: Position) -> Option<i8> {
    use DeltaDirection::*;
    use Position::*;
    match (direction, pos) {
        (Ne, Lt) => Some(-1),
        (Ne, Rb) => Some(1),
        (Ne, L) => Some(-1),
        (Ne, B) => Some(1),
        (Se, Lb) => Some(1),
        (Se, Rt) => Some(-1),
        (Se, L) => Some(1),
        (Se, T) => Some(-1),
        (Sw, Lt) => Some(1),
        (Sw, Rb) => Some(-1),
        (Sw, R) => Some(-1),
        (Sw, T) => Some(1),
        (Nw, Rt) => Some(1),
        (Nw, Lb) => Some(-1),
        (Nw, R) => Some(1),
        (Nw, B) => Some(-1),
        (N, L) => Some(-1),
        (N, R) => Some(1),
        (S, L) => Some(1),
        (S, R) => Some(-1),
        (E, T) => Some(-1),
        (E, B) => Some(1),
        (W, T) => Some(1),
        (W, B) => Some(-1),
        _ => None,
    }
}

/// Classify one time-step: given the sign of the acceleration-vector delta
/// and the sign of the acceleration vector itself, return the per-step vote
/// in `{-1, 0, +1}` (0 when the pair is not in the classification table).
pub fn classify_step(delta_east: f64, delta_up: f64, east: f64, up: f64) -> i8 {
    let dir = delta_direction(Sign::of(delta_east), Sign::of(delta_up));
    let pos = position(Sign::of(east), Sign::of(up));
    classify(dir, pos).unwrap_or(0)
}
