//! Discrete block faces and quarter-turn rotations used to label segment ends.

use bevy::math::{IVec3, Quat};
use serde::{Deserialize, Serialize};

/// A face of the unit cube around a track block.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
    Front,
    Back,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::Left,
        Side::Right,
        Side::Top,
        Side::Bottom,
        Side::Front,
        Side::Back,
    ];

    pub fn reverse(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }

    /// Offset to the neighboring cell across this face.
    pub fn direction(self) -> IVec3 {
        match self {
            Side::Left => IVec3::NEG_X,
            Side::Right => IVec3::X,
            Side::Top => IVec3::Y,
            Side::Bottom => IVec3::NEG_Y,
            Side::Front => IVec3::NEG_Z,
            Side::Back => IVec3::Z,
        }
    }

    /// One counter-clockwise quarter turn about +Y (seen from above).
    fn turn(self) -> Side {
        match self {
            Side::Front => Side::Left,
            Side::Left => Side::Back,
            Side::Back => Side::Right,
            Side::Right => Side::Front,
            vertical => vertical,
        }
    }
}

/// Yaw of a placed block in quarter turns about +Y.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct Rotation {
    quarter_turns: u8,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation { quarter_turns: 0 };

    pub fn from_quarter_turns(turns: i32) -> Self {
        Self {
            quarter_turns: turns.rem_euclid(4) as u8,
        }
    }

    pub fn all() -> [Rotation; 4] {
        [0, 1, 2, 3].map(Rotation::from_quarter_turns)
    }

    pub fn quarter_turns(self) -> u8 {
        self.quarter_turns
    }

    pub fn then(self, other: Rotation) -> Rotation {
        Rotation::from_quarter_turns(i32::from(self.quarter_turns) + i32::from(other.quarter_turns))
    }

    pub fn rotate_side(self, side: Side) -> Side {
        (0..self.quarter_turns).fold(side, |s, _| s.turn())
    }

    pub fn quat(self) -> Quat {
        Quat::from_rotation_y(f32::from(self.quarter_turns) * std::f32::consts::FRAC_PI_2)
    }
}
