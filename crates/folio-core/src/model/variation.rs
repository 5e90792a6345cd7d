use std::ops::BitAnd;

use serde::{Deserialize, Serialize};

/// How values vary: by culture, by segment, both, or not at all
///
/// The effective variation of a property is its own variation ANDed with its
/// content type's variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentVariation {
    #[default]
    Nothing,
    Culture,
    Segment,
    CultureAndSegment,
}

const CULTURE_BIT: u8 = 0b01;
const SEGMENT_BIT: u8 = 0b10;

impl ContentVariation {
    fn bits(self) -> u8 {
        match self {
            ContentVariation::Nothing => 0,
            ContentVariation::Culture => CULTURE_BIT,
            ContentVariation::Segment => SEGMENT_BIT,
            ContentVariation::CultureAndSegment => CULTURE_BIT | SEGMENT_BIT,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & (CULTURE_BIT | SEGMENT_BIT) {
            0 => ContentVariation::Nothing,
            CULTURE_BIT => ContentVariation::Culture,
            SEGMENT_BIT => ContentVariation::Segment,
            _ => ContentVariation::CultureAndSegment,
        }
    }

    pub fn varies_by_culture(self) -> bool {
        self.bits() & CULTURE_BIT != 0
    }

    pub fn varies_by_segment(self) -> bool {
        self.bits() & SEGMENT_BIT != 0
    }

    /// Whether a value slot addressed by `(culture, segment)` is valid
    ///
    /// Culture-varying slots need a culture, invariant ones must not have one.
    /// A segment is only allowed when varying by segment; the segment-neutral
    /// slot is always allowed.
    pub fn supports(self, culture: Option<&str>, segment: Option<&str>) -> bool {
        let culture_ok = culture.is_some() == self.varies_by_culture();
        let segment_ok = segment.is_none() || self.varies_by_segment();
        culture_ok && segment_ok
    }
}

impl BitAnd for ContentVariation {
    type Output = ContentVariation;

    fn bitand(self, rhs: Self) -> Self::Output {
        ContentVariation::from_bits(self.bits() & rhs.bits())
    }
}
