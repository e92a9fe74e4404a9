//! # Instrument Vocabulary
//!
//! Closed vocabularies for the imaging channels and measurement attributes the
//! instrument exports. Filename tokens are validated against these enums so
//! that a typo in an export name surfaces as a diagnostic instead of silently
//! producing an unknown column downstream.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A token that is not part of a closed vocabulary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VocabularyError {
    /// Channel token not in the channel vocabulary.
    #[error("channel {0:?} not recognized")]
    UnknownChannel(String),

    /// Attribute token not in the attribute vocabulary.
    #[error("attribute {0:?} not recognized")]
    UnknownAttribute(String),
}

/// Imaging modality under which a measurement was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Brightfield.
    BF,
    /// Green fluorescence.
    Green,
    /// Enhanced contrast.
    EC,
}

impl Channel {
    /// All channels, in the order tables are concatenated.
    pub const ALL: [Channel; 3] = [Channel::BF, Channel::Green, Channel::EC];

    /// The token used in instrument filenames.
    pub fn token(&self) -> &'static str {
        match self {
            Channel::BF => "BF",
            Channel::Green => "green",
            Channel::EC => "EC",
        }
    }

    /// Human-readable modality name.
    pub fn description(&self) -> &'static str {
        match self {
            Channel::BF => "brightfield",
            Channel::Green => "green",
            Channel::EC => "enhanced contrast",
        }
    }
}

impl FromStr for Channel {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.token() == s)
            .ok_or_else(|| VocabularyError::UnknownChannel(s.to_string()))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A named quantitative measurement with a fixed physical unit.
///
/// The unit is metadata only; numeric tables carry the attribute name as the
/// semantic key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Summed pixel intensity (AU).
    TotalIntensity,
    /// Mean of per-object mean intensities (AU).
    AverageMeanIntensity,
    /// Spheroid area relative to well area (%).
    RelativeSpheroidArea,
    /// Absolute spheroid area (mm2).
    TotalSpheroidArea,
    /// Fluorescent area relative to well area (%).
    RelativeFluorescenceArea,
    /// Confluency (%).
    Confluency,
    /// Total covered area (mm2).
    TotalArea,
    /// Object density (1/mm2).
    ObjectCount,
    /// Objects per field of view.
    ObjectCountPerFov,
}

impl Attribute {
    /// All attributes, in the order aggregate columns are emitted.
    pub const ALL: [Attribute; 9] = [
        Attribute::TotalIntensity,
        Attribute::AverageMeanIntensity,
        Attribute::RelativeSpheroidArea,
        Attribute::TotalSpheroidArea,
        Attribute::RelativeFluorescenceArea,
        Attribute::Confluency,
        Attribute::TotalArea,
        Attribute::ObjectCount,
        Attribute::ObjectCountPerFov,
    ];

    /// The token used in instrument filenames and output column names.
    pub fn token(&self) -> &'static str {
        match self {
            Attribute::TotalIntensity => "total_intensity",
            Attribute::AverageMeanIntensity => "average_mean_intensity",
            Attribute::RelativeSpheroidArea => "relative_spheroid_area",
            Attribute::TotalSpheroidArea => "total_spheroid_area",
            Attribute::RelativeFluorescenceArea => "relative_fluorescence_area",
            Attribute::Confluency => "confluency",
            Attribute::TotalArea => "total_area",
            Attribute::ObjectCount => "object_count",
            Attribute::ObjectCountPerFov => "object_count_per_fov",
        }
    }

    /// Display unit for chart axes and report output.
    pub fn unit(&self) -> &'static str {
        match self {
            Attribute::TotalIntensity | Attribute::AverageMeanIntensity => "AU",
            Attribute::RelativeSpheroidArea
            | Attribute::RelativeFluorescenceArea
            | Attribute::Confluency => "%",
            Attribute::TotalSpheroidArea | Attribute::TotalArea => "mm2",
            Attribute::ObjectCount => "1/mm2",
            Attribute::ObjectCountPerFov => "per FOV",
        }
    }
}

impl FromStr for Attribute {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .iter()
            .copied()
            .find(|a| a.token() == s)
            .ok_or_else(|| VocabularyError::UnknownAttribute(s.to_string()))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_tokens_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(channel.token().parse::<Channel>().unwrap(), channel);
        }
        assert_eq!(
            "red".parse::<Channel>(),
            Err(VocabularyError::UnknownChannel("red".to_string()))
        );
    }

    #[test]
    fn attribute_tokens_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(attribute.token().parse::<Attribute>().unwrap(), attribute);
        }
        assert!("perimeter".parse::<Attribute>().is_err());
    }

    #[test]
    fn attribute_units_match_instrument_manual() {
        assert_eq!(Attribute::TotalIntensity.unit(), "AU");
        assert_eq!(Attribute::Confluency.unit(), "%");
        assert_eq!(Attribute::TotalSpheroidArea.unit(), "mm2");
        assert_eq!(Attribute::ObjectCount.unit(), "1/mm2");
        assert_eq!(Attribute::ObjectCountPerFov.unit(), "per FOV");
    }

    #[test]
    fn multi_underscore_attribute_tokens_parse() {
        // Filename labels split once on '_', so the attribute part keeps its
        // internal underscores.
        assert_eq!(
            "relative_fluorescence_area".parse::<Attribute>().unwrap(),
            Attribute::RelativeFluorescenceArea
        );
    }
}
