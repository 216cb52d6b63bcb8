//! Segment Validator - Validates version-bump keywords
//!
//! A segment names the semantic-version component targeted by a bump.
//! Exactly the three lowercase literals `major`, `minor`, and `patch`
//! are accepted; matching is case-sensitive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::OrbError;

/// Semantic-version component targeted by an increment or promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Major,
    Minor,
    Patch,
}

impl Segment {
    /// Get the wire/display label of this segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Major => "major",
            Segment::Minor => "minor",
            Segment::Patch => "patch",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validator for version-bump segment arguments
pub struct SegmentValidator;

impl SegmentValidator {
    /// Validate a segment label, returning the typed segment.
    ///
    /// Anything but the three exact lowercase labels fails with
    /// `InvalidSegment` carrying the offending value for display.
    pub fn validate(label: &str) -> Result<Segment, OrbError> {
        match label {
            "major" => Ok(Segment::Major),
            "minor" => Ok(Segment::Minor),
            "patch" => Ok(Segment::Patch),
            _ => Err(OrbError::InvalidSegment {
                segment: label.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_the_three_labels() {
        assert_eq!(SegmentValidator::validate("major").unwrap(), Segment::Major);
        assert_eq!(SegmentValidator::validate("minor").unwrap(), Segment::Minor);
        assert_eq!(SegmentValidator::validate("patch").unwrap(), Segment::Patch);
    }

    #[test]
    fn test_validate_is_case_sensitive() {
        let error = SegmentValidator::validate("Major").unwrap_err();
        assert!(matches!(
            error,
            OrbError::InvalidSegment { ref segment } if segment == "Major"
        ));
    }

    #[test]
    fn test_validate_rejects_other_labels() {
        for label in ["", "majo", "patch ", "release", "MAJOR"] {
            assert!(SegmentValidator::validate(label).is_err(), "label: {label:?}");
        }
    }

    #[test]
    fn test_segment_display_roundtrips() {
        for segment in [Segment::Major, Segment::Minor, Segment::Patch] {
            assert_eq!(
                SegmentValidator::validate(segment.as_str()).unwrap(),
                segment
            );
            assert_eq!(segment.to_string(), segment.as_str());
        }
    }

    #[test]
    fn test_segment_serializes_lowercase() {
        let json = serde_json::to_string(&Segment::Minor).unwrap();
        assert_eq!(json, r#""minor""#);
    }
}
