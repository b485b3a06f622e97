//! Polygon styles: how a point sequence is interpreted.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// The interpretation mode of a polygon's point sequence.
///
/// Point-count semantics depend on the style: `Vectors` needs an even
/// count, circle styles exactly two points (center, radius point), arc
/// styles triples of (center, start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    /// Closed filled outline.
    Filled,
    /// Closed unfilled outline.
    Closed,
    /// Closed outline with drawn diagonals.
    Crossed,
    /// Open outline.
    Opened,
    /// Open outline, dotted texture.
    OpenedDotted,
    /// Open outline, dashed texture.
    OpenedDashed,
    /// Open outline, thick stroke.
    OpenedThick,
    /// Disjoint segments, taken as consecutive point pairs.
    Vectors,
    Circle,
    ThickCircle,
    /// Filled circle.
    Disc,
    CircleArc,
    ThickCircleArc,
    /// Text anchored at the center of its reference box.
    TextCent,
    TextTop,
    TextBot,
    TextLeft,
    TextRight,
    TextTopLeft,
    TextTopRight,
    TextBotLeft,
    TextBotRight,
    /// Text constrained to fit inside its reference box.
    TextBox,
    Cross,
    BigCross,
}

/// Every style, in declaration order. Together with `name` this forms the
/// immutable name lookup table.
pub const ALL_STYLES: [Style; 25] = [
    Style::Filled,
    Style::Closed,
    Style::Crossed,
    Style::Opened,
    Style::OpenedDotted,
    Style::OpenedDashed,
    Style::OpenedThick,
    Style::Vectors,
    Style::Circle,
    Style::ThickCircle,
    Style::Disc,
    Style::CircleArc,
    Style::ThickCircleArc,
    Style::TextCent,
    Style::TextTop,
    Style::TextBot,
    Style::TextLeft,
    Style::TextRight,
    Style::TextTopLeft,
    Style::TextTopRight,
    Style::TextBotLeft,
    Style::TextBotRight,
    Style::TextBox,
    Style::Cross,
    Style::BigCross,
];

impl Style {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Style::Filled => "filled",
            Style::Closed => "closed",
            Style::Crossed => "crossed",
            Style::Opened => "opened",
            Style::OpenedDotted => "opened-dotted",
            Style::OpenedDashed => "opened-dashed",
            Style::OpenedThick => "opened-thick",
            Style::Vectors => "vectors",
            Style::Circle => "circle",
            Style::ThickCircle => "thick-circle",
            Style::Disc => "disc",
            Style::CircleArc => "circle-arc",
            Style::ThickCircleArc => "thick-circle-arc",
            Style::TextCent => "text-cent",
            Style::TextTop => "text-top",
            Style::TextBot => "text-bot",
            Style::TextLeft => "text-left",
            Style::TextRight => "text-right",
            Style::TextTopLeft => "text-top-left",
            Style::TextTopRight => "text-top-right",
            Style::TextBotLeft => "text-bot-left",
            Style::TextBotRight => "text-bot-right",
            Style::TextBox => "text-box",
            Style::Cross => "cross",
            Style::BigCross => "big-cross",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Style> {
        ALL_STYLES.into_iter().find(|s| s.name() == name)
    }

    /// Closed outline with an interior: filled, closed, crossed.
    #[must_use]
    pub fn is_closed_outline(self) -> bool {
        matches!(self, Style::Filled | Style::Closed | Style::Crossed)
    }

    #[must_use]
    pub fn is_opened(self) -> bool {
        matches!(
            self,
            Style::Opened | Style::OpenedDotted | Style::OpenedDashed | Style::OpenedThick
        )
    }

    #[must_use]
    pub fn is_circle(self) -> bool {
        matches!(self, Style::Circle | Style::ThickCircle | Style::Disc)
    }

    #[must_use]
    pub fn is_arc(self) -> bool {
        matches!(self, Style::CircleArc | Style::ThickCircleArc)
    }

    #[must_use]
    pub fn is_curved(self) -> bool {
        self.is_circle() || self.is_arc()
    }

    /// The nine anchor variants; excludes `TextBox`.
    #[must_use]
    pub fn is_text_anchor(self) -> bool {
        matches!(
            self,
            Style::TextCent
                | Style::TextTop
                | Style::TextBot
                | Style::TextLeft
                | Style::TextRight
                | Style::TextTopLeft
                | Style::TextTopRight
                | Style::TextBotLeft
                | Style::TextBotRight
        )
    }

    #[must_use]
    pub fn is_text(self) -> bool {
        self.is_text_anchor() || self == Style::TextBox
    }

    #[must_use]
    pub fn is_marker(self) -> bool {
        matches!(self, Style::Cross | Style::BigCross)
    }

    /// Whether the last point connects back to the first implicitly.
    #[must_use]
    pub fn closes_implicitly(self) -> bool {
        !self.is_opened() && self != Style::Vectors
    }

    /// Validate a point count against this style's semantics.
    ///
    /// Arc styles accept any positive multiple of three: clipping replaces
    /// an arc by a concatenation of (center, start, end) wedge triples.
    pub fn validate_point_count(self, count: usize) -> Result<(), GeometryError> {
        let ok = match self {
            Style::Vectors => count % 2 == 0,
            Style::Circle | Style::ThickCircle | Style::Disc => count == 2,
            Style::CircleArc | Style::ThickCircleArc => count >= 3 && count % 3 == 0,
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(GeometryError::InvalidStyle {
                style: self.name(),
                count,
            })
        }
    }

    /// Re-derive a text anchor after a transform: rotate the anchor by
    /// `quadrants` counter-clockwise quarter turns, mirroring across the
    /// vertical axis first when `mirrored`. Non-anchor styles are returned
    /// unchanged.
    #[must_use]
    pub fn rotated_anchor(self, quadrants: u8, mirrored: bool) -> Style {
        if !self.is_text_anchor() {
            return self;
        }
        let mut anchor = if mirrored { self.mirrored_anchor() } else { self };
        for _ in 0..quadrants % 4 {
            anchor = anchor.anchor_quarter_turn();
        }
        anchor
    }

    fn mirrored_anchor(self) -> Style {
        match self {
            Style::TextLeft => Style::TextRight,
            Style::TextRight => Style::TextLeft,
            Style::TextTopLeft => Style::TextTopRight,
            Style::TextTopRight => Style::TextTopLeft,
            Style::TextBotLeft => Style::TextBotRight,
            Style::TextBotRight => Style::TextBotLeft,
            other => other,
        }
    }

    fn anchor_quarter_turn(self) -> Style {
        match self {
            Style::TextTop => Style::TextLeft,
            Style::TextLeft => Style::TextBot,
            Style::TextBot => Style::TextRight,
            Style::TextRight => Style::TextTop,
            Style::TextTopLeft => Style::TextBotLeft,
            Style::TextBotLeft => Style::TextBotRight,
            Style::TextBotRight => Style::TextTopRight,
            Style::TextTopRight => Style::TextTopLeft,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lookup_round_trips() {
        for style in ALL_STYLES {
            assert_eq!(Style::from_name(style.name()), Some(style));
        }
        assert_eq!(Style::from_name("no-such-style"), None);
    }

    #[test]
    fn vectors_requires_an_even_count() {
        assert!(Style::Vectors.validate_point_count(4).is_ok());
        assert!(Style::Vectors.validate_point_count(5).is_err());
    }

    #[test]
    fn circle_and_arc_point_counts() {
        assert!(Style::Circle.validate_point_count(2).is_ok());
        assert!(Style::Circle.validate_point_count(3).is_err());
        assert!(Style::CircleArc.validate_point_count(3).is_ok());
        assert!(Style::CircleArc.validate_point_count(6).is_ok());
        assert!(Style::CircleArc.validate_point_count(4).is_err());
    }

    #[test]
    fn anchor_rotation_cycles() {
        assert_eq!(Style::TextTop.rotated_anchor(1, false), Style::TextLeft);
        assert_eq!(Style::TextTopLeft.rotated_anchor(2, false), Style::TextBotRight);
        assert_eq!(Style::TextCent.rotated_anchor(3, true), Style::TextCent);
        for style in ALL_STYLES {
            assert_eq!(style.rotated_anchor(4, false), style);
        }
    }

    #[test]
    fn mirror_swaps_left_and_right() {
        assert_eq!(Style::TextLeft.rotated_anchor(0, true), Style::TextRight);
        assert_eq!(Style::TextTopRight.rotated_anchor(0, true), Style::TextTopLeft);
    }
}
