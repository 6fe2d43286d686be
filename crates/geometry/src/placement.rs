//! Placement vocabulary: sides, alignments and the request/result records.

use anyhow::{Error, bail};
use core::fmt;
use core::str::FromStr;
use floating_core::{Axis, Point, Warning};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Side of the anchor the floating element is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Above the anchor.
    Top,
    /// Right of the anchor.
    Right,
    /// Below the anchor.
    Bottom,
    /// Left of the anchor.
    Left,
}

impl Side {
    /// The side across the anchor.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Axis the main-axis offset moves along.
    #[must_use]
    pub const fn main_axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// Whether the floating element sits before the anchor on the main axis.
    #[must_use]
    pub const fn is_leading(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Alignment along the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Leading edges aligned.
    Start,
    /// Centres aligned.
    #[default]
    Center,
    /// Trailing edges aligned.
    End,
}

/// Side and alignment, written `bottom-start`, `top`, `left-end`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Placement {
    /// Side of the anchor.
    pub side: Side,
    /// Cross-axis alignment.
    pub alignment: Alignment,
}

impl Placement {
    /// Build a placement.
    #[must_use]
    pub const fn new(side: Side, alignment: Alignment) -> Self {
        Self { side, alignment }
    }

    /// Same alignment on the opposite side.
    #[must_use]
    pub const fn flipped(self) -> Self {
        Self {
            side: self.side.opposite(),
            alignment: self.alignment,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(Side::Bottom, Alignment::Center)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.side.name())?;
        match self.alignment {
            Alignment::Start => formatter.write_str("-start"),
            Alignment::Center => Ok(()),
            Alignment::End => formatter.write_str("-end"),
        }
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (side_name, alignment_name) = input
            .trim()
            .split_once('-')
            .map_or((input.trim(), None), |(side, align)| (side, Some(align)));
        let side = match side_name {
            "top" => Side::Top,
            "right" => Side::Right,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            other => bail!("unknown placement side `{other}` in `{input}`"),
        };
        let alignment = match alignment_name {
            None => Alignment::Center,
            Some("start") => Alignment::Start,
            Some("end") => Alignment::End,
            Some(other) => bail!("unknown placement alignment `{other}` in `{input}`"),
        };
        Ok(Self { side, alignment })
    }
}

impl TryFrom<String> for Placement {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Placement> for String {
    fn from(placement: Placement) -> Self {
        placement.to_string()
    }
}

/// CSS positioning strategy of the floating element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Positioned against the document; coordinates include the scroll offset.
    #[default]
    Absolute,
    /// Positioned against the viewport.
    Fixed,
}

impl Strategy {
    /// CSS `position` keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Fixed => "fixed",
        }
    }
}

/// What to do when neither the preferred nor the opposite side has room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlipFallback {
    /// Keep the preferred side and rely on shifting.
    #[default]
    Initial,
    /// Use whichever of the two sides overflows less.
    BestFit,
}

/// Arrow element request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowRequest {
    /// Edge length of the (square) arrow element.
    pub width: f64,
    /// Minimum distance between the arrow and the floating element's corners.
    #[serde(default)]
    pub padding: f64,
}

/// Input of one placement computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementRequest {
    /// Preferred side and alignment.
    pub placement: Placement,
    /// Gap between anchor and floating element.
    pub offset_main_axis: f64,
    /// Displacement along the anchor edge.
    pub offset_cross_axis: f64,
    /// Try the opposite side when the preferred side lacks room.
    pub allow_flip: bool,
    /// Keep the floating element inside the margin-bounded viewport.
    pub allow_shift: bool,
    /// Arrow to align with the anchor.
    pub arrow: Option<ArrowRequest>,
    /// CSS positioning strategy.
    pub strategy: Strategy,
    /// Behaviour when neither side fits.
    pub flip_fallback: FlipFallback,
}

impl Default for PlacementRequest {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            offset_main_axis: 0.0,
            offset_cross_axis: 0.0,
            allow_flip: true,
            allow_shift: true,
            arrow: None,
            strategy: Strategy::Absolute,
            flip_fallback: FlipFallback::Initial,
        }
    }
}

impl PlacementRequest {
    /// Request for a placement with the default modifiers.
    #[must_use]
    pub fn at(placement: Placement) -> Self {
        Self {
            placement,
            ..Self::default()
        }
    }
}

/// Where the arrow element goes, relative to the floating element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowPosition {
    /// Left offset inside the floating element.
    pub x: f64,
    /// Top offset inside the floating element.
    pub y: f64,
    /// Rotation of the arrow square in degrees.
    pub rotation_deg: f64,
}

/// Outcome of one placement computation. Always produced fresh.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementResult {
    /// Placement after flipping.
    pub placement: Placement,
    /// Top-left corner in the coordinate space of `strategy`.
    pub coordinates: Point,
    /// Arrow placement, when requested.
    pub arrow: Option<ArrowPosition>,
    /// Pivot for scale/fade transitions, relative to the floating element.
    pub transform_origin: Point,
    /// Positioning strategy the coordinates are expressed in.
    pub strategy: Strategy,
    /// The anchor lies entirely outside the viewport.
    pub hidden: bool,
    /// Non-fatal diagnostics raised while computing.
    pub warnings: SmallVec<Warning, 2>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Placement names parse and print symmetrically; junk is rejected.
    ///
    /// # Panics
    /// Panics if a name is mis-parsed.
    #[test]
    fn placement_names() {
        let parsed: Placement = "bottom-start".parse().expect("valid placement");
        assert_eq!(parsed, Placement::new(Side::Bottom, Alignment::Start));
        assert_eq!(parsed.to_string(), "bottom-start");
        assert_eq!("left".parse::<Placement>().expect("valid placement").alignment, Alignment::Center);
        assert!("middle".parse::<Placement>().is_err());
        assert!("top-middle".parse::<Placement>().is_err());
    }

    /// Requests deserialize from partial JSON with the default modifiers.
    ///
    /// # Panics
    /// Panics if deserialization fails.
    #[test]
    fn request_from_json() {
        let request: PlacementRequest =
            serde_json::from_str(r#"{"placement": "top-end", "offset_main_axis": 8}"#)
                .expect("valid request json");
        assert_eq!(request.placement, Placement::new(Side::Top, Alignment::End));
        assert!(request.allow_flip);
        assert_eq!(request.strategy, Strategy::Absolute);
    }
}
