//! Renderer collaborator boundary
//!
//! The core hands the renderer declarative data only: a [`Frame`] carrying the
//! reconciled cell diff and the insight summary, plus a [`ColorScale`] mapping
//! scores to colors. Drawing, animation, and tooltip placement stay on the
//! renderer's side.

use crate::error::PulseError;
use crate::reconciler::Reconciliation;
use crate::types::{Cell, FilterState, InsightSummary, Score};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Fill used for cells without a value
pub const NO_DATA_COLOR: Rgb = Rgb(0xe0, 0xe0, 0xe0);

/// Sequential red ramp, lightest to darkest
const REDS: [Rgb; 9] = [
    Rgb(0xff, 0xf5, 0xf0),
    Rgb(0xfe, 0xe0, 0xd2),
    Rgb(0xfc, 0xbb, 0xa1),
    Rgb(0xfc, 0x92, 0x72),
    Rgb(0xfb, 0x6a, 0x4a),
    Rgb(0xef, 0x3b, 0x2c),
    Rgb(0xcb, 0x18, 0x1d),
    Rgb(0xa5, 0x0f, 0x15),
    Rgb(0x67, 0x00, 0x0d),
];

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Score to color mapping over the domain [1, 5]
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<Rgb>,
    empty: Rgb,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::reds()
    }
}

impl ColorScale {
    pub fn reds() -> Self {
        Self {
            stops: REDS.to_vec(),
            empty: NO_DATA_COLOR,
        }
    }

    /// Color at position `t` in [0, 1] along the ramp
    pub fn interpolate(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let segments = (self.stops.len() - 1) as f64;
        let position = t * segments;
        let index = (position.floor() as usize).min(self.stops.len() - 2);
        let local = position - index as f64;

        let (a, b) = (self.stops[index], self.stops[index + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * local).round() as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }

    pub fn color(&self, score: Score) -> Rgb {
        let span = (Score::MAX - Score::MIN) as f64;
        self.interpolate((score.value() - Score::MIN) as f64 / span)
    }

    /// Fill for a cell value, using the no-data color for `None`
    pub fn fill(&self, value: Option<Score>) -> Rgb {
        value.map(|score| self.color(score)).unwrap_or(self.empty)
    }
}

/// Everything the renderer needs after one filter change
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub session_id: Uuid,
    /// Increments once per recomputation, starting at 1 for the first render
    pub sequence: u64,
    pub filter: FilterState,
    pub diff: Reconciliation<Cell>,
    pub insights: InsightSummary,
    pub narrative: String,
}

/// External drawing collaborator
pub trait Renderer {
    /// Apply a reconciled frame
    fn render(&mut self, frame: &Frame, colors: &ColorScale);

    /// Static image of the current render state, typically PNG bytes
    fn snapshot(&self) -> Result<Vec<u8>, PulseError> {
        Err(PulseError::SnapshotUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_endpoints() {
        let scale = ColorScale::reds();
        assert_eq!(scale.fill(Score::new(1)).to_string(), "#fff5f0");
        assert_eq!(scale.fill(Score::new(3)).to_string(), "#fb6a4a");
        assert_eq!(scale.fill(Score::new(5)).to_string(), "#67000d");
        assert_eq!(scale.fill(None).to_string(), "#e0e0e0");
    }

    #[test]
    fn test_scale_darkens_with_score() {
        let scale = ColorScale::reds();
        let reds: Vec<u32> = (1..=5)
            .filter_map(Score::new)
            .map(|s| {
                let c = scale.color(s);
                c.0 as u32 + c.1 as u32 + c.2 as u32
            })
            .collect();
        assert!(reds.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_default_renderer_has_no_snapshot() {
        struct Blind;
        impl Renderer for Blind {
            fn render(&mut self, _frame: &Frame, _colors: &ColorScale) {}
        }
        assert!(matches!(Blind.snapshot(), Err(PulseError::SnapshotUnsupported)));
    }
}
