//! Reply parsing for the marker-delimited prediction format.
//!
//! A reply must contain the five markers below, in order. Each field is
//! the trimmed text between its marker and the next one; `Reasoning`
//! runs to the end of the reply. There is no partial recovery.

use thiserror::Error;

use crate::types::MatchForecast;

pub const PREDICTION_MARKER: &str = "Prediction: ";
pub const SCORE_MARKER: &str = "Score: ";
pub const CORNERS_MARKER: &str = "Corners: ";
pub const SHOTS_MARKER: &str = "Shots: ";
pub const REASONING_MARKER: &str = "Reasoning: ";

pub const MARKERS: [&str; 5] = [
    PREDICTION_MARKER,
    SCORE_MARKER,
    CORNERS_MARKER,
    SHOTS_MARKER,
    REASONING_MARKER,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("reply is missing the '{marker}' marker")]
    MissingMarker { marker: &'static str },
}

/// Turns a raw model reply into a forecast. Kept behind a trait so a
/// structured-output contract can replace the marker format.
pub trait ReplyParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<MatchForecast, ParseError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerReplyParser;

impl ReplyParser for MarkerReplyParser {
    fn parse(&self, raw: &str) -> Result<MatchForecast, ParseError> {
        parse_reply(raw)
    }
}

pub fn parse_reply(raw: &str) -> Result<MatchForecast, ParseError> {
    // (marker start, value start) per marker, each searched after the last
    let mut spans = [(0usize, 0usize); 5];
    let mut from = 0;
    for (span, marker) in spans.iter_mut().zip(MARKERS) {
        let at = raw[from..]
            .find(marker)
            .map(|p| p + from)
            .ok_or(ParseError::MissingMarker { marker })?;
        *span = (at, at + marker.len());
        from = span.1;
    }

    let field = |i: usize| {
        let end = spans.get(i + 1).map_or(raw.len(), |next| next.0);
        raw[spans[i].1..end].trim().to_string()
    };

    Ok(MatchForecast {
        winner: field(0),
        score: field(1),
        corners: field(2),
        shots: field(3),
        reasoning: field(4),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
