//! Prompt template for match prediction.
//!
//! The reply format requested here is the contract `parser` enforces; the
//! two must change together.

use crate::types::PredictionRequest;

const PREDICTION_TEMPLATE: &str = "\
Analyze this club football match data and predict the outcome. Your response MUST use this exact format:

Prediction: [Team Name or Draw]
Score: [e.g., 2-1]
Corners: [Total, e.g., 8-12]
Shots: [Total, e.g., 15-20]
Reasoning: [Brief explanation, 2-4 sentences]

Teams: {team1} vs {team2}
Statistics: {stats}
";

/// Fill the three placeholders of the prediction template.
pub fn build_prompt(request: &PredictionRequest) -> String {
    render(PREDICTION_TEMPLATE, |name| match name {
        "team1" => Some(request.team1.as_str()),
        "team2" => Some(request.team2.as_str()),
        "stats" => Some(request.stats_summary.as_str()),
        _ => None,
    })
}

/// One left-to-right pass over `template`. Substituted values are never
/// scanned again; unknown `{name}` runs are kept verbatim.
fn render<'a>(template: &str, value: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail.find('}').and_then(|close| value(&tail[1..close]).map(|v| (close, v))) {
            Some((close, v)) => {
                out.push_str(v);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
