//! Edit-boundary normalization for score input.
//!
//! Blank, non-numeric and fractional input means "unset"; negative numbers clamp to zero and
//! anything above [`MAX_SCORE`] is treated as a typo and left unset.
//! Everything past this boundary deals only in `Option<u32>`.

use serde_json::Value;

/// Largest goal count accepted for one side of a match.
pub const MAX_SCORE: u32 = 999;

pub fn parse_score(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(whole) = raw.parse::<i64>() {
        return clamp(whole);
    }
    match raw.parse::<f64>() {
        Ok(number) if number.is_finite() && number.fract() == 0.0 => clamp(number as i64),
        _ => None,
    }
}

pub fn score_from_json(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(whole) => clamp(whole),
            None => number
                .as_f64()
                .filter(|n| n.is_finite() && n.fract() == 0.0)
                .and_then(|n| clamp(n as i64)),
        },
        Value::String(text) => parse_score(text),
        _ => None,
    }
}

fn clamp(value: i64) -> Option<u32> {
    if value < 0 {
        return Some(0);
    }
    u32::try_from(value).ok().filter(|score| *score <= MAX_SCORE)
}
