// Score Normalizer - untrusted score → CredibilityScore
//
// Safety boundary between free-form upstream output (an AI judge's JSON,
// provider payloads) and the fusion policy. Never fails.

use super::CredibilityScore;
use serde_json::Value;

/// Raw score as received from an upstream source
#[derive(Debug, Clone, PartialEq)]
pub enum RawScore {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl From<&Value> for RawScore {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawScore::Integer(i),
                None => n.as_f64().map(RawScore::Float).unwrap_or(RawScore::Missing),
            },
            Value::String(s) => RawScore::Text(s.clone()),
            _ => RawScore::Missing,
        }
    }
}

impl From<Option<&Value>> for RawScore {
    fn from(value: Option<&Value>) -> Self {
        value.map(RawScore::from).unwrap_or(RawScore::Missing)
    }
}

impl From<&str> for RawScore {
    fn from(text: &str) -> Self {
        RawScore::Text(text.to_string())
    }
}

/// Coerce any raw score into 0..=100
///
/// - numbers are clamped; floats round to nearest first, the same rule
///   `CredibilityScore::from_f64` applies to detector confidences
/// - text yields its first run of ASCII digits, clamped
/// - anything else, including text without digits, is 50
pub fn normalize_score(raw: impl Into<RawScore>) -> CredibilityScore {
    match raw.into() {
        RawScore::Integer(i) => CredibilityScore::new(i),
        RawScore::Float(f) => CredibilityScore::from_f64(f),
        RawScore::Text(text) => first_digit_run(&text)
            .map(|digits| {
                // A run too long for i64 is certainly above the ceiling
                digits
                    .parse::<i64>()
                    .map(CredibilityScore::new)
                    .unwrap_or(CredibilityScore::MAX)
            })
            .unwrap_or(CredibilityScore::NEUTRAL),
        RawScore::Missing => CredibilityScore::NEUTRAL,
    }
}

fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_clamp() {
        assert_eq!(normalize_score(RawScore::Integer(72)).value(), 72);
        assert_eq!(normalize_score(RawScore::Integer(-3)).value(), 0);
        assert_eq!(normalize_score(RawScore::Integer(140)).value(), 100);
        assert_eq!(normalize_score(RawScore::Integer(0)).value(), 0);
        assert_eq!(normalize_score(RawScore::Integer(100)).value(), 100);
    }

    #[test]
    fn test_floats_round() {
        assert_eq!(normalize_score(RawScore::Float(87.9)).value(), 88);
        assert_eq!(normalize_score(RawScore::Float(85.4)).value(), 85);
        assert_eq!(normalize_score(RawScore::Float(-0.5)).value(), 0);
        assert_eq!(normalize_score(RawScore::Float(1e12)).value(), 100);
        assert_eq!(normalize_score(RawScore::Float(f64::NEG_INFINITY)).value(), 0);
        assert_eq!(normalize_score(RawScore::Float(f64::NAN)).value(), 50);
    }

    #[test]
    fn test_float_rule_matches_detector_confidence() {
        for raw in [85.6, 14.5, 0.29 * 100.0, 99.49] {
            assert_eq!(
                normalize_score(RawScore::Float(raw)),
                CredibilityScore::from_f64(raw)
            );
        }
        assert_eq!(normalize_score(RawScore::Float(0.29 * 100.0)).value(), 29);
    }

    #[test]
    fn test_text_with_embedded_number() {
        assert_eq!(normalize_score("85").value(), 85);
        assert_eq!(normalize_score("Score: 15/100").value(), 15);
        assert_eq!(normalize_score("about 250 percent").value(), 100);
        assert_eq!(normalize_score("-20").value(), 20);
        assert_eq!(normalize_score("99999999999999999999999").value(), 100);
    }

    #[test]
    fn test_unparsable_is_neutral() {
        assert_eq!(normalize_score("high").value(), 50);
        assert_eq!(normalize_score("").value(), 50);
        assert_eq!(normalize_score(RawScore::Missing).value(), 50);
    }

    #[test]
    fn test_json_values() {
        assert_eq!(normalize_score(&json!(64)).value(), 64);
        assert_eq!(normalize_score(&json!(12.7)).value(), 12);
        assert_eq!(normalize_score(&json!("90%")).value(), 90);
        assert_eq!(normalize_score(&json!(null)).value(), 50);
        assert_eq!(normalize_score(&json!(true)).value(), 50);
        assert_eq!(normalize_score(&json!({"value": 10})).value(), 50);
        assert_eq!(normalize_score(None::<&Value>).value(), 50);
    }

    #[test]
    fn test_always_in_range() {
        let inputs: Vec<RawScore> = vec![
            RawScore::Integer(i64::MIN),
            RawScore::Integer(i64::MAX),
            RawScore::Float(f64::NEG_INFINITY),
            RawScore::Float(f64::INFINITY),
            RawScore::Text("٣٤ arabic-indic digits".to_string()),
            RawScore::Text("mixed 7 and 300".to_string()),
        ];
        for raw in inputs {
            let score = normalize_score(raw).value();
            assert!(score <= 100);
        }
    }
}
