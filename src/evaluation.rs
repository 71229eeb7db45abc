//! Evaluation normalization
//!
//! The remote service is inconsistent about how it reports per-criterion
//! verdicts: the criterion is sometimes a bare string and sometimes an object
//! with a `description`, and the verdict lives under either `satisfied` or
//! `result` with a vocabulary that mixes yes/no, match/miss and true/false
//! (as strings or JSON booleans). Everything in this module is a pure
//! function that collapses those shapes into the closed [`Verdict`] enum; no
//! raw shape escapes past here.

use crate::types::{CriterionField, Evaluation, Verdict};

/// Criterion text of an evaluation, regardless of wire shape
///
/// Returns the bare string directly, the `description` of the object form,
/// or the empty string when the criterion is absent.
pub fn criterion_text(evaluation: &Evaluation) -> &str {
    match &evaluation.criterion {
        Some(CriterionField::Text(text)) => text,
        Some(CriterionField::Detailed { description }) => description,
        None => "",
    }
}

/// Normalized verdict of an evaluation
///
/// Reads `satisfied` if present, else `result`. The raw value is stringified
/// (JSON booleans become "true"/"false"), trimmed and lower-cased, then
/// mapped: {yes, match, true} → `Match`, {no, miss, false} → `Miss`,
/// anything else (including absent or null) → `Unknown`.
pub fn verdict(evaluation: &Evaluation) -> Verdict {
    let raw = evaluation
        .satisfied
        .as_ref()
        .or(evaluation.result.as_ref());

    let Some(value) = raw else {
        return Verdict::Unknown;
    };

    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => return Verdict::Unknown,
        other => other.to_string(),
    };

    match text.trim().to_lowercase().as_str() {
        "yes" | "match" | "true" => Verdict::Match,
        "no" | "miss" | "false" => Verdict::Miss,
        _ => Verdict::Unknown,
    }
}

/// Find the evaluation matching a requested criterion
///
/// Matching is case-insensitive, whitespace-trimmed equality between the
/// requested string and [`criterion_text`].
pub fn find_evaluation<'a>(
    criterion: &str,
    evaluations: &'a [Evaluation],
) -> Option<&'a Evaluation> {
    let wanted = criterion.trim().to_lowercase();
    evaluations
        .iter()
        .find(|e| criterion_text(e).trim().to_lowercase() == wanted)
}

/// Verdict for a requested criterion, `Unknown` when no evaluation matches
pub fn verdict_for(criterion: &str, evaluations: &[Evaluation]) -> Verdict {
    find_evaluation(criterion, evaluations)
        .map(verdict)
        .unwrap_or(Verdict::Unknown)
}

/// Whether every requested criterion resolves to [`Verdict::Match`]
///
/// An empty criteria list is vacuously true (the request schema forbids it,
/// but this function does not).
pub fn satisfies_all(criteria: &[String], evaluations: &[Evaluation]) -> bool {
    criteria
        .iter()
        .all(|c| verdict_for(c, evaluations) == Verdict::Match)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(value: serde_json::Value) -> Evaluation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn verdict_maps_match_spellings() {
        for spelling in ["Yes", "MATCH", "true"] {
            let e = eval(json!({ "result": spelling }));
            assert_eq!(verdict(&e), Verdict::Match, "spelling {spelling:?}");
        }
        let boolean = eval(json!({ "satisfied": true }));
        assert_eq!(verdict(&boolean), Verdict::Match);
    }

    #[test]
    fn verdict_maps_miss_spellings() {
        for spelling in ["no", "Miss", "FALSE"] {
            let e = eval(json!({ "satisfied": spelling }));
            assert_eq!(verdict(&e), Verdict::Miss, "spelling {spelling:?}");
        }
        let boolean = eval(json!({ "result": false }));
        assert_eq!(verdict(&boolean), Verdict::Miss);
    }

    #[test]
    fn verdict_defaults_to_unknown() {
        assert_eq!(verdict(&eval(json!({}))), Verdict::Unknown);
        assert_eq!(verdict(&eval(json!({ "result": "" }))), Verdict::Unknown);
        assert_eq!(verdict(&eval(json!({ "result": null }))), Verdict::Unknown);
        assert_eq!(
            verdict(&eval(json!({ "result": "maybe" }))),
            Verdict::Unknown
        );
    }

    #[test]
    fn satisfied_takes_precedence_over_result() {
        let e = eval(json!({ "satisfied": "yes", "result": "no" }));
        assert_eq!(verdict(&e), Verdict::Match);
    }

    #[test]
    fn criterion_text_handles_both_shapes() {
        let text = eval(json!({ "criterion": "has an API" }));
        let detailed = eval(json!({ "criterion": { "description": "has an API" } }));
        assert_eq!(criterion_text(&text), "has an API");
        assert_eq!(criterion_text(&detailed), "has an API");
        assert_eq!(criterion_text(&eval(json!({}))), "");
    }

    #[test]
    fn matching_is_case_insensitive_and_trimmed() {
        let evaluations = vec![eval(json!({
            "criterion": { "description": "  Has an API " },
            "result": "Match"
        }))];
        assert_eq!(verdict_for("has an api", &evaluations), Verdict::Match);
        assert_eq!(verdict_for("other thing", &evaluations), Verdict::Unknown);
    }

    #[test]
    fn satisfies_all_requires_every_criterion_to_match() {
        let evaluations = vec![
            eval(json!({ "criterion": "a", "satisfied": "yes" })),
            eval(json!({ "criterion": { "description": "b" }, "result": "Match" })),
        ];
        let both = vec!["a".to_string(), "B".to_string()];
        assert!(satisfies_all(&both, &evaluations));

        let with_missing = vec!["a".to_string(), "c".to_string()];
        assert!(!satisfies_all(&with_missing, &evaluations));
    }

    #[test]
    fn satisfies_all_ignores_evaluation_order_and_shape() {
        let forward = vec![
            eval(json!({ "criterion": "a", "satisfied": "yes" })),
            eval(json!({ "criterion": "b", "result": "true" })),
        ];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();
        let criteria = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            satisfies_all(&criteria, &forward),
            satisfies_all(&criteria, &reversed)
        );
    }

    #[test]
    fn satisfies_all_is_vacuously_true_on_empty_criteria() {
        assert!(satisfies_all(&[], &[]));
    }
}
