//! Intent selection and template rendering for the local responder

use tracing::debug;

use crate::catalog::{Catalog, QUERY_PLACEHOLDER};
use crate::normalize::{normalize, tokenize};
use crate::scorer::score_all;
use crate::types::{ScoredIntent, Selection};

/// Minimum best score for a specific intent to be chosen
pub const SELECTION_THRESHOLD: f64 = 5.0;

/// Pick the best intent for a normalized query.
///
/// Scans the whole catalog; on ties the earlier intent wins.
pub fn select<'a>(normalized: &str, tokens: &[&str], catalog: &'a Catalog) -> Selection<'a> {
    let scored = score_all(normalized, tokens, catalog.intents());

    let mut best: Option<ScoredIntent<'a>> = None;
    for candidate in scored {
        match best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }

    match best {
        Some(top) if top.score >= SELECTION_THRESHOLD => {
            debug!(intent = %top.intent.id, score = top.score, "local intent selected");
            Selection::Intent(top)
        }
        _ => {
            debug!(best_score = best.map(|b| b.score).unwrap_or(0.0), "no intent above threshold");
            Selection::Fallback { best }
        }
    }
}

/// Template index a selection resolves to
pub fn template_index(selection: &Selection<'_>, catalog: &Catalog) -> usize {
    match selection {
        Selection::Intent(scored) => scored.intent.template_index,
        Selection::Fallback { .. } => catalog.fallback_index(),
    }
}

/// Render the reply text; only the fallback echoes the original query.
pub fn render(selection: &Selection<'_>, catalog: &Catalog, original_query: &str) -> String {
    match selection {
        Selection::Intent(scored) => catalog
            .template(scored.intent.template_index)
            .unwrap_or_else(|| catalog.fallback_template())
            .to_string(),
        Selection::Fallback { .. } => catalog
            .fallback_template()
            .replace(QUERY_PLACEHOLDER, original_query),
    }
}

/// Normalize, score, select and render in one call
pub fn respond_locally<'a>(catalog: &'a Catalog, query: &str) -> (Selection<'a>, String) {
    let normalized = normalize(query);
    let tokens = tokenize(&normalized);
    let selection = select(&normalized, &tokens, catalog);
    let text = render(&selection, catalog, query);
    (selection, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Intent;

    fn two_intents(first: &[&str], second: &[&str]) -> Catalog {
        Catalog::new(
            vec![
                Intent::new("first", first, &[], 0),
                Intent::new("second", second, &[], 1),
            ],
            vec!["one".into(), "two".into(), "fallback {query}".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_selects_highest_score() {
        let catalog = two_intents(&["alpha"], &["beta gamma"]);
        let (selection, text) = respond_locally(&catalog, "beta gamma");
        assert_eq!(selection.intent().unwrap().id, "second");
        assert_eq!(text, "two");
    }

    #[test]
    fn test_tie_prefers_catalog_order() {
        let catalog = two_intents(&["alpha"], &["alpha"]);
        let (selection, _) = respond_locally(&catalog, "alpha");
        assert_eq!(selection.intent().unwrap().id, "first");
    }

    #[test]
    fn test_below_threshold_falls_back() {
        // synonym-only match: 3 + short length bonus stays under 5
        let catalog = Catalog::new(
            vec![Intent::new("weak", &["zzzz"], &["rent"], 0)],
            vec!["weak".into(), "fallback {query}".into()],
        )
        .unwrap();
        let (selection, text) = respond_locally(&catalog, "rent");
        assert!(selection.is_fallback());
        match selection {
            Selection::Fallback { best: Some(best) } => assert!(best.score > 0.0),
            other => panic!("expected fallback with a candidate, got {:?}", other),
        }
        assert_eq!(text, "fallback rent");
        assert_eq!(template_index(&selection, &catalog), 1);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // synonym 3 + length bonus; 20 chars gives exactly 5.0, 19 chars gives 4.9
        let catalog = Catalog::new(
            vec![Intent::new("rent", &["zzzz"], &["rent"], 0)],
            vec!["rent".into(), "fallback {query}".into()],
        )
        .unwrap();

        let at_threshold = format!("rent {}", "a".repeat(15));
        let (selection, text) = respond_locally(&catalog, &at_threshold);
        match selection {
            Selection::Intent(scored) => assert_eq!(scored.score, SELECTION_THRESHOLD),
            other => panic!("expected intent at threshold, got {:?}", other),
        }
        assert_eq!(text, "rent");

        let below = format!("rent {}", "a".repeat(14));
        let (selection, _) = respond_locally(&catalog, &below);
        match selection {
            Selection::Fallback { best: Some(best) } => assert!(best.score < SELECTION_THRESHOLD),
            other => panic!("expected fallback below threshold, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_echoes_original_query() {
        let catalog = two_intents(&["alpha"], &["beta"]);
        let (_, text) = respond_locally(&catalog, "  Xyz?! ");
        assert_eq!(text, "fallback   Xyz?! ");
    }

    #[test]
    fn test_empty_catalog_falls_back() {
        let catalog = Catalog::new(Vec::new(), vec!["only {query}".into()]).unwrap();
        let (selection, text) = respond_locally(&catalog, "anything");
        assert_eq!(selection, Selection::Fallback { best: None });
        assert_eq!(text, "only anything");
    }

    #[test]
    fn test_builtin_employment_contract() {
        let catalog = Catalog::builtin();
        let (selection, text) = respond_locally(catalog, "أريد مراجعة عقد عمل جديد");
        assert_eq!(selection.intent().unwrap().id, "employmentContract");
        assert_eq!(template_index(&selection, catalog), 0);
        assert_eq!(text, catalog.template(0).unwrap());
    }

    #[test]
    fn test_builtin_tenant_rights() {
        let catalog = Catalog::builtin();
        let (selection, _) = respond_locally(catalog, "ما هي حقوق المستأجر؟");
        assert_eq!(selection.intent().unwrap().id, "tenantRights");
        assert_eq!(template_index(&selection, catalog), 1);
    }
}
