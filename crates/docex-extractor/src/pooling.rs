//! Cross-page candidate pooling

use docex_domain::FieldCandidate;

/// Pick one candidate among a field's occurrences
///
/// The longer snippet wins; ties go to the earliest page, then to the first
/// occurrence reported.
pub fn pool_occurrences(field_name: &str, occurrences: Vec<FieldCandidate>) -> FieldCandidate {
    occurrences
        .into_iter()
        .filter(FieldCandidate::is_present)
        .enumerate()
        .min_by_key(|(order, c)| {
            let page = c.evidence.as_ref().map(|e| e.page_index).unwrap_or(usize::MAX);
            (std::cmp::Reverse(c.snippet_len()), page, *order)
        })
        .map(|(_, c)| c)
        .unwrap_or_else(|| FieldCandidate::absent(field_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docex_domain::Evidence;
    use proptest::prelude::*;
    use serde_json::json;

    fn occurrence(page: usize, snippet: &str) -> FieldCandidate {
        FieldCandidate::new(
            "total",
            Some(json!(snippet)),
            Some(Evidence {
                page_index: page,
                location_hint: String::new(),
                snippet_text: snippet.to_string(),
            }),
        )
    }

    #[test]
    fn test_longer_snippet_wins() {
        let pooled = pool_occurrences("total", vec![occurrence(0, "Total 5"), occurrence(4, "Total amount 5")]);
        assert_eq!(pooled.evidence.unwrap().page_index, 4);
    }

    #[test]
    fn test_tie_goes_to_earliest_page() {
        let pooled = pool_occurrences("total", vec![occurrence(3, "abc"), occurrence(1, "xyz"), occurrence(2, "def")]);
        assert_eq!(pooled.evidence.unwrap().page_index, 1);
    }

    #[test]
    fn test_empty_is_absent() {
        let pooled = pool_occurrences("total", vec![]);
        assert_eq!(pooled.field_name, "total");
        assert!(!pooled.is_present());
    }

    proptest! {
        #[test]
        fn prop_pooling_ignores_arrival_order(
            mut entries in prop::collection::vec((0usize..5, "[a-z]{1,6}"), 1..6),
            seed in any::<u64>(),
        ) {
            let forward: Vec<_> = entries.iter().map(|(p, s)| occurrence(*p, s)).collect();
            let a = pool_occurrences("total", forward);

            // Deterministic shuffle
            let len = entries.len();
            entries.rotate_left((seed as usize) % len);
            let rotated: Vec<_> = entries.iter().map(|(p, s)| occurrence(*p, s)).collect();
            let b = pool_occurrences("total", rotated);

            let (ea, eb) = (a.evidence.unwrap(), b.evidence.unwrap());
            prop_assert_eq!(ea.snippet_text.len(), eb.snippet_text.len());
            prop_assert_eq!(ea.page_index, eb.page_index);
        }
    }
}
