use crate::model::pair::TranslationPair;

/// Zip English and Arabic rows position by position.
///
/// The shorter side decides the length; surplus rows on the longer side are dropped.
pub fn build_pairs(source_rows: &[String], candidate_rows: &[String]) -> Vec<TranslationPair> {
    let n = source_rows.len().min(candidate_rows.len());

    if source_rows.len() != candidate_rows.len() {
        tracing::debug!(
            "row counts differ ({} english, {} arabic); keeping {n}",
            source_rows.len(),
            candidate_rows.len()
        );
    }

    source_rows
        .iter()
        .zip(candidate_rows)
        .enumerate()
        .map(|(id, (en, ar))| TranslationPair::new(id, en.as_str(), ar.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rows(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pairs_positionally() {
        let pairs = build_pairs(&rows(&["hello", "world"]), &rows(&["مرحبا", "عالم"]));

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].id, 1);
        assert_eq!(pairs[1].source, "world");
        assert_eq!(pairs[1].candidate, "عالم");
        assert!(pairs.iter().all(|p| !p.verified && p.corrected.is_empty()));
    }

    #[test]
    fn truncates_to_shorter_side() {
        let pairs = build_pairs(&rows(&["a", "b", "c"]), &rows(&["x"]));
        assert_eq!(pairs.len(), 1);
        assert!(build_pairs(&[], &rows(&["x"])).is_empty());
    }

    proptest! {
        #[test]
        fn length_is_min_and_cells_line_up(
            a in proptest::collection::vec(".{0,12}", 0..40),
            b in proptest::collection::vec(".{0,12}", 0..40),
        ) {
            let pairs = build_pairs(&a, &b);
            prop_assert_eq!(pairs.len(), a.len().min(b.len()));
            for (i, pair) in pairs.iter().enumerate() {
                prop_assert_eq!(pair.id, i);
                prop_assert_eq!(&pair.source, &a[i]);
                prop_assert_eq!(&pair.candidate, &b[i]);
            }
            prop_assert_eq!(pairs, build_pairs(&a, &b));
        }
    }
}
