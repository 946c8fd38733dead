//! Deterministic winner selection among scored candidates.

use super::{MatchConfig, ScoredCandidate};

/// Selection order: lower priority rank, then higher score (compared in
/// epsilon-wide buckets), then lexical IPN ascending. Returns the winner
/// and up to `config.alternates` next-best distinct parts.
pub(crate) fn select(
    mut candidates: Vec<ScoredCandidate>,
    config: &MatchConfig,
) -> (ScoredCandidate, Vec<ScoredCandidate>) {
    let bucket = config.score_epsilon.max(1);
    candidates.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| (b.score / bucket).cmp(&(a.score / bucket)))
            .then_with(|| a.ipn.cmp(&b.ipn))
    });

    let mut iter = candidates.into_iter();
    let best = iter.next().expect("select requires at least one candidate");

    // Sourcing alternates of the winner share its IPN and are not
    // diagnostic alternates; dedupe by IPN in selection order.
    let mut seen = vec![best.ipn.clone()];
    let mut alternates = Vec::new();
    for candidate in iter {
        if alternates.len() >= config.alternates {
            break;
        }
        if seen.contains(&candidate.ipn) {
            continue;
        }
        seen.push(candidate.ipn.clone());
        alternates.push(candidate);
    }

    (best, alternates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(ipn: &str, priority: u32, score: i64) -> ScoredCandidate {
        ScoredCandidate {
            ipn: ipn.to_string(),
            priority,
            score,
        }
    }

    #[test]
    fn test_rank_before_score() {
        let (best, _) = select(
            vec![candidate("A", 2, 500), candidate("B", 1, 10)],
            &MatchConfig::default(),
        );
        assert_eq!(best.ipn, "B");
    }

    #[test]
    fn test_score_within_rank() {
        let (best, alts) = select(
            vec![candidate("A", 1, 50), candidate("B", 1, 170)],
            &MatchConfig::default(),
        );
        assert_eq!(best.ipn, "B");
        assert_eq!(alts.len(), 1);
    }

    #[test]
    fn test_epsilon_equal_scores_fall_to_ipn() {
        // 100 and 102 land in the same 5-wide bucket; IPN decides.
        let (best, _) = select(
            vec![candidate("ZZZ", 1, 102), candidate("AAA", 1, 100)],
            &MatchConfig::default(),
        );
        assert_eq!(best.ipn, "AAA");
    }

    #[test]
    fn test_alternate_cap() {
        let (_, alts) = select(
            vec![
                candidate("A", 1, 100),
                candidate("B", 2, 90),
                candidate("C", 3, 80),
                candidate("D", 4, 70),
            ],
            &MatchConfig::default(),
        );
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].ipn, "B");
        assert_eq!(alts[1].ipn, "C");
    }
}
