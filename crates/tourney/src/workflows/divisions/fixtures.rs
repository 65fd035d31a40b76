use super::domain::Match;
use crate::ids::TeamId;

/// Single round-robin over `team_ids` in their stored order.
///
/// Every unordered pair `(i, j)` with `i < j` yields one match with `T[i]` on the `a`
/// side, so `n` teams produce `n * (n - 1) / 2` fixtures and fewer than two produce none.
pub fn round_robin(team_ids: &[TeamId]) -> Vec<Match> {
    let mut matches = Vec::with_capacity(team_ids.len() * team_ids.len().saturating_sub(1) / 2);
    for (index, home) in team_ids.iter().enumerate() {
        for away in &team_ids[index + 1..] {
            matches.push(Match::between(home.clone(), away.clone()));
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn teams(n: usize) -> Vec<TeamId> {
        (1..=n).map(|i| TeamId(format!("T{i}"))).collect()
    }

    #[test]
    fn pairs_every_team_exactly_once() {
        for n in 0..=9 {
            let fixtures = round_robin(&teams(n));
            assert_eq!(fixtures.len(), n * n.saturating_sub(1) / 2, "n = {n}");

            let mut seen = HashSet::new();
            for fixture in &fixtures {
                assert_ne!(fixture.a_team_id, fixture.b_team_id);
                let mut pair = [fixture.a_team_id.clone(), fixture.b_team_id.clone()];
                pair.sort();
                assert!(seen.insert(pair), "duplicate pairing for n = {n}");
            }
        }
    }

    #[test]
    fn follows_insertion_order_not_sorted_order() {
        let order = vec![TeamId::from("T3"), TeamId::from("T1"), TeamId::from("T2")];
        let labels: Vec<(String, String)> = round_robin(&order)
            .into_iter()
            .map(|m| (m.a_team_id.0, m.b_team_id.0))
            .collect();

        assert_eq!(
            labels,
            vec![
                ("T3".to_string(), "T1".to_string()),
                ("T3".to_string(), "T2".to_string()),
                ("T1".to_string(), "T2".to_string()),
            ]
        );
    }

    #[test]
    fn fresh_fixtures_are_unscored_and_unscheduled() {
        let fixtures = round_robin(&teams(2));
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].result(), None);
        assert!(fixtures[0].field.is_empty());
        assert!(fixtures[0].kickoff_at.is_none());
    }
}
