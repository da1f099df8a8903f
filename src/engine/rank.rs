// src/engine/rank.rs

/// Rank from a strict-greater population count: 1 plus the number of
/// active users holding strictly more points. Tied users therefore share
/// a rank number and the next distinct total skips ranks.
pub fn rank_from_count(strictly_above: i64) -> i64 {
    strictly_above + 1
}

/// Assigns rank numbers to a points-descending listing using the same
/// strict-greater rule. For a listing that starts at the top of the
/// population, an entry's strict-greater count equals the number of
/// earlier entries with a larger value, so ranks computed per page agree
/// with the global formula.
pub fn assign_ranks(points_desc: &[i64]) -> Vec<i64> {
    let mut ranks = Vec::with_capacity(points_desc.len());
    for (index, points) in points_desc.iter().enumerate() {
        if index > 0 && *points == points_desc[index - 1] {
            let prev = ranks[index - 1];
            ranks.push(prev);
        } else {
            ranks.push(index as i64 + 1);
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_is_one_plus_strictly_greater() {
        assert_eq!(rank_from_count(0), 1);
        assert_eq!(rank_from_count(7), 8);
    }

    #[test]
    fn distinct_totals_rank_sequentially() {
        assert_eq!(assign_ranks(&[900, 500, 100]), vec![1, 2, 3]);
    }

    #[test]
    fn ties_share_a_rank_and_the_next_total_skips() {
        // Two users tied at rank 2; the next distinct total is rank 4.
        assert_eq!(assign_ranks(&[900, 500, 500, 100]), vec![1, 2, 2, 4]);
        // Three-way tie at the top.
        assert_eq!(assign_ranks(&[500, 500, 500, 10]), vec![1, 1, 1, 4]);
    }

    #[test]
    fn empty_listing_yields_no_ranks() {
        assert!(assign_ranks(&[]).is_empty());
    }

    #[test]
    fn top_rank_holds_the_maximum() {
        let points = [800, 800, 750, 0];
        let ranks = assign_ranks(&points);
        assert_eq!(ranks[0], 1);
        assert!(points.iter().all(|p| *p <= points[0]));
    }
}
