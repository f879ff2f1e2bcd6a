//! Seed placement for the first round of an automatic bracket.

/// For an arity `n = 4 * r`, returns `r` groups of four seed indices
/// (0-based), one group per first-round match: match `m` hosts seeds
/// `{m, 2r-1-m, 2r+m, 4r-1-m}`.
///
/// This is the "reverse bracket" pattern: the strongest seed in each match
/// is paired with three seeds drawn so that, assuming seeds win in order,
/// the two top seeds only meet in the final.
pub fn first_round_seeding(arity: usize) -> Vec<[usize; 4]> {
    assert!(arity % 4 == 0 && arity > 0, "arity must be a positive multiple of 4");
    let r = arity / 4;
    (0..r)
        .map(|m| [m, 2 * r - 1 - m, 2 * r + m, 4 * r - 1 - m])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_four_is_a_single_match() {
        assert_eq!(first_round_seeding(4), vec![[0, 1, 2, 3]]);
    }

    #[test]
    fn arity_eight_spreads_top_seeds_across_matches() {
        // r = 2: m=0 -> {0,3,4,7}; m=1 -> {1,2,5,6}
        assert_eq!(first_round_seeding(8), vec![[0, 3, 4, 7], [1, 2, 5, 6]]);
    }

    #[test]
    fn every_seed_appears_exactly_once() {
        let groups = first_round_seeding(16);
        let mut seen: Vec<usize> = groups.into_iter().flatten().collect();
        seen.sort();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());
    }
}
