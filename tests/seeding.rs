//! Unit-level checks for bracket sizing and the standard seeding layout.

use club_tournament_web::{bracket_size_for, byes_for, seed_positions};

#[test]
fn seed_positions_for_eight_matches() {
    assert_eq!(seed_positions(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
}

#[test]
fn seed_positions_for_small_draws() {
    assert_eq!(seed_positions(1), vec![1]);
    assert_eq!(seed_positions(2), vec![1, 2]);
    assert_eq!(seed_positions(4), vec![1, 4, 2, 3]);
}

#[test]
fn seed_positions_for_sixteen_matches() {
    assert_eq!(
        seed_positions(16),
        vec![1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11]
    );
}

#[test]
fn top_two_seeds_land_in_opposite_halves() {
    for n in [2usize, 4, 8, 16, 32] {
        let positions = seed_positions(n);
        assert!(positions[0] <= n / 2, "seed 1 must be in the top half of {n}");
        assert!(positions[1] > n / 2, "seed 2 must be in the bottom half of {n}");
    }
}

#[test]
fn bracket_sizes_round_up_to_powers_of_two() {
    assert_eq!(bracket_size_for(2), 2);
    assert_eq!(bracket_size_for(3), 4);
    assert_eq!(bracket_size_for(5), 8);
    assert_eq!(bracket_size_for(9), 16);
    assert_eq!(bracket_size_for(16), 16);
}

#[test]
fn byes_fill_the_gap_to_the_bracket_size() {
    assert_eq!(byes_for(5), 3);
    assert_eq!(byes_for(16), 0);
    assert_eq!(byes_for(9), 7);
}
