//! Integration tests for elimination draw generation: seeding, byes,
//! bracket tree shape, and advancement links.

use club_tournament_web::{
    generate_draw, round_name, BracketMatch, BracketType, Category, DrawError, DrawFormat,
    MatchStatus, NextSlot, Slot, SlotSide, WALKOVER,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn category_with_players(n: usize, seeds: usize) -> Category {
    let mut c = Category::new("Open");
    for i in 0..n {
        let seed = if i < seeds { Some(i as u32 + 1) } else { None };
        c.add_registration(format!("P{i}"), seed).unwrap();
    }
    c
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn main_matches_at_round(c: &Category, round: u32) -> Vec<&BracketMatch> {
    let main = c.main_bracket().unwrap().id;
    let mut matches: Vec<&BracketMatch> = c
        .matches
        .iter()
        .filter(|m| m.bracket_id == main && m.round == round)
        .collect();
    matches.sort_by_key(|m| m.position);
    matches
}

#[test]
fn five_players_two_seeds_byes_protect_seeds() {
    let mut c = category_with_players(5, 2);
    generate_draw(&mut c, &mut rng()).unwrap();

    let seeded_ids: Vec<_> = c
        .registrations
        .iter()
        .filter(|r| r.seed.is_some())
        .map(|r| r.id)
        .collect();
    assert_eq!(seeded_ids.len(), 2);

    let first_round = main_matches_at_round(&c, 4);
    assert_eq!(first_round.len(), 4);

    // Both seeded players sit in a bye match, pre-completed as a walkover.
    for &seed_id in &seeded_ids {
        let m = first_round
            .iter()
            .find(|m| m.slot1.player() == Some(seed_id))
            .expect("seeded player must occupy slot one of a first-round match");
        assert_eq!(m.slot2, Slot::Bye);
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner_id, Some(seed_id));
        assert_eq!(m.score_summary.as_deref(), Some(WALKOVER));
    }

    // Three byes total: two on the seeds, one more on an unseeded match.
    let bye_matches = first_round.iter().filter(|m| m.slot2 == Slot::Bye).count();
    assert_eq!(bye_matches, 3);

    // The remaining match pairs two real players.
    let contested = first_round
        .iter()
        .find(|m| m.slot1.is_occupied() && m.slot2.is_occupied())
        .expect("one contested first-round match");
    assert_eq!(contested.status, MatchStatus::Pending);
}

#[test]
fn walkover_cascade_advances_bye_winners() {
    let mut c = category_with_players(5, 2);
    generate_draw(&mut c, &mut rng()).unwrap();

    let seed1 = c.registrations.iter().find(|r| r.seed == Some(1)).unwrap().id;
    let seed2 = c.registrations.iter().find(|r| r.seed == Some(2)).unwrap().id;

    // Seed 1 sits at position 1, seed 2 at position 4; their bye wins carry
    // them straight into the semifinals.
    let semis = main_matches_at_round(&c, 2);
    assert_eq!(semis[0].slot1, Slot::Occupied(seed1));
    assert_eq!(semis[1].slot2, Slot::Occupied(seed2));
    // The third bye winner fills the other semifinal slot.
    assert!(semis[1].slot1.is_occupied());
    // The contested match's winner is still outstanding.
    assert!(matches!(semis[0].slot2, Slot::AwaitingFeeder(_)));

    // Places 5-8: three of the four feeding losers are phantoms, so one
    // semifinal there is dead (both byes) and stays pending with no winner.
    let places58 = c.bracket_by_range(5, 8).unwrap().id;
    let dead = c
        .matches
        .iter()
        .find(|m| m.bracket_id == places58 && m.slot1 == Slot::Bye && m.slot2 == Slot::Bye)
        .expect("a dead classification match");
    assert_eq!(dead.status, MatchStatus::Pending);
    assert_eq!(dead.winner_id, None);

    // The phantom cascades into the classification final as well.
    let places58_final = c
        .matches
        .iter()
        .find(|m| m.bracket_id == places58 && m.round == 1)
        .unwrap();
    assert_eq!(places58_final.slot2, Slot::Bye);
}

#[test]
fn eight_players_build_the_full_classification_tree() {
    let mut c = category_with_players(8, 0);
    generate_draw(&mut c, &mut rng()).unwrap();

    let mut ranges: Vec<(u32, u32)> = c
        .brackets
        .iter()
        .map(|b| (b.range_start, b.range_end))
        .collect();
    ranges.sort();
    assert_eq!(ranges, vec![(1, 8), (3, 4), (5, 8), (7, 8)]);

    let main = c.main_bracket().unwrap();
    assert_eq!(main.bracket_type, BracketType::Main);
    assert_eq!(main.consolation_level, 0);
    assert_eq!(main.name, "Main Draw");

    let places58 = c.bracket_by_range(5, 8).unwrap();
    assert_eq!(places58.bracket_type, BracketType::Classification);
    assert_eq!(places58.consolation_level, 5);
    assert_eq!(places58.name, "Places 5-8");

    // 7 main + 1 + 3 + 1 classification matches.
    assert_eq!(c.matches.len(), 12);
    // No byes: nothing is pre-completed.
    assert!(c.matches.iter().all(|m| m.status == MatchStatus::Pending));
}

#[test]
fn sixteen_players_build_eight_brackets() {
    let mut c = category_with_players(16, 4);
    generate_draw(&mut c, &mut rng()).unwrap();

    assert_eq!(c.brackets.len(), 8);
    assert_eq!(c.matches.len(), 32);

    let mut ranges: Vec<(u32, u32)> = c
        .brackets
        .iter()
        .map(|b| (b.range_start, b.range_end))
        .collect();
    ranges.sort();
    assert_eq!(
        ranges,
        vec![
            (1, 16),
            (3, 4),
            (5, 8),
            (7, 8),
            (9, 16),
            (11, 12),
            (13, 16),
            (15, 16)
        ]
    );
}

#[test]
fn every_fed_slot_has_exactly_one_feeder() {
    let mut c = category_with_players(16, 4);
    generate_draw(&mut c, &mut rng()).unwrap();

    for m in &c.matches {
        for side in [SlotSide::One, SlotSide::Two] {
            let target = NextSlot {
                match_id: m.id,
                side,
            };
            let feeders: Vec<_> = c
                .matches
                .iter()
                .filter(|f| f.winner_next == Some(target) || f.loser_next == Some(target))
                .collect();
            match m.slot(side) {
                Slot::AwaitingFeeder(feeder_id) => {
                    assert_eq!(feeders.len(), 1, "fed slot must have a unique feeder");
                    assert_eq!(feeders[0].id, *feeder_id);
                }
                _ => assert!(feeders.is_empty(), "first-round slots have no feeder"),
            }
        }
    }
}

#[test]
fn winner_links_follow_round_and_parity() {
    let mut c = category_with_players(8, 0);
    generate_draw(&mut c, &mut rng()).unwrap();

    let main = c.main_bracket().unwrap().id;
    for m in c.matches.iter().filter(|m| m.bracket_id == main && m.round > 1) {
        let next = m.winner_next.expect("non-final matches advance their winner");
        let target = c.bracket_match(next.match_id).unwrap();
        assert_eq!(target.bracket_id, main);
        assert_eq!(target.round, m.round / 2);
        assert_eq!(target.position, m.position.div_ceil(2));
        let expected_side = if m.position % 2 == 1 {
            SlotSide::One
        } else {
            SlotSide::Two
        };
        assert_eq!(next.side, expected_side);
    }

    // The grand final has no downstream consumer.
    let grand_final = c
        .matches
        .iter()
        .find(|m| m.bracket_id == main && m.round == 1)
        .unwrap();
    assert_eq!(grand_final.winner_next, None);
    assert_eq!(grand_final.loser_next, None);
}

#[test]
fn bracket_matches_list_outer_rounds_first() {
    let mut c = category_with_players(8, 0);
    generate_draw(&mut c, &mut rng()).unwrap();

    let main = c.main_bracket().unwrap().id;
    let ordered = c.bracket_matches(main);
    let coordinates: Vec<(u32, u32)> = ordered.iter().map(|m| (m.round, m.position)).collect();
    assert_eq!(
        coordinates,
        vec![(4, 1), (4, 2), (4, 3), (4, 4), (2, 1), (2, 2), (1, 1)]
    );

    assert_eq!(round_name(4), "Quarterfinals");
    assert_eq!(round_name(2), "Semifinals");
    assert_eq!(round_name(1), "Final");
    assert_eq!(round_name(32), "Round of 64");
}

#[test]
fn regeneration_replaces_prior_state() {
    let mut c = category_with_players(8, 2);
    generate_draw(&mut c, &mut rng()).unwrap();
    assert!(!c.brackets.is_empty());
    assert!(c.draw_generated_at.is_some());

    c.config.format = DrawFormat::Groups;
    generate_draw(&mut c, &mut rng()).unwrap();
    assert!(c.brackets.is_empty());
    assert!(c.matches.is_empty());
    assert_eq!(c.groups.len(), 2);

    c.config.format = DrawFormat::Elimination;
    generate_draw(&mut c, &mut rng()).unwrap();
    assert!(c.groups.is_empty());
    assert!(c.group_matches.is_empty());
    assert_eq!(c.matches.len(), 12);
}

#[test]
fn too_few_players_are_rejected_before_any_writes() {
    let mut c = category_with_players(1, 0);
    assert_eq!(
        generate_draw(&mut c, &mut rng()),
        Err(DrawError::InsufficientPlayers {
            required: 2,
            actual: 1
        })
    );
    assert!(c.brackets.is_empty());
    assert!(c.draw_generated_at.is_none());

    let mut c = category_with_players(2, 0);
    c.config.format = DrawFormat::Groups;
    assert_eq!(
        generate_draw(&mut c, &mut rng()),
        Err(DrawError::InsufficientPlayers {
            required: 3,
            actual: 2
        })
    );
}

#[test]
fn generation_is_deterministic_under_a_seeded_rng() {
    let base = category_with_players(11, 3);
    let mut first = base.clone();
    let mut second = base.clone();
    generate_draw(&mut first, &mut StdRng::seed_from_u64(42)).unwrap();
    generate_draw(&mut second, &mut StdRng::seed_from_u64(42)).unwrap();

    let occupants = |c: &Category| {
        let main = c.main_bracket().unwrap().id;
        let mut rows: Vec<_> = c
            .matches
            .iter()
            .filter(|m| m.bracket_id == main)
            .map(|m| (m.round, m.position, m.slot1.player(), m.slot2.player()))
            .collect();
        rows.sort();
        rows
    };
    assert_eq!(occupants(&first), occupants(&second));
}
