//! Draw generation: bracket tree, seeding, byes, advancement links.

use crate::logic::advancement::{self, AdvanceTask};
use crate::logic::groups;
use crate::logic::seeding::{bracket_size_for, seed_positions};
use crate::models::{
    Bracket, BracketId, BracketMatch, BracketType, Category, DrawError, DrawFormat, MatchId,
    MatchStatus, NextSlot, Registration, Slot, SlotSide, WALKOVER,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

/// Generate the draw for a category: destroys any previous brackets or
/// groups, then builds either the elimination tree or the group phase.
/// Randomness (unseeded placement, group assignment) comes from `rng`.
pub fn generate_draw(category: &mut Category, rng: &mut impl Rng) -> Result<(), DrawError> {
    let actual = category.registrations.len();
    let required = match category.config.format {
        DrawFormat::Elimination => 2,
        DrawFormat::Groups => 3,
    };
    if actual < required {
        return Err(DrawError::InsufficientPlayers { required, actual });
    }

    category.clear_draw();
    category.draw_generated_at = Some(Utc::now());

    match category.config.format {
        DrawFormat::Elimination => generate_elimination_draw(category, rng),
        DrawFormat::Groups => groups::generate_group_phase(category, rng),
    }
}

/// Display name for a round by its match count.
pub fn round_name(round: u32) -> String {
    match round {
        1 => "Final".to_string(),
        2 => "Semifinals".to_string(),
        4 => "Quarterfinals".to_string(),
        8 => "Round of 16".to_string(),
        16 => "Round of 32".to_string(),
        _ => format!("Round of {}", round * 2),
    }
}

fn generate_elimination_draw(category: &mut Category, rng: &mut impl Rng) -> Result<(), DrawError> {
    let num_players = category.registrations.len();
    let bracket_size = bracket_size_for(num_players);
    let first_round = bracket_size / 2;
    let num_byes = bracket_size - num_players;

    log::info!(
        "generating draw for '{}': {} players, bracket size {}, {} byes",
        category.name,
        num_players,
        bracket_size,
        num_byes
    );

    let assignments = plan_first_round(&category.registrations, first_round, num_byes, rng);

    for (i, &(start, end)) in classification_ranges(bracket_size).iter().enumerate() {
        let main = i == 0;
        category.brackets.push(Bracket {
            id: Uuid::new_v4(),
            bracket_type: if main {
                BracketType::Main
            } else {
                BracketType::Classification
            },
            name: if main {
                "Main Draw".to_string()
            } else {
                format!("Places {}-{}", start, end)
            },
            consolation_level: if main { 0 } else { start },
            range_start: start,
            range_end: end,
        });
    }

    create_matches(category, &assignments);
    link_matches(category);
    cascade_walkovers(category)
}

/// First-round layout for the main bracket: seeds at their standard
/// positions in slot one, byes reserved against the top seeds, shuffled
/// unseeded players everywhere else. Slots still open at the end are byes
/// (there were more byes than seeded matches).
fn plan_first_round(
    registrations: &[Registration],
    first_round: usize,
    num_byes: usize,
    rng: &mut impl Rng,
) -> Vec<(Slot, Slot)> {
    let positions = seed_positions(first_round);

    let mut seeded: Vec<&Registration> = registrations.iter().filter(|r| r.is_seeded()).collect();
    seeded.sort_by_key(|r| r.seed.unwrap_or(u32::MAX));
    let mut unseeded: Vec<&Registration> =
        registrations.iter().filter(|r| !r.is_seeded()).collect();
    unseeded.shuffle(rng);

    let mut slots = vec![(Slot::Undetermined, Slot::Undetermined); first_round];

    for (rank, reg) in seeded.iter().enumerate().take(positions.len()) {
        slots[positions[rank] - 1].0 = Slot::Occupied(reg.id);
    }

    // Byes go to the open side of seeded matches, best seeds first.
    let mut byes_assigned = 0;
    for &pos in &positions {
        if byes_assigned >= num_byes {
            break;
        }
        let m = &mut slots[pos - 1];
        if m.0.is_occupied() && m.1 == Slot::Undetermined {
            m.1 = Slot::Bye;
            byes_assigned += 1;
        }
    }

    // Unseeded players fill the remaining slot ones, then slot twos, in
    // match order.
    let mut next = unseeded.into_iter();
    for m in slots.iter_mut() {
        if m.0 == Slot::Undetermined {
            match next.next() {
                Some(r) => m.0 = Slot::Occupied(r.id),
                None => break,
            }
        }
    }
    for m in slots.iter_mut() {
        if m.1 == Slot::Undetermined {
            match next.next() {
                Some(r) => m.1 = Slot::Occupied(r.id),
                None => break,
            }
        }
    }
    for m in slots.iter_mut() {
        if m.0 == Slot::Undetermined {
            m.0 = Slot::Bye;
        }
        if m.1 == Slot::Undetermined {
            m.1 = Slot::Bye;
        }
    }

    slots
}

/// Placement ranges needing a bracket, breadth-first from the full draw.
/// A range of size S >= 4 spawns, for each power of two r up to S/2, the
/// bracket deciding places `[start+r, start+2r-1]` (fed by the losers of its
/// round of r matches). A range of size 2 is a single placement match.
fn classification_ranges(bracket_size: usize) -> Vec<(u32, u32)> {
    let mut seen = HashSet::new();
    let mut ranges = Vec::new();
    let mut queue = VecDeque::from([(1u32, bracket_size as u32)]);

    while let Some((start, end)) = queue.pop_front() {
        if !seen.insert((start, end)) {
            continue;
        }
        ranges.push((start, end));

        let size = end - start + 1;
        if size >= 4 {
            let mut r = 2;
            while r <= size / 2 {
                queue.push_back((start + r, start + 2 * r - 1));
                r *= 2;
            }
        }
    }
    ranges
}

/// Create the full match grid for every bracket. The main bracket's first
/// round takes the planned assignments; matches with a lone player complete
/// immediately as walkovers.
fn create_matches(category: &mut Category, assignments: &[(Slot, Slot)]) {
    let brackets: Vec<(BracketId, BracketType, u32)> = category
        .brackets
        .iter()
        .map(|b| (b.id, b.bracket_type, b.size()))
        .collect();
    let main_first_round = assignments.len() as u32;

    for (bracket_id, bracket_type, size) in brackets {
        let mut round = size / 2;
        while round >= 1 {
            for position in 1..=round {
                let mut m = BracketMatch::new(bracket_id, round, position);
                if bracket_type == BracketType::Main && round == main_first_round {
                    let (s1, s2) = assignments[(position - 1) as usize];
                    m.slot1 = s1;
                    m.slot2 = s2;
                    if let (Some(w), None) | (None, Some(w)) = (s1.player(), s2.player()) {
                        m.winner_id = Some(w);
                        m.status = MatchStatus::Completed;
                        m.score_summary = Some(WALKOVER.to_string());
                    }
                }
                category.matches.push(m);
            }
            round /= 2;
        }
    }
}

/// Compute the static advancement links and tag every fed slot with its
/// feeder. Winners stay in their bracket (round r -> r/2, position
/// ceil(p/2), side by parity); losers of round r drop into the bracket
/// covering `[start+r, start+2r-1]` at the same coordinates.
fn link_matches(category: &mut Category) {
    let index: HashMap<(BracketId, u32, u32), MatchId> = category
        .matches
        .iter()
        .map(|m| ((m.bracket_id, m.round, m.position), m.id))
        .collect();
    let range_of: HashMap<BracketId, u32> = category
        .brackets
        .iter()
        .map(|b| (b.id, b.range_start))
        .collect();
    let bracket_by_range: HashMap<(u32, u32), BracketId> = category
        .brackets
        .iter()
        .map(|b| ((b.range_start, b.range_end), b.id))
        .collect();

    // (target, side, feeder)
    let mut feeders: Vec<(MatchId, SlotSide, MatchId)> = Vec::new();

    for m in category.matches.iter_mut() {
        if m.round <= 1 {
            continue;
        }
        let next_round = m.round / 2;
        let next_position = m.position.div_ceil(2);
        let side = SlotSide::from_position(m.position);

        if let Some(&target) = index.get(&(m.bracket_id, next_round, next_position)) {
            m.winner_next = Some(NextSlot {
                match_id: target,
                side,
            });
            feeders.push((target, side, m.id));
        }

        if let Some(&start) = range_of.get(&m.bracket_id) {
            let loser_range = (start + m.round, start + 2 * m.round - 1);
            if let Some(&loser_bracket) = bracket_by_range.get(&loser_range) {
                if let Some(&target) = index.get(&(loser_bracket, next_round, next_position)) {
                    m.loser_next = Some(NextSlot {
                        match_id: target,
                        side,
                    });
                    feeders.push((target, side, m.id));
                }
            }
        }
    }

    for (target, side, feeder) in feeders {
        if let Some(t) = category.bracket_match_mut(target) {
            *t.slot_mut(side) = Slot::AwaitingFeeder(feeder);
        }
    }
}

/// Push the pre-completed first-round walkovers through the links: winners
/// advance, phantom losers cascade into the classification brackets.
fn cascade_walkovers(category: &mut Category) -> Result<(), DrawError> {
    let mut tasks = Vec::new();
    for m in &category.matches {
        if m.status != MatchStatus::Completed {
            continue;
        }
        if let (Some(next), Some(winner)) = (m.winner_next, m.winner_id) {
            tasks.push(AdvanceTask {
                match_id: next.match_id,
                side: next.side,
                player: Some(winner),
            });
        }
        if let Some(next) = m.loser_next {
            tasks.push(AdvanceTask {
                match_id: next.match_id,
                side: next.side,
                player: m.loser_id(),
            });
        }
    }
    advancement::apply(category, tasks)
}
