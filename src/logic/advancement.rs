//! Match advancement: result entry, walkover resolution, and total undo.
//!
//! Propagation runs as an explicit FIFO worklist over the category's match
//! collection instead of call-stack recursion. Round numbers strictly
//! decrease along every advancement link, so the traversal always terminates.

use crate::models::{
    BracketMatch, Category, DrawError, MatchId, MatchStatus, NextSlot, RegistrationId, SetScore,
    Slot, SlotSide, RETIREMENT, WALKOVER,
};
use std::collections::VecDeque;

/// One pending slot write: `player` is None when the arriving "player" is a
/// phantom (the loser of a walkover, or a bye cascading forward).
#[derive(Clone, Copy, Debug)]
pub(crate) struct AdvanceTask {
    pub match_id: MatchId,
    pub side: SlotSide,
    pub player: Option<RegistrationId>,
}

impl AdvanceTask {
    fn to(next: NextSlot, player: Option<RegistrationId>) -> Self {
        Self {
            match_id: next.match_id,
            side: next.side,
            player,
        }
    }
}

/// Record a played result: validates the score against the category's
/// best-of format, completes the match, and advances both players.
pub fn record_match_result(
    category: &mut Category,
    match_id: MatchId,
    winner_id: RegistrationId,
    score: Vec<SetScore>,
) -> Result<(), DrawError> {
    let sets_to_win = category.config.sets_to_win();
    let m = category
        .bracket_match_mut(match_id)
        .ok_or(DrawError::MatchNotFound(match_id))?;
    if m.is_finished() {
        return Err(DrawError::MatchAlreadyDecided);
    }
    let (p1, p2) = match (m.slot1.player(), m.slot2.player()) {
        (Some(p1), Some(p2)) => (p1, p2),
        _ => return Err(DrawError::MatchNotReady),
    };
    if winner_id != p1 && winner_id != p2 {
        return Err(DrawError::PlayerNotInMatch(winner_id));
    }

    let p1_sets = score.iter().filter(|s| s.p1 > s.p2).count() as u32;
    let p2_sets = score.iter().filter(|s| s.p2 > s.p1).count() as u32;
    let (winner_sets, loser_sets) = if winner_id == p1 {
        (p1_sets, p2_sets)
    } else {
        (p2_sets, p1_sets)
    };
    if winner_sets < sets_to_win || winner_sets <= loser_sets {
        return Err(DrawError::InvalidScore {
            required_sets: sets_to_win,
        });
    }

    m.winner_id = Some(winner_id);
    m.score = Some(score);
    m.score_summary = Some(format!("{} - {}", winner_sets, loser_sets));
    m.status = MatchStatus::Completed;

    let loser_id = if winner_id == p1 { p2 } else { p1 };
    let tasks = departure_tasks(m, winner_id, Some(loser_id));
    apply(category, tasks)
}

/// Record a mid-match withdrawal: the remaining player advances as winner and
/// the match ends in the terminal retired state.
pub fn mark_match_retirement(
    category: &mut Category,
    match_id: MatchId,
    retired_player_id: RegistrationId,
    winner_id: RegistrationId,
) -> Result<(), DrawError> {
    let m = category
        .bracket_match_mut(match_id)
        .ok_or(DrawError::MatchNotFound(match_id))?;
    if m.is_finished() {
        return Err(DrawError::MatchAlreadyDecided);
    }
    let (p1, p2) = match (m.slot1.player(), m.slot2.player()) {
        (Some(p1), Some(p2)) => (p1, p2),
        _ => return Err(DrawError::MatchNotReady),
    };
    let occupants = [p1, p2];
    if !occupants.contains(&winner_id) || !occupants.contains(&retired_player_id) {
        return Err(DrawError::InvalidRetirement);
    }
    if winner_id == retired_player_id {
        return Err(DrawError::InvalidRetirement);
    }

    m.winner_id = Some(winner_id);
    m.status = MatchStatus::Retired;
    m.score_summary = Some(RETIREMENT.to_string());

    let tasks = departure_tasks(m, winner_id, Some(retired_player_id));
    apply(category, tasks)
}

/// Undo a decided match: reset it and recursively clear every downstream
/// slot its result ever reached, unwinding any results entered on top.
pub fn clear_match_result(category: &mut Category, match_id: MatchId) -> Result<(), DrawError> {
    let m = category
        .bracket_match_mut(match_id)
        .ok_or(DrawError::MatchNotFound(match_id))?;
    if !m.is_finished() {
        return Err(DrawError::MatchNotDecided);
    }
    reset_match(m);

    // (target, side, feeder) triples: the feeder is the match whose result
    // was just invalidated, so the slot reverts to waiting on it.
    let mut queue: VecDeque<(MatchId, SlotSide, MatchId)> = VecDeque::new();
    if let Some(next) = m.winner_next {
        queue.push_back((next.match_id, next.side, match_id));
    }
    if let Some(next) = m.loser_next {
        queue.push_back((next.match_id, next.side, match_id));
    }

    while let Some((target_id, side, feeder_id)) = queue.pop_front() {
        let target = match category.bracket_match_mut(target_id) {
            Some(t) => t,
            None => continue,
        };
        let was_finished = target.is_finished();
        *target.slot_mut(side) = Slot::AwaitingFeeder(feeder_id);
        reset_match(target);
        if was_finished {
            if let Some(next) = target.winner_next {
                queue.push_back((next.match_id, next.side, target_id));
            }
            if let Some(next) = target.loser_next {
                queue.push_back((next.match_id, next.side, target_id));
            }
        }
    }
    Ok(())
}

/// Core propagation primitive: write a player (or a phantom) into one slot
/// and let the worklist resolve walkovers and waiting opponents.
pub fn advance_player(
    category: &mut Category,
    match_id: MatchId,
    side: SlotSide,
    player: Option<RegistrationId>,
) -> Result<(), DrawError> {
    apply(
        category,
        vec![AdvanceTask {
            match_id,
            side,
            player,
        }],
    )
}

/// Drain the advancement worklist. Each task writes one slot, then inspects
/// the opposite slot:
///
/// - occupied, phantom incoming: the occupant wins by walkover;
/// - occupied, player incoming: a stale walkover (no real score) reopens;
/// - awaiting a finished feeder: pull the resolved player in;
/// - bye, player incoming: the player wins by walkover and cascades on;
/// - bye, phantom incoming: nobody can ever reach this match, so the phantom
///   cascades out of both links (the match itself stays pending).
pub(crate) fn apply(category: &mut Category, initial: Vec<AdvanceTask>) -> Result<(), DrawError> {
    let mut queue: VecDeque<AdvanceTask> = initial.into();

    while let Some(task) = queue.pop_front() {
        // Write the slot and copy out what the branches below need, so the
        // category can be re-borrowed per branch.
        let (opposite, status, has_score, winner_next, loser_next) = {
            let m = match category.bracket_match_mut(task.match_id) {
                Some(m) => m,
                None => return Err(DrawError::MatchNotFound(task.match_id)),
            };
            *m.slot_mut(task.side) = match task.player {
                Some(p) => Slot::Occupied(p),
                None => Slot::Bye,
            };
            (
                *m.slot(task.side.other()),
                m.status,
                m.score.is_some(),
                m.winner_next,
                m.loser_next,
            )
        };
        let finished = matches!(status, MatchStatus::Completed | MatchStatus::Retired);

        match (opposite, task.player) {
            (Slot::Occupied(opponent), None) => {
                // The expected opponent turned out to be a phantom: the
                // occupant advances by walkover.
                if !finished {
                    complete_walkover(category, task.match_id, opponent);
                    if let Some(next) = winner_next {
                        queue.push_back(AdvanceTask::to(next, Some(opponent)));
                    }
                    if let Some(next) = loser_next {
                        queue.push_back(AdvanceTask::to(next, None));
                    }
                }
            }
            (Slot::Occupied(_), Some(_)) => {
                // Both players present: a walkover recorded before the real
                // opponent arrived reopens for a real result.
                if status == MatchStatus::Completed && !has_score {
                    if let Some(m) = category.bracket_match_mut(task.match_id) {
                        reset_match(m);
                    }
                }
            }
            (Slot::AwaitingFeeder(feeder_id), _) => {
                let resolved = match category.bracket_match(feeder_id) {
                    Some(feeder) if feeder.is_finished() => {
                        Some(resolve_feed(feeder, task.match_id, task.side.other()))
                    }
                    _ => None,
                };
                // A pending feeder delivers the opponent when it finishes.
                if let Some(player) = resolved {
                    queue.push_back(AdvanceTask {
                        match_id: task.match_id,
                        side: task.side.other(),
                        player,
                    });
                }
            }
            (Slot::Bye | Slot::Undetermined, Some(player)) => {
                // Genuine bye: the incoming player advances immediately.
                complete_walkover(category, task.match_id, player);
                if let Some(next) = winner_next {
                    queue.push_back(AdvanceTask::to(next, Some(player)));
                }
                if let Some(next) = loser_next {
                    queue.push_back(AdvanceTask::to(next, None));
                }
            }
            (Slot::Bye | Slot::Undetermined, None) => {
                // Neither side will ever be reached. The match stays pending
                // (a match never completes with two empty slots) and the
                // phantom cascades to both consumers.
                if let Some(next) = winner_next {
                    queue.push_back(AdvanceTask::to(next, None));
                }
                if let Some(next) = loser_next {
                    queue.push_back(AdvanceTask::to(next, None));
                }
            }
        }
    }
    Ok(())
}

/// Build the downstream writes for a decided match, loser first.
fn departure_tasks(
    m: &BracketMatch,
    winner: RegistrationId,
    loser: Option<RegistrationId>,
) -> Vec<AdvanceTask> {
    let mut tasks = Vec::new();
    if let Some(next) = m.loser_next {
        tasks.push(AdvanceTask::to(next, loser));
    }
    if let Some(next) = m.winner_next {
        tasks.push(AdvanceTask::to(next, Some(winner)));
    }
    tasks
}

/// Player the feeder sends to the given slot: its winner when the winner link
/// targets the slot, otherwise its loser (None when the loser is a phantom).
fn resolve_feed(feeder: &BracketMatch, target: MatchId, side: SlotSide) -> Option<RegistrationId> {
    let as_winner = feeder.winner_next
        == Some(NextSlot {
            match_id: target,
            side,
        });
    if as_winner {
        feeder.winner_id
    } else {
        feeder.loser_id()
    }
}

fn complete_walkover(category: &mut Category, match_id: MatchId, winner: RegistrationId) {
    if let Some(m) = category.bracket_match_mut(match_id) {
        m.winner_id = Some(winner);
        m.status = MatchStatus::Completed;
        m.score_summary = Some(WALKOVER.to_string());
    }
}

fn reset_match(m: &mut BracketMatch) {
    m.winner_id = None;
    m.score = None;
    m.score_summary = None;
    m.status = MatchStatus::Pending;
}
