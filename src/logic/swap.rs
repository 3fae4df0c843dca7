//! Administrative corrections: exchange two players without touching results.
//!
//! Seed protection is enforced by the calling layer; these primitives swap
//! whatever occupied positions they are given.

use crate::logic::groups::recalculate_group_standings;
use crate::models::{Category, DrawError, GroupId, MatchId, RegistrationId, Slot, SlotSide};

/// Exchange the occupants of two bracket slots. Both slots must hold a
/// player; results and advancement links are left untouched.
pub fn swap_players_in_bracket(
    category: &mut Category,
    match1_id: MatchId,
    side1: SlotSide,
    match2_id: MatchId,
    side2: SlotSide,
) -> Result<(), DrawError> {
    let player1 = category
        .bracket_match(match1_id)
        .ok_or(DrawError::MatchNotFound(match1_id))?
        .player(side1)
        .ok_or(DrawError::InconsistentSwap)?;
    let player2 = category
        .bracket_match(match2_id)
        .ok_or(DrawError::MatchNotFound(match2_id))?
        .player(side2)
        .ok_or(DrawError::InconsistentSwap)?;

    if let Some(m) = category.bracket_match_mut(match1_id) {
        *m.slot_mut(side1) = Slot::Occupied(player2);
    }
    if let Some(m) = category.bracket_match_mut(match2_id) {
        *m.slot_mut(side2) = Slot::Occupied(player1);
    }
    Ok(())
}

/// Exchange two players across all pairings of a group, then recompute the
/// standings so every counter follows its player.
pub fn swap_players_in_group(
    category: &mut Category,
    group_id: GroupId,
    player1_id: RegistrationId,
    player2_id: RegistrationId,
) -> Result<(), DrawError> {
    if category.group(group_id).is_none() {
        return Err(DrawError::GroupNotFound(group_id));
    }
    let in_group = |category: &Category, id: RegistrationId| {
        category
            .group_players
            .iter()
            .any(|gp| gp.group_id == group_id && gp.registration_id == id)
    };
    if !in_group(category, player1_id) || !in_group(category, player2_id) {
        return Err(DrawError::InconsistentSwap);
    }

    for m in category
        .group_matches
        .iter_mut()
        .filter(|m| m.group_id == group_id)
    {
        if m.player1_id == player1_id {
            m.player1_id = player2_id;
        } else if m.player1_id == player2_id {
            m.player1_id = player1_id;
        }
        if m.player2_id == player1_id {
            m.player2_id = player2_id;
        } else if m.player2_id == player2_id {
            m.player2_id = player1_id;
        }
    }

    recalculate_group_standings(category, group_id)
}
