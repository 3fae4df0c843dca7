//! Group phase: round-robin generation and standings recomputation.

use crate::models::{
    Category, DrawError, Group, GroupId, GroupMatch, GroupMatchId, GroupPlayer, MatchStatus,
    RegistrationId, SetScore,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

/// Partition players into balanced round-robin groups and create every
/// intra-group pairing. Seeds get no special placement here; assignment
/// order comes from the shuffle.
pub(crate) fn generate_group_phase(
    category: &mut Category,
    rng: &mut impl Rng,
) -> Result<(), DrawError> {
    let num_players = category.registrations.len();
    let max_per_group = category.config.players_per_group.max(1);

    // 10 players with at most 4 per group: 3 groups of sizes 4, 3, 3.
    let num_groups = num_players.div_ceil(max_per_group);
    let base_size = num_players / num_groups;
    let remainder = num_players % num_groups;

    log::info!(
        "generating group phase for '{}': {} players into {} groups",
        category.name,
        num_players,
        num_groups
    );

    let mut shuffled: Vec<RegistrationId> = category.registrations.iter().map(|r| r.id).collect();
    shuffled.shuffle(rng);

    let mut next = shuffled.into_iter();
    for i in 0..num_groups {
        let group = Group {
            id: Uuid::new_v4(),
            name: format!("Group {}", (b'A' + i as u8) as char),
            order_num: i as u32 + 1,
        };
        let size = base_size + usize::from(i < remainder);
        let members: Vec<RegistrationId> = next.by_ref().take(size).collect();

        for &registration_id in &members {
            category
                .group_players
                .push(GroupPlayer::new(group.id, registration_id));
        }
        for x in 0..members.len() {
            for y in (x + 1)..members.len() {
                category
                    .group_matches
                    .push(GroupMatch::new(group.id, members[x], members[y]));
            }
        }
        category.groups.push(group);
    }
    Ok(())
}

/// Partial update for a group match; absent fields keep their value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GroupMatchUpdate {
    pub winner_id: Option<RegistrationId>,
    pub score: Option<Vec<SetScore>>,
    pub score_summary: Option<String>,
    pub status: Option<MatchStatus>,
}

/// Apply an update to a group match, then recompute its group's standings.
pub fn update_group_match(
    category: &mut Category,
    match_id: GroupMatchId,
    update: GroupMatchUpdate,
) -> Result<(), DrawError> {
    let m = category
        .group_match_mut(match_id)
        .ok_or(DrawError::MatchNotFound(match_id))?;
    if let Some(winner_id) = update.winner_id {
        if winner_id != m.player1_id && winner_id != m.player2_id {
            return Err(DrawError::PlayerNotInMatch(winner_id));
        }
        m.winner_id = Some(winner_id);
    }
    if let Some(score) = update.score {
        m.score = Some(score);
    }
    if let Some(summary) = update.score_summary {
        m.score_summary = Some(summary);
    }
    if let Some(status) = update.status {
        m.status = status;
    }
    let group_id = m.group_id;
    recalculate_group_standings(category, group_id)
}

/// Rebuild every standings row of a group from its completed matches:
/// winner +1 point and +1 match won, loser +1 match lost, set tallies from
/// strict per-set comparison. Ranks by points, then matches played.
pub fn recalculate_group_standings(
    category: &mut Category,
    group_id: GroupId,
) -> Result<(), DrawError> {
    if category.group(group_id).is_none() {
        return Err(DrawError::GroupNotFound(group_id));
    }

    for row in category
        .group_players
        .iter_mut()
        .filter(|gp| gp.group_id == group_id)
    {
        row.position = 0;
        row.points = 0;
        row.matches_won = 0;
        row.matches_lost = 0;
        row.sets_won = 0;
        row.sets_lost = 0;
    }

    // Copy match data to avoid holding a borrow while updating rows.
    let completed: Vec<GroupMatch> = category
        .group_matches
        .iter()
        .filter(|m| m.group_id == group_id && m.status == MatchStatus::Completed)
        .cloned()
        .collect();

    for m in &completed {
        let winner = match m.winner_id {
            Some(w) => w,
            None => continue,
        };
        let loser = if winner == m.player1_id {
            m.player2_id
        } else {
            m.player1_id
        };

        if let Some(row) = row_mut(&mut category.group_players, group_id, winner) {
            row.points += 1;
            row.matches_won += 1;
        }
        if let Some(row) = row_mut(&mut category.group_players, group_id, loser) {
            row.matches_lost += 1;
        }

        if let Some(score) = &m.score {
            let p1_sets = score.iter().filter(|s| s.p1 > s.p2).count() as u32;
            let p2_sets = score.iter().filter(|s| s.p2 > s.p1).count() as u32;
            if let Some(row) = row_mut(&mut category.group_players, group_id, m.player1_id) {
                row.sets_won += p1_sets;
                row.sets_lost += p2_sets;
            }
            if let Some(row) = row_mut(&mut category.group_players, group_id, m.player2_id) {
                row.sets_won += p2_sets;
                row.sets_lost += p1_sets;
            }
        }
    }

    // Rank: points first, then total matches played as the secondary key.
    let mut order: Vec<(u32, u32, RegistrationId)> = category
        .group_players
        .iter()
        .filter(|gp| gp.group_id == group_id)
        .map(|gp| {
            (
                gp.points,
                gp.matches_won + gp.matches_lost,
                gp.registration_id,
            )
        })
        .collect();
    order.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

    for (idx, &(_, _, registration_id)) in order.iter().enumerate() {
        if let Some(row) = row_mut(&mut category.group_players, group_id, registration_id) {
            row.position = idx as u32 + 1;
        }
    }
    Ok(())
}

fn row_mut(
    rows: &mut [GroupPlayer],
    group_id: GroupId,
    registration_id: RegistrationId,
) -> Option<&mut GroupPlayer> {
    rows.iter_mut()
        .find(|gp| gp.group_id == group_id && gp.registration_id == registration_id)
}
