//! Draw engine logic: generation, advancement, groups, swaps.

mod advancement;
mod draw;
mod groups;
mod seeding;
mod swap;

pub use advancement::{
    advance_player, clear_match_result, mark_match_retirement, record_match_result,
};
pub use draw::{generate_draw, round_name};
pub use groups::{recalculate_group_standings, update_group_match, GroupMatchUpdate};
pub use seeding::{bracket_size_for, byes_for, seed_positions};
pub use swap::{swap_players_in_bracket, swap_players_in_group};
