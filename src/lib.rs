//! Club tournament web app: library with models and draw engine logic.

pub mod logic;
pub mod models;

pub use logic::{
    advance_player, bracket_size_for, byes_for, clear_match_result, generate_draw,
    mark_match_retirement, recalculate_group_standings, record_match_result, round_name,
    seed_positions, swap_players_in_bracket, swap_players_in_group, update_group_match,
    GroupMatchUpdate,
};
pub use models::{
    Bracket, BracketId, BracketMatch, BracketType, Category, CategoryId, DrawConfig, DrawError,
    DrawFormat, Group, GroupId, GroupMatch, GroupMatchId, GroupPlayer, MatchId, MatchStatus,
    NextSlot, Registration, RegistrationId, SetScore, Slot, SlotSide, RETIREMENT, WALKOVER,
};
