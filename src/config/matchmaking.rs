/// Matchmaking configuration constants.
/// 
/// This module defines the matcher cadence and the invitation lifetime.
pub const MATCH_INTERVAL_SECS: u64 = 1; // Delay between two matcher passes (in seconds).

/// Resolution of the invitation countdown (in seconds).
pub const INVITATION_TICK_SECS: u64 = 1;

/// Number of invitation ticks without an answer before it is auto-declined.
pub const INVITATION_TIMEOUT_TICKS: u32 = 10;

/// Rating points moved from loser to winner after a ranked session.
pub const RANK_RATING_DELTA: i32 = 20;

/// Win counts that award a milestone badge.
pub const BADGE_MILESTONES: [u32; 3] = [3, 5, 10];
