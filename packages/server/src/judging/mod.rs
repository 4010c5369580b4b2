//! Judge queues, vote recording and the leaderboard.

pub mod queue;
pub mod ranking;
pub mod votes;

pub use queue::{NextTable, Progress, QueueService};
pub use ranking::{Rankings, RankingService};
pub use votes::{Advance, VoteService};
