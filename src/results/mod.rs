//! Vote tallies, leader aggregation and the external winners feed.

mod aggregate;
mod feed;
mod input;
mod overlay;
pub mod stats;

pub use aggregate::{compute_leaders, compute_leaders_for_seats, LeaderKind, SeatLeader, NO_VOTES, NO_WINNER, TIED};
pub use feed::{FeedUpdate, FileResultsSource, HttpResultsSource, ResultsPoller, ResultsSource};
pub use input::{Candidate, Party, Seat, WinnerRecord};
pub use overlay::apply_winners;
