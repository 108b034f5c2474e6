//! Meeting application handlers.

mod join_meeting;

pub use join_meeting::{JoinMeetingCommand, JoinMeetingHandler};
