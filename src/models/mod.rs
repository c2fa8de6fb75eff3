//! Data models for the Studio Manager application.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod activity;
mod booking;
mod snapshot;
mod staff;

pub use activity::*;
pub use booking::*;
pub use snapshot::*;
pub use staff::*;
