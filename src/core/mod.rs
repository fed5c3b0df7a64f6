pub mod clock;
pub mod error;
pub mod job;
pub mod query;
pub mod registry;
