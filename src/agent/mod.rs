//! Agent configuration: the record handed to a [`Runner`](crate::runner::Runner).

pub mod agent;

pub use agent::Agent;
