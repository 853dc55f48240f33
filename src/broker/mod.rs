//! The `broker` module holds the process-wide topic registry: which clients
//! are connected and which of them subscribe to which topics.

pub mod registry;
pub mod topic;

pub use registry::{Delivery, TopicRegistry};

#[cfg(test)]
mod tests;
