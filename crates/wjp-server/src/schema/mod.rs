//! API schema types for request/response definitions.

pub mod jobs;
pub mod runs;
