// Affinity: compare the inferred personalities of two Bluesky accounts.
//
// This is the library root. The personality module holds the pure trait
// transforms; bluesky and insights wrap the two external services; pipeline
// ties them together.

pub mod bluesky;
pub mod config;
pub mod error;
pub mod insights;
pub mod output;
pub mod personality;
pub mod pipeline;
