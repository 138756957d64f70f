// Personality inference: the collaborator traits and the Personality
// Insights HTTP client that implements the analysis side.

pub mod client;
pub mod traits;
