// Bluesky: the timeline side of the comparison.
//
// Reads public author feeds through the unauthenticated AppView. Each
// submodule handles one concern.

pub mod client;
pub mod posts;
