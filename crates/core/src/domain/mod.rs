pub mod recording;
pub mod stats;
mod wire;
