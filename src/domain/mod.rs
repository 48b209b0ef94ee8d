//! Domain layer - core analysis logic and entities

pub mod fees;
pub mod opportunity;
pub mod stats;
