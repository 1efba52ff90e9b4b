pub mod distance;
pub mod estimate;
pub mod rank;
