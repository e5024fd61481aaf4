pub mod aggregator;
pub mod categories;
pub mod embedding;
pub mod profiles;
pub mod recommender;
pub mod sentiment;
pub mod similarity;

pub use profiles::{ProfileBuilder, Recompute};
pub use recommender::Recommender;
