pub mod bag;
pub mod distribution;
pub mod rack;

pub use bag::Bag;
pub use distribution::LetterDistribution;
pub use rack::Rack;
