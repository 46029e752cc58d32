pub mod klv;
pub mod kwg;

pub use klv::Klv;
pub use kwg::{Kwg, KwgBuilder};
