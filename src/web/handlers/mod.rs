pub mod ai;
pub mod feed;
