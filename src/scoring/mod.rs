// Scoring — pure ranking logic: preference profiles, tiered feed merge,
// and outfit composition. Nothing in here performs I/O.

pub mod feed;
pub mod outfit;
pub mod profile;
