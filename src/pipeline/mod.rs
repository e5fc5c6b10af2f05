// Pipelines — fetch from the repositories, then hand off to the pure
// scoring modules. One module per public operation.

pub mod feed;
pub mod outfit;
pub mod suggestions;
