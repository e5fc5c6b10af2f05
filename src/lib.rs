// Thriftfeed: personalized ranking for a thrift-fashion marketplace
//
// This is the library root. Scoring is pure and synchronous; pipelines fetch
// from the repository traits in `db` and hand the data to `scoring`.

pub mod config;
pub mod db;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
