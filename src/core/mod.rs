pub mod catalog;
#[cfg(test)]
pub mod fake;
pub mod filter;
pub mod magnet;
pub mod model;
pub mod pipeline;
