pub mod algorithms;
pub mod streaming;
