pub mod base;
pub mod configs;
pub mod utils;
pub mod anthropic;

#[cfg(test)]
pub mod mock;
