/// Environment variable helpers for startup configuration.
pub mod env;
/// Pure parser helpers.
pub mod parse;
/// Shared time helpers.
pub mod time;
