pub mod app;
pub mod cli;
pub mod config;
pub mod directory;
pub mod fetcher;
pub mod normalizer;
pub mod output;

#[cfg(test)]
mod tests;
