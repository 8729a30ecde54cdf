//! Builds and enriches a JSON catalog of cartoon shows, seasons and episodes
//! scraped from a streaming site and TMDb, and resolves a playable stream URL
//! per episode.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod tmdb;
