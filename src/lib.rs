//! Newswire - A multi-source news aggregator
//!
//! This crate fetches a fixed set of RSS/Atom feeds, normalizes their entries
//! into uniform items and serves them as one merged, newest-first listing.

pub mod aggregator;
pub mod config;
pub mod fetcher;
pub mod image;
pub mod item;
pub mod normalize;
pub mod routes;
pub mod text;
pub mod timestamp;
