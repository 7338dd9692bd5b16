//! Integration test crate for the Soundscape composer.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It plays real WAV assets from a temporary directory through the full
//! composition -> session -> engine -> mixer path.

#[cfg(test)]
mod support;

#[cfg(test)]
mod scenarios;

#[cfg(test)]
mod composition;

#[cfg(test)]
mod render;
