//! Shared test utilities for zrviz-web

#![allow(dead_code)]

pub mod audio_generator;
pub mod corpus_fixture;

pub use audio_generator::{generate_test_wav, AudioConfig};
pub use corpus_fixture::{CorpusFixture, FIXTURE_CLUSTERS, FIXTURE_FRAGMENTS, FIXTURE_RATE};
