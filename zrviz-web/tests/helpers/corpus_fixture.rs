//! Pipeline output fixture
//!
//! Three documents (`s01`, `s02`, `s03`), six fragments and four clusters:
//!
//! | cluster | fragment lines | documents     |
//! |---------|----------------|---------------|
//! | pt0     | 1 3 5          | s01, s02, s02 |
//! | pt1     | 2 4            | s01, s03      |
//! | pt2     | 6              | s01           |
//! | pt3     | (empty)        |               |

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zrviz_common::db::AudioFormat;
use zrviz_web::import::ImportRequest;

use super::audio_generator::{generate_test_wav, AudioConfig};

pub const FIXTURE_RATE: u32 = 16000;

pub const FIXTURE_FRAGMENTS: &str = "\
s01 10 60 0.9 1.5 100
s01 100 150 0.8 1.5 100
s02 20 80 0.7 1.5 100
s03 5 30 0.6 1.5 100
s02 120 170 0.5 1.5 100
s01 150 190 0.4 1.5 100
";

pub const FIXTURE_CLUSTERS: &str = "1 3 5\n2 4\n6\n\n";

pub const DOCUMENT_IDENTIFIERS: [&str; 3] = ["s01", "s02", "s03"];

pub struct CorpusFixture {
    pub dir: TempDir,
    pub fragments_path: PathBuf,
    pub clusters_path: PathBuf,
    pub filenames_path: PathBuf,
}

impl CorpusFixture {
    /// Fixture with a 2 s mono WAV for every document
    pub fn new() -> Self {
        Self::with_missing_audio(&[])
    }

    /// Fixture whose listed documents have no audio file on disk
    pub fn with_missing_audio(missing: &[&str]) -> Self {
        Self::build(FIXTURE_FRAGMENTS, FIXTURE_CLUSTERS, missing)
    }

    /// Fixture with custom fragment and cluster contents
    pub fn build(fragments: &str, clusters: &str, missing: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let audio_dir = dir.path().join("audio");
        std::fs::create_dir_all(&audio_dir).unwrap();

        let mut filenames = String::new();
        for identifier in DOCUMENT_IDENTIFIERS {
            let path = audio_dir.join(format!("{}.wav", identifier));
            if !missing.contains(&identifier) {
                generate_test_wav(&path, &AudioConfig::default()).unwrap();
            }
            filenames.push_str(&format!("{}\n", path.display()));
        }

        let fragments_path = dir.path().join("master_graph.nodes");
        let clusters_path = dir.path().join("master_graph.dedups");
        let filenames_path = dir.path().join("fileswav.lst");
        std::fs::write(&fragments_path, fragments).unwrap();
        std::fs::write(&clusters_path, clusters).unwrap();
        std::fs::write(&filenames_path, filenames).unwrap();

        Self {
            dir,
            fragments_path,
            clusters_path,
            filenames_path,
        }
    }

    pub fn audio_path(&self, identifier: &str) -> PathBuf {
        self.dir.path().join("audio").join(format!("{}.wav", identifier))
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn request(&self, name: &str) -> ImportRequest {
        ImportRequest {
            corpus_name: name.to_string(),
            fragments_path: self.fragments_path.clone(),
            clusters_path: self.clusters_path.clone(),
            filenames_path: self.filenames_path.clone(),
            format: AudioFormat {
                rate: FIXTURE_RATE,
                channels: 1,
                precision: 16,
            },
            protected: false,
        }
    }
}
