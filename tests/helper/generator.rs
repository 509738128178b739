use std::sync::Mutex;

use async_trait::async_trait;

use autorelease::error::ReleaseError;
use autorelease::release::generator::{GenerationOutput, Generator};
use autorelease::version::semver::ReleaseVersion;
use autorelease::version::types::Language;

/// One generator invocation: language, version and preview flag
pub type GeneratorCall = (Language, String, bool);

/// Generator that records its invocations instead of spawning a process
#[derive(Default)]
pub struct RecordingGenerator {
    calls: Mutex<Vec<GeneratorCall>>,
}

impl RecordingGenerator {
    pub fn calls(&self) -> Vec<GeneratorCall> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(
        &self,
        language: Language,
        version: &ReleaseVersion,
        preview: bool,
    ) -> Result<GenerationOutput, ReleaseError> {
        self.calls
            .lock()
            .unwrap()
            .push((language, version.to_string(), preview));
        Ok(GenerationOutput::default())
    }
}
