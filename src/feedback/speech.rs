// ABOUTME: Fire-and-forget speech seam for voicing feedback messages
// ABOUTME: Text-to-speech lives outside the engine; sinks only receive text to speak
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::info;

/// Receiver of speech triggers. Called only for events with `should_speak`.
pub trait SpeechSink {
    /// Voice `text`; must not block the frame loop
    fn speak(&mut self, text: &str);
}

/// Sink that records utterances as structured log events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSpeech;

impl SpeechSink for TracingSpeech {
    fn speak(&mut self, text: &str) {
        info!(speech.text = %text, "Speaking feedback");
    }
}

/// Collects utterances, useful for replay output and tests
impl SpeechSink for Vec<String> {
    fn speak(&mut self, text: &str) {
        self.push(text.to_owned());
    }
}
