//! Speech capture
//!
//! A capture yields the transcript of one utterance, or `None` when the user
//! recorded nothing. How audio is turned into text is up to the
//! implementation; the ones here read already-transcribed text.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use crate::error::{Result, VoiceQueryError};

#[async_trait]
pub trait SpeechCapture: Send {
    /// Record one utterance and return its transcript
    async fn record(&mut self) -> Result<Option<String>>;
}

/// Blank transcripts count as "nothing recorded"
pub fn normalize_transcript(raw: &str) -> Option<String> {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Reads one line per capture, used by the simple REPL
pub struct LineCapture<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin + Send> LineCapture<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }
}

pub type StdinCapture = LineCapture<tokio::io::Stdin>;

impl StdinCapture {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> SpeechCapture for LineCapture<R> {
    async fn record(&mut self) -> Result<Option<String>> {
        match self.lines.next_line().await {
            Ok(Some(line)) => Ok(normalize_transcript(&line)),
            Ok(None) => Err(VoiceQueryError::Capture("input closed".to_string())),
            Err(e) => Err(VoiceQueryError::Capture(e.to_string())),
        }
    }
}

/// Replays a fixed list of transcripts, then reports nothing recorded
#[derive(Debug, Default, Clone)]
pub struct ScriptedCapture {
    queue: VecDeque<String>,
}

impl ScriptedCapture {
    pub fn new<I, S>(transcripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: transcripts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl SpeechCapture for ScriptedCapture {
    async fn record(&mut self) -> Result<Option<String>> {
        Ok(self
            .queue
            .pop_front()
            .and_then(|text| normalize_transcript(&text)))
    }
}
