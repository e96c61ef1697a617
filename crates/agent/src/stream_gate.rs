//! Decides which streamed tokens are safe to show the user.
//!
//! A step whose text opens with `{` or a code fence is probably a tool call
//! in progress, so it is held back until the step resolves. Anything else is
//! prose and streams live.

const CODE_FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// No non-whitespace content seen yet.
    Pending,
    /// Buffering silently for the rest of the step.
    Hold,
    /// Forwarding every increment immediately.
    Emit,
}

/// Per-step token gate. Create a fresh one for every model round trip.
#[derive(Debug)]
pub struct StreamGate {
    buffer: String,
    mode: StreamMode,
    emitted: bool,
}

impl StreamGate {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            mode: StreamMode::Pending,
            emitted: false,
        }
    }

    /// Accept one increment and return what may be forwarded now, if anything.
    pub fn push(&mut self, delta: &str) -> Option<String> {
        self.buffer.push_str(delta);

        match self.mode {
            StreamMode::Hold => None,
            StreamMode::Emit => self.forward(delta.to_string()),
            StreamMode::Pending => {
                self.mode = classify(&self.buffer);
                match self.mode {
                    StreamMode::Emit => self.forward(self.buffer.clone()),
                    StreamMode::Hold | StreamMode::Pending => None,
                }
            }
        }
    }

    fn forward(&mut self, text: String) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        self.emitted = true;
        Some(text)
    }

    /// Everything received in this step, held or not.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn into_text(self) -> String {
        self.buffer
    }

    /// Whether any part of the step reached the sink.
    pub fn emitted(&self) -> bool {
        self.emitted
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }
}

impl Default for StreamGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify the accumulated text of a step that is still pending.
fn classify(buffer: &str) -> StreamMode {
    let start = buffer.trim_start();
    let Some(first) = start.chars().next() else {
        return StreamMode::Pending;
    };

    match first {
        '{' => StreamMode::Hold,
        '`' => {
            let ticks = start.chars().take_while(|c| *c == '`').count();
            if ticks >= CODE_FENCE.len() {
                StreamMode::Hold
            } else if ticks < start.chars().count() {
                // inline code span, not a fence
                StreamMode::Emit
            } else {
                StreamMode::Pending
            }
        }
        _ => StreamMode::Emit,
    }
}
