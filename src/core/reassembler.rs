// Newline framing for the inbound byte stream

use crate::core::constants::LINE_TERMINATOR;

/// Accumulates raw chunks and hands back complete lines in arrival order.
///
/// A trailing partial line stays buffered until a later chunk terminates it.
/// The buffer has no size cap.
#[derive(Debug, Default)]
pub struct FrameReassembler {
    pending: Vec<u8>,
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(256),
        }
    }

    /// Appends `chunk` and returns an iterator over the lines it completes.
    ///
    /// Lines are produced lazily. If the iterator is dropped early, the
    /// unread lines are still buffered and come out of the next `feed`.
    pub fn feed(&mut self, chunk: &[u8]) -> Lines<'_> {
        self.pending.extend_from_slice(chunk);
        Lines {
            pending: &mut self.pending,
        }
    }

    /// Bytes received but not yet terminated by a newline.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

/// Lines completed by one `feed` call. The newline itself is not included.
pub struct Lines<'a> {
    pending: &'a mut Vec<u8>,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == LINE_TERMINATOR)?;
        let line: Vec<u8> = self.pending.drain(..=pos).take(pos).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}
