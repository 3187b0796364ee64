use axum::body::Bytes;
use std::io::Read;
use tokio::sync::mpsc;

/// Blocking [`Read`] over body chunks sent through a channel.
///
/// Lets the synchronous driver consume an async request body on a blocking
/// thread. The channel is bounded, so at most its capacity of chunks is
/// buffered ahead of the driver. A closed channel reads as end of input.
pub struct ChannelReader {
    rx: mpsc::Receiver<std::io::Result<Bytes>>,
    chunk: Bytes,
}

impl ChannelReader {
    /// Reads from the receiving half of a body channel.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<std::io::Result<Bytes>>) -> Self {
        Self {
            rx,
            chunk: Bytes::new(),
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.chunk.is_empty() {
            match self.rx.blocking_recv() {
                Some(chunk) => self.chunk = chunk?,
                None => return Ok(0),
            }
        }

        let n = buf.len().min(self.chunk.len());
        let (head, _) = buf.split_at_mut(n);
        head.copy_from_slice(&self.chunk.split_to(n));

        Ok(n)
    }
}
