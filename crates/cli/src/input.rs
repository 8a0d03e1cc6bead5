//! Raw stdin bytes to text chunks.

use std::io::Read;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, trace};

const READ_BUF: usize = 256;

/// Decodes a byte stream as UTF-8 across arbitrary chunk boundaries.
///
/// An incomplete trailing sequence is held for the next chunk; invalid bytes
/// become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Chunker {
    carry: Vec<u8>,
}

impl Utf8Chunker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.carry.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.carry) {
                Ok(s) => {
                    out.push_str(s);
                    self.carry.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.carry[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.carry.drain(..valid + bad);
                        }
                        None => {
                            self.carry.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Whatever is still held at end of input.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        rest
    }
}

/// Read stdin on a blocking thread and forward decoded chunks. The channel
/// closes at end of input.
pub fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let mut stdin = std::io::stdin().lock();
        let mut chunker = Utf8Chunker::new();
        let mut buf = [0u8; READ_BUF];
        loop {
            let n = match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!(error = %e, "stdin read failed");
                    break;
                }
            };
            let text = chunker.push(&buf[..n]);
            trace!(bytes = n, "stdin chunk");
            if !text.is_empty() && tx.blocking_send(text).is_err() {
                return;
            }
        }
        let rest = chunker.finish();
        if !rest.is_empty() {
            let _ = tx.blocking_send(rest);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multibyte_char_split_across_chunks() {
        let bytes = "0102Ê10L".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut c = Utf8Chunker::new();
        assert_eq!(c.push(&bytes[..split]), "0102");
        assert_eq!(c.push(&bytes[split..]), "Ê10L");
        assert_eq!(c.finish(), "");
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut c = Utf8Chunker::new();
        assert_eq!(c.push(b"A\xffB"), "A\u{FFFD}B");
    }
}
