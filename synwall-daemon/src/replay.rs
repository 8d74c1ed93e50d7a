//! Frame replay source.
//!
//! Feeds the filter pipeline from a capture file instead of a live
//! attachment, for offline resilience runs and end-to-end tests.
//!
//! # File format
//!
//! A flat sequence of records, each a big-endian `u16` frame length
//! followed by that many raw Ethernet frame bytes. No file header.

use std::path::Path;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::info;

/// Read a length-prefixed frame file and send every frame to the pipeline.
///
/// Returns the number of frames sent. Stops with an error on a record
/// whose declared length runs past the end of the file, or when the
/// pipeline side of the channel is gone.
pub async fn replay_file(path: impl AsRef<Path>, frame_tx: mpsc::Sender<Bytes>) -> Result<u64> {
    let path = path.as_ref();
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read replay file '{}'", path.display()))?;

    let mut offset = 0usize;
    let mut sent = 0u64;
    while offset < data.len() {
        if data.len() - offset < 2 {
            bail!(
                "truncated replay file '{}': dangling length byte at offset {}",
                path.display(),
                offset
            );
        }
        let len = usize::from(u16::from_be_bytes([data[offset], data[offset + 1]]));
        offset += 2;
        if data.len() - offset < len {
            bail!(
                "truncated replay file '{}': record at offset {} declares {} bytes, {} remain",
                path.display(),
                offset - 2,
                len,
                data.len() - offset
            );
        }

        let frame = Bytes::copy_from_slice(&data[offset..offset + len]);
        offset += len;
        frame_tx
            .send(frame)
            .await
            .context("pipeline closed the frame channel during replay")?;
        sent += 1;
    }

    info!(path = %path.display(), frames = sent, "replay finished");
    Ok(sent)
}

/// Encode frames into the replay file format (test and tooling helper).
pub fn encode_frames<'a>(frames: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    for frame in frames {
        // frames fit a u16 length (Ethernet MTU range)
        let len = frame.len() as u16;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(frame);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_all_frames_in_order() {
        let frames: Vec<Vec<u8>> = vec![vec![1, 2, 3], vec![], vec![9; 64]];
        let encoded = encode_frames(frames.iter().map(Vec::as_slice));

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frames.bin");
        std::fs::write(&path, encoded).expect("write replay file");

        let (tx, mut rx) = mpsc::channel(16);
        let sent = replay_file(&path, tx).await.expect("replay must succeed");
        assert_eq!(sent, 3);

        for expected in &frames {
            let frame = rx.recv().await.expect("frame must arrive");
            assert_eq!(frame.as_ref(), expected.as_slice());
        }
        assert!(rx.recv().await.is_none(), "channel must close after replay");
    }

    #[tokio::test]
    async fn trailing_bytes_are_an_error() {
        let mut encoded = encode_frames([[0u8; 4].as_slice()]);
        // declare 10 bytes but provide none
        encoded.extend_from_slice(&10u16.to_be_bytes());

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frames.bin");
        std::fs::write(&path, encoded).expect("write replay file");

        let (tx, _rx) = mpsc::channel(16);
        let err = replay_file(&path, tx).await.expect_err("must fail");
        assert!(err.to_string().contains("truncated"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let (tx, _rx) = mpsc::channel(1);
        let err = replay_file("/nonexistent/frames.bin", tx)
            .await
            .expect_err("must fail");
        assert!(err.to_string().contains("failed to read"));
    }
}
