//! Command framing and idle-terminated reads.
//!
//! The wire format has no length prefix and no checksum:
//! ```text
//! binary:  '<' mnemonic [payload] '>>'
//! text:    '<AT+' command '>>'
//! ```
//! Replies are not delimited either. A reply is complete once no byte has
//! arrived for the idle window, so a device that stalls longer than the
//! window mid-reply produces a truncated read. A device that never pauses
//! (heartbeat mode left on) would never end a reply, so reads stop with an
//! error after [`MAX_REPLY_LEN`] bytes.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Opening delimiter of every command.
pub const FRAME_START: &[u8] = b"<";

/// Closing delimiter of every command.
pub const FRAME_END: &[u8] = b">>";

/// Prefix that routes a command to the Wi-Fi module.
pub const AT_PREFIX: &[u8] = b"AT+";

/// Acknowledgement byte returned by set/toggle commands.
pub const ACK: u8 = 0xAA;

/// Longest reply collected before giving up on an idle gap.
pub const MAX_REPLY_LEN: usize = 64 * 1024;

/// Frames a binary command.
#[must_use]
pub fn encode(mnemonic: &[u8], payload: &[u8]) -> Bytes {
    let mut buf =
        BytesMut::with_capacity(FRAME_START.len() + mnemonic.len() + payload.len() + FRAME_END.len());
    buf.put_slice(FRAME_START);
    buf.put_slice(mnemonic);
    buf.put_slice(payload);
    buf.put_slice(FRAME_END);
    buf.freeze()
}

/// Frames a text (AT) command.
#[must_use]
pub fn encode_at(command: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(AT_PREFIX.len() + command.len());
    buf.put_slice(AT_PREFIX);
    buf.put_slice(command.as_bytes());
    encode(&buf, &[])
}

/// Reads until no byte arrives within `idle`.
///
/// Returns an empty buffer when the device stays silent, and
/// [`Error::Protocol`] once more than [`MAX_REPLY_LEN`] bytes arrive
/// without a pause.
pub async fn read_until_idle<T: Transport + ?Sized>(
    transport: &mut T,
    idle: Duration,
) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    loop {
        let chunk = transport.read_available(idle).await?;
        if chunk.is_empty() {
            break;
        }
        buf.extend_from_slice(&chunk);
        if buf.len() > MAX_REPLY_LEN {
            return Err(Error::Protocol {
                message: format!("reply exceeded {MAX_REPLY_LEN} bytes without an idle gap"),
            });
        }
    }
    tracing::trace!("collected {} reply bytes", buf.len());
    Ok(buf.freeze())
}

/// Performs one write followed by one idle-terminated read.
pub async fn transact<T: Transport + ?Sized>(
    transport: &mut T,
    frame: Bytes,
    idle: Duration,
) -> Result<Bytes> {
    transport.send(frame).await?;
    read_until_idle(transport, idle).await
}
