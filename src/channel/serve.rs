//! Line-delimited JSON server for the method channel.
//!
//! Each input line is one [`MethodCall`]; each output line is one
//! [`ResponseEnvelope`] echoing the call's `id`. Blank lines are skipped.
//! A line that is not a valid call (bad JSON, bad UTF-8) gets an
//! `INVALID_ARGS` error response and the server keeps reading.

use super::types::{MethodCall, MethodResponse, ResponseEnvelope};
use super::VisionChannel;
use crate::error::{ChannelError, ErrorCode};
use std::io::{BufRead, Write};

/// Serve calls until `reader` is exhausted; returns the number answered.
pub fn serve<R, W>(
    channel: &VisionChannel,
    mut reader: R,
    mut writer: W,
) -> Result<usize, ChannelError>
where
    R: BufRead,
    W: Write,
{
    let mut answered = 0;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(ChannelError::Read)?;
        if read == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let envelope = match serde_json::from_slice::<MethodCall>(&line) {
            Ok(call) => ResponseEnvelope {
                id: call.id.clone(),
                response: channel.handle(&call),
            },
            Err(e) => {
                let error = ChannelError::MalformedRequest(e.to_string());
                tracing::warn!(%error, "rejected request line");
                ResponseEnvelope {
                    id: None,
                    response: MethodResponse::error(ErrorCode::InvalidArgs, error.to_string()),
                }
            }
        };

        serde_json::to_writer(&mut writer, &envelope).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        answered += 1;
    }

    Ok(answered)
}
