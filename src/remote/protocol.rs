use std::io::{Read, Write};

use super::RemoteError;

pub(crate) const MAGIC: [u8; 2] = *b"OK";
pub(crate) const VERSION: u8 = 1;
pub(crate) const HEADER_LEN: usize = 10;
pub(crate) const MAX_PAYLOAD: u32 = 16 * 1024 * 1024;

pub(crate) const STATUS_OK: u16 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    ListItems,
    Handshake,
}

impl Command {
    pub(crate) fn code(self) -> u8 {
        match self {
            Command::ListItems => 4,
            Command::Handshake => 13,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(Command::ListItems),
            13 => Some(Command::Handshake),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) command: Command,
    pub(crate) status: u16,
    pub(crate) payload: Vec<u8>,
}

impl Frame {
    pub(crate) fn request(command: Command) -> Self {
        Self {
            command,
            status: STATUS_OK,
            payload: Vec::new(),
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, RemoteError> {
        let len = u32::try_from(self.payload.len())
            .ok()
            .filter(|len| *len <= MAX_PAYLOAD)
            .ok_or(RemoteError::PayloadTooLarge(self.payload.len() as u64))?;
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&MAGIC);
        out.push(VERSION);
        out.push(self.command.code());
        out.extend_from_slice(&self.status.to_be_bytes());
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    pub(crate) fn write_to(&self, w: &mut impl Write) -> Result<(), RemoteError> {
        w.write_all(&self.encode()?).map_err(RemoteError::Io)?;
        w.flush().map_err(RemoteError::Io)
    }

    pub(crate) fn read_from(r: &mut impl Read) -> Result<Self, RemoteError> {
        let mut header = [0u8; HEADER_LEN];
        r.read_exact(&mut header).map_err(truncated)?;
        if header[0..2] != MAGIC {
            return Err(RemoteError::Malformed(format!(
                "bad magic {:02x}{:02x}",
                header[0], header[1]
            )));
        }
        if header[2] != VERSION {
            return Err(RemoteError::Malformed(format!(
                "unsupported protocol version {}",
                header[2]
            )));
        }
        let command = Command::from_code(header[3])
            .ok_or_else(|| RemoteError::Malformed(format!("unknown command {}", header[3])))?;
        let status = u16::from_be_bytes([header[4], header[5]]);
        let len = u32::from_be_bytes([header[6], header[7], header[8], header[9]]);
        if len > MAX_PAYLOAD {
            return Err(RemoteError::PayloadTooLarge(u64::from(len)));
        }
        let mut payload = vec![0u8; len as usize];
        r.read_exact(&mut payload).map_err(truncated)?;
        Ok(Self {
            command,
            status,
            payload,
        })
    }
}

fn truncated(err: std::io::Error) -> RemoteError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        RemoteError::Malformed("frame truncated".to_string())
    } else {
        RemoteError::Io(err)
    }
}
