use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

mod protocol;

use protocol::{Command, Frame, STATUS_OK};

#[derive(Debug, Error)]
pub(crate) enum RemoteError {
    #[error("cannot resolve {0}")]
    Resolve(String),
    #[error("connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[source] std::io::Error),
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("payload of {0} bytes exceeds limit")]
    PayloadTooLarge(u64),
    #[error("server answered status {0}")]
    Status(u16),
    #[error("unexpected reply to {0:?}")]
    UnexpectedReply(Command),
    #[error("decode list payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server contact disabled")]
    Offline,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct ListItem {
    pub(crate) title: String,
    #[serde(alias = "artist", default)]
    pub(crate) author: String,
}

/// Request/response contract of the remote list service.
pub(crate) trait ListService {
    fn handshake(&mut self) -> Result<(), RemoteError>;
    fn fetch_items(&mut self) -> Result<Vec<ListItem>, RemoteError>;
}

pub(crate) struct TcpListService {
    addr: String,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl TcpListService {
    pub(crate) fn new(addr: impl Into<String>, connect_timeout: Duration, io_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout,
            io_timeout,
        }
    }

    fn exchange(&self, command: Command) -> Result<Frame, RemoteError> {
        let addr = self
            .addr
            .to_socket_addrs()
            .map_err(|_| RemoteError::Resolve(self.addr.clone()))?
            .next()
            .ok_or_else(|| RemoteError::Resolve(self.addr.clone()))?;
        let mut stream = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map_err(|source| RemoteError::Connect { addr, source })?;
        stream
            .set_read_timeout(Some(self.io_timeout))
            .map_err(RemoteError::Io)?;
        stream
            .set_write_timeout(Some(self.io_timeout))
            .map_err(RemoteError::Io)?;

        tracing::debug!(%addr, ?command, "remote request");
        Frame::request(command).write_to(&mut stream)?;
        let reply = Frame::read_from(&mut stream)?;
        if reply.command != command {
            return Err(RemoteError::UnexpectedReply(command));
        }
        if reply.status != STATUS_OK {
            return Err(RemoteError::Status(reply.status));
        }
        Ok(reply)
    }
}

impl ListService for TcpListService {
    fn handshake(&mut self) -> Result<(), RemoteError> {
        self.exchange(Command::Handshake).map(|_| ())
    }

    fn fetch_items(&mut self) -> Result<Vec<ListItem>, RemoteError> {
        let reply = self.exchange(Command::ListItems)?;
        decode_items(&reply.payload)
    }
}

pub(crate) fn decode_items(payload: &[u8]) -> Result<Vec<ListItem>, RemoteError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Stand-in for `--offline`: every request fails without touching the network.
pub(crate) struct OfflineListService;

impl ListService for OfflineListService {
    fn handshake(&mut self) -> Result<(), RemoteError> {
        Err(RemoteError::Offline)
    }

    fn fetch_items(&mut self) -> Result<Vec<ListItem>, RemoteError> {
        Err(RemoteError::Offline)
    }
}
