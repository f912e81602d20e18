//! Request server for the display daemon.
//!
//! Clients connect over TCP and exchange one JSON document per line. Each
//! connection gets its own thread; handlers only touch the settings store
//! and the command queue, so they never wait on the display.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::api::{Ack, Api};
use crate::error::{Error, ValidationError};
use crate::settings::Settings;

/// Longest request line accepted, newline excluded.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Request sent to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// Queue a scrolling message
    Message(Map<String, Value>),
    /// Change some settings
    UpdateSettings(Map<String, Value>),
    /// Read the current settings
    GetSettings,
    /// Check the daemon is alive
    Ping,
}

/// Response from the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Message accepted
    Ack(Ack),
    /// Current settings
    Settings(Settings),
    Pong,
    /// The request failed validation; nothing changed
    Rejected(ValidationError),
    /// The daemon could not carry out a valid request
    Error(String),
}

/// Dispatch one request against the API.
pub fn handle(api: &Api, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::GetSettings => Response::Settings(api.read_settings()),
        Request::Message(payload) => match api.submit_command(&payload) {
            Ok(ack) => Response::Ack(ack),
            Err(Error::Validation(e)) => Response::Rejected(e),
            Err(e) => Response::Error(e.to_string()),
        },
        Request::UpdateSettings(payload) => match api.update_settings(&payload) {
            Ok(settings) => Response::Settings(settings),
            Err(e) => Response::Rejected(e),
        },
    }
}

pub struct Server {
    listener: TcpListener,
    api: Api,
}

impl Server {
    pub fn bind(addr: impl ToSocketAddrs, api: Api) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, api })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub fn serve(self) {
        if let Ok(addr) = self.local_addr() {
            info!("Listening on {}", addr);
        }
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    warn!("Accept error: {}", e);
                    continue;
                }
            };
            let api = self.api.clone();
            let spawned = thread::Builder::new()
                .name("request".into())
                .spawn(move || {
                    let peer = stream.peer_addr().ok();
                    if let Err(e) = handle_connection(stream, &api) {
                        debug!("Connection {:?} closed: {}", peer, e);
                    }
                });
            if let Err(e) = spawned {
                warn!("Failed to spawn request handler: {}", e);
            }
        }
    }

    /// Serve on a background thread.
    pub fn spawn(self) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("request-server".into())
            .spawn(move || self.serve())
    }
}

fn handle_connection(mut stream: TcpStream, api: &Api) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_REQUEST_BYTES as u64 + 1)
            .read_line(&mut line)?;
        if read == 0 {
            return Ok(());
        }
        if read > MAX_REQUEST_BYTES && !line.ends_with('\n') {
            // The rest of the line is never read; drop the connection.
            let response = Response::Rejected(ValidationError::new(
                "request",
                format!("request longer than {MAX_REQUEST_BYTES} bytes"),
            ));
            warn!("Rejected oversized request");
            writeln!(stream, "{}", serde_json::to_string(&response)?)?;
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle(api, request),
            Err(e) => Response::Rejected(ValidationError::new(
                "request",
                format!("invalid request: {e}"),
            )),
        };
        if let Response::Rejected(e) = &response {
            warn!("Rejected request: {}", e);
        }

        writeln!(stream, "{}", serde_json::to_string(&response)?)?;
    }
}

/// Client helpers for talking to a running daemon.
pub mod client {
    use super::*;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Send one request and wait for its response.
    pub fn send(addr: impl ToSocketAddrs, request: &Request) -> Result<Response, String> {
        let mut stream =
            TcpStream::connect(addr).map_err(|e| format!("Connect failed: {}", e))?;
        stream
            .set_read_timeout(Some(TIMEOUT))
            .map_err(|e| format!("Connect failed: {}", e))?;

        let line = serde_json::to_string(request).map_err(|e| format!("Encode failed: {}", e))?;
        writeln!(stream, "{}", line).map_err(|e| format!("Write failed: {}", e))?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| format!("Read failed: {}", e))?;

        serde_json::from_str(&line).map_err(|e| format!("Invalid response: {}", e))
    }

    /// Ping the daemon.
    pub fn ping(addr: impl ToSocketAddrs) -> Result<(), String> {
        match send(addr, &Request::Ping)? {
            Response::Pong => Ok(()),
            Response::Error(e) => Err(e),
            other => Err(format!("Unexpected response: {:?}", other)),
        }
    }
}
