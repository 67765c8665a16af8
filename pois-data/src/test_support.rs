//! Loopback HTTP stub for adapter tests.
//!
//! [`StubHttpServer`] binds `127.0.0.1:0`, answers every request with one
//! canned response and records the request targets it saw. It speaks just
//! enough HTTP/1.1 for `reqwest` GETs.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: u16, body: String },
    Stall,
}

/// Canned-response HTTP server running on the current Tokio runtime.
#[derive(Debug)]
pub struct StubHttpServer {
    base_url: String,
    targets: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl StubHttpServer {
    /// Serve `body` as `application/json` with the given status.
    ///
    /// # Errors
    ///
    /// Returns an error when the loopback socket cannot be bound.
    pub async fn respond(status: u16, body: impl Into<String>) -> io::Result<Self> {
        Self::start(Reply::Respond {
            status,
            body: body.into(),
        })
        .await
    }

    /// Accept connections but never answer them.
    ///
    /// # Errors
    ///
    /// Returns an error when the loopback socket cannot be bound.
    pub async fn stalled() -> io::Result<Self> {
        Self::start(Reply::Stall).await
    }

    async fn start(reply: Reply) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let targets = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&targets);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let reply = reply.clone();
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    if let Err(err) = serve(stream, &reply, &recorded).await {
                        debug!("stub client hung up: {err}");
                    }
                });
            }
        });
        Ok(Self {
            base_url,
            targets,
            task,
        })
    }

    /// Base URL such as `http://127.0.0.1:49152`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request targets (path and query) received so far.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        self.targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for StubHttpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    reply: &Reply,
    targets: &Mutex<Vec<String>>,
) -> io::Result<()> {
    let head = read_head(&mut stream).await?;
    if let Some(target) = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
    {
        targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.to_owned());
    }

    match reply {
        Reply::Stall => {
            std::future::pending::<()>().await;
            Ok(())
        }
        Reply::Respond { status, body } => {
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\n\
                 Content-Length: {length}\r\nConnection: close\r\n\r\n{body}",
                reason = reason_phrase(*status),
                length = body.len(),
            );
            stream.write_all(response.as_bytes()).await?;
            stream.shutdown().await
        }
    }
}

async fn read_head(stream: &mut TcpStream) -> io::Result<String> {
    let mut head = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(chunk.get(..read).unwrap_or_default());
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
