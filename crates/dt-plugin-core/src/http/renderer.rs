//! Writes responses to an output stream.
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use http::header::CONTENT_LENGTH;

use crate::http::error::HttpError;
use crate::http::Response;
use crate::kernel::error::Result;

/// Emits a response. Consumes it; no business logic.
pub trait Renderer: Send + Sync {
    fn render(&self, response: Response) -> Result<()>;
}

/// Writes an HTTP/1.1 message (status line, headers, body) and flushes.
pub struct ResponseRenderer {
    target: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for ResponseRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseRenderer").finish_non_exhaustive()
    }
}

impl ResponseRenderer {
    pub fn new(target: Box<dyn Write + Send>) -> Self {
        Self { target: Mutex::new(target) }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// A renderer writing into a buffer the caller can read back.
    pub fn buffered() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(Box::new(buffer.clone())), buffer)
    }
}

impl Renderer for ResponseRenderer {
    fn render(&self, response: Response) -> Result<()> {
        let mut target = self
            .target
            .lock()
            .map_err(|_| HttpError::Render(io::Error::other("renderer target poisoned")))?;
        let status = response.status();
        write!(target, "HTTP/1.1 {} {}\r\n", status.as_u16(), status.canonical_reason().unwrap_or(""))
            .map_err(HttpError::from)?;
        for (name, value) in response.headers() {
            write!(target, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes())).map_err(HttpError::from)?;
        }
        if !response.headers().contains_key(CONTENT_LENGTH) {
            write!(target, "{}: {}\r\n", CONTENT_LENGTH, response.body().len()).map_err(HttpError::from)?;
        }
        target.write_all(b"\r\n").map_err(HttpError::from)?;
        target.write_all(response.body()).map_err(HttpError::from)?;
        target.flush().map_err(HttpError::from)?;
        Ok(())
    }
}

/// Cloneable in-memory sink.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.0.lock().map_err(|_| io::Error::other("buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
