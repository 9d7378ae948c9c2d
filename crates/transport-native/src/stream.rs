use actor_runtime::{actor_debug, actor_info};
use core_types::{ByteSource, ReadOutcome, SerialConfig, SerialHost, SourceError};
use std::cell::RefCell;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Bytes requested per read; a chunk may be shorter
pub const READ_BUFFER_SIZE: usize = 4096;

/// Hands out one reader, once
///
/// The first `request_access` takes the reader; later requests behave like
/// a user who closed the chooser without picking a device.
pub struct StreamHost<R> {
    reader: RefCell<Option<R>>,
    label: String,
}

impl<R> StreamHost<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader: RefCell::new(Some(reader)),
            label: label.into(),
        }
    }
}

impl<R: AsyncRead + Unpin + 'static> SerialHost for StreamHost<R> {
    type Source = StreamSource<R>;

    async fn request_access(&self) -> Result<StreamSource<R>, SourceError> {
        let reader = self
            .reader
            .borrow_mut()
            .take()
            .ok_or(SourceError::NoDeviceSelected)?;
        actor_info!("Granted {}", self.label);
        Ok(StreamSource::new(reader))
    }
}

/// Byte source backed by an `AsyncRead`
///
/// A zero-length read is end-of-stream. Dropping the pending read future is
/// enough to cancel it; `close` drops the reader.
pub struct StreamSource<R> {
    reader: Option<R>,
    config: Option<SerialConfig>,
    buf: Vec<u8>,
}

impl<R> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            config: None,
            buf: vec![0; READ_BUFFER_SIZE],
        }
    }

    /// Line parameters passed to `open`
    pub fn config(&self) -> Option<&SerialConfig> {
        self.config.as_ref()
    }
}

fn classify_io(err: io::Error) -> SourceError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => SourceError::PermissionDenied(err.to_string()),
        io::ErrorKind::NotFound
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::UnexpectedEof => SourceError::NetworkError(err.to_string()),
        io::ErrorKind::InvalidInput => SourceError::InvalidConfiguration(err.to_string()),
        _ => SourceError::Other(err.to_string()),
    }
}

impl<R: AsyncRead + Unpin + 'static> ByteSource for StreamSource<R> {
    async fn open(&mut self, config: &SerialConfig) -> Result<(), SourceError> {
        if self.reader.is_none() {
            return Err(SourceError::InvalidState("Stream already closed".into()));
        }
        actor_debug!("Stream opened ({} baud requested)", config.baud_rate);
        self.config = Some(config.clone());
        Ok(())
    }

    async fn read(&mut self) -> Result<ReadOutcome, SourceError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| SourceError::InvalidState("Stream is closed".into()))?;

        let n = reader.read(&mut self.buf).await.map_err(classify_io)?;
        if n == 0 {
            return Ok(ReadOutcome::EndOfStream);
        }
        Ok(ReadOutcome::Chunk(
            self.buf.get(..n).map(<[u8]>::to_vec).unwrap_or_default(),
        ))
    }

    async fn cancel_read(&mut self) -> Result<(), SourceError> {
        // Nothing outstanding once the read future is dropped
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        if self.reader.take().is_some() {
            actor_debug!("Stream closed");
        }
        Ok(())
    }
}
