//! We use this mocking module in unit tests to emulate the UPS serial line.

/// Our mock type used to emulate a serial port.
///
/// Like a real port opened with a read timeout, reading after the canned reply is
/// exhausted fails with [`MockSerialError::Timeout`].
pub struct MockSerial {
    /// Everything written to the port
    write_buffer: heapless::Vec<u8, 256>,
    /// Canned reply handed out by read()
    read_buffer: heapless::Vec<u8, 256>,
    read_position: usize,
    /// Largest number of bytes a single read() returns
    max_chunk: usize,
    should_error_on_write: bool,
    should_error_on_read: bool,
    /// Fail with a simulated error instead of timing out once the reply is consumed
    should_error_when_exhausted: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// Nothing left to read
    Timeout,
    BufferOverflow,
    /// Generic simulated error for testing
    SimulatedError,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockSerialError::Timeout => write!(f, "read timed out"),
            MockSerialError::BufferOverflow => write!(f, "mock buffer full"),
            MockSerialError::SimulatedError => write!(f, "simulated serial error"),
        }
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::Timeout => embedded_io::ErrorKind::TimedOut,
            MockSerialError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::BufferOverflow)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }

        let remaining = self.unread_data();
        if remaining.is_empty() {
            if self.should_error_when_exhausted {
                return Err(MockSerialError::SimulatedError);
            }
            return Err(MockSerialError::Timeout);
        }

        let bytes_to_read = buf.len().min(remaining.len()).min(self.max_chunk);
        buf[..bytes_to_read].copy_from_slice(&remaining[..bytes_to_read]);
        self.read_position += bytes_to_read;
        Ok(bytes_to_read)
    }
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            max_chunk: usize::MAX,
            should_error_on_write: false,
            should_error_on_read: false,
            should_error_when_exhausted: false,
        }
    }

    /// Replace the reply returned by read() and rewind to its start.
    pub fn set_read_data(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        self.read_buffer.clear();
        self.read_position = 0;
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
    }

    /// Reply bytes not yet consumed by read().
    pub fn unread_data(&self) -> &[u8] {
        &self.read_buffer[self.read_position..]
    }

    /// Emulate a slow line that delivers at most `max_chunk` bytes per read().
    pub fn set_max_chunk(&mut self, max_chunk: usize) {
        self.max_chunk = max_chunk.max(1);
    }

    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }

    /// Emulate a line that drops mid-reply: the canned bytes are delivered, then read() fails.
    pub fn set_read_error_when_exhausted(&mut self, should_error: bool) {
        self.should_error_when_exhausted = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error, Read, Write};

    #[test]
    fn test_write_accumulates() {
        let mut mock = MockSerial::new();
        mock.write_all(&[0x51, 0xFF]).unwrap();
        mock.write_all(&[0xB3, 0x0D]).unwrap();
        assert_eq!(mock.written_data(), &[0x51, 0xFF, 0xB3, 0x0D]);

        mock.clear_written_data();
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn test_write_buffer_overflow() {
        let mut mock = MockSerial::new();
        let result = mock.write(&[0u8; 300]);
        assert!(matches!(result, Err(MockSerialError::BufferOverflow)));
    }

    #[test]
    fn test_read_then_timeout() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"=abc").unwrap();

        let mut buffer = [0u8; 8];
        assert_eq!(mock.read(&mut buffer).unwrap(), 4);
        assert_eq!(&buffer[..4], b"=abc");

        let result = mock.read(&mut buffer);
        assert!(matches!(result, Err(MockSerialError::Timeout)));
    }

    #[test]
    fn test_read_in_chunks() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"abcdef").unwrap();
        mock.set_max_chunk(4);

        let mut buffer = [0u8; 8];
        assert_eq!(mock.read(&mut buffer).unwrap(), 4);
        assert_eq!(mock.unread_data(), b"ef");
        assert_eq!(mock.read(&mut buffer).unwrap(), 2);
        assert!(mock.unread_data().is_empty());
    }

    #[test]
    fn test_set_read_data_rewinds() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"first").unwrap();
        let mut buffer = [0u8; 2];
        mock.read(&mut buffer).unwrap();

        mock.set_read_data(b"second").unwrap();
        assert_eq!(mock.unread_data(), b"second");
    }

    #[test]
    fn test_error_simulation() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"data").unwrap();
        mock.set_write_error(true);
        mock.set_read_error(true);

        assert!(matches!(mock.write(b"x"), Err(MockSerialError::SimulatedError)));
        assert!(matches!(mock.flush(), Err(MockSerialError::SimulatedError)));
        let mut buffer = [0u8; 4];
        assert!(matches!(
            mock.read(&mut buffer),
            Err(MockSerialError::SimulatedError)
        ));

        mock.set_read_error(false);
        assert_eq!(mock.read(&mut buffer).unwrap(), 4);
    }

    #[test]
    fn test_error_after_reply() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"=a").unwrap();
        mock.set_read_error_when_exhausted(true);

        let mut buffer = [0u8; 4];
        assert_eq!(mock.read(&mut buffer).unwrap(), 2);
        assert!(matches!(
            mock.read(&mut buffer),
            Err(MockSerialError::SimulatedError)
        ));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(MockSerialError::Timeout.to_string(), "read timed out");
        assert_eq!(
            MockSerialError::SimulatedError.to_string(),
            "simulated serial error"
        );
        let source: &dyn core::error::Error = &MockSerialError::BufferOverflow;
        assert_eq!(source.to_string(), "mock buffer full");
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            MockSerialError::Timeout.kind(),
            embedded_io::ErrorKind::TimedOut
        ));
        assert!(matches!(
            MockSerialError::BufferOverflow.kind(),
            embedded_io::ErrorKind::OutOfMemory
        ));
        assert!(matches!(
            MockSerialError::SimulatedError.kind(),
            embedded_io::ErrorKind::Other
        ));
    }
}
