//! Frame Transport: owns the serial handle and the receive accumulator,
//! and turns it into a `write_frame`/`read_frame` interface over
//! delimiter-separated, byte-stuffed frames.

use crate::error::ClientError;
use std::io::{Read, Write};
use std::time::{Duration, Instant};
use uftp_protocol::FRAME_DELIMITER;

/// 8-N-1, no parity, no flow control unless the caller asks for RTS/CTS.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port: String,
    pub baud: u32,
    pub rtscts: bool,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>, baud: u32) -> Self {
        Self {
            port: port.into(),
            baud,
            rtscts: true,
        }
    }

    pub fn with_rtscts(mut self, enabled: bool) -> Self {
        self.rtscts = enabled;
        self
    }
}

/// The underlying endpoint. A real serial port sets a native read
/// timeout and blocks there directly. A pseudo-terminal (used by the
/// integration test suite's loopback harness) doesn't honor
/// `set_timeout` the way a UART-backed port does, so it's read with a
/// non-blocking poll + select loop instead.
enum PortHandle {
    Serial(Box<dyn serialport::SerialPort>),
    #[cfg(unix)]
    Pty(std::fs::File),
}

/// Owns one serial endpoint plus the bytes read from it that have not
/// yet been split out into a frame.
///
/// Invariant: the accumulator never contains a delimiter byte — any
/// delimiter splits a frame out of it immediately.
pub struct Transport {
    port: PortHandle,
    accumulator: Vec<u8>,
    baud: u32,
}

impl Transport {
    /// Opens a real serial port in raw, binary-clean mode.
    pub fn open(config: &SerialConfig) -> Result<Self, ClientError> {
        let port = serialport::new(&config.port, config.baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(if config.rtscts {
                serialport::FlowControl::Hardware
            } else {
                serialport::FlowControl::None
            })
            .timeout(Duration::from_millis(50))
            .open()
            .map_err(ClientError::OpenFailed)?;

        Ok(Self {
            port: PortHandle::Serial(port),
            accumulator: Vec::new(),
            baud: config.baud,
        })
    }

    /// Opens a pseudo-terminal device path (e.g. the slave side of a
    /// loopback pair created by the integration test harness) for use as
    /// a fake serial endpoint.
    #[cfg(unix)]
    pub fn open_pty(path: &str, baud: u32) -> Result<Self, ClientError> {
        use std::fs::OpenOptions;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(ClientError::Io)?;

        configure_pty_raw(&file)?;

        Ok(Self {
            port: PortHandle::Pty(file),
            accumulator: Vec::new(),
            baud,
        })
    }

    /// Writes a byte-stuffed payload as a delimited frame, then blocks
    /// for the estimated transmission time so the bytes have physically
    /// left the host before the next call runs.
    ///
    /// Many USB-serial adapters acknowledge the write syscall before the
    /// bytes have actually left the wire; the pause below deliberately
    /// overestimates to absorb interbyte gap and driver buffering.
    pub fn write_frame(&mut self, stuffed: &[u8]) -> Result<(), ClientError> {
        let mut buf = Vec::with_capacity(stuffed.len() + 1);
        buf.extend_from_slice(stuffed);
        buf.push(FRAME_DELIMITER);

        self.raw_write(&buf)?;

        let transmit_secs = 2.0 * (buf.len() as f64 * 10.0 / self.baud as f64);
        std::thread::sleep(Duration::from_secs_f64(transmit_secs));
        Ok(())
    }

    /// Reads from the endpoint until the first delimiter byte, returning
    /// all bytes preceding it. Bytes after the delimiter stay buffered in
    /// the accumulator for the next call. Bounded by `deadline`.
    pub fn read_frame(&mut self, deadline: Instant) -> Result<Vec<u8>, ClientError> {
        loop {
            if let Some(pos) = self.accumulator.iter().position(|&b| b == FRAME_DELIMITER) {
                let frame: Vec<u8> = self.accumulator.drain(..=pos).collect();
                return Ok(frame[..frame.len() - 1].to_vec());
            }

            if Instant::now() >= deadline {
                return Err(ClientError::ReadTimeout);
            }

            let mut chunk = [0u8; 256];
            let n = self.read_some(&mut chunk, deadline)?;
            self.accumulator.extend_from_slice(&chunk[..n]);
        }
    }

    /// Reads at most one raw byte, bypassing the frame/accumulator
    /// logic entirely. Used by the Sync Detector, which watches for a
    /// beacon substring rather than delimited frames. Returns `None` on
    /// a read that simply produced no bytes before its internal poll
    /// granularity elapsed (the caller re-checks its own deadline).
    pub fn read_one_raw(&mut self, deadline: Instant) -> Result<Option<u8>, ClientError> {
        let mut buf = [0u8; 1];
        let n = self.read_some(&mut buf, deadline)?;
        Ok((n > 0).then_some(buf[0]))
    }

    /// Test-only: pushes bytes directly onto the wire, bypassing framing
    /// entirely, to simulate noise or a misbehaving peer.
    pub fn raw_write(&mut self, bytes: &[u8]) -> Result<(), ClientError> {
        match &mut self.port {
            PortHandle::Serial(port) => port.write_all(bytes).map_err(ClientError::Io)?,
            #[cfg(unix)]
            PortHandle::Pty(file) => file.write_all(bytes).map_err(ClientError::Io)?,
        }
        Ok(())
    }

    /// Test-only: discards any buffered, not-yet-delimited bytes,
    /// simulating desync recovery.
    pub fn reset_accumulator(&mut self) {
        self.accumulator.clear();
    }

    fn read_some(&mut self, buf: &mut [u8], deadline: Instant) -> Result<usize, ClientError> {
        match &mut self.port {
            PortHandle::Serial(port) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                port.set_timeout(remaining.min(Duration::from_millis(200)).max(Duration::from_millis(1)))
                    .map_err(ClientError::OpenFailed)?;
                match port.read(buf) {
                    Ok(n) => Ok(n),
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
                    Err(e) => Err(ClientError::Io(e)),
                }
            }
            #[cfg(unix)]
            PortHandle::Pty(file) => read_pty_nonblocking(file, buf, deadline),
        }
    }
}

#[cfg(unix)]
fn configure_pty_raw(file: &std::fs::File) -> Result<(), ClientError> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return Err(ClientError::Io(std::io::Error::last_os_error()));
        }
        libc::cfmakeraw(&mut termios);
        if libc::tcsetattr(fd, libc::TCSANOW, &termios) != 0 {
            return Err(ClientError::Io(std::io::Error::last_os_error()));
        }
    }
    Ok(())
}

/// Non-blocking poll + select style read used for the pseudo-terminal
/// endpoint, since `set_timeout` has no meaningful effect on a PTY.
#[cfg(unix)]
fn read_pty_nonblocking(
    file: &mut std::fs::File,
    buf: &mut [u8],
    deadline: Instant,
) -> Result<usize, ClientError> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    let remaining = deadline.saturating_duration_since(Instant::now());
    let timeout_ms = remaining.min(Duration::from_millis(200)).as_millis() as i32;

    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
    if ready < 0 {
        return Err(ClientError::Io(std::io::Error::last_os_error()));
    }
    if ready == 0 || pollfd.revents & libc::POLLIN == 0 {
        return Ok(0);
    }

    match file.read(buf) {
        Ok(n) => Ok(n),
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
        Err(e) => Err(ClientError::Io(e)),
    }
}
