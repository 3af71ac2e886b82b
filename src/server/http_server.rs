//! Listener lifecycle for an [`AppService`](super::AppService).
//!
//! `may_minihttp` runs the accept loop in a coroutine and hands back its join handle.
//! [`ServerHandle`] keeps that handle together with the resolved address so `fany serve`,
//! the demo and the end-to-end tests can wait for the port, stop the loop or block on it.

use may::coroutine::JoinHandle;
use may_minihttp::HttpService;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long [`ServerHandle::wait_ready`] polls before giving up.
pub const READY_TIMEOUT: Duration = Duration::from_millis(250);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A service waiting to be bound.
pub struct HttpServer<T>(pub T);

/// A bound, running server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the listener accepts a TCP connection, for at most [`READY_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// `TimedOut` when nothing accepts in time.
    pub fn wait_ready(&self) -> io::Result<()> {
        wait_for_listener(self.addr, READY_TIMEOUT)
    }

    /// Cancel the accept coroutine and wait for it to unwind.
    pub fn stop(self) {
        // SAFETY: the coroutine is owned by this handle and is joined right after.
        #[allow(unsafe_code)]
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            debug!(addr = %self.addr, "Accept loop unwound with a panic while stopping");
        }
        info!(addr = %self.addr, "HTTP server stopped");
    }

    /// Block for the lifetime of the server.
    ///
    /// # Errors
    ///
    /// The panic payload if the accept loop panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind the first address `addr` resolves to and start serving.
    ///
    /// # Errors
    ///
    /// Resolution failures, an address that resolves to nothing, or a failed bind.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        })?;
        let handle = may_minihttp::HttpServer(self.0).start(addr)?;
        info!(%addr, "HTTP server listening");
        Ok(ServerHandle { addr, handle })
    }
}

/// Poll `addr` with TCP connects until one succeeds or `timeout` elapses.
///
/// # Errors
///
/// `TimedOut` when no connection succeeds in time.
pub fn wait_for_listener(addr: SocketAddr, timeout: Duration) -> io::Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect_timeout(&addr, READY_POLL_INTERVAL).is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("nothing listening on {addr} after {timeout:?}"),
            ));
        }
        thread::sleep(READY_POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_listener_ready() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(wait_for_listener(addr, Duration::from_millis(50)).is_ok());
    }

    #[test]
    fn test_closed_port_times_out() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let err = wait_for_listener(addr, Duration::from_millis(20)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
