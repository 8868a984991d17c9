//! Accepted connections that can be torn down from outside their task.
//!
//! # Responsibilities
//! - Wrap each accepted stream so a server-wide force token reaches it
//! - Fail every read and write once the token is cancelled, which makes the
//!   HTTP/1 and HTTP/2 connection drivers drop the connection together with
//!   any request still being handled
//! - Provide an axum [`Listener`] yielding such streams

use axum::serve::Listener;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Stream whose I/O fails once its force token is cancelled.
pub struct ForceClose<S> {
    inner: S,
    closed: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl<S> ForceClose<S> {
    pub fn new(inner: S, force: &CancellationToken) -> Self {
        Self {
            inner,
            closed: Box::pin(force.clone().cancelled_owned()),
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Registers the task for wake-up and errors once force-closed.
    fn poll_closed(&mut self, cx: &mut Context<'_>) -> io::Result<()> {
        match self.closed.as_mut().poll(cx) {
            Poll::Ready(()) => Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "connection force-closed",
            )),
            Poll::Pending => Ok(()),
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for ForceClose<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        this.poll_closed(cx)?;
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for ForceClose<S> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.poll_closed(cx)?;
        Pin::new(&mut this.inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        this.poll_closed(cx)?;
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// TCP listener for axum whose connections honour a force token.
pub struct ForceClosingListener {
    listener: TcpListener,
    force: CancellationToken,
}

impl ForceClosingListener {
    pub fn new(listener: TcpListener, force: CancellationToken) -> Self {
        Self { listener, force }
    }
}

impl Listener for ForceClosingListener {
    type Io = ForceClose<TcpStream>;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => return (ForceClose::new(stream, &self.force), peer),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        self.listener.local_addr()
    }
}
