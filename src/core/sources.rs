//! # Termination sources.
//!
//! A [`TerminationSource`] is anything external that can ask the process to stop.
//! The coordinator subscribes to each armed source and calls
//! [`request_shutdown`](crate::ShutdownCoordinator::request_shutdown) every time it fires.
//!
//! ## Built-in sources
//! **Unix platforms** (handlers installed by [`os_sources`] itself):
//! - `ctrl-c` (`SIGINT`, interactive interrupt)
//! - `SIGTERM` (host runtime stop: container stop, systemd, Kubernetes)
//! - `SIGQUIT` (quit signal)
//!
//! **Other platforms:**
//! - `ctrl-c` via [`tokio::signal::ctrl_c`]
//!
//! [`SourceFn`] adapts a closure, for programmatic triggers and tests.

use std::borrow::Cow;
use std::future::Future;

use async_trait::async_trait;

/// Something external that can request shutdown.
///
/// `triggered` completes each time the source fires and may be awaited again
/// afterwards. An `Err` means the source cannot deliver (anymore).
#[async_trait]
pub trait TerminationSource: Send + 'static {
    /// Stable name for logs.
    fn name(&self) -> &str;

    /// Completes the next time the source fires.
    async fn triggered(&mut self) -> std::io::Result<()>;
}

/// Interactive interrupt (Ctrl-C) through [`tokio::signal::ctrl_c`].
///
/// The handler is installed on the first wait; on Unix prefer
/// [`UnixSignal::interrupt`].
#[derive(Debug, Default)]
pub struct CtrlC;

#[async_trait]
impl TerminationSource for CtrlC {
    fn name(&self) -> &str {
        "ctrl-c"
    }

    async fn triggered(&mut self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}

/// A Unix signal.
///
/// The handler is installed when the source is built, so a signal that
/// arrives before the first wait is still delivered to it.
#[cfg(unix)]
#[derive(Debug)]
pub struct UnixSignal {
    name: &'static str,
    stream: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl UnixSignal {
    /// `SIGINT`: interactive interrupt (Ctrl-C).
    pub fn interrupt() -> std::io::Result<Self> {
        Self::new("ctrl-c", tokio::signal::unix::SignalKind::interrupt())
    }

    /// `SIGTERM`: the host asks the process to stop.
    pub fn terminate() -> std::io::Result<Self> {
        Self::new("sigterm", tokio::signal::unix::SignalKind::terminate())
    }

    /// `SIGQUIT`.
    pub fn quit() -> std::io::Result<Self> {
        Self::new("sigquit", tokio::signal::unix::SignalKind::quit())
    }

    /// Must be called from within a tokio runtime.
    fn new(name: &'static str, kind: tokio::signal::unix::SignalKind) -> std::io::Result<Self> {
        Ok(Self {
            name,
            stream: tokio::signal::unix::signal(kind)?,
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl TerminationSource for UnixSignal {
    fn name(&self) -> &str {
        self.name
    }

    async fn triggered(&mut self) -> std::io::Result<()> {
        match self.stream.recv().await {
            Some(()) => Ok(()),
            None => Err(std::io::Error::other("signal stream closed")),
        }
    }
}

/// Closure-backed source; the closure builds the future for each wait.
pub struct SourceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SourceFn<F> {
    /// Creates a closure-backed source.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the source already boxed for [`arm`](crate::ShutdownCoordinator::arm).
    pub fn boxed<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Box<dyn TerminationSource>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = std::io::Result<()>> + Send + 'static,
    {
        Box::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> TerminationSource for SourceFn<F>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = std::io::Result<()>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn triggered(&mut self) -> std::io::Result<()> {
        (self.f)().await
    }
}

/// The termination sources available on this platform, with their handlers
/// already installed.
///
/// Must be called from within a tokio runtime.
#[cfg(unix)]
pub fn os_sources() -> std::io::Result<Vec<Box<dyn TerminationSource>>> {
    Ok(vec![
        Box::new(UnixSignal::interrupt()?),
        Box::new(UnixSignal::terminate()?),
        Box::new(UnixSignal::quit()?),
    ])
}

/// The termination sources available on this platform.
#[cfg(not(unix))]
pub fn os_sources() -> std::io::Result<Vec<Box<dyn TerminationSource>>> {
    Ok(vec![Box::new(CtrlC)])
}
