// Copyright 2026 scrollfeed Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    backtrace::Backtrace,
    fmt::{Debug, Display},
    sync::Arc,
};

/// All kinds of scrollfeed errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// I/O error.
    Io,
    /// Invalid configuration, detected before any feed state exists.
    Config,
    /// Media could not be fetched.
    Fetch,
    /// Media was fetched but could not be decoded.
    Decode,
    /// A media producer finished without producing anything.
    Empty,
    /// The content provider failed to produce a page.
    Provider,
    /// The worker pool is closed.
    Closed,
    /// A worker task panicked or was cancelled.
    Join,
}

impl ErrorKind {
    /// Convert self into static str.
    pub fn into_static(self) -> &'static str {
        self.into()
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

impl From<ErrorKind> for &'static str {
    fn from(v: ErrorKind) -> &'static str {
        match v {
            ErrorKind::Io => "I/O error",
            ErrorKind::Config => "Config error",
            ErrorKind::Fetch => "Fetch error",
            ErrorKind::Decode => "Decode error",
            ErrorKind::Empty => "Empty result",
            ErrorKind::Provider => "Provider error",
            ErrorKind::Closed => "Closed",
            ErrorKind::Join => "Join error",
        }
    }
}

/// The error returned by every fallible scrollfeed operation.
///
/// An error carries a [`ErrorKind`], a message, optional key/value context and an optional
/// source error. Errors are cheap to clone: the source and the backtrace are shared, which
/// is what lets a single failed fetch be reported to every interested listener.
///
/// `Display` prints a single line:
///
/// ```shell
/// Fetch error, context: { key: https://example.com/a.png } => media fetch failed, source: connection reset
/// ```
///
/// `Debug` prints the same information over multiple lines, followed by the backtrace if one
/// was captured. `{:#?}` falls back to the conventional struct representation.
pub struct Error {
    kind: ErrorKind,
    message: String,

    context: Vec<(&'static str, String)>,

    source: Option<Arc<anyhow::Error>>,
    backtrace: Option<Arc<Backtrace>>,
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("source", &self.source);
            de.field("backtrace", &self.backtrace);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "  {k}: {v}")?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "Source:")?;
            writeln!(f, "  {source:#}")?;
        }

        if let Some(backtrace) = &self.backtrace {
            writeln!(f)?;
            writeln!(f, "Backtrace:")?;
            writeln!(f, "{backtrace}")?;
        }

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            let mut iter = self.context.iter().peekable();
            while let Some((k, v)) = iter.next() {
                write!(f, "{k}: {v}")?;
                if iter.peek().is_some() {
                    write!(f, ", ")?;
                }
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref().as_ref())
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            context: self.context.clone(),
            source: self.source.clone(),
            backtrace: self.backtrace.clone(),
        }
    }
}

impl Error {
    /// Create a new error.
    ///
    /// ```rust
    /// # use scrollfeed_common::error::{Error, ErrorKind};
    /// let io_error = std::io::Error::other("connection reset");
    /// let err = Error::new(ErrorKind::Fetch, "media fetch failed").with_source(io_error);
    /// assert_eq!(err.kind(), ErrorKind::Fetch);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
            backtrace: Some(Arc::new(Backtrace::capture())),
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Set source for error.
    ///
    /// # Notes
    ///
    /// Setting the source twice triggers a debug assertion.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "the source error has been set");
        self.source = Some(Arc::new(source.into()));
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the error context.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Get the error backtrace.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_deref()
    }

    /// Get the error source.
    pub fn source(&self) -> Option<&anyhow::Error> {
        self.source.as_deref()
    }

    /// Downcast the reference of the source error to a specific error type reference.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source.as_deref().and_then(|e| e.downcast_ref::<E>())
    }
}

/// Result type for scrollfeed.
pub type Result<T> = std::result::Result<T, Error>;

/// Helper methods for Error.
impl Error {
    /// Helper for creating an [`ErrorKind::Io`] error from [`std::io::Error`].
    pub fn io_error(source: std::io::Error) -> Self {
        Error::new(ErrorKind::Io, "").with_source(source)
    }

    /// Helper for creating an [`ErrorKind::Config`] error about one option.
    pub fn config(option: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::new(ErrorKind::Config, reason)
            .with_context("option", option)
            .with_context("value", value)
    }

    /// Helper for creating an [`ErrorKind::Closed`] error.
    pub fn closed() -> Self {
        Error::new(ErrorKind::Closed, "worker pool is closed")
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::io_error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<Error>();
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct DecodeFailure(String);

    impl std::fmt::Display for DecodeFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "DecodeFailure: {}", self.0)
        }
    }

    impl std::error::Error for DecodeFailure {}

    #[test]
    fn test_error_display() {
        let io_error = std::io::Error::other("connection reset");
        let err = Error::new(ErrorKind::Fetch, "media fetch failed")
            .with_source(io_error)
            .with_context("key", "https://example.com/a.png")
            .with_context("attempt", 1);

        assert_eq!(
            "Fetch error, context: { key: https://example.com/a.png, attempt: 1 } => media fetch failed, source: connection reset",
            err.to_string()
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::config("page_size", 0, "must be positive");
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(
            "Config error, context: { option: page_size, value: 0 } => must be positive",
            err.to_string()
        );
    }

    #[test]
    fn test_error_clone_shares_source() {
        let inner = DecodeFailure("truncated png".to_string());
        let err = Error::new(ErrorKind::Decode, "").with_source(inner.clone());
        let cloned = err.clone();

        assert_eq!(cloned.kind(), ErrorKind::Decode);
        assert_eq!(cloned.downcast_ref::<DecodeFailure>().unwrap(), &inner);
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
