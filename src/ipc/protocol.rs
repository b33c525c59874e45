//! Line-oriented wire format shared by the daemon and `mdc`.
//!
//! # Request
//!
//! ```text
//! 3\n
//! focused\n
//! --attrib\n
//! name\n
//! ```
//!
//! A decimal argument count followed by exactly that many lines, one
//! argument each.
//!
//! # Response
//!
//! ```text
//! 0\n          status: 0 = success, 1 = error
//! work\n       optional message, only when non-empty
//! ```
//!
//! The daemon closes the connection after the response, except for a
//! subscription, which instead receives a `0` status line on the first
//! tick followed by one rendering per tick.

use std::io::{self, BufRead, Write};

/// Most arguments a single request may carry.
pub const MAX_ARGS: usize = 255;

/// Status code on the first line of every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success = 0,
    Error = 1,
}

impl Status {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Status::Success),
            1 => Some(Status::Error),
            _ => None,
        }
    }
}

/// A complete response to a one-shot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub message: String,
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }
}

/// Malformed or truncated request or response.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed before the argument count")]
    MissingCount,
    #[error("non-integer argument count {0:?}")]
    BadCount(String),
    #[error("argument count {0} exceeds the limit of {max}", max = MAX_ARGS)]
    TooManyArgs(usize),
    #[error("connection closed after {read} of {expected} arguments")]
    Truncated { read: usize, expected: usize },
    #[error("invalid status line {0:?}")]
    BadStatus(String),
}

/// Read one newline-terminated line without its terminator.
///
/// Returns `None` at end of stream or when the final line lacks its `\n`.
fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if !line.ends_with('\n') {
        return Ok(None);
    }
    line.pop();
    Ok(Some(line))
}

/// Read a request: the argument count, then that many argument lines.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Vec<String>, FrameError> {
    let count_line = read_line(reader)?.ok_or(FrameError::MissingCount)?;
    let expected: usize = count_line
        .trim()
        .parse()
        .map_err(|_| FrameError::BadCount(count_line.clone()))?;
    if expected > MAX_ARGS {
        return Err(FrameError::TooManyArgs(expected));
    }

    let mut args = Vec::with_capacity(expected);
    while args.len() < expected {
        match read_line(reader)? {
            Some(arg) => args.push(arg),
            None => {
                return Err(FrameError::Truncated {
                    read: args.len(),
                    expected,
                })
            }
        }
    }
    Ok(args)
}

/// Write a request.  Used by the client.
pub fn write_request<W: Write>(writer: &mut W, args: &[String]) -> io::Result<()> {
    writeln!(writer, "{}", args.len())?;
    for arg in args {
        writeln!(writer, "{}", arg)?;
    }
    writer.flush()
}

/// Write a response: the status line and, if non-empty, the message.
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    write_status(writer, response.status)?;
    if !response.message.is_empty() {
        writeln!(writer, "{}", response.message)?;
    }
    writer.flush()
}

/// Write a bare status line.
pub fn write_status<W: Write>(writer: &mut W, status: Status) -> io::Result<()> {
    writeln!(writer, "{}", status.code())
}

/// Read the status line of a response.  Used by the client, which then
/// copies whatever follows.  Codes other than `0` and `1` are rejected.
pub fn read_status<R: BufRead>(reader: &mut R) -> Result<Status, FrameError> {
    let line = read_line(reader)?.ok_or(FrameError::BadStatus(String::new()))?;
    line.trim()
        .parse()
        .ok()
        .and_then(Status::from_code)
        .ok_or(FrameError::BadStatus(line))
}

//  Tests
