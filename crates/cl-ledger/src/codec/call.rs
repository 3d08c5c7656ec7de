//! Call body: selector and length-prefixed arguments.
//!
//! ```text
//! selector:[u8; 4] | argc:u16 BE | argc x (len:u32 BE | bytes)
//! ```

use crate::domain::value_objects::{Bytes, Selector};
use crate::errors::LedgerError;

/// Decoded call: a selector plus raw argument blobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallData {
    /// Operation selector.
    pub selector: Selector,
    /// Arguments, uninterpreted.
    pub args: Vec<Bytes>,
}

impl CallData {
    /// Creates call data.
    #[must_use]
    pub fn new(selector: Selector, args: Vec<Bytes>) -> Self {
        Self { selector, args }
    }

    /// Serialize the call body.
    ///
    /// # Errors
    ///
    /// `MalformedEnvelope` if there are more than `u16::MAX` arguments or an
    /// argument exceeds `u32::MAX` bytes.
    pub fn to_body(&self) -> Result<Vec<u8>, LedgerError> {
        let argc = u16::try_from(self.args.len())
            .map_err(|_| LedgerError::MalformedEnvelope("too many arguments"))?;

        let args_len: usize = self.args.iter().map(|arg| 4 + arg.len()).sum();
        let mut body = Vec::with_capacity(Selector::LEN + 2 + args_len);
        body.extend_from_slice(self.selector.as_bytes());
        body.extend_from_slice(&argc.to_be_bytes());

        for arg in &self.args {
            let len = u32::try_from(arg.len())
                .map_err(|_| LedgerError::MalformedEnvelope("argument too large"))?;
            body.extend_from_slice(&len.to_be_bytes());
            body.extend_from_slice(arg.as_slice());
        }
        Ok(body)
    }

    /// Parse a call body. The whole slice must be consumed.
    ///
    /// # Errors
    ///
    /// `MalformedEnvelope` if the body is short, an argument overruns the
    /// buffer, or bytes remain after the last argument.
    pub fn from_body(body: &[u8]) -> Result<Self, LedgerError> {
        let mut reader = Reader { buf: body };

        let mut selector = [0u8; Selector::LEN];
        selector.copy_from_slice(reader.take(Selector::LEN, "missing selector")?);

        let argc_bytes = reader.take(2, "missing argument count")?;
        let argc = u16::from_be_bytes([argc_bytes[0], argc_bytes[1]]);

        let mut args = Vec::with_capacity(usize::from(argc).min(body.len() / 4));
        for _ in 0..argc {
            let len_bytes = reader.take(4, "missing argument length")?;
            let len =
                u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
            let arg = reader.take(len as usize, "argument overruns body")?;
            args.push(Bytes::from_slice(arg));
        }

        if !reader.buf.is_empty() {
            return Err(LedgerError::MalformedEnvelope("trailing bytes in body"));
        }

        Ok(Self {
            selector: Selector::new(selector),
            args,
        })
    }
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], LedgerError> {
        if self.buf.len() < n {
            return Err(LedgerError::MalformedEnvelope(what));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }
}
