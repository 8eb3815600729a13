//! Fixed-offset account layouts.
//!
//! A layout is an ordered table of `(name, FieldKind)` pairs. Decoding walks the table once
//! with a [`LayoutReader`], which hands out typed values in declaration order and reports the
//! offending field by name when the buffer is truncated or carries an invalid byte.

use solana_sdk::pubkey::Pubkey;

use crate::error::{ClientError, ClientResult};

const PUBKEY_BYTES: usize = 32;

/// Fixed-width field kinds found in program accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 8 bytes, little-endian
    U64,
    /// 1 byte, 0 or 1
    Bool,
    /// 32 raw bytes
    Pubkey,
    /// 1-byte presence flag, followed by 32 bytes only when present
    OptionPubkey,
}

impl FieldKind {
    /// Smallest number of bytes the field can occupy.
    pub const fn min_size(self) -> usize {
        match self {
            FieldKind::U64 => 8,
            FieldKind::Bool => 1,
            FieldKind::Pubkey => PUBKEY_BYTES,
            FieldKind::OptionPubkey => 1,
        }
    }

    /// Largest number of bytes the field can occupy.
    pub const fn max_size(self) -> usize {
        match self {
            FieldKind::OptionPubkey => 1 + PUBKEY_BYTES,
            other => other.min_size(),
        }
    }
}

pub type Layout = [(&'static str, FieldKind)];

/// Minimum encoded length of a layout (every optional field absent).
pub const fn min_len(layout: &Layout) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < layout.len() {
        total += layout[i].1.min_size();
        i += 1;
    }
    total
}

/// Maximum encoded length of a layout (every optional field present).
pub const fn max_len(layout: &Layout) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < layout.len() {
        total += layout[i].1.max_size();
        i += 1;
    }
    total
}

/// Cursor over an account buffer driven by a layout table.
pub struct LayoutReader<'a> {
    account: &'static str,
    data: &'a [u8],
    offset: usize,
    layout: &'static Layout,
    field: usize,
}

impl<'a> LayoutReader<'a> {
    /// Creates a reader, rejecting buffers that cannot hold the layout's minimum size.
    pub fn new(
        account: &'static str,
        layout: &'static Layout,
        data: &'a [u8],
    ) -> ClientResult<Self> {
        let required = min_len(layout);
        if data.len() < required {
            return Err(ClientError::Decode {
                account,
                reason: format!(
                    "buffer is {} bytes, layout requires at least {}",
                    data.len(),
                    required
                ),
            });
        }
        Ok(Self { account, data, offset: 0, layout, field: 0 })
    }

    pub fn read_u64(&mut self) -> ClientResult<u64> {
        let name = self.next_field(FieldKind::U64)?;
        let bytes = self.take(name, 8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_bool(&mut self) -> ClientResult<bool> {
        let name = self.next_field(FieldKind::Bool)?;
        let byte = self.take(name, 1)?[0];
        self.flag(name, byte)
    }

    pub fn read_pubkey(&mut self) -> ClientResult<Pubkey> {
        let name = self.next_field(FieldKind::Pubkey)?;
        self.take_pubkey(name)
    }

    pub fn read_option_pubkey(&mut self) -> ClientResult<Option<Pubkey>> {
        let name = self.next_field(FieldKind::OptionPubkey)?;
        let tag = self.take(name, 1)?[0];
        if self.flag(name, tag)? {
            Ok(Some(self.take_pubkey(name)?))
        } else {
            Ok(None)
        }
    }

    /// Ensures every field of the layout was consumed. Trailing bytes are allowed.
    pub fn finish(self) -> ClientResult<()> {
        if self.field != self.layout.len() {
            return Err(self.error(format!(
                "layout has {} fields, decoder read {}",
                self.layout.len(),
                self.field
            )));
        }
        Ok(())
    }

    fn next_field(&mut self, kind: FieldKind) -> ClientResult<&'static str> {
        let Some(&(name, expected)) = self.layout.get(self.field) else {
            return Err(self.error("read past the end of the layout".to_string()));
        };
        if expected != kind {
            return Err(
                self.error(format!("field `{}` is {:?}, read as {:?}", name, expected, kind))
            );
        }
        self.field += 1;
        Ok(name)
    }

    fn take(&mut self, name: &'static str, len: usize) -> ClientResult<&'a [u8]> {
        let end = self.offset + len;
        if end > self.data.len() {
            return Err(self.error(format!(
                "field `{}` at offset {} needs {} bytes, buffer has {}",
                name,
                self.offset,
                len,
                self.data.len()
            )));
        }
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn take_pubkey(&mut self, name: &'static str) -> ClientResult<Pubkey> {
        let bytes = self.take(name, PUBKEY_BYTES)?;
        let mut buf = [0u8; PUBKEY_BYTES];
        buf.copy_from_slice(bytes);
        Ok(Pubkey::new_from_array(buf))
    }

    fn flag(&self, name: &'static str, byte: u8) -> ClientResult<bool> {
        match byte {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.error(format!(
                "field `{}` at offset {} has invalid flag byte {}",
                name,
                self.offset - 1,
                other
            ))),
        }
    }

    fn error(&self, reason: String) -> ClientError {
        ClientError::Decode { account: self.account, reason }
    }
}
