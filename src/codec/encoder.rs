use super::{size_len, write_size};

/// Builds one contiguous encoded buffer.
///
/// ```
/// use vaultlock::codec::{Decoder, Encoder};
///
/// let bytes = Encoder::with_prefix(&[1])
///     .property(b"alias")
///     .value(b"tail")
///     .finish();
///
/// let mut decoder = Decoder::new(&bytes);
/// assert!(decoder.check_value_equals(&[1]).unwrap());
/// assert_eq!(decoder.read_property().unwrap(), b"alias");
/// assert_eq!(decoder.read_final(), b"tail");
/// ```
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Start an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a buffer with fixed leading bytes (usually a format version).
    pub fn with_prefix(prefix: &[u8]) -> Self {
        Self {
            buf: prefix.to_vec(),
        }
    }

    /// Append a size-prefixed property.
    pub fn property(mut self, bytes: &[u8]) -> Self {
        self.buf.reserve(size_len(bytes.len()) + bytes.len());
        write_size(&mut self.buf, bytes.len());
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a property, writing a zero-length marker for `None`.
    pub fn optional_property(self, bytes: Option<&[u8]>) -> Self {
        self.property(bytes.unwrap_or_default())
    }

    /// Append raw bytes with no size prefix.
    pub fn value(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a count prefix followed by each property.
    pub fn property_list<I, P>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = P>,
        I::IntoIter: ExactSizeIterator,
        P: AsRef<[u8]>,
    {
        let properties = properties.into_iter();
        write_size(&mut self.buf, properties.len());
        for property in properties {
            self = self.property(property.as_ref());
        }
        self
    }

    /// Append a map as a property list of alternating keys and values,
    /// in iteration order.
    pub fn property_map<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let entries = entries.into_iter();
        write_size(&mut self.buf, entries.len() * 2);
        for (key, value) in entries {
            self = self.property(key.as_ref()).property(value.as_ref());
        }
        self
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the finished buffer.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
