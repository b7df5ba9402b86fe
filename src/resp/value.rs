//! # RESP3 Value Model
//!
//! A RESP3 message is a tagged union of eleven concrete kinds (ten scalar and
//! aggregate types plus attributes, which are never observed standalone).
//! [`Value`] is the tagged-sum representation; [`ValueKind`] carries the
//! payload that is mutually exclusive by construction, since each kind is its
//! own enum variant rather than an optional field on a flat struct.
//!
//! [Official documentation](https://github.com/antirez/RESP3/blob/master/spec.md)

use bytes::Bytes;
use num_bigint::BigInt;

/// One of the eleven RESP3 type tags, plus the attribute tag (`|`), which is
/// only ever consumed by the reader — never stored as a standalone [`Value`].
///
/// Exported for introspection and reused by the serializer so the wire tag
/// byte and the in-memory variant can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    BlobString = b'$',
    SimpleString = b'+',
    SimpleError = b'-',
    Number = b':',
    Null = b'_',
    Double = b',',
    Boolean = b'#',
    BlobError = b'!',
    VerbatimString = b'=',
    BigNumber = b'(',
    Array = b'*',
    Map = b'%',
    Set = b'~',
    Attribute = b'|',
    Push = b'>',
}

impl Tag {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.as_u8()
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Tag, u8> {
        Ok(match byte {
            b'$' => Tag::BlobString,
            b'+' => Tag::SimpleString,
            b'-' => Tag::SimpleError,
            b':' => Tag::Number,
            b'_' => Tag::Null,
            b',' => Tag::Double,
            b'#' => Tag::Boolean,
            b'!' => Tag::BlobError,
            b'=' => Tag::VerbatimString,
            b'(' => Tag::BigNumber,
            b'*' => Tag::Array,
            b'%' => Tag::Map,
            b'~' => Tag::Set,
            b'|' => Tag::Attribute,
            b'>' => Tag::Push,
            other => return Err(other),
        })
    }
}

/// An out-of-band attribute frame: an ordered sequence of key/value pairs
/// attached to the value that follows it.
///
/// A plain `Vec` of pairs rather than a hash map: RESP3 map keys may
/// themselves be any [`Value`] (not just text), and the wire format permits
/// duplicate keys without deduplication — each parsed key is its own
/// constructed value, compared by identity rather than content, exactly as
/// the upstream reader's `linkedhashmap.Map` keyed on pointer identity does.
pub type Pairs = Vec<(Value, Value)>;

/// A single RESP3 protocol value: a tag-determined payload plus an optional
/// out-of-band attribute map.
///
/// Attributes may decorate a value at any nesting depth — an element inside
/// an array can carry its own `attrs` just as the top-level value can.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub attrs: Option<Pairs>,
}

/// The payload of a [`Value`], one variant per RESP3 type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    SimpleString(Bytes),
    SimpleError(Bytes),
    BlobString(Bytes),
    BlobError(Bytes),
    /// `format` is always exactly three ASCII bytes; the wire length field
    /// equals `data.len() + 4` to account for `format` and the `:` separator.
    VerbatimString { format: [u8; 3], data: Bytes },
    Number(i64),
    /// Never NaN: this implementation rejects NaN at construction time
    /// rather than aliasing it to `inf` on the wire the way the upstream
    /// source does (see the Double/NaN design note).
    Double(f64),
    Boolean(bool),
    BigNumber(BigInt),
    Null,
    Array(Vec<Value>),
    Set(Vec<Value>),
    Push(Vec<Value>),
    Map(Pairs),
}

impl ValueKind {
    pub fn tag(&self) -> Tag {
        match self {
            ValueKind::SimpleString(_) => Tag::SimpleString,
            ValueKind::SimpleError(_) => Tag::SimpleError,
            ValueKind::BlobString(_) => Tag::BlobString,
            ValueKind::BlobError(_) => Tag::BlobError,
            ValueKind::VerbatimString { .. } => Tag::VerbatimString,
            ValueKind::Number(_) => Tag::Number,
            ValueKind::Double(_) => Tag::Double,
            ValueKind::Boolean(_) => Tag::Boolean,
            ValueKind::BigNumber(_) => Tag::BigNumber,
            ValueKind::Null => Tag::Null,
            ValueKind::Array(_) => Tag::Array,
            ValueKind::Set(_) => Tag::Set,
            ValueKind::Push(_) => Tag::Push,
            ValueKind::Map(_) => Tag::Map,
        }
    }
}

impl Value {
    fn bare(kind: ValueKind) -> Self {
        Value { kind, attrs: None }
    }

    pub fn simple_string(text: impl Into<Bytes>) -> Self {
        Self::bare(ValueKind::SimpleString(text.into()))
    }

    pub fn simple_error(text: impl Into<Bytes>) -> Self {
        Self::bare(ValueKind::SimpleError(text.into()))
    }

    pub fn blob_string(data: impl Into<Bytes>) -> Self {
        Self::bare(ValueKind::BlobString(data.into()))
    }

    pub fn blob_error(data: impl Into<Bytes>) -> Self {
        Self::bare(ValueKind::BlobError(data.into()))
    }

    pub fn verbatim_string(format: [u8; 3], data: impl Into<Bytes>) -> Self {
        Self::bare(ValueKind::VerbatimString {
            format,
            data: data.into(),
        })
    }

    pub fn number(n: i64) -> Self {
        Self::bare(ValueKind::Number(n))
    }

    /// Panics (in debug builds) if `d` is NaN. RESP3's wire format cannot
    /// tell a NaN `Double` apart from infinity, so this codec refuses to
    /// construct one; callers that might produce NaN should check
    /// `f64::is_nan` before calling this.
    pub fn double(d: f64) -> Self {
        debug_assert!(!d.is_nan(), "RESP3 Double cannot carry NaN");
        Self::bare(ValueKind::Double(d))
    }

    pub fn boolean(b: bool) -> Self {
        Self::bare(ValueKind::Boolean(b))
    }

    pub fn big_number(n: BigInt) -> Self {
        Self::bare(ValueKind::BigNumber(n))
    }

    pub fn null() -> Self {
        Self::bare(ValueKind::Null)
    }

    pub fn array(elems: Vec<Value>) -> Self {
        Self::bare(ValueKind::Array(elems))
    }

    pub fn set(elems: Vec<Value>) -> Self {
        Self::bare(ValueKind::Set(elems))
    }

    pub fn push(elems: Vec<Value>) -> Self {
        Self::bare(ValueKind::Push(elems))
    }

    pub fn map(pairs: Pairs) -> Self {
        Self::bare(ValueKind::Map(pairs))
    }

    /// Attaches an out-of-band attribute map to this value, as the attribute
    /// handler does for the value that follows a `|` frame.
    pub fn with_attrs(mut self, attrs: Pairs) -> Self {
        self.attrs = Some(attrs);
        self
    }

    pub fn tag(&self) -> Tag {
        self.kind.tag()
    }

    /// Projects this value to a language-natural representation, dropping
    /// attributes. See [`SmartValue`].
    pub fn smart_result(&self) -> SmartValue {
        match &self.kind {
            ValueKind::SimpleString(s) | ValueKind::BlobString(s) => SmartValue::Text(s.clone()),
            ValueKind::VerbatimString { data, .. } => SmartValue::Text(data.clone()),
            ValueKind::SimpleError(e) | ValueKind::BlobError(e) => SmartValue::Error(e.clone()),
            ValueKind::Number(n) => SmartValue::Integer(*n),
            ValueKind::Double(d) => SmartValue::Double(*d),
            ValueKind::BigNumber(n) => SmartValue::BigInt(n.clone()),
            ValueKind::Boolean(b) => SmartValue::Boolean(*b),
            ValueKind::Null => SmartValue::Null,
            ValueKind::Array(elems) | ValueKind::Set(elems) | ValueKind::Push(elems) => {
                SmartValue::Array(elems.iter().map(Value::smart_result).collect())
            }
            ValueKind::Map(pairs) => SmartValue::Map(
                pairs
                    .iter()
                    .map(|(k, v)| (k.smart_result(), v.smart_result()))
                    .collect(),
            ),
        }
    }
}

/// A language-natural projection of a [`Value`], produced by
/// [`Value::smart_result`]. Attribute metadata is dropped in this
/// projection; callers that need attributes should inspect [`Value::attrs`]
/// directly before projecting.
#[derive(Debug, Clone, PartialEq)]
pub enum SmartValue {
    Text(Bytes),
    Error(Bytes),
    Integer(i64),
    Double(f64),
    BigInt(BigInt),
    Boolean(bool),
    Null,
    Array(Vec<SmartValue>),
    Map(Vec<(SmartValue, SmartValue)>),
}
