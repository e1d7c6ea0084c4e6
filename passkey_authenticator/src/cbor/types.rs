/// A CBOR data item.
///
/// Negative integers carry their actual (negative) value; the encoder turns
/// `v` into the wire argument `-1 - v`. Maps keep their entries in
/// encounter order, and within this crate their keys are either all
/// integers or all text strings.
#[derive(Debug, Clone, PartialEq)]
pub enum CborValue {
    Unsigned(u64),
    Negative(i64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<CborValue>),
    Map(Vec<(CborValue, CborValue)>),
    Bool(bool),
    Null,
    Float32(f32),
    Float64(f64),
}

impl CborValue {
    /// Builds a map keyed by text strings.
    pub fn text_map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CborValue)>,
    {
        CborValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (CborValue::Text(k.into()), v))
                .collect(),
        )
    }

    /// Builds a map keyed by integers.
    pub fn int_map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, CborValue)>,
    {
        CborValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (CborValue::from(k), v))
                .collect(),
        )
    }

    pub fn empty_map() -> Self {
        CborValue::Map(Vec::new())
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            CborValue::Unsigned(u) => Some(i128::from(*u)),
            CborValue::Negative(n) => Some(i128::from(*n)),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CborValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CborValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CborValue]> {
        match self {
            CborValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(CborValue, CborValue)]> {
        match self {
            CborValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up `key` in a text-keyed map. Returns `None` for non-maps.
    pub fn map_get_text(&self, key: &str) -> Option<&CborValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_text() == Some(key))
            .map(|(_, v)| v)
    }

    /// Looks up `key` in an integer-keyed map. Returns `None` for non-maps.
    pub fn map_get_int(&self, key: i64) -> Option<&CborValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_integer() == Some(i128::from(key)))
            .map(|(_, v)| v)
    }

    pub(crate) fn is_integer(&self) -> bool {
        matches!(self, CborValue::Unsigned(_) | CborValue::Negative(_))
    }
}

impl From<i64> for CborValue {
    fn from(v: i64) -> Self {
        if v < 0 {
            CborValue::Negative(v)
        } else {
            CborValue::Unsigned(v as u64)
        }
    }
}

impl From<u64> for CborValue {
    fn from(v: u64) -> Self {
        CborValue::Unsigned(v)
    }
}

impl From<&str> for CborValue {
    fn from(v: &str) -> Self {
        CborValue::Text(v.to_string())
    }
}

impl From<String> for CborValue {
    fn from(v: String) -> Self {
        CborValue::Text(v)
    }
}

impl From<Vec<u8>> for CborValue {
    fn from(v: Vec<u8>) -> Self {
        CborValue::Bytes(v)
    }
}

impl From<&[u8]> for CborValue {
    fn from(v: &[u8]) -> Self {
        CborValue::Bytes(v.to_vec())
    }
}

impl From<bool> for CborValue {
    fn from(v: bool) -> Self {
        CborValue::Bool(v)
    }
}
