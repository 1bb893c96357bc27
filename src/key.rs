use crate::prelude::*;
use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeTuple,
    Deserialize, Deserializer, Serializer,
};
use std::str::FromStr;

/// Text key of exactly `N` bytes on disk.
///
/// The text is stored as UTF-8 followed by NUL padding, so byte order of the
/// padded arrays is the byte order of the texts. Text longer than `N` bytes or
/// containing NUL is rejected.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedStr<N> {
    /// Stored width in bytes.
    pub const WIDTH: usize = N;

    /// Validates `text` and pads it to `N` bytes.
    pub fn new(text: &str) -> Result<Self> {
        if text.len() > N {
            let cause = format!("{:?} is {} bytes long, limit is {}", text, text.len(), N);
            return Err(Error::invalid_key(cause).into());
        }
        if text.contains('\0') {
            return Err(Error::invalid_key(format!("{:?} contains NUL", text)).into());
        }
        let mut bytes = [0; N];
        bytes[..text.len()].copy_from_slice(text.as_bytes());
        Ok(Self { bytes })
    }

    fn from_padded(bytes: [u8; N]) -> Result<Self> {
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(N);
        if bytes[len..].iter().any(|&b| b != 0) {
            return Err(Error::invalid_key("text after NUL padding").into());
        }
        std::str::from_utf8(&bytes[..len]).map_err(Error::new)?;
        Ok(Self { bytes })
    }

    /// The text without padding.
    pub fn as_str(&self) -> &str {
        // every constructor checks utf-8
        std::str::from_utf8(&self.bytes[..self.len()]).unwrap_or_default()
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.bytes.iter().position(|&b| b == 0).unwrap_or(N)
    }

    /// `true` for the empty text, which is also the default.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self { bytes: [0; N] }
    }
}

impl<const N: usize> Debug for FixedStr<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("FixedStr").field(&self.as_str()).finish()
    }
}

impl<const N: usize> Display for FixedStr<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> FromStr for FixedStr<N> {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl<const N: usize> TryFrom<&str> for FixedStr<N> {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl<const N: usize> Serialize for FixedStr<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(N)?;
        for byte in &self.bytes {
            tuple.serialize_element(byte)?;
        }
        tuple.end()
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedStr<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_tuple(N, FixedStrVisitor::<N>)
    }
}

struct FixedStrVisitor<const N: usize>;

impl<'de, const N: usize> Visitor<'de> for FixedStrVisitor<N> {
    type Value = FixedStr<N>;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} bytes of NUL padded text", N)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut bytes = [0; N];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        FixedStr::from_padded(bytes).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Name = FixedStr<8>;

    #[test]
    fn pads_to_width() {
        let name = Name::new("folio").unwrap();
        assert_eq!(name.as_str(), "folio");
        assert_eq!(name.len(), 5);
        assert_eq!(serialize(&name).unwrap(), b"folio\0\0\0".to_vec());
        assert_eq!(serialized_size(&Name::default()).unwrap(), 8);
        assert!(Name::default().is_empty());
        assert_eq!(Name::new("12345678").unwrap().len(), 8);
    }

    #[test]
    fn rejects_invalid_text() {
        for text in ["123456789", "a\0b"] {
            let err = Name::new(text).unwrap_err();
            let kind = err.downcast_ref::<Error>().map(Error::kind);
            assert!(matches!(kind, Some(ErrorKind::InvalidKey(_))), "{}", text);
        }
    }

    #[test]
    fn orders_like_text() {
        let mut names = ["b", "ab", "a", "abc", ""]
            .iter()
            .map(|s| Name::new(s).unwrap())
            .collect::<Vec<_>>();
        names.sort();
        let sorted = names.iter().map(Name::as_str).collect::<Vec<_>>();
        assert_eq!(sorted, vec!["", "a", "ab", "abc", "b"]);
    }

    #[test]
    fn restores_from_bytes() {
        let name = Name::new("ünï").unwrap();
        let raw = serialize(&name).unwrap();
        assert_eq!(deserialize::<Name>(&raw).unwrap(), name);
        assert_eq!(name.to_string(), "ünï");
        assert_eq!(format!("{:?}", name), "FixedStr(\"ünï\")");
    }

    #[test]
    fn rejects_garbage_bytes() {
        assert!(deserialize::<Name>(b"ab\0cd\0\0\0").is_err());
        assert!(deserialize::<Name>(&[0xff, 0, 0, 0, 0, 0, 0, 0]).is_err());
        assert!(deserialize::<Name>(b"short").is_err());
    }
}
