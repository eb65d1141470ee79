//! Case-insensitive header field collection.
//!
//! Field names are stored lower-cased. A name that arrives more than once is folded into a
//! single value joined with `", "`, keeping the arrival order inside the join
//! (RFC 9110 section 5.2). Fields themselves are iterated in the order they were first seen,
//! which keeps encoded responses deterministic.

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::protocol::HeaderError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a field by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Adds a field, folding it into an existing value of the same name.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let name = validate(name, value)?;
        match self.position(&name) {
            Some(index) => {
                let existing = &mut self.entries[index].1;
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.entries.push((name, value.to_owned())),
        }
        Ok(())
    }

    /// Sets a field, replacing any previous value. Returns the replaced value.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<Option<String>, HeaderError> {
        let name = validate(name, value)?;
        match self.position(&name) {
            Some(index) => Ok(Some(std::mem::replace(&mut self.entries[index].1, value.to_owned()))),
            None => {
                self.entries.push((name, value.to_owned()));
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries.remove(index).1)
    }

    /// Iterates `(name, value)` pairs in first-seen order; names are lower-cased.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the fields into an [`http::HeaderMap`].
    pub fn to_header_map(&self) -> Result<HeaderMap, HeaderError> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| HeaderError::InvalidName { name: name.clone() })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| HeaderError::InvalidValue { name: name.clone() })?;
            map.append(header_name, header_value);
        }
        Ok(map)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Checks a field before it is stored and returns the lower-cased name.
fn validate(name: &str, value: &str) -> Result<String, HeaderError> {
    if name.is_empty() {
        return Err(HeaderError::EmptyName);
    }
    if !is_token(name) {
        return Err(HeaderError::InvalidName { name: name.to_owned() });
    }
    if value.is_empty() {
        return Err(HeaderError::EmptyValue { name: name.to_owned() });
    }
    if value.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0')) {
        return Err(HeaderError::InvalidValue { name: name.to_owned() });
    }
    Ok(name.to_ascii_lowercase())
}

/// Returns true if the final coding of a `Transfer-Encoding` value is `chunked`.
pub(crate) fn is_chunked(codings: &str) -> bool {
    codings.rsplit(',').next().is_some_and(|last| last.trim_matches([' ', '\t']).eq_ignore_ascii_case("chunked"))
}

/// Returns true if `s` is a non-empty RFC 9110 token (section 5.6.2).
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_byte)
}

#[inline]
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_coding_decides_chunked() {
        assert!(is_chunked("chunked"));
        assert!(is_chunked("gzip, Chunked "));
        assert!(!is_chunked("chunked, gzip"));
        assert!(!is_chunked("gzip"));
        assert!(!is_chunked(""));
    }

    #[test]
    fn duplicate_names_fold() {
        let mut headers = Headers::new();
        headers.append("X-Test", "first").unwrap();
        headers.append("X-Test", "second").unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-test"), Some("first, second"));
    }

    #[test]
    fn lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.append("X-Mixed-Case", "Value1").unwrap();
        headers.append("x-mixed-case", "Value2").unwrap();
        headers.append("X-MIXED-CASE", "Value3").unwrap();

        assert_eq!(headers.get("x-mixed-case"), Some("Value1, Value2, Value3"));
        assert_eq!(headers.get("X-Mixed-CASE"), Some("Value1, Value2, Value3"));
        assert_eq!(headers.names().collect::<Vec<_>>(), vec!["x-mixed-case"]);
    }

    #[test]
    fn insert_replaces() {
        let mut headers = Headers::new();
        headers.append("Content-Length", "10").unwrap();
        let old = headers.insert("content-length", "20").unwrap();

        assert_eq!(old.as_deref(), Some("10"));
        assert_eq!(headers.get("Content-Length"), Some("20"));
    }

    #[test]
    fn rejects_empty_and_invalid_fields() {
        let mut headers = Headers::new();

        assert_eq!(headers.append("", "value"), Err(HeaderError::EmptyName));
        assert_eq!(headers.append("X-Empty", ""), Err(HeaderError::EmptyValue { name: "X-Empty".into() }));
        assert_eq!(headers.append("H©st", "x"), Err(HeaderError::InvalidName { name: "H©st".into() }));
        assert_eq!(headers.insert("X-Split", "a\r\nb"), Err(HeaderError::InvalidValue { name: "X-Split".into() }));
        assert!(headers.is_empty());
    }

    #[test]
    fn keeps_first_seen_order() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "text/plain").unwrap();
        headers.append("Connection", "close").unwrap();
        headers.append("content-type", "charset=utf-8").unwrap();

        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("content-type", "text/plain, charset=utf-8"), ("connection", "close")]);
    }

    #[test]
    fn converts_to_header_map() {
        let mut headers = Headers::new();
        headers.append("X-Checksum", "abc").unwrap();

        let map = headers.to_header_map().unwrap();
        assert_eq!(map.get("x-checksum").unwrap(), "abc");
    }

    #[test]
    fn token_charset() {
        assert!(is_token("X-Custom_Header.v1~"));
        assert!(!is_token("Bad Header"));
        assert!(!is_token("Bad:Header"));
        assert!(!is_token(""));
    }
}
