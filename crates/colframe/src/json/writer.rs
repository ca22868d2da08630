//! Minimal streaming JSON writer.
//!
//! Tracks separators for nested objects and arrays so callers only emit
//! keys and values. Scalars go through `serde_json`, which writes floats in
//! their shortest round-trip form.

use serde::Serialize;

use crate::error::FrameResult;

/// Appends JSON tokens to a byte buffer.
pub(crate) struct JsonWriter<'a> {
    buf: &'a mut Vec<u8>,
    // One entry per open container: `true` until its first member is written.
    first: Vec<bool>,
    after_key: bool,
}

impl<'a> JsonWriter<'a> {
    pub(crate) fn new(buf: &'a mut Vec<u8>) -> Self {
        Self {
            buf,
            first: Vec::with_capacity(8),
            after_key: false,
        }
    }

    fn separate(&mut self) {
        if self.after_key {
            self.after_key = false;
            return;
        }
        if let Some(first) = self.first.last_mut() {
            if *first {
                *first = false;
            } else {
                self.buf.push(b',');
            }
        }
    }

    pub(crate) fn begin_object(&mut self) {
        self.separate();
        self.buf.push(b'{');
        self.first.push(true);
    }

    pub(crate) fn end_object(&mut self) {
        self.first.pop();
        self.buf.push(b'}');
    }

    pub(crate) fn begin_array(&mut self) {
        self.separate();
        self.buf.push(b'[');
        self.first.push(true);
    }

    pub(crate) fn end_array(&mut self) {
        self.first.pop();
        self.buf.push(b']');
    }

    pub(crate) fn key(&mut self, key: &str) -> FrameResult<()> {
        self.separate();
        serde_json::to_writer(&mut *self.buf, key)?;
        self.buf.push(b':');
        self.after_key = true;
        Ok(())
    }

    pub(crate) fn value<T: Serialize + ?Sized>(&mut self, value: &T) -> FrameResult<()> {
        self.separate();
        serde_json::to_writer(&mut *self.buf, value)?;
        Ok(())
    }

    pub(crate) fn entry<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> FrameResult<()> {
        self.key(key)?;
        self.value(value)
    }

    pub(crate) fn null(&mut self) {
        self.separate();
        self.buf.extend_from_slice(b"null");
    }

    /// Embeds already-encoded JSON text verbatim.
    pub(crate) fn raw(&mut self, json: &str) {
        self.separate();
        self.buf.extend_from_slice(json.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_separators() {
        let mut buf = Vec::new();
        let mut w = JsonWriter::new(&mut buf);
        w.begin_object();
        w.entry("a", &1).unwrap();
        w.key("b").unwrap();
        w.begin_array();
        w.value(&"x").unwrap();
        w.null();
        w.raw(r#"{"k":true}"#);
        w.end_array();
        w.entry("c", &2.5f32).unwrap();
        w.end_object();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            r#"{"a":1,"b":["x",null,{"k":true}],"c":2.5}"#
        );
    }

    #[test]
    fn test_f32_shortest_form() {
        let mut buf = Vec::new();
        let mut w = JsonWriter::new(&mut buf);
        w.value(&0.1f32).unwrap();
        assert_eq!(buf, b"0.1");
    }
}
