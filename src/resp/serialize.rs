//! # RESP3 Serializer
//!
//! Renders a [`Value`] — attributes then body — back to RESP3 wire bytes.
//! Stateless: a single pass that appends to one growable buffer, recursing
//! into child values for aggregates.

use super::value::{Tag, Value, ValueKind};
use crate::constants::CRLF;

impl Value {
    /// Serializes this value to RESP3 bytes, including its attribute frame
    /// if one is attached.
    pub fn to_resp3_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_into(&mut buf);
        buf
    }

    fn write_into(&self, buf: &mut Vec<u8>) {
        if let Some(attrs) = self.attrs.as_ref().filter(|a| !a.is_empty()) {
            buf.push(Tag::Attribute.as_u8());
            write_count(buf, attrs.len());
            for (key, val) in attrs {
                key.write_into(buf);
                val.write_into(buf);
            }
        }

        buf.push(self.kind.tag().as_u8());
        self.kind.write_body(buf);
    }
}

fn write_count(buf: &mut Vec<u8>, n: usize) {
    buf.extend_from_slice(n.to_string().as_bytes());
    buf.extend_from_slice(CRLF);
}

impl ValueKind {
    fn write_body(&self, buf: &mut Vec<u8>) {
        match self {
            ValueKind::SimpleString(text) | ValueKind::SimpleError(text) => {
                buf.extend_from_slice(text);
                buf.extend_from_slice(CRLF);
            }
            ValueKind::BlobString(data) | ValueKind::BlobError(data) => {
                write_count(buf, data.len());
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            ValueKind::VerbatimString { format, data } => {
                write_count(buf, data.len() + 4);
                buf.extend_from_slice(format);
                buf.push(b':');
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            ValueKind::Number(n) => {
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            ValueKind::Double(d) => {
                if d.is_infinite() {
                    buf.extend_from_slice(if d.is_sign_negative() { b"-inf" } else { b"inf" });
                } else {
                    debug_assert!(!d.is_nan(), "RESP3 Double cannot carry NaN");
                    buf.extend_from_slice(format!("{d}").as_bytes());
                }
                buf.extend_from_slice(CRLF);
            }
            ValueKind::BigNumber(n) => {
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            ValueKind::Null => {
                buf.extend_from_slice(CRLF);
            }
            ValueKind::Boolean(b) => {
                buf.push(if *b { b't' } else { b'f' });
                buf.extend_from_slice(CRLF);
            }
            ValueKind::Array(elems) | ValueKind::Set(elems) | ValueKind::Push(elems) => {
                write_count(buf, elems.len());
                for elem in elems {
                    elem.write_into(buf);
                }
            }
            ValueKind::Map(pairs) => {
                write_count(buf, pairs.len());
                for (key, val) in pairs {
                    key.write_into(buf);
                    val.write_into(buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn serializes_blob_string() {
        assert_eq!(
            Value::blob_string("hello world").to_resp3_bytes(),
            b"$11\r\nhello world\r\n"
        );
    }

    #[test]
    fn serializes_verbatim_string() {
        assert_eq!(
            Value::verbatim_string(*b"txt", "Some string").to_resp3_bytes(),
            b"=15\r\ntxt:Some string\r\n"
        );
    }

    #[test]
    fn serializes_simple_string_and_error() {
        assert_eq!(Value::simple_string("OK").to_resp3_bytes(), b"+OK\r\n");
        assert_eq!(
            Value::simple_error("ERR bad").to_resp3_bytes(),
            b"-ERR bad\r\n"
        );
    }

    #[test]
    fn serializes_number_and_null_and_boolean() {
        assert_eq!(Value::number(-42).to_resp3_bytes(), b":-42\r\n");
        assert_eq!(Value::null().to_resp3_bytes(), b"_\r\n");
        assert_eq!(Value::boolean(true).to_resp3_bytes(), b"#t\r\n");
        assert_eq!(Value::boolean(false).to_resp3_bytes(), b"#f\r\n");
    }

    #[test]
    fn serializes_double_including_infinities() {
        assert_eq!(Value::double(3.0).to_resp3_bytes(), b",3\r\n");
        assert_eq!(Value::double(3.15).to_resp3_bytes(), b",3.15\r\n");
        assert_eq!(
            Value::double(f64::INFINITY).to_resp3_bytes(),
            b",inf\r\n"
        );
        assert_eq!(
            Value::double(f64::NEG_INFINITY).to_resp3_bytes(),
            b",-inf\r\n"
        );
    }

    #[test]
    fn serializes_big_number() {
        let n = BigInt::parse_bytes(b"3492890328409238509324850943850943825024385", 10).unwrap();
        let expected = format!("({n}\r\n");
        assert_eq!(Value::big_number(n).to_resp3_bytes(), expected.as_bytes());
    }

    #[test]
    fn serializes_array() {
        let v = Value::array(vec![Value::number(1), Value::number(2), Value::number(3)]);
        assert_eq!(v.to_resp3_bytes(), b"*3\r\n:1\r\n:2\r\n:3\r\n");
    }

    #[test]
    fn serializes_map_preserving_order() {
        let v = Value::map(vec![
            (Value::simple_string("first"), Value::number(1)),
            (Value::simple_string("second"), Value::number(2)),
        ]);
        assert_eq!(
            v.to_resp3_bytes(),
            b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n"
        );
    }

    #[test]
    fn serializes_push_frame() {
        let v = Value::push(vec![
            Value::simple_string("pubsub"),
            Value::simple_string("message"),
            Value::simple_string("somechannel"),
            Value::simple_string("this is the message"),
        ]);
        assert_eq!(
            v.to_resp3_bytes(),
            b">4\r\n+pubsub\r\n+message\r\n+somechannel\r\n+this is the message\r\n"
        );
    }

    #[test]
    fn serializes_attribute_frame_before_value() {
        let v = Value::array(vec![Value::number(2039123), Value::number(9543892)]).with_attrs(
            vec![(
                Value::simple_string("key-popularity"),
                Value::map(vec![
                    (Value::blob_string("a"), Value::double(0.1923)),
                    (Value::blob_string("b"), Value::double(0.0012)),
                ]),
            )],
        );
        assert_eq!(
            v.to_resp3_bytes(),
            b"|1\r\n+key-popularity\r\n%2\r\n$1\r\na\r\n,0.1923\r\n$1\r\nb\r\n,0.0012\r\n*2\r\n:2039123\r\n:9543892\r\n"
        );
    }

    #[test]
    fn serializes_nested_attributes_on_child_elements() {
        let decorated = Value::number(7).with_attrs(vec![(
            Value::simple_string("ttl"),
            Value::number(120),
        )]);
        let v = Value::array(vec![Value::number(1), decorated]);
        assert_eq!(
            v.to_resp3_bytes(),
            b"*2\r\n:1\r\n|1\r\n+ttl\r\n:120\r\n:7\r\n"
        );
    }
}
