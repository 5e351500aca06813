use crate::{Error, LResult, MAX_ARRAY_LEN, MAX_BULK_LEN};
use bytes::Bytes;

/// A reply in Redis Serialization Protocol (RESP).
///
/// See: <https://redis.io/docs/latest/develop/reference/protocol-spec/>
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    // RESP 2
    /// Raw bytes, servers are not bound to send UTF-8.
    SimpleString(Bytes),
    SimpleError(String),
    Integer(i64),
    BulkString(Bytes),
    Array(Vec<Frame>),
    NullBulkString,
    NullArray,
    // RESP 3
    Null,
}

/// What a single reply line says about the reply it starts.
///
/// Simple replies fit on one line. Bulk strings and arrays only announce
/// their size there, the rest has to be read from the stream.
#[derive(Debug, PartialEq, Eq)]
pub enum Header {
    Complete(Frame),
    /// `len` raw bytes followed by a terminator.
    Bulk(usize),
    /// `len` replies, each starting with its own line.
    Array(usize),
    /// Empty line or unknown type byte.
    Unrecognized,
}

impl Frame {
    /// Classify one reply line, terminator already stripped.
    ///
    /// The first byte selects the reply type. Lines that do not start with a
    /// known type byte are not an error, they are reported as
    /// [`Header::Unrecognized`]. A known type with a malformed body is a
    /// protocol error.
    pub fn classify(line: &[u8]) -> LResult<Header> {
        let Some((&first, rest)) = line.split_first() else {
            return Ok(Header::Unrecognized);
        };

        match first {
            b'+' => Ok(Header::Complete(Frame::SimpleString(
                Bytes::copy_from_slice(rest),
            ))),
            b'-' => {
                let string = String::from_utf8_lossy(rest).into_owned();
                Ok(Header::Complete(Frame::SimpleError(string)))
            }
            b':' => Ok(Header::Complete(Frame::Integer(decimal(rest)?))),
            b'$' => match decimal(rest)? {
                -1 => Ok(Header::Complete(Frame::NullBulkString)),
                len => Ok(Header::Bulk(bounded(len, MAX_BULK_LEN)?)),
            },
            b'*' => match decimal(rest)? {
                -1 => Ok(Header::Complete(Frame::NullArray)),
                len => Ok(Header::Array(bounded(len, MAX_ARRAY_LEN)?)),
            },
            b'_' => {
                if !rest.is_empty() {
                    return Err(Error::Protocol(format!(
                        "invalid `null` data type frame format, frame contained bytes `{rest:?}`"
                    )));
                }
                Ok(Header::Complete(Frame::Null))
            }
            _ => Ok(Header::Unrecognized),
        }
    }

    /// The data a caller asked for, if the reply carries any.
    ///
    /// Only non-empty simple strings and bulk strings carry a payload. A bare
    /// `+` yields nothing.
    pub fn into_payload(self) -> Option<Bytes> {
        match self {
            Frame::SimpleString(val) if !val.is_empty() => Some(val),
            Frame::BulkString(val) => Some(val),
            _ => None,
        }
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frame::SimpleString(val) => write!(f, "{}", String::from_utf8_lossy(val)),
            Frame::SimpleError(val) => write!(f, "error: {val}"),
            Frame::Integer(val) => write!(f, "{val}"),
            Frame::BulkString(val) => write!(f, "{}", String::from_utf8_lossy(val)),
            Frame::Array(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Frame::NullBulkString | Frame::NullArray | Frame::Null => write!(f, "(nil)"),
        }
    }
}

fn decimal(src: &[u8]) -> LResult<i64> {
    use atoi::atoi;

    atoi(src).ok_or(Error::Protocol(format!("invalid decimal `{src:?}`")))
}

/// A declared length, which has to be at least `0` and at most `max`.
fn bounded(len: i64, max: usize) -> LResult<usize> {
    if len < 0 {
        return Err(Error::Protocol(format!(
            "invalid frame format, only valid negative length is -1, got `{len}`"
        )));
    }
    let len: usize = len.try_into()?;
    if len > max {
        return Err(Error::Protocol(format!(
            "declared length {len} exceeds the limit of {max}"
        )));
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(line: &[u8]) -> Frame {
        match Frame::classify(line).unwrap() {
            Header::Complete(frame) => frame,
            header => panic!("expected a complete frame, got {header:?}"),
        }
    }

    #[test]
    fn test_simple_string() {
        assert_eq!(complete(b"+PONG"), Frame::SimpleString("PONG".into()));
        assert_eq!(
            complete(b"+PONG").into_payload(),
            Some(Bytes::from_static(b"PONG"))
        );
    }

    #[test]
    fn test_empty_simple_string_has_no_payload() {
        let frame = complete(b"+");
        assert_eq!(frame, Frame::SimpleString(Bytes::new()));
        assert_eq!(frame.into_payload(), None);
    }

    #[test]
    fn test_simple_error() {
        assert_eq!(
            complete(b"-ERR unknown command 'foobar'"),
            Frame::SimpleError("ERR unknown command 'foobar'".to_string())
        );
    }

    #[test]
    fn test_integer() {
        assert_eq!(complete(b":1000"), Frame::Integer(1000));
        assert_eq!(complete(b":-1"), Frame::Integer(-1));
        assert_eq!(complete(b":+9223372036854775807"), Frame::Integer(i64::MAX));
        assert_eq!(complete(b":-9223372036854775808"), Frame::Integer(i64::MIN));
        assert!(Frame::classify(b":abc").is_err());
        assert!(Frame::classify(b":").is_err());
    }

    #[test]
    fn test_bulk_header() {
        assert_eq!(Frame::classify(b"$6").unwrap(), Header::Bulk(6));
        assert_eq!(Frame::classify(b"$0").unwrap(), Header::Bulk(0));
        assert_eq!(complete(b"$-1"), Frame::NullBulkString);
        assert!(Frame::classify(b"$-2").is_err());
        assert!(Frame::classify(b"$x").is_err());
    }

    #[test]
    fn test_simple_string_keeps_raw_bytes() {
        let frame = complete(b"+\xffPONG");
        assert_eq!(frame, Frame::SimpleString(Bytes::from_static(b"\xffPONG")));
        assert_eq!(frame.into_payload(), Some(Bytes::from_static(b"\xffPONG")));
    }

    #[test]
    fn test_simple_error_is_lossy() {
        assert_eq!(
            complete(b"-ERR \xff"),
            Frame::SimpleError("ERR \u{fffd}".to_string())
        );
    }

    #[test]
    fn test_length_limits() {
        let at_limit = format!("${MAX_BULK_LEN}");
        assert_eq!(
            Frame::classify(at_limit.as_bytes()).unwrap(),
            Header::Bulk(MAX_BULK_LEN)
        );
        let over = format!("${}", MAX_BULK_LEN + 1);
        assert!(matches!(
            Frame::classify(over.as_bytes()),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            Frame::classify(b"$9223372036854775807"),
            Err(Error::Protocol(_))
        ));

        let over = format!("*{}", MAX_ARRAY_LEN + 1);
        assert!(matches!(
            Frame::classify(over.as_bytes()),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_array_header() {
        assert_eq!(Frame::classify(b"*2").unwrap(), Header::Array(2));
        assert_eq!(Frame::classify(b"*0").unwrap(), Header::Array(0));
        assert_eq!(complete(b"*-1"), Frame::NullArray);
        assert!(Frame::classify(b"*-3").is_err());
    }

    #[test]
    fn test_null() {
        assert_eq!(complete(b"_"), Frame::Null);
        assert!(Frame::classify(b"_text").is_err());
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(Frame::classify(b"").unwrap(), Header::Unrecognized);
        assert_eq!(Frame::classify(b"PONG").unwrap(), Header::Unrecognized);
        assert_eq!(Frame::classify(b"%2").unwrap(), Header::Unrecognized);
    }

    #[test]
    fn test_payload() {
        assert_eq!(
            Frame::BulkString(Bytes::from_static(b"bar")).into_payload(),
            Some(Bytes::from_static(b"bar"))
        );
        assert_eq!(Frame::Integer(3).into_payload(), None);
        assert_eq!(Frame::NullBulkString.into_payload(), None);
        assert_eq!(Frame::SimpleError("ERR".into()).into_payload(), None);
    }
}
