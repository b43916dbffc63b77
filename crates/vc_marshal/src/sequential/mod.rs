//! The sequential backend over an ordered token stream.
//!
//! Nothing but primitive tokens is written: maps leave no trace, an array is
//! its `i32` length followed by its elements, and with `store_names` every
//! value is preceded by its name. Reader and writer must therefore walk the
//! same schema, and must agree on `store_names`.

use alloc::vec::Vec;

use vc_stream::{BinaryInput, BinaryOutput};

use crate::object::{Marshalable, unmarshal_object};
use crate::{ErrorKind, Marshaller, Result, Unmarshaller};

mod reader;
mod writer;

pub use reader::SequentialUnmarshaller;
pub use writer::SequentialMarshaller;

/// Marshals `value` as one top-level object in the binary token encoding.
pub fn to_bytes<T: Marshalable + ?Sized>(value: &T, store_names: bool) -> Result<Vec<u8>> {
    let mut m = SequentialMarshaller::new(BinaryOutput::new(Vec::new()), store_names);
    value.marshal(&mut m, None)?;
    m.check_complete()?;
    m.into_inner()
        .into_inner()
        .ok_or_else(|| ErrorKind::Closed.into())
}

/// Unmarshals a fresh `T` from bytes written by [`to_bytes`] with the same
/// `store_names`.
pub fn from_bytes<T: Marshalable + Default>(bytes: &[u8], store_names: bool) -> Result<T> {
    let mut u = SequentialUnmarshaller::new(BinaryInput::new(bytes), store_names);
    let value = unmarshal_object(&mut u, None)?;
    u.check_complete()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use vc_stream::{BinaryOutput, StreamError, Token, TokenTape};

    use super::{SequentialMarshaller, SequentialUnmarshaller};
    use crate::object::Marshalable;
    use crate::{ErrorKind, Marshaller, Result, StructureError, Unmarshaller};

    #[derive(Debug, Default, PartialEq)]
    struct Reading {
        sensor: String,
        samples: Vec<f64>,
    }

    impl Marshalable for Reading {
        fn marshal(&self, m: &mut dyn Marshaller, name: Option<&str>) -> Result<()> {
            m.open_map(name)?;
            m.write_str(Some("sensor"), &self.sensor)?;
            m.open_array(Some("samples"), self.samples.len())?;
            for sample in &self.samples {
                m.write_f64(None, *sample)?;
            }
            m.close_array()?;
            m.close_map()
        }

        fn unmarshal(&mut self, u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<()> {
            u.open_map(name)?;
            self.sensor = u.read_string(Some("sensor"))?;
            let len = u.open_array(Some("samples"))?;
            self.samples = (0..len).map(|_| u.read_f64(None)).collect::<Result<_>>()?;
            u.close_array()?;
            u.close_map()
        }
    }

    fn reading() -> Reading {
        Reading {
            sensor: "t1".into(),
            samples: vec![0.5, -2.0],
        }
    }

    #[test]
    fn token_layout() {
        let mut m = SequentialMarshaller::new(TokenTape::new(), false);
        reading().marshal(&mut m, None).unwrap();
        assert_eq!(
            m.into_inner().into_tokens(),
            [
                Token::Str("t1".into()),
                Token::I32(2),
                Token::F64(0.5),
                Token::F64(-2.0),
            ]
        );

        let mut m = SequentialMarshaller::new(TokenTape::new(), true);
        reading().marshal(&mut m, None).unwrap();
        assert_eq!(
            m.into_inner().into_tokens(),
            [
                Token::Name("sensor".into()),
                Token::Str("t1".into()),
                Token::Name("samples".into()),
                Token::I32(2),
                Token::Name(String::new()),
                Token::F64(0.5),
                Token::Name(String::new()),
                Token::F64(-2.0),
            ]
        );
    }

    #[test]
    fn bytes_round_trip() {
        for store_names in [false, true] {
            let bytes = super::to_bytes(&reading(), store_names).unwrap();
            let back: Reading = super::from_bytes(&bytes, store_names).unwrap();
            assert_eq!(back, reading());
        }
    }

    #[test]
    fn name_tokens_are_verified() {
        let mut m = SequentialMarshaller::new(TokenTape::new(), true);
        reading().marshal(&mut m, None).unwrap();
        let mut u = SequentialUnmarshaller::new(m.into_inner(), true);
        u.open_map(None).unwrap();
        let err = u.read_string(Some("probe")).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::NameMismatch { expected, found } if expected == "probe" && found == "sensor"
        ));
        assert!(err.is_data_error());
    }

    #[test]
    fn negative_length_is_rejected() {
        let tape = TokenTape::from_tokens(vec![Token::I32(-1)]);
        let mut u = SequentialUnmarshaller::new(tape, false);
        let err = u.open_array(None).unwrap_err();
        assert_eq!(err.structure(), Some(&StructureError::NegativeLength(-1)));
    }

    #[test]
    fn truncated_stream_is_a_stream_error() {
        let tape = TokenTape::from_tokens(vec![Token::Str("t1".into()), Token::I32(2)]);
        let mut u = SequentialUnmarshaller::new(tape, false);
        let err = Reading::default().unmarshal(&mut u, None).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Stream(StreamError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn closed_backend_refuses_work() {
        let mut m = SequentialMarshaller::new(TokenTape::new(), false);
        m.close().unwrap();
        m.close().unwrap();
        let err = m.open_map(None).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Closed));
        assert!(m.get_ref().is_closed());

        let mut u = SequentialUnmarshaller::new(TokenTape::new(), false);
        u.close().unwrap();
        assert!(matches!(u.open_array(None).unwrap_err().kind(), ErrorKind::Closed));
    }

    #[test]
    fn closed_backend_refuses_closes_and_completion() {
        let mut m = SequentialMarshaller::new(TokenTape::new(), false);
        m.open_map(None).unwrap();
        m.close().unwrap();
        assert!(matches!(m.close_map().unwrap_err().kind(), ErrorKind::Closed));
        assert!(matches!(m.close_array().unwrap_err().kind(), ErrorKind::Closed));
        assert!(matches!(m.check_complete().unwrap_err().kind(), ErrorKind::Closed));

        let mut u = SequentialUnmarshaller::new(TokenTape::new(), false);
        u.close().unwrap();
        assert!(matches!(u.close_map().unwrap_err().kind(), ErrorKind::Closed));
        assert!(matches!(u.close_array().unwrap_err().kind(), ErrorKind::Closed));
        assert!(matches!(u.check_complete().unwrap_err().kind(), ErrorKind::Closed));
    }

    #[test]
    fn failed_length_write_opens_no_array() {
        let mut full = [0u8; 0];
        let mut m = SequentialMarshaller::new(BinaryOutput::new(&mut full[..]), false);
        let err = m.open_array(None, 2).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Stream(StreamError::Io(_))));
        assert_eq!(m.check_complete().unwrap(), 0);
        assert!(m.close_array().is_err());
    }

    #[test]
    fn reader_rejects_elements_past_the_declared_length() {
        let tape = TokenTape::from_tokens(vec![Token::I32(1), Token::Bool(true), Token::Bool(false)]);
        let mut u = SequentialUnmarshaller::new(tape, false);
        assert_eq!(u.open_array(None).unwrap(), 1);
        assert!(u.read_bool(None).unwrap());
        let err = u.read_bool(None).unwrap_err();
        assert_eq!(err.structure(), Some(&StructureError::ArrayOverrun { declared: 1 }));
        u.close_array().unwrap();
    }

    #[test]
    fn oversized_array_is_rejected() {
        let mut m = SequentialMarshaller::new(TokenTape::new(), false);
        let err = m.open_array(None, usize::MAX).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Range { .. }));
    }
}
