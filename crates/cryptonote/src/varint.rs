//! Little-endian base 128 integers as used throughout CryptoNote
//! serialization: seven payload bits per byte, high bit set on every byte
//! except the last.

use super::*;

/// Maximum encoded length of a `u64`.
pub const MAX_LEN: usize = 10;

pub fn write(buf: &mut Vec<u8>, mut n: u64) {
    while n >= 0x80 {
        buf.push((n as u8 & 0x7f) | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
}

pub fn len(n: u64) -> usize {
    let mut buf = Vec::with_capacity(MAX_LEN);
    write(&mut buf, n);
    buf.len()
}

pub(crate) fn read(reader: &mut Reader, field: &'static str) -> Result<u64> {
    let mut n = 0u64;

    for i in 0..MAX_LEN {
        let byte = reader.u8(field)?;
        let shift = 7 * i as u32;
        let bits = u64::from(byte & 0x7f);

        ensure!(
            shift < 64 && (bits << shift) >> shift == bits,
            error::VarintOverflowSnafu { field }
        );

        n |= bits << shift;

        if byte & 0x80 == 0 {
            return Ok(n);
        }
    }

    error::VarintOverflowSnafu { field }.fail()
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[track_caller]
    fn case(n: u64, encoded: &[u8]) {
        let mut buf = Vec::new();
        write(&mut buf, n);
        assert_eq!(buf, encoded);
        assert_eq!(len(n), encoded.len());

        let mut reader = Reader::new(encoded);
        assert_eq!(read(&mut reader, "n").unwrap(), n);
        assert!(reader.is_empty());
    }

    #[test]
    fn encodings() {
        case(0, &[0x00]);
        case(1, &[0x01]);
        case(0x7f, &[0x7f]);
        case(0x80, &[0x80, 0x01]);
        case(300, &[0xac, 0x02]);
        case(
            u64::MAX,
            &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01],
        );
    }

    #[test]
    fn truncated() {
        let mut reader = Reader::new(&[0x80, 0x80]);
        assert!(matches!(
            read(&mut reader, "height"),
            Err(Error::UnexpectedEof { field: "height" })
        ));
    }

    #[test]
    fn overflow() {
        let mut reader = Reader::new(&[0xff; 10]);
        assert!(matches!(
            read(&mut reader, "amount"),
            Err(Error::VarintOverflow { field: "amount" })
        ));

        let mut reader = Reader::new(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02]);
        assert!(read(&mut reader, "amount").is_err());
    }
}
