use super::*;

/// The 4 nonce bytes a miner found, exactly as they appear in the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Nonce([u8; 4]);

impl FromStr for Nonce {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed("nonce", s)?))
    }
}

impl Display for Nonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 4]> for Nonce {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn some_nonces() {
        assert_eq!(Nonce::from([0xde, 0xad, 0xbe, 0xef]).to_string(), "deadbeef");
        assert_eq!(
            "000000ff".parse::<Nonce>().unwrap(),
            Nonce::from([0, 0, 0, 0xff])
        );
        assert!("deadbee".parse::<Nonce>().is_err());
        assert!("deadbeef00".parse::<Nonce>().is_err());
        assert!("zzzzzzzz".parse::<Nonce>().is_err());
    }
}
