use super::*;

/// Compact 32-bit share target. The wire form is the lowercase hex of the
/// little-endian bytes of `0xFFFFFFFF / difficulty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Target([u8; 4]);

impl Target {
    pub fn raw(self) -> u32 {
        LittleEndian::read_u32(&self.0)
    }

    /// The wire bytes read back as a big-endian integer.
    pub fn numeric(self) -> u32 {
        BigEndian::read_u32(&self.0)
    }
}

impl From<Difficulty> for Target {
    fn from(difficulty: Difficulty) -> Self {
        let raw = u64::from(u32::MAX) / difficulty.get();
        let mut bytes = [0; 4];
        LittleEndian::write_u32(&mut bytes, raw as u32);
        Self(bytes)
    }
}

impl FromStr for Target {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed("target", s)?))
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
