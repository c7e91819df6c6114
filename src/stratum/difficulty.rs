use super::*;

/// Share or network difficulty. Never zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(try_from = "u64", into = "u64")]
pub struct Difficulty(u64);

impl Difficulty {
    pub const MIN: Self = Self(1);

    pub fn new(difficulty: u64) -> Option<Self> {
        (difficulty > 0).then_some(Self(difficulty))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn target(self) -> Target {
        Target::from(self)
    }

    /// Largest 256-bit hash value that satisfies this difficulty.
    pub fn bound(self) -> U256 {
        U256::MAX / U256::from(self.0)
    }

    pub fn is_met_by(self, hash: &ResultHash) -> bool {
        hash.to_u256() <= self.bound()
    }
}

impl TryFrom<u64> for Difficulty {
    type Error = ParseError;

    fn try_from(difficulty: u64) -> Result<Self, Self::Error> {
        Self::new(difficulty).ok_or_else(|| ParseError::Difficulty {
            input: difficulty.to_string(),
        })
    }
}

impl From<Difficulty> for u64 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl FromStr for Difficulty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseError::Difficulty { input: s.into() })
    }
}
