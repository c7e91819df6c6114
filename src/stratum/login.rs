use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginParams {
    pub login: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub address: String,
    pub fixed_difficulty: Option<Difficulty>,
}

impl LoginParams {
    /// Splits `address[+difficulty]`.
    pub fn credentials(&self) -> Result<Credentials, MinerError> {
        let mut parts = self.login.split('+');

        let address = parts.next().unwrap_or_default().to_string();
        let suffix = parts.next();

        if parts.next().is_some() {
            return Err(MinerError::LoginFormat);
        }

        let fixed_difficulty = suffix
            .map(|value| {
                value
                    .parse::<Difficulty>()
                    .map_err(|_| MinerError::InvalidFixedDifficulty {
                        value: value.into(),
                    })
            })
            .transpose()?;

        Ok(Credentials {
            address,
            fixed_difficulty,
        })
    }
}
