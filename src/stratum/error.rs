use super::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    #[snafu(display("invalid {kind} `{input}`: expected {expected} hex characters"))]
    Hex {
        kind: &'static str,
        input: String,
        expected: usize,
    },
    #[snafu(display("invalid difficulty `{input}`: expected a positive integer"))]
    Difficulty { input: String },
}

/// Rejections reported back to the miner. All of them go out with code -1.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MinerError {
    #[snafu(display("not authenticated"))]
    NotAuthenticated,
    #[snafu(display("too many options in the login field"))]
    LoginFormat,
    #[snafu(display("invalid fixed difficulty `{value}`"))]
    InvalidFixedDifficulty { value: String },
    #[snafu(display("invalid job id"))]
    StaleJob,
    #[snafu(display("duplicate share"))]
    DuplicateShare,
    #[snafu(display("low difficulty share"))]
    LowDifficultyShare,
    #[snafu(display("no job available"))]
    NoJob,
}

impl MinerError {
    pub const CODE: i64 = -1;

    pub fn rpc(&self) -> RpcError {
        RpcError {
            code: Self::CODE,
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RequestError {
    #[snafu(display("invalid JSON: {source}"))]
    Json { source: serde_json::Error },
    #[snafu(display("unknown method `{method}`"))]
    UnknownMethod { method: String },
    #[snafu(display("invalid params for `{method}`: {source}"))]
    Params {
        method: &'static str,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl Display for RpcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}
