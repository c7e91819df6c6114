use super::*;

/// A job as sent to a miner, both in responses and in `job` pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParams {
    pub blob: String,
    pub job_id: Token,
    pub target: Target,
    pub id: Token,
    pub height: u64,
}
