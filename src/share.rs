use super::*;

/// An accepted miner share on its way to the upstream pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Share {
    pub(crate) miner: Token,
    pub(crate) job_id: String,
    pub(crate) height: u64,
    pub(crate) nonce: Nonce,
    pub(crate) result: ResultHash,
    pub(crate) pool_nonce: u32,
    pub(crate) worker_nonce: u32,
    pub(crate) difficulty: Difficulty,
    pub(crate) found_block: bool,
}

impl Share {
    pub(crate) fn params(&self) -> Value {
        json!({
            "job_id": self.job_id,
            "nonce": self.nonce,
            "result": self.result,
            "workerNonce": self.worker_nonce,
            "poolNonce": self.pool_nonce,
            "blockFound": self.found_block,
        })
    }
}
