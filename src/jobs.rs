use super::*;

/// A job as issued to one miner.
#[derive(Debug)]
pub(crate) struct MinerJob {
    pub(crate) id: Token,
    pub(crate) template: Arc<TemplateInfo>,
    pub(crate) blob: String,
    pub(crate) target: Target,
    pub(crate) difficulty: Difficulty,
    pub(crate) pool_nonce: u32,
    pub(crate) worker_nonce: u32,
    submissions: HashSet<Nonce>,
}

impl MinerJob {
    fn new(issued: IssuedBlob, difficulty: Difficulty) -> Self {
        Self {
            id: Token::random(),
            template: issued.template,
            blob: issued.blob,
            target: difficulty.target(),
            difficulty,
            pool_nonce: issued.pool_nonce,
            worker_nonce: issued.worker_nonce,
            submissions: HashSet::new(),
        }
    }

    pub(crate) fn params(&self, miner: &Token) -> JobParams {
        JobParams {
            blob: self.blob.clone(),
            job_id: self.id.clone(),
            target: self.target,
            id: miner.clone(),
            height: self.template.height,
        }
    }

    /// Returns false if `nonce` was already submitted for this job.
    pub(crate) fn record_submission(&mut self, nonce: Nonce) -> bool {
        self.submissions.insert(nonce)
    }

    pub(crate) fn accepts(&self, hash: &ResultHash) -> bool {
        self.difficulty.is_met_by(hash)
    }

    pub(crate) fn finds_block(&self, hash: &ResultHash) -> bool {
        self.template.difficulty.is_met_by(hash)
    }
}

/// The jobs recently issued to one miner, newest first. A job stays valid
/// while its template is still within the upstream retention window.
#[derive(Debug)]
pub(crate) struct JobCache {
    jobs: VecDeque<MinerJob>,
    retained: u64,
}

impl JobCache {
    pub(crate) fn new(retained: usize) -> Self {
        Self {
            jobs: VecDeque::new(),
            retained: retained as u64,
        }
    }

    /// Returns the newest job unless a new one is forced, a difficulty change
    /// is staged, or nothing has been issued yet.
    pub(crate) async fn get_job(
        &mut self,
        vardiff: &mut Vardiff,
        force: bool,
        upstream: &dyn Upstream,
    ) -> Result<&MinerJob, PoolError> {
        if force || vardiff.pending().is_some() || self.jobs.is_empty() {
            let issued = upstream.issue_blob(BlobKind::Worker).await?;

            if let Some(difficulty) = vardiff.apply_pending() {
                debug!("Applying difficulty {difficulty}");
            }

            self.push(MinerJob::new(issued, vardiff.current()));
        }

        self.jobs.front().ok_or(PoolError::NoTemplate)
    }

    fn push(&mut self, job: MinerJob) {
        let current = job.template.sequence;
        let retained = self.retained;

        self.jobs
            .retain(|old| old.template.sequence.saturating_add(retained) >= current);
        self.jobs.truncate(MAX_MINER_JOBS.saturating_sub(1));
        self.jobs.push_front(job);
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<&MinerJob> {
        self.jobs.front()
    }

    /// Any retained job named `job_id`.
    pub(crate) fn get_mut(&mut self, job_id: &str) -> Option<&mut MinerJob> {
        self.jobs.iter_mut().find(|job| job.id.as_str() == job_id)
    }
}
