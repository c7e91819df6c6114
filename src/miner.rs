use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum State {
    Unauthenticated,
    Active,
    Closed,
}

/// Everything the proxy knows about one connected miner.
#[derive(Debug)]
pub(crate) struct Miner {
    pub(crate) id: Token,
    pub(crate) address: SocketAddr,
    pub(crate) port: Arc<PortConfig>,
    pub(crate) login: String,
    pub(crate) password: String,
    pub(crate) agent: String,
    pub(crate) state: State,
    pub(crate) vardiff: Vardiff,
    pub(crate) jobs: JobCache,
    pub(crate) shares: u64,
    pub(crate) blocks: u64,
    pub(crate) hashes: u64,
    pub(crate) connect_time: Instant,
    pub(crate) last_contact: Instant,
    pub(crate) last_share: Option<Instant>,
    pub(crate) rpc_id: u64,
}

impl Miner {
    pub(crate) fn new(
        id: Token,
        address: SocketAddr,
        port: Arc<PortConfig>,
        vardiff: Vardiff,
        retained_templates: usize,
    ) -> Self {
        let now = Instant::now();

        Self {
            id,
            address,
            port,
            login: String::new(),
            password: String::new(),
            agent: String::new(),
            state: State::Unauthenticated,
            vardiff,
            jobs: JobCache::new(retained_templates),
            shares: 0,
            blocks: 0,
            hashes: 0,
            connect_time: now,
            last_contact: now,
            last_share: None,
            rpc_id: 0,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state == State::Active
    }

    pub(crate) fn touch(&mut self, rpc_id: u64) {
        self.last_contact = Instant::now();
        if rpc_id > 0 {
            self.rpc_id = rpc_id;
        }
    }

    /// Applies login credentials. The miner only becomes active once a job
    /// has been issued for it.
    pub(crate) fn login(&mut self, params: LoginParams) -> Result<(), MinerError> {
        let credentials = params.credentials()?;

        match credentials.fixed_difficulty {
            Some(difficulty) => self.vardiff.reset(difficulty, true),
            None => self
                .vardiff
                .reset(self.port.starting_diff, self.port.fixed_diff),
        }

        self.login = credentials.address;
        self.password = params.pass;
        self.agent = params.agent;

        Ok(())
    }

    pub(crate) fn activate(&mut self) {
        self.state = State::Active;
    }

    pub(crate) fn close(&mut self) {
        self.state = State::Closed;
    }

    pub(crate) fn update_difficulty(&mut self) {
        self.vardiff
            .retarget(self.hashes, self.connect_time.elapsed());
    }

    pub(crate) async fn job(
        &mut self,
        force: bool,
        upstream: &dyn Upstream,
    ) -> Result<JobParams, PoolError> {
        self.update_difficulty();
        let id = self.id.clone();
        let job = self.jobs.get_job(&mut self.vardiff, force, upstream).await?;
        Ok(job.params(&id))
    }

    /// Validates a submission against the current job. Stale, duplicate and
    /// weak shares are rejected without touching the counters.
    pub(crate) fn submit(&mut self, params: &SubmitParams) -> Result<Share, MinerError> {
        let job = self
            .jobs
            .get_mut(&params.job_id)
            .ok_or(MinerError::StaleJob)?;

        if !job.record_submission(params.nonce) {
            return Err(MinerError::DuplicateShare);
        }

        if !job.accepts(&params.result) {
            return Err(MinerError::LowDifficultyShare);
        }

        let share = Share {
            miner: self.id.clone(),
            job_id: job.template.job_id.clone(),
            height: job.template.height,
            nonce: params.nonce,
            result: params.result,
            pool_nonce: job.pool_nonce,
            worker_nonce: job.worker_nonce,
            difficulty: job.difficulty,
            found_block: job.finds_block(&params.result),
        };

        self.shares += 1;
        self.hashes = self.hashes.saturating_add(share.difficulty.get());
        self.last_share = Some(Instant::now());
        if share.found_block {
            self.blocks += 1;
        }

        Ok(share)
    }
}
