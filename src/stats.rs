use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MinerSummary {
    pub(crate) login: String,
    pub(crate) agent: String,
    pub(crate) difficulty: Difficulty,
    pub(crate) shares: u64,
    pub(crate) hashes: u64,
}

/// Proxy-wide counters, shared by every session.
pub(crate) struct Stats {
    miners: DashMap<Token, MinerSummary>,
    connections: AtomicU64,
    shares: AtomicU64,
    rejected: AtomicU64,
    hashes: AtomicU64,
    blocks: AtomicU64,
    started: Instant,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self {
            miners: DashMap::new(),
            connections: AtomicU64::new(0),
            shares: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            hashes: AtomicU64::new(0),
            blocks: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub(crate) fn connect(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn disconnect(&self, miner: &Token) {
        self.connections.fetch_sub(1, Ordering::Relaxed);
        self.miners.remove(miner);
    }

    pub(crate) fn update(&self, miner: &Miner) {
        self.miners.insert(
            miner.id.clone(),
            MinerSummary {
                login: miner.login.clone(),
                agent: miner.agent.clone(),
                difficulty: miner.vardiff.current(),
                shares: miner.shares,
                hashes: miner.hashes,
            },
        );
    }

    pub(crate) fn accept(&self, difficulty: Difficulty) {
        self.shares.fetch_add(1, Ordering::Relaxed);
        self.hashes.fetch_add(difficulty.get(), Ordering::Relaxed);
    }

    pub(crate) fn reject(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn block(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miners(&self) -> usize {
        self.miners.len()
    }

    pub(crate) fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    pub(crate) fn shares(&self) -> u64 {
        self.shares.load(Ordering::Relaxed)
    }

    pub(crate) fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub(crate) fn hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }

    pub(crate) fn blocks(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub(crate) fn summary(&self, miner: &Token) -> Option<MinerSummary> {
        self.miners.get(miner).map(|entry| entry.value().clone())
    }

    /// Average hashrate since startup, in hashes per second.
    pub(crate) fn hashrate(&self) -> u64 {
        match self.started.elapsed().as_secs() {
            0 => 0,
            seconds => self.hashes() / seconds,
        }
    }

    pub(crate) fn status_line(&self, pool: &str, state: PoolState) -> String {
        format!(
            "pool={pool} state={state} miners={} connections={} shares={} rejected={} blocks={} hashrate={}H/s uptime={}s",
            self.miners(),
            self.connections(),
            self.shares(),
            self.rejected(),
            self.blocks(),
            self.hashrate(),
            self.started.elapsed().as_secs(),
        )
    }
}
