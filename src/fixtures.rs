use {super::*, std::sync::Mutex};

// v14 header with prev id 0x11.., a 51 byte extra field at blob offset 80
// whose 16 byte reserved region spans 115..131.
pub(crate) fn template_blob() -> String {
    [
        "0e0e05",
        &"11".repeat(32),
        "00000000",
        "023c01ff0a016402",
        &"22".repeat(32),
        "3301",
        &"33".repeat(32),
        "0210",
        &"00".repeat(16),
        "0001",
        &"44".repeat(32),
    ]
    .concat()
}

/// `template_blob` with `transactions` hashes in place of the single one.
pub(crate) fn busy_blob(transactions: usize) -> String {
    let mut count = Vec::new();
    cryptonote::varint::write(&mut count, transactions as u64);

    let blob = template_blob();
    let prefix = &blob[..blob.len() - 66];

    [prefix, &hex::encode(count), &"44".repeat(32 * transactions)].concat()
}

pub(crate) fn solo_wire(job_id: &str) -> BlockTemplateWire {
    BlockTemplateWire {
        blob: template_blob(),
        difficulty: 1_000_000,
        height: 10,
        prev_hash: "55".repeat(32),
        reserved_offset: 115,
        client_nonce_offset: 0,
        client_pool_offset: 0,
        target_diff: 0,
        target_hex: String::new(),
        job_id: job_id.into(),
        expected_reward: 600_000_000_000,
    }
}

pub(crate) fn pooled_wire(job_id: &str) -> BlockTemplateWire {
    BlockTemplateWire {
        client_nonce_offset: 127,
        client_pool_offset: 123,
        ..solo_wire(job_id)
    }
}

pub(crate) fn template(job_id: &str, sequence: u64) -> BlockTemplate {
    BlockTemplate::parse(&pooled_wire(job_id), sequence, 0).unwrap()
}

pub(crate) fn difficulty(n: u64) -> Difficulty {
    Difficulty::new(n).unwrap()
}

pub(crate) fn port(starting_diff: u64, fixed_diff: bool) -> PortConfig {
    PortConfig {
        port: 3333,
        tls: false,
        fixed_diff,
        starting_diff: difficulty(starting_diff),
        max_diff: difficulty(1_000_000),
    }
}

pub(crate) fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// A hash worth more than `difficulty(5000)` but less than the fixture
/// template's network difficulty.
pub(crate) fn share_hash() -> ResultHash {
    format!("{}0100", "00".repeat(30)).parse().unwrap()
}

pub(crate) fn weak_hash() -> ResultHash {
    format!("{}10", "00".repeat(31)).parse().unwrap()
}

pub(crate) fn block_hash() -> ResultHash {
    format!("01{}", "00".repeat(31)).parse().unwrap()
}

/// In-process upstream serving a single swappable template.
pub(crate) struct FakeUpstream {
    template: Mutex<Option<BlockTemplate>>,
    templates: watch::Sender<Option<Arc<TemplateInfo>>>,
    shares: Mutex<Vec<Share>>,
    sequence: AtomicU64,
}

impl FakeUpstream {
    pub(crate) fn new() -> Arc<Self> {
        let upstream = Arc::new(Self {
            template: Mutex::new(None),
            templates: watch::channel(None).0,
            shares: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
        });
        upstream.push_template("job-1");
        upstream
    }

    pub(crate) fn empty() -> Arc<Self> {
        Arc::new(Self {
            template: Mutex::new(None),
            templates: watch::channel(None).0,
            shares: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
        })
    }

    pub(crate) fn push_template(&self, job_id: &str) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let template = template(job_id, sequence);
        let info = template.info().clone();
        *self.template.lock().unwrap() = Some(template);
        self.templates.send_replace(Some(info));
    }

    pub(crate) fn shares(&self) -> Vec<Share> {
        self.shares.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn issue_blob(&self, kind: BlobKind) -> Result<IssuedBlob, PoolError> {
        let mut template = self.template.lock().unwrap();
        let template = template.as_mut().ok_or(PoolError::NoTemplate)?;
        Ok(match kind {
            BlobKind::Worker => template.issue_for_worker(),
            BlobKind::Next => template.issue_next_blob(),
        })
    }

    async fn submit_share(&self, share: Share) -> Result<(), PoolError> {
        self.shares.lock().unwrap().push(share);
        Ok(())
    }

    fn templates(&self) -> watch::Receiver<Option<Arc<TemplateInfo>>> {
        self.templates.subscribe()
    }
}
