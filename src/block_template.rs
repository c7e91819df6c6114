use {super::*, cryptonote::HASH_SIZE};

const NONCE_WINDOW: usize = 4;

#[derive(Debug, Snafu)]
pub(crate) enum TemplateDecodeError {
    #[snafu(display("malformed template message: {source}"))]
    Wire { source: serde_json::Error },
    #[snafu(display("invalid previous hash: {source}"))]
    PreviousHash { source: hex::FromHexError },
    #[snafu(display("previous hash is {len} bytes, expected {HASH_SIZE}"))]
    PreviousHashLength { len: usize },
    #[snafu(display("invalid template blob: {source}"))]
    Blob { source: cryptonote::Error },
    #[snafu(display("template difficulty is zero"))]
    ZeroDifficulty,
    #[snafu(display(
        "{name} nonce at blob offset {offset} falls outside extra field ({start}..{end})"
    ))]
    NonceWindow {
        name: &'static str,
        offset: usize,
        start: usize,
        end: usize,
    },
}

/// Block template as pushed by the upstream pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BlockTemplateWire {
    #[serde(rename = "blocktemplate_blob")]
    pub(crate) blob: String,
    pub(crate) difficulty: u64,
    pub(crate) height: u64,
    pub(crate) prev_hash: String,
    pub(crate) reserved_offset: usize,
    #[serde(default)]
    pub(crate) client_nonce_offset: usize,
    #[serde(default)]
    pub(crate) client_pool_offset: usize,
    #[serde(default)]
    pub(crate) target_diff: u64,
    #[serde(default)]
    pub(crate) target_hex: String,
    pub(crate) job_id: String,
    #[serde(default)]
    pub(crate) expected_reward: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TemplateInfo {
    pub(crate) sequence: u64,
    pub(crate) job_id: String,
    pub(crate) height: u64,
    pub(crate) difficulty: Difficulty,
    pub(crate) solo: bool,
}

/// One blob handed out by a template together with the counters baked into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IssuedBlob {
    pub(crate) template: Arc<TemplateInfo>,
    pub(crate) blob: String,
    pub(crate) pool_nonce: u32,
    pub(crate) worker_nonce: u32,
}

// Indices into the miner transaction's extra field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NonceLayout {
    worker: usize,
    pool: usize,
    instance: Option<usize>,
}

impl NonceLayout {
    fn new(wire: &BlockTemplateWire, block: &Block) -> Result<Self, TemplateDecodeError> {
        let start = block.extra_offset();
        let end = start + block.miner_tx.extra.len();

        let locate = |name, offset: usize| {
            if offset >= start && offset.saturating_add(NONCE_WINDOW) <= end {
                Ok(offset - start)
            } else {
                Err(TemplateDecodeError::NonceWindow {
                    name,
                    offset,
                    start,
                    end,
                })
            }
        };

        let reserved = wire.reserved_offset;

        if wire.client_nonce_offset == 0 {
            Ok(Self {
                worker: locate("worker", reserved)?,
                instance: Some(locate("instance", reserved.saturating_add(4))?),
                pool: locate("pool", reserved.saturating_add(8))?,
            })
        } else {
            let pool = match wire.client_pool_offset {
                0 => reserved.saturating_add(8),
                offset => offset,
            };

            Ok(Self {
                worker: locate("worker", wire.client_nonce_offset)?,
                instance: None,
                pool: locate("pool", pool)?,
            })
        }
    }
}

/// A decoded template plus the two monotonically increasing nonce counters
/// that make every issued blob unique.
#[derive(Debug, Clone)]
pub(crate) struct BlockTemplate {
    info: Arc<TemplateInfo>,
    block: Block,
    layout: NonceLayout,
    pool_nonce: u32,
    worker_nonce: u32,
}

impl BlockTemplate {
    pub(crate) fn decode(
        params: Value,
        sequence: u64,
        instance_id: u32,
    ) -> Result<Self, TemplateDecodeError> {
        let wire = serde_json::from_value::<BlockTemplateWire>(params)
            .map_err(|source| TemplateDecodeError::Wire { source })?;
        Self::parse(&wire, sequence, instance_id)
    }

    pub(crate) fn parse(
        wire: &BlockTemplateWire,
        sequence: u64,
        instance_id: u32,
    ) -> Result<Self, TemplateDecodeError> {
        let prev_hash = hex::decode(&wire.prev_hash)
            .map_err(|source| TemplateDecodeError::PreviousHash { source })?;

        let mut block = Block::from_hex(&wire.blob)
            .map_err(|source| TemplateDecodeError::Blob { source })?;

        let difficulty =
            Difficulty::new(wire.difficulty).ok_or(TemplateDecodeError::ZeroDifficulty)?;

        let layout = NonceLayout::new(wire, &block)?;

        if let Some(instance) = layout.instance {
            LittleEndian::write_u32(
                &mut block.miner_tx.extra[instance..instance + NONCE_WINDOW],
                instance_id,
            );

            block.prev_id = prev_hash.as_slice().try_into().map_err(|_| {
                TemplateDecodeError::PreviousHashLength {
                    len: prev_hash.len(),
                }
            })?;
        }

        Ok(Self {
            info: Arc::new(TemplateInfo {
                sequence,
                job_id: wire.job_id.clone(),
                height: wire.height,
                difficulty,
                solo: layout.instance.is_some(),
            }),
            block,
            layout,
            pool_nonce: 0,
            worker_nonce: 0,
        })
    }

    pub(crate) fn info(&self) -> &Arc<TemplateInfo> {
        &self.info
    }

    /// Advances the pool nonce. Used for every job handed to a miner.
    pub(crate) fn issue_for_worker(&mut self) -> IssuedBlob {
        self.pool_nonce = self.pool_nonce.wrapping_add(1);
        let at = self.layout.pool;
        BigEndian::write_u32(
            &mut self.block.miner_tx.extra[at..at + NONCE_WINDOW],
            self.pool_nonce,
        );
        self.issued()
    }

    /// Advances the worker nonce, for downstream proxies that split work
    /// further.
    pub(crate) fn issue_next_blob(&mut self) -> IssuedBlob {
        self.worker_nonce = self.worker_nonce.wrapping_add(1);
        let at = self.layout.worker;
        BigEndian::write_u32(
            &mut self.block.miner_tx.extra[at..at + NONCE_WINDOW],
            self.worker_nonce,
        );
        self.issued()
    }

    fn issued(&self) -> IssuedBlob {
        IssuedBlob {
            template: self.info.clone(),
            blob: self.block.to_hex(),
            pool_nonce: self.pool_nonce,
            worker_nonce: self.worker_nonce,
        }
    }
}
