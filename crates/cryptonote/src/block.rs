use super::*;

const TXIN_GEN: u8 = 0xff;
const TXOUT_TO_KEY: u8 = 0x02;
const TXOUT_TO_TAGGED_KEY: u8 = 0x03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    Key(Hash),
    TaggedKey { key: Hash, view_tag: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub amount: u64,
    pub target: OutputTarget,
}

/// Coinbase transaction. `extra` is kept as raw bytes so callers can write
/// nonces into the reserved region without re-encoding anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerTx {
    pub version: u64,
    pub unlock_time: u64,
    pub height: u64,
    pub outputs: Vec<Output>,
    pub extra: Vec<u8>,
    pub rct_type: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub major_version: u64,
    pub minor_version: u64,
    pub timestamp: u64,
    pub prev_id: Hash,
    pub nonce: [u8; NONCE_SIZE],
    pub miner_tx: MinerTx,
    pub tx_hashes: Vec<Hash>,
}

impl Block {
    pub fn from_hex(blob: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(blob).context(error::HexSnafu)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let major_version = reader.varint("major version")?;
        let minor_version = reader.varint("minor version")?;
        let timestamp = reader.varint("timestamp")?;
        let prev_id = reader.array("previous id")?;
        let nonce = reader.array("nonce")?;

        let miner_tx = MinerTx::read(&mut reader)?;

        let count = reader.varint("transaction count")?;
        let mut tx_hashes = Vec::new();
        for _ in 0..count {
            tx_hashes.push(reader.array("transaction hash")?);
        }

        ensure!(
            reader.is_empty(),
            error::TrailingBytesSnafu {
                count: reader.remaining()
            }
        );

        Ok(Self {
            major_version,
            minor_version,
            timestamp,
            prev_id,
            nonce,
            miner_tx,
            tx_hashes,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_header(&mut buf);
        self.miner_tx.write_prefix(&mut buf);
        buf.extend_from_slice(&self.miner_tx.extra);
        self.miner_tx.write_suffix(&mut buf);

        varint::write(&mut buf, self.tx_hashes.len() as u64);
        for hash in &self.tx_hashes {
            buf.extend_from_slice(hash);
        }

        buf
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Byte position of the first byte of the miner transaction's extra
    /// field inside [`Block::to_bytes`].
    pub fn extra_offset(&self) -> usize {
        let mut buf = Vec::new();
        self.write_header(&mut buf);
        self.miner_tx.write_prefix(&mut buf);
        buf.len()
    }

    fn write_header(&self, buf: &mut Vec<u8>) {
        varint::write(buf, self.major_version);
        varint::write(buf, self.minor_version);
        varint::write(buf, self.timestamp);
        buf.extend_from_slice(&self.prev_id);
        buf.extend_from_slice(&self.nonce);
    }
}

impl MinerTx {
    fn read(reader: &mut Reader) -> Result<Self> {
        let version = reader.varint("transaction version")?;
        let unlock_time = reader.varint("unlock time")?;

        let count = reader.varint("input count")?;
        ensure!(count == 1, error::InputCountSnafu { count });

        let tag = reader.u8("input tag")?;
        ensure!(tag == TXIN_GEN, error::UnsupportedInputSnafu { tag });
        let height = reader.varint("height")?;

        let count = reader.varint("output count")?;
        let mut outputs = Vec::new();
        for _ in 0..count {
            let amount = reader.varint("output amount")?;
            let target = match reader.u8("output tag")? {
                TXOUT_TO_KEY => OutputTarget::Key(reader.array("output key")?),
                TXOUT_TO_TAGGED_KEY => OutputTarget::TaggedKey {
                    key: reader.array("output key")?,
                    view_tag: reader.u8("view tag")?,
                },
                tag => return error::UnsupportedOutputSnafu { tag }.fail(),
            };
            outputs.push(Output { amount, target });
        }

        let len = reader.varint("extra length")?;
        let extra = reader
            .bytes(
                usize::try_from(len).unwrap_or(usize::MAX),
                "extra",
            )?
            .to_vec();

        let rct_type = if version >= 2 {
            Some(reader.u8("ringct type")?)
        } else {
            None
        };

        Ok(Self {
            version,
            unlock_time,
            height,
            outputs,
            extra,
            rct_type,
        })
    }

    /// Everything before the extra bytes, including the extra length.
    fn write_prefix(&self, buf: &mut Vec<u8>) {
        varint::write(buf, self.version);
        varint::write(buf, self.unlock_time);
        varint::write(buf, 1);
        buf.push(TXIN_GEN);
        varint::write(buf, self.height);

        varint::write(buf, self.outputs.len() as u64);
        for output in &self.outputs {
            varint::write(buf, output.amount);
            match output.target {
                OutputTarget::Key(key) => {
                    buf.push(TXOUT_TO_KEY);
                    buf.extend_from_slice(&key);
                }
                OutputTarget::TaggedKey { key, view_tag } => {
                    buf.push(TXOUT_TO_TAGGED_KEY);
                    buf.extend_from_slice(&key);
                    buf.push(view_tag);
                }
            }
        }

        varint::write(buf, self.extra.len() as u64);
    }

    fn write_suffix(&self, buf: &mut Vec<u8>) {
        if let Some(rct_type) = self.rct_type {
            buf.push(rct_type);
        }
    }
}
