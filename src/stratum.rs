//! Miner-facing JSON-RPC messages and the scalar types they carry.

use {
    super::TOKEN_SIZE,
    byteorder::{BigEndian, ByteOrder, LittleEndian},
    derive_more::Display,
    primitive_types::U256,
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::{Value, json},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    snafu::{ResultExt, Snafu},
    std::{
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

mod difficulty;
mod error;
mod job;
mod login;
mod message;
mod nonce;
mod result_hash;
mod submit;
mod target;
mod token;

pub use {
    difficulty::Difficulty,
    error::{MinerError, ParseError, RequestError, RpcError},
    job::JobParams,
    login::{Credentials, LoginParams},
    message::{Method, Notification, Request, Response},
    nonce::Nonce,
    result_hash::ResultHash,
    submit::SubmitParams,
    target::Target,
    token::Token,
};

fn decode_fixed<const N: usize>(kind: &'static str, s: &str) -> Result<[u8; N], ParseError> {
    let mut bytes = [0; N];
    hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseError::Hex {
        kind,
        input: s.into(),
        expected: N * 2,
    })?;
    Ok(bytes)
}
