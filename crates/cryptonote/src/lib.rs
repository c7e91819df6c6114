use snafu::{ResultExt, Snafu, ensure};

pub use {
    block::{Block, MinerTx, Output, OutputTarget},
    error::{Error, Result},
    reader::Reader,
};

pub mod varint;

mod block;
mod error;
mod reader;

pub const HASH_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 4;

pub type Hash = [u8; HASH_SIZE];
