use super::*;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("invalid hex: {source}"))]
    Hex { source: hex::FromHexError },

    #[snafu(display("unexpected end of input while reading {field}"))]
    UnexpectedEof { field: &'static str },

    #[snafu(display("varint for {field} overflows 64 bits"))]
    VarintOverflow { field: &'static str },

    #[snafu(display("miner transaction must have exactly one input, found {count}"))]
    InputCount { count: u64 },

    #[snafu(display("unsupported input tag {tag:#04x}"))]
    UnsupportedInput { tag: u8 },

    #[snafu(display("unsupported output target tag {tag:#04x}"))]
    UnsupportedOutput { tag: u8 },

    #[snafu(display("{count} trailing bytes after block"))]
    TrailingBytes { count: usize },
}
