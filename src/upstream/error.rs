use super::*;

#[derive(Debug, Snafu)]
pub(crate) enum PoolError {
    #[snafu(display("timed out after {}s", timeout.as_secs()))]
    Timeout { timeout: Duration },
    #[snafu(display("I/O error: {source}"))]
    Io { source: std::io::Error },
    #[snafu(display("framing error: {source}"))]
    Lines {
        source: tokio_util::codec::LinesCodecError,
    },
    #[snafu(display("TLS error: {message}"))]
    Tls { message: String },
    #[snafu(display("serialization error: {source}"))]
    Serialization { source: serde_json::Error },
    #[snafu(display("login rejected: {message}"))]
    Rejected { message: String },
    #[snafu(display("no block template available"))]
    NoTemplate,
    #[snafu(display("no retained template for job `{job_id}`"))]
    UnknownTemplate { job_id: String },
    #[snafu(display("not connected to pool"))]
    NotConnected,
    #[snafu(display("connection closed"))]
    Closed,
}
