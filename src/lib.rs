use {
    anyhow::{Context, Error, anyhow, ensure},
    arguments::Arguments,
    async_trait::async_trait,
    block_template::{BlockTemplate, BlockTemplateWire, IssuedBlob, TemplateInfo},
    byteorder::{BigEndian, ByteOrder, LittleEndian},
    clap::Parser,
    cryptonote::Block,
    dashmap::DashMap,
    derive_more::Display,
    futures::{sink::SinkExt, stream::StreamExt},
    jobs::JobCache,
    miner::Miner,
    options::Options,
    parking_lot::Mutex,
    serde::{
        Deserialize, Serialize,
        de::{self, Deserializer},
    },
    serde_json::{Value, json},
    settings::{PoolConfig, PortConfig, Settings},
    share::Share,
    snafu::Snafu,
    stats::Stats,
    std::{
        collections::{BTreeMap, HashSet, VecDeque},
        env,
        fs,
        net::{IpAddr, SocketAddr},
        ops::ControlFlow,
        path::{Path, PathBuf},
        process,
        sync::{
            Arc,
            atomic::{AtomicBool, AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    },
    stratum::{
        Difficulty, JobParams, LoginParams, Method, MinerError, Nonce, Notification, Request,
        Response, ResultHash, SubmitParams, Target, Token,
    },
    template_history::TemplateHistory,
    tokio::{
        io::{AsyncRead, AsyncWrite},
        net::{TcpListener, TcpStream},
        runtime::Runtime,
        sync::{mpsc, oneshot, watch},
        task::JoinSet,
        time::{MissedTickBehavior, interval},
    },
    tokio_util::{
        codec::{FramedRead, FramedWrite, LinesCodec},
        sync::CancellationToken,
    },
    tracing::{debug, error, info, warn},
    upstream::{BlobKind, PoolError, PoolHandle, PoolState, Upstream},
    vardiff::Vardiff,
};

mod arguments;
mod block_template;
mod connection;
mod dispatcher;
#[cfg(test)]
mod fixtures;
mod jobs;
mod logs;
mod miner;
mod options;
mod settings;
mod share;
mod signal;
mod stats;
pub mod stratum;
mod subcommand;
mod template_history;
mod tls;
mod upstream;
mod vardiff;

/// Agent string sent to upstream pools on login.
pub const USER_AGENT: &str = "xmr-node-proxy/0.0.3/compat/moneroGoProxy";
pub const MAX_MESSAGE_SIZE: usize = 32 * 1024;
pub const MAX_POOL_MESSAGE_SIZE: usize = 4 * 1024 * 1024;
pub const MAX_MINER_JOBS: usize = 32;
pub const TOKEN_SIZE: usize = 21;
pub const INBOUND_CHANNEL_CAPACITY: usize = 32;
pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;
pub const SEND_LOG_CAPACITY: usize = 1024;
pub const STATUS_INTERVAL: Duration = Duration::from_secs(60);
pub const RECONNECT_MIN_DELAY: Duration = Duration::from_secs(1);
pub const RECONNECT_MAX_DELAY: Duration = Duration::from_secs(60);

type Result<T = (), E = Error> = std::result::Result<T, E>;

pub fn main() {
    let _guard = logs::init();

    let args = Arguments::parse();

    Runtime::new()
        .expect("Failed to create tokio runtime")
        .block_on(async {
            let cancel_token = signal::setup_signal_handler();

            match args.run(cancel_token).await {
                Err(err) => {
                    eprintln!("error: {err}");

                    for (i, cause) in err.chain().skip(1).enumerate() {
                        if i == 0 {
                            eprintln!();
                            eprintln!("because:");
                        }
                        eprintln!("- {cause}");
                    }

                    if env::var_os("RUST_BACKTRACE")
                        .map(|val| val == "1")
                        .unwrap_or_default()
                    {
                        eprintln!();
                        eprintln!("{}", err.backtrace());
                    }
                    process::exit(1);
                }
                Ok(_) => {
                    process::exit(0);
                }
            }
        });
}
