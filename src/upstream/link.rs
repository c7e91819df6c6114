use {
    super::*,
    rustls::pki_types::ServerName,
    tokio::io::{ReadHalf, WriteHalf},
};

trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

/// Line-framed connection to a pool, plain or TLS.
pub(super) struct Link {
    reader: FramedRead<ReadHalf<Box<dyn Stream>>, LinesCodec>,
    writer: FramedWrite<WriteHalf<Box<dyn Stream>>, LinesCodec>,
}

impl Link {
    pub(super) async fn open(pool: &PoolConfig) -> Result<Self, PoolError> {
        let tcp = TcpStream::connect((pool.hostname.as_str(), pool.port))
            .await
            .map_err(|source| PoolError::Io { source })?;

        tcp.set_nodelay(true)
            .map_err(|source| PoolError::Io { source })?;

        let stream: Box<dyn Stream> = if pool.tls {
            let connector = tls::connector(pool.allow_self_signed).map_err(|err| {
                PoolError::Tls {
                    message: format!("{err:#}"),
                }
            })?;

            let name = ServerName::try_from(pool.hostname.clone()).map_err(|err| {
                PoolError::Tls {
                    message: format!("invalid server name `{}`: {err}", pool.hostname),
                }
            })?;

            Box::new(
                connector
                    .connect(name, tcp)
                    .await
                    .map_err(|source| PoolError::Io { source })?,
            )
        } else {
            Box::new(tcp)
        };

        let (reader, writer) = tokio::io::split(stream);

        Ok(Self {
            reader: FramedRead::new(
                reader,
                LinesCodec::new_with_max_length(MAX_POOL_MESSAGE_SIZE),
            ),
            writer: FramedWrite::new(writer, LinesCodec::new()),
        })
    }

    pub(super) async fn send(&mut self, envelope: &Envelope) -> Result<(), PoolError> {
        let frame = serde_json::to_string(envelope)
            .map_err(|source| PoolError::Serialization { source })?;

        self.writer
            .send(frame)
            .await
            .map_err(|source| PoolError::Lines { source })
    }

    pub(super) async fn next_line(&mut self) -> Result<String, PoolError> {
        match self.reader.next().await {
            Some(Ok(line)) => Ok(line),
            Some(Err(source)) => Err(PoolError::Lines { source }),
            None => Err(PoolError::Closed),
        }
    }
}
