use {
    super::*,
    connection::Connection,
    tls::TlsAcceptor,
    tokio::time::timeout,
};

/// A socket accepted on one of the listening ports.
pub(crate) struct Inbound {
    stream: TcpStream,
    peer: SocketAddr,
    port: Arc<PortConfig>,
    tls: Option<TlsAcceptor>,
}

/// Binds every configured port and feeds accepted sockets into one channel.
pub(crate) async fn listen(
    settings: &Settings,
    cancel: &CancellationToken,
    tasks: &mut JoinSet<()>,
) -> Result<mpsc::Receiver<Inbound>> {
    let acceptor = match settings.tls_identity() {
        Some((cert, key)) if settings.ports().iter().any(|port| port.tls) => {
            Some(tls::acceptor(cert, key).context("failed to load TLS identity")?)
        }
        _ => None,
    };

    let (sender, receiver) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);

    for port in settings.ports() {
        let address = SocketAddr::new(settings.address(), port.port);

        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("failed to bind to {address}"))?;

        info!(
            "Listening for miners on {address}{} (starting difficulty {}{})",
            if port.tls { " over TLS" } else { "" },
            port.starting_diff,
            if port.fixed_diff { ", fixed" } else { "" },
        );

        let tls = acceptor.clone().filter(|_| port.tls);

        tasks.spawn(accept(
            listener,
            port.clone(),
            tls,
            sender.clone(),
            cancel.clone(),
        ));
    }

    Ok(receiver)
}

async fn accept(
    listener: TcpListener,
    port: Arc<PortConfig>,
    tls: Option<TlsAcceptor>,
    sender: mpsc::Sender<Inbound>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let inbound = Inbound {
                        stream,
                        peer,
                        port: port.clone(),
                        tls: tls.clone(),
                    };

                    if sender.send(inbound).await.is_err() {
                        break;
                    }
                }
                Err(err) => warn!("Failed to accept on port {}: {err}", port.port),
            },
        }
    }

    debug!("Stopped accepting on port {}", port.port);
}

/// Turns accepted sockets into miner sessions.
pub(crate) struct Dispatcher {
    settings: Arc<Settings>,
    upstream: Arc<dyn Upstream>,
    stats: Arc<Stats>,
    sessions: JoinSet<()>,
}

impl Dispatcher {
    pub(crate) fn new(settings: Arc<Settings>, upstream: Arc<dyn Upstream>, stats: Arc<Stats>) -> Self {
        Self {
            settings,
            upstream,
            stats,
            sessions: JoinSet::new(),
        }
    }

    pub(crate) async fn run(mut self, mut inbound: mpsc::Receiver<Inbound>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(result) = self.sessions.join_next() => {
                    if let Err(err) = result {
                        error!("Miner session panicked: {err}");
                    }
                }
                connection = inbound.recv() => match connection {
                    Some(connection) => self.spawn(connection, &cancel),
                    None => break,
                },
            }
        }

        info!("Waiting for {} miner sessions to close", self.sessions.len());
        while self.sessions.join_next().await.is_some() {}
    }

    fn spawn(&mut self, inbound: Inbound, cancel: &CancellationToken) {
        let Inbound {
            stream,
            peer,
            port,
            tls,
        } = inbound;

        let miner = Miner::new(
            Token::random(),
            peer,
            port.clone(),
            self.settings.vardiff(&port),
            self.settings.template_history(),
        );

        debug!("Accepted miner {peer} on port {} as {}", port.port, miner.id);

        let upstream = self.upstream.clone();
        let stats = self.stats.clone();
        let cancel = cancel.child_token();
        let handshake = self.settings.timeout();

        self.sessions.spawn(async move {
            stream.set_nodelay(true).ok();

            let result = match tls {
                Some(acceptor) => match timeout(handshake, acceptor.accept(stream)).await {
                    Ok(Ok(stream)) => {
                        let (reader, writer) = tokio::io::split(stream);
                        Connection::new(miner, upstream, stats, reader, writer, cancel)
                            .serve()
                            .await
                    }
                    Ok(Err(err)) => Err(anyhow!("TLS handshake failed: {err}")),
                    Err(_) => Err(anyhow!("TLS handshake timed out")),
                },
                None => {
                    let (reader, writer) = stream.into_split();
                    Connection::new(miner, upstream, stats, reader, writer, cancel)
                        .serve()
                        .await
                }
            };

            if let Err(err) = result {
                warn!("Session with miner {peer} ended: {err:#}");
            }
        });
    }
}
