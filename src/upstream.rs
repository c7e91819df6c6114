use {
    super::*,
    backon::{ExponentialBuilder, Retryable},
    link::Link,
    message::{Envelope, PoolMessage},
    send_log::SendLog,
    tokio::time::{sleep, timeout},
};

mod error;
mod link;
mod message;
mod send_log;

pub(crate) use error::PoolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlobKind {
    /// Advance the pool nonce; what every miner job uses.
    Worker,
    /// Advance the worker nonce.
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum PoolState {
    Disconnected,
    Connecting,
    Authenticating,
    Active,
}

/// What a miner session needs from the pool it is attached to.
#[async_trait]
pub(crate) trait Upstream: Send + Sync {
    async fn issue_blob(&self, kind: BlobKind) -> Result<IssuedBlob, PoolError>;

    async fn submit_share(&self, share: Share) -> Result<(), PoolError>;

    fn templates(&self) -> watch::Receiver<Option<Arc<TemplateInfo>>>;
}

enum Command {
    Issue {
        kind: BlobKind,
        reply: oneshot::Sender<Result<IssuedBlob, PoolError>>,
    },
    Submit {
        share: Share,
        reply: oneshot::Sender<Result<(), PoolError>>,
    },
}

/// Cloneable handle to a running pool session. The session task is the only
/// owner of the template history, so nonce counters never race.
#[derive(Clone)]
pub(crate) struct PoolHandle {
    name: String,
    commands: mpsc::Sender<Command>,
    templates: watch::Receiver<Option<Arc<TemplateInfo>>>,
    state: watch::Receiver<PoolState>,
    active: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
    accepted: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
}

impl PoolHandle {
    pub(crate) fn spawn(
        pool: Arc<PoolConfig>,
        settings: Arc<Settings>,
        cancel: CancellationToken,
        tasks: &mut JoinSet<()>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (template_tx, template_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(PoolState::Disconnected);

        let active = Arc::new(AtomicBool::new(false));
        let failed = Arc::new(AtomicBool::new(false));
        let accepted = Arc::new(AtomicU64::new(0));
        let rejected = Arc::new(AtomicU64::new(0));

        let session = PoolSession {
            history: TemplateHistory::new(settings.template_history()),
            pool: pool.clone(),
            settings,
            commands: command_rx,
            templates: template_tx,
            state: Arc::new(state_tx),
            active: active.clone(),
            send_log: Arc::new(Mutex::new(SendLog::default())),
            accepted: accepted.clone(),
            rejected: rejected.clone(),
        };

        tasks.spawn({
            let failed = failed.clone();
            async move {
                if let Err(err) = session.run(cancel.clone()).await {
                    error!("Pool session ended: {err:#}");
                    failed.store(true, Ordering::SeqCst);
                    cancel.cancel();
                }
            }
        });

        Self {
            name: pool.name.clone(),
            commands: command_tx,
            templates: template_rx,
            state: state_rx,
            active,
            failed,
            accepted,
            rejected,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn state(&self) -> PoolState {
        *self.state.borrow()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Set once the session has given up reconnecting.
    pub(crate) fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    pub(crate) fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub(crate) fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T, PoolError>>) -> Command,
    ) -> Result<T, PoolError> {
        let (reply, response) = oneshot::channel();

        self.commands
            .send(command(reply))
            .await
            .map_err(|_| PoolError::Closed)?;

        response.await.map_err(|_| PoolError::Closed)?
    }
}

#[async_trait]
impl Upstream for PoolHandle {
    async fn issue_blob(&self, kind: BlobKind) -> Result<IssuedBlob, PoolError> {
        self.request(|reply| Command::Issue { kind, reply }).await
    }

    async fn submit_share(&self, share: Share) -> Result<(), PoolError> {
        self.request(|reply| Command::Submit { share, reply }).await
    }

    fn templates(&self) -> watch::Receiver<Option<Arc<TemplateInfo>>> {
        self.templates.clone()
    }
}

struct PoolSession {
    pool: Arc<PoolConfig>,
    settings: Arc<Settings>,
    commands: mpsc::Receiver<Command>,
    templates: watch::Sender<Option<Arc<TemplateInfo>>>,
    state: Arc<watch::Sender<PoolState>>,
    history: TemplateHistory,
    active: Arc<AtomicBool>,
    send_log: Arc<Mutex<SendLog>>,
    accepted: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
}

impl PoolSession {
    async fn run(mut self, cancel: CancellationToken) -> Result {
        loop {
            let Some((mut link, job)) = self.connect(&cancel).await? else {
                break;
            };

            info!(
                "Logged in to pool {} as {}",
                self.pool.name, self.pool.username
            );

            self.active.store(true, Ordering::SeqCst);
            self.state.send_replace(PoolState::Active);

            if let Some(job) = job {
                self.on_template(job);
            }

            let result = self.serve(&mut link, &cancel).await;

            self.active.store(false, Ordering::SeqCst);
            self.state.send_replace(PoolState::Disconnected);
            self.send_log.lock().clear();

            match result {
                Ok(()) => break,
                Err(err) => warn!("Lost connection to pool {}: {err}", self.pool.name),
            }
        }

        Ok(())
    }

    /// Dials and logs in with backoff. Miners keep being served from the
    /// retained templates while this runs.
    async fn connect(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<(Link, Option<Value>)>> {
        let attempts = self.settings.reconnect_attempts();

        let backoff = ExponentialBuilder::default()
            .with_min_delay(RECONNECT_MIN_DELAY)
            .with_max_delay(RECONNECT_MAX_DELAY)
            .with_jitter()
            .with_max_times(attempts.unwrap_or(usize::MAX));

        let pool = self.pool.clone();
        let send_log = self.send_log.clone();
        let state = self.state.clone();
        let deadline = self.settings.timeout();
        let name = self.pool.name.clone();

        let attempt = (move || {
            let pool = pool.clone();
            let send_log = send_log.clone();
            let state = state.clone();
            async move { handshake(&pool, &send_log, &state, deadline).await }
        })
        .retry(backoff)
        .sleep(sleep)
        .notify(move |err: &PoolError, delay: Duration| {
            warn!(
                "Failed to connect to pool {name}: {err}; retrying in {}ms",
                delay.as_millis()
            );
        });

        tokio::pin!(attempt);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(None),
                result = &mut attempt => {
                    let connected = result.with_context(|| {
                        format!(
                            "giving up on pool {} after {} reconnect attempts",
                            self.pool.name,
                            attempts.unwrap_or_default(),
                        )
                    })?;
                    return Ok(Some(connected));
                }
                Some(command) = self.commands.recv() => self.offline(command),
            }
        }
    }

    async fn serve(&mut self, link: &mut Link, cancel: &CancellationToken) -> Result<(), PoolError> {
        let mut heartbeat = interval(self.settings.heartbeat_interval());
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.reset();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Disconnecting from pool {}", self.pool.name);
                    return Ok(());
                }
                line = link.next_line() => self.receive(&line?),
                Some(command) = self.commands.recv() => self.command(link, command).await?,
                _ = heartbeat.tick(), if self.pool.keep_alive => {
                    self.send_message(link, "heartbeat", json!({})).await?;
                }
            }
        }
    }

    fn receive(&mut self, line: &str) {
        match serde_json::from_str::<PoolMessage>(line) {
            Ok(PoolMessage::Push { method, params }) if method == "job" => self.on_template(params),
            Ok(PoolMessage::Push { method, .. }) => {
                warn!("Ignoring `{method}` push from pool {}", self.pool.name);
            }
            Ok(PoolMessage::Response { id, result, error }) => self.on_response(id, result, error),
            Err(err) => warn!("Invalid message from pool {}: {err}", self.pool.name),
        }
    }

    fn on_response(&mut self, id: u64, result: Option<Value>, error: Option<Value>) {
        let Some(method) = self.send_log.lock().take(id) else {
            warn!("Response {id} from pool {} matches no request", self.pool.name);
            return;
        };

        match (method, error) {
            ("submit", None) => {
                self.accepted.fetch_add(1, Ordering::Relaxed);
                debug!("Pool {} accepted share {id}", self.pool.name);
            }
            ("submit", Some(error)) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!("Pool {} rejected share {id}: {error}", self.pool.name);
            }
            (method, Some(error)) => {
                warn!("Pool {} failed `{method}`: {error}", self.pool.name);
            }
            (method, None) => debug!("Pool {} answered `{method}`", self.pool.name),
        }

        if let Some(job) = result.and_then(|mut result| result.get_mut("job").map(Value::take)) {
            self.on_template(job);
        }
    }

    fn on_template(&mut self, params: Value) {
        let sequence = self.history.next_sequence();

        match BlockTemplate::decode(params, sequence, self.settings.instance_id()) {
            Ok(template) => {
                let info = template.info().clone();

                info!(
                    "New template {} from pool {}: job {} at height {} (difficulty {}, {})",
                    info.sequence,
                    self.pool.name,
                    info.job_id,
                    info.height,
                    info.difficulty,
                    if info.solo { "solo" } else { "pooled" },
                );

                if let Some(evicted) = self.history.replace(template) {
                    debug!("Evicted template {}", evicted.info().sequence);
                }

                self.active.store(true, Ordering::SeqCst);
                self.templates.send_replace(Some(info));
            }
            Err(err) => {
                warn!(
                    "Failed to decode template from pool {}: {err}",
                    self.pool.name
                );
                self.active.store(false, Ordering::SeqCst);
            }
        }
    }

    fn issue(&mut self, kind: BlobKind) -> Result<IssuedBlob, PoolError> {
        let template = self.history.current_mut().ok_or(PoolError::NoTemplate)?;

        Ok(match kind {
            BlobKind::Worker => template.issue_for_worker(),
            BlobKind::Next => template.issue_next_blob(),
        })
    }

    fn offline(&mut self, command: Command) {
        match command {
            Command::Issue { kind, reply } => {
                reply.send(self.issue(kind)).ok();
            }
            Command::Submit { reply, .. } => {
                reply.send(Err(PoolError::NotConnected)).ok();
            }
        }
    }

    async fn command(&mut self, link: &mut Link, command: Command) -> Result<(), PoolError> {
        match command {
            Command::Issue { kind, reply } => {
                reply.send(self.issue(kind)).ok();
                Ok(())
            }
            Command::Submit { share, reply } => {
                if self.history.find(&share.job_id).is_none() {
                    reply
                        .send(Err(PoolError::UnknownTemplate {
                            job_id: share.job_id,
                        }))
                        .ok();
                    return Ok(());
                }

                match self.send_message(link, "submit", share.params()).await {
                    Ok(id) => {
                        debug!(
                            "Forwarded share {id} for job {} at difficulty {}",
                            share.job_id, share.difficulty
                        );
                        reply.send(Ok(())).ok();
                        Ok(())
                    }
                    Err(err) => {
                        reply.send(Err(PoolError::NotConnected)).ok();
                        Err(err)
                    }
                }
            }
        }
    }

    async fn send_message(
        &mut self,
        link: &mut Link,
        method: &'static str,
        params: Value,
    ) -> Result<u64, PoolError> {
        let id = self.send_log.lock().record(method);

        link.send(&Envelope::new(id, method, params)?).await?;

        Ok(id)
    }
}

async fn handshake(
    pool: &PoolConfig,
    send_log: &Mutex<SendLog>,
    state: &watch::Sender<PoolState>,
    deadline: Duration,
) -> Result<(Link, Option<Value>), PoolError> {
    state.send_replace(PoolState::Connecting);

    info!(
        "Connecting to pool {} at {}:{}{}",
        pool.name,
        pool.hostname,
        pool.port,
        if pool.tls { " over TLS" } else { "" },
    );

    let mut link = timeout(deadline, Link::open(pool))
        .await
        .map_err(|_| PoolError::Timeout { timeout: deadline })??;

    state.send_replace(PoolState::Authenticating);

    let id = send_log.lock().record("login");

    let login = json!({
        "login": pool.username,
        "password": pool.password,
        "agent": USER_AGENT,
    });

    link.send(&Envelope::new(id, "login", login)?).await?;

    let job = timeout(deadline, login_response(&mut link, send_log, id))
        .await
        .map_err(|_| PoolError::Timeout { timeout: deadline })??;

    Ok((link, job))
}

async fn login_response(
    link: &mut Link,
    send_log: &Mutex<SendLog>,
    id: u64,
) -> Result<Option<Value>, PoolError> {
    let mut pushed = None;

    loop {
        let line = link.next_line().await?;

        match serde_json::from_str::<PoolMessage>(&line) {
            Ok(PoolMessage::Response {
                id: reply,
                result,
                error,
            }) if reply == id => {
                send_log.lock().take(id);

                if let Some(error) = error {
                    return Err(PoolError::Rejected {
                        message: error.to_string(),
                    });
                }

                let job = result
                    .and_then(|mut result| result.get_mut("job").map(Value::take))
                    .filter(|job| !job.is_null());

                return Ok(job.or(pushed));
            }
            Ok(PoolMessage::Push { method, params }) if method == "job" => pushed = Some(params),
            Ok(message) => debug!("Ignoring {message:?} during login"),
            Err(err) => warn!("Invalid message during login: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, fixtures::*, pretty_assertions::assert_eq};

    struct FakePool {
        reader: FramedRead<tokio::net::tcp::OwnedReadHalf, LinesCodec>,
        writer: FramedWrite<tokio::net::tcp::OwnedWriteHalf, LinesCodec>,
    }

    impl FakePool {
        async fn accept(listener: &TcpListener) -> Self {
            let (stream, _) = timeout(Duration::from_secs(10), listener.accept())
                .await
                .unwrap()
                .unwrap();
            let (reader, writer) = stream.into_split();
            Self {
                reader: FramedRead::new(reader, LinesCodec::new()),
                writer: FramedWrite::new(writer, LinesCodec::new()),
            }
        }

        async fn recv(&mut self) -> (Envelope, Value) {
            let line = timeout(Duration::from_secs(10), self.reader.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            let envelope = serde_json::from_str::<Envelope>(&line).unwrap();
            let params = serde_json::from_str(&envelope.params).unwrap();
            (envelope, params)
        }

        async fn send(&mut self, message: Value) {
            self.writer.send(message.to_string()).await.unwrap();
        }

        async fn accept_login(&mut self, job_id: &str) {
            let (login, _) = self.recv().await;
            assert_eq!(login.method, "login");
            self.send(json!({
                "id": login.id,
                "jsonrpc": "2.0",
                "error": null,
                "result": {"id": "proxy", "status": "OK", "job": json!(pooled_wire(job_id))},
            }))
            .await;
        }
    }

    async fn start(extra: &str) -> (TcpListener, PoolHandle, CancellationToken, JoinSet<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let settings = Settings::from_toml(
            &format!(
                r#"
                    instance_id = 9
                    template_history = 2
                    timeout = 5
                    {extra}

                    [[pools]]
                    name = "main"
                    hostname = "127.0.0.1"
                    port = {port}
                    username = "44Ab"
                    password = "proxy"
                    keep_alive = true

                    [[ports]]
                    port = 3333
                    starting_diff = 5000
                    max_diff = 100000
                "#
            ),
            "127.0.0.1".parse().unwrap(),
        )
        .unwrap();

        let settings = Arc::new(settings);
        let pool = settings.primary_pool().unwrap();
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();
        let handle = PoolHandle::spawn(pool, settings, cancel.clone(), &mut tasks);

        (listener, handle, cancel, tasks)
    }

    async fn wait_for_job(handle: &PoolHandle, job_id: &str) {
        let mut templates = handle.templates();
        timeout(
            Duration::from_secs(10),
            templates.wait_for(|template| {
                template
                    .as_ref()
                    .is_some_and(|template| template.job_id == job_id)
            }),
        )
        .await
        .unwrap()
        .unwrap();
    }

    fn share(job_id: &str) -> Share {
        Share {
            miner: Token::random(),
            job_id: job_id.into(),
            height: 10,
            nonce: Nonce::from([0, 0, 0, 7]),
            result: share_hash(),
            pool_nonce: 1,
            worker_nonce: 0,
            difficulty: difficulty(5000),
            found_block: false,
        }
    }

    async fn shutdown(cancel: CancellationToken, mut tasks: JoinSet<()>) {
        cancel.cancel();
        while tasks.join_next().await.is_some() {}
    }

    #[tokio::test]
    async fn login_and_templates() {
        let (listener, handle, cancel, tasks) = start("").await;
        let mut pool = FakePool::accept(&listener).await;

        let (login, params) = pool.recv().await;
        assert_eq!(login.method, "login");
        assert_eq!(
            params,
            json!({"id": login.id, "login": "44Ab", "password": "proxy", "agent": USER_AGENT})
        );

        assert!(matches!(
            handle.issue_blob(BlobKind::Worker).await,
            Err(PoolError::NoTemplate)
        ));

        pool.send(json!({
            "id": login.id,
            "error": null,
            "result": {"id": "proxy", "status": "OK", "job": json!(pooled_wire("job-1"))},
        }))
        .await;

        wait_for_job(&handle, "job-1").await;
        assert!(handle.is_active());
        assert_eq!(handle.state(), PoolState::Active);
        assert_eq!(handle.name(), "main");

        let first = handle.issue_blob(BlobKind::Worker).await.unwrap();
        let second = handle.issue_blob(BlobKind::Worker).await.unwrap();
        let next = handle.issue_blob(BlobKind::Next).await.unwrap();
        assert_eq!(first.pool_nonce, 1);
        assert_eq!(second.pool_nonce, 2);
        assert_eq!(next.worker_nonce, 1);
        assert_ne!(first.blob, second.blob);
        assert_ne!(second.blob, next.blob);

        pool.send(json!({
            "method": "job",
            "params": json!(pooled_wire("job-2")).to_string(),
        }))
        .await;

        wait_for_job(&handle, "job-2").await;
        assert_eq!(handle.issue_blob(BlobKind::Worker).await.unwrap().pool_nonce, 1);

        shutdown(cancel, tasks).await;
    }

    #[tokio::test]
    async fn shares_follow_retained_templates() {
        let (listener, handle, cancel, tasks) = start("").await;
        let mut pool = FakePool::accept(&listener).await;
        pool.accept_login("job-1").await;
        wait_for_job(&handle, "job-1").await;

        pool.send(json!({"method": "job", "params": pooled_wire("job-2")}))
            .await;
        wait_for_job(&handle, "job-2").await;

        handle.submit_share(share("job-1")).await.unwrap();

        let (submit, params) = pool.recv().await;
        assert_eq!(submit.method, "submit");
        assert_eq!(submit.id, "2");
        assert_eq!(params["job_id"], "job-1");
        assert_eq!(params["nonce"], "00000007");
        assert_eq!(params["poolNonce"], 1);
        assert_eq!(params["blockFound"], false);
        assert_eq!(params["id"], submit.id);

        pool.send(json!({"id": submit.id, "error": null, "result": {"status": "OK"}}))
            .await;

        handle.submit_share(share("job-2")).await.unwrap();
        let (submit, _) = pool.recv().await;
        pool.send(json!({
            "id": submit.id.parse::<u64>().unwrap(),
            "error": {"code": -1, "message": "Low difficulty share"},
            "result": null,
        }))
        .await;

        timeout(Duration::from_secs(10), async {
            while handle.accepted() != 1 || handle.rejected() != 1 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        assert!(matches!(
            handle.submit_share(share("unknown")).await,
            Err(PoolError::UnknownTemplate { job_id }) if job_id == "unknown"
        ));

        shutdown(cancel, tasks).await;
    }

    #[tokio::test]
    async fn large_templates_keep_the_session() {
        let (listener, handle, cancel, tasks) = start("").await;
        let mut pool = FakePool::accept(&listener).await;
        pool.accept_login("job-1").await;
        wait_for_job(&handle, "job-1").await;

        let wire = BlockTemplateWire {
            blob: busy_blob(600),
            ..pooled_wire("job-2")
        };
        let push = json!({"method": "job", "params": wire});
        assert!(push.to_string().len() > MAX_MESSAGE_SIZE);

        pool.send(push).await;
        wait_for_job(&handle, "job-2").await;

        assert_eq!(handle.state(), PoolState::Active);
        assert_eq!(handle.issue_blob(BlobKind::Worker).await.unwrap().pool_nonce, 1);

        handle.submit_share(share("job-2")).await.unwrap();
        let (submit, params) = pool.recv().await;
        assert_eq!(submit.method, "submit");
        assert_eq!(params["job_id"], "job-2");

        shutdown(cancel, tasks).await;
    }

    #[tokio::test]
    async fn bad_template_marks_pool_inactive() {
        let (listener, handle, cancel, tasks) = start("").await;
        let mut pool = FakePool::accept(&listener).await;
        pool.accept_login("job-1").await;
        wait_for_job(&handle, "job-1").await;

        let wire = BlockTemplateWire {
            client_nonce_offset: 10,
            ..pooled_wire("job-2")
        };
        pool.send(json!({"method": "job", "params": wire})).await;

        timeout(Duration::from_secs(10), async {
            while handle.is_active() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let current = handle.templates().borrow().clone().unwrap();
        assert_eq!(current.job_id, "job-1");

        shutdown(cancel, tasks).await;
    }

    #[tokio::test]
    async fn heartbeat() {
        let (listener, _handle, cancel, tasks) = start("heartbeat_interval = 1").await;
        let mut pool = FakePool::accept(&listener).await;
        pool.accept_login("job-1").await;

        let (message, params) = pool.recv().await;
        assert_eq!(message.method, "heartbeat");
        assert_eq!(params, json!({"id": message.id}));

        shutdown(cancel, tasks).await;
    }

    #[tokio::test]
    async fn reconnects_and_serves_while_offline() {
        let (listener, handle, cancel, tasks) = start("").await;
        let mut pool = FakePool::accept(&listener).await;
        pool.accept_login("job-1").await;
        wait_for_job(&handle, "job-1").await;

        drop(pool);

        timeout(Duration::from_secs(10), async {
            while handle.state() == PoolState::Active {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        assert!(!handle.is_active());
        assert_eq!(handle.issue_blob(BlobKind::Worker).await.unwrap().pool_nonce, 1);

        let mut pool = FakePool::accept(&listener).await;
        pool.accept_login("job-3").await;
        wait_for_job(&handle, "job-3").await;
        assert!(handle.is_active());

        shutdown(cancel, tasks).await;
    }

    #[tokio::test]
    async fn rejected_login_exhausts_attempts() {
        let (listener, handle, cancel, mut tasks) = start("reconnect_attempts = 1").await;

        for _ in 0..2 {
            let mut pool = FakePool::accept(&listener).await;
            let (login, _) = pool.recv().await;
            pool.send(json!({
                "id": login.id,
                "error": {"code": -1, "message": "invalid address"},
                "result": null,
            }))
            .await;
        }

        timeout(Duration::from_secs(10), tasks.join_next())
            .await
            .unwrap();

        assert!(cancel.is_cancelled());
        assert!(handle.has_failed());
        assert!(!handle.is_active());
    }
}
