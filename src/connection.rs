use super::*;

/// One miner session: reads JSON-RPC lines, answers them in order, and pushes
/// a fresh job whenever the upstream template changes.
pub(crate) struct Connection<R, W> {
    miner: Miner,
    upstream: Arc<dyn Upstream>,
    stats: Arc<Stats>,
    reader: FramedRead<R, LinesCodec>,
    writer: FramedWrite<W, LinesCodec>,
    cancel: CancellationToken,
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(
        miner: Miner,
        upstream: Arc<dyn Upstream>,
        stats: Arc<Stats>,
        reader: R,
        writer: W,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            miner,
            upstream,
            stats,
            reader: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_MESSAGE_SIZE)),
            writer: FramedWrite::new(writer, LinesCodec::new()),
            cancel,
        }
    }

    pub(crate) async fn serve(mut self) -> Result {
        self.stats.connect();
        let result = self.run().await;
        self.miner.close();
        self.stats.disconnect(&self.miner.id);
        result
    }

    async fn run(&mut self) -> Result {
        let mut templates = self.upstream.templates();
        templates.borrow_and_update();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("Shutting down session with {}", self.miner.address);
                    break;
                }
                line = self.reader.next() => {
                    let Some(line) = line else {
                        info!("Miner {} disconnected", self.miner.address);
                        break;
                    };

                    let line = line.with_context(|| {
                        format!("failed to read from miner {}", self.miner.address)
                    })?;

                    if self.handle(&line).await?.is_break() {
                        break;
                    }
                }
                changed = templates.changed() => {
                    if changed.is_err() {
                        info!("Template feed closed, dropping miner {}", self.miner.address);
                        break;
                    }

                    templates.borrow_and_update();

                    if self.miner.is_active() {
                        self.push_job().await?;
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle(&mut self, line: &str) -> Result<ControlFlow<()>> {
        let request = match line.parse::<Request>() {
            Ok(request) => request,
            Err(err) => {
                warn!("Invalid message from {}: {err}", self.miner.address);

                return Ok(if self.miner.is_active() {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                });
            }
        };

        self.miner.touch(request.id);

        match request.method {
            Method::Login(params) => self.login(params).await?,
            Method::GetJob => self.getjob().await?,
            Method::Submit(params) => self.submit(params).await?,
            Method::Keepalived => self.keepalived().await?,
        }

        Ok(ControlFlow::Continue(()))
    }

    async fn login(&mut self, params: LoginParams) -> Result {
        info!(
            "LOGIN from {} as {} with agent {:?}",
            self.miner.address, params.login, params.agent
        );

        if let Err(err) = self.miner.login(params) {
            warn!("Rejected login from {}: {err}", self.miner.address);
            return self.send_error(err).await;
        }

        let job = match self.miner.job(true, &*self.upstream).await {
            Ok(job) => job,
            Err(err) => {
                warn!("No job for {}: {err}", self.miner.address);
                return self.send_error(MinerError::NoJob).await;
            }
        };

        self.miner.activate();
        self.stats.update(&self.miner);

        info!(
            "Miner {} logged in as {} at difficulty {}",
            self.miner.id,
            self.miner.login,
            self.miner.vardiff.current()
        );

        let result = json!({
            "id": self.miner.id,
            "job": job,
            "status": "OK",
        });

        self.send_result(result).await
    }

    async fn getjob(&mut self) -> Result {
        if !self.miner.is_active() {
            return self.send_error(MinerError::NotAuthenticated).await;
        }

        match self.miner.job(true, &*self.upstream).await {
            Ok(job) => self.send_result(json!(job)).await,
            Err(err) => {
                warn!("No job for {}: {err}", self.miner.address);
                self.send_error(MinerError::NoJob).await
            }
        }
    }

    async fn submit(&mut self, params: SubmitParams) -> Result {
        if !self.miner.is_active() {
            return self.send_error(MinerError::NotAuthenticated).await;
        }

        let share = match self.miner.submit(&params) {
            Ok(share) => share,
            Err(err) => {
                debug!(
                    "Rejected share from {} for job {}: {err}",
                    self.miner.id, params.job_id
                );
                self.stats.reject();
                return self.send_error(err).await;
            }
        };

        self.stats.accept(share.difficulty);
        self.stats.update(&self.miner);

        if share.found_block {
            info!(
                "Block candidate at height {} from {} ({})",
                share.height, self.miner.login, self.miner.id
            );
            self.stats.block();
        }

        if let Err(err) = self.upstream.submit_share(share).await {
            warn!("Failed to forward share from {}: {err}", self.miner.id);
        }

        self.send_result(json!({"status": "OK"})).await
    }

    async fn keepalived(&mut self) -> Result {
        if !self.miner.is_active() {
            return self.send_error(MinerError::NotAuthenticated).await;
        }

        self.send_result(json!({"status": "KEEPALIVED"})).await
    }

    async fn push_job(&mut self) -> Result {
        match self.miner.job(true, &*self.upstream).await {
            Ok(job) => {
                debug!("Sending job {} to {}", job.job_id, self.miner.id);
                self.send(&Notification::job(&job)).await
            }
            Err(err) => {
                warn!("Failed to refresh job for {}: {err}", self.miner.id);
                Ok(())
            }
        }
    }

    async fn send_result(&mut self, result: Value) -> Result {
        let response = Response::result(self.miner.rpc_id, result);
        self.send(&response).await
    }

    async fn send_error(&mut self, error: MinerError) -> Result {
        let response = Response::error(self.miner.rpc_id, &error);
        self.send(&response).await
    }

    async fn send<T: Serialize>(&mut self, message: &T) -> Result {
        let frame = serde_json::to_string(message)?;
        self.writer
            .send(frame)
            .await
            .with_context(|| format!("failed to write to miner {}", self.miner.address))
    }
}
