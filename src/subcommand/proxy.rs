use {
    super::*,
    dispatcher::{Dispatcher, listen},
};

#[derive(Debug, Parser)]
pub(crate) struct Proxy {}

impl Proxy {
    pub(crate) async fn run(self, options: Options, cancel_token: CancellationToken) -> Result {
        let settings = Arc::new(Settings::load(&options)?);

        let pool = settings.primary_pool().context("no pools configured")?;

        for unused in settings.pools().iter().filter(|other| other.name != pool.name) {
            warn!(
                "Ignoring pool {} ({}:{}); only the primary pool is used",
                unused.name, unused.hostname, unused.port
            );
        }

        info!(
            "Starting proxy instance {:08x} (difficulty {}..{}, {}s per share)",
            settings.instance_id(),
            settings.min_difficulty(),
            settings.max_difficulty(),
            settings.share_target_time().as_secs(),
        );

        let mut tasks = JoinSet::new();

        let upstream = PoolHandle::spawn(
            pool,
            settings.clone(),
            cancel_token.clone(),
            &mut tasks,
        );

        let stats = Arc::new(Stats::new());

        let inbound = listen(&settings, &cancel_token, &mut tasks).await?;

        tasks.spawn(status(upstream.clone(), stats.clone(), cancel_token.clone()));

        Dispatcher::new(settings, Arc::new(upstream.clone()), stats)
            .run(inbound, cancel_token.clone())
            .await;

        cancel_token.cancel();

        info!("Waiting for {} tasks to complete...", tasks.len());
        while tasks.join_next().await.is_some() {}
        info!("All proxy tasks stopped");

        ensure!(
            !upstream.has_failed(),
            "lost pool {} and exhausted reconnect attempts",
            upstream.name()
        );

        Ok(())
    }
}

async fn status(upstream: PoolHandle, stats: Arc<Stats>, cancel: CancellationToken) {
    let mut ticker = interval(STATUS_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.reset();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                info!(
                    "{} accepted={} upstream_rejected={}",
                    stats.status_line(upstream.name(), upstream.state()),
                    upstream.accepted(),
                    upstream.rejected(),
                );
            }
        }
    }
}
