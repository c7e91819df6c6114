use super::*;

/// TOML config file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub instance_id: Option<u32>,
    pub min_difficulty: Option<u64>,
    pub max_difficulty: Option<u64>,
    pub share_target_time: Option<u64>,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
    pub template_history: Option<usize>,
    pub heartbeat_interval: Option<u64>,
    pub timeout: Option<u64>,
    pub reconnect_attempts: Option<usize>,
    pub pools: Vec<PoolConfig>,
    pub ports: Vec<PortConfig>,
}

/// One upstream pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    pub(crate) name: String,
    pub(crate) hostname: String,
    pub(crate) port: u16,
    #[serde(default)]
    pub(crate) tls: bool,
    #[serde(default)]
    pub(crate) allow_self_signed: bool,
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) keep_alive: bool,
    #[serde(default)]
    pub(crate) primary: bool,
    #[serde(default)]
    pub(crate) dev: bool,
    #[serde(default = "default_share")]
    pub(crate) share: u32,
}

fn default_share() -> u32 {
    100
}

/// One listening port and the difficulty policy its miners start with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortConfig {
    pub(crate) port: u16,
    #[serde(default)]
    pub(crate) tls: bool,
    #[serde(default)]
    pub(crate) fixed_diff: bool,
    pub(crate) starting_diff: Difficulty,
    pub(crate) max_diff: Difficulty,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    address: IpAddr,
    instance_id: u32,
    min_difficulty: Difficulty,
    max_difficulty: Difficulty,
    share_target_time: Duration,
    tls_cert: Option<PathBuf>,
    tls_key: Option<PathBuf>,
    template_history: usize,
    heartbeat_interval: Duration,
    timeout: Duration,
    reconnect_attempts: Option<usize>,
    pools: Vec<Arc<PoolConfig>>,
    ports: Vec<Arc<PortConfig>>,
}

impl Settings {
    pub(crate) fn load(options: &Options) -> Result<Self> {
        let text = fs::read_to_string(&options.config).with_context(|| {
            format!("failed to read config file `{}`", options.config.display())
        })?;

        Self::from_toml(&text, options.address)
            .with_context(|| format!("invalid config file `{}`", options.config.display()))
    }

    pub(crate) fn from_toml(text: &str, address: IpAddr) -> Result<Self> {
        let config = toml::from_str::<Config>(text).context("failed to parse TOML")?;
        Self::from_config(config, address)
    }

    pub(crate) fn from_config(config: Config, address: IpAddr) -> Result<Self> {
        let min_difficulty = config.min_difficulty.unwrap_or(1000);
        let max_difficulty = config.max_difficulty.unwrap_or(100_000);

        let min_difficulty =
            Difficulty::new(min_difficulty).context("min_difficulty must be at least 1")?;
        let max_difficulty =
            Difficulty::new(max_difficulty).context("max_difficulty must be at least 1")?;

        ensure!(
            min_difficulty <= max_difficulty,
            "min_difficulty {min_difficulty} exceeds max_difficulty {max_difficulty}"
        );

        let share_target_time = config.share_target_time.unwrap_or(30);
        ensure!(share_target_time >= 1, "share_target_time must be at least 1");

        let template_history = config.template_history.unwrap_or(4);
        ensure!(template_history >= 1, "template_history must be at least 1");

        let heartbeat_interval = config.heartbeat_interval.unwrap_or(30);
        ensure!(heartbeat_interval >= 1, "heartbeat_interval must be at least 1");

        let timeout = config.timeout.unwrap_or(30);
        ensure!(timeout >= 1, "timeout must be at least 1");

        ensure!(!config.pools.is_empty(), "no pools configured");
        ensure!(!config.ports.is_empty(), "no ports configured");

        let mut seen = HashSet::new();
        for port in &config.ports {
            ensure!(seen.insert(port.port), "port {} configured twice", port.port);

            ensure!(
                !port.tls || (config.tls_cert.is_some() && config.tls_key.is_some()),
                "port {} uses TLS but tls_cert and tls_key are not both set",
                port.port
            );
        }

        Ok(Self {
            address,
            instance_id: config.instance_id.unwrap_or_else(rand::random),
            min_difficulty,
            max_difficulty,
            share_target_time: Duration::from_secs(share_target_time),
            tls_cert: config.tls_cert,
            tls_key: config.tls_key,
            template_history,
            heartbeat_interval: Duration::from_secs(heartbeat_interval),
            timeout: Duration::from_secs(timeout),
            reconnect_attempts: config.reconnect_attempts.filter(|attempts| *attempts > 0),
            pools: config.pools.into_iter().map(Arc::new).collect(),
            ports: config.ports.into_iter().map(Arc::new).collect(),
        })
    }

    pub(crate) fn address(&self) -> IpAddr {
        self.address
    }

    pub(crate) fn instance_id(&self) -> u32 {
        self.instance_id
    }

    pub(crate) fn min_difficulty(&self) -> Difficulty {
        self.min_difficulty
    }

    pub(crate) fn max_difficulty(&self) -> Difficulty {
        self.max_difficulty
    }

    pub(crate) fn share_target_time(&self) -> Duration {
        self.share_target_time
    }

    /// Certificate and key for TLS listeners, when both are configured.
    pub(crate) fn tls_identity(&self) -> Option<(&Path, &Path)> {
        Some((self.tls_cert.as_deref()?, self.tls_key.as_deref()?))
    }

    pub(crate) fn template_history(&self) -> usize {
        self.template_history
    }

    pub(crate) fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `None` retries forever.
    pub(crate) fn reconnect_attempts(&self) -> Option<usize> {
        self.reconnect_attempts
    }

    pub(crate) fn pools(&self) -> &[Arc<PoolConfig>] {
        &self.pools
    }

    pub(crate) fn ports(&self) -> &[Arc<PortConfig>] {
        &self.ports
    }

    /// The first pool flagged `primary`, else the first pool.
    pub(crate) fn primary_pool(&self) -> Option<Arc<PoolConfig>> {
        self.pools
            .iter()
            .find(|pool| pool.primary)
            .or_else(|| self.pools.first())
            .cloned()
    }

    /// Fresh vardiff state for a miner accepted on `port`.
    pub(crate) fn vardiff(&self, port: &PortConfig) -> Vardiff {
        let max = self.max_difficulty.min(port.max_diff);
        let min = self.min_difficulty.min(max);

        Vardiff::new(
            port.starting_diff,
            min,
            max,
            self.share_target_time,
            port.fixed_diff,
        )
    }
}
