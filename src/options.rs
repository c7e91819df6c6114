use super::*;

#[derive(Clone, Debug, Parser)]
pub struct Options {
    #[arg(
        long,
        env = "MOXY_CONFIG",
        default_value = "moxy.toml",
        help = "Load configuration from <CONFIG>."
    )]
    pub config: PathBuf,

    #[arg(
        long,
        env = "MOXY_ADDRESS",
        default_value = "0.0.0.0",
        help = "Listen for miners on <ADDRESS>."
    )]
    pub address: IpAddr,
}
