use {
    super::*,
    clap::builder::styling::{AnsiColor, Effects, Styles},
    subcommand::Subcommand,
};

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Monero mining proxy",
  styles = Styles::styled()
    .error(AnsiColor::Red.on_default() | Effects::BOLD)
    .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .invalid(AnsiColor::Red.on_default())
    .literal(AnsiColor::Blue.on_default())
    .placeholder(AnsiColor::Cyan.on_default())
    .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .valid(AnsiColor::Green.on_default()),
)]
pub(crate) struct Arguments {
    #[command(flatten)]
    pub(crate) options: Options,
    #[command(subcommand)]
    pub(crate) subcommand: Subcommand,
}

impl Arguments {
    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        self.subcommand.run(self.options, cancel_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommands() {
        let arguments =
            Arguments::try_parse_from(["moxy", "--config", "proxy.toml", "proxy"]).unwrap();
        assert!(matches!(arguments.subcommand, Subcommand::Proxy(_)));
        assert_eq!(arguments.options.config, PathBuf::from("proxy.toml"));

        let arguments = Arguments::try_parse_from(["moxy", "target", "5000"]).unwrap();
        assert!(matches!(arguments.subcommand, Subcommand::Target(_)));

        assert!(Arguments::try_parse_from(["moxy", "target", "0"]).is_err());
        assert!(Arguments::try_parse_from(["moxy"]).is_err());
    }
}
