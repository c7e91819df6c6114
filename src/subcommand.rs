use super::*;

mod proxy;
mod target;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Run the mining proxy")]
    Proxy(proxy::Proxy),
    #[command(about = "Print the wire target for a difficulty")]
    Target(target::Target),
}

impl Subcommand {
    pub(crate) async fn run(self, options: Options, cancel_token: CancellationToken) -> Result {
        match self {
            Self::Proxy(proxy) => proxy.run(options, cancel_token).await,
            Self::Target(target) => target.run(),
        }
    }
}
