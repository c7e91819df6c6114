use {
    tracing_appender::non_blocking::{NonBlocking, WorkerGuard},
    tracing_subscriber::{
        EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    },
};

const DEFAULT_FILTER: &str = "warn,moxy=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub(crate) fn init() -> WorkerGuard {
    let (writer, guard): (NonBlocking, WorkerGuard) =
        tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(writer)
                .with_filter(filter()),
        )
        .init();

    guard
}
