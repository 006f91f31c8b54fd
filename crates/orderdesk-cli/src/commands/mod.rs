pub mod config;
pub mod orders;
pub mod session;

/// Runtime for commands that talk to the network or wait on timers.
pub(crate) fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
