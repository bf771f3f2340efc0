use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::sync::Arc;
use tokio::net::TcpListener;

mod builder;
mod config;
mod handler;
mod http;
mod logger;
mod prebuild;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    // Single-threaded runtime: requests are handled strictly one at a time,
    // so a build in progress delays every queued request.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;
    let state = Arc::new(config::AppState::new(&cfg));

    if cfg.build.on_start {
        prebuild::copy_latest_export(&cfg.prebuild, &cfg.site.include_base());
        if let Err(e) = state.builder.build() {
            // The server still starts; the next root request retries the build.
            logger::log_build_failed(&e);
        }
    }

    logger::log_server_start(&addr, &cfg);

    run_server_loop(listener, state).await
}

/// Accept loop. Each connection is served to completion before the next is
/// accepted; concurrent requests during a slow build queue in the listener
/// backlog. Keep-alive is disabled so a connection ends after one response —
/// otherwise a browser holding its first connection open would starve the
/// loop, and serialization would be per connection instead of per request.
/// The filesystem is the only state shared between the Builder and the
/// responses, so no further coordination is needed.
async fn run_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let io = TokioIo::new(stream);
                let service_state = Arc::clone(&state);

                let conn = http1::Builder::new().keep_alive(false).serve_connection(
                    io,
                    service_fn(move |req| {
                        let state = Arc::clone(&service_state);
                        async move { handler::handle_request(req, peer_addr, state).await }
                    }),
                );

                if let Err(err) = conn.await {
                    logger::log_connection_error(&err);
                }
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

/// Create a `TcpListener` with `SO_REUSEADDR` enabled, so a restarted dev
/// server can rebind the port while the previous socket is in `TIME_WAIT`.
fn create_reusable_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;

    // Non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
