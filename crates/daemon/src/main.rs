// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docd`: binds the WebSocket listener (§6's endpoint table) and dispatches
//! each accepted connection into a Session Handler loop. One task per
//! connection, same shape as the teacher's `Listener::run_unix_only`.

use std::sync::Arc;

use doc_adapters::{AuthResolver, HttpLlmClient, JwtAuthResolver, JwtConfig, LlmClient, Principal};
use doc_core::{Config, DocumentId};
use doc_daemon::DaemonCore;
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Which scope + document a connection's path names, captured off the
/// upgrade request before the handshake callback hands control back.
#[derive(Debug, Clone)]
struct Route {
    scope: doc_daemon::Scope,
    document_id: DocumentId,
    token: Option<String>,
}

fn parse_route(uri_path_and_query: &str) -> Option<Route> {
    let (path, query) = match uri_path_and_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (uri_path_and_query, None),
    };

    let scope = if let Some(rest) = path.strip_prefix("/api/documents/stream/") {
        Some((doc_daemon::Scope::Document, rest))
    } else if let Some(rest) = path.strip_prefix("/api/conversations/stream/") {
        Some((doc_daemon::Scope::Conversation, rest))
    } else {
        None
    };
    let (scope, document_id_raw) = scope?;
    let document_id = DocumentId::parse(document_id_raw).ok()?;

    let token = query.and_then(|q| {
        q.split('&').find_map(|kv| kv.strip_prefix("token=").map(|v| v.to_string()))
    });

    Some(Route { scope, document_id, token })
}

/// Capture the upgrade request's path+query via the `accept_hdr_async`
/// callback, then let the handshake complete unconditionally; routing
/// decisions (404 vs. unauthorized) happen after the socket is open so we
/// can close it with a protocol-level `.close()` frame instead of a bare
/// HTTP rejection (§4.3's close-code contract).
fn capture_route(slot: Arc<Mutex<Option<String>>>) -> impl Fn(&Request, Response) -> Result<Response, Response> {
    move |request: &Request, response: Response| {
        *slot.lock() = Some(
            request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| request.uri().path().to_string()),
        );
        Ok(response)
    }
}

async fn handle_connection(core: Arc<DaemonCore>, auth: Arc<dyn AuthResolver>, stream: TcpStream) {
    let slot = Arc::new(Mutex::new(None));
    let socket = match tokio_tungstenite::accept_hdr_async(stream, capture_route(Arc::clone(&slot))).await {
        Ok(socket) => socket,
        Err(err) => {
            warn!(%err, "websocket handshake failed");
            return;
        }
    };

    let raw_path = slot.lock().take();
    let Some(route) = raw_path.as_deref().and_then(parse_route) else {
        warn!("unrecognized websocket path, closing");
        let mut socket = socket;
        doc_daemon::session::reject_unrecognized_path(&mut socket).await;
        return;
    };

    let principal = match auth.resolve(route.token.as_deref()).await {
        Ok(principal) => principal,
        Err(err) => {
            warn!(%err, "token resolution failed, treating as anonymous");
            Principal::Anonymous
        }
    };

    match route.scope {
        doc_daemon::Scope::Document => {
            doc_daemon::run_document_session(core, socket, route.document_id, principal).await;
        }
        doc_daemon::Scope::Conversation => {
            doc_daemon::run_conversation_session(core, socket, route.document_id, principal).await;
        }
    }
}

fn build_auth(config: &Config) -> Arc<dyn AuthResolver> {
    match JwtConfig::from_env() {
        Some(jwt) => Arc::new(JwtAuthResolver::new(&jwt)),
        None => {
            warn!("JWT_SECRET unset, all connections resolve as anonymous");
            Arc::new(AnonymousOnlyResolver)
        }
    }
}

/// Fallback used only when no JWT secret is configured (e.g. local/demo
/// runs): every caller resolves as anonymous, so only example documents are
/// reachable (§4.8's authorization rule still applies on top of this).
struct AnonymousOnlyResolver;

#[async_trait::async_trait]
impl AuthResolver for AnonymousOnlyResolver {
    async fn resolve(&self, _token: Option<&str>) -> Result<Principal, doc_adapters::AuthError> {
        Ok(Principal::Anonymous)
    }
}

fn build_llm(config: &Config) -> Arc<dyn LlmClient> {
    let _ = config;
    let base_url = std::env::var("LLM_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let api_key = std::env::var("LLM_API_KEY").unwrap_or_default();
    Arc::new(HttpLlmClient::new(base_url, api_key))
}

/// Initialize the global `tracing` subscriber. When `LOG_DIR` is set, logs
/// go to a daily-rotating file in that directory (in addition to stdout);
/// otherwise stdout only. The returned guard must be held for the process
/// lifetime — dropping it stops the non-blocking writer from flushing.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var("LOG_DIR") {
        Ok(dir) => {
            let file_appender = tracing_appender::rolling::daily(&dir, "docd.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt().with_env_filter(filter()).with_writer(non_blocking).init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::fmt().with_env_filter(filter()).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let _log_guard = init_logging();

    let config = Config::from_env();
    let llm = build_llm(&config);
    let auth = build_auth(&config);
    let listen_addr = config.listen_addr.clone();

    let core = Arc::new(DaemonCore::new(config, llm, auth.clone()));
    core.start();

    let listener = TcpListener::bind(&listen_addr).await?;
    info!(%listen_addr, "docd listening");

    loop {
        tokio::select! {
            biased;
            _ = shutdown_signal() => {
                info!("shutdown signal received, draining in-flight tasks");
                core.shutdown().await;
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        error!(%err, "accept failed");
                        continue;
                    }
                };
                let core = Arc::clone(&core);
                let auth = Arc::clone(&auth);
                tokio::spawn(async move {
                    info!(%peer, "accepted connection");
                    handle_connection(core, auth, stream).await;
                });
            }
        }
    }
}

/// Waits for SIGINT (Ctrl+C) or, on Unix, SIGTERM — whichever arrives first.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut sig) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            std::future::pending::<()>().await;
            unreachable!()
        };
        sig.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
