//! Development server with rebuild-on-change.
//!
//! A lightweight HTTP server over the build output, plus a watcher
//! thread that triggers a full rebuild when the content, layouts or site
//! config change. Every rebuild is an independent `Builder` invocation,
//! so no caches survive between runs and watch builds match a cold `build`.

use crate::build::Builder;
use crate::config::{BuildOptions, SitePaths};
use crate::log;
use crate::logger::WatchStatus;
use anyhow::{Context, Result, anyhow};
use notify::{RecursiveMode, Watcher};
use std::{
    fs,
    net::SocketAddr,
    path::Path,
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Quiet period before a change burst triggers one rebuild
const DEBOUNCE: Duration = Duration::from_millis(250);

/// Build once, then serve the output directory until Ctrl+C.
pub fn serve_site(
    paths: SitePaths,
    options: BuildOptions,
    interface: &str,
    port: u16,
    watch: bool,
) -> Result<()> {
    Builder::new(paths.clone(), options).build()?;

    let interface: std::net::IpAddr = interface.parse()?;
    let (server, addr) = try_bind_port(interface, port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{addr}");

    if watch {
        let watch_paths = paths.clone();
        std::thread::spawn(move || {
            if let Err(err) = watch_for_changes(&watch_paths, options) {
                log!("watch"; "{err:#}");
            }
        });
    }

    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &paths.dist) {
            log!("serve"; "request error: {err:#}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {base_port} in use, using {port} instead");
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => continue,
            Err(e) => {
                return Err(anyhow!(
                    "Failed to bind after {max_retries} attempts (ports {base_port}-{port}): {e}"
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// File Watching
// ============================================================================

/// Block on file events, rebuilding after each quiet period.
fn watch_for_changes(paths: &SitePaths, options: BuildOptions) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;

    watcher.watch(&paths.content, RecursiveMode::Recursive)?;
    if paths.layouts.is_dir() {
        watcher.watch(&paths.layouts, RecursiveMode::Recursive)?;
    }
    if paths.site_config().is_file() {
        watcher.watch(&paths.site_config(), RecursiveMode::NonRecursive)?;
    }

    log!("watch"; "watching for changes");
    let mut status = WatchStatus::new();

    loop {
        // Block on the first event of a burst, then drain until quiet.
        let first = rx.recv().map_err(|_| anyhow!("watcher channel closed"))?;
        if first.is_err() {
            continue;
        }
        while rx.recv_timeout(DEBOUNCE).is_ok() {}

        let started = Instant::now();
        match Builder::new(paths.clone(), options).build() {
            Ok(()) => status.success(&format!("rebuilt in {:.1?}", started.elapsed())),
            Err(err) => status.error("rebuild failed", &format!("{err:#}")),
        }
    }
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
///
/// Resolution order: exact file → directory `index.html` → 404.
fn handle_request(request: Request, serve_root: &Path) -> Result<()> {
    let url = request.url().to_owned();
    let request_path = url.split('?').next().unwrap_or(&url).trim_matches('/');
    let local_path = serve_root.join(request_path);

    if local_path.is_file() {
        return serve_file(request, &local_path);
    }

    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path);
        }
    }

    let response = Response::new_empty(StatusCode(404));
    request.respond(response)?;
    Ok(())
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content).with_header(
        Header::from_bytes("Content-Type", content_type)
            .map_err(|_| anyhow!("invalid header"))?,
    );

    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(
            guess_content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("styles/main.css")),
            "text/css; charset=utf-8"
        );
        assert_eq!(guess_content_type(Path::new("smile.png")), "image/png");
        assert_eq!(
            guess_content_type(Path::new("unknown.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            guess_content_type(Path::new("no_extension")),
            "application/octet-stream"
        );
    }
}
