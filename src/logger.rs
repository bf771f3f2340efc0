//! Logger module
//!
//! Console logging with `[TAG]` prefixes: server lifecycle, access lines,
//! build results, warnings and errors. Access lines carry a local timestamp
//! in Common Log Format style.

use crate::config::Config;
use chrono::Local;
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("makeserve started");
    println!("Listening on: http://{addr}");
    println!("Serving root: {}", config.site.serving_root);
    println!(
        "Root template: {} -> {}",
        config.site.root_template_path().display(),
        config.site.output_path().display()
    );
    println!("Log level: {}", config.logging.level);
    if config.build.detect_cycles {
        println!("Cycle detection: enabled");
    }
    if config.prebuild.enabled {
        println!("Prebuild copy: {}", config.prebuild.pattern);
    }
    println!("======================================\n");
}

pub fn log_request(peer_addr: &SocketAddr, method: &Method, uri: &Uri, version: Version) {
    println!(
        "{} [{}] \"{} {} {:?}\"",
        peer_addr.ip(),
        Local::now().format("%d/%b/%Y:%H:%M:%S %z"),
        method,
        uri,
        version
    );
}

pub fn log_build_completed(output: &Path, bytes: u64, elapsed: Duration) {
    println!(
        "[Build] Wrote {} ({bytes} bytes, {:.1}ms)",
        output.display(),
        elapsed.as_secs_f64() * 1000.0
    );
}

pub fn log_build_failed(err: &impl std::fmt::Display) {
    eprintln!("[Build ERROR] {err}");
}

pub fn log_prebuild_copied(source: &Path, dest: &Path) {
    println!(
        "[Prebuild] Copied {} -> {}",
        source.display(),
        dest.display()
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}
