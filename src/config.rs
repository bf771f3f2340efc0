//! Configuration module
//!
//! Layered configuration: an optional `config.toml`, `MAKESERVE_`-prefixed
//! environment variables, and programmatic defaults. The defaults reproduce
//! the conventional zero-config layout (serve `public/`, rebuild
//! `public/index.html` from `index.in.html` next to it), so the server runs
//! with no config file at all.

use crate::builder::Builder;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub build: BuildConfig,
    pub prebuild: PrebuildConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Filesystem layout of the site being served.
///
/// `root_template` is relative to the *parent* of `serving_root`, the same
/// directory inclusion directives resolve against. `output_file` is the name
/// of the flattened document written inside `serving_root`.
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub serving_root: String,
    pub root_template: String,
    pub output_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BuildConfig {
    /// Run one build before the server starts accepting requests.
    pub on_start: bool,
    /// Fail fast on cyclic inclusion instead of recursing unboundedly.
    pub detect_cycles: bool,
}

/// Optional pre-build step: copy the newest file matching `pattern` over
/// `dest` before expanding templates. Disabled unless both fields are set.
#[derive(Debug, Deserialize, Clone)]
pub struct PrebuildConfig {
    pub enabled: bool,
    /// Glob pattern for candidate source files, e.g. `/home/me/Downloads/export*.html`.
    pub pattern: String,
    /// Destination path, relative to the parent of the serving root.
    pub dest: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("MAKESERVE"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("site.serving_root", "public")?
            .set_default("site.root_template", "index.in.html")?
            .set_default("site.output_file", "index.html")?
            .set_default("build.on_start", true)?
            .set_default("build.detect_cycles", false)?
            .set_default("prebuild.enabled", false)?
            .set_default("prebuild.pattern", "")?
            .set_default("prebuild.dest", "")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("http.server_name", "makeserve/0.1")?
            .set_default("http.enable_cors", false)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

impl SiteConfig {
    /// Directory inclusion directives resolve against: the parent of the
    /// serving root. An empty parent (serving root is a bare name) means the
    /// current directory.
    pub fn include_base(&self) -> PathBuf {
        match Path::new(&self.serving_root).parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Path of the root template, resolved against the include base.
    pub fn root_template_path(&self) -> PathBuf {
        self.include_base().join(&self.root_template)
    }

    /// Path of the output document inside the serving root.
    pub fn output_path(&self) -> PathBuf {
        Path::new(&self.serving_root).join(&self.output_file)
    }
}

/// Shared application state: the loaded configuration plus the Builder with
/// its layout resolved once at startup.
pub struct AppState {
    pub config: Config,
    pub builder: Builder,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            builder: Builder::from_config(&config.site, &config.build),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(root: &str) -> SiteConfig {
        SiteConfig {
            serving_root: root.to_string(),
            root_template: "index.in.html".to_string(),
            output_file: "index.html".to_string(),
        }
    }

    #[test]
    fn test_include_base_bare_name() {
        assert_eq!(site("public").include_base(), PathBuf::from("."));
    }

    #[test]
    fn test_include_base_nested() {
        assert_eq!(site("site/public").include_base(), PathBuf::from("site"));
    }

    #[test]
    fn test_derived_paths() {
        let s = site("public");
        assert_eq!(s.root_template_path(), PathBuf::from("./index.in.html"));
        assert_eq!(s.output_path(), PathBuf::from("public/index.html"));
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            site: site("public"),
            build: BuildConfig {
                on_start: true,
                detect_cycles: false,
            },
            prebuild: PrebuildConfig {
                enabled: false,
                pattern: String::new(),
                dest: String::new(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: true,
            },
            http: HttpConfig {
                server_name: "makeserve/0.1".to_string(),
                enable_cors: false,
            },
        };
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse().unwrap()
        );
    }
}
