use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use naslink_config::{Config, ServerConfig};
use naslink_links::{CleanReport, Link, Naslinks};
use naslink_registry::{Database, Repository};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;

/// Open (creating if needed) the registry database named in the config.
pub(crate) async fn open_database(config: &Config) -> Result<Database> {
    let path = &config.database;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Database(path.clone()))?;
    }
    tracing::debug!(path = %path.display(), "Opening registry database");
    Database::connect(path).await.or_raise(|| ErrorKind::Database(path.clone()))
}

pub(crate) fn naslinks(db: &Database, dry_run: bool) -> Naslinks {
    Naslinks::from(Repository::new(db.pool().clone(), dry_run))
}

/// Resolve `serve [host] [port]` against the configured defaults. A single
/// argument is the port.
pub(crate) fn listen_on(endpoint: &[String], defaults: &ServerConfig) -> Result<(String, u16)> {
    let (host, port) = match endpoint {
        [] => return Ok((defaults.host.clone(), defaults.port)),
        [port] => (defaults.host.clone(), port),
        [host, port, ..] => (host.clone(), port),
    };
    let port = port.parse::<u16>().or_raise(|| ErrorKind::InvalidPort(port.clone()))?;
    Ok((host, port))
}

pub(crate) async fn serve(links: Naslinks, host: &str, port: u16) -> Result<()> {
    naslink_server::serve(host, port, links).await.or_raise(|| ErrorKind::Server)
}

/// Register each path, carrying on past failures. Returns how many failed.
pub(crate) async fn add(links: &Naslinks, paths: &[PathBuf]) -> usize {
    let mut failed = 0;
    for path in paths {
        match links.create(path).await {
            Ok(link) => println!("{}  {}", link.id, link.path.display()),
            Err(e) => {
                tracing::error!(path = %path.display(), error = ?e, "Failed to create naslink");
                failed += 1;
            },
        }
    }
    failed
}

/// Remove the link for each path, carrying on past failures. Returns how
/// many failed. A path without a link is not a failure.
pub(crate) async fn delete(links: &Naslinks, paths: &[PathBuf]) -> usize {
    let mut failed = 0;
    for path in paths {
        match links.delete(path).await {
            Ok(Some(link)) => println!("Removed {}  {}", link.id, link.path.display()),
            Ok(None) => println!("{} does not have a naslink", path.display()),
            Err(e) => {
                tracing::error!(path = %path.display(), error = ?e, "Failed to delete naslink");
                failed += 1;
            },
        }
    }
    failed
}

pub(crate) async fn list(links: &Naslinks) -> Result<()> {
    for link in links.enumerate().await.or_raise(|| ErrorKind::Links)? {
        println!("{}", list_line(&link));
    }
    Ok(())
}

fn list_line(link: &Link) -> String {
    let created = link.created_at.format(&Rfc3339).unwrap_or_else(|_| link.created_at.unix_timestamp().to_string());
    format!("{}  {:>12}  {}  {}", link.id, link.size, created, link.path.display())
}

pub(crate) async fn clean(links: &Naslinks) -> Result<CleanReport> {
    let report = links.clean().await.or_raise(|| ErrorKind::Links)?;
    let verb = if links.repository().is_dry_run() { "Would remove" } else { "Removed" };
    for removal in &report.removed {
        println!("{verb} {}  {}  ({:?})", removal.link.id, removal.link.path.display(), removal.integrity);
    }
    println!("Checked {} naslinks, {} invalid", report.checked, report.removed.len());
    Ok(report)
}

/// Load the layered config, with `--config` replacing the default file.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Config> {
    Config::load(explicit).or_raise(|| ErrorKind::Config)
}
