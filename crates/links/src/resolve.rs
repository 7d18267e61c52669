use crate::Naslinks;
use crate::error::Result;
use naslink_fingerprint::check;
use naslink_registry::Link;
use tracing::{Instrument, info_span};

/// Who asked for a link. Only ever used for audit logging.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub method: String,
    pub user_agent: Option<String>,
    pub remote_addr: Option<String>,
    pub forwarded_for: Option<String>,
}

/// What a request for an identifier should turn into.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The identifier was empty: show the landing page.
    Landing,
    /// The link exists and its file is intact.
    Serve(Link),
    /// No such link, or it was just invalidated and deleted.
    NotFound,
}

/// Strip leading/trailing slashes and whitespace from a raw request path.
pub fn normalize_identifier(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '/' || c.is_whitespace())
}

impl Naslinks {
    /// Turn a raw request path into a [`Resolution`].
    ///
    /// A link whose file fails the integrity check is deleted on the spot,
    /// so it answers [`Resolution::NotFound`] to this and every later
    /// request, even if the file is later restored.
    pub async fn resolve(&self, raw: &str, caller: &Caller) -> Result<Resolution> {
        let identifier = normalize_identifier(raw);
        let span = info_span!(
            "resolve",
            method = %caller.method,
            id = identifier,
            user_agent = caller.user_agent.as_deref(),
            remote_addr = caller.remote_addr.as_deref(),
            forwarded_for = caller.forwarded_for.as_deref(),
        );
        self.resolve_identifier(identifier).instrument(span).await
    }

    async fn resolve_identifier(&self, identifier: &str) -> Result<Resolution> {
        if identifier.is_empty() {
            tracing::info!("Landing page requested");
            return Ok(Resolution::Landing);
        }
        let Some(link) = self.lookup(identifier).await? else {
            tracing::info!("Unknown naslink requested");
            return Ok(Resolution::NotFound);
        };
        let integrity = check(&link.path, &link.fingerprint, link.size).await;
        if !integrity.is_intact() {
            tracing::warn!(
                path = %link.path.display(),
                reason = ?integrity,
                "File failed integrity check; removing naslink"
            );
            self.retire(&link).await?;
            return Ok(Resolution::NotFound);
        }
        tracing::info!(path = %link.path.display(), size = link.size, "Serving file");
        Ok(Resolution::Serve(link))
    }
}
