//! Tenant model and per-request tenant resolution.
//!
//! Every request is scoped to exactly one tenant. Resolution follows a fixed
//! precedence chain, first match wins:
//!
//! 1. explicit override identifier (`forceTenant` query parameter),
//! 2. `X-Tenant-ID` header,
//! 3. the non-deleted tenant whose routing domain equals the request host.
//!
//! A failed resolution yields `Ok(None)`, never an error that would abort
//! unrelated request processing.

use anyhow::Result;

use crate::store::Store;

/// One business account. Owns all localizable content by foreign reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    /// Source language of all content; implicitly `Published` at 100%.
    pub default_language: String,
    /// Routing domain for host-based resolution, e.g. "skanisalon.sk".
    pub domain: Option<String>,
    /// Passed to the translation provider as business context.
    pub business_type: String,
    pub is_deleted: bool,
}

impl Tenant {
    /// Business-type hint handed to the provider; blank falls back to a
    /// generic descriptor so prompts always carry some context.
    pub fn business_hint(&self) -> &str {
        if self.business_type.trim().is_empty() {
            "General Business"
        } else {
            &self.business_type
        }
    }
}

/// The tenant-identifying inputs extracted from one request.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    /// Explicit override, e.g. `?forceTenant=2`.
    pub force_tenant: Option<i64>,
    /// `X-Tenant-ID` header value.
    pub header_tenant: Option<i64>,
    /// Request host, possibly with a port suffix.
    pub host: Option<String>,
}

/// Resolve the active tenant for a request.
///
/// When an explicit id is present (override or header) only the id lookup is
/// consulted; a miss does not fall through to domain resolution.
pub fn resolve_tenant(store: &Store, identity: &RequestIdentity) -> Result<Option<Tenant>> {
    if let Some(id) = identity.force_tenant.or(identity.header_tenant) {
        return store.get_tenant(id);
    }

    if let Some(host) = identity.host.as_deref() {
        let host = strip_port(host);
        if !host.is_empty() {
            return store.find_tenant_by_domain(host);
        }
    }

    Ok(None)
}

fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host).trim()
}
