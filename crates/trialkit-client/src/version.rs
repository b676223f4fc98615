//! Client/server version compatibility.
//!
//! Both sides exchange semantic versions through HTTP headers: the client
//! sends [`CLIENT_VERSION_HEADER`] with every request and the server may
//! attach [`API_VERSION_HEADER`] to any response. Same major version means
//! compatible; a mismatch produces a directional warning delivered through
//! a [`VersionObserver`] and never blocks or fails the request.

/// Version of this client library, injected into every request.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request header carrying the client's semantic version.
pub const CLIENT_VERSION_HEADER: &str = "x-trialkit-client-version";

/// Response header carrying the server's semantic version.
pub const API_VERSION_HEADER: &str = "x-trialkit-api-version";

/// Parsed semantic version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionTriple {
    /// Same major version means compatible, regardless of minor/patch.
    pub const fn compatible_with(self, other: Self) -> bool {
        self.major == other.major
    }
}

/// Parses `MAJOR.MINOR.PATCH`, tolerating a leading non-digit tag (`v1.2.3`)
/// and ignoring any pre-release or build suffix (`1.2.3-beta+5`). Malformed
/// input parses to `None`.
pub fn parse_version(input: &str) -> Option<VersionTriple> {
    let trimmed = input.trim();
    let untagged = trimmed.trim_start_matches(|ch: char| ch.is_ascii_alphabetic());
    let core = untagged.split(['-', '+']).next()?;

    let mut parts = core.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(VersionTriple {
        major,
        minor,
        patch,
    })
}

/// Whether the two version strings are compatible.
///
/// When either side fails to parse, compatibility defaults to `true`:
/// unparseable metadata must never block a request.
pub fn is_compatible(client_version: &str, server_version: &str) -> bool {
    match (parse_version(client_version), parse_version(server_version)) {
        (Some(client), Some(server)) => client.compatible_with(server),
        _ => true,
    }
}

/// Directional warning for an incompatible pair, `None` when compatible.
pub fn compatibility_warning(client_version: &str, server_version: &str) -> Option<String> {
    let client = parse_version(client_version)?;
    let server = parse_version(server_version)?;
    if client.compatible_with(server) {
        return None;
    }

    if client.major > server.major {
        Some(format!(
            "client version {client_version} is newer than server version {server_version}; \
             consider upgrading the server or downgrading the client"
        ))
    } else {
        Some(format!(
            "client version {client_version} is older than server version {server_version}; \
             consider upgrading the client"
        ))
    }
}

/// Sink for version-compatibility observations.
///
/// The engine reports every response that carried a server version header,
/// compatible or not. Observations never alter the request outcome.
pub trait VersionObserver: Send + Sync {
    fn version_observed(&self, client_version: &str, server_version: &str, warning: Option<&str>);
}

/// Default observer that discards observations.
#[derive(Debug, Default)]
pub struct NoopVersionObserver;

impl VersionObserver for NoopVersionObserver {
    fn version_observed(&self, _: &str, _: &str, _: Option<&str>) {}
}
