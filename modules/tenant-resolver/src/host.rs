//! Tenancy name extraction from a `Host` header value.

use std::net::IpAddr;

use crate::config::TenantResolverConfig;

/// Derives the tenancy name from `host`.
///
/// - A host containing a loopback marker resolves to the host tenant.
/// - Otherwise the tenancy name is every label before the registrable domain
///   and TLD: `a.b.example.com` gives `a.b`.
/// - Fewer than three labels, or an IP literal, gives `None`.
///
/// The port, a trailing dot and letter case are ignored.
#[must_use]
pub fn resolve_tenancy_name(host: &str, config: &TenantResolverConfig) -> Option<String> {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }
    if config
        .loopback_markers
        .iter()
        .any(|marker| !marker.is_empty() && host.contains(&marker.to_ascii_lowercase()))
    {
        return Some(config.host_tenancy_name.clone());
    }

    let name = strip_port(&host).trim_end_matches('.');
    if name.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 3 || labels.iter().any(|label| label.is_empty()) {
        return None;
    }
    Some(labels[..labels.len() - 2].join("."))
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if !name.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn resolve(host: &str) -> Option<String> {
        resolve_tenancy_name(host, &TenantResolverConfig::default())
    }

    #[test]
    fn subdomain_is_the_tenancy_name() {
        assert_eq!(resolve("tenant1.example.com").as_deref(), Some("tenant1"));
        assert_eq!(resolve("tenant1.example.com:8443").as_deref(), Some("tenant1"));
        assert_eq!(resolve("Tenant1.Example.COM").as_deref(), Some("tenant1"));
        assert_eq!(resolve("eu.acme.example.com").as_deref(), Some("eu.acme"));
    }

    #[test]
    fn loopback_resolves_to_host() {
        assert_eq!(resolve("localhost:5000").as_deref(), Some("host"));
        assert_eq!(resolve("127.0.0.1").as_deref(), Some("host"));
        assert_eq!(resolve("api.localhost").as_deref(), Some("host"));
    }

    #[test]
    fn short_or_odd_hosts_resolve_to_nothing() {
        assert_eq!(resolve("example.com"), None);
        assert_eq!(resolve("example.com:80"), None);
        assert_eq!(resolve("intranet"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("10.1.2.3"), None);
        assert_eq!(resolve("a..example.com"), None);
    }

    #[test]
    fn markers_come_from_config() {
        let config = TenantResolverConfig {
            loopback_markers: vec!["dev.internal".to_owned()],
            host_tenancy_name: "admin".to_owned(),
        };
        assert_eq!(
            resolve_tenancy_name("app.dev.internal", &config).as_deref(),
            Some("admin")
        );
        assert_eq!(
            resolve_tenancy_name("localhost.example.com", &config).as_deref(),
            Some("localhost")
        );
    }
}
