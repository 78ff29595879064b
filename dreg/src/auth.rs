//! Decides whether stored credentials accompany registry requests.
//!
//! Every failure here (unparsable URL, failed name resolution, no stored
//! entry) is deliberately lossy: the result is "no credential" and requests
//! go out anonymously. Only a registry that then rejects them produces an
//! error the user sees.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};

use ociclient::ClientOption;
use tracing::debug;
use url::{Host, Url};

use crate::docker_config::DockerConfig;

/// Name resolution used to vet plaintext registry hosts.
pub trait HostResolver {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolves through the operating system, one attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        Ok((host, 0).to_socket_addrs()?.map(|addr| addr.ip()).collect())
    }
}

/// Select the `Authorization` decoration for requests to `target_url`.
pub fn select_auth_option(store: &DockerConfig, target_url: &str) -> Option<ClientOption> {
    select_auth_option_with(store, target_url, &SystemResolver)
}

/// As [`select_auth_option`], resolving names through `resolver`.
///
/// Over plain `http` credentials are only sent when every address the host
/// resolves to is a loopback address.
pub fn select_auth_option_with<R: HostResolver + ?Sized>(
    store: &DockerConfig,
    target_url: &str,
    resolver: &R,
) -> Option<ClientOption> {
    let url = match Url::parse(target_url) {
        Ok(url) => url,
        Err(e) => {
            debug!("Not using credentials, cannot parse {}: {}", target_url, e);
            return None;
        }
    };
    let host = url.host()?;

    if url.scheme() == "http" && !resolves_to_loopback(&host, resolver) {
        debug!("Not sending credentials in the clear to {}", host);
        return None;
    }

    let key = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    match store.token(&key) {
        Some(token) => {
            debug!("Using stored credentials for {}", key);
            Some(ClientOption::header("Authorization", format!("Basic {}", token)))
        }
        None => {
            debug!("No stored credentials for {}", key);
            None
        }
    }
}

fn resolves_to_loopback<R: HostResolver + ?Sized>(host: &Host<&str>, resolver: &R) -> bool {
    let addrs = match host {
        Host::Ipv4(ip) => vec![IpAddr::V4(*ip)],
        Host::Ipv6(ip) => vec![IpAddr::V6(*ip)],
        Host::Domain(name) => match resolver.lookup(name) {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!("Cannot resolve {}: {}", name, e);
                return false;
            }
        },
    };

    // One public address is enough to disqualify the host
    !addrs.is_empty() && addrs.iter().all(IpAddr::is_loopback)
}
