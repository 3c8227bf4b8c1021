//! Listening socket discovery by shelling out to `ss -tulpn`.

use super::{ListeningSocket, PortMap, SocketResolver};
use crate::config::SocketsConfig;
use std::process::Command;
use tracing::debug;

/// Runs the configured socket listing command once per `resolve`.
pub struct SsSocketResolver {
    command: String,
    args: Vec<String>,
}

impl SsSocketResolver {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &SocketsConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

impl SocketResolver for SsSocketResolver {
    fn resolve(&self) -> PortMap {
        let output = match Command::new(&self.command).args(&self.args).output() {
            Ok(o) => o,
            Err(e) => {
                debug!(command = %self.command, error = %e, "socket listing unavailable");
                return PortMap::new();
            }
        };
        if !output.status.success() {
            debug!(command = %self.command, status = ?output.status.code(), "socket listing failed");
            return PortMap::new();
        }
        parse_listening(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `ss -tulpn` output into a port -> pid map. Rows without a parseable
/// local port or a `pid=` annotation are skipped. Later rows win on a port.
pub fn parse_listening(output: &str) -> PortMap {
    output
        .lines()
        .filter_map(parse_line)
        .map(|s| (s.port, s.owner_pid))
        .collect()
}

fn parse_line(line: &str) -> Option<ListeningSocket> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let state = *parts.get(1)?;
    if state != "LISTEN" && state != "UNCONN" {
        return None;
    }
    let local = parts.get(4)?;
    let port = local.rsplit(':').next()?.parse::<u16>().ok()?;
    // users:(("nginx",pid=1234,fd=6),...)
    let owner_pid = line
        .split("pid=")
        .nth(1)?
        .split(|c: char| !c.is_ascii_digit())
        .next()?
        .parse::<u32>()
        .ok()?;
    Some(ListeningSocket { port, owner_pid })
}
