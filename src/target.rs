// ABOUTME: Remote target addresses for the command line.
// ABOUTME: Parses formats like "host", "user@host", "host:port", "user@[::1]:port".

use crate::ssh::SessionBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
}

impl Target {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("target cannot be empty".to_string());
        }

        // Parse format: [user@]host[:port]
        let (user, rest) = match s.rfind('@') {
            Some(at_pos) => (Some(&s[..at_pos]), &s[at_pos + 1..]),
            None => (None, s),
        };

        let (host, port_str) = if let Some(bracketed) = rest.strip_prefix('[') {
            let close = bracketed
                .find(']')
                .ok_or_else(|| format!("unterminated IPv6 address: {rest}"))?;
            let after = &bracketed[close + 1..];
            let port_str = match after.strip_prefix(':') {
                Some(port) => Some(port),
                None if after.is_empty() => None,
                None => return Err(format!("unexpected characters after address: {after}")),
            };
            (&bracketed[..close], port_str)
        } else if rest.matches(':').count() == 1 {
            let colon_pos = rest.rfind(':').unwrap_or(rest.len());
            (&rest[..colon_pos], Some(&rest[colon_pos + 1..]))
        } else {
            // Bare IPv6 addresses carry several colons and no port.
            (rest, None)
        };

        let port = port_str
            .map(|p| p.parse::<u16>().map_err(|_| format!("invalid port: {p}")))
            .transpose()?;

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }
        if user.is_some_and(str::is_empty) {
            return Err("username cannot be empty".to_string());
        }

        Ok(Target {
            host: host.to_string(),
            port,
            user: user.map(str::to_string),
        })
    }

    /// Copy host and whatever else the target named onto `builder`.
    pub fn apply(&self, builder: SessionBuilder) -> SessionBuilder {
        let mut builder = builder.host(&self.host);
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(user) = &self.user {
            builder = builder.user(user);
        }
        builder
    }
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
