use crate::errors::{BackupToolError, Result};
use crate::shared::constants::{DEFAULT_MYSQL_PORT, DEFAULT_MYSQL_USER};
use percent_encoding::percent_decode_str;
use std::fmt;
use url::{Host, Url};

/// Database the backup is restored into
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionTarget {
    /// Parse `scheme://[user[:password]@]host[:port]/database`.
    ///
    /// User defaults to `root`, port to `3306`, password to empty. Credentials
    /// are percent-decoded and exactly one leading `/` is removed from the path.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let descriptor = descriptor.trim();
        let url = Url::parse(descriptor)
            .map_err(|e| BackupToolError::MalformedDescriptor(format!("{}: {}", redact(descriptor), e)))?;

        let host = match url.host() {
            Some(Host::Ipv6(addr)) => addr.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            _ => {
                return Err(BackupToolError::MalformedDescriptor(format!(
                    "{}: missing host",
                    redact(descriptor)
                )))
            }
        };

        let user = decode(url.username())?;
        let password = decode(url.password().unwrap_or_default())?;
        let path = url.path();

        Ok(ConnectionTarget {
            host,
            port: url
                .port()
                .map(|p| p.to_string())
                .unwrap_or_else(|| DEFAULT_MYSQL_PORT.to_string()),
            user: if user.is_empty() {
                DEFAULT_MYSQL_USER.to_string()
            } else {
                user
            },
            password,
            database: path.strip_prefix('/').unwrap_or(path).to_string(),
        })
    }
}

fn decode(raw: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| BackupToolError::MalformedDescriptor(format!("invalid percent-encoding: {}", e)))
}

/// Drop anything between `://` and `@` so credentials stay out of messages
fn redact(descriptor: &str) -> String {
    match (descriptor.find("://"), descriptor.rfind('@')) {
        (Some(start), Some(at)) if at > start => {
            format!("{}://***{}", &descriptor[..start], &descriptor[at..])
        }
        _ => descriptor.to_string(),
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}
