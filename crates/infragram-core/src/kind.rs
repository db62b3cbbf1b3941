//! Component kinds.
//!
//! A [`Kind`] is the abstract category of a Component and the key used to
//! look up its rendering attributes in the
//! [`StyleRegistry`](crate::registry::StyleRegistry). Kind strings are mapped
//! to a closed set of variants when the Schema is built; anything unrecognised
//! is kept verbatim in [`Kind::Other`].

use std::{convert::Infallible, fmt, str::FromStr};

use serde::Deserialize;

/// Abstract category of a Component.
///
/// # Examples
///
/// ```
/// use infragram_core::kind::Kind;
///
/// assert_eq!("postgres".parse::<Kind>().unwrap(), Kind::Database);
/// assert_eq!("LB".parse::<Kind>().unwrap(), Kind::LoadBalancer);
/// assert_eq!(
///     "quantum-link".parse::<Kind>().unwrap(),
///     Kind::Other("quantum-link".to_string())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Kind {
    Server,
    Database,
    Queue,
    Cache,
    Storage,
    LoadBalancer,
    Gateway,
    Function,
    Cdn,
    Dns,
    User,
    Client,
    Firewall,
    Monitoring,
    Service,
    Network,
    /// A kind with no built-in variant; the original string is retained.
    Other(String),
}

impl Kind {
    /// All built-in variants, in declaration order.
    pub const BUILTIN: [Kind; 16] = [
        Kind::Server,
        Kind::Database,
        Kind::Queue,
        Kind::Cache,
        Kind::Storage,
        Kind::LoadBalancer,
        Kind::Gateway,
        Kind::Function,
        Kind::Cdn,
        Kind::Dns,
        Kind::User,
        Kind::Client,
        Kind::Firewall,
        Kind::Monitoring,
        Kind::Service,
        Kind::Network,
    ];

    /// Canonical lowercase name of the kind.
    pub fn name(&self) -> &str {
        match self {
            Self::Server => "server",
            Self::Database => "database",
            Self::Queue => "queue",
            Self::Cache => "cache",
            Self::Storage => "storage",
            Self::LoadBalancer => "load_balancer",
            Self::Gateway => "gateway",
            Self::Function => "function",
            Self::Cdn => "cdn",
            Self::Dns => "dns",
            Self::User => "user",
            Self::Client => "client",
            Self::Firewall => "firewall",
            Self::Monitoring => "monitoring",
            Self::Service => "service",
            Self::Network => "network",
            Self::Other(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl FromStr for Kind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Ok(match normalized.as_str() {
            "server" | "vm" | "instance" | "compute" | "ec2" => Self::Server,
            "database" | "db" | "rds" | "postgres" | "mysql" | "sql" => Self::Database,
            "queue" | "mq" | "sqs" | "broker" => Self::Queue,
            "cache" | "redis" | "memcached" | "elasticache" => Self::Cache,
            "storage" | "bucket" | "s3" | "blob" | "object_storage" => Self::Storage,
            "load_balancer" | "loadbalancer" | "lb" | "alb" | "elb" => Self::LoadBalancer,
            "gateway" | "api_gateway" | "apigateway" => Self::Gateway,
            "function" | "lambda" | "serverless" => Self::Function,
            "cdn" | "cloudfront" => Self::Cdn,
            "dns" | "route53" => Self::Dns,
            "user" | "users" | "actor" => Self::User,
            "client" | "browser" | "mobile" => Self::Client,
            "firewall" | "waf" => Self::Firewall,
            "monitoring" | "metrics" | "cloudwatch" => Self::Monitoring,
            "service" | "microservice" | "app" => Self::Service,
            "network" | "vpc" | "subnet" => Self::Network,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl From<String> for Kind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Kind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names_round_trip() {
        for kind in Kind::BUILTIN {
            assert_eq!(kind.name().parse::<Kind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_aliases_case_insensitive() {
        assert_eq!(Kind::from("Redis"), Kind::Cache);
        assert_eq!(Kind::from("API-Gateway"), Kind::Gateway);
        assert_eq!(Kind::from("load balancer"), Kind::LoadBalancer);
    }

    #[test]
    fn test_unknown_kind_keeps_original_string() {
        let kind = Kind::from("Mainframe");
        assert_eq!(kind, Kind::Other("Mainframe".to_string()));
        assert_eq!(kind.to_string(), "Mainframe");
        assert!(!kind.is_builtin());
    }
}
