use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use clap::Parser;
use tracing::warn;
use url::Url;

use crate::error::AuditError;
use crate::parsing::parse_duration;
use crate::types::{Config, ConnectionDescriptor, OutputFormat};

/// Point-in-time memory and pod utilization report for every node of a cluster
#[derive(Debug, Parser)]
#[command(name = "kube-capacity-auditor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Connection timeout with SI time suffix (e.g. 2s, 500ms)
    #[arg(long, env = "CONNECT_TIMEOUT", default_value = "2s", value_parser = parse_connect_timeout)]
    pub connect_timeout: Duration,

    /// Report format
    #[arg(long, short, env = "AUDIT_OUTPUT", value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Base64-encoded PEM bundle of the cluster CA
    #[arg(value_name = "BASE64_CA")]
    pub ca: String,

    /// Base64-encoded bearer token
    #[arg(value_name = "BASE64_TOKEN")]
    pub token: String,

    /// API server URLs, tried in order until one answers
    #[arg(value_name = "API_URL", required = true, num_args = 1..)]
    pub endpoints: Vec<String>,
}

fn parse_connect_timeout(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Config> {
        let engine = base64::engine::general_purpose::STANDARD;
        let ca_certificate = engine
            .decode(cli.ca.trim())
            .context("Invalid BASE64_CA")?;
        let token = engine
            .decode(cli.token.trim())
            .context("Invalid BASE64_TOKEN")?;
        let bearer_token = String::from_utf8(token).context("BASE64_TOKEN is not valid UTF-8")?;

        Ok(Config {
            ca_certificate,
            bearer_token: bearer_token.trim().to_string(),
            endpoints: cli.endpoints,
            connect_timeout: cli.connect_timeout,
            output: cli.output,
        })
    }
}

/// Turns every configured URL into a connection descriptor, preserving order.
/// Invalid URLs are logged and dropped.
pub fn build_descriptors(cfg: &Config) -> Result<Vec<ConnectionDescriptor>, AuditError> {
    let descriptors: Vec<ConnectionDescriptor> = cfg
        .endpoints
        .iter()
        .filter_map(|endpoint| match parse_descriptor(endpoint, cfg) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
        .collect();

    if descriptors.is_empty() {
        return Err(AuditError::NoEndpoints);
    }
    Ok(descriptors)
}

pub fn parse_descriptor(endpoint: &str, cfg: &Config) -> Result<ConnectionDescriptor, AuditError> {
    let invalid = |reason: String| AuditError::Configuration {
        endpoint: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    let host = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_string()))?;
    let host = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    Ok(ConnectionDescriptor {
        scheme: url.scheme().to_string(),
        host,
        api_path: url.path().trim_end_matches('/').to_string(),
        bearer_token: cfg.bearer_token.clone(),
        ca_certificate: cfg.ca_certificate.clone(),
        connect_timeout: cfg.connect_timeout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(endpoints: &[&str]) -> Config {
        Config {
            ca_certificate: b"ca".to_vec(),
            bearer_token: "token".to_string(),
            endpoints: endpoints.iter().map(|s| s.to_string()).collect(),
            connect_timeout: Duration::from_secs(2),
            output: OutputFormat::Text,
        }
    }

    #[test]
    fn test_cli_parsing_with_defaults() {
        let cli = Cli::try_parse_from([
            "kube-capacity-auditor",
            "Y2E=",
            "dG9rZW4K",
            "https://a.example:6443",
            "https://b.example:6443",
        ])
        .unwrap();
        assert_eq!(cli.connect_timeout, Duration::from_secs(2));
        assert_eq!(cli.output, OutputFormat::Text);

        let cfg = Config::from_cli(cli).unwrap();
        assert_eq!(cfg.ca_certificate, b"ca");
        // trailing newline from `echo token | base64` is dropped
        assert_eq!(cfg.bearer_token, "token");
        assert_eq!(cfg.endpoints, vec!["https://a.example:6443", "https://b.example:6443"]);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "kube-capacity-auditor",
            "--connect-timeout",
            "500ms",
            "--output",
            "json",
            "Y2E=",
            "dG9rZW4=",
            "https://a.example",
        ])
        .unwrap();
        assert_eq!(cli.connect_timeout, Duration::from_millis(500));
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_cli_requires_an_endpoint() {
        let err = Cli::try_parse_from(["kube-capacity-auditor", "Y2E=", "dG9rZW4="]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = Cli::try_parse_from(["kube-capacity-auditor", "--connect-timeout", "soon", "a", "b", "c"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let cli = Cli::try_parse_from(["kube-capacity-auditor", "not base64!", "dG9rZW4=", "https://a"]).unwrap();
        let result = Config::from_cli(cli);
        assert!(result.unwrap_err().to_string().contains("BASE64_CA"));
    }

    #[test]
    fn test_parse_descriptor() {
        let cfg = config_with(&[]);
        let d = parse_descriptor("https://10.0.0.1:6443/k8s/clusters/c-1/", &cfg).unwrap();
        assert_eq!(d.scheme, "https");
        assert_eq!(d.host, "10.0.0.1:6443");
        assert_eq!(d.api_path, "/k8s/clusters/c-1");
        assert_eq!(d.bearer_token, "token");
        assert_eq!(d.connect_timeout, Duration::from_secs(2));

        let d = parse_descriptor("https://api.example.com", &cfg).unwrap();
        assert_eq!(d.host, "api.example.com");
        assert_eq!(d.api_path, "");
    }

    #[test]
    fn test_parse_descriptor_errors() {
        let cfg = config_with(&[]);
        for bad in ["not a url", "ftp://example.com", "https://"] {
            let err = parse_descriptor(bad, &cfg).unwrap_err();
            assert!(matches!(err, AuditError::Configuration { .. }), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_build_descriptors_skips_invalid_and_keeps_order() {
        let cfg = config_with(&["https://b.example", "::bad::", "https://a.example"]);
        let hosts: Vec<String> = build_descriptors(&cfg).unwrap().into_iter().map(|d| d.host).collect();
        assert_eq!(hosts, vec!["b.example", "a.example"]);
    }

    #[test]
    fn test_build_descriptors_without_valid_endpoint() {
        let cfg = config_with(&["::bad::"]);
        assert!(matches!(build_descriptors(&cfg), Err(AuditError::NoEndpoints)));
    }
}
