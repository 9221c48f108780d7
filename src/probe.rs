use std::fmt;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyGrade {
    Low,
    Moderate,
    High,
}

impl LatencyGrade {
    pub fn from_millis(latency_ms: f64) -> Self {
        if latency_ms < 100.0 {
            LatencyGrade::Low
        } else if latency_ms < 200.0 {
            LatencyGrade::Moderate
        } else {
            LatencyGrade::High
        }
    }
}

impl fmt::Display for LatencyGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LatencyGrade::Low => "low",
            LatencyGrade::Moderate => "moderate",
            LatencyGrade::High => "high",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Reachable { latency_ms: f64 },
    Unreachable { latency_ms: f64, reason: String },
    Invalid { reason: String },
}

/// Bounded TCP connect used to decide whether launching a session is worth it.
///
/// The socket is dropped as soon as the connect resolves; the session itself
/// is a separate ssh/mosh process.
pub async fn probe(hostname: &str, port: &str, timeout: Duration) -> ProbeOutcome {
    let port = match port.trim().parse::<u16>() {
        Ok(0) | Err(_) => {
            return ProbeOutcome::Invalid {
                reason: format!("invalid port '{}'", port),
            }
        }
        Ok(port) => port,
    };
    if hostname.trim().is_empty() {
        return ProbeOutcome::Invalid {
            reason: "empty hostname".to_string(),
        };
    }

    tracing::debug!("Probing {}:{} (timeout {:?})", hostname, port, timeout);
    let started = Instant::now();
    let result = tokio::time::timeout(timeout, connect(hostname, port)).await;
    let latency_ms = round_millis(started.elapsed());

    let outcome = match result {
        Ok(Ok(stream)) => {
            drop(stream);
            ProbeOutcome::Reachable { latency_ms }
        }
        Ok(Err(ConnectError::Resolve(e))) => ProbeOutcome::Invalid {
            reason: format!("cannot resolve {}: {}", hostname, e),
        },
        Ok(Err(ConnectError::Connect(e))) => ProbeOutcome::Unreachable {
            latency_ms,
            reason: e.to_string(),
        },
        Err(_) => ProbeOutcome::Unreachable {
            latency_ms,
            reason: format!("timed out after {}s", timeout.as_secs()),
        },
    };

    tracing::info!("Probe {}:{} -> {:?}", hostname, port, outcome);
    outcome
}

enum ConnectError {
    Resolve(std::io::Error),
    Connect(std::io::Error),
}

async fn connect(hostname: &str, port: u16) -> Result<TcpStream, ConnectError> {
    let addrs: Vec<_> = tokio::net::lookup_host((hostname, port))
        .await
        .map_err(ConnectError::Resolve)?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(match last_err {
        Some(e) => ConnectError::Connect(e),
        None => ConnectError::Resolve(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no addresses found",
        )),
    })
}

fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}
