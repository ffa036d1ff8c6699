// src/traffic/verifier.rs
use super::distribution::{check_distribution, expected_share, DistributionReport};
use crate::clients::HttpProbe;
use crate::error::Result;
use crate::poll::wait_for_condition;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Sends probe requests through a VIP and checks who answered.
pub struct TrafficVerifier {
    probe: Arc<dyn HttpProbe>,
    connect_timeout: Duration,
    interval: Duration,
}

impl TrafficVerifier {
    pub fn new(probe: Arc<dyn HttpProbe>, connect_timeout: Duration, interval: Duration) -> Self {
        Self {
            probe,
            connect_timeout,
            interval,
        }
    }

    /// `http://<address>/`; `address` may carry a port.
    pub fn target_url(address: &str) -> Result<Url> {
        let host = match address.parse::<std::net::Ipv6Addr>() {
            Ok(v6) => format!("[{}]", v6),
            Err(_) => address.to_string(),
        };
        Ok(Url::parse(&format!("http://{}/", host))?)
    }

    /// Block until a GET against `url` succeeds.
    pub async fn wait_for_connection(&self, url: &Url) -> Result<()> {
        let what = format!("connection to {}", url);
        let probe = self.probe.as_ref();

        wait_for_condition(&what, self.connect_timeout, self.interval, || async move {
            match probe.get_text(url).await {
                Ok(_) => Ok(Some(())),
                Err(e) => {
                    debug!("{} failed: {}", url, e);
                    Ok(None)
                }
            }
        })
        .await?;

        info!("{} is reachable", url);
        Ok(())
    }

    /// Send `sample_count` sequential requests to `address` and require an
    /// exact even split over `expected_labels`.
    pub async fn verify_distribution(
        &self,
        address: &str,
        sample_count: usize,
        expected_labels: &[String],
    ) -> Result<DistributionReport> {
        let distinct: BTreeSet<&String> = expected_labels.iter().collect();
        expected_share(sample_count, distinct.len())?;

        let url = Self::target_url(address)?;
        self.wait_for_connection(&url).await?;

        let mut responses = Vec::with_capacity(sample_count);
        for n in 0..sample_count {
            let body = self.probe.get_text(&url).await?;
            let label = body.trim_end().to_string();
            debug!("Probe {}/{} answered by {:?}", n + 1, sample_count, label);
            responses.push(label);
        }

        let report = check_distribution(&responses, expected_labels)?;
        info!("Traffic through {} split as {:?}", address, report.counts);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScenarioError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fails `refusals` times, then answers from `script` in order.
    struct ScriptedProbe {
        refusals: Mutex<u32>,
        script: Mutex<Vec<&'static str>>,
        hits: Mutex<u32>,
    }

    impl ScriptedProbe {
        fn new(refusals: u32, script: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                refusals: Mutex::new(refusals),
                script: Mutex::new(script),
                hits: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl HttpProbe for ScriptedProbe {
        async fn get_text(&self, _url: &Url) -> Result<String> {
            {
                let mut refusals = self.refusals.lock().unwrap();
                if *refusals > 0 {
                    *refusals -= 1;
                    return Err(ScenarioError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "refused",
                    )));
                }
            }
            *self.hits.lock().unwrap() += 1;
            let mut script = self.script.lock().unwrap();
            let label = if script.is_empty() { "" } else { script.remove(0) };
            Ok(format!("{}\n", label))
        }
    }

    fn labels() -> Vec<String> {
        vec!["server1".to_string(), "server2".to_string()]
    }

    fn alternating(n: usize) -> Vec<&'static str> {
        // One extra answer for the connectivity check.
        ["server1", "server2"].iter().cycle().take(n + 1).copied().collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_robin_passes() {
        let probe = ScriptedProbe::new(3, alternating(10));
        let verifier = TrafficVerifier::new(probe.clone(), Duration::from_secs(60), Duration::from_secs(1));

        let report = verifier
            .verify_distribution("172.24.4.10", 10, &labels())
            .await
            .unwrap();

        assert_eq!(report.counts["server1"], 5);
        assert_eq!(report.counts["server2"], 5);
        // 1 connectivity check + exactly 10 samples
        assert_eq!(*probe.hits.lock().unwrap(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skewed_traffic_fails() {
        let mut script = vec!["server1"];
        script.extend(vec!["server1"; 6]);
        script.extend(vec!["server2"; 4]);
        let probe = ScriptedProbe::new(0, script);
        let verifier = TrafficVerifier::new(probe, Duration::from_secs(60), Duration::from_secs(1));

        let err = verifier
            .verify_distribution("172.24.4.10", 10, &labels())
            .await
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Distribution { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_vip_times_out() {
        let probe = ScriptedProbe::new(u32::MAX, vec![]);
        let verifier = TrafficVerifier::new(probe, Duration::from_secs(5), Duration::from_secs(1));

        let err = verifier
            .verify_distribution("172.24.4.10", 10, &labels())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_uneven_samples_rejected_before_probing() {
        let probe = ScriptedProbe::new(0, alternating(9));
        let verifier = TrafficVerifier::new(probe.clone(), Duration::from_secs(5), Duration::from_secs(1));

        let err = verifier
            .verify_distribution("172.24.4.10", 9, &labels())
            .await
            .unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidDistribution { .. }));
        assert_eq!(*probe.hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_target_url() {
        assert_eq!(TrafficVerifier::target_url("10.0.0.5").unwrap().as_str(), "http://10.0.0.5/");
        assert_eq!(
            TrafficVerifier::target_url("127.0.0.1:8080").unwrap().as_str(),
            "http://127.0.0.1:8080/"
        );
        assert_eq!(TrafficVerifier::target_url("fd00::5").unwrap().as_str(), "http://[fd00::5]/");
    }
}
