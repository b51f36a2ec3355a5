use std::time::Duration;

use rand::Rng;

/// Simulated network latency of a mock source.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedLatency {
    pub min: Duration,
    pub max: Duration,
    /// Multiplier applied to every draw; 0 disables the delay.
    pub scale: f64,
}

impl SimulatedLatency {
    /// 300-1000 ms, as seen from the LMS REST API.
    pub fn rest(scale: f64) -> Self {
        Self::new(300, 1_000, scale)
    }

    /// 400-1200 ms, as seen from the LMS GraphQL endpoint.
    pub fn graphql(scale: f64) -> Self {
        Self::new(400, 1_200, scale)
    }

    /// 500-1500 ms, as seen for LMS GraphQL mutations.
    pub fn mutation(scale: f64) -> Self {
        Self::new(500, 1_500, scale)
    }

    pub fn none() -> Self {
        Self::new(0, 0, 0.0)
    }

    fn new(min_ms: u64, max_ms: u64, scale: f64) -> Self {
        Self {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
            scale: if scale.is_finite() { scale.max(0.0) } else { 0.0 },
        }
    }

    /// Draw one delay.
    pub fn sample(&self) -> Duration {
        if self.scale == 0.0 || self.max.is_zero() {
            return Duration::ZERO;
        }
        let min = self.min.as_secs_f64();
        let max = self.max.as_secs_f64().max(min);
        let secs = rand::rng().random_range(min..=max);
        Duration::from_secs_f64(secs * self.scale)
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_within_bounds() {
        let latency = SimulatedLatency::rest(1.0);
        for _ in 0..100 {
            let d = latency.sample();
            assert!(d >= Duration::from_millis(299));
            assert!(d <= Duration::from_millis(1_001));
        }
    }

    #[test]
    fn test_scale_applies() {
        let latency = SimulatedLatency::graphql(0.5);
        for _ in 0..100 {
            let d = latency.sample();
            assert!(d >= Duration::from_millis(199));
            assert!(d <= Duration::from_millis(601));
        }
    }

    #[test]
    fn test_zero_scale_disables() {
        assert_eq!(SimulatedLatency::rest(0.0).sample(), Duration::ZERO);
        assert_eq!(SimulatedLatency::none().sample(), Duration::ZERO);
        assert_eq!(SimulatedLatency::rest(f64::NAN).sample(), Duration::ZERO);
    }
}
