use std::sync::Arc;

use crate::domain::health::models::HealthReport;
use crate::domain::health::models::HealthStatus;
use crate::domain::health::models::IndicatorReport;
use crate::domain::health::ports::HealthIndicator;

/// Runs every registered probe and aggregates the results.
#[derive(Default)]
pub struct HealthCheckService {
    indicators: Vec<Arc<dyn HealthIndicator>>,
}

impl HealthCheckService {
    pub fn new(indicators: Vec<Arc<dyn HealthIndicator>>) -> Self {
        Self { indicators }
    }

    pub async fn check(&self) -> HealthReport {
        let mut indicators = Vec::with_capacity(self.indicators.len());

        for indicator in &self.indicators {
            let report = match indicator.check().await {
                Ok(()) => IndicatorReport {
                    name: indicator.name().to_string(),
                    status: HealthStatus::Up,
                    is_up: true,
                    message: None,
                },
                Err(reason) => {
                    tracing::error!(indicator = indicator.name(), reason = %reason, "Health probe failed");
                    IndicatorReport {
                        name: indicator.name().to_string(),
                        status: HealthStatus::Down,
                        is_up: false,
                        message: Some(reason),
                    }
                }
            };
            indicators.push(report);
        }

        HealthReport {
            is_healthy: indicators.iter().all(|i| i.is_up),
            indicators,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct StaticIndicator {
        name: &'static str,
        outcome: Result<(), String>,
    }

    #[async_trait]
    impl HealthIndicator for StaticIndicator {
        fn name(&self) -> &str {
            self.name
        }

        async fn check(&self) -> Result<(), String> {
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn test_all_up_is_healthy() {
        let service = HealthCheckService::new(vec![Arc::new(StaticIndicator {
            name: "postgres",
            outcome: Ok(()),
        })]);

        let report = service.check().await;
        assert!(report.is_healthy);
        assert_eq!(report.indicators.len(), 1);
        assert_eq!(report.indicators[0].status, HealthStatus::Up);
        assert_eq!(report.indicators[0].message, None);
    }

    #[tokio::test]
    async fn test_any_down_is_unhealthy() {
        let service = HealthCheckService::new(vec![
            Arc::new(StaticIndicator {
                name: "postgres",
                outcome: Ok(()),
            }),
            Arc::new(StaticIndicator {
                name: "smtp",
                outcome: Err("connection refused".to_string()),
            }),
        ]);

        let report = service.check().await;
        assert!(!report.is_healthy);
        assert_eq!(report.indicators[1].status, HealthStatus::Down);
        assert_eq!(
            report.indicators[1].message.as_deref(),
            Some("connection refused")
        );
    }

    #[tokio::test]
    async fn test_no_indicators_is_healthy() {
        let report = HealthCheckService::default().check().await;
        assert!(report.is_healthy);
        assert!(report.indicators.is_empty());
    }
}
