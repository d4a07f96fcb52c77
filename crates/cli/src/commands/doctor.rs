use bindery_core::config::{AppConfig, LoadOptions};
use bindery_gateway::{CarrierGateway, FireLightClient, SimulatedGateway};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_feature_flags(&config));
            checks.push(check_gateway_health(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "feature_flags",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "gateway_health",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_feature_flags(config: &AppConfig) -> DoctorCheck {
    DoctorCheck {
        name: "feature_flags",
        status: CheckStatus::Pass,
        details: format!(
            "esignature={} acord={} dtcc={} suitability_checks={}",
            config.features.esignature,
            config.features.acord,
            config.features.dtcc,
            config.features.suitability_checks
        ),
    }
}

fn check_gateway_health(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "gateway_health",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let health = if config.gateway.enabled {
        let client = FireLightClient::from_config(&config.gateway);
        runtime.block_on(client.health_check())
    } else {
        runtime.block_on(SimulatedGateway::new().health_check())
    };

    match health {
        Ok(health) if health.healthy => DoctorCheck {
            name: "gateway_health",
            status: CheckStatus::Pass,
            details: format!(
                "{} gateway healthy (version {})",
                health.environment,
                health.version.as_deref().unwrap_or("unknown")
            ),
        },
        Ok(health) => DoctorCheck {
            name: "gateway_health",
            status: CheckStatus::Fail,
            details: health
                .message
                .unwrap_or_else(|| format!("{} gateway reported unhealthy", health.environment)),
        },
        Err(error) => DoctorCheck {
            name: "gateway_health",
            status: CheckStatus::Fail,
            details: format!("health check failed: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
