use concierge_agent::shopping::CLIENT_VERSION;
use concierge_core::config::{AppConfig, LoadOptions};
use concierge_gateway::GatewayClient;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::async_runtime;

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
            checks.push(check_search_api_key(&config));
            checks.push(check_gateway_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("search_api_key"));
            checks.push(skipped("gateway_reachability"));
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

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn check_search_api_key(config: &AppConfig) -> DoctorCheck {
    let present = config
        .search
        .api_key
        .as_ref()
        .is_some_and(|key| !key.expose_secret().trim().is_empty());
    DoctorCheck {
        name: "search_api_key",
        status: if present { CheckStatus::Pass } else { CheckStatus::Fail },
        details: if present {
            "search provider API key is set".to_string()
        } else {
            "set CONCIERGE_SEARCH_API_KEY (or SERPAPI_API_KEY) to enable product search".to_string()
        },
    }
}

fn check_gateway_reachability(config: &AppConfig) -> DoctorCheck {
    let client = match GatewayClient::from_config(&config.gateway) {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "gateway_reachability",
                status: CheckStatus::Skipped,
                details: error.to_string(),
            };
        }
    };

    let runtime = match async_runtime("doctor") {
        Ok(runtime) => runtime,
        Err(_) => {
            return DoctorCheck {
                name: "gateway_reachability",
                status: CheckStatus::Fail,
                details: "failed to initialize async runtime".to_string(),
            };
        }
    };

    match runtime.block_on(client.initialize(&config.gateway.client_name, CLIENT_VERSION)) {
        Ok(info) => {
            let server = info
                .server_info
                .map(|server| format!("{} {}", server.name, server.version))
                .unwrap_or_else(|| "unnamed server".to_string());
            DoctorCheck {
                name: "gateway_reachability",
                status: CheckStatus::Pass,
                details: format!("initialized against `{}` ({server})", client.url()),
            }
        }
        Err(error) => DoctorCheck {
            name: "gateway_reachability",
            status: CheckStatus::Fail,
            details: format!("{} ({})", error, error.error_code()),
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
