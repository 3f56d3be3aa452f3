//! Opsview command parameters.
//!
//! Every command is a POST with an empty body; parameters travel in the
//! query string.

use chrono::{DateTime, Local};
use nagstat_core::{
    Acknowledgement, BackendError, BackendResult, Capabilities, CheckResult, CommandField,
    Downtime, Target,
};

/// Command fields Opsview accepts.
pub static CAPABILITIES: Capabilities = Capabilities {
    acknowledge: &[CommandField::Comment, CommandField::Sticky, CommandField::Notify],
    downtime: &[CommandField::Comment],
    check_result: &[CommandField::Comment],
};

/// Timestamp format of the downtime endpoint.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Query parameters of one command.
pub type Params = Vec<(&'static str, String)>;

/// Parameters for `/rest/downtime`.
pub fn downtime_params(downtime: &Downtime) -> Params {
    let mut params = vec![
        ("comment", downtime.comment.clone()),
        ("starttime", format_time(downtime.start)),
        ("endtime", format_time(downtime.end)),
    ];
    push_object_keys(&mut params, &downtime.target);
    params
}

/// Parameters for `/rest/status`.
pub fn check_result_params(result: &CheckResult) -> BackendResult<Params> {
    let code = result.state.plugin_code().ok_or_else(|| {
        BackendError::UnsupportedOperation(format!("Cannot submit state {}", result.state))
    })?;
    let mut params = vec![
        ("comment", result.comment.clone().unwrap_or_default()),
        ("new_state", code.to_string()),
    ];
    push_object_keys(&mut params, &result.target);
    Ok(params)
}

/// Parameters for `/rest/acknowledge`.
pub fn acknowledge_params(ack: &Acknowledgement) -> Params {
    let mut params = vec![
        ("notify", python_bool(ack.notify)),
        ("sticky", python_bool(ack.sticky)),
        ("comment", ack.comment.clone()),
        ("host", ack.target.host.clone()),
    ];
    if let Some(service) = ack.target.service_name() {
        params.push(("servicecheck", service.to_string()));
    }
    params
}

/// Parameters for `/rest/recheck`.
pub fn recheck_params(target: &Target) -> Params {
    let mut params = vec![("host", target.host.clone())];
    if let Some(service) = target.service_name() {
        params.push(("servicecheck", service.to_string()));
    }
    params
}

// Downtime and check results address objects by `hst.*` or `svc.*` keys.
fn push_object_keys(params: &mut Params, target: &Target) {
    match target.service_name() {
        Some(service) => {
            params.push(("svc.hostname", target.host.clone()));
            params.push(("svc.servicename", service.to_string()));
        }
        None => params.push(("hst.hostname", target.host.clone())),
    }
}

fn format_time(time: DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn python_bool(value: bool) -> String {
    let label = if value { "True" } else { "False" };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nagstat_core::Status;

    fn keys(params: &Params) -> Vec<&str> {
        params.iter().map(|(k, _)| *k).collect()
    }

    fn value<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    fn ack(target: Target) -> Acknowledgement {
        Acknowledgement {
            target,
            author: "ops".into(),
            comment: "on it".into(),
            sticky: true,
            notify: false,
            persistent: true,
        }
    }

    #[test]
    fn test_acknowledge_host_omits_service_key() {
        let params = acknowledge_params(&ack(Target::host("web01")));
        assert_eq!(keys(&params), vec!["notify", "sticky", "comment", "host"]);
        assert_eq!(value(&params, "sticky"), Some("True"));
        assert_eq!(value(&params, "notify"), Some("False"));
    }

    #[test]
    fn test_acknowledge_service_includes_service_key() {
        let params = acknowledge_params(&ack(Target::service("web01", "http")));
        assert_eq!(value(&params, "servicecheck"), Some("http"));
        assert_eq!(value(&params, "host"), Some("web01"));
    }

    #[test]
    fn test_downtime_keys() {
        let start = Local.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
        let downtime = Downtime {
            target: Target::service("web01", "http"),
            author: "ops".into(),
            comment: "patching".into(),
            fixed: true,
            start,
            end,
            duration: None,
        };

        let params = downtime_params(&downtime);
        assert_eq!(
            keys(&params),
            vec!["comment", "starttime", "endtime", "svc.hostname", "svc.servicename"]
        );
        assert_eq!(value(&params, "starttime"), Some("2024-03-01 08:00:00"));

        let host_params = downtime_params(&Downtime {
            target: Target::host("web01"),
            ..downtime
        });
        assert_eq!(value(&host_params, "hst.hostname"), Some("web01"));
        assert_eq!(value(&host_params, "svc.servicename"), None);
    }

    #[test]
    fn test_check_result_state_codes() {
        let result = CheckResult {
            target: Target::service("web01", "http"),
            state: Status::Critical,
            comment: Some("manual".into()),
            check_output: None,
            performance_data: None,
        };
        let params = check_result_params(&result).unwrap();
        assert_eq!(
            keys(&params),
            vec!["comment", "new_state", "svc.hostname", "svc.servicename"]
        );
        assert_eq!(value(&params, "new_state"), Some("2"));
    }

    #[test]
    fn test_recheck() {
        assert_eq!(keys(&recheck_params(&Target::host("web01"))), vec!["host"]);
        let params = recheck_params(&Target::service("web01", "http"));
        assert_eq!(keys(&params), vec!["host", "servicecheck"]);
    }
}
