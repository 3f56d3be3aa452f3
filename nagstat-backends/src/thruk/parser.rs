//! Thruk status parser.
//!
//! Hosts and services arrive from two endpoints. Services are merged into
//! the host map; a service whose host was not in the hosts view gets a
//! synthesized UP host.

use chrono::{DateTime, Utc};
use nagstat_core::duration::human_duration_since;
use nagstat_core::models::single_line;
use nagstat_core::{Attempt, BackendError, BackendResult, Host, HostMap, Service, Status, StatusType};
use serde::de::DeserializeOwned;

use super::api::{Flags, HostRow, ServiceRow};
use crate::wire::{WireValue, attempt_fields, flag_field, int_field, map_code, timestamp_field};

/// Host state codes.
const HOST_STATES: &[(i64, Status)] = &[
    (0, Status::Up),
    (1, Status::Down),
    (2, Status::Unreachable),
];

/// Service state codes.
const SERVICE_STATES: &[(i64, Status)] = &[
    (0, Status::Ok),
    (1, Status::Warning),
    (2, Status::Critical),
    (3, Status::Unknown),
];

/// What a status endpoint answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// An HTML page: the session is not authenticated.
    Markup,
    /// The empty JSON array literal.
    Empty,
    /// Anything else, expected to be a JSON array.
    Json(&'a str),
}

/// Classifies a raw body without parsing it.
pub fn classify(raw: &str) -> Payload<'_> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('<') {
        Payload::Markup
    } else if trimmed.trim_end() == "[]" {
        Payload::Empty
    } else {
        Payload::Json(raw)
    }
}

/// Returns true if `raw` is the Thruk login form rather than a result page.
pub fn is_login_page(raw: &str) -> bool {
    if classify(raw) != Payload::Markup {
        return false;
    }
    let lower = raw.to_ascii_lowercase();
    lower.contains("thruk login") || lower.contains("name=\"login\"")
}

/// Parses the hosts view.
pub fn parse_hosts(raw: &str, server: &str, now: DateTime<Utc>) -> BackendResult<HostMap> {
    let mut hosts = HostMap::new();
    for row in rows::<HostRow>(raw)? {
        let host = parse_host(&row, server, now, raw)?;
        hosts.insert(host.name.clone(), host);
    }
    Ok(hosts)
}

/// Parses the services view into an existing host map.
pub fn merge_services(
    raw: &str,
    hosts: &mut HostMap,
    server: &str,
    now: DateTime<Utc>,
) -> BackendResult<()> {
    for row in rows::<ServiceRow>(raw)? {
        let service = parse_service(&row, server, now, raw)?;
        hosts
            .entry(row.host_name.clone())
            .or_insert_with(|| Host::synthesized(&row.host_name, server))
            .add_service(service);
    }
    Ok(())
}

/// Parses both views into one host map.
///
/// Nothing is returned unless both parse cleanly.
pub fn parse_status(
    hosts_raw: &str,
    services_raw: &str,
    server: &str,
    now: DateTime<Utc>,
) -> BackendResult<HostMap> {
    let mut hosts = parse_hosts(hosts_raw, server, now)?;
    merge_services(services_raw, &mut hosts, server, now)?;
    Ok(hosts)
}

fn rows<T: DeserializeOwned>(raw: &str) -> BackendResult<Vec<T>> {
    match classify(raw) {
        Payload::Markup => Err(BackendError::SessionExpired),
        Payload::Empty => Ok(Vec::new()),
        Payload::Json(body) => serde_json::from_str(body)
            .map_err(|e| BackendError::malformed(format!("JSON error: {e}"), raw)),
    }
}

fn parse_host(row: &HostRow, server: &str, now: DateTime<Utc>, raw: &str) -> BackendResult<Host> {
    let status = map_code(HOST_STATES, &row.state, "host", raw)?;
    let mut host = Host::new(&row.name, server, status);

    host.status_type = parse_status_type(row.state_type.as_ref(), raw)?;
    host.last_check = optional(row.last_check.as_ref(), |v| timestamp_field(v, "last_check", raw))?
        .flatten();
    host.duration = parse_duration(row.last_state_change.as_ref(), now, raw)?;
    host.attempt = parse_attempt(row.current_attempt.as_ref(), row.max_check_attempts.as_ref(), raw)?;
    host.status_information = single_line(&row.plugin_output);

    let flags = parse_flags(&row.flags, raw)?;
    host.passiveonly = flags.passiveonly;
    host.notifications_disabled = flags.notifications_disabled;
    host.flapping = flags.flapping;
    host.acknowledged = flags.acknowledged;
    host.scheduled_downtime = flags.scheduled_downtime;
    Ok(host)
}

fn parse_service(
    row: &ServiceRow,
    server: &str,
    now: DateTime<Utc>,
    raw: &str,
) -> BackendResult<Service> {
    let status = map_code(SERVICE_STATES, &row.state, "service", raw)?;
    let mut service = Service::new(&row.host_name, &row.description, server, status);

    service.status_type = parse_status_type(row.state_type.as_ref(), raw)?;
    service.last_check =
        optional(row.last_check.as_ref(), |v| timestamp_field(v, "last_check", raw))?.flatten();
    service.duration = parse_duration(row.last_state_change.as_ref(), now, raw)?;
    service.attempt =
        parse_attempt(row.current_attempt.as_ref(), row.max_check_attempts.as_ref(), raw)?;
    service.status_information = single_line(&row.plugin_output);

    let flags = parse_flags(&row.flags, raw)?;
    service.passiveonly = flags.passiveonly;
    service.notifications_disabled = flags.notifications_disabled;
    service.flapping = flags.flapping;
    service.acknowledged = flags.acknowledged;
    service.scheduled_downtime = flags.scheduled_downtime;
    Ok(service)
}

#[derive(Debug, Default)]
struct ParsedFlags {
    passiveonly: bool,
    notifications_disabled: bool,
    flapping: bool,
    acknowledged: bool,
    scheduled_downtime: bool,
}

// Absent columns leave the flag cleared.
fn parse_flags(flags: &Flags, raw: &str) -> BackendResult<ParsedFlags> {
    let flag = |value: Option<&WireValue>, field: &str| -> BackendResult<Option<bool>> {
        optional(value, |v| flag_field(v, field, raw))
    };
    Ok(ParsedFlags {
        passiveonly: flag(flags.active_checks_enabled.as_ref(), "active_checks_enabled")?
            .is_some_and(|enabled| !enabled),
        notifications_disabled: flag(flags.notifications_enabled.as_ref(), "notifications_enabled")?
            .is_some_and(|enabled| !enabled),
        flapping: flag(flags.is_flapping.as_ref(), "is_flapping")?.unwrap_or(false),
        acknowledged: flag(flags.acknowledged.as_ref(), "acknowledged")?.unwrap_or(false),
        scheduled_downtime: flag(
            flags.scheduled_downtime_depth.as_ref(),
            "scheduled_downtime_depth",
        )?
        .unwrap_or(false),
    })
}

fn parse_status_type(value: Option<&WireValue>, raw: &str) -> BackendResult<Option<StatusType>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let code = int_field(value, "state_type", raw)?;
    StatusType::from_code(code)
        .map(Some)
        .ok_or_else(|| BackendError::malformed(format!("unmapped state type code {code}"), raw))
}

fn parse_duration(value: Option<&WireValue>, now: DateTime<Utc>, raw: &str) -> BackendResult<String> {
    match optional(value, |v| int_field(v, "last_state_change", raw))? {
        Some(0) | None => Ok(String::new()),
        Some(changed) => Ok(human_duration_since(changed, now)),
    }
}

fn parse_attempt(
    current: Option<&WireValue>,
    max: Option<&WireValue>,
    raw: &str,
) -> BackendResult<Option<Attempt>> {
    match (current, max) {
        (Some(current), Some(max)) => attempt_fields(current, max, raw).map(Some),
        _ => Ok(None),
    }
}

fn optional<T>(
    value: Option<&WireValue>,
    parse: impl FnOnce(&WireValue) -> BackendResult<T>,
) -> BackendResult<Option<T>> {
    value.map(parse).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_600, 0).unwrap()
    }

    const HOSTS: &str = r#"[
        {"name":"db01","state":1,"last_check":"1700000000","last_state_change":"1700000000",
         "plugin_output":"CRITICAL - Host Unreachable\n","current_attempt":"3","max_check_attempts":"3",
         "active_checks_enabled":"1","notifications_enabled":"0","is_flapping":"0",
         "acknowledged":"1","scheduled_downtime_depth":"0","state_type":1}
    ]"#;

    const SERVICES: &str = r#"[
        {"host_name":"db01","description":"mysql","state":2,"last_check":1700000000,
         "last_state_change":1700000540,"plugin_output":"connection refused",
         "current_attempt":"1","max_check_attempts":"4","active_checks_enabled":"0",
         "is_flapping":"1","notifications_enabled":"1","acknowledged":"0","state_type":0,
         "scheduled_downtime_depth":"1"},
        {"host_name":"web02","description":"http","state":"1","last_check":"0",
         "last_state_change":"0","plugin_output":"slow","current_attempt":"1",
         "max_check_attempts":"3","active_checks_enabled":"1","is_flapping":"0",
         "notifications_enabled":"1","acknowledged":"0","state_type":"1",
         "scheduled_downtime_depth":"0"}
    ]"#;

    #[test]
    fn test_classify() {
        assert_eq!(classify("[]"), Payload::Empty);
        assert_eq!(classify("[]\n"), Payload::Empty);
        assert_eq!(classify("<!DOCTYPE html>"), Payload::Markup);
        assert_eq!(classify("  <html>"), Payload::Markup);
        assert_eq!(classify("[{}]"), Payload::Json("[{}]"));
    }

    #[test]
    fn test_login_page_detection() {
        assert!(is_login_page("<html><title>Thruk Login</title></html>"));
        assert!(is_login_page(r#"<form action="login.cgi"><input name="login"></form>"#));
        assert!(!is_login_page("<html>Your command request was successfully submitted</html>"));
        assert!(!is_login_page("[]"));
    }

    #[test]
    fn test_empty_array_is_empty_map() {
        let hosts = parse_hosts("[]", "thruk", now()).unwrap();
        assert!(hosts.is_empty());
    }

    #[test]
    fn test_markup_is_session_expired() {
        let err = parse_hosts("<html><body>login</body></html>", "thruk", now()).unwrap_err();
        assert_eq!(err, BackendError::SessionExpired);

        let mut hosts = HostMap::new();
        let err = merge_services("<html>", &mut hosts, "thruk", now()).unwrap_err();
        assert_eq!(err, BackendError::SessionExpired);
    }

    #[test]
    fn test_parses_host_rows() {
        let hosts = parse_hosts(HOSTS, "thruk", now()).unwrap();
        let db = &hosts["db01"];
        assert_eq!(db.status, Status::Down);
        assert_eq!(db.status_type, Some(StatusType::Hard));
        assert_eq!(db.attempt.map(|a| a.to_string()).as_deref(), Some("3/3"));
        assert_eq!(db.status_information, "CRITICAL - Host Unreachable");
        assert_eq!(db.duration, "10m 0s");
        assert!(db.acknowledged);
        assert!(db.notifications_disabled);
        assert!(!db.passiveonly);
        assert!(!db.flapping);
        assert!(!db.scheduled_downtime);
    }

    #[test]
    fn test_merges_services_and_synthesizes_hosts() {
        let hosts = parse_status(HOSTS, SERVICES, "thruk", now()).unwrap();
        assert_eq!(hosts.len(), 2);

        let mysql = &hosts["db01"].services["mysql"];
        assert_eq!(mysql.status, Status::Critical);
        assert_eq!(mysql.status_type, Some(StatusType::Soft));
        assert_eq!(mysql.duration, "1m 0s");
        assert!(mysql.passiveonly);
        assert!(mysql.flapping);
        assert!(mysql.scheduled_downtime);
        assert!(!mysql.notifications_disabled);

        let web = &hosts["web02"];
        assert_eq!(web.status, Status::Up);
        assert!(!web.acknowledged);
        assert!(!web.flapping);
        assert!(!web.scheduled_downtime);
        assert_eq!(web.services["http"].status, Status::Warning);
        assert_eq!(web.services["http"].last_check, None);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let first = parse_status(HOSTS, SERVICES, "thruk", now()).unwrap();
        let second = parse_status(HOSTS, SERVICES, "thruk", now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unmapped_host_code_is_malformed() {
        let raw = r#"[{"name":"h","state":3}]"#;
        let err = parse_hosts(raw, "thruk", now()).unwrap_err();
        assert!(matches!(err, BackendError::MalformedPayload { .. }));
    }

    #[test]
    fn test_bad_flag_is_malformed() {
        let raw = r#"[{"name":"h","state":0,"acknowledged":"maybe"}]"#;
        assert!(parse_hosts(raw, "thruk", now()).is_err());
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let err = parse_hosts(r#"[{"name":"h","#, "thruk", now()).unwrap_err();
        assert!(matches!(err, BackendError::MalformedPayload { .. }));
    }
}
