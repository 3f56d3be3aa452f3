//! Opsview status parser.

use nagstat_core::duration::human_duration_from_seconds;
use nagstat_core::models::single_line;
use nagstat_core::{
    Attempt, BackendError, BackendResult, Host, HostMap, Service, ServiceExtension, Status,
    StatusType,
};

use super::api::{HostRecord, ServiceRecord, StatusResponse};
use crate::wire::{WireValue, attempt_fields, int_field, map_label, timestamp_field};

/// Host states as Opsview reports them.
///
/// Host rows may carry service-vocabulary states, so both are accepted.
const HOST_STATES: &[(&str, Status)] = &[
    ("up", Status::Up),
    ("down", Status::Down),
    ("unreachable", Status::Unreachable),
    ("pending", Status::Pending),
    ("ok", Status::Ok),
    ("warning", Status::Warning),
    ("critical", Status::Critical),
    ("unknown", Status::Unknown),
];

/// Service states as Opsview reports them.
const SERVICE_STATES: &[(&str, Status)] = &[
    ("ok", Status::Ok),
    ("warning", Status::Warning),
    ("critical", Status::Critical),
    ("unknown", Status::Unknown),
    ("pending", Status::Pending),
];

/// Downtime code meaning "in scheduled downtime".
const IN_DOWNTIME: i64 = 2;

/// Parses a `/rest/status/service` response into a host map.
pub fn parse_status(raw: &str, server: &str) -> BackendResult<HostMap> {
    let response: StatusResponse = serde_json::from_str(raw)
        .map_err(|e| BackendError::malformed(format!("JSON error: {e}"), raw))?;

    let mut hosts = HostMap::new();
    for record in &response.list {
        let host = parse_host(record, server, raw)?;
        hosts.insert(host.name.clone(), host);
    }
    Ok(hosts)
}

fn parse_host(record: &HostRecord, server: &str, raw: &str) -> BackendResult<Host> {
    let status = map_label(HOST_STATES, &record.state, "host", raw)?;
    let mut host = Host::new(&record.name, server, status);

    host.status_type = parse_status_type(record.state_type.as_deref(), raw)?;
    host.last_check = parse_last_check(record.last_check.as_ref(), raw)?;
    host.duration = parse_duration(record.state_duration.as_ref(), raw)?;
    host.attempt = parse_attempt(
        record.current_check_attempt.as_ref(),
        record.max_check_attempts.as_ref(),
        raw,
    )?;
    host.status_information = single_line(&record.output);
    host.scheduled_downtime = in_downtime(record.downtime.as_ref());
    host.acknowledged = record.acknowledged;
    host.flapping = record.flapping;

    for service_record in &record.services {
        let service = parse_service(service_record, &record.name, server, raw)?;
        host.add_service(service);
    }
    Ok(host)
}

fn parse_service(
    record: &ServiceRecord,
    host: &str,
    server: &str,
    raw: &str,
) -> BackendResult<Service> {
    let status = map_label(SERVICE_STATES, &record.state, "service", raw)?;
    let mut service = Service::new(host, &record.name, server, status);

    service.status_type = parse_status_type(record.state_type.as_deref(), raw)?;
    service.last_check = parse_last_check(record.last_check.as_ref(), raw)?;
    service.duration = parse_duration(record.state_duration.as_ref(), raw)?;
    service.attempt = parse_attempt(
        record.current_check_attempt.as_ref(),
        record.max_check_attempts.as_ref(),
        raw,
    )?;
    service.status_information = single_line(&record.output);
    service.scheduled_downtime = in_downtime(record.downtime.as_ref());
    service.acknowledged = record.acknowledged;
    service.flapping = record.flapping;
    service.extension = record
        .service_object_id
        .as_ref()
        .map(|id| ServiceExtension::Opsview {
            service_object_id: id.to_string(),
        });
    Ok(service)
}

fn parse_status_type(label: Option<&str>, raw: &str) -> BackendResult<Option<StatusType>> {
    match label {
        None | Some("") => Ok(None),
        Some(label) => StatusType::from_label(label)
            .map(Some)
            .ok_or_else(|| BackendError::malformed(format!("unmapped state type '{label}'"), raw)),
    }
}

fn parse_last_check(
    value: Option<&WireValue>,
    raw: &str,
) -> BackendResult<Option<chrono::DateTime<chrono::Utc>>> {
    match value {
        Some(value) => timestamp_field(value, "last_check", raw),
        None => Ok(None),
    }
}

fn parse_duration(value: Option<&WireValue>, raw: &str) -> BackendResult<String> {
    match value {
        Some(value) => Ok(human_duration_from_seconds(int_field(value, "state_duration", raw)?)),
        None => Ok(String::new()),
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

// Only the exact code counts; other values are treated as not in downtime.
fn in_downtime(value: Option<&WireValue>) -> bool {
    value.and_then(WireValue::as_i64) == Some(IN_DOWNTIME)
}
