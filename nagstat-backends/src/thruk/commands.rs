//! Thruk `cmd.cgi` form builders.
//!
//! Thruk speaks the classic Nagios command CGI: a `cmd_typ` number selects
//! the command and `cmd_mod=2` commits it. Checkbox fields are only sent
//! when set.

use chrono::{DateTime, Local};
use nagstat_core::{
    Acknowledgement, BackendError, BackendResult, Capabilities, CheckResult, CommandField,
    Downtime, Target,
};

/// Command fields Thruk accepts.
pub static CAPABILITIES: Capabilities = Capabilities {
    acknowledge: &[
        CommandField::Author,
        CommandField::Comment,
        CommandField::Sticky,
        CommandField::Notify,
        CommandField::Persistent,
    ],
    downtime: &[
        CommandField::Author,
        CommandField::Comment,
        CommandField::Fixed,
        CommandField::Duration,
    ],
    check_result: &[CommandField::CheckOutput, CommandField::PerformanceData],
};

/// Timestamp format of `cmd.cgi`.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Nagios command numbers, host variant first.
mod cmd_typ {
    pub const ACKNOWLEDGE: (u16, u16) = (33, 34);
    pub const DOWNTIME: (u16, u16) = (55, 56);
    pub const RECHECK: (u16, u16) = (96, 7);
    pub const CHECK_RESULT: (u16, u16) = (87, 30);
}

/// Form fields of one command.
pub type Form = Vec<(&'static str, String)>;

/// Form for acknowledging a problem.
pub fn acknowledge_form(ack: &Acknowledgement) -> Form {
    let mut form = command_form(cmd_typ::ACKNOWLEDGE, &ack.target);
    form.push(("com_author", ack.author.clone()));
    form.push(("com_data", ack.comment.clone()));
    push_checkbox(&mut form, "sticky_ack", ack.sticky);
    push_checkbox(&mut form, "send_notification", ack.notify);
    push_checkbox(&mut form, "persistent", ack.persistent);
    form
}

/// Form for scheduling a downtime.
///
/// A flexible downtime without an explicit duration lasts the whole window.
pub fn downtime_form(downtime: &Downtime) -> Form {
    let length = downtime
        .duration
        .or_else(|| (downtime.end - downtime.start).to_std().ok())
        .unwrap_or_default();
    let minutes_total = length.as_secs() / 60;

    let mut form = command_form(cmd_typ::DOWNTIME, &downtime.target);
    form.push(("com_author", downtime.author.clone()));
    form.push(("com_data", downtime.comment.clone()));
    form.push(("start_time", format_time(downtime.start)));
    form.push(("end_time", format_time(downtime.end)));
    form.push(("fixed", u8::from(downtime.fixed).to_string()));
    form.push(("hours", (minutes_total / 60).to_string()));
    form.push(("minutes", (minutes_total % 60).to_string()));
    form
}

/// Form for forcing a recheck at `now`.
pub fn recheck_form(target: &Target, now: DateTime<Local>) -> Form {
    let mut form = command_form(cmd_typ::RECHECK, target);
    form.push(("start_time", format_time(now)));
    form.push(("force_check", "on".to_string()));
    form
}

/// Form for submitting a passive check result.
pub fn check_result_form(result: &CheckResult) -> BackendResult<Form> {
    let code = result.state.plugin_code().ok_or_else(|| {
        BackendError::UnsupportedOperation(format!("Cannot submit state {}", result.state))
    })?;
    let mut form = command_form(cmd_typ::CHECK_RESULT, &result.target);
    form.push(("plugin_state", code.to_string()));
    form.push(("plugin_output", result.check_output.clone().unwrap_or_default()));
    form.push((
        "performance_data",
        result.performance_data.clone().unwrap_or_default(),
    ));
    Ok(form)
}

fn command_form((host_cmd, service_cmd): (u16, u16), target: &Target) -> Form {
    let cmd = if target.is_service() { service_cmd } else { host_cmd };
    let mut form = vec![
        ("cmd_typ", cmd.to_string()),
        ("cmd_mod", "2".to_string()),
        ("host", target.host.clone()),
    ];
    if let Some(service) = target.service_name() {
        form.push(("service", service.to_string()));
    }
    form
}

fn push_checkbox(form: &mut Form, name: &'static str, checked: bool) {
    if checked {
        form.push((name, "on".to_string()));
    }
}

fn format_time(time: DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nagstat_core::Status;

    fn value<'a>(form: &'a Form, key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    fn keys(form: &Form) -> Vec<&str> {
        form.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_acknowledge_command_numbers() {
        let ack = Acknowledgement {
            target: Target::host("db01"),
            author: "ops".into(),
            comment: "looking".into(),
            sticky: true,
            notify: false,
            persistent: true,
        };
        let form = acknowledge_form(&ack);
        assert_eq!(value(&form, "cmd_typ"), Some("33"));
        assert_eq!(value(&form, "cmd_mod"), Some("2"));
        assert_eq!(value(&form, "service"), None);
        assert_eq!(value(&form, "sticky_ack"), Some("on"));
        assert_eq!(value(&form, "send_notification"), None);
        assert_eq!(value(&form, "persistent"), Some("on"));

        let form = acknowledge_form(&Acknowledgement {
            target: Target::service("db01", "mysql"),
            ..ack
        });
        assert_eq!(value(&form, "cmd_typ"), Some("34"));
        assert_eq!(value(&form, "service"), Some("mysql"));
    }

    #[test]
    fn test_downtime_form() {
        let start = Local.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        let downtime = Downtime {
            target: Target::service("db01", "mysql"),
            author: "ops".into(),
            comment: "upgrade".into(),
            fixed: false,
            start,
            end,
            duration: None,
        };

        let form = downtime_form(&downtime);
        assert_eq!(value(&form, "cmd_typ"), Some("56"));
        assert_eq!(value(&form, "start_time"), Some("2024-03-01 08:00:00"));
        assert_eq!(value(&form, "end_time"), Some("2024-03-01 10:30:00"));
        assert_eq!(value(&form, "fixed"), Some("0"));
        assert_eq!(value(&form, "hours"), Some("2"));
        assert_eq!(value(&form, "minutes"), Some("30"));

        let form = downtime_form(&Downtime {
            target: Target::host("db01"),
            fixed: true,
            duration: Some(std::time::Duration::from_secs(45 * 60)),
            ..downtime
        });
        assert_eq!(value(&form, "cmd_typ"), Some("55"));
        assert_eq!(value(&form, "fixed"), Some("1"));
        assert_eq!(value(&form, "hours"), Some("0"));
        assert_eq!(value(&form, "minutes"), Some("45"));
    }

    #[test]
    fn test_recheck_form() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let form = recheck_form(&Target::host("db01"), now);
        assert_eq!(
            keys(&form),
            vec!["cmd_typ", "cmd_mod", "host", "start_time", "force_check"]
        );
        assert_eq!(value(&form, "cmd_typ"), Some("96"));

        let form = recheck_form(&Target::service("db01", "mysql"), now);
        assert_eq!(value(&form, "cmd_typ"), Some("7"));
        assert_eq!(value(&form, "service"), Some("mysql"));
    }

    #[test]
    fn test_check_result_form_has_only_declared_fields() {
        let result = CheckResult {
            target: Target::service("db01", "mysql"),
            state: Status::Warning,
            comment: None,
            check_output: Some("slow queries".into()),
            performance_data: Some("q=12".into()),
        };
        let form = check_result_form(&result).unwrap();
        assert_eq!(
            keys(&form),
            vec![
                "cmd_typ",
                "cmd_mod",
                "host",
                "service",
                "plugin_state",
                "plugin_output",
                "performance_data"
            ]
        );
        assert_eq!(value(&form, "cmd_typ"), Some("30"));
        assert_eq!(value(&form, "plugin_state"), Some("1"));
    }
}
