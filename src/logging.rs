// src/logging.rs

use crate::config::Config;
use crate::constants::APP_NAME;
use crate::errors::ChatResult;
use crate::models::ApiCallLog;
use flexi_logger::{detailed_format, FileSpec, Logger, LoggerHandle};
use log::info;

/// Starts the file logger. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr. Keep the returned handle alive for the whole
/// run; dropping it flushes and stops logging.
pub fn init_logging(config: &Config) -> ChatResult<LoggerHandle> {
    let dir = config.log_dir()?;
    let handle = Logger::try_with_env_or_str(&config.log_level)?
        .log_to_file(FileSpec::default().directory(dir).basename(APP_NAME))
        .format(detailed_format)
        .start()?;
    Ok(handle)
}

pub fn format_api_call(log: &ApiCallLog) -> String {
    format!(
        "[{}] {} - {} - Status: {} - Time: {}ms",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        log.response_status,
        log.response_time_ms
    )
}

/// Logs an API call on the `api_calls` target.
pub fn log_api_call(log: &ApiCallLog) {
    info!(target: "api_calls", "{}", format_api_call(log));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn test_format_api_call() {
        let log = ApiCallLog {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            endpoint: "https://example.test/v1beta/models/m:generateContent".to_string(),
            request_summary: "generate (12 chars)".to_string(),
            response_status: 200,
            response_time_ms: 345,
        };

        assert_eq!(
            format_api_call(&log),
            "[2024-05-01T12:00:00+00:00] https://example.test/v1beta/models/m:generateContent - generate (12 chars) - Status: 200 - Time: 345ms"
        );
    }
}
