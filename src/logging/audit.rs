//! Request/response audit log
//!
//! One line per handled request, `"<YYYYMMDD HHMMSS .mmm> <json>"`, in a file
//! named `<prefix>_<YYYYMMDD>_<HHMMSS>.log`. Files rotate when the calendar
//! day changes between two writes.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};
use hyper::HeaderMap;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const BANNER: &str = "====================================================================";

/// Keys whose values never reach the log
const SENSITIVE_KEYS: [&str; 3] = ["token", "pwd", "password"];

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub dir: PathBuf,
    pub prefix: String,
    /// Echo every line through `tracing`
    pub console: bool,
}

/// Audit logger, cheap to clone
#[derive(Clone)]
pub struct AuditLogger {
    inner: Arc<Mutex<AuditLoggerInner>>,
    console: bool,
}

struct AuditLoggerInner {
    dir: PathBuf,
    prefix: String,
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    day: NaiveDate,
}

impl AuditLoggerInner {
    /// Open a new file stamped with `now`. On failure file output stays off.
    fn open_stream(&mut self, now: DateTime<Local>, new_day: bool) {
        let name = format!("{}_{}.log", self.prefix, now.format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(name);

        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Cannot create audit log stream");
                self.writer = None;
                self.path = None;
                return;
            }
        };

        let mut writer = BufWriter::new(file);
        let stamp = now.format("%Y%m%d %H%M%S");
        let title = if new_day { "BEGIN LOG for a NEW DAY" } else { "BEGIN LOG" };
        if let Err(e) = write!(writer, "{BANNER}\n{stamp} {title}\n{BANNER}\n") {
            error!(error = %e, "Failed to write audit log banner");
        }

        info!(path = %path.display(), "Audit log opened");
        self.writer = Some(writer);
        self.path = Some(path);
        self.day = now.date_naive();
    }

    fn close_day(&mut self, stamp: &str) {
        if let Some(mut writer) = self.writer.take() {
            let _ = write!(writer, "{BANNER}\n{stamp}END LOG for the OLD DAY\n{BANNER}\n");
            if let Err(e) = writer.flush() {
                error!(error = %e, "Failed to flush audit log");
            }
        }
    }
}

impl AuditLogger {
    /// Create the log directory and open the first file.
    ///
    /// An unusable directory disables file output; requests are still served.
    pub fn new(config: AuditConfig) -> Self {
        let now = Local::now();
        let mut inner = AuditLoggerInner {
            dir: config.dir,
            prefix: config.prefix,
            writer: None,
            path: None,
            day: now.date_naive(),
        };

        match fs::create_dir_all(&inner.dir) {
            Ok(()) => inner.open_stream(now, false),
            Err(e) => warn!(dir = %inner.dir.display(), error = %e, "Audit log directory unavailable, file output disabled"),
        }

        Self {
            inner: Arc::new(Mutex::new(inner)),
            console: config.console,
        }
    }

    /// Path of the file currently written, if any
    pub async fn current_path(&self) -> Option<PathBuf> {
        self.inner.lock().await.path.clone()
    }

    pub async fn write_line(&self, text: &str) {
        self.write_line_at(Local::now(), text).await;
    }

    pub(crate) async fn write_line_at(&self, now: DateTime<Local>, text: &str) {
        let stamp = now.format("%Y%m%d %H%M%S .%3f ").to_string();

        if self.console {
            info!(target: "audit", "{}{}", stamp, text);
        }

        let mut inner = self.inner.lock().await;
        if inner.writer.is_none() {
            return;
        }

        if now.date_naive() != inner.day {
            inner.close_day(&stamp);
            inner.open_stream(now, true);
        }

        if let Some(ref mut writer) = inner.writer {
            if let Err(e) = writeln!(writer, "{}{}", stamp, text) {
                error!(error = %e, "Failed to write audit line");
            }
            if let Err(e) = writer.flush() {
                error!(error = %e, "Failed to flush audit log");
            }
        }
    }

    /// Record one request and the envelope sent back for it
    pub async fn log_exchange(&self, request: &RequestRecord, response: &Value) {
        let mut line = json!({ "request": request, "response": response });
        redact(&mut line);

        match serde_json::to_string(&line) {
            Ok(text) => self.write_line(&text).await,
            Err(e) => error!(error = %e, "Failed to encode audit record"),
        }
    }
}

/// What the audit log keeps of an incoming request
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub body: Value,
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub client_ip: String,
    pub time: String,
    pub agent: String,
}

impl RequestRecord {
    pub fn capture(
        method: &str,
        url: &str,
        headers: &HeaderMap,
        remote_addr: Option<SocketAddr>,
        body: &[u8],
    ) -> Self {
        let mut recorded: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            if *name == hyper::header::AUTHORIZATION {
                continue;
            }
            recorded
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let agent = headers
            .get(hyper::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self {
            body: body_record(body),
            method: method.to_string(),
            url: url.to_string(),
            headers: recorded,
            client_ip: remote_addr.map(|a| a.ip().to_string()).unwrap_or_default(),
            time: Local::now().format("%Y-%m-%d %H:%M:%S .%3f").to_string(),
            agent,
        }
    }
}

/// Body as a list of JSON values, or `[{"raw_body": ...}]` when it is not JSON
fn body_record(body: &[u8]) -> Value {
    let parsed: Result<Vec<Value>, _> = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .collect();

    match parsed {
        Ok(values) => Value::Array(values),
        Err(_) => {
            let raw = String::from_utf8_lossy(body).replace(['\n', '\r'], "");
            json!([{ "raw_body": raw }])
        }
    }
}

/// Replace sensitive values with `"***"` at any depth
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    *v = Value::String("***".into());
                } else {
                    redact(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger_in(dir: &std::path::Path) -> AuditLogger {
        AuditLogger::new(AuditConfig {
            dir: dir.to_path_buf(),
            prefix: "audit".into(),
            console: false,
        })
    }

    #[test]
    fn redacts_nested_secrets() {
        let mut value = json!({
            "request": {"body": [{"userid": "finance", "password": "hunter2"}]},
            "response": {"status": "success", "data": {"token": "eyJ..."}},
        });
        redact(&mut value);

        assert_eq!(value["request"]["body"][0]["password"], "***");
        assert_eq!(value["request"]["body"][0]["userid"], "finance");
        assert_eq!(value["response"]["data"]["token"], "***");
    }

    #[test]
    fn non_json_body_kept_raw() {
        assert_eq!(body_record(b"a=1\r\nb=2"), json!([{ "raw_body": "a=1b=2" }]));
        assert_eq!(body_record(b""), json!([]));
        assert_eq!(body_record(br#"{"name":"x"}"#), json!([{ "name": "x" }]));
    }

    #[test]
    fn authorization_header_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(hyper::header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        headers.insert(hyper::header::USER_AGENT, "curl/8".parse().unwrap());

        let record = RequestRecord::capture(
            "GET",
            "/budgets",
            &headers,
            Some("10.0.0.5:5555".parse().unwrap()),
            b"",
        );

        assert!(!record.headers.contains_key("authorization"));
        assert_eq!(record.agent, "curl/8");
        assert_eq!(record.client_ip, "10.0.0.5");
    }

    #[tokio::test]
    async fn writes_banner_and_stamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let logger = logger_in(dir.path());

        logger.write_line("hello").await;

        let path = logger.current_path().await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("audit_") && name.ends_with(".log"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(" BEGIN LOG\n"));
        assert!(content.trim_end().ends_with("hello"));
    }

    #[tokio::test]
    async fn rotates_on_day_change() {
        let dir = tempfile::tempdir().unwrap();
        let logger = logger_in(dir.path());
        let first = logger.current_path().await.unwrap();

        let tomorrow = Local::now() + chrono::Duration::days(1);
        logger.write_line_at(tomorrow, "next day").await;

        let second = logger.current_path().await.unwrap();
        assert_ne!(first, second);

        let old = fs::read_to_string(&first).unwrap();
        assert!(old.contains("END LOG for the OLD DAY"));
        let new = fs::read_to_string(&second).unwrap();
        assert!(new.contains("BEGIN LOG for a NEW DAY"));
        assert!(new.contains("next day"));
    }

    #[tokio::test]
    async fn unusable_directory_disables_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let logger = logger_in(&blocker.join("log"));
        logger.write_line("dropped").await;
        assert!(logger.current_path().await.is_none());
    }
}
