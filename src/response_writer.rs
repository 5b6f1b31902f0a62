use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::{
    request::Request,
    status_code_registry::{self, ReasonPhrase},
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Body shared by every reply: `{"status": .., "message": .., "result": ..}`.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    status: bool,
    message: &'a str,
    result: Value,
}

#[derive(Debug)]
pub struct ResponseWriter {
    status_code: Option<u16>,
    reason_phrase: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new_empty() -> Self {
        Self {
            status_code: None,
            reason_phrase: None,
            headers: vec![],
            body: vec![],
        }
    }

    pub fn get_status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn set_status_code(&mut self, status_code: u16) {
        self.status_code = Some(status_code);
        self.reason_phrase =
            status_code_registry::get_reason_phrase(status_code).map(|r| r.to_string());
    }

    pub fn set_reason_phrase(&mut self, reason_phrase: ReasonPhrase) {
        self.status_code = Some(reason_phrase.status_code());
        self.reason_phrase = Some(reason_phrase.to_string());
    }

    fn add_header(&mut self, k: &str, v: String) {
        if let Some(entry) = self
            .headers
            .iter_mut()
            .find(|entry| entry.0.eq_ignore_ascii_case(k))
        {
            entry.1 = v;
        } else {
            self.headers.push((k.to_owned(), v));
        }
    }

    pub fn get_header(&self, k: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|entry| entry.0.eq_ignore_ascii_case(k))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: Vec<u8>, content_type: &str) {
        self.body = body;
        self.add_header("Content-Type", content_type.to_owned());
        self.add_header("Content-Length", self.body.len().to_string());
    }

    pub fn success_reply(
        &mut self,
        reason_phrase: ReasonPhrase,
        message: &str,
        data: impl Serialize,
        r: &Request,
    ) {
        info!(
            path = r.get_path(),
            method = r.get_http_method(),
            msg = message,
            status = reason_phrase.status_code()
        );
        let result = match serde_json::to_value(data) {
            Ok(result) => result,
            Err(err) => {
                error!(?err, "failed to encode result");
                self.set_reason_phrase(ReasonPhrase::InternalServerError);
                self.write_json(false, &err.to_string(), Value::Null);
                return;
            }
        };
        self.set_reason_phrase(reason_phrase);
        self.write_json(true, message, result);
    }

    pub fn failure_reply(&mut self, status_code: u16, message: &str, r: &Request) {
        info!(
            path = r.get_path(),
            method = r.get_http_method(),
            msg = message,
            status = status_code
        );
        self.set_status_code(status_code);
        self.write_json(false, message, Value::Null);
    }

    fn write_json(&mut self, status: bool, message: &str, result: Value) {
        let envelope = Envelope {
            status,
            message,
            result,
        };
        // Serializing a `Value` tree with string keys cannot fail.
        let body = serde_json::to_vec(&envelope).unwrap_or_default();
        self.set_body(body, JSON_CONTENT_TYPE);
    }

    pub fn write(self) -> Vec<u8> {
        let status_code = self.status_code.unwrap_or(200);
        let mut status_line = format!("HTTP/1.1 {}", status_code);
        if let Some(reason_phrase) = &self.reason_phrase {
            status_line = format!("{} {}", status_line, reason_phrase);
        }
        status_line.push_str("\r\n");

        let mut has_content_length = false;
        let mut headers = String::new();
        for (k, v) in &self.headers {
            has_content_length |= k.eq_ignore_ascii_case("content-length");
            headers.push_str(&format!("{}: {}\r\n", k, v));
        }
        if !has_content_length {
            headers.push_str("Content-Length: 0\r\n");
        }
        headers.push_str("\r\n");

        let mut resp = vec![];
        resp.extend(status_line.bytes());
        resp.extend(headers.bytes());
        resp.extend(self.body);
        resp
    }
}
