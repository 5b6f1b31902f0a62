use std::{
    collections::HashMap,
    io::{BufRead, BufReader, ErrorKind, Read, Take},
    str::FromStr,
};

use thiserror::Error;
use tracing::debug;

const REQUEST_LINE_LIMIT: u64 = 1024;
const HEADERS_LIMIT: u64 = 8 * 1024;
const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Error, Debug)]
#[error("end of file")]
pub struct EndOfFile;

#[derive(Error, Debug)]
#[error("invalid request")]
pub struct InvalidRequest;

/// `METHOD target VERSION`, split once when the request arrives.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RequestLine {
    method: String,
    target: String,
    version: String,
}

impl FromStr for RequestLine {
    type Err = InvalidRequest;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(InvalidRequest);
        };
        if method.is_empty() || target.is_empty() || version.is_empty() {
            return Err(InvalidRequest);
        }
        Ok(Self {
            method: method.to_owned(),
            target: target.to_owned(),
            version: version.to_owned(),
        })
    }
}

#[derive(Debug)]
pub struct Request {
    line: RequestLine,
    vars: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(
        line: RequestLine,
        headers: HashMap<String, String>,
        body: Option<Vec<u8>>,
    ) -> Self {
        Self {
            line,
            vars: HashMap::new(),
            headers,
            body,
        }
    }

    pub fn get_http_method(&self) -> &str {
        &self.line.method
    }

    pub fn get_request_target(&self) -> &str {
        &self.line.target
    }

    pub fn get_http_version(&self) -> &str {
        &self.line.version
    }

    /// The request target without its query string.
    pub fn get_path(&self) -> &str {
        let target = self.get_request_target();
        target.split_once('?').map_or(target, |(path, _)| path)
    }

    /// Value captured by the path variable `name` of the matched route.
    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|v| v.as_str())
    }

    pub fn get_vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    pub fn set_vars(&mut self, vars: HashMap<String, String>) {
        self.vars = vars;
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(|v| v.as_str())
    }

    pub fn get_body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn wants_close(&self) -> bool {
        self.get_header("connection")
            .is_some_and(|v| v.split(',').any(|token| token.trim() == "close"))
    }
}

/// Reads consecutive requests off one connection.
pub struct RequestReader<R> {
    buf_reader: Take<BufReader<R>>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(r: R) -> Self {
        Self {
            buf_reader: BufReader::new(r).take(u64::MAX),
        }
    }

    pub fn read(&mut self) -> anyhow::Result<Request> {
        let Some(line) = self.read_crlf_line(REQUEST_LINE_LIMIT)? else {
            return Err(EndOfFile.into());
        };
        let line: RequestLine = line.parse()?;
        debug!(?line);

        let headers = self.read_headers()?;
        let body = self.read_body(&headers)?;
        Ok(Request::new(line, headers, body))
    }

    /// One line of at most `limit` bytes without its CRLF; `None` at end of input.
    fn read_crlf_line(&mut self, limit: u64) -> anyhow::Result<Option<String>> {
        self.buf_reader.set_limit(limit);
        let mut line = String::new();
        if self.buf_reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.strip_suffix("\r\n").ok_or(InvalidRequest)?;
        Ok(Some(line.to_owned()))
    }

    /// Header names are lowercased. All header lines share one size budget.
    fn read_headers(&mut self) -> anyhow::Result<HashMap<String, String>> {
        let mut headers = HashMap::new();
        let mut budget = HEADERS_LIMIT;
        loop {
            let line = self.read_crlf_line(budget)?.ok_or(InvalidRequest)?;
            if line.is_empty() {
                return Ok(headers);
            }
            budget = budget.saturating_sub(line.len() as u64 + 2);

            let (k, v) = line.split_once(':').ok_or(InvalidRequest)?;
            headers.insert(k.to_lowercase(), v.trim().to_owned());
        }
    }

    fn read_body(&mut self, headers: &HashMap<String, String>) -> anyhow::Result<Option<Vec<u8>>> {
        let Some(content_length) = headers.get("content-length") else {
            return Ok(None);
        };
        let content_length: usize = content_length.parse().map_err(|_| InvalidRequest)?;
        if content_length > BODY_LIMIT {
            Err(InvalidRequest)?
        }

        self.buf_reader.set_limit(content_length as u64);
        let mut body = vec![0; content_length];
        match self.buf_reader.read_exact(&mut body) {
            Ok(()) => Ok(Some(body)),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(InvalidRequest.into()),
            Err(err) => Err(err.into()),
        }
    }
}
