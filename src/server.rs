use std::{
    io::Write,
    net::{SocketAddr, TcpListener, TcpStream},
    thread,
    time::Duration,
};

use strum_macros::{Display, EnumString};
use tracing::{debug, error, info, span, warn, Level};

use crate::{
    config::Config,
    request::{EndOfFile, Request, RequestReader},
    response_writer::ResponseWriter,
    status_code_registry::ReasonPhrase,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Accepts clients and serves each one on its own scoped thread.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    read_timeout: Option<Duration>,
}

impl Server {
    pub fn bind(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(config.addr.as_str())?,
            read_timeout: config.read_timeout(),
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn serve(&self, handler: impl Handler + Sync) {
        let read_timeout = self.read_timeout;
        let handler = &handler;
        thread::scope(|s| {
            for (id, stream) in self.listener.incoming().enumerate() {
                let stream = match stream {
                    Ok(stream) => stream,
                    Err(err) => {
                        error!(?err, "accept failed");
                        continue;
                    }
                };

                s.spawn(move || {
                    let peer = stream
                        .peer_addr()
                        .map_or_else(|_| "unknown".to_owned(), |addr| addr.to_string());
                    let span = span!(Level::INFO, "conn", id, peer = peer.as_str());
                    let _guard = span.enter();
                    debug!("accepted");

                    let served = Connection::open(&stream, read_timeout).and_then(|mut conn| {
                        conn.serve(handler)?;
                        Ok(conn.served)
                    });
                    match served {
                        Ok(requests) => info!(requests, "closed"),
                        Err(err) => error!(?err, "connection failed"),
                    }
                });
            }
        });
    }
}

/// One client. Requests are answered in arrival order until either side is done.
struct Connection<'s> {
    stream: &'s TcpStream,
    requests: RequestReader<&'s TcpStream>,
    served: u64,
}

impl<'s> Connection<'s> {
    fn open(stream: &'s TcpStream, read_timeout: Option<Duration>) -> anyhow::Result<Self> {
        stream.set_read_timeout(read_timeout)?;
        Ok(Self {
            stream,
            requests: RequestReader::new(stream),
            served: 0,
        })
    }

    fn serve(&mut self, handler: &impl Handler) -> anyhow::Result<()> {
        while let Some(mut r) = self.next_request()? {
            self.served += 1;
            let span = span!(
                Level::INFO,
                "req",
                seq = self.served,
                method = r.get_http_method(),
                path = r.get_path()
            );
            let _guard = span.enter();

            let close = r.wants_close();
            let mut w = ResponseWriter::new_empty();
            handler.handle(&mut w, &mut r);
            self.send(w)?;
            if close {
                debug!("client asked to close");
                break;
            }
        }
        Ok(())
    }

    /// `None` when the client hung up, or after an unreadable request was answered with 400.
    fn next_request(&mut self) -> anyhow::Result<Option<Request>> {
        match self.requests.read() {
            Ok(r) => Ok(Some(r)),
            Err(err) if err.is::<EndOfFile>() => Ok(None),
            Err(err) => {
                warn!(?err, "unreadable request");
                let mut w = ResponseWriter::new_empty();
                w.set_reason_phrase(ReasonPhrase::BadRequest);
                self.send(w)?;
                Ok(None)
            }
        }
    }

    fn send(&mut self, w: ResponseWriter) -> anyhow::Result<()> {
        let mut stream = self.stream;
        stream.write_all(&w.write())?;
        Ok(())
    }
}

pub trait Handler {
    fn handle(&self, w: &mut ResponseWriter, r: &mut Request);
}

impl<T> Handler for T
where
    T: Fn(&mut ResponseWriter, &mut Request),
{
    fn handle(&self, w: &mut ResponseWriter, r: &mut Request) {
        self(w, r)
    }
}

#[cfg(test)]
pub fn noop_handler() -> impl Handler {
    |_: &mut ResponseWriter, _: &mut Request| {}
}
