use std::{
    io::{self, ErrorKind, Read},
    iter::{self, Chain, Repeat},
    vec,
};

use clap::Parser;
use ctor::ctor;
use tracing::Level;

use crate::config::Config;

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Defaults, but listening on a free local port.
pub fn local_config() -> Config {
    Config::parse_from(["contacts-router", "--addr", "localhost:0"])
}

// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -
// ErrReader
// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -

/// Yields `prefix` one byte at a time, then fails every read.
pub struct ErrReader<I> {
    it: I,
}

impl<I> ErrReader<I> {
    pub fn new(prefix: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            it: prefix.into_iter(),
        }
    }
}

impl<'a, I: Iterator<Item = &'a u8>> Read for ErrReader<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.it.next() {
            Some(byte) => {
                buf[0] = *byte;
                Ok(1)
            }
            None => Err(io::Error::new(ErrorKind::Other, "error")),
        }
    }
}

// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -
// InfReader
// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -

/// Yields `prefix`, then `repeat` forever.
pub struct InfReader {
    it: Chain<vec::IntoIter<u8>, Repeat<u8>>,
}

impl InfReader {
    pub fn new<'a>(prefix: impl IntoIterator<Item = &'a u8>, repeat: u8) -> Self {
        let prefix: Vec<u8> = prefix.into_iter().copied().collect();
        Self {
            it: prefix.into_iter().chain(iter::repeat(repeat)),
        }
    }
}

impl Read for InfReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        for (slot, byte) in buf.iter_mut().zip(self.it.by_ref()) {
            *slot = byte;
            n += 1;
        }
        Ok(n)
    }
}
