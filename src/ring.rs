use std::io;
use std::ops::Range;

use log::debug;

use crate::error::ConfigError;

/// Byte budget of a ring accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unlimited,
    /// Bytes still transferable.
    Bounded(u64),
}

impl Limit {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Limit::Bounded(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Complete,
    /// The writer's budget cut the call short.
    ShortWrite,
    /// The reader's budget is spent; further reads yield nothing.
    EndOfStream,
}

/// Outcome of a single write-through or read-through call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub bytes: usize,
    pub status: TransferStatus,
}

impl Transfer {
    pub fn is_truncated(&self) -> bool {
        self.status != TransferStatus::Complete
    }
}

/// Cursor and budget shared by both accessor kinds.
#[derive(Debug)]
struct RingState {
    len: usize,
    pos: usize,
    limit: Limit,
}

impl RingState {
    fn new(len: usize, offset: usize, limit: Limit) -> Result<Self, ConfigError> {
        if len == 0 {
            return Err(ConfigError::EmptyBuffer);
        }
        if offset >= len {
            return Err(ConfigError::OffsetOutOfRange { offset, len });
        }
        Ok(Self { len, pos: offset, limit })
    }

    /// How many of `requested` bytes may move, and whether the budget cut in.
    ///
    /// The budget is compared against the ring's length, not the request, so a
    /// call can be flagged even when every requested byte fits.
    fn allowance(&self, requested: usize) -> (usize, bool) {
        if requested == 0 {
            return (0, false);
        }
        match self.limit {
            // rem < len here, so it fits in usize
            Limit::Bounded(rem) if self.len as u64 > rem => (requested.min(rem as usize), true),
            _ => (requested, false),
        }
    }

    /// Moves up to `requested` bytes, calling `copy(ring, other)` once per
    /// contiguous run, wrapping the cursor at the end of the ring.
    fn transfer(
        &mut self,
        requested: usize,
        cut_status: TransferStatus,
        mut copy: impl FnMut(Range<usize>, Range<usize>),
    ) -> Transfer {
        let (allowed, cut) = self.allowance(requested);

        let mut done = 0;
        let mut pos = self.pos;
        while done < allowed {
            let run = (self.len - pos).min(allowed - done);
            copy(pos..pos + run, done..done + run);
            done += run;
            pos += run;
            if pos == self.len {
                pos = 0;
            }
        }
        self.pos = pos;

        if let Limit::Bounded(rem) = &mut self.limit {
            *rem = rem.saturating_sub(done as u64);
        }

        let status = if cut {
            debug!(
                "ring budget reached: moved {} of {} bytes, {:?} left",
                done, requested, self.limit
            );
            cut_status
        } else {
            TransferStatus::Complete
        };
        Transfer { bytes: done, status }
    }
}

/// Sequential writer over a fixed ring; the oldest bytes are overwritten once
/// the end is reached.
#[derive(Debug)]
pub struct RingWriter<B> {
    buf: B,
    state: RingState,
}

impl<B: AsMut<[u8]>> RingWriter<B> {
    pub fn new(buf: B, offset: usize) -> Result<Self, ConfigError> {
        Self::build(buf, offset, Limit::Unlimited)
    }

    /// Like [`RingWriter::new`], but accepts at most `max_bytes` over its lifetime.
    pub fn with_limit(buf: B, offset: usize, max_bytes: u64) -> Result<Self, ConfigError> {
        Self::build(buf, offset, Limit::Bounded(max_bytes))
    }

    fn build(mut buf: B, offset: usize, limit: Limit) -> Result<Self, ConfigError> {
        let state = RingState::new(buf.as_mut().len(), offset, limit)?;
        Ok(Self { buf, state })
    }

    /// Copies `input` into the ring at the cursor, wrapping as often as needed.
    pub fn write_through(&mut self, input: &[u8]) -> Transfer {
        let ring = self.buf.as_mut();
        self.state
            .transfer(input.len(), TransferStatus::ShortWrite, |dst, src| {
                ring[dst].copy_from_slice(&input[src])
            })
    }
}

impl<B> RingWriter<B> {
    pub fn position(&self) -> usize {
        self.state.pos
    }

    pub fn remaining(&self) -> Limit {
        self.state.limit
    }

    pub fn capacity(&self) -> usize {
        self.state.len
    }

    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl<B: AsMut<[u8]>> io::Write for RingWriter<B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let transfer = self.write_through(buf);
        if transfer.bytes == 0 && !buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "ring write budget exhausted",
            ));
        }
        Ok(transfer.bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sequential reader over a fixed ring; reading past the end starts over
/// from the beginning.
#[derive(Debug)]
pub struct RingReader<B> {
    buf: B,
    state: RingState,
}

impl<B: AsRef<[u8]>> RingReader<B> {
    pub fn new(buf: B, offset: usize) -> Result<Self, ConfigError> {
        Self::build(buf, offset, Limit::Unlimited)
    }

    /// Like [`RingReader::new`], but yields at most `max_bytes` over its lifetime.
    pub fn with_limit(buf: B, offset: usize, max_bytes: u64) -> Result<Self, ConfigError> {
        Self::build(buf, offset, Limit::Bounded(max_bytes))
    }

    fn build(buf: B, offset: usize, limit: Limit) -> Result<Self, ConfigError> {
        let state = RingState::new(buf.as_ref().len(), offset, limit)?;
        Ok(Self { buf, state })
    }

    /// Fills `output` from the ring at the cursor, repeating the ring's
    /// content as often as needed.
    pub fn read_through(&mut self, output: &mut [u8]) -> Transfer {
        let ring = self.buf.as_ref();
        self.state
            .transfer(output.len(), TransferStatus::EndOfStream, |src, dst| {
                output[dst].copy_from_slice(&ring[src])
            })
    }
}

impl<B> RingReader<B> {
    pub fn position(&self) -> usize {
        self.state.pos
    }

    pub fn remaining(&self) -> Limit {
        self.state.limit
    }

    pub fn capacity(&self) -> usize {
        self.state.len
    }

    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl<B: AsRef<[u8]>> io::Read for RingReader<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_through(buf).bytes)
    }
}
