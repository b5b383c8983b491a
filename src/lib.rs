//! Fixed-capacity ring buffers behind sequential writer and reader cursors.
//!
//! A [`RingWriter`] overwrites the oldest bytes once it reaches the end of its
//! buffer; a [`RingReader`] starts over from the beginning. Either may carry a
//! byte budget, after which it reports [`TransferStatus::ShortWrite`] or
//! [`TransferStatus::EndOfStream`].

pub mod commands;
pub mod config;
pub mod error;
pub mod ring;

pub use error::{ConfigError, Error};
pub use ring::{Limit, RingReader, RingWriter, Transfer, TransferStatus};
