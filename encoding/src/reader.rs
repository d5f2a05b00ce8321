use core::future::Future;
use core::mem;

use ufotofu::BulkProducer;

use crate::bytes::{produce_byte_or_end, produce_exact};
use crate::compact_width::{decode_compact_width, decode_compact_width_after};
use crate::error::DecodeError;

/// One Type-Length-Value unit of a stream, with the Length already applied to the value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub tag: u64,
    pub value: Vec<u8>,
}

/// A stream of entries with a single entry of lookahead.
///
/// The lookahead lets a decoder test whether the next entry belongs to a field without consuming it.
pub trait Reader {
    /// The error type of the underlying transport.
    type Error;

    /// Returns the tag of the next entry without consuming it.
    ///
    /// Returns `None` if there are no more entries, which is the case both at the end of the stream and when the next entry cannot be parsed. [`read`](Reader::read) tells the two apart. Calling `peek` repeatedly without an intervening `read` returns the same tag and does not advance the stream.
    fn peek(&mut self) -> impl Future<Output = Option<u64>>;

    /// Consumes the next entry, or returns `Ok(None)` at the end of the stream.
    ///
    /// If a preceding [`peek`](Reader::peek) failed to parse the next entry, this returns that error. After an error has been returned, the reader reports the end of the stream.
    fn read(&mut self) -> impl Future<Output = Result<Option<Entry>, DecodeError<Self::Error>>>;
}

impl<R: Reader + ?Sized> Reader for &mut R {
    type Error = R::Error;

    async fn peek(&mut self) -> Option<u64> {
        (**self).peek().await
    }

    async fn read(&mut self) -> Result<Option<Entry>, DecodeError<Self::Error>> {
        (**self).read().await
    }
}

enum Lookahead<E> {
    Empty,
    Entry(Entry),
    Failed(DecodeError<E>),
    End,
}

/// A [`Reader`] that parses entries from a [`BulkProducer`] of bytes.
pub struct EntryReader<P: BulkProducer<Item = u8>> {
    producer: P,
    lookahead: Lookahead<P::Error>,
}

impl<P: BulkProducer<Item = u8>> EntryReader<P> {
    pub fn new(producer: P) -> Self {
        EntryReader {
            producer,
            lookahead: Lookahead::Empty,
        }
    }

    /// Returns the underlying producer. A peeked but unread entry is lost.
    pub fn into_inner(self) -> P {
        self.producer
    }

    async fn parse_entry(&mut self) -> Result<Option<Entry>, DecodeError<P::Error>> {
        // The stream may only end cleanly before the first byte of a Type.
        let first = match produce_byte_or_end(&mut self.producer).await? {
            Some(byte) => byte,
            None => return Ok(None),
        };

        let tag = decode_compact_width_after(first, &mut self.producer).await?;
        let len = usize::try_from(decode_compact_width(&mut self.producer).await?)?;
        let value = produce_exact(&mut self.producer, len).await?;

        Ok(Some(Entry { tag, value }))
    }
}

impl<P: BulkProducer<Item = u8>> Reader for EntryReader<P> {
    type Error = P::Error;

    async fn peek(&mut self) -> Option<u64> {
        if let Lookahead::Empty = self.lookahead {
            self.lookahead = match self.parse_entry().await {
                Ok(Some(entry)) => Lookahead::Entry(entry),
                Ok(None) => Lookahead::End,
                Err(err) => Lookahead::Failed(err),
            };
        }

        match &self.lookahead {
            Lookahead::Entry(entry) => Some(entry.tag),
            _ => None,
        }
    }

    async fn read(&mut self) -> Result<Option<Entry>, DecodeError<P::Error>> {
        match mem::replace(&mut self.lookahead, Lookahead::End) {
            Lookahead::Empty => match self.parse_entry().await {
                Ok(Some(entry)) => {
                    self.lookahead = Lookahead::Empty;
                    Ok(Some(entry))
                }
                Ok(None) => Ok(None),
                Err(err) => Err(err),
            },
            Lookahead::Entry(entry) => {
                self.lookahead = Lookahead::Empty;
                Ok(Some(entry))
            }
            Lookahead::Failed(err) => Err(err),
            Lookahead::End => Ok(None),
        }
    }
}
