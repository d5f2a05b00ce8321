use ufotofu::producer::FromSlice;

use crate::error::{CopyError, DecodeError};
use crate::reader::{EntryReader, Reader};
use crate::traits::{Decodable, DecodableSync, Encodable, EncodableSync};

/// Creates a `D` from the encoding of `src` under `tag`.
///
/// The whole encoding is built in memory first and then decoded from a fresh [`EntryReader`], so no live stream between an encoding and a decoding side is needed.
pub fn copy<D, S>(src: &S, tag: u64) -> Result<D, CopyError>
where
    D: DecodableSync,
    S: EncodableSync + ?Sized,
{
    pollster::block_on(copy_in_memory(src, tag))
}

async fn copy_in_memory<D, S>(src: &S, tag: u64) -> Result<D, CopyError>
where
    D: Decodable,
    S: Encodable + ?Sized,
{
    let enc = src.encode_into_vec(tag).await?;

    let mut reader = EntryReader::new(FromSlice::new(&enc[..]));
    let dst = D::decode(tag, &mut reader).await?;

    match reader.read().await? {
        None => Ok(dst),
        Some(entry) => Err(CopyError::Decode(DecodeError::UnexpectedEntry {
            tag: entry.tag,
        })),
    }
}
