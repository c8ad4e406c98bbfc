use ledgerdrive_protocol::ChunkId;

use crate::types::Chunk;
use crate::{CHUNK_SIZE, TransferError};

/// Number of chunk slots a file of `size` bytes occupies.
///
/// Zero-byte files occupy none.
pub fn expected_chunk_count(size: u64) -> u64 {
    size.div_ceil(CHUNK_SIZE as u64)
}

/// Splits a file's full content into [`CHUNK_SIZE`] slices and pairs slice
/// `i` with `ids[i]`.
///
/// The last slice holds the remainder. Fails without producing anything when
/// the number of slices differs from the number of ids.
pub fn split_into_chunks(data: &[u8], ids: &[ChunkId]) -> Result<Vec<Chunk>, TransferError> {
    let produced = data.len().div_ceil(CHUNK_SIZE);
    if produced != ids.len() {
        return Err(TransferError::ChunkMismatch {
            expected: ids.len(),
            actual: produced,
        });
    }

    Ok(data
        .chunks(CHUNK_SIZE)
        .zip(ids)
        .map(|(bytes, &id)| Chunk {
            id,
            bytes: bytes.to_vec(),
        })
        .collect())
}
