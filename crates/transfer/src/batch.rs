use crate::BATCH_BYTE_LIMIT;
use crate::types::{Chunk, UploadBatch};

/// Packs chunks into batches for transmission, preserving order.
///
/// Greedy single pass: a chunk that would bring the running total to
/// [`BATCH_BYTE_LIMIT`] or beyond closes the current batch and opens the
/// next one. A chunk that alone reaches the limit ends up alone in its
/// batch. Empty batches are never produced.
pub fn group_into_batches(chunks: Vec<Chunk>) -> Vec<UploadBatch> {
    let mut batches = Vec::new();
    let mut current = UploadBatch::default();

    for chunk in chunks {
        if current.byte_len() + chunk.bytes.len() >= BATCH_BYTE_LIMIT && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
        }
        current.push(chunk);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerdrive_protocol::ChunkId;

    fn chunk(id: u128, len: usize) -> Chunk {
        Chunk {
            id: ChunkId(id),
            bytes: vec![0u8; len],
        }
    }

    fn flatten_ids(batches: &[UploadBatch]) -> Vec<ChunkId> {
        batches.iter().flat_map(|b| b.ids()).collect()
    }

    #[test]
    fn empty_input_has_no_batches() {
        assert!(group_into_batches(Vec::new()).is_empty());
    }

    #[test]
    fn small_chunks_share_a_batch() {
        let batches = group_into_batches(vec![chunk(1, 10), chunk(2, 20), chunk(3, 30)]);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].byte_len(), 60);
        assert_eq!(batches[0].len(), 3);
    }

    #[test]
    fn two_full_chunks_fit_under_limit() {
        let batches = group_into_batches(vec![chunk(1, 999_999), chunk(2, 999_999)]);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].byte_len(), 1_999_998);
    }

    #[test]
    fn reaching_limit_exactly_closes_batch() {
        let batches = group_into_batches(vec![chunk(1, 1_000_000), chunk(2, 1_000_000)]);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].ids(), vec![ChunkId(1)]);
        assert_eq!(batches[1].ids(), vec![ChunkId(2)]);
    }

    #[test]
    fn oversized_chunk_is_alone() {
        let batches = group_into_batches(vec![chunk(1, 2_500_000), chunk(2, 5), chunk(3, 3_000_000)]);
        let lens: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(lens, vec![1, 1, 1]);
        assert_eq!(flatten_ids(&batches), vec![ChunkId(1), ChunkId(2), ChunkId(3)]);
    }

    #[test]
    fn three_file_scenario() {
        // 500_000 / 1_800_000 / 100_000 byte files.
        let chunks = vec![
            chunk(1, 500_000),
            chunk(2, 999_999),
            chunk(3, 800_001),
            chunk(4, 100_000),
        ];
        let batches = group_into_batches(chunks);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].ids(), vec![ChunkId(1), ChunkId(2)]);
        assert_eq!(batches[1].ids(), vec![ChunkId(3), ChunkId(4)]);
        for batch in &batches {
            assert!(batch.byte_len() < BATCH_BYTE_LIMIT);
        }
    }

    #[test]
    fn order_and_membership_preserved() {
        let sizes = [
            700_000, 999_999, 3, 999_999, 999_999, 400_000, 1_999_999, 12, 999_999, 0, 850_000,
        ];
        let chunks: Vec<Chunk> = sizes
            .iter()
            .enumerate()
            .map(|(i, &len)| chunk(i as u128, len))
            .collect();
        let expected: Vec<ChunkId> = chunks.iter().map(|c| c.id).collect();

        let batches = group_into_batches(chunks);

        assert_eq!(flatten_ids(&batches), expected);
        for batch in &batches {
            assert!(!batch.is_empty());
            assert!(batch.byte_len() < BATCH_BYTE_LIMIT || batch.len() == 1);
        }
    }
}
