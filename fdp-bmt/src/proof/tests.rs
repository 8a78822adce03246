#[cfg(test)]
mod proof_tests {
    use assert_matches::assert_matches;

    use crate::{
        BRANCHES, Bmt, BmtError, Chunk, ChunkPosition, ChunkedFile, MAX_CHUNK_PAYLOAD_SIZE,
        SEGMENT_SIZE, Segment, locate_segment, proof::*,
    };

    /// Deterministic file content of `len` bytes.
    fn file_bytes(len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
            .collect()
    }

    /// The file segment at `index`, zero-padded to 32 bytes.
    fn proved_segment(bytes: &[u8], index: u64) -> Segment {
        let start = index as usize * SEGMENT_SIZE;
        let end = (start + SEGMENT_SIZE).min(bytes.len());
        let mut segment = [0u8; SEGMENT_SIZE];
        segment[..end - start].copy_from_slice(&bytes[start..end]);
        segment
    }

    fn last_segment_index(bytes: &[u8]) -> u64 {
        ((bytes.len() - 1) / SEGMENT_SIZE) as u64
    }

    fn last_chunk_index(bytes: &[u8]) -> u64 {
        ((bytes.len() - 1) / MAX_CHUNK_PAYLOAD_SIZE) as u64
    }

    /// File address built level by level from `Chunk` values, popping a lone
    /// trailing chunk and re-inserting it once a level has room.
    fn reference_file_address(bmt: &Bmt, bytes: &[u8]) -> Segment {
        let mut level: Vec<Chunk<'static>> = if bytes.is_empty() {
            vec![Chunk::new(Vec::new()).unwrap()]
        } else {
            bytes
                .chunks(MAX_CHUNK_PAYLOAD_SIZE)
                .map(|payload| Chunk::new(payload.to_vec()).unwrap())
                .collect()
        };
        let pop = |level: &mut Vec<Chunk<'static>>| {
            if level.len() > 1 && level.len() % BRANCHES == 1 {
                level.pop()
            } else {
                None
            }
        };
        let mut carrier = pop(&mut level);
        while level.len() != 1 || carrier.is_some() {
            let mut next: Vec<Chunk<'static>> = level
                .chunks(BRANCHES)
                .map(|children| {
                    let payload: Vec<u8> = children
                        .iter()
                        .flat_map(|child| bmt.address(child).unwrap())
                        .collect();
                    let span = children.iter().map(Chunk::span).sum();
                    Chunk::with_span(payload, span).unwrap()
                })
                .collect();
            match carrier.take() {
                Some(chunk) if next.len() % BRANCHES != 0 => next.push(chunk),
                Some(chunk) => carrier = Some(chunk),
                None => carrier = pop(&mut next),
            }
            level = next;
        }
        bmt.address(&level[0]).unwrap()
    }

    /// Prove `segment_index`, check the claimed file size and rebuild the
    /// file address from the proof.
    fn prove_and_rebuild(
        bmt: &Bmt,
        file: &ChunkedFile<'_>,
        tree: &crate::FileTree,
        segment_index: u64,
    ) -> (FileInclusionProof, Segment) {
        let bytes = file.payload();
        let proof = bmt
            .file_inclusion_proof_from_tree(file, tree, segment_index)
            .expect("proof generation should succeed");
        assert_eq!(proof.file_size().unwrap(), bytes.len() as u64);
        let address = bmt
            .file_address_from_inclusion_proof(
                &proof,
                proved_segment(bytes, segment_index),
                segment_index,
                last_chunk_index(bytes),
            )
            .expect("verification should succeed");
        (proof, address)
    }

    // ── Ordinary files ────────────────────────────────────────────────

    #[test]
    fn test_single_chunk_file() {
        let bmt = Bmt::new();
        let bytes = file_bytes(1000);
        let file = ChunkedFile::new(&bytes);
        assert_eq!(file.leaf_count(), 1);

        let address = bmt.file_address(&file).unwrap();
        assert_eq!(address, bmt.chunk_address(&bytes).unwrap());

        let tree = bmt.file_tree(&file).unwrap();
        for index in 0..=last_segment_index(&bytes) {
            let (proof, rebuilt) = prove_and_rebuild(&bmt, &file, &tree, index);
            assert_eq!(proof.len(), 1);
            assert_eq!(rebuilt, address);
        }
    }

    #[test]
    fn test_empty_file() {
        let bmt = Bmt::new();
        let file = ChunkedFile::new(&[]);
        assert_eq!(file.leaf_count(), 1);
        assert_eq!(
            bmt.file_address(&file).unwrap(),
            bmt.chunk_address(&[]).unwrap()
        );
        assert_matches!(
            bmt.file_inclusion_proof_bottom_up(&file, 0),
            Err(BmtError::InvalidSegmentIndex { index: 0, .. })
        );
    }

    #[test]
    fn test_small_file_every_segment() {
        let bmt = Bmt::new();
        let bytes = file_bytes(3 * MAX_CHUNK_PAYLOAD_SIZE + 77);
        let file = ChunkedFile::new(&bytes);
        let tree = bmt.file_tree(&file).unwrap();
        let address = tree.root().address;
        assert_eq!(address, reference_file_address(&bmt, &bytes));
        assert_eq!(tree.root().span, bytes.len() as u64);

        for index in 0..=last_segment_index(&bytes) {
            let (proof, rebuilt) = prove_and_rebuild(&bmt, &file, &tree, index);
            assert_eq!(proof.len(), 2);
            assert_eq!(rebuilt, address, "segment {}", index);
        }
    }

    #[test]
    fn test_two_level_file_without_carrier() {
        let bmt = Bmt::new();
        // 130 leaf chunks, the last one partial
        let bytes = file_bytes(129 * MAX_CHUNK_PAYLOAD_SIZE + 1);
        let file = ChunkedFile::new(&bytes);
        let tree = bmt.file_tree(&file).unwrap();
        assert!(tree.shape().carriers().is_empty());
        assert_eq!(tree.root().address, reference_file_address(&bmt, &bytes));

        for index in [0, 1000, 128 * 128, last_segment_index(&bytes)] {
            let (proof, rebuilt) = prove_and_rebuild(&bmt, &file, &tree, index);
            assert_eq!(proof.len(), 3);
            assert_eq!(rebuilt, tree.root().address, "segment {}", index);
        }
    }

    // ── Carrier chunks ────────────────────────────────────────────────

    #[test]
    fn test_leaf_level_carrier_chunk() {
        let bmt = Bmt::new();
        // 129 leaf chunks: the last one is a carrier chunk
        let bytes = file_bytes(128 * MAX_CHUNK_PAYLOAD_SIZE + 100);
        let file = ChunkedFile::new(&bytes);
        let leaf_chunks = file.leaf_chunks().unwrap();
        let tree = bmt.file_tree(&file).unwrap();

        // the carrier is not on the leaf level
        assert_eq!(tree.levels()[0].len(), leaf_chunks.len() - 1);

        let segment_index = last_segment_index(&bytes);
        let position = locate_segment(segment_index, last_chunk_index(&bytes)).unwrap();
        assert_eq!(position, ChunkPosition::new(1, 1));
        let carrier = leaf_chunks.last().unwrap();
        assert_eq!(
            tree.node(position).unwrap().address,
            bmt.address(carrier).unwrap()
        );

        let address = tree.root().address;
        assert_eq!(address, reference_file_address(&bmt, &bytes));

        // one level is skipped because the segment is in a carrier chunk
        let (proof, rebuilt) = prove_and_rebuild(&bmt, &file, &tree, segment_index);
        assert_eq!(proof.len(), 2);
        assert_eq!(proof.levels[0].span_value().unwrap(), 100);
        assert_eq!(rebuilt, address);

        let (proof, rebuilt) = prove_and_rebuild(&bmt, &file, &tree, 1000);
        assert_eq!(proof.len(), 3);
        assert_eq!(rebuilt, address);
    }

    #[test]
    fn test_intermediate_level_carrier_chunk() {
        let bmt = Bmt::new();
        // 128 * 4096 * 128 = 67108864 saturates the left subtree on level 1;
        // two more full chunks leave no carrier on the leaf level but one on
        // its parent level.
        let bytes = file_bytes(67_117_056);
        let file = ChunkedFile::new(&bytes);
        let tree = bmt.file_tree(&file).unwrap();
        assert_eq!(tree.shape().level_sizes(), &[16386, 128, 2, 1]);
        assert_eq!(
            tree.shape().carriers()[0].origin,
            ChunkPosition::new(1, 128)
        );
        let address = tree.root().address;
        assert_eq!(address, bmt.file_address(&file).unwrap());

        let last = last_segment_index(&bytes);
        let (proof, rebuilt) = prove_and_rebuild(&bmt, &file, &tree, last);
        assert_eq!(proof.len(), 3);
        assert_eq!(rebuilt, address);

        let (proof, rebuilt) = prove_and_rebuild(&bmt, &file, &tree, 1000);
        assert_eq!(proof.len(), 4);
        assert_eq!(rebuilt, address);

        let err = bmt
            .file_inclusion_proof_from_tree(&file, &tree, last + 1)
            .unwrap_err();
        assert!(err.to_string().starts_with("The given segment index"));

        // a valid proof presented for one segment past the end is rejected
        let proof = bmt
            .file_inclusion_proof_from_tree(&file, &tree, last)
            .unwrap();
        assert_matches!(
            bmt.file_address_from_inclusion_proof(
                &proof,
                [0u8; 32],
                last + 1,
                last_chunk_index(&bytes)
            ),
            Err(BmtError::InvalidSegmentIndex { .. })
        );
    }

    // ── Verification failures ─────────────────────────────────────────

    #[test]
    fn test_verify_rejects_wrong_depth() {
        let bmt = Bmt::new();
        let bytes = file_bytes(128 * MAX_CHUNK_PAYLOAD_SIZE + 100);
        let file = ChunkedFile::new(&bytes);
        let last = last_segment_index(&bytes);

        // the carrier proof has 2 levels, an interior chunk needs 3
        let proof = bmt.file_inclusion_proof_bottom_up(&file, last).unwrap();
        assert_matches!(
            bmt.file_address_from_inclusion_proof(
                &proof,
                proved_segment(&bytes, 1000),
                1000,
                last_chunk_index(&bytes)
            ),
            Err(BmtError::InvalidProof(_))
        );

        let empty = FileInclusionProof { levels: vec![] };
        assert_matches!(
            bmt.file_address_from_inclusion_proof(&empty, [0u8; 32], 0, 0),
            Err(BmtError::InvalidProof(_))
        );
    }

    #[test]
    fn test_verify_detects_tampering() {
        let bmt = Bmt::new();
        let bytes = file_bytes(5 * MAX_CHUNK_PAYLOAD_SIZE);
        let file = ChunkedFile::new(&bytes);
        let address = bmt.file_address(&file).unwrap();
        let proof = bmt.file_inclusion_proof_bottom_up(&file, 300).unwrap();

        let mut segment = proved_segment(&bytes, 300);
        segment[31] ^= 0xff;
        let rebuilt = bmt
            .file_address_from_inclusion_proof(&proof, segment, 300, 4)
            .unwrap();
        assert_ne!(rebuilt, address);

        let mut forged = proof.clone();
        forged.levels[1].sister_segments[0][0] ^= 1;
        let rebuilt = bmt
            .file_address_from_inclusion_proof(&forged, proved_segment(&bytes, 300), 300, 4)
            .unwrap();
        assert_ne!(rebuilt, address);
    }

    // ── Encoding ──────────────────────────────────────────────────────

    #[test]
    fn test_proof_encode_decode() {
        let bmt = Bmt::new();
        let bytes = file_bytes(128 * MAX_CHUNK_PAYLOAD_SIZE + 100);
        let file = ChunkedFile::new(&bytes);
        let proof = bmt.file_inclusion_proof_bottom_up(&file, 1000).unwrap();

        let encoded = proof.encode_to_vec().unwrap();
        let decoded = FileInclusionProof::decode_from_slice(&encoded).unwrap();
        assert_eq!(decoded, proof);
        assert_eq!(decoded.file_size().unwrap(), bytes.len() as u64);
    }

    #[test]
    fn test_decode_rejects_malformed_proofs() {
        let mut proof = FileInclusionProof {
            levels: vec![ChunkInclusionProof {
                span: vec![0, 16, 0, 0, 0, 0, 0, 0],
                sister_segments: vec![[0u8; 32]; 6],
            }],
        };
        let encoded = proof.encode_to_vec().unwrap();
        assert_matches!(
            FileInclusionProof::decode_from_slice(&encoded),
            Err(BmtError::InvalidProof(_))
        );

        proof.levels[0].sister_segments.push([0u8; 32]);
        proof.levels[0].span = vec![];
        let encoded = proof.encode_to_vec().unwrap();
        assert_matches!(
            FileInclusionProof::decode_from_slice(&encoded),
            Err(BmtError::InvalidSpanSize(0))
        );

        assert_matches!(
            FileInclusionProof::decode_from_slice(&[0xff, 0xff]),
            Err(BmtError::InvalidData(_))
        );
    }
}
