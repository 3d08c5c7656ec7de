//! # Envelope Tampering
//!
//! Attack: alter envelope bytes in flight to change what executes, or to
//! learn which check rejected the envelope.
//!
//! Expected: any change outside the body is a `MalformedEnvelope`; any
//! change inside a sealed body, even with a recomputed integrity tag, is a
//! `DecryptionFailed`. No tampered envelope reaches the ledger.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cl_ledger::codec::frame;
    use cl_ledger::prelude::*;
    use proptest::prelude::*;

    fn sealed_target(service: &TestService) -> (Address, RingPublicKey) {
        let unit = deploy(service, "ring-key");
        assert!(service.update_ring_key(unit).is_success());
        let key = service.ring_public_keys(unit)[0].1;
        (unit, key)
    }

    fn sealed_mint(key: &RingPublicKey, seed: u64) -> Vec<u8> {
        sealed("mint(address,uint256)", address_amount(ALICE, 10), key, seed)
    }

    /// Rewrite one body byte and recompute the frame tag.
    fn retag_with_flip(raw: &[u8], body_offset: usize) -> Vec<u8> {
        let mut header = [0u8; frame::HEADER_LEN];
        header.copy_from_slice(&raw[..frame::HEADER_LEN]);
        let mut body = raw[frame::HEADER_LEN..raw.len() - frame::TAG_LEN].to_vec();
        body[body_offset] ^= 0x01;
        frame::assemble(&header, &body)
    }

    fn relabel(raw: &[u8], kind: FrameKind) -> Vec<u8> {
        let body = &raw[frame::HEADER_LEN..raw.len() - frame::TAG_LEN];
        let header = frame::header(kind, body.len()).expect("body fits");
        frame::assemble(&header, body)
    }

    #[test]
    fn test_every_truncation_is_malformed() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");
        let envelope = mint(ALICE, 10);

        for cut in 0..envelope.len() {
            let receipt = service.submit(ALICE, unit, &envelope[..cut], U256::zero());
            assert_eq!(
                receipt.error_kind(),
                Some(ErrorKind::MalformedEnvelope),
                "cut at {cut}"
            );
        }
        assert_eq!(balance(&service, unit, ALICE), U256::zero());
    }

    #[test]
    fn test_every_bit_flip_in_plain_frame_is_malformed() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");
        let envelope = mint(ALICE, 10);

        for index in 0..envelope.len() {
            for bit in 0..8 {
                let mut tampered = envelope.clone();
                tampered[index] ^= 1 << bit;
                let receipt = service.submit(ALICE, unit, &tampered, U256::zero());
                assert_eq!(
                    receipt.error_kind(),
                    Some(ErrorKind::MalformedEnvelope),
                    "byte {index} bit {bit}"
                );
            }
        }
        assert_eq!(balance(&service, unit, ALICE), U256::zero());
    }

    #[test]
    fn test_trailing_byte_is_malformed() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");
        let mut envelope = mint(ALICE, 10);
        envelope.push(0);

        let receipt = service.submit(ALICE, unit, &envelope, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::MalformedEnvelope));
    }

    #[test]
    fn test_tag_tamper_on_sealed_frame_is_malformed() {
        let service = test_service();
        let (unit, key) = sealed_target(&service);
        let mut envelope = sealed_mint(&key, 1);
        let last = envelope.len() - 1;
        envelope[last] ^= 0x80;

        let receipt = service.submit(ALICE, unit, &envelope, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::MalformedEnvelope));
    }

    #[test]
    fn test_retagged_sealed_body_fails_decryption() {
        let service = test_service();
        let (unit, key) = sealed_target(&service);
        let envelope = sealed_mint(&key, 2);
        let body_len = envelope.len() - frame::HEADER_LEN - frame::TAG_LEN;

        // Ephemeral key, nonce and ciphertext regions all fail the same way.
        for offset in [0, 1, 32, 33, 40, 56, 57, body_len / 2, body_len - 1] {
            let receipt =
                service.submit(ALICE, unit, &retag_with_flip(&envelope, offset), U256::zero());
            assert_eq!(
                receipt.error_kind(),
                Some(ErrorKind::DecryptionFailed),
                "offset {offset}"
            );
        }
        assert_eq!(balance(&service, unit, ALICE), U256::zero());

        // The untouched envelope still works: none of the above burned its nonce.
        assert!(service.submit(ALICE, unit, &envelope, U256::zero()).is_success());
    }

    #[test]
    fn test_wrong_recipient_key() {
        let service = test_service();
        let (unit, _) = sealed_target(&service);
        let (_, other_key) = sealed_target(&service);

        let receipt = service.submit(ALICE, unit, &sealed_mint(&other_key, 3), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_sealed_envelope_to_unit_without_ring() {
        let service = test_service();
        let (_, key) = sealed_target(&service);
        let plain_unit = deploy(&service, "MyToken");

        let receipt = service.submit(ALICE, plain_unit, &sealed_mint(&key, 4), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_plain_body_relabelled_as_sealed() {
        let service = test_service();
        let (unit, _) = sealed_target(&service);
        let forged = relabel(&mint(ALICE, 10), FrameKind::Sealed);

        // A mint body is shorter than the sealed prefix.
        let receipt = service.submit(ALICE, unit, &forged, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::MalformedEnvelope));
    }

    #[test]
    fn test_sealed_body_relabelled_as_plain() {
        let service = test_service();
        let plain_unit = deploy(&service, "MyToken");
        let (_, key) = sealed_target(&service);
        let forged = relabel(&sealed_mint(&key, 5), FrameKind::Plain);

        let receipt = service.submit(ALICE, plain_unit, &forged, U256::zero());
        assert!(matches!(
            receipt.error_kind(),
            Some(ErrorKind::MalformedEnvelope | ErrorKind::SchemaMismatch)
        ));
        assert_eq!(balance(&service, plain_unit, ALICE), U256::zero());
    }

    #[test]
    fn test_oversized_length_field() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");
        let mut envelope = mint(ALICE, 10);
        envelope[2..6].copy_from_slice(&u32::MAX.to_be_bytes());

        let receipt = service.submit(ALICE, unit, &envelope, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::MalformedEnvelope));
    }

    #[test]
    fn test_failure_receipts_carry_no_detail() {
        let service = test_service();
        let (unit, key) = sealed_target(&service);
        let receipts = [
            service.submit(ALICE, unit, &retag_with_flip(&sealed_mint(&key, 6), 0), U256::zero()),
            service.submit(ALICE, unit, &retag_with_flip(&sealed_mint(&key, 7), 60), U256::zero()),
        ];

        for receipt in &receipts {
            assert!(receipt.output.is_empty());
            assert!(receipt.logs.is_empty());
            assert!(check_receipt_invariant(receipt));
        }
        assert_eq!(receipts[0].status, receipts[1].status);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_random_bytes_never_reach_ledger(
            raw in proptest::collection::vec(any::<u8>(), 0..256)
        ) {
            let service = test_service();
            let unit = deploy(&service, "MyToken");

            let receipt = service.submit(ALICE, unit, &raw, U256::zero());

            prop_assert!(!receipt.is_success());
            prop_assert_eq!(receipt.error_kind(), Some(ErrorKind::MalformedEnvelope));
            prop_assert_eq!(service.check_invariants(), InvariantCheckResult::Valid);
        }
    }
}
