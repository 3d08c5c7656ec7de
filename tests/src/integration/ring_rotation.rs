//! # Ring Rotation
//!
//! Sealed envelopes against a rotating ring: FIFO eviction at capacity,
//! the grace window, the reject policy, and replay rejection.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cl_ledger::prelude::*;

    const K: usize = 7;

    fn ring_unit(service: &TestService) -> Address {
        deploy(service, "ring-key")
    }

    fn rotate(service: &TestService, unit: Address, times: usize) {
        for _ in 0..times {
            assert!(service.update_ring_key(unit).is_success());
        }
    }

    fn newest_key(service: &TestService, unit: Address) -> RingPublicKey {
        service.ring_public_keys(unit)[0].1
    }

    fn sealed_mint(key: &RingPublicKey, amount: u64, seed: u64) -> Vec<u8> {
        sealed("mint(address,uint256)", address_amount(ALICE, amount), key, seed)
    }

    #[test]
    fn test_ring_holds_at_most_k_keys() {
        let service = test_service();
        let unit = ring_unit(&service);
        assert!(service.ring_public_keys(unit).is_empty());

        rotate(&service, unit, K + 1);

        let keys = service.ring_public_keys(unit);
        assert_eq!(keys.len(), K);
        let epochs: Vec<u64> = keys.iter().map(|(epoch, _)| *epoch).collect();
        assert_eq!(epochs, (1..=K as u64).rev().collect::<Vec<_>>());
        assert_eq!(service.stats().ring_rotations, (K + 1) as u64);
    }

    #[test]
    fn test_rotation_reports_epoch() {
        let service = test_service();
        let unit = ring_unit(&service);

        let first = service.update_ring_key(unit);
        let second = service.update_ring_key(unit);

        assert_eq!(first.output_u256(), Some(U256::zero()));
        assert_eq!(second.output_u256(), Some(U256::one()));
        assert_eq!(second.logs.len(), 1);
    }

    #[test]
    fn test_evicted_key_no_longer_decrypts() {
        let service = test_service();
        let unit = ring_unit(&service);
        rotate(&service, unit, 1);
        let first = newest_key(&service, unit);

        rotate(&service, unit, K);

        let receipt = service.submit(ALICE, unit, &sealed_mint(&first, 10, 1), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::DecryptionFailed));
        assert_eq!(balance(&service, unit, ALICE), U256::zero());

        let newest = newest_key(&service, unit);
        let receipt = service.submit(ALICE, unit, &sealed_mint(&newest, 10, 2), U256::zero());
        assert!(receipt.is_success());
        assert_eq!(balance(&service, unit, ALICE), U256::from(10));
    }

    #[test]
    fn test_every_active_key_decrypts() {
        let service = test_service();
        let unit = ring_unit(&service);
        rotate(&service, unit, K + 3);

        for (index, (_, key)) in service.ring_public_keys(unit).iter().enumerate() {
            let receipt =
                service.submit(ALICE, unit, &sealed_mint(key, 1, index as u64), U256::zero());
            assert!(receipt.is_success(), "key {index} failed");
        }
        assert_eq!(balance(&service, unit, ALICE), U256::from(K as u64));
    }

    #[test]
    fn test_grace_window_keeps_evicted_key_usable() {
        let config = LedgerConfig {
            ring: RingConfig {
                grace: 1,
                ..RingConfig::default()
            },
            ..LedgerConfig::default()
        };
        let service = service_with(config);
        let unit = ring_unit(&service);
        rotate(&service, unit, 1);
        let first = newest_key(&service, unit);

        rotate(&service, unit, K);
        assert_eq!(service.ring_public_keys(unit).len(), K);

        let receipt = service.submit(ALICE, unit, &sealed_mint(&first, 4, 9), U256::zero());
        assert!(receipt.is_success());

        // A second eviction pushes the first key out of the grace window too.
        rotate(&service, unit, 1);
        let receipt = service.submit(ALICE, unit, &sealed_mint(&first, 4, 10), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_reject_policy_refuses_rotation_at_capacity() {
        let config = LedgerConfig {
            ring: RingConfig {
                eviction: EvictionPolicy::Reject,
                ..RingConfig::default()
            },
            ..LedgerConfig::default()
        };
        let service = service_with(config);
        let unit = ring_unit(&service);
        rotate(&service, unit, K);
        let before = service.ring_public_keys(unit);

        let receipt = service.update_ring_key(unit);

        assert_eq!(receipt.error_kind(), Some(ErrorKind::RingCapacityExceeded));
        assert_eq!(service.ring_public_keys(unit), before);
    }

    #[test]
    fn test_replayed_envelope_rejected() {
        let service = test_service();
        let unit = ring_unit(&service);
        rotate(&service, unit, 1);
        let envelope = sealed_mint(&newest_key(&service, unit), 10, 7);

        assert!(service.submit(ALICE, unit, &envelope, U256::zero()).is_success());
        let replay = service.submit(ALICE, unit, &envelope, U256::zero());

        assert_eq!(replay.error_kind(), Some(ErrorKind::DecryptionFailed));
        assert_eq!(balance(&service, unit, ALICE), U256::from(10));
        assert_eq!(service.stats().decryption_failures, 1);
    }

    #[test]
    fn test_plain_envelope_refused_by_ring_unit() {
        let service = test_service();
        let unit = ring_unit(&service);
        rotate(&service, unit, 1);

        let receipt = service.submit(ALICE, unit, &mint(ALICE, 10), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_plain_envelope_accepted_when_sealing_optional() {
        let config = LedgerConfig {
            require_sealed_for_ring_units: false,
            ..LedgerConfig::default()
        };
        let service = service_with(config);
        let unit = ring_unit(&service);

        let receipt = service.submit(ALICE, unit, &mint(ALICE, 10), U256::zero());
        assert!(receipt.is_success());
    }

    #[test]
    fn test_rotation_on_plain_unit_is_schema_mismatch() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");

        let receipt = service.update_ring_key(unit);
        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));
    }
}
