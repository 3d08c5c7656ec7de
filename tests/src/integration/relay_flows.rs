//! # Relay Flows
//!
//! Indirection units forwarding opaque envelopes through the service.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cl_ledger::prelude::*;

    fn relay_to(service: &TestService, target: Address) -> Address {
        service
            .create(
                "indirection",
                ConstructorArgs::from_deployer(DEPLOYER).with_relay_target(target),
            )
            .expect("indirection template deploys")
    }

    #[test]
    fn test_proxy_forward_mints_on_target_ledger() {
        let service = test_service();
        let token = deploy(&service, "MyToken");
        let relay = relay_to(&service, token);

        let envelope = proxy_forward(token, mint(ALICE, 10));
        let receipt = service.submit(ALICE, relay, &envelope, U256::zero());

        assert!(receipt.is_success());
        assert_eq!(receipt.unit, relay);
        assert_eq!(receipt.logs[0].address, token);
        assert_eq!(balance(&service, token, ALICE), U256::from(10));
        assert_eq!(balance(&service, relay, ALICE), U256::zero());
    }

    #[test]
    fn test_forward_reaches_sealed_target() {
        let service = test_service();
        let vault = deploy(&service, "ring-key");
        assert!(service.update_ring_key(vault).is_success());
        let key = service.ring_public_keys(vault)[0].1;
        let relay = relay_to(&service, vault);

        let payload = sealed("mint(address,uint256)", address_amount(BOB, 8), &key, 21);
        let forward = plain("forward(bytes)", vec![Bytes::from(payload)]);

        assert!(service.submit(ALICE, relay, &forward, U256::zero()).is_success());
        assert_eq!(balance(&service, vault, BOB), U256::from(8));
    }

    #[test]
    fn test_unreachable_target_leaves_ledger_untouched() {
        let service = test_service();
        let token = deploy(&service, "MyToken");
        let relay = relay_to(&service, token);
        let nowhere = Address::new([0xEE; 20]);

        let envelope = proxy_forward(nowhere, mint(ALICE, 10));
        let receipt = service.submit(ALICE, relay, &envelope, U256::zero());

        assert_eq!(receipt.error_kind(), Some(ErrorKind::TargetUnreachable));
        assert!(receipt.logs.is_empty());
        assert_eq!(balance(&service, token, ALICE), U256::zero());
        assert_eq!(balance(&service, relay, ALICE), U256::zero());
    }

    #[test]
    fn test_destroyed_target_unreachable_until_recreated() {
        let service = test_service();
        let token = deploy(&service, "MyTokenSelfDestruct");
        let relay = relay_to(&service, token);
        assert!(service.destroy(token).is_success());

        let envelope = proxy_forward(token, mint(ALICE, 2));
        let receipt = service.submit(ALICE, relay, &envelope, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::TargetUnreachable));

        service.recreate(token).expect("unit existed");
        assert!(service.submit(ALICE, relay, &envelope, U256::zero()).is_success());
        assert_eq!(balance(&service, token, ALICE), U256::from(2));
    }

    #[test]
    fn test_target_failure_kind_propagates() {
        let service = test_service();
        let token = deploy(&service, "MyToken");
        let relay = relay_to(&service, token);

        let overdraw = proxy_forward(token, transfer(BOB, 1));
        let receipt = service.submit(ALICE, relay, &overdraw, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::InsufficientBalance));

        let not_destroyable = proxy_forward(token, destroy());
        let receipt = service.submit(ALICE, relay, &not_destroyable, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));
    }

    #[test]
    fn test_forward_carries_caller_authority() {
        let service = test_service();
        let token = deploy(&service, "MyToken");
        let relay = relay_to(&service, token);
        service.submit(ALICE, token, &mint(ALICE, 10), U256::zero());

        let forward = plain("forward(bytes)", vec![Bytes::from(transfer(CAROL, 3))]);
        assert!(service.submit(ALICE, relay, &forward, U256::zero()).is_success());

        // The relay itself holds nothing, so the same call as BOB fails.
        let receipt = service.submit(BOB, relay, &forward, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::InsufficientBalance));
        assert_eq!(balance(&service, token, CAROL), U256::from(3));
    }
}
