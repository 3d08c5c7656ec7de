//! # Lifecycle Abuse
//!
//! Attack: drive units through lifecycle transitions they should not allow,
//! or smuggle value and lifecycle calls past the dispatcher.
//!
//! Expected: destroyed and unknown units answer `UnitNotLive`, templates
//! without `destroy()` cannot be destroyed, and no path loses a balance.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cl_ledger::prelude::*;

    #[test]
    fn test_plain_unit_cannot_be_destroyed() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");

        let receipt = service.destroy(unit);
        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));

        let receipt = service.submit(ALICE, unit, &destroy(), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));
        assert_eq!(service.unit_state(unit), UnitState::Alive);
    }

    #[test]
    fn test_double_destroy() {
        let service = test_service();
        let unit = deploy(&service, "MyTokenSelfDestruct");

        assert!(service.destroy(unit).is_success());
        assert_eq!(service.destroy(unit).error_kind(), Some(ErrorKind::UnitNotLive));
        assert_eq!(
            service.submit(ALICE, unit, &destroy(), U256::zero()).error_kind(),
            Some(ErrorKind::UnitNotLive)
        );
        assert_eq!(service.stats().units_destroyed, 1);
    }

    #[test]
    fn test_unknown_address() {
        let service = test_service();
        let ghost = Address::new([0x42; 20]);

        let receipt = service.submit(ALICE, ghost, &mint(ALICE, 1), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::UnitNotLive));
        assert_eq!(service.unit_state(ghost), UnitState::Uninitialized);
        assert_eq!(
            service.recreate(ghost).map_err(|err| err.kind()),
            Err(ErrorKind::UnitNotLive)
        );
        assert_eq!(service.destroy(ghost).error_kind(), Some(ErrorKind::UnitNotLive));
        assert_eq!(service.balance_of(LedgerRef::Unit(ghost), ALICE), U256::zero());
        assert!(service.ring_public_keys(ghost).is_empty());
    }

    #[test]
    fn test_recreate_live_unit_changes_nothing() {
        let service = test_service();
        let unit = deploy(&service, "MyTokenSelfDestruct");
        service.submit(ALICE, unit, &mint(ALICE, 9), U256::zero());

        assert_eq!(service.recreate(unit).expect("unit exists"), unit);

        assert_eq!(service.unit_state(unit), UnitState::Alive);
        assert_eq!(service.stats().units_recreated, 0);
        assert_eq!(balance(&service, unit, ALICE), U256::from(9));
    }

    #[test]
    fn test_value_attached_to_call_rejected() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");

        let receipt = service.submit(ALICE, unit, &mint(ALICE, 10), U256::from(1));

        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));
        assert_eq!(balance(&service, unit, ALICE), U256::zero());
    }

    #[test]
    fn test_destroy_through_relay_keeps_ledger() {
        let service = test_service();
        let token = deploy(&service, "MyTokenSelfDestruct");
        let relay = service
            .create("indirection", ConstructorArgs::from_deployer(DEPLOYER))
            .expect("indirection template deploys");
        service.submit(ALICE, token, &mint(ALICE, 10), U256::zero());

        let receipt = service.submit(BOB, relay, &proxy_forward(token, destroy()), U256::zero());

        assert!(receipt.is_success());
        assert_eq!(service.unit_state(token), UnitState::Destroyed);
        assert_eq!(service.stats().units_destroyed, 1);
        assert_eq!(balance(&service, token, ALICE), U256::from(10));

        service.recreate(token).expect("unit existed");
        assert!(service.submit(ALICE, token, &transfer(BOB, 10), U256::zero()).is_success());
        assert_eq!(balance(&service, token, BOB), U256::from(10));
    }

    #[test]
    fn test_selector_from_another_template_refused() {
        let service = test_service();
        let token = deploy(&service, "MyTokenSelfDestruct");
        let ring = deploy(&service, "ring-key");

        let forward = plain("forward(bytes)", vec![Bytes::from(mint(ALICE, 1))]);
        let receipt = service.submit(ALICE, token, &forward, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));

        let rotate = plain("updateRingKey()", vec![]);
        let receipt = service.submit(ALICE, token, &rotate, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));
        assert!(service.ring_public_keys(ring).is_empty());
    }

    #[test]
    fn test_wrong_argument_width_is_schema_mismatch() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");

        let short_amount = plain(
            "mint(address,uint256)",
            vec![Bytes::from_address(ALICE), Bytes::from(vec![10u8])],
        );
        let receipt = service.submit(ALICE, unit, &short_amount, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));

        let missing_arg = plain("mint(address,uint256)", vec![Bytes::from_address(ALICE)]);
        let receipt = service.submit(ALICE, unit, &missing_arg, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::SchemaMismatch));
        assert_eq!(balance(&service, unit, ALICE), U256::zero());
    }

    #[test]
    fn test_recreated_address_keeps_template() {
        let service = test_service();
        let unit = deploy(&service, "MyTokenSelfDestruct");
        let other = deploy(&service, "MyToken");
        assert_ne!(unit, other);

        assert!(service.destroy(unit).is_success());
        service.recreate(unit).expect("unit existed");

        // Still destroyable after coming back.
        assert!(service.destroy(unit).is_success());
        assert_eq!(service.stats().units_destroyed, 2);
        assert_eq!(service.stats().units_created, 2);
    }
}
