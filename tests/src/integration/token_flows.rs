//! # Token Flows
//!
//! End-to-end balance scenarios through the service entrypoints, including
//! the ledger surviving destruction and re-creation of its unit.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cl_ledger::prelude::*;

    #[test]
    fn test_mint_credits_recipient() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");

        let receipt = service.submit(ALICE, unit, &mint(ALICE, 10), U256::zero());

        assert!(receipt.is_success());
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(balance(&service, unit, ALICE), U256::from(10));
    }

    #[test]
    fn test_ledger_survives_destroy_and_recreate() {
        let service = test_service();
        let unit = deploy(&service, "MyTokenSelfDestruct");
        let ledger = service.ledger_of(unit);

        assert!(service.submit(ALICE, unit, &mint(ALICE, 10), U256::zero()).is_success());
        assert!(service.destroy(unit).is_success());
        assert_eq!(service.unit_state(unit), UnitState::Destroyed);

        // Reads go through the ledger, not the unit.
        assert_eq!(balance(&service, unit, ALICE), U256::from(10));

        assert_eq!(service.recreate(unit).expect("unit existed"), unit);
        assert_eq!(service.ledger_of(unit), ledger);
        assert!(service.submit(ALICE, unit, &mint(ALICE, 10), U256::zero()).is_success());

        assert_eq!(balance(&service, unit, ALICE), U256::from(20));
        assert_eq!(service.check_invariants(), InvariantCheckResult::Valid);
    }

    #[test]
    fn test_destroyed_unit_rejects_calls_until_recreated() {
        let service = test_service();
        let unit = deploy(&service, "MyTokenSelfDestruct");
        assert!(service.destroy(unit).is_success());

        let receipt = service.submit(ALICE, unit, &mint(ALICE, 5), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::UnitNotLive));
        assert!(receipt.logs.is_empty());
        assert_eq!(balance(&service, unit, ALICE), U256::zero());

        service.recreate(unit).expect("unit existed");
        assert!(service.submit(ALICE, unit, &mint(ALICE, 5), U256::zero()).is_success());
        assert_eq!(balance(&service, unit, ALICE), U256::from(5));
    }

    #[test]
    fn test_second_unit_attached_to_existing_ledger() {
        let service = test_service();
        let first = deploy(&service, "MyToken");
        let ledger = service.ledger_of(first).expect("unit has a ledger");

        let second = service
            .create(
                "MyToken",
                ConstructorArgs::from_deployer(DEPLOYER).attach_to(ledger),
            )
            .expect("ledger exists");
        assert_ne!(first, second);

        assert!(service.submit(ALICE, first, &mint(ALICE, 3), U256::zero()).is_success());
        assert!(service.submit(ALICE, second, &mint(ALICE, 4), U256::zero()).is_success());

        assert_eq!(
            service.balance_of(LedgerRef::Ledger(ledger), ALICE),
            U256::from(7)
        );
        assert_eq!(balance(&service, second, ALICE), U256::from(7));
    }

    #[test]
    fn test_attach_to_unknown_ledger_fails() {
        let service = test_service();
        let err = service
            .create(
                "MyToken",
                ConstructorArgs::from_deployer(DEPLOYER).attach_to(LedgerId(99)),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_transfer_moves_balance() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");
        service.submit(ALICE, unit, &mint(ALICE, 10), U256::zero());

        let receipt = service.submit(ALICE, unit, &transfer(BOB, 4), U256::zero());

        assert!(receipt.is_success());
        assert_eq!(balance(&service, unit, ALICE), U256::from(6));
        assert_eq!(balance(&service, unit, BOB), U256::from(4));
    }

    #[test]
    fn test_overdrawn_transfer_changes_nothing() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");
        service.submit(ALICE, unit, &mint(ALICE, 3), U256::zero());

        let receipt = service.submit(ALICE, unit, &transfer(BOB, 4), U256::zero());

        assert_eq!(receipt.error_kind(), Some(ErrorKind::InsufficientBalance));
        assert_eq!(balance(&service, unit, ALICE), U256::from(3));
        assert_eq!(balance(&service, unit, BOB), U256::zero());
    }

    #[test]
    fn test_approve_then_transfer_from() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");
        service.submit(ALICE, unit, &mint(ALICE, 10), U256::zero());

        let approve = plain("approve(address,uint256)", address_amount(CAROL, 6));
        assert!(service.submit(ALICE, unit, &approve, U256::zero()).is_success());

        let spend = plain(
            "transferFrom(address,address,uint256)",
            vec![
                Bytes::from_address(ALICE),
                Bytes::from_address(BOB),
                Bytes::from_u256(U256::from(5)),
            ],
        );
        assert!(service.submit(CAROL, unit, &spend, U256::zero()).is_success());

        let remaining = plain(
            "allowance(address,address)",
            vec![Bytes::from_address(ALICE), Bytes::from_address(CAROL)],
        );
        let receipt = service.submit(ALICE, unit, &remaining, U256::zero());
        assert_eq!(receipt.output_u256(), Some(U256::one()));

        // Allowance of 1 left: a second spend of 5 is refused.
        let receipt = service.submit(CAROL, unit, &spend, U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::InsufficientBalance));
        assert_eq!(balance(&service, unit, BOB), U256::from(5));
    }

    #[test]
    fn test_sequential_mints_accumulate() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");

        for amount in 1..=5 {
            assert!(service.submit(ALICE, unit, &mint(ALICE, amount), U256::zero()).is_success());
        }

        assert_eq!(balance(&service, unit, ALICE), U256::from(15));
        let supply = service.submit(BOB, unit, &plain("totalSupply()", vec![]), U256::zero());
        assert_eq!(supply.output_u256(), Some(U256::from(15)));
    }

    #[test]
    fn test_zero_amount_mint_rejected() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");

        let receipt = service.submit(ALICE, unit, &mint(ALICE, 0), U256::zero());
        assert_eq!(receipt.error_kind(), Some(ErrorKind::InvalidAmount));
    }

    #[test]
    fn test_balance_of_via_envelope() {
        let service = test_service();
        let unit = deploy(&service, "MyToken");
        service.submit(ALICE, unit, &mint(ALICE, 42), U256::zero());

        let receipt = service.submit(BOB, unit, &balance_of(ALICE), U256::zero());
        assert_eq!(receipt.output_u256(), Some(U256::from(42)));
        assert!(receipt.logs.is_empty());
    }
}
