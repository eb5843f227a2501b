mod common;

use engine::{EngineError, MoneyCents, TxFields, UpdateTransactionCmd};

use common::{at, balance_of, engine_with_db, ledger_sum, register, spend, wallet};

#[tokio::test]
async fn create_adds_amount_to_wallet() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();

    let tx = spend(&engine, alice, cash.id, food.id, "salary", 100, at(2024, 1, 10, 9)).await;

    assert_eq!(tx.amount, MoneyCents::new(100));
    assert_eq!(balance_of(&engine, alice, cash.id).await, 100);
}

#[tokio::test]
async fn update_reverses_old_amount_before_applying_new() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();
    let tx = spend(&engine, alice, cash.id, food.id, "salary", 100, at(2024, 1, 10, 9)).await;

    let updated = engine
        .update_transaction(UpdateTransactionCmd::new(
            alice,
            tx.id,
            TxFields::new(cash.id, food.id, "groceries", MoneyCents::new(-30), tx.occurred_at),
        ))
        .await
        .unwrap();

    assert_eq!(updated.name, "groceries");
    assert_eq!(balance_of(&engine, alice, cash.id).await, -30);
}

#[tokio::test]
async fn moving_transaction_between_wallets_moves_balance() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let bank = wallet(&engine, alice, "Bank", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();
    let tx = spend(&engine, alice, cash.id, food.id, "salary", 100, at(2024, 1, 10, 9)).await;

    engine
        .update_transaction(UpdateTransactionCmd::new(
            alice,
            tx.id,
            TxFields::new(bank.id, food.id, "salary", MoneyCents::new(100), tx.occurred_at),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, alice, cash.id).await, 0);
    assert_eq!(balance_of(&engine, alice, bank.id).await, 100);

    engine.delete_transaction(alice, tx.id).await.unwrap();
    assert_eq!(balance_of(&engine, alice, bank.id).await, 0);
    assert!(engine.wallet_transactions(alice, bank.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_move_to_unknown_wallet_rolls_back_reversal() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();
    let tx = spend(&engine, alice, cash.id, food.id, "salary", 100, at(2024, 1, 10, 9)).await;

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(
            alice,
            tx.id,
            TxFields::new(
                uuid::Uuid::new_v4(),
                food.id,
                "salary",
                MoneyCents::new(100),
                tx.occurred_at,
            ),
        ))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("wallet doesn't exist".to_string()));
    assert_eq!(balance_of(&engine, alice, cash.id).await, 100);
    let stored = engine.transaction(alice, tx.id).await.unwrap();
    assert_eq!(stored.wallet_id, cash.id);
}

#[tokio::test]
async fn updates_cannot_reach_into_another_users_data() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();
    let bobs_wallet = wallet(&engine, bob, "Bob's", 0).await;
    let bobs_category = engine.create_category(bob, "Bob's").await.unwrap();
    let tx = spend(&engine, alice, cash.id, food.id, "salary", 100, at(2024, 1, 10, 9)).await;

    let attempts = [
        // bob rewriting alice's transaction inside alice's own wallet
        UpdateTransactionCmd::new(
            bob,
            tx.id,
            TxFields::new(cash.id, food.id, "salary", MoneyCents::new(1), tx.occurred_at),
        ),
        // alice moving her transaction into bob's wallet
        UpdateTransactionCmd::new(
            alice,
            tx.id,
            TxFields::new(bobs_wallet.id, food.id, "salary", MoneyCents::new(100), tx.occurred_at),
        ),
        // alice pointing her transaction at bob's category
        UpdateTransactionCmd::new(
            alice,
            tx.id,
            TxFields::new(cash.id, bobs_category.id, "salary", MoneyCents::new(100), tx.occurred_at),
        ),
    ];
    for cmd in attempts {
        assert!(matches!(
            engine.update_transaction(cmd).await,
            Err(EngineError::KeyNotFound(_))
        ));
        assert_eq!(balance_of(&engine, alice, cash.id).await, 100);
        assert_eq!(balance_of(&engine, bob, bobs_wallet.id).await, 0);
    }

    let stored = engine.transaction(alice, tx.id).await.unwrap();
    assert_eq!((stored.wallet_id, stored.category_id), (cash.id, food.id));
    assert_eq!(stored.amount, MoneyCents::new(100));
    assert!(engine.wallet_transactions(bob, bobs_wallet.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_succeeds_next_to_an_overwritten_limit_balance() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();
    let tx = spend(&engine, alice, cash.id, food.id, "lunch", -100, at(2024, 1, 10, 12)).await;
    engine
        .update_wallet(alice, cash.id, "Cash", MoneyCents::new(engine::MAX_ABS_CENTS))
        .await
        .unwrap();

    engine.delete_transaction(alice, tx.id).await.unwrap();

    assert_eq!(
        balance_of(&engine, alice, cash.id).await,
        engine::MAX_ABS_CENTS + 100
    );
    assert!(engine.list_transactions(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_with_unknown_category_writes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;

    let err = engine
        .create_transaction(engine::CreateTransactionCmd::new(
            alice,
            TxFields::new(
                cash.id,
                uuid::Uuid::new_v4(),
                "coffee",
                MoneyCents::new(-350),
                at(2024, 1, 1, 8),
            ),
        ))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("category doesn't exist".to_string()));
    assert_eq!(balance_of(&engine, alice, cash.id).await, 0);
    assert!(engine.list_transactions(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn balance_tracks_ledger_through_mixed_operations() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let bank = wallet(&engine, alice, "Bank", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();
    let rent = engine.create_category(alice, "Rent").await.unwrap();

    let a = spend(&engine, alice, cash.id, food.id, "lunch", -1_250, at(2024, 3, 1, 12)).await;
    let b = spend(&engine, alice, bank.id, rent.id, "rent", -80_000, at(2024, 3, 2, 9)).await;
    let c = spend(&engine, alice, bank.id, food.id, "refund", 4_000, at(2024, 3, 3, 9)).await;
    spend(&engine, alice, cash.id, food.id, "dinner", -2_199, at(2024, 3, 4, 20)).await;

    engine
        .update_transaction(UpdateTransactionCmd::new(
            alice,
            a.id,
            TxFields::new(bank.id, rent.id, "lunch", MoneyCents::new(-1_300), a.occurred_at),
        ))
        .await
        .unwrap();
    engine
        .update_transaction(UpdateTransactionCmd::new(
            alice,
            b.id,
            TxFields::new(cash.id, rent.id, "rent", MoneyCents::new(-75_000), b.occurred_at)
                .description("negotiated"),
        ))
        .await
        .unwrap();
    engine.delete_transaction(alice, c.id).await.unwrap();

    for w in [cash.id, bank.id] {
        assert_eq!(
            balance_of(&engine, alice, w).await,
            ledger_sum(&engine, alice, w).await
        );
    }
    assert_eq!(balance_of(&engine, alice, cash.id).await, -77_199);
    assert_eq!(balance_of(&engine, alice, bank.id).await, -1_300);
}

#[tokio::test]
async fn concurrent_creates_do_not_lose_updates() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();

    let engine = std::sync::Arc::new(engine);
    let mut handles = Vec::new();
    for i in 0..10_i64 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            spend(&engine, alice, cash.id, food.id, "tip", i + 1, at(2024, 5, 1, 10)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(balance_of(&engine, alice, cash.id).await, 55);
    assert_eq!(ledger_sum(&engine, alice, cash.id).await, 55);
}

#[tokio::test]
async fn out_of_range_amount_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", engine::MAX_ABS_CENTS).await;
    let food = engine.create_category(alice, "Food").await.unwrap();

    let err = engine
        .create_transaction(engine::CreateTransactionCmd::new(
            alice,
            TxFields::new(cash.id, food.id, "bonus", MoneyCents::new(1), at(2024, 1, 1, 0)),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(balance_of(&engine, alice, cash.id).await, engine::MAX_ABS_CENTS);
}

#[tokio::test]
async fn blank_transaction_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let cash = wallet(&engine, alice, "Cash", 0).await;
    let food = engine.create_category(alice, "Food").await.unwrap();

    let err = engine
        .create_transaction(engine::CreateTransactionCmd::new(
            alice,
            TxFields::new(cash.id, food.id, "   ", MoneyCents::new(1), at(2024, 1, 1, 0)),
        ))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidName("transaction name must not be empty".to_string())
    );
}
