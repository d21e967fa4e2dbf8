use tests::{seeded_factory, ExecLog};

use maquette::{Draft, Error, Ref};
use maquette_core::driver::{operation::Transaction, Operation};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn transaction_ops(log: &ExecLog) -> Vec<Transaction> {
    log.with_ops(|ops| {
        ops.iter()
            .filter_map(|op| match op {
                Operation::Transaction(t) => Some(*t),
                _ => None,
            })
            .collect()
    })
}

#[tokio::test]
async fn work_error_rolls_back() {
    let (factory, log) = seeded_factory().await;

    let err = factory
        .with_transaction(|session| async move {
            session
                .persist_all(vec![Draft::new("Dealer").set("id", 7).set("name", "Fly by night")])
                .await?;

            Err::<(), _>(Error::constraint_violation("changed our mind"))
        })
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());

    assert_eq!(
        transaction_ops(&log),
        vec![Transaction::Start, Transaction::Rollback]
    );

    factory
        .with_transaction(|session| async move {
            assert!(session.find("Dealer", 7).await?.is_none());
            Ok(())
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn committed_work_is_visible_to_later_transactions() {
    let (factory, log) = seeded_factory().await;

    factory
        .with_transaction(|session| async move {
            session
                .persist_all(vec![Draft::new("Dealer").set("id", 7).set("name", "Here to stay")])
                .await
        })
        .await
        .unwrap();

    factory
        .with_transaction(|session| async move {
            assert!(session.find("Dealer", 7).await?.is_some());
            session.remove(&Ref::new("Dealer", 7)).await
        })
        .await
        .unwrap();

    assert_eq!(
        transaction_ops(&log),
        vec![
            Transaction::Start,
            Transaction::Commit,
            Transaction::Start,
            Transaction::Commit,
        ]
    );
}

#[tokio::test]
async fn identity_map_does_not_outlive_its_transaction() {
    let (factory, log) = seeded_factory().await;

    for _ in 0..2 {
        factory
            .with_transaction(|session| async move {
                assert!(session.find("Artist", 1).await?.is_some());
                Ok(())
            })
            .await
            .unwrap();
    }

    // Each scope starts cold: one lookup per transaction.
    let lookups = log.count(|op| {
        matches!(op, Operation::GetByKey(get) if get.table == "artist")
    });
    assert_eq!(2, lookups);
}

#[tokio::test]
async fn concurrent_finds_share_one_lookup() {
    let (factory, log) = seeded_factory().await;

    factory
        .with_transaction(|session| async move {
            let (a, b) = tokio::join!(
                session.find("Artist", 1),
                session.find("Artist", 1),
            );

            let a = a?.unwrap();
            let b = b?.unwrap();
            assert!(Arc::ptr_eq(&a, &b));

            Ok(())
        })
        .await
        .unwrap();

    let lookups = log.count(|op| {
        matches!(op, Operation::GetByKey(get) if get.table == "artist")
    });
    assert_eq!(1, lookups);
}

#[tokio::test]
async fn nested_scope_fails_fast() {
    let (factory, log) = seeded_factory().await;

    let err = factory
        .with_transaction(|_session| async {
            factory
                .with_transaction(|session| async move {
                    session.find("Artist", 1).await.map(|_| ())
                })
                .await
        })
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation(), "{err}");

    // The inner call never reached the driver; only the outer scope's
    // bracket is on the wire.
    assert_eq!(
        transaction_ops(&log),
        vec![Transaction::Start, Transaction::Rollback]
    );

    // The factory is still usable afterwards.
    factory
        .with_transaction(|session| async move {
            assert!(session.find("Artist", 1).await?.is_some());
            Ok(())
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_of_missing_row_fails() {
    let (factory, _log) = seeded_factory().await;

    let err = factory
        .with_transaction(|session| async move {
            session.remove(&Ref::new("Dealer", 3)).await
        })
        .await
        .unwrap_err();

    assert!(err.is_record_not_found(), "{err}");
}
