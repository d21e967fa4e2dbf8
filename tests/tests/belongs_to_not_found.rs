use tests::{seeded_factory, seeded_factory_with};

use maquette::{schema::NotFound, stmt::Value};
use maquette_core::driver::Operation;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn dangling_dealer_signals_an_error() {
    let (factory, _log) = seeded_factory_with(NotFound::Exception).await;

    factory
        .with_transaction(|session| async move {
            let painting = session
                .query("from Painting where name = 'Mona Lisa Missing Dealer'")
                .single()
                .await?;

            let err = session.fetch_one(&painting, "dealer").await.unwrap_err();
            assert!(err.is_dangling_reference(), "{err}");
            assert_eq!("dangling reference: entity `Dealer` key=3", err.to_string());

            // The author is untouched by the dealer's absence.
            let author = session.fetch_one(&painting, "author").await?.unwrap();
            assert_eq!(author.id(), &Value::I64(1));

            Ok(())
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn dangling_dealer_can_be_ignored() {
    let (factory, _log) = seeded_factory_with(NotFound::Ignore).await;

    factory
        .with_transaction(|session| async move {
            let painting = session
                .query("from Painting where name = 'Mona Lisa Missing Dealer'")
                .single()
                .await?;

            assert!(session.fetch_one(&painting, "dealer").await?.is_none());
            Ok(())
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn ignored_absence_is_cached() {
    let (factory, log) = seeded_factory_with(NotFound::Ignore).await;

    factory
        .with_transaction(|session| async move {
            let painting = session
                .query("from Painting where name = 'Mona Lisa Missing Dealer'")
                .single()
                .await?;

            for _ in 0..2 {
                assert!(session.fetch_one(&painting, "dealer").await?.is_none());
            }
            Ok(())
        })
        .await
        .unwrap();

    let dealer_lookups = log.count(|op| {
        matches!(op, Operation::GetByKey(get) if get.table == "dealer")
    });
    assert_eq!(1, dealer_lookups);
}

#[tokio::test]
async fn resolved_association_is_cached() {
    let (factory, log) = seeded_factory().await;

    factory
        .with_transaction(|session| async move {
            let painting = session
                .query("from Painting where name = 'Mona Lisa'")
                .single()
                .await?;

            let first = session.fetch_one(&painting, "author").await?.unwrap();
            let second = session.fetch_one(&painting, "author").await?.unwrap();
            assert!(std::sync::Arc::ptr_eq(&first, &second));

            Ok(())
        })
        .await
        .unwrap();

    let author_lookups = log.count(|op| {
        matches!(op, Operation::GetByKey(get) if get.table == "artist")
    });
    assert_eq!(1, author_lookups);
}

#[tokio::test]
async fn null_foreign_key_issues_no_lookup() {
    let (factory, log) = seeded_factory().await;

    factory
        .with_transaction(|session| async move {
            session
                .persist_all(vec![maquette::Draft::new("Painting")
                    .set("id", 6)
                    .set("name", "Unsold")
                    .set("author", 1)])
                .await?;

            let painting = session.find("Painting", 6).await?.unwrap();
            assert!(session.fetch_one(&painting, "dealer").await?.is_none());
            Ok(())
        })
        .await
        .unwrap();

    assert!(!log.any(|op| matches!(op, Operation::GetByKey(get) if get.table == "dealer")));
}
