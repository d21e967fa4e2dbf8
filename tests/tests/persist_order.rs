use tests::{gallery_registry, logged_factory, seed};

use maquette::schema::{BelongsTo, Entity, Registry};
use maquette::{Draft, SessionFactory};
use maquette_core::driver::Operation;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn targets_are_inserted_before_dependents() {
    let (factory, log) = logged_factory(gallery_registry());
    seed(&factory).await.unwrap();

    // Tables in insert order; a painting's author and dealer must both land
    // before the painting does.
    let tables: Vec<String> = log.with_ops(|ops| {
        ops.iter()
            .filter_map(|op| match op {
                Operation::Insert(insert) => Some(insert.table.clone()),
                _ => None,
            })
            .collect()
    });

    let first_painting = tables.iter().position(|t| t == "painting").unwrap();
    let last_artist = tables.iter().rposition(|t| t == "artist").unwrap();
    let last_dealer = tables.iter().rposition(|t| t == "dealer").unwrap();

    assert!(last_artist < first_painting, "{tables:?}");
    assert!(last_dealer < first_painting, "{tables:?}");
    assert_eq!(5, tables.len());
}

#[tokio::test]
async fn dependency_cycles_are_rejected() {
    let mut builder = Registry::builder();
    builder
        .register(Entity::new("Node").belongs_to("next", BelongsTo::new("Node", "next_id")))
        .unwrap();
    let (factory, _log) = logged_factory(builder.build().unwrap());

    let err = factory
        .with_transaction(|session| async move {
            session
                .persist_all(vec![
                    Draft::new("Node").set("id", 1).set("next", 2),
                    Draft::new("Node").set("id", 2).set("next", 1),
                ])
                .await
        })
        .await
        .unwrap_err();

    assert!(err.is_constraint_violation(), "{err}");
}

#[tokio::test]
async fn duplicate_batch_identifiers_are_rejected() {
    let (factory, _log) = logged_factory(gallery_registry());

    let err = factory
        .with_transaction(|session| async move {
            session
                .persist_all(vec![
                    Draft::new("Artist").set("id", 1).set("name", "One"),
                    Draft::new("Artist").set("id", 1).set("name", "Other"),
                ])
                .await
        })
        .await
        .unwrap_err();

    assert!(err.is_constraint_violation(), "{err}");
}

#[tokio::test]
async fn draft_requires_an_identifier() {
    let (factory, _log) = logged_factory(gallery_registry());

    let err = factory
        .with_transaction(|session| async move {
            session
                .persist_all(vec![Draft::new("Artist").set("name", "Anonymous")])
                .await
        })
        .await
        .unwrap_err();

    assert!(err.is_constraint_violation(), "{err}");
}

#[tokio::test]
async fn collection_fields_cannot_be_assigned() {
    let (factory, _log) = logged_factory(gallery_registry());

    let err = factory
        .with_transaction(|session| async move {
            session
                .persist_all(vec![Draft::new("Artist")
                    .set("id", 1)
                    .set("name", "Grand Master Painter")
                    .set("paintings", 4)])
                .await
        })
        .await
        .unwrap_err();

    assert!(err.is_constraint_violation(), "{err}");
}

#[tokio::test]
async fn unknown_draft_field_is_rejected() {
    let (factory, _log) = logged_factory(gallery_registry());

    let err = run_persist(
        &factory,
        Draft::new("Artist").set("id", 1).set("age", 512),
    )
    .await;
    assert!(err.is_unknown_field(), "{err}");
}

async fn run_persist(factory: &SessionFactory, draft: Draft) -> maquette::Error {
    factory
        .with_transaction(|session| async move { session.persist_all(vec![draft]).await })
        .await
        .unwrap_err()
}
