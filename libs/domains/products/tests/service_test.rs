mod common;

use common::{Harness, product};
use domain_products::{Pagination, Product, ProductError, ProductUseCase};
use std::sync::atomic::Ordering;
use uuid::Uuid;

#[tokio::test]
async fn test_create_then_get_round_trips() {
    let harness = Harness::new();
    let input = product("Tent");

    let created = harness.service.create(input.clone()).await.unwrap();
    assert!(!created.id.is_nil());
    assert_eq!(created.created_at, created.updated_at);

    let fetched = harness.service.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(
        Product {
            id: Uuid::nil(),
            created_at: input.created_at,
            updated_at: input.updated_at,
            ..fetched
        },
        input
    );
}

#[tokio::test]
async fn test_second_read_is_a_cache_hit() {
    let harness = Harness::new();
    let created = harness.service.create(product("Stove")).await.unwrap();

    let first = harness.service.get_by_id(created.id).await.unwrap();
    let second = harness.service.get_by_id(created.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.repository.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_undecodable_cache_entry_is_a_miss() {
    let harness = Harness::new();
    let created = harness.service.create(product("Lantern")).await.unwrap();
    harness.cache.poison(created.id);

    let fetched = harness.service.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(harness.repository.reads.load(Ordering::SeqCst), 1);
    // Repopulated with a good copy.
    harness.service.get_by_id(created.id).await.unwrap();
    assert_eq!(harness.repository.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_update_keeps_id_and_advances_updated_at() {
    let harness = Harness::new();
    let created = harness.service.create(product("Hammock")).await.unwrap();

    let mut previous = created.clone();
    for rating in [3, 4, 5] {
        let updated = harness
            .service
            .update(Product {
                id: created.id,
                rating,
                ..product("Hammock XL")
            })
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > previous.updated_at);
        assert_eq!(updated.rating, rating);
        previous = updated;
    }
}

#[tokio::test]
async fn test_update_refreshes_cached_copy() {
    let harness = Harness::new();
    let created = harness.service.create(product("Mat")).await.unwrap();
    harness.service.get_by_id(created.id).await.unwrap();

    harness
        .service
        .update(Product {
            id: created.id,
            ..product("Inflatable mat")
        })
        .await
        .unwrap();

    let fetched = harness.service.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.name, "Inflatable mat");
    assert_eq!(harness.repository.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let harness = Harness::new();
    let id = Uuid::now_v7();

    let result = harness.service.get_by_id(id).await;

    assert!(matches!(result, Err(ProductError::NotFound(missing)) if missing == id));
    assert!(!harness.cache.contains(id));
}

#[tokio::test]
async fn test_search_without_matches_is_empty() {
    let harness = Harness::new();
    harness.service.create(product("Tent")).await.unwrap();

    let list = harness
        .service
        .search("kayak", Pagination::default())
        .await
        .unwrap();

    assert_eq!(list.total_count, 0);
    assert_eq!(list.total_pages, 0);
    assert_eq!((list.page, list.size), (0, 0));
    assert!(!list.has_more);
    assert!(list.products.is_empty());
}

#[tokio::test]
async fn test_search_pages_through_matches() {
    let harness = Harness::new();
    for i in 0..7 {
        harness
            .service
            .create(product(&format!("Tent {i}")))
            .await
            .unwrap();
    }
    harness.service.create(product("Stove")).await.unwrap();

    let first = harness
        .service
        .search("TENT", Pagination::new(1, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(first.total_count, 7);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.products.len(), 3);
    assert!(first.has_more);

    let last = harness
        .service
        .search("tent", Pagination::new(3, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(last.products.len(), 1);
    assert!(!last.has_more);
}

#[tokio::test]
async fn test_publish_writes_json_to_intent_topics() {
    let harness = Harness::new();
    let id = Uuid::now_v7();

    harness.service.publish_create(product("Tarp")).await.unwrap();
    harness
        .service
        .publish_update(Product {
            id,
            ..product("Tarp")
        })
        .await
        .unwrap();

    let created: Vec<Product> = harness
        .create_topic
        .written()
        .iter()
        .map(|payload| serde_json::from_slice(payload).unwrap())
        .collect();
    let updated: Vec<Product> = harness
        .update_topic
        .written()
        .iter()
        .map(|payload| serde_json::from_slice(payload).unwrap())
        .collect();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "Tarp");
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].id, id);
    assert_eq!(harness.repository.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_publish_invalid_is_rejected_before_transport() {
    let harness = Harness::new();

    let result = harness
        .service
        .publish_create(Product {
            name: String::new(),
            ..product("Tarp")
        })
        .await;

    assert!(matches!(result, Err(ProductError::Validation(_))));
    assert!(harness.create_topic.written().is_empty());
}
