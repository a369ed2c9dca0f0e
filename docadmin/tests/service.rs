use serde_json::json;

use docadmin::{memory::InMemoryStore, prelude::*};

async fn service() -> CollectionService<InMemoryStore> {
    let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
    CollectionService::new(store, SchemaResolver::default())
}

async fn seeded() -> CollectionService<InMemoryStore> {
    let service = service().await;
    service
        .bulk_create(
            "products",
            vec![
                json!({ "name": "Red Widget", "price": 9.99, "sku": "W-1" }),
                json!({ "name": "Blue Widget", "price": 5, "sku": "W-2" }),
                json!({ "name": "Gadget", "sku": "G-1" }),
            ],
        )
        .await
        .unwrap();
    service
}

fn names(page: &DocumentPage) -> Vec<&str> {
    page.items.iter().filter_map(|doc| doc["name"].as_str()).collect()
}

#[tokio::test]
async fn test_create_and_get() {
    let service = service().await;

    let created = service
        .create_document("users", json!({ "_id": "not-an-id", "email": "a@x.com" }))
        .await
        .unwrap();

    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);
    assert_eq!(created["email"], "a@x.com");

    let fetched = service.get_document("users", &id).await.unwrap();
    assert_eq!(fetched, created);

    assert_eq!(service.list_collections().await.unwrap(), vec!["users".to_string()]);
}

#[tokio::test]
async fn test_get_errors() {
    let service = service().await;

    assert!(matches!(
        service.get_document("users", "nope").await,
        Err(StoreError::InvalidIdentifier(_))
    ));
    assert!(matches!(
        service.get_document("users", "507f1f77bcf86cd799439011").await,
        Err(StoreError::DocumentNotFound(_, _))
    ));
    assert!(matches!(
        service.create_document("users", json!([1, 2])).await,
        Err(StoreError::InvalidDocument(_))
    ));
}

#[tokio::test]
async fn test_update_merges_fields() {
    let service = service().await;
    let created = service
        .create_document("users", json!({ "email": "a@x.com", "age": 30 }))
        .await
        .unwrap();
    let id = created["_id"].as_str().unwrap();

    let updated = service
        .update_document("users", id, json!({ "_id": "507f1f77bcf86cd799439011", "age": 31 }))
        .await
        .unwrap();

    assert_eq!(updated["_id"], id);
    assert_eq!(updated["email"], "a@x.com");
    assert_eq!(updated["age"], 31);

    assert!(matches!(
        service.update_document("users", "507f1f77bcf86cd799439011", json!({ "age": 1 })).await,
        Err(StoreError::DocumentNotFound(_, _))
    ));
}

#[tokio::test]
async fn test_bulk_create_discards_client_ids() {
    let service = service().await;

    let created = service
        .bulk_create(
            "tags",
            vec![json!({ "_id": "507f1f77bcf86cd799439011", "label": "a" }), json!({ "label": "b" })],
        )
        .await
        .unwrap();

    assert_eq!(created.inserted_count, 2);
    assert!(!created.inserted_ids.contains(&"507f1f77bcf86cd799439011".to_string()));

    let first = service.get_document("tags", &created.inserted_ids[0]).await.unwrap();
    assert_eq!(first["label"], "a");
}

#[tokio::test]
async fn test_delete() {
    let service = seeded().await;
    let page = service.list_documents("products", ListOptions::default()).await.unwrap();
    let id = page.items[0]["_id"].as_str().unwrap().to_string();

    service.delete_document("products", &id).await.unwrap();

    assert!(matches!(
        service.delete_document("products", &id).await,
        Err(StoreError::DocumentNotFound(_, _))
    ));
    assert_eq!(service.list_documents("products", ListOptions::default()).await.unwrap().total, 2);
}

#[tokio::test]
async fn test_bulk_delete_skips_malformed_ids() {
    let service = seeded().await;
    let page = service.list_documents("products", ListOptions::default()).await.unwrap();
    let mut ids: Vec<String> = page
        .items
        .iter()
        .take(2)
        .map(|doc| doc["_id"].as_str().unwrap().to_string())
        .collect();
    ids.push("garbage".to_string());

    let outcome = service.bulk_delete("products", &ids).await.unwrap();
    assert_eq!(outcome, BulkDeleted { deleted_count: 2, total: 3 });

    let outcome = service.bulk_delete("products", &["garbage".to_string()]).await.unwrap();
    assert_eq!(outcome, BulkDeleted { deleted_count: 0, total: 1 });
}

#[tokio::test]
async fn test_bulk_update_replaces_and_reports_errors() {
    let service = seeded().await;
    let page = service
        .list_documents("products", ListOptions::default().sort("name", SortDirection::Asc))
        .await
        .unwrap();
    let ids: Vec<String> = page
        .items
        .iter()
        .map(|doc| doc["_id"].as_str().unwrap().to_string())
        .collect();
    let gadget = page.items[1].clone();

    let outcome = service
        .bulk_update(
            "products",
            vec![
                BulkUpdate::new(&ids[0], json!({ "_id": "ignored", "name": "Navy Widget" })),
                BulkUpdate::new(&ids[1], json!({ "name": "Gadget", "sku": "G-1" })),
                BulkUpdate::new("507f1f77bcf86cd799439011", json!({ "name": "Ghost" })),
                BulkUpdate::new("garbage", json!({ "name": "Nope" })),
                BulkUpdate { id: None, data: json!({ "name": "Nope" }) },
            ],
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BulkUpdated {
            updated_count: 1,
            matched_count: 2,
            total: 5,
            errors: Some(vec![
                "Invalid _id format: garbage".to_string(),
                "Missing _id in update operation".to_string(),
            ]),
        }
    );

    let replaced = service.get_document("products", &ids[0]).await.unwrap();
    assert_eq!(replaced, json!({ "_id": ids[0], "name": "Navy Widget" }));
    assert_eq!(service.get_document("products", &ids[1]).await.unwrap(), gadget);

    let total = service.list_documents("products", ListOptions::default()).await.unwrap().total;
    assert_eq!(total, 3);
}

#[tokio::test]
async fn test_bulk_update_without_errors_reports_none() {
    let service = seeded().await;
    let page = service.list_documents("products", ListOptions::default()).await.unwrap();
    let id = page.items[0]["_id"].as_str().unwrap().to_string();

    let outcome = service
        .bulk_update("products", vec![BulkUpdate::new(&id, json!({ "name": "Renamed" }))])
        .await
        .unwrap();

    assert_eq!(outcome.errors, None);
    assert_eq!(outcome.updated_count, 1);
}

#[tokio::test]
async fn test_bulk_requests_are_capped() {
    let service = service().await;

    let at_limit = (0..MAX_BULK_ITEMS).map(|n| json!({ "n": n })).collect();
    let created = service.bulk_create("items", at_limit).await.unwrap();
    assert_eq!(created.inserted_count, 1000);

    let over_limit: Vec<_> = (0..=MAX_BULK_ITEMS).map(|n| json!({ "n": n })).collect();
    assert_eq!(over_limit.len(), 1001);
    assert!(matches!(
        service.bulk_create("items", over_limit).await,
        Err(StoreError::InvalidDocument(_))
    ));

    let updates = created
        .inserted_ids
        .iter()
        .map(|id| BulkUpdate::new(id, json!({ "n": -1 })))
        .collect();
    let updated = service.bulk_update("items", updates).await.unwrap();
    assert_eq!(updated.matched_count, 1000);

    let too_many_updates = (0..=MAX_BULK_ITEMS)
        .map(|_| BulkUpdate::new("garbage", json!({})))
        .collect();
    assert!(matches!(
        service.bulk_update("items", too_many_updates).await,
        Err(StoreError::InvalidDocument(_))
    ));

    let mut ids = created.inserted_ids.clone();
    ids.push("garbage".to_string());
    assert!(matches!(
        service.bulk_delete("items", &ids).await,
        Err(StoreError::InvalidDocument(_))
    ));

    let deleted = service.bulk_delete("items", &created.inserted_ids).await.unwrap();
    assert_eq!(deleted, BulkDeleted { deleted_count: 1000, total: 1000 });
}

#[tokio::test]
async fn test_paging_and_sort() {
    let service = seeded().await;

    let page = service
        .list_documents("products", ListOptions::default().sort("name", SortDirection::Asc).skip(1).limit(1))
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.skip, 1);
    assert_eq!(page.limit, 1);
    assert_eq!(names(&page), vec!["Gadget"]);
    assert!(page.has_more());
}

#[tokio::test]
async fn test_page_size_is_capped() {
    let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
    let service = CollectionService::new(store, SchemaResolver::default()).with_max_page_size(2);
    service
        .bulk_create("items", (0..5).map(|n| json!({ "n": n })).collect())
        .await
        .unwrap();

    let page = service.list_documents("items", ListOptions::default().limit(1000)).await.unwrap();

    assert_eq!(page.limit, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn test_search_and_filter() {
    let service = seeded().await;

    let page = service
        .list_documents("products", ListOptions::default().search("WIDGET"))
        .await
        .unwrap();
    assert_eq!(names(&page), vec!["Red Widget", "Blue Widget"]);

    let page = service
        .list_documents("products", ListOptions::default().search("g-1"))
        .await
        .unwrap();
    assert_eq!(names(&page), vec!["Gadget"]);

    let page = service
        .list_documents(
            "products",
            ListOptions::default().search("widget").filter(Filter::lt("price", 6)),
        )
        .await
        .unwrap();
    assert_eq!(names(&page), vec!["Blue Widget"]);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_schema_from_documents_and_models() {
    let service = seeded().await;

    let schema = service.schema("products", None).await.unwrap();
    assert_eq!(schema.source(), SchemaSource::Documents);
    assert_eq!(schema.sample_count(), 3);
    assert_eq!(schema.field("price").unwrap().types, vec![TypeTag::Float, TypeTag::Integer]);
    assert!(schema.field("price").unwrap().nullable);
    assert_eq!(schema.searchable_fields(), vec!["name", "sku"]);

    let schema = service.schema("products", Some(1)).await.unwrap();
    assert_eq!(schema.sample_count(), 1);

    let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
    let models = ModelRegistry::from_models(vec![
        ModelDefinition::new("Order")
            .field(FieldDefinition::new("status", "Literal['open', 'closed']"))
            .field(FieldDefinition::new("placed_at", "datetime")),
    ]);
    let service = CollectionService::new(store, SchemaResolver::new(models, ApiDeclarations::new()));

    let schema = service.schema("orders", None).await.unwrap();
    assert_eq!(schema.source(), SchemaSource::StructuredModel);
    assert_eq!(schema.filterable_fields(), vec!["status", "placed_at"]);
}

#[tokio::test]
async fn test_service_from_config() {
    let config = AdminConfig::from_json_str(r#"{ "store": { "type": "memory" }, "maxPageSize": 10 }"#).unwrap();
    let service = config.into_service(ModelRegistry::new(), ApiDeclarations::new()).await.unwrap();

    service.create_document("notes", json!({ "text": "hello" })).await.unwrap();

    let page = service.list_documents("notes", ListOptions::default()).await.unwrap();
    assert_eq!(page.limit, 10);
    assert_eq!(page.items[0]["text"], "hello");

    service.shutdown().await.unwrap();
}

#[cfg(not(feature = "mongodb"))]
#[tokio::test]
async fn test_mongodb_requires_feature() {
    let config = AdminConfig::from_json_str(
        r#"{ "store": { "type": "mongodb", "uri": "mongodb://localhost", "database": "db" } }"#,
    )
    .unwrap();

    assert!(matches!(config.connect().await, Err(StoreError::Initialization(_))));
}
