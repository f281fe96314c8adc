//! Macro-generated test suite for `CustomerStore` contract validation.
//!
//! The `customer_store_tests!` macro generates a test module that validates
//! any `CustomerStore` implementation against the full contract: customer and
//! address CRUD, cascade delete, phone uniqueness, the query engine, summary
//! counts, and concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use crm::storage::InMemoryCustomerStore;
//!
//! customer_store_tests!(InMemoryCustomerStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Customers
//! - `test_create_and_get`: create then retrieve, verify all fields
//! - `test_get_nonexistent`: unknown id returns None
//! - `test_ids_are_not_reused`: ids keep increasing after a delete
//! - `test_update_partial` / `test_update_empty_patch` / `test_update_nonexistent`
//! - `test_phone_number_unique`: on create and on update
//! - `test_update_nonexistent_with_taken_phone`: not found beats a phone conflict
//! - `test_delete_cascades` / `test_delete_nonexistent`
//!
//! ## Addresses
//! - `test_address_crud`: create, get, update, move, delete
//! - `test_customer_addresses_in_insertion_order`
//!
//! ## Query engine (over the sample data)
//! - search, location filters, sorting, pagination
//!
//! ## Edge Cases
//! - `test_concurrent_creates`: parallel creates from spawned tasks

/// Generate a full `CustomerStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to a fresh, empty store
/// implementing `CustomerStore + 'static`. It is re-evaluated for each test.
#[macro_export]
macro_rules! customer_store_tests {
    ($factory:expr) => {
        mod customer_store_contract_tests {
            use super::*;
            use crm::core::error::StoreError;
            use crm::core::model::{AddressPatch, CityCount, CustomerPatch};
            use crm::core::query::{CustomerQuery, LocationMatch, SortField, SortOrder};
            use crm::core::service::CustomerStore;
            use crm::storage::seed_sample_data;
            use std::sync::Arc;

            // ==================================================================
            // Customers
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = $factory;

                let created = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();
                assert!(created.id > 0);
                assert_eq!(created.first_name, "Asha");
                assert_eq!(created.last_name, "Rao");
                assert_eq!(created.phone_number, phone(1));

                let fetched = store.get_customer(created.id).await.unwrap();
                assert_eq!(fetched, Some(created));
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;

                assert!(store.get_customer(999).await.unwrap().is_none());
                assert!(store.get_address(999).await.unwrap().is_none());
                assert!(store.get_customer_addresses(999).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_ids_are_not_reused() {
                let store = $factory;

                let first = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();
                assert!(store.delete_customer(first.id).await.unwrap());

                let second = store
                    .create_customer(customer_payload("Vikram", "Iyer", 2))
                    .await
                    .unwrap();
                assert!(second.id > first.id);
            }

            #[tokio::test]
            async fn test_update_partial() {
                let store = $factory;
                let created = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();

                let patch = CustomerPatch {
                    last_name: Some("Menon".to_string()),
                    ..Default::default()
                };
                let updated = store
                    .update_customer(created.id, patch)
                    .await
                    .unwrap()
                    .unwrap();

                assert_eq!(updated.id, created.id);
                assert_eq!(updated.first_name, "Asha");
                assert_eq!(updated.last_name, "Menon");
                assert_eq!(updated.phone_number, created.phone_number);
                assert_eq!(store.get_customer(created.id).await.unwrap(), Some(updated));
            }

            #[tokio::test]
            async fn test_update_empty_patch() {
                let store = $factory;
                let created = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();

                let unchanged = store
                    .update_customer(created.id, CustomerPatch::default())
                    .await
                    .unwrap();
                assert_eq!(unchanged, Some(created));
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;

                let patch = CustomerPatch {
                    first_name: Some("Ghost".to_string()),
                    ..Default::default()
                };
                assert!(store.update_customer(42, patch).await.unwrap().is_none());
                assert!(
                    store
                        .update_address(42, AddressPatch::default())
                        .await
                        .unwrap()
                        .is_none()
                );
            }

            #[tokio::test]
            async fn test_phone_number_unique() {
                let store = $factory;
                let asha = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();
                let vikram = store
                    .create_customer(customer_payload("Vikram", "Iyer", 2))
                    .await
                    .unwrap();

                let err = store
                    .create_customer(customer_payload("Other", "Person", 1))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::PhoneNumberTaken(_)), "{:?}", err);

                let patch = CustomerPatch {
                    phone_number: Some(asha.phone_number.clone()),
                    ..Default::default()
                };
                let err = store.update_customer(vikram.id, patch).await.unwrap_err();
                assert!(matches!(err, StoreError::PhoneNumberTaken(_)), "{:?}", err);

                // The failed update left the record alone
                assert_eq!(store.get_customer(vikram.id).await.unwrap(), Some(vikram));
            }

            #[tokio::test]
            async fn test_update_nonexistent_with_taken_phone() {
                let store = $factory;
                let asha = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();

                // A missing id wins over a phone conflict
                let patch = CustomerPatch {
                    phone_number: Some(asha.phone_number.clone()),
                    ..Default::default()
                };
                let result = store.update_customer(asha.id + 100, patch).await;
                assert!(matches!(result, Ok(None)), "{:?}", result);
            }

            #[tokio::test]
            async fn test_delete_cascades() {
                let store = $factory;
                let asha = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();
                let vikram = store
                    .create_customer(customer_payload("Vikram", "Iyer", 2))
                    .await
                    .unwrap();
                let gone = store
                    .create_address(address_payload(asha.id, "Pune", "Maharashtra", "411001"))
                    .await
                    .unwrap();
                store
                    .create_address(address_payload(asha.id, "Pune", "Maharashtra", "411002"))
                    .await
                    .unwrap();
                let kept = store
                    .create_address(address_payload(vikram.id, "Kochi", "Kerala", "682001"))
                    .await
                    .unwrap();

                assert!(store.delete_customer(asha.id).await.unwrap());

                assert!(store.get_customer(asha.id).await.unwrap().is_none());
                assert!(store.get_customer_addresses(asha.id).await.unwrap().is_empty());
                assert!(store.get_address(gone.id).await.unwrap().is_none());
                assert_eq!(store.get_address(kept.id).await.unwrap(), Some(kept));

                let summary = store.summary().await.unwrap();
                assert_eq!(summary.total_customers, 1);
                assert_eq!(summary.total_addresses, 1);
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let store = $factory;

                assert!(!store.delete_customer(77).await.unwrap());
                assert!(!store.delete_address(77).await.unwrap());
            }

            // ==================================================================
            // Addresses
            // ==================================================================

            #[tokio::test]
            async fn test_address_crud() {
                let store = $factory;
                let asha = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();
                let vikram = store
                    .create_customer(customer_payload("Vikram", "Iyer", 2))
                    .await
                    .unwrap();

                let created = store
                    .create_address(address_payload(asha.id, "Pune", "Maharashtra", "411001"))
                    .await
                    .unwrap();
                assert_eq!(created.customer_id, asha.id);
                assert_eq!(created.city, "Pune");
                assert_eq!(store.get_address(created.id).await.unwrap(), Some(created.clone()));

                let patch = AddressPatch {
                    customer_id: Some(vikram.id),
                    pin_code: Some("411005".to_string()),
                    ..Default::default()
                };
                let moved = store
                    .update_address(created.id, patch)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(moved.customer_id, vikram.id);
                assert_eq!(moved.pin_code, "411005");
                assert_eq!(moved.city, "Pune");
                assert!(store.get_customer_addresses(asha.id).await.unwrap().is_empty());
                assert_eq!(
                    store.get_customer_addresses(vikram.id).await.unwrap(),
                    vec![moved.clone()]
                );

                assert!(store.delete_address(moved.id).await.unwrap());
                assert!(store.get_address(moved.id).await.unwrap().is_none());
                assert!(!store.delete_address(moved.id).await.unwrap());
            }

            #[tokio::test]
            async fn test_customer_addresses_in_insertion_order() {
                let store = $factory;
                let asha = store
                    .create_customer(customer_payload("Asha", "Rao", 1))
                    .await
                    .unwrap();
                for pin in ["411009", "411001", "411005"] {
                    store
                        .create_address(address_payload(asha.id, "Pune", "Maharashtra", pin))
                        .await
                        .unwrap();
                }

                let pins: Vec<String> = store
                    .get_customer_addresses(asha.id)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|a| a.pin_code)
                    .collect();
                assert_eq!(pins, vec!["411009", "411001", "411005"]);
            }

            // ==================================================================
            // Query engine
            // ==================================================================

            async fn seeded() -> impl CustomerStore {
                let store = $factory;
                seed_sample_data(&store).await.unwrap();
                store
            }

            #[tokio::test]
            async fn test_list_defaults() {
                let store = seeded().await;

                let page = store.list_customers(&CustomerQuery::new()).await.unwrap();
                assert_eq!(page.total, 5);
                assert_eq!(first_names(&page), vec!["Jane", "John", "Michael", "Priya", "Raj"]);
                let priya = &page.customers[3];
                assert_count(&priya.addresses, 3);
            }

            #[tokio::test]
            async fn test_list_empty_store() {
                let store = $factory;

                let page = store.list_customers(&CustomerQuery::new()).await.unwrap();
                assert_eq!(page.total, 0);
                assert!(page.customers.is_empty());
            }

            #[tokio::test]
            async fn test_search_matches_address_city() {
                let store = seeded().await;

                let page = store
                    .list_customers(&CustomerQuery::new().with_search("delhi"))
                    .await
                    .unwrap();
                assert_eq!(page.total, 1);
                assert_eq!(first_names(&page), vec!["Jane"]);
                assert_count(&page.customers[0].addresses, 2);
            }

            #[tokio::test]
            async fn test_search_matches_phone_and_pin() {
                let store = seeded().await;

                let page = store
                    .list_customers(&CustomerQuery::new().with_search("54321"))
                    .await
                    .unwrap();
                assert_eq!(first_names(&page), vec!["Michael"]);

                let page = store
                    .list_customers(&CustomerQuery::new().with_search("600042"))
                    .await
                    .unwrap();
                assert_eq!(first_names(&page), vec!["Priya"]);
            }

            #[tokio::test]
            async fn test_search_folds_non_ascii_case() {
                let store = $factory;
                store
                    .create_customer(customer_payload("Élodie", "Øster", 1))
                    .await
                    .unwrap();
                store
                    .create_customer(customer_payload("Elodie", "Oster", 2))
                    .await
                    .unwrap();

                let page = store
                    .list_customers(&CustomerQuery::new().with_search("ÉLODIE"))
                    .await
                    .unwrap();
                assert_eq!(first_names(&page), vec!["Élodie"]);

                let page = store
                    .list_customers(&CustomerQuery::new().with_search("øster"))
                    .await
                    .unwrap();
                assert_eq!(first_names(&page), vec!["Élodie"]);
            }

            #[tokio::test]
            async fn test_search_without_matches() {
                let store = seeded().await;

                let page = store
                    .list_customers(&CustomerQuery::new().with_search("nomatch"))
                    .await
                    .unwrap();
                assert_eq!(page.total, 0);
                assert!(page.customers.is_empty());
            }

            #[tokio::test]
            async fn test_sort_last_name_desc() {
                let store = seeded().await;

                let query =
                    CustomerQuery::new().sorted_by(SortField::LastName, SortOrder::Desc);
                let page = store.list_customers(&query).await.unwrap();
                let last_names: Vec<&str> = page
                    .customers
                    .iter()
                    .map(|c| c.customer.last_name.as_str())
                    .collect();
                assert_eq!(last_names, vec!["Smith", "Sharma", "Patel", "Johnson", "Doe"]);
            }

            #[tokio::test]
            async fn test_sort_ties_follow_creation_order() {
                let store = $factory;
                for (i, last) in ["First", "Second", "Third"].iter().enumerate() {
                    store
                        .create_customer(customer_payload("Sam", last, i as u32))
                        .await
                        .unwrap();
                }

                let query =
                    CustomerQuery::new().sorted_by(SortField::FirstName, SortOrder::Desc);
                let page = store.list_customers(&query).await.unwrap();
                let last_names: Vec<&str> = page
                    .customers
                    .iter()
                    .map(|c| c.customer.last_name.as_str())
                    .collect();
                assert_eq!(last_names, vec!["First", "Second", "Third"]);
            }

            #[tokio::test]
            async fn test_city_filter_narrows_addresses() {
                let store = seeded().await;
                // Give Jane a Chennai address next to her two Delhi ones
                let jane = store
                    .list_customers(&CustomerQuery::new().with_search("Jane"))
                    .await
                    .unwrap()
                    .customers
                    .remove(0);
                store
                    .create_address(address_payload(
                        jane.customer.id,
                        "Chennai",
                        "Tamil Nadu",
                        "600020",
                    ))
                    .await
                    .unwrap();

                let page = store
                    .list_customers(&CustomerQuery::new().with_city("Chennai"))
                    .await
                    .unwrap();
                assert_eq!(page.total, 2);
                assert_eq!(first_names(&page), vec!["Jane", "Priya"]);
                assert_count(&page.customers[0].addresses, 1);
                assert_count(&page.customers[1].addresses, 3);
                assert!(
                    page.customers
                        .iter()
                        .flat_map(|c| c.addresses.iter())
                        .all(|a| a.city == "Chennai")
                );
            }

            #[tokio::test]
            async fn test_city_filter_ignores_case() {
                let store = seeded().await;

                let page = store
                    .list_customers(&CustomerQuery::new().with_city("mumbai"))
                    .await
                    .unwrap();
                assert_eq!(first_names(&page), vec!["John", "Michael"]);
            }

            #[tokio::test]
            async fn test_state_filter_policies() {
                let store = seeded().await;

                let exact = CustomerQuery::new().with_state("Tamil");
                assert_eq!(store.list_customers(&exact).await.unwrap().total, 0);

                let substring = exact.with_location_match(LocationMatch::Substring);
                let page = store.list_customers(&substring).await.unwrap();
                assert_eq!(first_names(&page), vec!["Priya"]);
            }

            #[tokio::test]
            async fn test_pin_filter_is_substring() {
                let store = seeded().await;

                let page = store
                    .list_customers(&CustomerQuery::new().with_pin_code("6000"))
                    .await
                    .unwrap();
                assert_eq!(first_names(&page), vec!["Priya"]);
                let pins: Vec<&str> = page.customers[0]
                    .addresses
                    .iter()
                    .map(|a| a.pin_code.as_str())
                    .collect();
                assert_eq!(pins, vec!["600017", "600013", "600042"]);

                let page = store
                    .list_customers(&CustomerQuery::new().with_pin_code("600013"))
                    .await
                    .unwrap();
                assert_count(&page.customers[0].addresses, 1);
            }

            #[tokio::test]
            async fn test_search_combined_with_location() {
                let store = seeded().await;

                let query = CustomerQuery::new()
                    .with_search("maharashtra")
                    .with_pin_code("400050");
                let page = store.list_customers(&query).await.unwrap();
                assert_eq!(page.total, 1);
                assert_eq!(first_names(&page), vec!["Michael"]);
            }

            #[tokio::test]
            async fn test_page_beyond_end() {
                let store = seeded().await;

                let query = CustomerQuery::new().with_limit(10).with_page(2);
                let page = store.list_customers(&query).await.unwrap();
                assert!(page.customers.is_empty());
                assert_eq!(page.total, 5);
            }

            #[tokio::test]
            async fn test_pagination_slices() {
                let store = seeded().await;

                let mut seen = Vec::new();
                for page_no in 1..=3 {
                    let query = CustomerQuery::new().with_limit(2).with_page(page_no);
                    let page = store.list_customers(&query).await.unwrap();
                    assert_eq!(page.total, 5);
                    assert!(page.customers.len() <= 2);
                    seen.extend(first_names(&page).into_iter().map(str::to_string));
                }
                assert_eq!(seen, vec!["Jane", "John", "Michael", "Priya", "Raj"]);
            }

            // ==================================================================
            // Summary
            // ==================================================================

            #[tokio::test]
            async fn test_summary() {
                let store = seeded().await;

                let summary = store.summary().await.unwrap();
                assert_eq!(summary.total_customers, 5);
                assert_eq!(summary.total_addresses, 8);
                assert_eq!(
                    summary.cities,
                    vec![
                        CityCount { city: "Bangalore".to_string(), addresses: 1 },
                        CityCount { city: "Chennai".to_string(), addresses: 3 },
                        CityCount { city: "Delhi".to_string(), addresses: 2 },
                        CityCount { city: "Mumbai".to_string(), addresses: 2 },
                    ]
                );
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_creates() {
                let store: Arc<dyn CustomerStore> = Arc::new($factory);

                let mut handles = Vec::new();
                for i in 0..10u32 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store
                            .create_customer(customer_payload("Worker", "Task", 100 + i))
                            .await
                            .unwrap()
                            .id
                    }));
                }

                let mut ids = Vec::new();
                for handle in handles {
                    ids.push(handle.await.unwrap());
                }
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), 10, "every create gets its own id");

                let page = store
                    .list_customers(&CustomerQuery::new().with_limit(50))
                    .await
                    .unwrap();
                assert_eq!(page.total, 10);
            }
        }
    };
}
