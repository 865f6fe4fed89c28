//! Integration tests for the writer/loader pair.
//!
//! These exercise the propagation contract end to end against the mock
//! store: batching arithmetic, round trips, fail-fast validation, and
//! partial batch-sequence aborts.

use crosswire::core::identity::StoreIdentity;
use crosswire::core::reference::Reference;
use crosswire::core::types::{ConfigValue, ProducerName, PropertyName, StageName, ValueType};
use crosswire::share::loader::{ConfigLoader, LoadError};
use crosswire::share::writer::{ConfigWriter, Output};
use crosswire::store::mock::{FailOn, MockStore, StoreOperation};
use crosswire::store::{ConfigKey, StoreError};

fn identity() -> StoreIdentity {
    StoreIdentity::derive("acme", &StageName::new("dev").unwrap())
}

fn producer(name: &str) -> ProducerName {
    ProducerName::new(name).unwrap()
}

fn output(property: &str, value: &str) -> Output {
    Output::new(
        PropertyName::new(property).unwrap(),
        ConfigValue::string(value),
    )
}

fn outputs(n: usize) -> Vec<Output> {
    (0..n)
        .map(|i| output(&format!("prop{i}"), &format!("value{i}")))
        .collect()
}

// =============================================================================
// Writer batching
// =============================================================================

mod writer_batching {
    use super::*;

    #[tokio::test]
    async fn batches_are_ceil_n_over_25_and_all_entries_load_back() {
        for n in [1usize, 24, 25, 26, 49, 50, 75] {
            let store = MockStore::new(identity());
            let writer = ConfigWriter::new(&store);
            let report = writer.publish(&producer("p"), &outputs(n)).await.unwrap();

            assert_eq!(report.batches, n.div_ceil(25), "n = {n}");

            // Every written entry is retrievable through the loader.
            let refs: Vec<String> = (0..n).map(|i| format!("p.prop{i}")).collect();
            let loader = ConfigLoader::new(&store);
            let resolved = loader.load(&refs).await.unwrap();
            assert_eq!(resolved.len(), n);
        }
    }

    #[tokio::test]
    async fn no_batch_exceeds_the_limit() {
        let store = MockStore::new(identity());
        let writer = ConfigWriter::new(&store);
        writer.publish(&producer("p"), &outputs(60)).await.unwrap();

        for op in store.operations() {
            if let StoreOperation::BatchPut { keys } = op {
                assert!(keys.len() <= 25);
            }
        }
    }

    #[tokio::test]
    async fn thirty_outputs_failing_on_second_batch() {
        // Batches of 25 and 5; the second fails. The first 25 persist,
        // the remaining 5 are reported as the failed batch's properties.
        let store = MockStore::new(identity()).fail_on(FailOn::BatchPutAfter {
            after: 1,
            error: StoreError::Throttled,
        });
        let writer = ConfigWriter::new(&store);

        let err = writer
            .publish(&producer("p"), &outputs(30))
            .await
            .unwrap_err();

        assert_eq!(store.len(), 25);
        let unpersisted: Vec<String> = err.unpersisted().map(|p| p.to_string()).collect();
        assert_eq!(
            unpersisted,
            ["prop25", "prop26", "prop27", "prop28", "prop29"]
        );

        // The persisted 25 are still loadable; the unpersisted 5 are not.
        let loader = ConfigLoader::new(&store);
        let persisted_refs: Vec<String> = (0..25).map(|i| format!("p.prop{i}")).collect();
        assert_eq!(loader.load(&persisted_refs).await.unwrap().len(), 25);

        let missing = loader.load(&["p.prop29".to_string()]).await.unwrap_err();
        assert!(matches!(missing, LoadError::Missing { .. }));
    }
}

// =============================================================================
// Round trips and upserts
// =============================================================================

mod round_trip {
    use super::*;

    #[tokio::test]
    async fn foundation_created_at_round_trips_exactly() {
        let store = MockStore::new(identity());
        let writer = ConfigWriter::new(&store);
        writer
            .publish(
                &producer("foundation"),
                &[output("createdAt", "2024-01-01T00:00:00Z")],
            )
            .await
            .unwrap();

        let loader = ConfigLoader::new(&store);
        let resolved = loader
            .load(&["foundation.createdAt".to_string()])
            .await
            .unwrap();

        let reference: Reference = "foundation.createdAt".parse().unwrap();
        assert_eq!(resolved.get(&reference), Some("2024-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn double_write_leaves_one_entry_with_latest_value() {
        let store = MockStore::new(identity());
        let writer = ConfigWriter::new(&store);

        writer
            .publish(&producer("net"), &[output("vpcId", "vpc-first")])
            .await
            .unwrap();
        writer
            .publish(&producer("net"), &[output("vpcId", "vpc-second")])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let key = ConfigKey::new(
            producer("net"),
            PropertyName::new("vpcId").unwrap(),
        );
        assert_eq!(store.entry(&key).unwrap().value, "vpc-second");
    }

    #[tokio::test]
    async fn value_type_tag_survives_the_round_trip() {
        let store = MockStore::new(identity());
        let writer = ConfigWriter::new(&store);
        writer
            .publish(
                &producer("api"),
                &[Output::new(
                    PropertyName::new("endpoint").unwrap(),
                    ConfigValue::new(ValueType::Url, "https://api.example.com").unwrap(),
                )],
            )
            .await
            .unwrap();

        let loader = ConfigLoader::new(&store);
        let resolved = loader.load(&["api.endpoint".to_string()]).await.unwrap();
        let reference: Reference = "api.endpoint".parse().unwrap();
        let stored = resolved.get_stored(&reference).unwrap();
        assert_eq!(stored.value_type, ValueType::Url);
        assert_eq!(stored.value, "https://api.example.com");
    }
}

// =============================================================================
// Fail-fast validation
// =============================================================================

mod validation {
    use super::*;

    #[tokio::test]
    async fn never_written_reference_fails_with_store_identity() {
        let store = MockStore::new(identity());
        let loader = ConfigLoader::new(&store);

        let err = loader
            .load(&["foundation.createdAt".to_string()])
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("foundation.createdAt"));
        assert!(message.contains("acme-dev-config"));
        match err {
            LoadError::Missing { missing, .. } => {
                assert_eq!(missing.len(), 1);
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reference_without_dot_fails_before_any_store_call() {
        let store = MockStore::new(identity());
        let loader = ConfigLoader::new(&store);

        let err = loader.load(&["noproperty".to_string()]).await.unwrap_err();

        assert!(matches!(err, LoadError::Parse(_)));
        assert!(err.to_string().contains("noproperty"));
        // The store double recorded zero calls.
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn partial_results_are_never_returned() {
        let store = MockStore::new(identity());
        let writer = ConfigWriter::new(&store);
        writer
            .publish(&producer("a"), &[output("x", "1")])
            .await
            .unwrap();

        let loader = ConfigLoader::new(&store);
        let err = loader
            .load(&["a.x".to_string(), "b.y".to_string(), "c.z".to_string()])
            .await
            .unwrap_err();

        match err {
            LoadError::Missing { missing, .. } => {
                let names: Vec<String> = missing.iter().map(|r| r.to_string()).collect();
                assert_eq!(names, ["b.y", "c.z"]);
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }
}
