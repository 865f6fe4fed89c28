//! Property-based tests for core domain types and batching arithmetic.
//!
//! These tests use proptest to verify invariants hold across randomly
//! generated inputs.

use proptest::prelude::*;

use crosswire::core::identity::StoreIdentity;
use crosswire::core::reference::Reference;
use crosswire::core::types::{
    ConfigValue, ProducerName, PropertyName, StageName, ValueType,
};
use crosswire::share::writer::{ConfigWriter, Output};
use crosswire::store::mock::MockStore;

/// Strategy for characters valid in both producer and property names.
fn name_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
    ]
}

/// Strategy for valid property names (no dots by construction).
fn valid_property_name() -> impl Strategy<Value = String> {
    prop::collection::vec(name_char(), 1..30).prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for valid producer names, possibly containing interior dots.
fn valid_producer_name() -> impl Strategy<Value = String> {
    prop::collection::vec(valid_property_name(), 1..4).prop_map(|segments| segments.join("."))
}

/// Strategy for valid stage names.
fn valid_stage_name() -> impl Strategy<Value = String> {
    (
        prop::char::range('a', 'z'),
        prop::collection::vec(
            prop_oneof![
                prop::char::range('a', 'z'),
                prop::char::range('0', '9'),
                Just('-'),
            ],
            0..15,
        ),
    )
        .prop_map(|(first, rest)| {
            let mut name = String::new();
            name.push(first);
            name.extend(rest);
            name
        })
}

proptest! {
    /// Any producer/property pair round-trips through the reference
    /// string form, and parsing splits on the last dot.
    #[test]
    fn reference_roundtrip(producer in valid_producer_name(), property in valid_property_name()) {
        let raw = format!("{producer}.{property}");
        let reference = Reference::parse(&raw).unwrap();
        prop_assert_eq!(reference.producer().as_str(), producer.as_str());
        prop_assert_eq!(reference.property().as_str(), property.as_str());
        prop_assert_eq!(reference.to_string(), raw);
    }

    /// References serde-roundtrip as plain strings.
    #[test]
    fn reference_serde_roundtrip(producer in valid_producer_name(), property in valid_property_name()) {
        let reference = Reference::parse(&format!("{producer}.{property}")).unwrap();
        let json = serde_json::to_string(&reference).unwrap();
        let parsed: Reference = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(reference, parsed);
    }

    /// A string without a dot never parses as a reference.
    #[test]
    fn dotless_string_never_parses(raw in valid_property_name()) {
        prop_assert!(Reference::parse(&raw).is_err());
    }

    /// Store identity derivation is deterministic and injective over
    /// its printable form.
    #[test]
    fn store_identity_deterministic(prefix in valid_stage_name(), stage in valid_stage_name()) {
        let stage = StageName::new(stage).unwrap();
        let a = StoreIdentity::derive(&prefix, &stage);
        let b = StoreIdentity::derive(&prefix, &stage);
        prop_assert_eq!(a.table_name(), b.table_name());
        prop_assert!(a.table_name().starts_with(&prefix));
        prop_assert!(a.table_name().ends_with("-config"));
    }

    /// Number payloads that parse as f64 are accepted verbatim.
    #[test]
    fn number_values_keep_their_rendering(n in -1e9f64..1e9f64) {
        let rendered = format!("{n}");
        let value = ConfigValue::new(ValueType::Number, &rendered).unwrap();
        prop_assert_eq!(value.as_str(), rendered.as_str());
    }

    /// Value type tags round-trip through their string form.
    #[test]
    fn value_type_tag_roundtrip(index in 0usize..5) {
        let vt = ValueType::ALL[index];
        let parsed: ValueType = vt.as_str().parse().unwrap();
        prop_assert_eq!(parsed, vt);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// For any output list, the writer issues ceil(n / limit) batches
    /// and every entry ends up in the store exactly once.
    #[test]
    fn writer_batch_arithmetic(n in 0usize..120) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let stage = StageName::new("dev").unwrap();
            let store = MockStore::new(StoreIdentity::derive("acme", &stage));
            let writer = ConfigWriter::new(&store);

            let outputs: Vec<Output> = (0..n)
                .map(|i| Output::new(
                    PropertyName::new(format!("prop{i}")).unwrap(),
                    ConfigValue::string(format!("value{i}")),
                ))
                .collect();

            let producer = ProducerName::new("p").unwrap();
            let report = writer.publish(&producer, &outputs).await.unwrap();

            prop_assert_eq!(report.batches, n.div_ceil(25));
            prop_assert_eq!(report.entries, n);
            prop_assert_eq!(store.len(), n);
            Ok(())
        })?;
    }

    /// Duplicate declarations never produce duplicate entries; the last
    /// value always wins.
    #[test]
    fn duplicate_outputs_collapse(repeats in 1usize..6) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let stage = StageName::new("dev").unwrap();
            let store = MockStore::new(StoreIdentity::derive("acme", &stage));
            let writer = ConfigWriter::new(&store);

            let property = PropertyName::new("endpoint").unwrap();
            let outputs: Vec<Output> = (0..repeats)
                .map(|i| Output::new(property.clone(), ConfigValue::string(format!("v{i}"))))
                .collect();

            let producer = ProducerName::new("p").unwrap();
            let report = writer.publish(&producer, &outputs).await.unwrap();

            prop_assert_eq!(report.entries, 1);
            prop_assert_eq!(store.len(), 1);
            let key = crosswire::store::ConfigKey::new(producer, property.clone());
            let expected = format!("v{}", repeats - 1);
            prop_assert_eq!(store.entry(&key).unwrap().value, expected);
            Ok(())
        })?;
    }
}
