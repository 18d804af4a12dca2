//! Benchmark for entity (de)serialization over a JSON entity dump.
//!
//! Accepts a JSON array of entities or one entity per line (trailing commas
//! and bare `[`/`]` lines are tolerated). Without an argument a synthetic
//! set of items is generated with the builder API.

use std::fs;
use std::sync::Arc;
use std::time::Instant;

use wikibase_serialization::model::{GlobeCoordinateValue, QuantityValue, TimeValue};
use wikibase_serialization::util::Timestamp;
use wikibase_serialization::registry::{Deserializer, Serializer};
use wikibase_serialization::{
    decode_blob, encode_blob, encode_blob_compressed, CodecOptions, DataValue, DeserializerFactory,
    Entity, ItemBuilder, ItemId, PropertyId, PropertyTypes, SerializerFactory, Snak, WireShape,
    WireValue,
};

const SYNTHETIC_ITEMS: u64 = 20_000;
const ITERS: u32 = 5;

// =============================================================================
// INPUT
// =============================================================================

fn parse_dump(text: &str) -> Vec<WireValue> {
    if text.trim_start().starts_with('[') {
        if let Ok(WireValue::Array(entities)) = serde_json::from_str(text) {
            return entities;
        }
    }
    let mut entities = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim().trim_end_matches(',');
        if line.is_empty() || line == "[" || line == "]" {
            continue;
        }
        match serde_json::from_str::<WireValue>(line) {
            Ok(WireValue::Array(batch)) => entities.extend(batch),
            Ok(entity) => entities.push(entity),
            Err(e) => tracing::warn!(line = n + 1, error = %e, "skipping unparsable line"),
        }
    }
    entities
}

fn p(n: u64) -> PropertyId {
    PropertyId::new(n).expect("property ids are positive")
}

fn q(n: u64) -> ItemId {
    ItemId::new(n).expect("item ids are positive")
}

/// Properties used by the synthetic items, with their data types.
fn synthetic_types() -> PropertyTypes {
    PropertyTypes::new()
        .with_property(p(31), "wikibase-item")
        .with_property(p(17), "wikibase-item")
        .with_property(p(1082), "quantity")
        .with_property(p(625), "globe-coordinate")
        .with_property(p(571), "time")
        .with_property(p(1448), "monolingualtext")
        .with_property(p(585), "time")
        .with_property(p(854), "url")
}

fn synthetic_item(n: u64) -> Entity {
    let point_in_time = |year: u64| {
        let timestamp = Timestamp {
            year: 1000 + (year % 1000) as i64,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        };
        DataValue::Time(TimeValue::gregorian(&timestamp, 9))
    };
    let alias = format!("C{n}");
    let source = [Snak::value(p(854), DataValue::String(format!("https://example.org/cities/{n}")))];

    ItemBuilder::new(q(n))
        .label("en", &format!("City {n}"))
        .label("de", &format!("Stadt {n}"))
        .description("en", "synthetic city")
        .aliases("en", [alias.as_str()])
        .statement(p(31), |s| s.item_value(q(515)).guid(format!("Q{n}$31")))
        .statement(p(17), |s| s.item_value(q(1 + n % 200)).reference(source.clone()))
        .statement(p(1082), |s| {
            s.value(DataValue::Quantity(QuantityValue {
                amount: format!("+{}", 1000 + n * 37 % 1_000_000),
                unit: "1".to_string(),
                upper_bound: None,
                lower_bound: None,
            }))
            .qualifier(Snak::value(p(585), point_in_time(n)))
            .reference(source.clone())
        })
        .statement(p(625), |s| {
            s.value(DataValue::GlobeCoordinate(GlobeCoordinateValue {
                latitude: (n % 180) as f64 - 90.0 + 0.25,
                longitude: (n % 360) as f64 - 180.0 + 0.5,
                precision: Some(0.0001),
                globe: "http://www.wikidata.org/entity/Q2".to_string(),
            }))
        })
        .statement(p(571), |s| s.value(point_in_time(n * 7)))
        .statement(p(1448), |s| {
            s.value(DataValue::MonolingualText {
                language: "en".to_string(),
                text: format!("City {n}"),
            })
        })
        .site_link("enwiki", &format!("City {n}"))
        .build()
        .into()
}

// =============================================================================
// MAIN
// =============================================================================

fn throughput(bytes: usize, secs: f64) -> f64 {
    (bytes as f64 / 1_000_000.0) / secs
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let serializer = SerializerFactory::new(CodecOptions::new())
        .expect("Failed to wire serializers")
        .new_entity_serializer()
        .expect("Failed to build entity serializer");

    let load_start = Instant::now();
    let (wire, types) = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading entities from: {}", path);
            let text = fs::read_to_string(&path).expect("Failed to read dump");
            let wire = parse_dump(&text);
            let mut types = PropertyTypes::new();
            for entity in &wire {
                types.learn_from_wire(entity);
            }
            (wire, types)
        }
        None => {
            println!("No dump given; generating {} synthetic items", SYNTHETIC_ITEMS);
            let wire = (1..=SYNTHETIC_ITEMS)
                .map(|n| serializer.serialize(&synthetic_item(n)).expect("Failed to serialize"))
                .collect::<Vec<_>>();
            (wire, synthetic_types())
        }
    };
    let json_size: usize = wire
        .iter()
        .map(|e| serde_json::to_vec(e).map(|v| v.len()).unwrap_or(0))
        .sum();
    println!(
        "Loaded {} entities ({:.1} MB of JSON, {} property types) in {:?}",
        wire.len(),
        json_size as f64 / 1_000_000.0,
        types.len(),
        load_start.elapsed()
    );

    let deserializer = DeserializerFactory::new(CodecOptions::new(), Arc::new(types))
        .expect("Failed to wire deserializers")
        .new_entity_deserializer()
        .expect("Failed to build entity deserializer");

    // Deserialize
    let start = Instant::now();
    let mut entities = Vec::with_capacity(wire.len());
    let mut failures = 0usize;
    for value in &wire {
        match deserializer.deserialize(value) {
            Ok(entity) => entities.push(entity),
            Err(e) => {
                failures += 1;
                tracing::debug!(id = ?value.get("id"), error = %e, class = e.class().code(), "entity rejected");
            }
        }
    }
    let deserialize_time = start.elapsed();
    println!(
        "\nDeserialize: {} ok, {} rejected in {:?}",
        entities.len(),
        failures,
        deserialize_time
    );
    println!(
        "  Throughput: {:.2} MB/s",
        throughput(json_size, deserialize_time.as_secs_f64())
    );

    // Serialize, both shapes
    for shape in [WireShape::Current, WireShape::Legacy] {
        let start = Instant::now();
        let mut out = Vec::new();
        for _ in 0..ITERS {
            out = entities
                .iter()
                .map(|e| serializer.serialize_shaped(e, shape).expect("Failed to serialize"))
                .collect();
        }
        let elapsed = start.elapsed() / ITERS;
        println!(
            "\nSerialize ({}): {:?} (avg of {} iterations)",
            shape, elapsed, ITERS
        );
        println!(
            "  Throughput: {:.2} MB/s",
            throughput(json_size, elapsed.as_secs_f64())
        );
        if shape == WireShape::Current {
            let round_trips = out
                .iter()
                .zip(&entities)
                .filter(|(w, e)| deserializer.deserialize(w).as_ref() == Ok(*e))
                .count();
            println!("  Round-trips: {}/{}", round_trips, entities.len());
        }
    }

    // Blob storage
    let batch = WireValue::Array(wire);
    let start = Instant::now();
    let plain = encode_blob(&batch).expect("Failed to encode blob");
    let plain_time = start.elapsed();
    let start = Instant::now();
    let compressed = encode_blob_compressed(&batch).expect("Failed to compress blob");
    let compress_time = start.elapsed();
    let start = Instant::now();
    let decoded = decode_blob(&compressed).expect("Failed to decode blob");
    let decode_time = start.elapsed();
    assert_eq!(decoded, batch);

    println!("\nBlob (uncompressed): {} bytes in {:?}", plain.len(), plain_time);
    println!("Blob (compressed): {} bytes in {:?}", compressed.len(), compress_time);
    println!(
        "  Compression ratio: {:.1}x",
        plain.len() as f64 / compressed.len() as f64
    );
    println!(
        "Blob decode (compressed): {:?}, {:.2} MB/s",
        decode_time,
        throughput(plain.len(), decode_time.as_secs_f64())
    );
}
