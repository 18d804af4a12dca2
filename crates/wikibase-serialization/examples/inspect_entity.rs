//! Simple inspector for entity files (JSON or blob).

use std::fs;
use std::sync::Arc;

use wikibase_serialization::limits::{MAGIC_COMPRESSED, MAGIC_UNCOMPRESSED};
use wikibase_serialization::registry::Deserializer;
use wikibase_serialization::{
    decode_blob, encode_blob, encode_blob_compressed, CodecOptions, DataValue, DeserializerFactory,
    Entity, PropertyTypes, Snak, WireValue,
};

fn format_value(v: &DataValue) -> String {
    match v {
        DataValue::String(s) => {
            let preview: String = s.chars().take(60).collect();
            if s.chars().count() > 60 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        DataValue::EntityId(id) => id.to_string(),
        DataValue::Time(t) => format!("TIME({}, precision={})", t.time, t.precision),
        DataValue::Quantity(q) => format!("QUANTITY({} {})", q.amount, q.unit),
        DataValue::GlobeCoordinate(g) => format!("POINT({}, {})", g.latitude, g.longitude),
        DataValue::MonolingualText { language, text } => format!("\"{}\"@{}", text, language),
    }
}

fn format_snak(snak: &Snak) -> String {
    match snak {
        Snak::Value { value, .. } => format_value(value),
        other => format!("<{}>", other.snak_type()),
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .expect("usage: inspect_entity <entity.json | entity.wbe>");

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let wire: WireValue = if data.starts_with(MAGIC_UNCOMPRESSED) || data.starts_with(MAGIC_COMPRESSED) {
        decode_blob(&data).expect("Failed to decode blob")
    } else {
        serde_json::from_slice(&data).expect("Failed to parse JSON")
    };

    let mut types = PropertyTypes::new();
    let learned = types.learn_from_wire(&wire);
    println!("Property types learned: {}", learned);

    let factory = DeserializerFactory::new(CodecOptions::new(), Arc::new(types))
        .expect("Failed to wire deserializers");
    let entity = factory
        .new_entity_deserializer()
        .expect("Failed to build entity deserializer")
        .deserialize(&wire)
        .expect("Failed to deserialize entity");

    println!("\n=== Entity ===");
    println!("ID: {}", entity.id());
    println!("Kind: {}", entity.kind());
    if let Entity::Property(property) = &entity {
        println!("Data type: {}", property.data_type);
    }

    let fingerprint = entity.fingerprint();
    println!("\n=== Terms ===");
    println!("Labels: {}", fingerprint.labels.len());
    for term in fingerprint.labels.iter().take(5) {
        println!("  {}: {}", term.language(), term.text());
    }
    println!("Descriptions: {}", fingerprint.descriptions.len());
    println!("Alias groups: {}", fingerprint.aliases.len());

    let statements = entity.statements();
    println!("\n=== Statements ({} groups) ===", statements.len());
    for group in statements.groups() {
        let list = group.statements();
        println!("{} ({} statements)", group.property(), list.len());
        for statement in list.iter().take(3) {
            println!(
                "  [{}] {} qualifiers={} references={}",
                statement.rank().name(),
                format_snak(statement.claim().main_snak()),
                statement.claim().qualifiers().len(),
                statement.references().len()
            );
        }
        if list.len() > 3 {
            println!("  ... {} more", list.len() - 3);
        }
    }

    if let Some(links) = entity.site_links() {
        println!("\n=== Site links ({}) ===", links.len());
        for link in links.iter().take(5) {
            println!("  {}: {}", link.site(), link.title());
        }
    }

    let plain = encode_blob(&wire).expect("Failed to encode blob");
    let compressed = encode_blob_compressed(&wire).expect("Failed to compress blob");
    println!("\n=== Storage ===");
    println!("Uncompressed blob: {} bytes", plain.len());
    println!(
        "Compressed blob: {} bytes ({:.1}%)",
        compressed.len(),
        compressed.len() as f64 / plain.len() as f64 * 100.0
    );
}
