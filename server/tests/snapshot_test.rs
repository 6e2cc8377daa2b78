//! Tests for the snapshot exchange used by the HTTP endpoints.
//!
//! These exercise the document format and JSON payloads without a
//! database, using the engine's in-memory store.

use serde_json::json;
use stockpile_engine::{
    snapshot, Document, EncodeOptions, ImportReport, MemoryStore, MergeStrategy,
    SkipReason,
};

fn shop_store() -> MemoryStore {
    MemoryStore::new()
        .with_entry(
            "products",
            json!([
                {"id": 1, "name": "Widget", "price": 9.99, "active": true},
                {"id": 2, "name": "Gadget, Deluxe", "price": 19.5, "active": false}
            ]),
        )
        .with_entry(
            "orders",
            json!([{"id": 100, "items": [1, 2], "note": "ring \"twice\""}]),
        )
        .with_entry("settings", json!({"currency": "EUR"}))
}

#[cfg(test)]
mod exchange_tests {
    use super::*;

    #[test]
    fn test_export_document_shape() {
        let text = snapshot::export(
            &shop_store(),
            &["products", "orders", "settings", "users"],
            &EncodeOptions::default(),
        )
        .unwrap();

        let expected = "# products\n\
                        id,name,price,active\n\
                        1,Widget,9.99,true\n\
                        2,\"Gadget, Deluxe\",19.5,false\n\
                        \n\
                        # orders\n\
                        id,items,note\n\
                        100,\"[1,2]\",\"ring \"\"twice\"\"\"";
        assert_eq!(text, expected);
        assert_eq!(Document::decode(&text).section_count(), 2);
    }

    #[test]
    fn test_backup_restores_into_empty_store() {
        let source = shop_store();
        let text = snapshot::backup(&source, "", &EncodeOptions::default()).unwrap();

        let mut restored = MemoryStore::new();
        let report = snapshot::import(&mut restored, &text, MergeStrategy::Concatenate).unwrap();

        assert_eq!(report.imported, vec!["orders", "products"]);
        assert_eq!(restored.get("products"), source.get("products"));
        assert_eq!(restored.get("orders"), source.get("orders"));
        assert!(restored.get("settings").is_none());
    }

    #[test]
    fn test_restore_replace_by_id() {
        let mut store = shop_store();
        let text = "# products\nid,name,price,active\n2,Gadget,17,true";

        let strategy = MergeStrategy::ReplaceById { key: "id".into() };
        snapshot::import(&mut store, text, strategy).unwrap();

        assert_eq!(
            store.get("products"),
            Some(&json!([
                {"id": 1, "name": "Widget", "price": 9.99, "active": true},
                {"id": 2, "name": "Gadget", "price": 17, "active": true}
            ]))
        );
    }

    #[test]
    fn test_typed_export_restores_numeric_strings() {
        let store = MemoryStore::new().with_entry(
            "users",
            json!([{"id": 1, "zip": "01234", "vip": false}]),
        );
        let text = snapshot::backup(&store, "", &EncodeOptions::typed()).unwrap();
        assert!(text.starts_with("# users\nid:number,zip:string,vip:boolean\n"));

        let mut restored = MemoryStore::new();
        snapshot::import(&mut restored, &text, MergeStrategy::ReplaceCollection).unwrap();
        assert_eq!(restored, store);
    }
}

#[cfg(test)]
mod payload_tests {
    use super::*;

    #[test]
    fn test_strategy_json() {
        let strategy: MergeStrategy =
            serde_json::from_value(json!({"type": "replaceById", "key": "sku"})).unwrap();
        assert_eq!(strategy, MergeStrategy::ReplaceById { key: "sku".into() });

        let json = serde_json::to_value(MergeStrategy::default()).unwrap();
        assert_eq!(json, json!({"type": "concatenate"}));
    }

    #[test]
    fn test_report_json() {
        let text = "# products\nid\n1\n\nnot a section\nid\n1\n\n# orders\nid";
        let mut store = MemoryStore::new();
        let report = snapshot::import(&mut store, text, MergeStrategy::Concatenate).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sectionsImported"], 1);
        assert_eq!(json["imported"], json!(["products"]));
        assert_eq!(
            json["skipped"],
            json!([
                {"reason": "missingMarker", "line": "not a section"},
                {"reason": "tooFewLines", "found": 2}
            ])
        );
        assert_eq!(json["failed"], json!([]));

        let parsed: ImportReport = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.skipped[1], SkipReason::TooFewLines { found: 2 });
    }
}
