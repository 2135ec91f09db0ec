// Catalog store and service guard rails: migration, id uniqueness,
// validation, source registration, round-trips, deletion, and defaults.
mod support;

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clinic_catalog::catalog::store::render;
use clinic_catalog::{
    CatalogDocument, CatalogError, CatalogStore, StoredDocument, add_product, add_source,
    delete_product, list_categories, migrate_if_needed, sample_document, update_product,
};
use serde_json::json;
use std::collections::HashSet;
use std::fs;

use support::{TempCatalog, draft};

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 4)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn migration_is_noop_on_listed_documents() -> Result<()> {
    let doc = sample_document();
    let migrated = migrate_if_needed(StoredDocument::from(doc.clone()));
    assert_eq!(migrated, doc);
    let again = migrate_if_needed(StoredDocument::from(migrated.clone()));
    assert_eq!(again, migrated);
    Ok(())
}

#[test]
fn legacy_category_is_migrated_to_list_shape() -> Result<()> {
    let catalog = TempCatalog::with_json(&json!({
        "products": {
            "填充": {
                "VOLUMA": {
                    "source": "SINOPHARM",
                    "is_genuine": false,
                    "price": 820.0,
                    "unit": "per 支",
                    "date_added": "2026-01-01 09:38"
                }
            }
        },
        "sources": ["SINOPHARM"],
        "users": {"admin": "admin123"}
    }))?;

    let store = CatalogStore::new(&catalog.path);
    let doc = store.load();
    store.save(&doc)?;

    assert_eq!(
        catalog.read_json()?["products"]["填充"],
        json!([{
            "id": "voluma_ng",
            "name": "VOLUMA",
            "source": "SINOPHARM",
            "is_genuine": false,
            "price": 820.0,
            "unit": "per 支",
            "date_added": "2026-01-01 09:38"
        }])
    );
    Ok(())
}

#[test]
fn legacy_and_listed_categories_mix_in_one_file() -> Result<()> {
    let catalog = TempCatalog::with_json(&json!({
        "products": {
            "水光": [{"id": "hyal_001", "name": "Hyal", "source": "S", "is_genuine": true,
                      "price": 120.0, "unit": "per bottle", "date_added": "2024-01-01 10:30"}],
            "溶脂": {"Lipo B": {"price": 2.0}, "Lipo A": {"price": 1.0, "is_genuine": false}},
            "生髮": {}
        }
    }))?;

    let doc = CatalogStore::new(&catalog.path).load();
    assert_eq!(doc.products["水光"][0].id, "hyal_001");
    let ids: Vec<&str> = doc.products["溶脂"].iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["lipo_b_g", "lipo_a_ng"]);
    assert!(doc.products["生髮"].is_empty());
    Ok(())
}

#[test]
fn repeated_adds_never_share_an_id() -> Result<()> {
    let mut doc = CatalogDocument::starter();
    let start = noon();
    for i in 0..50 {
        // Half the adds land on the same instant to force suffixing.
        let now = start + Duration::microseconds(i / 2);
        add_product(&mut doc, "填充", draft("Same Name", "其他", 10.0), now)?;
    }
    let ids: HashSet<&str> = doc.products["填充"].iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), 50);
    Ok(())
}

#[test]
fn invalid_drafts_leave_document_unchanged() -> Result<()> {
    let mut doc = sample_document();
    let before = doc.clone();

    let err = add_product(&mut doc, "填充", draft("X", "其他", 0.0), noon()).unwrap_err();
    assert_eq!(err, CatalogError::InvalidPrice(0.0));
    let err = add_product(&mut doc, "填充", draft("   ", "其他", 5.0), noon()).unwrap_err();
    assert_eq!(err, CatalogError::Empty { field: "name" });
    let err = add_product(&mut doc, "填充", draft("X", " ", 5.0), noon()).unwrap_err();
    assert_eq!(err, CatalogError::Empty { field: "source" });
    let err = update_product(&mut doc, "填充", 0, draft("X", "New Co", -1.0)).unwrap_err();
    assert_eq!(err, CatalogError::InvalidPrice(-1.0));

    assert_eq!(doc, before);
    Ok(())
}

#[test]
fn update_registers_new_source_once() -> Result<()> {
    let mut doc = sample_document();
    let original = doc.products["填充"][0].clone();

    update_product(&mut doc, "填充", 0, draft("VOLUMA Lite", "New Co", 700.0))?;
    update_product(&mut doc, "填充", 0, draft("VOLUMA Lite", "New Co", 710.0))?;

    assert_eq!(doc.sources.iter().filter(|s| *s == "New Co").count(), 1);
    assert_eq!(doc.sources.last().map(String::as_str), Some("New Co"));
    let updated = &doc.products["填充"][0];
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.date_added, original.date_added);
    assert_eq!(updated.name, "VOLUMA Lite");
    assert_eq!(updated.price, 710.0);
    Ok(())
}

#[test]
fn add_source_rejects_duplicates_and_blanks() -> Result<()> {
    let mut doc = CatalogDocument::starter();
    let before = doc.sources.len();
    assert_eq!(
        add_source(&mut doc, "香港代理"),
        Err(CatalogError::AlreadyExists("香港代理".to_string()))
    );
    assert!(add_source(&mut doc, "").is_err());
    add_source(&mut doc, "Global Med")?;
    assert_eq!(doc.sources.len(), before + 1);
    Ok(())
}

#[test]
fn save_load_save_is_byte_stable() -> Result<()> {
    let catalog = TempCatalog::empty()?;
    let store = CatalogStore::new(&catalog.path);
    let mut doc = sample_document();
    add_product(&mut doc, "肉毒", draft("Botox 100U", "Pharma Corp", 1999.99), noon())?;

    store.save(&doc)?;
    let first = fs::read_to_string(&catalog.path)?;
    store.save(&store.load())?;
    let second = fs::read_to_string(&catalog.path)?;

    assert_eq!(first, second);
    assert_eq!(first, format!("{}\n", render(&doc)?));
    Ok(())
}

#[test]
fn delete_keeps_survivors_in_order() -> Result<()> {
    let mut doc = CatalogDocument::starter();
    for (i, name) in ["A", "B", "C", "D"].iter().enumerate() {
        add_product(
            &mut doc,
            "水光",
            draft(name, "其他", 1.0),
            noon() + Duration::seconds(i as i64),
        )?;
    }
    let before: Vec<String> = doc.products["水光"].iter().map(|p| p.id.clone()).collect();

    let removed = delete_product(&mut doc, "水光", 1)?;
    assert_eq!(removed.name, "B");

    let after: Vec<String> = doc.products["水光"].iter().map(|p| p.id.clone()).collect();
    assert_eq!(after, [before[0].clone(), before[2].clone(), before[3].clone()]);

    let err = delete_product(&mut doc, "水光", 3).unwrap_err();
    assert!(matches!(err, CatalogError::IndexOutOfRange { len: 3, .. }));
    Ok(())
}

#[test]
fn missing_file_loads_starter_document() -> Result<()> {
    let catalog = TempCatalog::empty()?;
    let doc = CatalogStore::new(&catalog.path).load();
    assert!(doc.products.is_empty());
    assert_eq!(doc.sources, ["本地供應商", "香港代理", "台灣進口", "其他"]);
    assert_eq!(doc.users.len(), 2);
    assert_eq!(doc.users["admin"], "admin123");
    assert_eq!(doc.users["partner"], "partner123");
    assert!(!catalog.path.exists(), "load must not create the file");
    Ok(())
}

#[test]
fn corrupt_file_loads_starter_document() -> Result<()> {
    let catalog = TempCatalog::empty()?;
    fs::write(&catalog.path, "{ not json")?;
    assert_eq!(CatalogStore::new(&catalog.path).load(), CatalogDocument::starter());
    Ok(())
}

#[test]
fn categories_listed_in_fixed_order_with_counts() -> Result<()> {
    let summaries = list_categories(&sample_document());
    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["填充", "水光", "溶脂", "肉毒", "生髮"]);
    let counts: Vec<usize> = summaries.iter().map(|s| s.count).collect();
    assert_eq!(counts, [2, 1, 1, 0, 0]);
    Ok(())
}

#[test]
fn loosely_typed_records_load_without_losing_neighbours() -> Result<()> {
    let catalog = TempCatalog::with_json(&json!({
        "products": {
            "填充": [
                {"id": "voluma_ng", "name": "VOLUMA", "source": "SINOPHARM", "is_genuine": false,
                 "price": 820.0, "unit": "per 支", "date_added": "2026-01-01 09:38"},
                {"id": "odd_g", "name": "Odd", "price": null, "is_genuine": "true"},
                {"id": "nameless_g", "price": "15.5"},
                42
            ],
            "溶脂": {"Lipo": {"price": null, "is_genuine": "false"}, "Broken": "x"}
        },
        "sources": ["SINOPHARM"],
        "users": {"admin": "secret"}
    }))?;

    let doc = CatalogStore::new(&catalog.path).load();

    let fillers = &doc.products["填充"];
    let ids: Vec<&str> = fillers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["voluma_ng", "odd_g", "nameless_g"]);
    assert_eq!(fillers[0].price, 820.0);
    assert_eq!(fillers[1].price, 0.0);
    assert!(fillers[1].is_genuine);
    assert_eq!(fillers[2].name, "nameless_g");
    assert_eq!(fillers[2].price, 15.5);

    let lipo = &doc.products["溶脂"];
    assert_eq!(lipo.len(), 1);
    assert_eq!(lipo[0].id, "lipo_ng");

    assert_eq!(doc.sources, ["SINOPHARM"]);
    assert_eq!(doc.users["admin"], "secret");
    assert!(!doc.users.contains_key("partner"), "must not fall back to starter users");
    Ok(())
}

#[test]
fn saving_after_loose_load_keeps_real_data() -> Result<()> {
    let catalog = TempCatalog::with_json(&json!({
        "products": {"水光": [{"id": "hyal_001", "name": "Hyal", "price": null}]},
        "sources": null,
        "users": {"admin": "admin123"}
    }))?;
    let store = CatalogStore::new(&catalog.path);

    let mut doc = store.load();
    add_source(&mut doc, "Global Med")?;
    store.save(&doc)?;

    let saved = catalog.read_json()?;
    assert_eq!(saved["products"]["水光"][0]["id"], "hyal_001");
    assert_eq!(saved["products"]["水光"][0]["price"], 0.0);
    assert_eq!(saved["sources"].as_array().map(Vec::len), Some(5));
    Ok(())
}

#[test]
fn huge_prices_never_serialize_as_null() -> Result<()> {
    let catalog = TempCatalog::empty()?;
    let store = CatalogStore::new(&catalog.path);
    let mut doc = CatalogDocument::starter();
    add_product(&mut doc, "肉毒", draft("Big", "其他", 1e307), noon())?;
    add_product(&mut doc, "肉毒", draft("Max", "其他", f64::MAX), noon())?;

    store.save(&doc)?;
    let saved = catalog.read_json()?;
    assert!(saved["products"]["肉毒"][0]["price"].is_f64());
    assert!(saved["products"]["肉毒"][1]["price"].is_f64());

    let first = fs::read_to_string(&catalog.path)?;
    let reloaded = store.load();
    assert_eq!(reloaded, doc);
    store.save(&reloaded)?;
    assert_eq!(fs::read_to_string(&catalog.path)?, first);
    Ok(())
}
