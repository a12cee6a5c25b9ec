//! Content enumeration: the snapshot of translation units one job works
//! through.
//!
//! Units are collected once at job start so the sequence stays stable for the
//! whole run even if the tenant's content is edited concurrently. Units with
//! blank source text are kept in the sequence (they count toward progress
//! bookkeeping) but are never submitted to the provider.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::store::{ServiceField, Store};

/// Where a finished translation is written back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitTarget {
    /// Override-store entry for a UI template key.
    UiKey(String),
    ServiceText { service_id: i64, field: ServiceField },
    VariantLabel { variant_id: i64 },
    GalleryCategoryName { category_id: i64 },
}

/// One (entity, field, source text) triple needing translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub target: UnitTarget,
    /// Source-language text; `None` or blank means skip (but still count).
    pub source_text: Option<String>,
    /// Content-kind hint forwarded to the provider.
    pub kind_hint: &'static str,
}

impl TranslationUnit {
    /// Non-blank source text, if the unit is translatable at all.
    pub fn translatable_text(&self) -> Option<&str> {
        self.source_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Collect the unit snapshot for one (tenant, target language) job.
///
/// Order: UI template entries, then per-service name/category/description,
/// then all variant labels, then gallery category names. The order carries
/// no meaning but is stable within a run.
pub fn collect_units(
    store: &Store,
    tenant_id: i64,
    source_language: &str,
    ui_snapshot: Option<&BTreeMap<String, String>>,
) -> Result<Vec<TranslationUnit>> {
    let mut units = Vec::new();

    if let Some(snapshot) = ui_snapshot {
        for (key, text) in snapshot {
            units.push(TranslationUnit {
                target: UnitTarget::UiKey(key.clone()),
                source_text: Some(text.clone()),
                kind_hint: "user interface button or label",
            });
        }
    }

    for service in store.list_services(tenant_id)? {
        for (field, hint) in [
            (ServiceField::Name, "service name"),
            (ServiceField::Category, "service category"),
            (ServiceField::Description, "service description"),
        ] {
            let source = match field {
                ServiceField::Name => service.name.get(source_language),
                ServiceField::Category => service.category.get(source_language),
                ServiceField::Description => service.description.get(source_language),
            };
            units.push(TranslationUnit {
                target: UnitTarget::ServiceText {
                    service_id: service.id,
                    field,
                },
                source_text: source.map(str::to_string),
                kind_hint: hint,
            });
        }
    }

    for variant in store.list_service_variants(tenant_id)? {
        units.push(TranslationUnit {
            target: UnitTarget::VariantLabel {
                variant_id: variant.id,
            },
            source_text: variant.label.get(source_language).map(str::to_string),
            kind_hint: "service option label",
        });
    }

    for category in store.list_gallery_categories(tenant_id)? {
        units.push(TranslationUnit {
            target: UnitTarget::GalleryCategoryName {
                category_id: category.id,
            },
            source_text: category.name.get(source_language).map(str::to_string),
            kind_hint: "gallery category",
        });
    }

    Ok(units)
}

/// The progress denominator: UI entries + 3 fields per service + gallery
/// categories, clamped to at least 1 to avoid division by zero. Variant
/// labels are translated but excluded here; the ≤99 mid-run clamp absorbs
/// any overshoot.
pub fn job_total(ui_entries: usize, services: usize, gallery_categories: usize) -> usize {
    (ui_entries + 3 * services + gallery_categories).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multilingual::MultilingualText;
    use tempfile::TempDir;

    fn create_test_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("enumerator.db");
        let store = Store::open(db_path.to_str().unwrap()).expect("Failed to open store");
        (store, temp_dir)
    }

    fn seed_tenant(store: &Store) -> i64 {
        store
            .create_tenant("Skani Salon", "hu", None, "Beauty Salon")
            .expect("Should create tenant")
    }

    // ==================== job_total Tests ====================

    #[test]
    fn test_job_total_formula() {
        // 4 UI keys + 2 services × 3 fields + 1 gallery category
        assert_eq!(job_total(4, 2, 1), 11);
    }

    #[test]
    fn test_job_total_clamps_to_one() {
        assert_eq!(job_total(0, 0, 0), 1);
    }

    // ==================== Enumeration Tests ====================

    #[test]
    fn test_enumerates_service_fields_and_gallery() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        store
            .add_service(
                tenant,
                &MultilingualText::from_pairs([("hu", "Hajvágás")]),
                &MultilingualText::from_pairs([("hu", "Fodrászat")]),
                &MultilingualText::from_pairs([("hu", "Precíz vágás")]),
            )
            .expect("add");
        store
            .add_gallery_category(tenant, &MultilingualText::from_pairs([("hu", "Esküvő")]))
            .expect("add");

        let units = collect_units(&store, tenant, "hu", None).expect("Should collect");
        assert_eq!(units.len(), 4);
        assert!(units.iter().all(|u| u.translatable_text().is_some()));
    }

    #[test]
    fn test_ui_snapshot_comes_first() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        store
            .add_service(
                tenant,
                &MultilingualText::from_pairs([("hu", "Hajvágás")]),
                &MultilingualText::new(),
                &MultilingualText::new(),
            )
            .expect("add");

        let mut ui = BTreeMap::new();
        ui.insert("nav.home".to_string(), "Főoldal".to_string());
        ui.insert("nav.services".to_string(), "Szolgáltatások".to_string());

        let units = collect_units(&store, tenant, "hu", Some(&ui)).expect("Should collect");
        assert_eq!(units.len(), 5);
        assert_eq!(
            units[0].target,
            UnitTarget::UiKey("nav.home".to_string())
        );
        assert_eq!(units[0].kind_hint, "user interface button or label");
    }

    #[test]
    fn test_blank_source_units_kept_but_not_translatable() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        // Name exists in the source language, category/description do not.
        store
            .add_service(
                tenant,
                &MultilingualText::from_pairs([("hu", "Hajvágás")]),
                &MultilingualText::new(),
                &MultilingualText::new(),
            )
            .expect("add");

        let units = collect_units(&store, tenant, "hu", None).expect("Should collect");
        assert_eq!(units.len(), 3, "blank units still counted");
        let translatable = units.iter().filter(|u| u.translatable_text().is_some());
        assert_eq!(translatable.count(), 1);
    }

    #[test]
    fn test_variant_labels_enumerated() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        let service = store
            .add_service(
                tenant,
                &MultilingualText::from_pairs([("hu", "Hajvágás")]),
                &MultilingualText::new(),
                &MultilingualText::new(),
            )
            .expect("add");
        store
            .add_service_variant(service, &MultilingualText::from_pairs([("hu", "Rövid haj")]))
            .expect("add variant");

        let units = collect_units(&store, tenant, "hu", None).expect("Should collect");
        assert_eq!(units.len(), 4);
        assert!(units
            .iter()
            .any(|u| matches!(u.target, UnitTarget::VariantLabel { .. })));
    }

    #[test]
    fn test_enumeration_is_restartable_and_stable() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        store
            .add_service(
                tenant,
                &MultilingualText::from_pairs([("hu", "Hajvágás")]),
                &MultilingualText::from_pairs([("hu", "Fodrászat")]),
                &MultilingualText::new(),
            )
            .expect("add");

        let first = collect_units(&store, tenant, "hu", None).expect("collect");
        let second = collect_units(&store, tenant, "hu", None).expect("collect");
        assert_eq!(first, second);
    }

    #[test]
    fn test_source_language_selects_text() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        store
            .add_service(
                tenant,
                &MultilingualText::from_pairs([("hu", "Hajvágás"), ("en", "Haircut")]),
                &MultilingualText::new(),
                &MultilingualText::new(),
            )
            .expect("add");

        let units = collect_units(&store, tenant, "en", None).expect("collect");
        assert_eq!(units[0].translatable_text(), Some("Haircut"));
    }
}
