//! SQLite-backed record store for tenants, localizable content, language
//! bindings and UI translation overrides.
//!
//! Multilingual columns hold one JSON document each (see [`MultilingualText`]);
//! bindings and overrides use composite keys with upsert semantics so that
//! concurrent job checkpoints degrade to last-writer-wins.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::lifecycle::{LanguageBinding, TranslationStatus};
use crate::multilingual::MultilingualText;
use crate::tenant::Tenant;

/// A service/price-list entry with three independently translated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub id: i64,
    pub tenant_id: i64,
    pub name: MultilingualText,
    pub category: MultilingualText,
    pub description: MultilingualText,
}

/// One priceable variant of a service (e.g. "short hair" / "long hair").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceVariant {
    pub id: i64,
    pub service_id: i64,
    pub label: MultilingualText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCategory {
    pub id: i64,
    pub tenant_id: i64,
    pub name: MultilingualText,
}

/// The translated field of a service row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    Name,
    Category,
    Description,
}

impl ServiceField {
    fn column(&self) -> &'static str {
        match self {
            ServiceField::Name => "name",
            ServiceField::Category => "category",
            ServiceField::Description => "description",
        }
    }
}

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the store and bootstrap the schema.
    pub fn open(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tenants (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                default_language TEXT NOT NULL,
                domain TEXT,
                business_type TEXT NOT NULL DEFAULT '',
                is_deleted INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tenant_id INTEGER NOT NULL,
                name TEXT NOT NULL DEFAULT '{}',
                category TEXT NOT NULL DEFAULT '{}',
                description TEXT NOT NULL DEFAULT '{}'
            );
            CREATE TABLE IF NOT EXISTS service_variants (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                service_id INTEGER NOT NULL,
                label TEXT NOT NULL DEFAULT '{}'
            );
            CREATE TABLE IF NOT EXISTS gallery_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tenant_id INTEGER NOT NULL,
                name TEXT NOT NULL DEFAULT '{}'
            );
            CREATE TABLE IF NOT EXISTS language_bindings (
                tenant_id INTEGER NOT NULL,
                language_code TEXT NOT NULL,
                status TEXT NOT NULL,
                progress INTEGER NOT NULL DEFAULT 0,
                last_updated TEXT NOT NULL,
                PRIMARY KEY (tenant_id, language_code)
            );
            CREATE TABLE IF NOT EXISTS ui_overrides (
                tenant_id INTEGER NOT NULL,
                language_code TEXT NOT NULL,
                translation_key TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                PRIMARY KEY (tenant_id, language_code, translation_key)
            );",
        )
        .context("Failed to bootstrap schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ==================== Tenants ====================

    pub fn create_tenant(
        &self,
        name: &str,
        default_language: &str,
        domain: Option<&str>,
        business_type: &str,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tenants (name, default_language, domain, business_type) VALUES (?1, ?2, ?3, ?4)",
            params![name, default_language, domain, business_type],
        )
        .context("Failed to create tenant")?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch a tenant by id. Deleted tenants are treated as absent.
    pub fn get_tenant(&self, id: i64) -> Result<Option<Tenant>> {
        let conn = self.conn.lock().unwrap();
        let tenant = conn
            .query_row(
                "SELECT id, name, default_language, domain, business_type, is_deleted
                 FROM tenants WHERE id = ?1 AND is_deleted = 0",
                params![id],
                Self::map_tenant,
            )
            .optional()
            .context("Failed to fetch tenant")?;
        Ok(tenant)
    }

    /// Look up the non-deleted tenant whose routing domain equals `domain`.
    pub fn find_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>> {
        let conn = self.conn.lock().unwrap();
        let tenant = conn
            .query_row(
                "SELECT id, name, default_language, domain, business_type, is_deleted
                 FROM tenants WHERE domain = ?1 AND is_deleted = 0",
                params![domain],
                Self::map_tenant,
            )
            .optional()
            .context("Failed to look up tenant by domain")?;
        Ok(tenant)
    }

    pub fn set_tenant_deleted(&self, id: i64, deleted: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE tenants SET is_deleted = ?1 WHERE id = ?2",
            params![deleted as i64, id],
        )
        .context("Failed to update tenant deletion flag")?;
        Ok(())
    }

    fn map_tenant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tenant> {
        Ok(Tenant {
            id: row.get(0)?,
            name: row.get(1)?,
            default_language: row.get(2)?,
            domain: row.get(3)?,
            business_type: row.get(4)?,
            is_deleted: row.get::<_, i64>(5)? != 0,
        })
    }

    // ==================== Services / Variants / Gallery ====================

    pub fn add_service(
        &self,
        tenant_id: i64,
        name: &MultilingualText,
        category: &MultilingualText,
        description: &MultilingualText,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO services (tenant_id, name, category, description) VALUES (?1, ?2, ?3, ?4)",
            params![
                tenant_id,
                name.to_json()?,
                category.to_json()?,
                description.to_json()?
            ],
        )
        .context("Failed to add service")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_services(&self, tenant_id: i64) -> Result<Vec<Service>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, name, category, description
             FROM services WHERE tenant_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![tenant_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, tenant_id, name, category, description)| {
                Ok(Service {
                    id,
                    tenant_id,
                    name: MultilingualText::from_json(&name)?,
                    category: MultilingualText::from_json(&category)?,
                    description: MultilingualText::from_json(&description)?,
                })
            })
            .collect()
    }

    pub fn add_service_variant(&self, service_id: i64, label: &MultilingualText) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO service_variants (service_id, label) VALUES (?1, ?2)",
            params![service_id, label.to_json()?],
        )
        .context("Failed to add service variant")?;
        Ok(conn.last_insert_rowid())
    }

    /// All variants of a tenant's services, in (service, variant) id order.
    pub fn list_service_variants(&self, tenant_id: i64) -> Result<Vec<ServiceVariant>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT v.id, v.service_id, v.label
             FROM service_variants v
             JOIN services s ON s.id = v.service_id
             WHERE s.tenant_id = ?1
             ORDER BY v.service_id, v.id",
        )?;
        let rows = stmt
            .query_map(params![tenant_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, service_id, label)| {
                Ok(ServiceVariant {
                    id,
                    service_id,
                    label: MultilingualText::from_json(&label)?,
                })
            })
            .collect()
    }

    pub fn add_gallery_category(&self, tenant_id: i64, name: &MultilingualText) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO gallery_categories (tenant_id, name) VALUES (?1, ?2)",
            params![tenant_id, name.to_json()?],
        )
        .context("Failed to add gallery category")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_gallery_categories(&self, tenant_id: i64) -> Result<Vec<GalleryCategory>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, name FROM gallery_categories WHERE tenant_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![tenant_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, tenant_id, name)| {
                Ok(GalleryCategory {
                    id,
                    tenant_id,
                    name: MultilingualText::from_json(&name)?,
                })
            })
            .collect()
    }

    // ==================== In-place multilingual mutations ====================

    /// Write one language key of one service field, read-modify-write so the
    /// other languages' entries survive untouched.
    pub fn set_service_text(
        &self,
        service_id: i64,
        field: ServiceField,
        language: &str,
        value: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let column = field.column();
        let json: String = conn
            .query_row(
                &format!("SELECT {} FROM services WHERE id = ?1", column),
                params![service_id],
                |row| row.get(0),
            )
            .context("Service not found for translation write")?;
        let mut text = MultilingualText::from_json(&json)?;
        text.set(language, value);
        conn.execute(
            &format!("UPDATE services SET {} = ?1 WHERE id = ?2", column),
            params![text.to_json()?, service_id],
        )
        .context("Failed to write service translation")?;
        Ok(())
    }

    pub fn set_variant_label(&self, variant_id: i64, language: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let json: String = conn
            .query_row(
                "SELECT label FROM service_variants WHERE id = ?1",
                params![variant_id],
                |row| row.get(0),
            )
            .context("Variant not found for translation write")?;
        let mut label = MultilingualText::from_json(&json)?;
        label.set(language, value);
        conn.execute(
            "UPDATE service_variants SET label = ?1 WHERE id = ?2",
            params![label.to_json()?, variant_id],
        )
        .context("Failed to write variant translation")?;
        Ok(())
    }

    pub fn set_gallery_category_name(
        &self,
        category_id: i64,
        language: &str,
        value: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let json: String = conn
            .query_row(
                "SELECT name FROM gallery_categories WHERE id = ?1",
                params![category_id],
                |row| row.get(0),
            )
            .context("Gallery category not found for translation write")?;
        let mut name = MultilingualText::from_json(&json)?;
        name.set(language, value);
        conn.execute(
            "UPDATE gallery_categories SET name = ?1 WHERE id = ?2",
            params![name.to_json()?, category_id],
        )
        .context("Failed to write gallery translation")?;
        Ok(())
    }

    // ==================== Language bindings ====================

    /// Insert or reset the binding for (tenant, language). Re-adding an
    /// existing language never creates a duplicate row.
    pub fn upsert_binding(
        &self,
        tenant_id: i64,
        language_code: &str,
        status: TranslationStatus,
        progress: u8,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO language_bindings (tenant_id, language_code, status, progress, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(tenant_id, language_code)
             DO UPDATE SET status = ?3, progress = ?4, last_updated = ?5",
            params![
                tenant_id,
                language_code,
                status.as_str(),
                progress,
                Utc::now().to_rfc3339()
            ],
        )
        .context("Failed to upsert language binding")?;
        Ok(())
    }

    pub fn get_binding(&self, tenant_id: i64, language_code: &str) -> Result<Option<LanguageBinding>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT tenant_id, language_code, status, progress, last_updated
                 FROM language_bindings WHERE tenant_id = ?1 AND language_code = ?2",
                params![tenant_id, language_code],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .context("Failed to fetch language binding")?;

        row.map(Self::binding_from_row).transpose()
    }

    pub fn list_bindings(&self, tenant_id: i64) -> Result<Vec<LanguageBinding>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT tenant_id, language_code, status, progress, last_updated
             FROM language_bindings WHERE tenant_id = ?1 ORDER BY language_code",
        )?;
        let rows = stmt
            .query_map(params![tenant_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::binding_from_row).collect()
    }

    fn binding_from_row(
        (tenant_id, language_code, status, progress, last_updated): (i64, String, String, i64, String),
    ) -> Result<LanguageBinding> {
        Ok(LanguageBinding {
            tenant_id,
            language_code,
            status: TranslationStatus::parse(&status)?,
            progress: progress.clamp(0, 100) as u8,
            last_updated,
        })
    }

    /// Progress checkpoint; leaves status untouched.
    pub fn update_binding_progress(
        &self,
        tenant_id: i64,
        language_code: &str,
        progress: u8,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE language_bindings SET progress = ?1, last_updated = ?2
             WHERE tenant_id = ?3 AND language_code = ?4",
            params![progress, Utc::now().to_rfc3339(), tenant_id, language_code],
        )
        .context("Failed to checkpoint progress")?;
        Ok(())
    }

    /// Status transition that leaves progress at its last checkpoint.
    pub fn update_binding_status(
        &self,
        tenant_id: i64,
        language_code: &str,
        status: TranslationStatus,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE language_bindings SET status = ?1, last_updated = ?2
             WHERE tenant_id = ?3 AND language_code = ?4",
            params![
                status.as_str(),
                Utc::now().to_rfc3339(),
                tenant_id,
                language_code
            ],
        )
        .context("Failed to update binding status")?;
        Ok(())
    }

    /// Returns false when no binding existed.
    pub fn delete_binding(&self, tenant_id: i64, language_code: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(
                "DELETE FROM language_bindings WHERE tenant_id = ?1 AND language_code = ?2",
                params![tenant_id, language_code],
            )
            .context("Failed to delete language binding")?;
        Ok(affected > 0)
    }

    // ==================== UI overrides ====================

    pub fn upsert_override(
        &self,
        tenant_id: i64,
        language_code: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO ui_overrides (tenant_id, language_code, translation_key, translated_text)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(tenant_id, language_code, translation_key)
             DO UPDATE SET translated_text = ?4",
            params![tenant_id, language_code, key, value],
        )
        .context("Failed to upsert override")?;
        Ok(())
    }

    pub fn get_override(
        &self,
        tenant_id: i64,
        language_code: &str,
        key: &str,
    ) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT translated_text FROM ui_overrides
                 WHERE tenant_id = ?1 AND language_code = ?2 AND translation_key = ?3",
                params![tenant_id, language_code, key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to fetch override")?;
        Ok(value)
    }

    /// Flat key → value map of every override for (tenant, language).
    pub fn list_overrides(
        &self,
        tenant_id: i64,
        language_code: &str,
    ) -> Result<BTreeMap<String, String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT translation_key, translated_text FROM ui_overrides
             WHERE tenant_id = ?1 AND language_code = ?2",
        )?;
        let map = stmt
            .query_map(params![tenant_id, language_code], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(map)
    }

    pub fn delete_override(&self, tenant_id: i64, language_code: &str, key: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(
                "DELETE FROM ui_overrides
                 WHERE tenant_id = ?1 AND language_code = ?2 AND translation_key = ?3",
                params![tenant_id, language_code, key],
            )
            .context("Failed to delete override")?;
        Ok(affected > 0)
    }

    /// Cascade used by language deletion; embedded multilingual keys are
    /// deliberately left in place (inert leftover data, not cleaned up).
    pub fn delete_overrides_for_language(
        &self,
        tenant_id: i64,
        language_code: &str,
    ) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(
                "DELETE FROM ui_overrides WHERE tenant_id = ?1 AND language_code = ?2",
                params![tenant_id, language_code],
            )
            .context("Failed to cascade override deletion")?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_store.db");
        let store = Store::open(db_path.to_str().unwrap()).expect("Failed to open store");
        (store, temp_dir)
    }

    fn seed_tenant(store: &Store) -> i64 {
        store
            .create_tenant("Skani Salon", "hu", Some("skanisalon.sk"), "Beauty Salon")
            .expect("Should create tenant")
    }

    // ==================== Store Initialization Tests ====================

    #[test]
    fn test_open_creates_schema() {
        let (store, _dir) = create_test_store();
        assert!(store.get_tenant(1).expect("Should query").is_none());
    }

    #[test]
    fn test_reopening_persists_data() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("persist.db");
        let path = db_path.to_str().unwrap();

        let id = {
            let store = Store::open(path).expect("Should open");
            seed_tenant(&store)
        };
        {
            let store = Store::open(path).expect("Should reopen");
            let tenant = store.get_tenant(id).expect("ok").expect("exists");
            assert_eq!(tenant.name, "Skani Salon");
            assert_eq!(tenant.default_language, "hu");
        }
    }

    #[test]
    fn test_invalid_database_path() {
        assert!(Store::open("/non/existent/path/store.db").is_err());
    }

    // ==================== Tenant Tests ====================

    #[test]
    fn test_deleted_tenant_hidden_from_lookups() {
        let (store, _dir) = create_test_store();
        let id = seed_tenant(&store);
        store.set_tenant_deleted(id, true).expect("Should mark");
        assert!(store.get_tenant(id).expect("ok").is_none());
        assert!(store
            .find_tenant_by_domain("skanisalon.sk")
            .expect("ok")
            .is_none());
    }

    #[test]
    fn test_find_tenant_by_domain() {
        let (store, _dir) = create_test_store();
        let id = seed_tenant(&store);
        let tenant = store
            .find_tenant_by_domain("skanisalon.sk")
            .expect("ok")
            .expect("exists");
        assert_eq!(tenant.id, id);
        assert!(store.find_tenant_by_domain("other.sk").expect("ok").is_none());
    }

    // ==================== Multilingual Write Tests ====================

    #[test]
    fn test_set_service_text_preserves_other_languages() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        let service = store
            .add_service(
                tenant,
                &MultilingualText::from_pairs([("hu", "Hajvágás")]),
                &MultilingualText::from_pairs([("hu", "Fodrászat")]),
                &MultilingualText::new(),
            )
            .expect("Should add");

        store
            .set_service_text(service, ServiceField::Name, "sk", "Strihanie")
            .expect("Should write");

        let services = store.list_services(tenant).expect("Should list");
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name.get("hu"), Some("Hajvágás"));
        assert_eq!(services[0].name.get("sk"), Some("Strihanie"));
        assert_eq!(services[0].category.get("hu"), Some("Fodrászat"));
    }

    #[test]
    fn test_set_variant_label_round_trip() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        let service = store
            .add_service(
                tenant,
                &MultilingualText::from_pairs([("hu", "Hajvágás")]),
                &MultilingualText::new(),
                &MultilingualText::new(),
            )
            .expect("Should add");
        let variant = store
            .add_service_variant(service, &MultilingualText::from_pairs([("hu", "Rövid haj")]))
            .expect("Should add variant");

        store
            .set_variant_label(variant, "sk", "Krátke vlasy")
            .expect("Should write");

        let variants = store.list_service_variants(tenant).expect("Should list");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].label.get("hu"), Some("Rövid haj"));
        assert_eq!(variants[0].label.get("sk"), Some("Krátke vlasy"));
    }

    #[test]
    fn test_set_gallery_category_name() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        let category = store
            .add_gallery_category(tenant, &MultilingualText::from_pairs([("hu", "Esküvő")]))
            .expect("Should add");

        store
            .set_gallery_category_name(category, "sk", "Svadba")
            .expect("Should write");

        let categories = store.list_gallery_categories(tenant).expect("Should list");
        assert_eq!(categories[0].name.get("sk"), Some("Svadba"));
        assert_eq!(categories[0].name.get("hu"), Some("Esküvő"));
    }

    // ==================== Binding Tests ====================

    #[test]
    fn test_upsert_binding_does_not_duplicate() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);

        store
            .upsert_binding(tenant, "sk", TranslationStatus::Translating, 0)
            .expect("Should insert");
        store
            .upsert_binding(tenant, "sk", TranslationStatus::Translating, 0)
            .expect("Should reset");

        let bindings = store.list_bindings(tenant).expect("Should list");
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].status, TranslationStatus::Translating);
    }

    #[test]
    fn test_progress_checkpoint_keeps_status() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        store
            .upsert_binding(tenant, "sk", TranslationStatus::Translating, 0)
            .expect("insert");

        store
            .update_binding_progress(tenant, "sk", 45)
            .expect("checkpoint");

        let binding = store.get_binding(tenant, "sk").expect("ok").expect("exists");
        assert_eq!(binding.progress, 45);
        assert_eq!(binding.status, TranslationStatus::Translating);
    }

    #[test]
    fn test_status_update_keeps_progress() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        store
            .upsert_binding(tenant, "sk", TranslationStatus::Translating, 0)
            .expect("insert");
        store
            .update_binding_progress(tenant, "sk", 45)
            .expect("checkpoint");

        store
            .update_binding_status(tenant, "sk", TranslationStatus::Error)
            .expect("fail");

        let binding = store.get_binding(tenant, "sk").expect("ok").expect("exists");
        assert_eq!(binding.status, TranslationStatus::Error);
        assert_eq!(binding.progress, 45, "Error must leave the last checkpoint");
    }

    #[test]
    fn test_delete_missing_binding_returns_false() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        assert!(!store.delete_binding(tenant, "sk").expect("ok"));
    }

    // ==================== Override Tests ====================

    #[test]
    fn test_override_upsert_semantics() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);

        store
            .upsert_override(tenant, "sk", "nav.services", "Služby")
            .expect("insert");
        store
            .upsert_override(tenant, "sk", "nav.services", "Kezelések")
            .expect("replace");

        let map = store.list_overrides(tenant, "sk").expect("list");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("nav.services").map(String::as_str), Some("Kezelések"));
    }

    #[test]
    fn test_overrides_scoped_per_tenant_and_language() {
        let (store, _dir) = create_test_store();
        let tenant_a = seed_tenant(&store);
        let tenant_b = store
            .create_tenant("Other", "hu", None, "")
            .expect("create");

        store
            .upsert_override(tenant_a, "sk", "nav.home", "Domov")
            .expect("insert");
        store
            .upsert_override(tenant_a, "en", "nav.home", "Home")
            .expect("insert");
        store
            .upsert_override(tenant_b, "sk", "nav.home", "Iné")
            .expect("insert");

        let map = store.list_overrides(tenant_a, "sk").expect("list");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("nav.home").map(String::as_str), Some("Domov"));
    }

    #[test]
    fn test_language_deletion_cascade_removes_only_that_language() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        store
            .upsert_override(tenant, "sk", "nav.home", "Domov")
            .expect("insert");
        store
            .upsert_override(tenant, "sk", "nav.services", "Služby")
            .expect("insert");
        store
            .upsert_override(tenant, "en", "nav.home", "Home")
            .expect("insert");

        let removed = store
            .delete_overrides_for_language(tenant, "sk")
            .expect("cascade");
        assert_eq!(removed, 2);
        assert!(store.list_overrides(tenant, "sk").expect("list").is_empty());
        assert_eq!(store.list_overrides(tenant, "en").expect("list").len(), 1);
    }

    #[test]
    fn test_explicit_override_removal() {
        let (store, _dir) = create_test_store();
        let tenant = seed_tenant(&store);
        store
            .upsert_override(tenant, "sk", "nav.home", "Domov")
            .expect("insert");

        assert!(store.delete_override(tenant, "sk", "nav.home").expect("ok"));
        assert!(!store.delete_override(tenant, "sk", "nav.home").expect("ok"));
        assert_eq!(store.get_override(tenant, "sk", "nav.home").expect("ok"), None);
    }
}
