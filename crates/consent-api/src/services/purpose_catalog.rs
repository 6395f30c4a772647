//! Purpose catalog collaborator
//!
//! The consent core only needs one catalog capability: resolving a purpose
//! definition by name within a tenant. Lookups run strictly outside the
//! aggregate transactions. A catalog miss during a read yields empty
//! enrichment, never a failure; during a write it rejects the request.

use async_trait::async_trait;
use consent_core::errors::ConsentResult;
use consent_db::repositories::PurposeRepository;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;

/// Purpose definition as seen by the consent core
#[derive(Debug, Clone, PartialEq)]
pub struct PurposeDefinition {
    pub purpose_id: String,
    pub name: String,
    pub description: String,
    pub purpose_type: String,
    pub attributes: Value,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurposeCatalog: Send + Sync {
    async fn get_purpose_by_name(
        &self,
        org_id: &str,
        name: &str,
    ) -> ConsentResult<Option<PurposeDefinition>>;
}

/// Catalog backed by the `consent_purpose` table
pub struct DbPurposeCatalog {
    db: Arc<DatabaseConnection>,
    purposes: PurposeRepository,
}

impl DbPurposeCatalog {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            purposes: PurposeRepository,
        }
    }
}

#[async_trait]
impl PurposeCatalog for DbPurposeCatalog {
    async fn get_purpose_by_name(
        &self,
        org_id: &str,
        name: &str,
    ) -> ConsentResult<Option<PurposeDefinition>> {
        let row = self.purposes.get_by_name(&*self.db, org_id, name).await?;

        Ok(row.map(|model| PurposeDefinition {
            purpose_id: model.purpose_id,
            name: model.name,
            description: model.description.unwrap_or_default(),
            purpose_type: model.purpose_type.unwrap_or_default(),
            attributes: model.attributes.unwrap_or_else(|| serde_json::json!({})),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_catalog_resolves_by_name() {
        let mut catalog = MockPurposeCatalog::new();
        catalog.expect_get_purpose_by_name().returning(|_, name| {
            Ok(Some(PurposeDefinition {
                purpose_id: "p1".to_string(),
                name: name.to_string(),
                description: String::new(),
                purpose_type: String::new(),
                attributes: serde_json::json!({}),
            }))
        });

        let definition = catalog
            .get_purpose_by_name("org-1", "data_access")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(definition.name, "data_access");
        assert_eq!(definition.purpose_id, "p1");
    }
}
