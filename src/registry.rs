//! Application Registry
//!
//! JSON-backed catalog of registered applications (tenants). The registry is
//! the authoritative list of names shown to users; it knows nothing about
//! vectors. Deleting an application removes the catalog entry only, so any
//! previously indexed passages remain in the vector store until the index is
//! rebuilt.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::prompt::COMPARISON_SCOPE;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Application already exists: {0}")]
    AlreadyExists(String),
    #[error("Application not found: {0}")]
    NotFound(String),
    #[error("Application name is reserved: {0}")]
    ReservedName(String),
    #[error("Application name cannot be empty")]
    EmptyName,
}

/// One registered application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub name: String,
    /// Basename of the most recently ingested manual, if any.
    pub manual_filename: Option<String>,
    pub added_at: DateTime<Utc>,
}

pub struct TenantRegistry {
    path: PathBuf,
    tenants: Vec<Tenant>,
}

impl TenantRegistry {
    /// Load the registry from `path`. A missing file is an empty registry;
    /// a corrupt file is logged and treated as empty rather than blocking
    /// every command.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let tenants = if path.exists() {
            let content = fs::read_to_string(path)?;
            match serde_json::from_str(&content) {
                Ok(tenants) => tenants,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Corrupt registry file; starting empty");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            tenants,
        })
    }

    pub fn list(&self) -> &[Tenant] {
        &self.tenants
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tenants.iter().any(|t| t.name == name)
    }

    /// Register a new application name and persist immediately.
    pub fn add(&mut self, name: &str) -> Result<&Tenant, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name == COMPARISON_SCOPE {
            return Err(RegistryError::ReservedName(name.to_string()));
        }
        if self.contains(name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }

        self.tenants.push(Tenant {
            name: name.to_string(),
            manual_filename: None,
            added_at: Utc::now(),
        });
        self.save()?;

        info!(name = %name, "Registered application");
        Ok(self.tenants.last().expect("just pushed"))
    }

    /// Remove an application from the catalog. Indexed passages for the name
    /// are untouched.
    pub fn delete(&mut self, name: &str) -> Result<(), RegistryError> {
        let before = self.tenants.len();
        self.tenants.retain(|t| t.name != name);
        if self.tenants.len() == before {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        self.save()?;

        info!(name = %name, "Deleted application");
        Ok(())
    }

    /// Record which manual was last ingested for an application, registering
    /// the name on the fly if it is new.
    pub fn record_ingestion(&mut self, name: &str, filename: &str) -> Result<(), RegistryError> {
        match self.tenants.iter_mut().find(|t| t.name == name) {
            Some(tenant) => tenant.manual_filename = Some(filename.to_string()),
            None => {
                if name.trim().is_empty() {
                    return Err(RegistryError::EmptyName);
                }
                if name == COMPARISON_SCOPE {
                    return Err(RegistryError::ReservedName(name.to_string()));
                }
                self.tenants.push(Tenant {
                    name: name.to_string(),
                    manual_filename: Some(filename.to_string()),
                    added_at: Utc::now(),
                });
            }
        }
        self.save()
    }

    fn save(&self) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.tenants)?;

        // Atomic replace so a crash mid-write keeps the previous catalog
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(dir: &tempfile::TempDir) -> TenantRegistry {
        TenantRegistry::load(&dir.path().join("apps.json")).unwrap()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(registry(&dir).list().is_empty());
    }

    #[test]
    fn test_add_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = registry(&dir);

        reg.add("Food Delivery").unwrap();
        reg.add("Travel Booking").unwrap();

        let names: Vec<&str> = reg.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Food Delivery", "Travel Booking"]);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = registry(&dir);

        reg.add("E-Commerce").unwrap();
        assert!(matches!(
            reg.add("E-Commerce"),
            Err(RegistryError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_reserved_and_empty_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = registry(&dir);

        assert!(matches!(
            reg.add("comparison"),
            Err(RegistryError::ReservedName(_))
        ));
        assert!(matches!(reg.add("   "), Err(RegistryError::EmptyName)));
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = registry(&dir);

        reg.add("Food Delivery").unwrap();
        reg.delete("Food Delivery").unwrap();
        assert!(reg.list().is_empty());

        assert!(matches!(
            reg.delete("Food Delivery"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_record_ingestion_registers_new_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = registry(&dir);

        reg.record_ingestion("Food Delivery", "fd_manual.pdf").unwrap();
        assert_eq!(reg.list().len(), 1);
        assert_eq!(
            reg.list()[0].manual_filename.as_deref(),
            Some("fd_manual.pdf")
        );

        reg.record_ingestion("Food Delivery", "fd_manual_v2.pdf").unwrap();
        assert_eq!(reg.list().len(), 1);
        assert_eq!(
            reg.list()[0].manual_filename.as_deref(),
            Some("fd_manual_v2.pdf")
        );
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");

        let mut reg = TenantRegistry::load(&path).unwrap();
        reg.add("Travel Booking").unwrap();
        drop(reg);

        let reloaded = TenantRegistry::load(&path).unwrap();
        assert_eq!(reloaded.list().len(), 1);
        assert_eq!(reloaded.list()[0].name, "Travel Booking");
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        fs::write(&path, "not json").unwrap();

        assert!(TenantRegistry::load(&path).unwrap().list().is_empty());
    }
}
