use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductFilter, ProductPatch, RatedProduct};
use crate::domain::role::Permission;
use crate::domain::user::Caller;

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn ProductRepository>,
}

fn name_taken() -> DomainError {
    DomainError::field("name", "A product with this name already exists.")
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub fn create(&self, caller: &Caller, product: NewProduct) -> Result<Product, DomainError> {
        caller.require(Permission::ManageCatalog)?;
        product.validate()?;
        if self.repo.name_exists(&product.name, None)? {
            return Err(name_taken());
        }
        let product = self.repo.create(product)?;
        log::info!("Product {} created", product.id);
        Ok(product)
    }

    pub fn list(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<RatedProduct>, DomainError> {
        self.repo.list(filter, page)
    }

    pub fn get(&self, id: Uuid) -> Result<RatedProduct, DomainError> {
        self.repo.find(id)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn update(&self, caller: &Caller, id: Uuid, patch: ProductPatch) -> Result<Product, DomainError> {
        caller.require(Permission::ManageCatalog)?;
        patch.validate()?;
        if let Some(name) = patch.name.as_deref() {
            if self.repo.name_exists(name, Some(id))? {
                return Err(name_taken());
            }
        }
        self.repo
            .update(id, patch)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        caller.require(Permission::ManageCatalog)?;
        if !self.repo.delete(id)? {
            return Err(DomainError::NotFound("Product"));
        }
        Ok(())
    }

    pub fn name_exists(&self, name: &str) -> Result<bool, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::field("name", "This field is required."));
        }
        self.repo.name_exists(name, None)
    }
}
