use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewProduct, ProductView};
use crate::domain::ports::ProductCatalog;
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn view_from(row: ProductRow) -> ProductView {
    ProductView {
        id: row.id,
        name: row.name,
        unit_price: row.unit_price,
        image_url: row.image_url,
        created_at: row.created_at,
    }
}

impl ProductCatalog for DieselProductCatalog {
    fn create(&self, product: NewProduct) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;
        let id = Uuid::new_v4();
        diesel::insert_into(products::table)
            .values(&NewProductRow {
                id,
                name: product.name,
                unit_price: product.unit_price,
                image_url: product.image_url,
            })
            .execute(&mut conn)?;
        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)?;
        Ok(view_from(row))
    }

    fn list(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(view_from).collect())
    }

    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(view_from).collect())
    }
}
