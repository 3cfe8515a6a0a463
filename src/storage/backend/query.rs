//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use super::converters::model_to_record;
use super::{SeaOrmStorage, retry};
use crate::errors::Result;
use crate::storage::LinkRecord;

use migration::entities::link_record;

impl SeaOrmStorage {
    pub(super) async fn get_by_id(&self, id: &str) -> Result<Option<LinkRecord>> {
        let db = &self.db;
        let id_owned = id.to_string();

        let model = retry::with_retry(&format!("find_by_id({})", id), self.retry_config, || async {
            link_record::Entity::find_by_id(id_owned.clone()).one(db).await
        })
        .await
        .map_err(|e| retry::to_storage_error("查询短链接", e))?;

        Ok(model.map(model_to_record))
    }

    pub(super) async fn get_by_code(&self, code: &str) -> Result<Option<LinkRecord>> {
        let db = &self.db;
        let code_owned = code.to_string();

        let model = retry::with_retry(
            &format!("find_by_code({})", code),
            self.retry_config,
            || async {
                link_record::Entity::find()
                    .filter(link_record::Column::ShortUrl.eq(code_owned.as_str()))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| retry::to_storage_error("查询短链接", e))?;

        Ok(model.map(model_to_record))
    }
}
