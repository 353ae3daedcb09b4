use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use super::{ValidationError, ValidationResult};

/// Field on a food document counting how often it has been ordered
pub const ORDERED_FIELD: &str = "ordered";

/// Full replacement of a food's editable fields.
///
/// Only these eight fields are written; anything else in the request body is
/// ignored. Used with upsert, so a missing id creates a document holding
/// exactly these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFoodRequest {
    pub food_name: String,
    pub food_image: String,
    pub food_category: String,
    pub price: f64,
    pub quantity: i64,
    pub description: String,
    pub provider: String,
    #[serde(rename = "providerEmail")]
    pub provider_email: String,
}

impl UpdateFoodRequest {
    /// `$set` update document for the eight named fields
    pub fn to_update(&self) -> Document {
        doc! {
            "$set": {
                "food_name": self.food_name.as_str(),
                "food_image": self.food_image.as_str(),
                "food_category": self.food_category.as_str(),
                "price": self.price,
                "quantity": self.quantity,
                "description": self.description.as_str(),
                "provider": self.provider.as_str(),
                "providerEmail": self.provider_email.as_str(),
            }
        }
    }
}

/// Partial update recording a food's new order count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchFoodRequest {
    #[serde(rename = "afterOrder")]
    pub after_order: i64,
}

impl PatchFoodRequest {
    pub fn to_update(&self) -> Document {
        doc! { "$set": { ORDERED_FIELD: self.after_order } }
    }
}

/// Query parameters for paging through foods
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
}

/// Resolved skip/limit window handed to the store.
///
/// `limit: None` returns everything after `skip`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// `skip = page * size`, `limit = size`; a missing or zero size means no limit.
    pub fn window(&self) -> ValidationResult<PageWindow> {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(0);

        let limit = i64::try_from(size).map_err(|_| ValidationError::OutOfRange {
            field: "size".to_string(),
            min: "0".to_string(),
            max: i64::MAX.to_string(),
            value: size.to_string(),
        })?;

        let skip = page
            .checked_mul(size)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "page".to_string(),
                value: page.to_string(),
                reason: format!("page * size overflows for size {}", size),
            })?;

        // The store takes a signed skip
        i64::try_from(skip).map_err(|_| ValidationError::OutOfRange {
            field: "page".to_string(),
            min: "0".to_string(),
            max: (i64::MAX as u64 / size.max(1)).to_string(),
            value: page.to_string(),
        })?;

        Ok(PageWindow {
            skip,
            limit: (limit > 0).then_some(limit),
        })
    }
}
