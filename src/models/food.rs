use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::db::{Document, StoreError};

/// Document field holding the provider's email.
pub const PROVIDER_EMAIL: &str = "providerEmail";
/// Document field holding the number of units sold.
pub const SOLD_ITEMS: &str = "soldItems";

/// A food item as submitted by a provider.
///
/// Body of `POST /addfood`. Full updates use [`FoodUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub provider_email: String,
    pub provider_name: String,
    pub food_name: String,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
    pub photo: String,
    pub description: String,
    #[serde(default)]
    pub sold_items: i64,
}

impl Food {
    pub fn to_document(&self) -> Result<Document, StoreError> {
        crate::db::to_document(self)
    }
}

/// A food item read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFood {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub food: Food,
}

impl StoredFood {
    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
    }
}

impl fmt::Display for StoredFood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let food = &self.food;
        writeln!(f, "{}", food.food_name)?;
        writeln!(f, "{}", "=".repeat(food.food_name.len()))?;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Category: {}", food.category)?;
        writeln!(f, "Provider: {} <{}>", food.provider_name, food.provider_email)?;
        writeln!(f, "Price: {:.2}", food.price)?;
        writeln!(f, "Quantity: {}", food.quantity)?;
        write!(f, "Sold: {}", food.sold_items)
    }
}

/// Body of `PATCH /updatefood/{id}`.
///
/// Every listed field is required except `soldItems`, which keeps its stored
/// value when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodUpdate {
    pub provider_email: String,
    pub provider_name: String,
    pub food_name: String,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
    pub photo: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_items: Option<i64>,
}

impl FoodUpdate {
    pub fn to_document(&self) -> Result<Document, StoreError> {
        crate::db::to_document(self)
    }
}

/// Body of `PATCH /foods/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldItemsUpdate {
    pub sold_items: i64,
}

impl SoldItemsUpdate {
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(SOLD_ITEMS.to_string(), self.sold_items.into());
        doc
    }
}
