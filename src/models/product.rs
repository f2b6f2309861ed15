use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Товар в том виде, в котором его отдает Warehouse API.
/// Все поля опциональны: источником истины является удаленный сервис,
/// и любое поле может отсутствовать в ответе.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProductRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category_name: Option<String>,
    pub base_price: Option<f64>,
    pub total_quantity: Option<i64>,
    pub is_active: Option<bool>,
    /// Поля, которые бот не моделирует (атрибуты термокружек и т.п.).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Фильтры для GET /products. Незаполненное поле не попадает в запрос.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub include_inactive: Option<bool>,
    pub include_out_of_stock: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ProductFilter {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Пары query-параметров: None опускается, bool сериализуется
    /// строчными "true"/"false".
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(min_price) = self.min_price {
            pairs.push(("min_price", min_price.to_string()));
        }
        if let Some(max_price) = self.max_price {
            pairs.push(("max_price", max_price.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(include_inactive) = self.include_inactive {
            pairs.push(("include_inactive", include_inactive.to_string()));
        }
        if let Some(include_out_of_stock) = self.include_out_of_stock {
            pairs.push(("include_out_of_stock", include_out_of_stock.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }

        pairs
    }
}

/// Тело POST /products/thermocups/create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermocupDraft {
    pub name: String,
    pub category_id: i64,
    pub base_price: f64,
    pub initial_quantity: i64,
    pub warehouse_id: i64,
    pub path_to_photo: String,
    pub attributes: ThermocupAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermocupAttributes {
    pub volume_ml: i64,
    pub color: String,
    pub brand: String,
    pub model: String,
    pub is_hermetic: bool,
    pub material: String,
}

/// Тело PUT /products/thermocups/update/{id}: любое подмножество полей.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThermocupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ThermocupUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.base_price.is_none()
            && self.sku.is_none()
            && self.is_active.is_none()
    }

    /// Имена заполненных полей, для отчета пользователю.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.base_price.is_some() {
            fields.push("base_price");
        }
        if self.sku.is_some() {
            fields.push("sku");
        }
        if self.is_active.is_some() {
            fields.push("is_active");
        }
        fields
    }
}
