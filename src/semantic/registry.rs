//! Built-in concept registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How one logical concept maps onto concrete column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMapping {
    /// The canonical column name, tried first.
    pub primary_column: String,
    /// Known alternative spellings, tried in order with exact matching.
    pub variations: Vec<String>,
    /// Lowercase fragments, tried in order with case-insensitive substring matching.
    pub patterns: Vec<String>,
}

impl ConceptMapping {
    pub fn new(primary_column: &str, variations: &[&str], patterns: &[&str]) -> Self {
        Self {
            primary_column: primary_column.to_string(),
            variations: variations.iter().map(|s| s.to_string()).collect(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The concepts every resolver starts with, in declaration order.
pub fn default_mappings() -> IndexMap<String, ConceptMapping> {
    let entries = [
        (
            "customer",
            ConceptMapping::new(
                "CUSTOMER_NAME",
                &["CUSTOMER_NAME", "customer_name", "Customer", "customer", "CLIENT_NAME", "client"],
                &["customer", "client", "buyer"],
            ),
        ),
        (
            "product",
            ConceptMapping::new(
                "PRODUCT_NAME",
                &["PRODUCT_NAME", "product_name", "Product", "product", "ITEM_NAME", "item"],
                &["product", "item", "goods"],
            ),
        ),
        (
            "category",
            ConceptMapping::new(
                "CATEGORY",
                &["CATEGORY", "category", "Category", "PRODUCT_CATEGORY", "product_category"],
                &["category", "type", "class"],
            ),
        ),
        (
            "ship_mode",
            ConceptMapping::new(
                "SHIP_MODE",
                &[
                    "SHIP_MODE",
                    "ship_mode",
                    "Ship_Mode",
                    "SHIPPING_MODE",
                    "shipping_mode",
                    "DELIVERY_METHOD",
                    "delivery_method",
                ],
                &["ship", "shipping", "delivery", "transport"],
            ),
        ),
        (
            "sub_category",
            ConceptMapping::new(
                "SUB_CATEGORY",
                &["SUB_CATEGORY", "sub_category", "Sub_Category", "SUBCATEGORY", "subcategory"],
                &["sub", "subcategory"],
            ),
        ),
        (
            "region",
            ConceptMapping::new(
                "REGION",
                &["REGION", "region", "Region", "AREA", "area"],
                &["region", "area", "territory"],
            ),
        ),
        (
            "state",
            ConceptMapping::new(
                "STATE",
                &["STATE", "state", "State", "PROVINCE", "province"],
                &["state", "province"],
            ),
        ),
        (
            "city",
            ConceptMapping::new(
                "CITY",
                &["CITY", "city", "City", "TOWN", "town"],
                &["city", "town", "municipality"],
            ),
        ),
        (
            "country",
            ConceptMapping::new(
                "COUNTRY",
                &["COUNTRY", "country", "Country", "NATION", "nation"],
                &["country", "nation"],
            ),
        ),
        (
            "segment",
            ConceptMapping::new(
                "SEGMENT",
                &["SEGMENT", "segment", "Segment", "CUSTOMER_SEGMENT", "customer_segment"],
                &["segment", "type"],
            ),
        ),
        (
            "sales",
            ConceptMapping::new(
                "SALES",
                &["SALES", "sales", "Sales", "REVENUE", "revenue", "AMOUNT", "amount"],
                &["sales", "revenue", "amount", "total"],
            ),
        ),
        (
            "profit",
            ConceptMapping::new(
                "PROFIT",
                &["PROFIT", "profit", "Profit", "NET_PROFIT", "net_profit", "MARGIN_AMOUNT", "margin"],
                &["profit", "margin", "earning"],
            ),
        ),
        (
            "discount",
            ConceptMapping::new(
                "DISCOUNT",
                &["DISCOUNT", "discount", "Discount", "DISCOUNT_AMOUNT", "discount_amount"],
                &["discount", "rebate", "reduction"],
            ),
        ),
        (
            "quantity",
            ConceptMapping::new(
                "QUANTITY",
                &["QUANTITY", "quantity", "Quantity", "QTY", "qty", "UNITS", "units"],
                &["quantity", "qty", "units", "count"],
            ),
        ),
        (
            "date",
            ConceptMapping::new(
                "ORDER_DATE",
                &["ORDER_DATE", "order_date", "Date", "date", "SHIP_DATE", "ship_date", "CREATED_DATE"],
                &["date", "time", "created", "order", "ship"],
            ),
        ),
        (
            "order",
            ConceptMapping::new(
                "ORDER_ID",
                &["ORDER_ID", "order_id", "Order_ID", "ORDER_NUMBER", "order_number"],
                &["order", "id", "number"],
            ),
        ),
    ];

    entries
        .into_iter()
        .map(|(name, mapping)| (name.to_string(), mapping))
        .collect()
}
