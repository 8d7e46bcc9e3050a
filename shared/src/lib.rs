use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw form input keyed by column name (e.g. `"monto" -> "125.50"`)
pub type FieldMap = BTreeMap<String, String>;

/// A purchase row from the `compras` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    /// Free-form purchase date as typed by the user
    pub date: String,
    pub supplier: String,
    pub amount: f64,
    /// Identifier of the purchased product (not linked to the product catalog)
    pub product_identifier: String,
    pub customer: String,
}

/// An employee row from the `empleados` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub hire_date: String,
    pub salary: f64,
    pub branch: String,
    pub email: String,
    pub phone: String,
    /// Empty while the employee is still active
    pub termination_date: String,
}

/// A catalog product; the SKU is always stored uppercase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
}

/// A production lot joined with the name of its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: i64,
    pub product_sku: String,
    /// Name of the referenced product, `None` if the product row is gone
    pub product_name: Option<String>,
    pub quantity: i64,
    /// Local time, `YYYY-MM-DD HH:MM:SS`
    pub created_at: String,
}

/// A single quality measurement recorded against a lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityControl {
    pub id: i64,
    pub lot_id: i64,
    pub parameter: String,
    pub value: f64,
    pub approved: bool,
    /// Local time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

impl QualityControl {
    /// Label used by the traceability detail view
    pub fn verdict(&self) -> &'static str {
        if self.approved {
            "APPROVED"
        } else {
            "REJECTED"
        }
    }
}

impl fmt::Display for QualityControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.timestamp,
            self.parameter,
            self.value,
            self.verdict()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRecordRequest {
    /// Values may be sent as JSON strings, numbers or booleans; all are
    /// validated as text
    #[serde(deserialize_with = "deserialize_field_map")]
    pub fields: FieldMap,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldInput {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Flag(bool),
}

impl From<FieldInput> for String {
    fn from(input: FieldInput) -> Self {
        match input {
            FieldInput::Text(text) => text,
            FieldInput::Integer(n) => n.to_string(),
            FieldInput::Decimal(n) => n.to_string(),
            FieldInput::Flag(flag) => flag.to_string(),
        }
    }
}

fn deserialize_field_map<'de, D>(deserializer: D) -> Result<FieldMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, FieldInput>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(name, value)| (name, value.into())).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRecordResponse<T> {
    /// Identifier assigned by the store
    pub id: i64,
    pub success_message: String,
    /// Listing re-read from the store after the insert; empty when that
    /// re-read failed
    pub records: Vec<T>,
    /// Why the listing could not be re-read. The record was stored anyway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordListResponse<T> {
    pub records: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRecordResponse<T> {
    pub deleted_id: i64,
    pub success_message: String,
    pub records: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_error: Option<String>,
}

/// Quality controls of one lot, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotTraceabilityResponse {
    pub lot_id: i64,
    pub quality_controls: Vec<QualityControl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

/// Category of a failed operation, mirrored by the HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    Referential,
    NotFound,
    NoSelection,
    Store,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
    /// Offending form field for validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
