use std::fmt;

use serde::{Deserialize, Serialize};

/// Product identifier. Doubles as the ledger key of the product's record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId(s.to_string())
    }
}

/// Coarse lifecycle stage of a product.
///
/// Any string is a legal status: administrative overrides may set values
/// outside the four known stages, which are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductStatus {
    Created,
    Supplied,
    Wholesaled,
    Sold,
    Other(String),
}

impl ProductStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProductStatus::Created => "Created",
            ProductStatus::Supplied => "Supplied",
            ProductStatus::Wholesaled => "Wholesaled",
            ProductStatus::Sold => "Sold",
            ProductStatus::Other(s) => s,
        }
    }

    /// Total parse: unknown strings become `Other`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Created" => ProductStatus::Created,
            "Supplied" => ProductStatus::Supplied,
            "Wholesaled" => ProductStatus::Wholesaled,
            "Sold" => ProductStatus::Sold,
            other => ProductStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stored as the bare status string so records stay readable by other clients.
impl Serialize for ProductStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        Ok(ProductStatus::parse(&s))
    }
}

/// Arguments of the create transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(rename = "productID")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub manufacturing_date: String,
    pub batch_number: String,
}

/// The ledger record of one physical product.
///
/// Creation-time fields are mandatory. Lifecycle fields stay `None` until the
/// transition that sets them has run, and are omitted from the encoding while
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "productID")]
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub manufacturing_date: String,
    pub batch_number: String,
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wholesale_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wholesale_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
}

impl Product {
    /// A freshly created record: status `Created`, no lifecycle fields.
    pub fn new(args: NewProduct) -> Self {
        Product {
            id: ProductId(args.id),
            name: args.name,
            description: args.description,
            manufacturing_date: args.manufacturing_date,
            batch_number: args.batch_number,
            status: ProductStatus::Created,
            supply_date: None,
            warehouse_location: None,
            wholesale_date: None,
            wholesale_location: None,
            quantity: None,
        }
    }

    pub fn is_supplied(&self) -> bool {
        self.supply_date.is_some() || self.warehouse_location.is_some()
    }

    pub fn is_wholesaled(&self) -> bool {
        self.wholesale_date.is_some() || self.wholesale_location.is_some() || self.quantity.is_some()
    }

    /// Whether `status` agrees with the populated lifecycle fields.
    ///
    /// Administrative status overrides are allowed to break this, so it is a
    /// diagnostic rather than an enforced invariant.
    pub fn is_consistent(&self) -> bool {
        match &self.status {
            ProductStatus::Created => !self.is_supplied() && !self.is_wholesaled(),
            ProductStatus::Supplied => self.is_supplied(),
            ProductStatus::Wholesaled => self.is_wholesaled(),
            ProductStatus::Sold | ProductStatus::Other(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product::new(NewProduct {
            id: "P100".into(),
            name: "Widget".into(),
            description: "desc".into(),
            manufacturing_date: "2024-01-01".into(),
            batch_number: "B1".into(),
        })
    }

    #[test]
    fn test_status_parse_is_total() {
        assert_eq!(ProductStatus::parse("Sold"), ProductStatus::Sold);
        assert_eq!(
            ProductStatus::parse("Recalled"),
            ProductStatus::Other("Recalled".into())
        );
        assert_eq!(ProductStatus::parse("Recalled").to_string(), "Recalled");
    }

    #[test]
    fn test_absent_lifecycle_fields_are_omitted() {
        let json = serde_json::to_value(widget()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["productID"], "P100");
        assert_eq!(obj["status"], "Created");
        assert_eq!(obj["manufacturingDate"], "2024-01-01");
        for field in [
            "supplyDate",
            "warehouseLocation",
            "wholesaleDate",
            "wholesaleLocation",
            "quantity",
        ] {
            assert!(!obj.contains_key(field), "{field} should be omitted");
        }
    }

    #[test]
    fn test_consistency() {
        let mut p = widget();
        assert!(p.is_consistent());

        p.status = ProductStatus::Supplied;
        assert!(!p.is_consistent());
        p.supply_date = Some("2024-02-01".into());
        assert!(p.is_consistent());

        p.status = ProductStatus::Created;
        assert!(!p.is_consistent());
    }
}
