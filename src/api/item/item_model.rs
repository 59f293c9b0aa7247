//! The item resource and the rules for building one from a request body.

use crate::infra::validation::Valid;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

/// The condition an item is in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "item_condition", rename_all = "UPPERCASE")]
pub enum Condition {
    /// Never sold.
    #[default]
    New,
    /// Returned or second hand.
    Used,
    /// Provenance is not known.
    Unknown,
}

impl Condition {
    /// Every condition together with its label.
    pub const ALL: [(&'static str, Condition); 3] = [
        ("NEW", Condition::New),
        ("USED", Condition::Used),
        ("UNKNOWN", Condition::Unknown),
    ];

    /// Looks up a condition by its exact, case-sensitive label.
    pub fn from_label(label: &str) -> Option<Condition> {
        Self::ALL
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, condition)| *condition)
    }
}

/// A stored item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Item {
    /// The item's id, assigned on creation.
    #[schema(example = 1)]
    pub id: i32,
    /// The item's name.
    #[schema(example = "blue shirt")]
    pub name: String,
    /// The item's category.
    #[schema(example = "shirt")]
    pub category: String,
    /// How many are in stock.
    #[schema(example = 3)]
    pub quantity: i32,
    /// The item's condition.
    pub condition: Condition,
}

impl Item {
    /// Combines an id with the fields of an item.
    pub fn from_fields(id: i32, fields: ItemFields) -> Self {
        Self {
            id,
            name: fields.name,
            category: fields.category,
            quantity: fields.quantity,
            condition: fields.condition,
        }
    }
}

/// Everything about an item except its id.
///
/// This is what clients send when creating or updating an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ItemFields {
    /// The item's name.
    #[schema(example = "blue shirt")]
    #[validate(length(min = 1, max = 63))]
    pub name: String,
    /// The item's category.
    #[schema(example = "shirt")]
    #[validate(length(min = 1, max = 63))]
    pub category: String,
    /// How many are in stock.
    #[schema(example = 3, minimum = 0)]
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// The item's condition, `NEW` if left out.
    #[serde(default)]
    pub condition: Condition,
}

/// Why a request body could not be turned into [`ItemFields`].
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The body was not a JSON object.
    #[error("malformed body")]
    MalformedBody,
    /// A required field was missing.
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// A field had the wrong JSON type.
    #[error("invalid type for `{0}`")]
    InvalidType(&'static str),
    /// A field did not name a known variant.
    #[error("invalid attribute `{0}`")]
    InvalidAttribute(&'static str),
    /// The fields were well-formed but broke a constraint.
    #[error("{0}")]
    Constraint(#[from] validator::ValidationErrors),
}

impl ItemFields {
    /// Builds validated fields from an untyped request body.
    ///
    /// Fields are checked one at a time in declaration order, and each
    /// field's type is checked before its value. Unknown keys, `id`
    /// included, are ignored.
    pub fn from_json(body: &Value) -> Result<Valid<ItemFields>, ValidationError> {
        let Value::Object(map) = body else {
            return Err(ValidationError::MalformedBody);
        };
        let name = required_string(map, "name")?;
        let category = required_string(map, "category")?;
        let quantity = required_integer(map, "quantity")?;
        let condition = match map.get("condition") {
            None => Condition::default(),
            Some(Value::String(label)) => Condition::from_label(label)
                .ok_or(ValidationError::InvalidAttribute("condition"))?,
            Some(_) => return Err(ValidationError::InvalidType("condition")),
        };
        let fields = ItemFields {
            name,
            category,
            quantity,
            condition,
        };
        Ok(Valid::new(fields)?)
    }
}

fn required<'a>(map: &'a Map<String, Value>, key: &'static str) -> Result<&'a Value, ValidationError> {
    map.get(key).ok_or(ValidationError::MissingField(key))
}

fn required_string(map: &Map<String, Value>, key: &'static str) -> Result<String, ValidationError> {
    match required(map, key)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(ValidationError::InvalidType(key)),
    }
}

/// Only JSON integers are accepted, so `"5"`, `5.0` and `true` are all rejected.
fn required_integer(map: &Map<String, Value>, key: &'static str) -> Result<i32, ValidationError> {
    let n = required(map, key)?
        .as_i64()
        .ok_or(ValidationError::InvalidType(key))?;
    i32::try_from(n).map_err(|_| ValidationError::InvalidType(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blue_shirt() -> Value {
        json!({
            "name": "blue shirt",
            "category": "shirt",
            "quantity": 3,
            "condition": "NEW",
        })
    }

    #[test]
    fn valid_body_is_accepted() {
        let fields = ItemFields::from_json(&blue_shirt()).unwrap().into_inner();
        assert_eq!(
            ItemFields {
                name: "blue shirt".to_string(),
                category: "shirt".to_string(),
                quantity: 3,
                condition: Condition::New,
            },
            fields
        );
    }

    #[test]
    fn serialized_item_reproduces_the_body() {
        let body = json!({
            "name": "black pants",
            "category": "pants",
            "quantity": 0,
            "condition": "USED",
        });
        let fields = ItemFields::from_json(&body).unwrap().into_inner();
        let mut serialized = serde_json::to_value(Item::from_fields(7, fields)).unwrap();
        assert_eq!(json!(7), serialized["id"]);
        serialized.as_object_mut().unwrap().remove("id");
        assert_eq!(body, serialized);
    }

    #[test]
    fn condition_defaults_to_new() {
        let mut body = blue_shirt();
        body.as_object_mut().unwrap().remove("condition");
        let fields = ItemFields::from_json(&body).unwrap();
        assert_eq!(Condition::New, fields.inner().condition);
    }

    #[test]
    fn id_in_body_is_ignored() {
        let mut body = blue_shirt();
        body["id"] = json!(42);
        assert!(ItemFields::from_json(&body).is_ok());
    }

    #[test]
    fn non_object_is_malformed() {
        for body in [json!("not a mapping"), json!(3), json!(null), json!([blue_shirt()])] {
            let err = ItemFields::from_json(&body).unwrap_err();
            assert_eq!("malformed body", err.to_string());
        }
    }

    #[test]
    fn missing_quantity_is_rejected() {
        let body = json!({"name": "socks", "category": "apparel"});
        let err = ItemFields::from_json(&body).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("quantity")));
        assert_eq!("missing field `quantity`", err.to_string());
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        let err = ItemFields::from_json(&json!({})).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("name")));
        let err = ItemFields::from_json(&json!({"name": "socks"})).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("category")));
    }

    #[test]
    fn quantity_must_be_an_integer() {
        for quantity in [json!("5"), json!(5.5), json!(true), json!(null)] {
            let mut body = blue_shirt();
            body["quantity"] = quantity;
            let err = ItemFields::from_json(&body).unwrap_err();
            assert_eq!("invalid type for `quantity`", err.to_string());
        }
    }

    #[test]
    fn quantity_beyond_i32_is_rejected() {
        let mut body = blue_shirt();
        body["quantity"] = json!(i64::from(i32::MAX) + 1);
        let err = ItemFields::from_json(&body).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType("quantity")));
    }

    #[test]
    fn negative_quantity_breaks_a_constraint() {
        let mut body = blue_shirt();
        body["quantity"] = json!(-1);
        let err = ItemFields::from_json(&body).unwrap_err();
        let ValidationError::Constraint(errors) = &err else {
            panic!("expected a constraint error, got {err:?}");
        };
        assert!(errors.field_errors().contains_key("quantity"));
    }

    #[test]
    fn condition_is_case_sensitive() {
        let mut body = blue_shirt();
        body["condition"] = json!("new");
        let err = ItemFields::from_json(&body).unwrap_err();
        assert_eq!("invalid attribute `condition`", err.to_string());
    }

    #[test]
    fn condition_type_is_checked_before_label() {
        let mut body = blue_shirt();
        body["condition"] = json!(0);
        let err = ItemFields::from_json(&body).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType("condition")));
    }

    #[test]
    fn name_must_be_a_non_empty_string() {
        let mut body = blue_shirt();
        body["name"] = json!(12);
        let err = ItemFields::from_json(&body).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType("name")));

        body["name"] = json!("");
        let err = ItemFields::from_json(&body).unwrap_err();
        assert!(matches!(err, ValidationError::Constraint(_)));
    }

    #[test]
    fn labels_round_trip() {
        for (label, condition) in Condition::ALL {
            assert_eq!(Some(condition), Condition::from_label(label));
            assert_eq!(json!(label), serde_json::to_value(condition).unwrap());
        }
        assert_eq!(None, Condition::from_label("Used"));
    }
}
