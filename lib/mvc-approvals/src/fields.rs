use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::MvcError;

/// Ordered string key/value pairs, used both for query strings and for
/// `application/x-www-form-urlencoded` POST bodies.
///
/// Insertion order is kept; adding an existing key replaces its value in place.
///
/// ```rust
/// use mvc_approvals::FormFields;
///
/// let fields = FormFields::new()
///     .add("Name", "Alice")
///     .add("Age", "42");
///
/// let keys: Vec<_> = fields.iter().map(|(key, _)| key).collect();
/// assert_eq!(keys, ["Name", "Age"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: IndexMap<String, String>,
}

impl FormFields {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing the value of an existing key.
    #[must_use]
    pub fn add(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builds fields from the top-level fields of a serializable value.
    ///
    /// One pair is produced per serialized field, in declaration order.
    /// `None`/unit values become empty strings. Nested structures are not
    /// flattened.
    ///
    /// ```rust
    /// use mvc_approvals::FormFields;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Person { name: String, nickname: Option<String>, age: u8 }
    ///
    /// let person = Person { name: "Llewellyn".into(), nickname: None, age: 42 };
    /// let fields = FormFields::from_serialize(&person)?;
    ///
    /// assert_eq!(fields.get("nickname"), Some(""));
    /// assert_eq!(fields.get("age"), Some("42"));
    /// # Ok::<(), mvc_approvals::MvcError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MvcError::Serialization`] when the value does not serialize
    /// to a map, and [`MvcError::UnsupportedFieldValue`] for a field holding
    /// an array or an object.
    pub fn from_serialize<T>(value: &T) -> Result<Self, MvcError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(|err| MvcError::Serialization {
            message: format!("Failed to serialize form fields: {err}"),
        })?;

        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(MvcError::Serialization {
                    message: format!("expected a struct or a map, got: {other}"),
                });
            }
        };

        let mut fields = IndexMap::with_capacity(object.len());
        for (name, value) in object {
            let value = field_value_to_string(&name, value)?;
            fields.insert(name, value);
        }

        Ok(Self { fields })
    }

    /// The value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there is no field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn to_form_body(&self) -> Result<String, MvcError> {
        let pairs = self.iter().collect::<Vec<_>>();
        serde_urlencoded::to_string(pairs).map_err(|err| MvcError::Serialization {
            message: format!("Failed to serialize form data: {err}"),
        })
    }
}

fn field_value_to_string(name: &str, value: Value) -> Result<String, MvcError> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(MvcError::UnsupportedFieldValue {
            name: name.to_string(),
            value,
        }),
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self { fields }
    }
}

impl<K, V> Extend<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.fields.extend(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Person {
        name: String,
        nickname: Option<String>,
        age: u32,
        subscribed: bool,
    }

    #[test]
    fn test_one_pair_per_field_in_declaration_order() {
        let person = Person {
            name: "Llewellyn".to_string(),
            nickname: None,
            age: 42,
            subscribed: true,
        };

        let fields = FormFields::from_serialize(&person).expect("fields");

        insta::assert_debug_snapshot!(fields.iter().collect::<Vec<_>>(), @r#"
        [
            (
                "Name",
                "Llewellyn",
            ),
            (
                "Nickname",
                "",
            ),
            (
                "Age",
                "42",
            ),
            (
                "Subscribed",
                "true",
            ),
        ]
        "#);
    }

    #[test]
    fn test_nested_values_are_rejected() {
        #[derive(Serialize)]
        struct Order {
            id: u32,
            lines: Vec<String>,
        }

        let order = Order {
            id: 1,
            lines: vec!["a".to_string()],
        };

        let result = FormFields::from_serialize(&order);

        assert!(matches!(
            result,
            Err(MvcError::UnsupportedFieldValue { ref name, .. }) if name == "lines"
        ));
    }

    #[test]
    fn test_scalar_value_is_rejected() {
        let result = FormFields::from_serialize(&42);

        assert!(matches!(result, Err(MvcError::Serialization { .. })));
    }

    #[test]
    fn test_add_replaces_existing_key_in_place() {
        let fields = FormFields::new()
            .add("a", "1")
            .add("b", "2")
            .add("a", "3");

        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(pairs, [("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_form_body_is_url_encoded() {
        let fields = FormFields::new()
            .add("name", "test user")
            .add("query", "a&b=c");

        let body = fields.to_form_body().expect("body");

        insta::assert_snapshot!(body, @"name=test+user&query=a%26b%3Dc");
    }

    #[test]
    fn test_collect_from_pairs() {
        let fields: FormFields = [("x", "1"), ("y", "2")].into_iter().collect();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("y"), Some("2"));
    }
}
