//! Field descriptors and scalar types.

use serde::Serialize;
use serde_json::Value;

use super::auth::AuthRule;
use super::non_model::{CustomType, EnumType};

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarType {
    Id,
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    Timestamp,
    Email,
    Json,
    Phone,
    Url,
    IpAddress,
}

impl ScalarType {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Id => "id",
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
            ScalarType::Date => "date",
            ScalarType::Time => "time",
            ScalarType::DateTime => "datetime",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Email => "email",
            ScalarType::Json => "json",
            ScalarType::Phone => "phone",
            ScalarType::Url => "url",
            ScalarType::IpAddress => "ipAddress",
        }
    }

    /// Scalars whose values travel as JSON strings.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            ScalarType::Id
                | ScalarType::String
                | ScalarType::Date
                | ScalarType::Time
                | ScalarType::DateTime
                | ScalarType::Email
                | ScalarType::Phone
                | ScalarType::Url
                | ScalarType::IpAddress
        )
    }

    /// Whether a foreign key of type `self` can hold an identifier of type
    /// `identifier`.
    ///
    /// Identical types always match; `id` and `string` are interchangeable.
    pub fn is_key_compatible(&self, identifier: ScalarType) -> bool {
        let key_like = |t: ScalarType| matches!(t, ScalarType::Id | ScalarType::String);
        *self == identifier || (key_like(*self) && key_like(identifier))
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared type of a field, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A built-in scalar.
    Scalar(ScalarType),
    /// A symbolic reference to an enum or custom type (or, for custom
    /// operation return types, a model) declared elsewhere in the schema.
    Ref(String),
    /// An enum declared directly on the field.
    InlineEnum(EnumType),
    /// A custom type declared directly on the field.
    InlineCustomType(CustomType),
}

/// Description of a single field of a model, custom type or operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub(crate) field_type: FieldType,
    pub(crate) required: bool,
    pub(crate) array: bool,
    pub(crate) default: Option<Value>,
    pub(crate) auth_rules: Vec<AuthRule>,
}

impl FieldDescriptor {
    /// Creates an optional, non-array field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            array: false,
            default: None,
            auth_rules: Vec::new(),
        }
    }

    /// Marks the field as required (non-nullable).
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Turns the field into a list of its base type.
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Sets the default value. Checked against the base type at build time.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Appends field-level authorization rules.
    pub fn authorization(mut self, rules: impl IntoIterator<Item = AuthRule>) -> Self {
        self.auth_rules.extend(rules);
        self
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn auth_rules(&self) -> &[AuthRule] {
        &self.auth_rules
    }
}

impl From<ScalarType> for FieldDescriptor {
    fn from(scalar: ScalarType) -> Self {
        Self::new(FieldType::Scalar(scalar))
    }
}

impl From<EnumType> for FieldDescriptor {
    fn from(enum_type: EnumType) -> Self {
        Self::new(FieldType::InlineEnum(enum_type))
    }
}

impl From<CustomType> for FieldDescriptor {
    fn from(custom_type: CustomType) -> Self {
        Self::new(FieldType::InlineCustomType(custom_type))
    }
}

pub fn id() -> FieldDescriptor {
    ScalarType::Id.into()
}

pub fn string() -> FieldDescriptor {
    ScalarType::String.into()
}

pub fn integer() -> FieldDescriptor {
    ScalarType::Integer.into()
}

pub fn float() -> FieldDescriptor {
    ScalarType::Float.into()
}

pub fn boolean() -> FieldDescriptor {
    ScalarType::Boolean.into()
}

pub fn date() -> FieldDescriptor {
    ScalarType::Date.into()
}

pub fn time() -> FieldDescriptor {
    ScalarType::Time.into()
}

pub fn datetime() -> FieldDescriptor {
    ScalarType::DateTime.into()
}

pub fn timestamp() -> FieldDescriptor {
    ScalarType::Timestamp.into()
}

pub fn email() -> FieldDescriptor {
    ScalarType::Email.into()
}

pub fn json() -> FieldDescriptor {
    ScalarType::Json.into()
}

pub fn phone() -> FieldDescriptor {
    ScalarType::Phone.into()
}

pub fn url() -> FieldDescriptor {
    ScalarType::Url.into()
}

pub fn ip_address() -> FieldDescriptor {
    ScalarType::IpAddress.into()
}

/// A field whose type is the enum or custom type named `name`.
pub fn reference(name: impl Into<String>) -> FieldDescriptor {
    FieldDescriptor::new(FieldType::Ref(name.into()))
}
