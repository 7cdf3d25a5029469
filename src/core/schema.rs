//! Schema trees exported by providers, provisioners and backends.
//!
//! These are previously-computed descriptions of configuration fields. The
//! engine never validates or mutates them; it only carries them from the
//! owning plugin to the renderer. All maps are ordered so that rendering the
//! same tree twice produces identical bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Primitive and collection types of schema fields and function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
    Set,
    Object,
    /// Accepts any value (function signatures only)
    Any,
    Invalid,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Map => "map",
            ValueType::Set => "set",
            ValueType::Object => "object",
            ValueType::Any => "any",
            ValueType::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ValueType {
    type Err = ValueTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bool" => Ok(ValueType::Bool),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "string" => Ok(ValueType::String),
            "list" => Ok(ValueType::List),
            "map" => Ok(ValueType::Map),
            "set" => Ok(ValueType::Set),
            "object" => Ok(ValueType::Object),
            "any" => Ok(ValueType::Any),
            "invalid" => Ok(ValueType::Invalid),
            _ => Err(ValueTypeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown value type.
#[derive(Debug, Clone)]
pub struct ValueTypeParseError(pub String);

impl std::fmt::Display for ValueTypeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid value type '{}', valid values: bool, int, float, string, list, map, set, object, any",
            self.0
        )
    }
}

impl std::error::Error for ValueTypeParseError {}

/// Ordered map of field name to field definition.
pub type SchemaInfo = BTreeMap<String, SchemaDefinition>;

/// A single configuration field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SchemaDefinition {
    #[serde(rename = "type")]
    pub value_type: ValueType,

    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub computed: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub force_new: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub sensitive: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<SchemaElement>,

    /// Element type of collections, or the nested block of a sub-resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<SchemaElement>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Default for SchemaDefinition {
    fn default() -> Self {
        SchemaDefinition::new(ValueType::String)
    }
}

impl SchemaDefinition {
    /// Create a field of the given type with no flags set.
    pub fn new(value_type: ValueType) -> Self {
        SchemaDefinition {
            value_type,
            optional: false,
            required: false,
            computed: false,
            force_new: false,
            sensitive: false,
            description: None,
            default: None,
            elem: None,
            min_items: None,
            max_items: None,
            conflicts_with: Vec::new(),
            deprecated: None,
            removed: None,
        }
    }

    /// Create a required field.
    pub fn required(value_type: ValueType) -> Self {
        let mut def = SchemaDefinition::new(value_type);
        def.required = true;
        def
    }

    /// Create an optional field.
    pub fn optional(value_type: ValueType) -> Self {
        let mut def = SchemaDefinition::new(value_type);
        def.optional = true;
        def
    }

    /// Set the element of a collection field.
    pub fn with_elem(mut self, elem: SchemaElement) -> Self {
        self.elem = Some(elem);
        self
    }
}

/// Element of a collection, nested block, or literal default.
///
/// Serialized untagged: `{"info": {...}}`, `{"value": "..."}` or
/// `{"type": "string"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaElement {
    /// Nested block of fields
    Block { info: SchemaInfo },
    /// Literal default value
    Value { value: String },
    /// Simple element type
    Type {
        #[serde(rename = "type")]
        value_type: ValueType,
    },
}

/// Schema of a single resource or data source type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSchemaInfo {
    pub schema: SchemaInfo,

    /// Operations with configurable timeouts (e.g. `create`, `delete`)
    pub timeouts: Vec<String>,
}

/// Full schema exported by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProviderSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Provider configuration block
    pub provider: SchemaInfo,

    pub resources: BTreeMap<String, ResourceSchemaInfo>,

    pub data_sources: BTreeMap<String, ResourceSchemaInfo>,
}

/// Schema exported by a provisioner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Arguments of the provisioner block
    pub provision: SchemaInfo,

    /// Arguments of the connection block
    pub connection: SchemaInfo,
}

/// How a nested configuration block repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    #[default]
    Single,
    List,
    Set,
    Map,
}

/// Attribute of a generic configuration schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigAttribute {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub description: Option<String>,
}

impl Default for ConfigAttribute {
    fn default() -> Self {
        ConfigAttribute {
            value_type: ValueType::String,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            description: None,
        }
    }
}

/// Nested block of a generic configuration schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NestedBlock {
    pub nesting: NestingMode,
    pub block: ConfigSchema,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

/// Generic attribute/block configuration schema.
///
/// Some backends describe their configuration this way instead of with a
/// provider-style [`SchemaInfo`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSchema {
    pub attributes: BTreeMap<String, ConfigAttribute>,
    pub blocks: BTreeMap<String, NestedBlock>,
}

impl ConfigSchema {
    /// Normalize into a provider-style schema map.
    ///
    /// Attributes keep their flags. Blocks become collection fields whose
    /// element is the nested schema; single blocks are lists of at most one.
    pub fn to_schema_info(&self) -> SchemaInfo {
        let mut info = SchemaInfo::new();

        for (name, attr) in &self.attributes {
            let mut def = SchemaDefinition::new(attr.value_type);
            def.required = attr.required;
            def.optional = attr.optional;
            def.computed = attr.computed;
            def.sensitive = attr.sensitive;
            def.description = attr.description.clone();
            info.insert(name.clone(), def);
        }

        for (name, nested) in &self.blocks {
            let (value_type, max_items) = match nested.nesting {
                NestingMode::Single => (ValueType::List, Some(1)),
                NestingMode::List => (ValueType::List, nested.max_items),
                NestingMode::Set => (ValueType::Set, nested.max_items),
                NestingMode::Map => (ValueType::Map, nested.max_items),
            };
            let mut def = SchemaDefinition::new(value_type).with_elem(SchemaElement::Block {
                info: nested.block.to_schema_info(),
            });
            def.min_items = nested.min_items;
            def.max_items = max_items;
            if nested.min_items.unwrap_or(0) > 0 {
                def.required = true;
            } else {
                def.optional = true;
            }
            info.insert(name.clone(), def);
        }

        info
    }
}
