//! Interpolation function catalog.
//!
//! Built-in functions of the configuration expression language, with their
//! argument, return and variadic types.

use std::collections::BTreeMap;

use crate::core::envelope::FunctionSchema;
use crate::core::schema::ValueType;
use crate::core::schema::ValueType::{Any, Bool, Float, Int, List, Map, String as Str};

/// Signature of one interpolation function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub arg_types: Vec<ValueType>,
    pub return_type: ValueType,
    pub variadic: bool,
    /// Type of trailing arguments; meaningless unless `variadic`
    pub variadic_type: ValueType,
}

impl FunctionDef {
    /// Convert into the rendered signature shape.
    pub fn to_schema(&self, name: &str) -> FunctionSchema {
        FunctionSchema {
            name: name.to_string(),
            arg_types: self.arg_types.iter().map(|t| t.to_string()).collect(),
            return_type: self.return_type.to_string(),
            variadic: self.variadic,
            variadic_type: self.variadic.then(|| self.variadic_type.to_string()),
        }
    }
}

/// Source of the global function table.
pub trait FunctionTable: Send + Sync {
    fn functions(&self) -> BTreeMap<String, FunctionDef>;
}

/// Build the full catalog of rendered signatures.
pub fn catalog(table: &dyn FunctionTable) -> BTreeMap<String, FunctionSchema> {
    table
        .functions()
        .iter()
        .map(|(name, def)| (name.clone(), def.to_schema(name)))
        .collect()
}

/// Look up a single function signature.
pub fn lookup(table: &dyn FunctionTable, name: &str) -> Option<FunctionSchema> {
    table.functions().get(name).map(|def| def.to_schema(name))
}

/// (name, fixed argument types, return type, variadic type)
const BUILTINS: &[(&str, &[ValueType], ValueType, Option<ValueType>)] = &[
    ("abs", &[Float], Float, None),
    ("base64decode", &[Str], Str, None),
    ("base64encode", &[Str], Str, None),
    ("base64gzip", &[Str], Str, None),
    ("base64sha256", &[Str], Str, None),
    ("base64sha512", &[Str], Str, None),
    ("basename", &[Str], Str, None),
    ("bcrypt", &[Str], Str, Some(Str)),
    ("ceil", &[Float], Int, None),
    ("chomp", &[Str], Str, None),
    ("cidrhost", &[Str, Int], Str, None),
    ("cidrnetmask", &[Str], Str, None),
    ("cidrsubnet", &[Str, Int, Int], Str, None),
    ("coalesce", &[Str], Str, Some(Str)),
    ("coalescelist", &[List], List, Some(List)),
    ("compact", &[List], List, None),
    ("concat", &[List], List, Some(List)),
    ("contains", &[List, Any], Bool, None),
    ("dirname", &[Str], Str, None),
    ("distinct", &[List], List, None),
    ("element", &[List, Int], Any, None),
    ("file", &[Str], Str, None),
    ("flatten", &[List], List, None),
    ("floor", &[Float], Int, None),
    ("format", &[Str], Str, Some(Any)),
    ("formatlist", &[Str], List, Some(Any)),
    ("indent", &[Int, Str], Str, None),
    ("index", &[List, Str], Int, None),
    ("join", &[Str], Str, Some(List)),
    ("jsonencode", &[Any], Str, None),
    ("keys", &[Map], List, None),
    ("length", &[Any], Int, None),
    ("list", &[], List, Some(Any)),
    ("log", &[Float, Float], Float, None),
    ("lookup", &[Map, Str], Str, Some(Str)),
    ("lower", &[Str], Str, None),
    ("map", &[], Map, Some(Any)),
    ("matchkeys", &[List, List, List], List, None),
    ("max", &[Float], Float, Some(Float)),
    ("md5", &[Str], Str, None),
    ("merge", &[Map], Map, Some(Map)),
    ("min", &[Float], Float, Some(Float)),
    ("pathexpand", &[Str], Str, None),
    ("pow", &[Float, Float], Float, None),
    ("replace", &[Str, Str, Str], Str, None),
    ("rsadecrypt", &[Str, Str], Str, None),
    ("sha1", &[Str], Str, None),
    ("sha256", &[Str], Str, None),
    ("sha512", &[Str], Str, None),
    ("signum", &[Int], Int, None),
    ("slice", &[List, Int, Int], List, None),
    ("sort", &[List], List, None),
    ("split", &[Str, Str], List, None),
    ("substr", &[Str, Int, Int], Str, None),
    ("timeadd", &[Str, Str], Str, None),
    ("timestamp", &[], Str, None),
    ("title", &[Str], Str, None),
    ("transpose", &[Map], Map, None),
    ("trimspace", &[Str], Str, None),
    ("upper", &[Str], Str, None),
    ("urlencode", &[Str], Str, None),
    ("uuid", &[], Str, None),
    ("values", &[Map], List, None),
    ("zipmap", &[List, List], Map, None),
];

/// The language's built-in function table.
///
/// The table is rebuilt on every call; nothing is cached between queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFunctions;

impl FunctionTable for BuiltinFunctions {
    fn functions(&self) -> BTreeMap<String, FunctionDef> {
        BUILTINS
            .iter()
            .map(|(name, args, ret, variadic)| {
                let def = FunctionDef {
                    arg_types: args.to_vec(),
                    return_type: *ret,
                    variadic: variadic.is_some(),
                    variadic_type: variadic.unwrap_or(ValueType::Invalid),
                };
                (name.to_string(), def)
            })
            .collect()
    }
}
