// File: src/interpreter/value.rs
//
// Runtime value types for the SynthFlow programming language.
// Arrays and maps are reference-shared: two bindings holding the same
// collection observe each other's mutations. Functions are shared
// objects carrying either a native dispatch name or a user definition
// with its captured closure environment.

use super::environment::EnvRef;
use crate::ast::{Block, Expr};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Runtime values in the SynthFlow interpreter
#[derive(Clone)]
pub enum Value {
    /// Null value
    Null,
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value (reference-counted for cheap cloning)
    Str(Rc<String>),
    /// Boolean value
    Bool(bool),
    /// Array of values with shared mutable storage
    Array(Rc<RefCell<Vec<Value>>>),
    /// Map from string keys to values with shared mutable storage
    Map(Rc<RefCell<HashMap<String, Value>>>),
    /// Function object (native, user-defined, or struct factory)
    Function(Rc<Function>),
}

/// A callable object
pub enum Function {
    /// Built-in function dispatched by name inside the interpreter
    Native(String),
    /// Function defined in source, carrying its closure environment
    User(UserFunction),
    /// Factory registered by a struct declaration; calling it builds a
    /// map of the declared fields tagged with __type__
    StructFactory { name: String, fields: Vec<String> },
}

/// A user-defined function or lambda
pub struct UserFunction {
    pub params: Vec<String>,
    pub body: FunctionBody,
    pub closure: EnvRef,
}

/// Lambdas hold either a single expression or a block; fn declarations
/// always hold a block
#[derive(Clone)]
pub enum FunctionBody {
    Block(Rc<Block>),
    Expr(Rc<Expr>),
}

impl Value {
    /// Helper to create a Str value from a String
    pub fn str(s: String) -> Self {
        Value::Str(Rc::new(s))
    }

    /// Helper to create an Array value from a Vec<Value>
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Helper to create a Map value from a HashMap
    pub fn map(entries: HashMap<String, Value>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    /// Name of the value's type tag, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    /// Truthiness: null, false, numeric zero, empty string, and empty
    /// array are false; everything else is true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(elements) => !elements.borrow().is_empty(),
            _ => true,
        }
    }

    /// The printed form used by print, string coercion in '+', and
    /// interpolation. Map keys are rendered in sorted order so output
    /// stays deterministic.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Str(s) => s.as_ref().clone(),
            Value::Bool(b) => b.to_string(),
            Value::Array(elements) => {
                let parts: Vec<String> = elements
                    .borrow()
                    .iter()
                    .map(Value::to_display_string)
                    .collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Map(entries) => {
                let entries = entries.borrow();
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                let parts: Vec<String> = keys
                    .iter()
                    .map(|k| format!("\"{}\": {}", k, entries[k.as_str()].to_display_string()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Function(_) => "<function>".to_string(),
        }
    }
}

// Manual Debug: function values reference their closure environment,
// which in turn can reference the function, so both sides print
// summaries instead of recursing.
impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Float(n) => write!(f, "Float({})", n),
            Value::Str(s) => write!(f, "Str({:?})", s.as_ref()),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Array(elements) => write!(f, "Array[{}]", elements.borrow().len()),
            Value::Map(entries) => write!(f, "Map{{{} keys}}", entries.borrow().len()),
            Value::Function(func) => write!(f, "{:?}", func),
        }
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Function::Native(name) => write!(f, "NativeFunction({})", name),
            Function::User(func) => write!(f, "Function({:?})", func.params),
            Function::StructFactory { name, fields } => {
                write!(f, "StructFactory({}, {} fields)", name, fields.len())
            }
        }
    }
}
