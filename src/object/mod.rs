use crate::ast::{BlockStatement, InfixOperator, PrefixOperator};
pub use crate::object::builtins::Builtin;
pub use crate::object::environment::{Env, Environment};
use indexmap::IndexMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use thiserror::Error;

pub mod builtins;
pub mod environment;

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

/// Runtime values. Compound values sit behind an `Rc` so that copies of an `Object` share the
/// underlying data; equality on them is identity.
#[derive(Clone, Debug)]
pub enum Object {
    Null,
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Rc<Vec<Object>>),
    Hash(Rc<IndexMap<HashKey, HashPair>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    /// Wraps the operand of a `return` while it unwinds out of nested blocks.
    Return(Box<Object>),
    Error(String),
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Null => write!(f, "null"),
            Object::Integer(v) => write!(f, "{}", v),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::String(s) => write!(f, "{}", s),
            Object::Array(elements) => {
                let elements: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", elements.join(", "))
            }
            Object::Hash(pairs) => {
                let pairs: Vec<String> = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Object::Function(function) => {
                write!(f, "fn({}) {{...}}", function.parameters.join(", "))
            }
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Return(obj) => write!(f, "{}", obj),
            Object::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

/// Mirrors the language's `==`: scalars by value, compound values by identity.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Null, Object::Null) => true,
            (Object::Integer(l), Object::Integer(r)) => l == r,
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            (Object::String(l), Object::String(r)) => l == r,
            (Object::Array(l), Object::Array(r)) => Rc::ptr_eq(l, r),
            (Object::Hash(l), Object::Hash(r)) => Rc::ptr_eq(l, r),
            (Object::Function(l), Object::Function(r)) => Rc::ptr_eq(l, r),
            (Object::Builtin(l), Object::Builtin(r)) => l.name == r.name,
            (Object::Return(l), Object::Return(r)) => l == r,
            (Object::Error(l), Object::Error(r)) => l == r,
            _ => false,
        }
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        if b {
            TRUE
        } else {
            FALSE
        }
    }
}

impl Object {
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Null => false,
            Object::Boolean(b) => *b,
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "NULL",
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::String(_) => "STRING",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::Return(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
        }
    }

    /// Returns the key this object indexes a hash under, or `None` if it can't be used as one.
    ///
    /// A string's key is a 64-bit digest of its text with no tie-break on the text itself, so
    /// two strings whose digests collide address the same slot and the later pair overwrites
    /// the earlier one.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(v) => *v as u64,
            Object::Boolean(b) => *b as u64,
            Object::String(s) => {
                let mut hasher = DefaultHasher::new();
                s.hash(&mut hasher);
                hasher.finish()
            }
            _ => return None,
        };

        Some(HashKey {
            object_type: self.type_name(),
            value,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HashKey {
    pub object_type: &'static str,
    pub value: u64,
}

/// The key object is kept alongside the value so a hash can be printed.
#[derive(Clone, Debug, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A closure: the function literal plus the environment it was evaluated in.
pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: Env,
}

// The captured environment may hold this very function, so it is left out.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish()
    }
}

pub type EvalResult = std::result::Result<Object, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("not a function: {}", .0.type_name())]
    NotCallable(Object),
    #[error("unknown operator: {}{}", .0, .1.type_name())]
    UnsupportedPrefixOperator(PrefixOperator, Object),
    #[error("unknown operator: {} {} {}", .1.type_name(), .0, .2.type_name())]
    UnsupportedInfixOperator(InfixOperator, Object, Object),
    #[error("type mismatch: {} {} {}", .1.type_name(), .0, .2.type_name())]
    TypeMismatch(InfixOperator, Object, Object),
    #[error("division by zero")]
    DivisionByZero,
    #[error("wrong number of arguments. got {got}, expected {expected}")]
    WrongArgumentCount { expected: usize, got: usize },
    #[error("argument to `{}` not supported, got {}", .name, .got.type_name())]
    UnsupportedArgument { name: &'static str, got: Object },
    #[error("argument to `{}` must be ARRAY, got {}", .name, .got.type_name())]
    ExpectedArray { name: &'static str, got: Object },
    #[error("unusable as hash key: {}", .0.type_name())]
    UnusableHashKey(Object),
    #[error("index operator not supported: {}", .0.type_name())]
    UnsupportedIndex(Object),
}

pub fn assert_argument_count(expected: usize, args: &[Object]) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(EvalError::WrongArgumentCount {
            expected,
            got: args.len(),
        });
    }

    Ok(())
}
