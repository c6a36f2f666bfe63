use super::{assert_argument_count, EvalError, EvalResult, Object, NULL};
use std::fmt;
use std::rc::Rc;

pub type BuiltinFunction = fn(Vec<Object>) -> EvalResult;

/// A function implemented by the interpreter rather than in the language. Each one checks its
/// own arguments.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFunction,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// BUILTINS is consulted by name once a lookup misses every environment in the chain.
pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: len,
    },
    Builtin {
        name: "puts",
        func: puts,
    },
    Builtin {
        name: "print",
        func: puts,
    },
    Builtin {
        name: "first",
        func: first,
    },
    Builtin {
        name: "last",
        func: last,
    },
    Builtin {
        name: "tail",
        func: tail,
    },
    Builtin {
        name: "push",
        func: push,
    },
];

pub fn lookup(name: &str) -> Option<Object> {
    BUILTINS
        .iter()
        .find(|builtin| builtin.name == name)
        .map(|builtin| Object::Builtin(*builtin))
}

fn len(args: Vec<Object>) -> EvalResult {
    assert_argument_count(1, &args)?;

    match &args[0] {
        Object::String(value) => Ok(Object::Integer(value.len() as i64)),
        Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
        other => Err(EvalError::UnsupportedArgument {
            name: "len",
            got: other.clone(),
        }),
    }
}

fn array_argument<'a>(name: &'static str, args: &'a [Object]) -> Result<&'a [Object], EvalError> {
    match &args[0] {
        Object::Array(elements) => Ok(elements.as_slice()),
        other => Err(EvalError::ExpectedArray {
            name,
            got: other.clone(),
        }),
    }
}

fn first(args: Vec<Object>) -> EvalResult {
    assert_argument_count(1, &args)?;
    let elements = array_argument("first", &args)?;

    Ok(elements.first().cloned().unwrap_or(NULL))
}

fn last(args: Vec<Object>) -> EvalResult {
    assert_argument_count(1, &args)?;
    let elements = array_argument("last", &args)?;

    Ok(elements.last().cloned().unwrap_or(NULL))
}

fn tail(args: Vec<Object>) -> EvalResult {
    assert_argument_count(1, &args)?;
    let elements = array_argument("tail", &args)?;

    Ok(if elements.is_empty() {
        NULL
    } else {
        Object::Array(Rc::new(elements[1..].to_vec()))
    })
}

/// Returns a new array; the argument is left untouched.
fn push(args: Vec<Object>) -> EvalResult {
    assert_argument_count(2, &args)?;
    let elements = array_argument("push", &args)?;

    let mut new_elements = Vec::with_capacity(elements.len() + 1);
    new_elements.extend_from_slice(elements);
    new_elements.push(args[1].clone());

    Ok(Object::Array(Rc::new(new_elements)))
}

fn puts(args: Vec<Object>) -> EvalResult {
    for arg in args {
        println!("{}", arg);
    }

    Ok(NULL)
}
