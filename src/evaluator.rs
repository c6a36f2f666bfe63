use crate::ast::{
    BlockStatement, Expression, HashLiteral, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::object::{
    builtins, EvalError, EvalResult, Env, Environment, Function, HashPair, Object, NULL,
};
use indexmap::IndexMap;
use log::{debug, trace};
use std::rc::Rc;

/// Evaluates `program` in `env`. Evaluation errors come back as an `Object::Error` carrying the
/// message, never as a panic.
pub fn eval(program: &Program, env: &Env) -> Object {
    match eval_program(program, env) {
        Ok(obj) => obj,
        Err(err) => {
            debug!("evaluation failed: {}", err);
            Object::Error(err.to_string())
        }
    }
}

/// Like `eval`, but hands back the error itself.
pub fn eval_program(program: &Program, env: &Env) -> EvalResult {
    let mut result = NULL;

    for statement in &program.statements {
        match eval_statement(statement, env)? {
            Object::Return(value) => return Ok(*value),
            obj => result = obj,
        }
    }

    Ok(result)
}

/// Evaluates an expression whose value feeds an enclosing one. A `return` that surfaces here,
/// out of an `if` block, leaves the enclosing function straight away, just as an error does.
macro_rules! operand {
    ($exp:expr, $env:expr) => {
        match eval_expression($exp, $env)? {
            returned @ Object::Return(_) => return Ok(returned),
            obj => obj,
        }
    };
}

/// A `return` stops the block but stays wrapped, so enclosing blocks stop too. Only a function
/// call or the program unwraps it.
fn eval_block_statement(block: &BlockStatement, env: &Env) -> EvalResult {
    let mut result = NULL;

    for statement in &block.statements {
        result = eval_statement(statement, env)?;

        if let Object::Return(_) = result {
            return Ok(result);
        }
    }

    Ok(result)
}

fn eval_statement(statement: &Statement, env: &Env) -> EvalResult {
    match statement {
        Statement::Expression(exp) => eval_expression(exp, env),
        Statement::Return(exp) => {
            let value = operand!(exp, env);
            Ok(Object::Return(Box::new(value)))
        }
        Statement::Let(name, exp) => {
            let value = operand!(exp, env);
            env.borrow_mut().set(name, value);
            Ok(NULL)
        }
    }
}

fn eval_expression(expression: &Expression, env: &Env) -> EvalResult {
    match expression {
        Expression::IntegerLiteral(v) => Ok(Object::Integer(*v)),
        Expression::StringLiteral(s) => Ok(Object::String(s.clone())),
        Expression::Boolean(b) => Ok(Object::from(*b)),
        Expression::Identifier(name) => eval_identifier(name, env),
        Expression::Prefix(operator, right) => {
            let right = operand!(right, env);
            eval_prefix_expression(*operator, right)
        }
        Expression::Infix(operator, left, right) => {
            let left = operand!(left, env);
            let right = operand!(right, env);
            eval_infix_expression(*operator, left, right)
        }
        Expression::If(condition, consequence, alternative) => {
            let condition = operand!(condition, env);

            if condition.is_truthy() {
                eval_block_statement(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, env)
            } else {
                Ok(NULL)
            }
        }
        Expression::FunctionLiteral(parameters, body) => Ok(Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        }))),
        Expression::Call(function, arguments) => {
            let function = operand!(function, env);

            let mut args = Vec::with_capacity(arguments.len());
            for argument in arguments {
                args.push(operand!(argument, env));
            }

            apply_function(function, args)
        }
        Expression::ArrayLiteral(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(operand!(element, env));
            }

            Ok(Object::Array(Rc::new(values)))
        }
        Expression::HashLiteral(hash) => eval_hash_literal(hash, env),
        Expression::Index(left, index) => {
            let left = operand!(left, env);
            let index = operand!(index, env);
            eval_index_expression(left, index)
        }
    }
}

fn eval_identifier(name: &str, env: &Env) -> EvalResult {
    if let Some(obj) = env.borrow().get(name) {
        return Ok(obj);
    }

    builtins::lookup(name).ok_or_else(|| EvalError::IdentifierNotFound(name.to_string()))
}

fn eval_prefix_expression(operator: PrefixOperator, right: Object) -> EvalResult {
    match operator {
        PrefixOperator::Bang => Ok(Object::from(!right.is_truthy())),
        PrefixOperator::Minus => match right {
            Object::Integer(v) => Ok(Object::Integer(v.wrapping_neg())),
            _ => Err(EvalError::UnsupportedPrefixOperator(operator, right)),
        },
    }
}

fn eval_infix_expression(operator: InfixOperator, left: Object, right: Object) -> EvalResult {
    match (left, right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, l, r),
        (Object::String(l), Object::String(r)) => eval_string_infix_expression(operator, l, r),
        (left, right) if left.type_name() != right.type_name() => {
            Err(EvalError::TypeMismatch(operator, left, right))
        }
        (left, right) => match operator {
            InfixOperator::Eq => Ok(Object::from(left == right)),
            InfixOperator::NotEq => Ok(Object::from(left != right)),
            _ => Err(EvalError::UnsupportedInfixOperator(operator, left, right)),
        },
    }
}

/// Arithmetic wraps on overflow.
fn eval_integer_infix_expression(operator: InfixOperator, l: i64, r: i64) -> EvalResult {
    match operator {
        InfixOperator::Plus => Ok(Object::Integer(l.wrapping_add(r))),
        InfixOperator::Minus => Ok(Object::Integer(l.wrapping_sub(r))),
        InfixOperator::Asterisk => Ok(Object::Integer(l.wrapping_mul(r))),
        InfixOperator::Slash => {
            if r == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Object::Integer(l.wrapping_div(r)))
            }
        }
        InfixOperator::Lt => Ok(Object::from(l < r)),
        InfixOperator::Gt => Ok(Object::from(l > r)),
        InfixOperator::Eq => Ok(Object::from(l == r)),
        InfixOperator::NotEq => Ok(Object::from(l != r)),
    }
}

fn eval_string_infix_expression(operator: InfixOperator, l: String, r: String) -> EvalResult {
    match operator {
        InfixOperator::Plus => Ok(Object::String(l + &r)),
        InfixOperator::Eq => Ok(Object::from(l == r)),
        InfixOperator::NotEq => Ok(Object::from(l != r)),
        _ => Err(EvalError::UnsupportedInfixOperator(
            operator,
            Object::String(l),
            Object::String(r),
        )),
    }
}

fn eval_hash_literal(hash: &HashLiteral, env: &Env) -> EvalResult {
    let mut pairs = IndexMap::with_capacity(hash.pairs.len());

    for (key_exp, value_exp) in &hash.pairs {
        let key = operand!(key_exp, env);
        let hash_key = match key.hash_key() {
            Some(hash_key) => hash_key,
            None => return Err(EvalError::UnusableHashKey(key)),
        };

        let value = operand!(value_exp, env);
        pairs.insert(hash_key, HashPair { key, value });
    }

    Ok(Object::Hash(Rc::new(pairs)))
}

/// Out of range array indexes and missing hash keys give `null` rather than an error.
fn eval_index_expression(left: Object, index: Object) -> EvalResult {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(i)) => {
            if *i < 0 {
                return Ok(NULL);
            }

            Ok(elements.get(*i as usize).cloned().unwrap_or(NULL))
        }
        (Object::Hash(pairs), _) => match index.hash_key() {
            Some(hash_key) => Ok(pairs
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(NULL)),
            None => Err(EvalError::UnusableHashKey(index.clone())),
        },
        _ => Err(EvalError::UnsupportedIndex(left.clone())),
    }
}

fn apply_function(function: Object, args: Vec<Object>) -> EvalResult {
    match function {
        Object::Function(function) => {
            if function.parameters.len() != args.len() {
                return Err(EvalError::WrongArgumentCount {
                    expected: function.parameters.len(),
                    got: args.len(),
                });
            }

            trace!("calling fn({})", function.parameters.join(", "));

            // The call's scope hangs off the closure's environment, not the caller's.
            let mut scope = Environment::extend(&function.env);
            for (parameter, arg) in function.parameters.iter().zip(args) {
                scope.set(parameter, arg);
            }

            match eval_block_statement(&function.body, &scope.into_env())? {
                Object::Return(value) => Ok(*value),
                obj => Ok(obj),
            }
        }
        Object::Builtin(builtin) => {
            trace!("calling builtin {}", builtin.name);
            (builtin.func)(args)
        }
        other => Err(EvalError::NotCallable(other)),
    }
}

#[cfg(test)]
mod tests {
    use crate::evaluator;
    use crate::lexer::Lexer;
    use crate::object::{Environment, Object};
    use crate::parser::Parser;

    #[test]
    fn eval_integer_expression() {
        expect_values(vec![
            ("5;", "5"),
            ("10;", "10"),
            ("-5", "-5"),
            ("--10", "10"),
            ("5 + 5 + 5 + 5 - 10", "10"),
            ("2 * 2 * 2 * 2 * 2", "32"),
            ("-50 + 100 + -50", "0"),
            ("5 + 5 * 2", "15"),
            ("(5 + 5) * 2", "20"),
            ("5 / 2", "2"),
            ("-7 / 2", "-3"),
            ("20 + 2 * -10", "0"),
            ("50 / 2 * 2 + 10", "60"),
            ("3 * (3 * 3) + 10", "37"),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", "50"),
            ("9223372036854775807 + 1", "-9223372036854775808"),
            ("(-9223372036854775807 - 1) / -1", "-9223372036854775808"),
            ("-(-9223372036854775807 - 1)", "-9223372036854775808"),
            ("(-9223372036854775807 - 1) * -1", "-9223372036854775808"),
        ]);
    }

    #[test]
    fn eval_boolean_expression() {
        expect_values(vec![
            ("true;", "true"),
            ("false;", "false"),
            ("1 < 2", "true"),
            ("1 > 2", "false"),
            ("1 < 1", "false"),
            ("1 == 1", "true"),
            ("1 != 1", "false"),
            ("1 != 2", "true"),
            ("true == true", "true"),
            ("true != false", "true"),
            ("(1 < 2) == true", "true"),
            ("(1 > 2) == true", "false"),
        ]);
    }

    #[test]
    fn eval_bang_expression() {
        expect_values(vec![
            ("!true;", "false"),
            ("!false;", "true"),
            ("!5;", "false"),
            ("!0;", "false"),
            ("!!true;", "true"),
            ("!!false;", "false"),
            ("!!5;;", "true"),
        ]);
    }

    #[test]
    fn eval_if_else_expressions() {
        expect_values(vec![
            ("if (true) { 10 }", "10"),
            ("if (false) { 10 }", "null"),
            ("if (1) { 10 }", "10"),
            ("if (0) { 10 }", "10"),
            ("if (1 < 2) { 10 }", "10"),
            ("if (1 > 2) { 10 }", "null"),
            ("if (1 > 2) { 10 } else { 20 }", "20"),
            ("if (1 < 2) { 10 } else { 20 }", "10"),
            ("if (if (false) { 1 }) { 10 } else { 20 }", "20"),
            ("if (true) { }", "null"),
        ]);
    }

    #[test]
    fn eval_return_statements() {
        expect_values(vec![
            ("return 10;", "10"),
            ("return 10; 9;", "10"),
            ("return 2 * 5; 9;", "10"),
            ("9; return 2 * 5; 9;", "10"),
            (
                "if (10 > 1) {
                    if (10 > 1) {
                        return 10;
                    }

                    return 1;
                }",
                "10",
            ),
            (
                "let f = fn(x) {
                    return x;
                    x + 10;
                };
                f(10);",
                "10",
            ),
            (
                "let f = fn(x) {
                    let result = x + 10;
                    return result;
                    return 10;
                };
                f(10);",
                "20",
            ),
            ("let f = fn() { return 1; }; f(); 2", "2"),
        ]);
    }

    #[test]
    fn return_inside_an_operand_unwinds() {
        expect_values(vec![
            ("if (true) { return 1 } + 1", "1"),
            ("1 + if (true) { return 2 }", "2"),
            ("-if (true) { return 3 }", "3"),
            ("let x = if (true) { return 5 }; x + 1", "5"),
            ("[1, if (true) { return 2 }, 3]", "2"),
            (r#"{"a": if (true) { return 4 }}"#, "4"),
            ("[7][if (true) { return 0 }]", "0"),
            ("len(if (true) { return [1, 2] })", "[1, 2]"),
            ("if (if (true) { return 6 }) { 1 } else { 2 }", "6"),
            (
                "let f = fn() {
                    let x = if (true) { return 5 };
                    x + 1
                };
                f() + 1",
                "6",
            ),
            (
                "let f = fn() { [0, if (true) { return 9 }] };
                f()",
                "9",
            ),
        ]);
    }

    #[test]
    fn returned_value_is_never_bound() {
        let env = Environment::new().into_env();

        assert_eq!("5", eval_in("let x = if (true) { return 5 };", &env).to_string());
        assert_eq!(
            "ERROR: identifier not found: x",
            eval_in("x", &env).to_string()
        );
    }

    #[test]
    fn eval_errors() {
        expect_errors(vec![
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("1 == true", "type mismatch: INTEGER == BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("-\"a\"", "unknown operator: -STRING"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("true < false;", "unknown operator: BOOLEAN < BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) {
                    if (10 > 1) {
                        return true + false;
                    }

                    return 1;
                }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            (r#""Hello" - "World""#, "unknown operator: STRING - STRING"),
            (
                r#"{"name": "Monkey"}[fn(x) { x }];"#,
                "unusable as hash key: FUNCTION",
            ),
            ("{[1]: 2}", "unusable as hash key: ARRAY"),
            ("1[0]", "index operator not supported: INTEGER"),
            ("5(1)", "not a function: INTEGER"),
            ("1 / 0", "division by zero"),
            ("let x = 1 / 0; x", "division by zero"),
            ("if (missing) { 1 }", "identifier not found: missing"),
            ("len(1 + true, foo)", "type mismatch: INTEGER + BOOLEAN"),
            ("[1, foo, 3]", "identifier not found: foo"),
        ]);
    }

    #[test]
    fn errors_propagate_out_of_functions() {
        expect_errors(vec![
            (
                "let f = fn() { 1 + true };
                let g = fn() { f(); 5 };
                g();
                10",
                "type mismatch: INTEGER + BOOLEAN",
            ),
            (
                "let f = fn(x, y) { x };
                f(1)",
                "wrong number of arguments. got 1, expected 2",
            ),
            ("fn() { 1 }(2)", "wrong number of arguments. got 1, expected 0"),
        ]);
    }

    #[test]
    fn eval_let_statements() {
        expect_values(vec![
            ("let a = 5; a;", "5"),
            ("let a = 5 * 5; a;", "25"),
            ("let a = 5; let b = a; b;", "5"),
            ("let a = 5; let b = a; let c = a + b + 5; c;", "15"),
            ("let a = 5; let a = a + 1; a", "6"),
            ("let a = 5;", "null"),
        ]);
    }

    #[test]
    fn eval_function_object() {
        expect_values(vec![("fn(x) { x + 2; };", "fn(x) {...}")]);
    }

    #[test]
    fn eval_function_application() {
        expect_values(vec![
            ("let identity = fn(x) { x; }; identity(5);", "5"),
            ("let identity = fn(x) { return x; }; identity(5);", "5"),
            ("let double = fn(x) { x * 2; }; double(5);", "10"),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", "10"),
            ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", "20"),
            ("fn(x) { x; }(5)", "5"),
            ("let noop = fn() { }; noop()", "null"),
        ]);
    }

    #[test]
    fn eval_closures() {
        expect_values(vec![
            (
                "let adder = fn(x) { fn(y) { x + y } };
                let addTwo = adder(2);
                addTwo(3);",
                "5",
            ),
            (
                "let x = 100;
                let adder = fn(x) { fn(y) { x + y } };
                let addTwo = adder(2);
                addTwo(3);",
                "5",
            ),
            (
                "let f = fn() { late };
                let late = 7;
                f()",
                "7",
            ),
            (
                "let x = 1;
                let shadow = fn() { let x = 2; x };
                shadow() + x",
                "3",
            ),
        ]);

        expect_errors(vec![(
            "let callee = fn() { local };
            let caller = fn() { let local = 1; callee() };
            caller()",
            "identifier not found: local",
        )]);
    }

    #[test]
    fn eval_recursion() {
        expect_values(vec![(
            "let fibonacci = fn(x) {
                if (x == 0) {
                    0
                } else {
                    if (x == 1) {
                        return 1;
                    } else {
                        fibonacci(x - 1) + fibonacci(x - 2);
                    }
                }
            };
            fibonacci(15);",
            "610",
        )]);
    }

    #[test]
    fn eval_strings() {
        expect_values(vec![
            (r#""Hello World!""#, "Hello World!"),
            (r#""Hello" + " " + "World!""#, "Hello World!"),
            (r#""a" == "a""#, "true"),
            (r#""a" != "a""#, "false"),
            (r#""a" == "b""#, "false"),
        ]);
    }

    #[test]
    fn eval_builtin_functions() {
        expect_values(vec![
            (r#"len("")"#, "0"),
            (r#"len("four")"#, "4"),
            (r#"len("hello world")"#, "11"),
            ("len([1, 2, 3])", "3"),
            ("first([1, 2, 3])", "1"),
            ("first([])", "null"),
            ("last([1, 2, 3])", "3"),
            ("last([])", "null"),
            ("tail([1, 2, 3])", "[2, 3]"),
            ("tail([])", "null"),
            ("push([1, 2], 3)", "[1, 2, 3]"),
            ("push([], 1)", "[1]"),
            ("let a = [1, 2]; let b = push(a, 3); a", "[1, 2]"),
            ("let len = fn(x) { 42 }; len([])", "42"),
            ("len", "builtin function"),
        ]);

        expect_errors(vec![
            ("len(1)", "argument to `len` not supported, got INTEGER"),
            (
                r#"len("one", "two")"#,
                "wrong number of arguments. got 2, expected 1",
            ),
            ("first(1)", "argument to `first` must be ARRAY, got INTEGER"),
            ("push(1, 1)", "argument to `push` must be ARRAY, got INTEGER"),
        ]);
    }

    #[test]
    fn eval_array_literals_and_indexing() {
        expect_values(vec![
            ("[1, 2 * 2, 3 + 3]", "[1, 4, 6]"),
            ("[]", "[]"),
            ("[1, 2, 3][0]", "1"),
            ("[1, 2, 3][1]", "2"),
            ("[1, 2, 3][2]", "3"),
            ("let i = 0; [1][i];", "1"),
            ("[1, 2, 3][1 + 1];", "3"),
            ("let myArray = [1, 2, 3]; myArray[2];", "3"),
            (
                "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
                "6",
            ),
            ("let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]", "2"),
            ("[1, 2, 3][3]", "null"),
            ("[1, 2, 3][-1]", "null"),
        ]);
    }

    #[test]
    fn eval_hash_literals_and_indexing() {
        expect_values(vec![
            (
                r#"let two = "two";
                {
                    "one": 10 - 9,
                    two: 1 + 1,
                    "thr" + "ee": 6 / 2,
                    4: 4,
                    true: 5,
                    false: 6
                }"#,
                "{one: 1, two: 2, three: 3, 4: 4, true: 5, false: 6}",
            ),
            (r#"{"a": 1}["a"]"#, "1"),
            (r#"{"foo": 5}["foo"]"#, "5"),
            (r#"{"foo": 5}["bar"]"#, "null"),
            (r#"let key = "foo"; {"foo": 5}[key]"#, "5"),
            (r#"{}["foo"]"#, "null"),
            ("{5: 5}[5]", "5"),
            ("{true: 5}[true]", "5"),
            ("{false: 5}[false]", "5"),
            (r#"{1: "int"}["1"]"#, "null"),
            (r#"{"k": 1, "k": 2}["k"]"#, "2"),
        ]);
    }

    #[test]
    fn eval_equality_of_compound_values() {
        expect_values(vec![
            ("let a = [1]; a == a", "true"),
            ("[1] == [1]", "false"),
            ("[1] != [1]", "true"),
            ("let h = {}; h == h", "true"),
            ("fn(x) { x } == fn(x) { x }", "false"),
            ("let f = fn(x) { x }; f == f", "true"),
            ("len == len", "true"),
            ("len == first", "false"),
            ("if (false) { 1 } == if (false) { 2 }", "true"),
        ]);
    }

    #[test]
    fn environment_persists_between_programs() {
        let env = Environment::new().into_env();

        assert_eq!("null", eval_in("let a = 2;", &env).to_string());
        assert_eq!("4", eval_in("a * a", &env).to_string());
    }

    fn expect_values(tests: Vec<(&str, &str)>) {
        for (input, expected) in &tests {
            match eval_input(input) {
                Object::Error(err) => {
                    panic!(
                        "expected `{}`, but got error={} for `{}`",
                        expected, err, input
                    );
                }
                obj => {
                    assert_eq!(obj.to_string(), expected.to_string(), "for `{}`", input);
                }
            }
        }
    }

    fn expect_errors(tests: Vec<(&str, &str)>) {
        for (input, expected) in &tests {
            match eval_input(input) {
                Object::Error(err) => {
                    assert_eq!(err, *expected, "for `{}`", input);
                }
                obj => {
                    panic!(
                        "expected error `{}`, but got {} for `{}`",
                        expected, obj, input
                    );
                }
            }
        }
    }

    fn eval_input(input: &str) -> Object {
        eval_in(input, &Environment::new().into_env())
    }

    fn eval_in(input: &str, env: &crate::object::Env) -> Object {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);

        let program = parser.parse_program();
        assert!(
            parser.errors().is_empty(),
            "Parser errors for `{}`: {:?}",
            input,
            parser.errors()
        );

        evaluator::eval(&program, env)
    }
}
