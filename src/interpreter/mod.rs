// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the SynthFlow programming language.
// Executes SynthFlow programs by traversing the Abstract Syntax Tree (AST).
//
// The interpreter holds the global environment for the program's lifetime
// and a current-environment cursor that moves as scopes are entered and
// left. It supports:
// - Variable binding, mutation, and const discipline
// - Function calls with lexical scoping and first-class closures
// - Control flow (if/else, while, C-style for, match)
// - Error handling with try/catch over runtime faults
// - Reference-shared arrays and maps
// - String interpolation and the printed-form coercions around it
//
// Non-local exits (return, break, continue, faults) travel through the
// error channel of the evaluation Results; see control_flow.rs.

mod control_flow;
mod environment;
mod value;

pub use environment::{EnvRef, Environment};
pub use value::{Function, FunctionBody, UserFunction, Value};

use control_flow::ControlFlow;

use crate::ast::{Block, Expr, LambdaBody, Stmt, StringPart};
use crate::builtins;
use crate::errors::SynthFlowError;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

/// Names registered as native functions in the global environment
const BUILTIN_NAMES: &[&str] = &[
    "print",
    "input",
    "len",
    "str",
    "string",
    "int",
    "float",
    "bool",
    "array",
    "map",
    "read_file",
    "write_file",
];

/// Main interpreter that executes SynthFlow programs
pub struct Interpreter {
    globals: EnvRef,
    env: EnvRef,
    // User functions by name; consulted before the environment on calls
    functions: HashMap<String, Rc<Function>>,
    output: Option<Rc<std::cell::RefCell<Vec<u8>>>>,
}

impl Interpreter {
    /// Creates a new interpreter with the built-ins registered in a fresh
    /// global environment
    pub fn new() -> Self {
        let globals = Environment::new();
        let mut interpreter = Interpreter {
            env: Rc::clone(&globals),
            globals,
            functions: HashMap::new(),
            output: None,
        };
        interpreter.register_builtins();
        interpreter
    }

    fn register_builtins(&mut self) {
        let mut globals = self.globals.borrow_mut();
        for name in BUILTIN_NAMES {
            globals.define(
                name.to_string(),
                Value::Function(Rc::new(Function::Native(name.to_string()))),
            );
        }
    }

    /// All native function names, for tooling and tests
    pub fn get_builtin_names() -> Vec<&'static str> {
        BUILTIN_NAMES.to_vec()
    }

    /// Sets the output sink for print and prompts (used for testing)
    pub fn set_output(&mut self, output: Rc<std::cell::RefCell<Vec<u8>>>) {
        self.output = Some(output);
    }

    /// Looks a variable up from the current environment, for embedders
    /// and tests inspecting program results
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        self.env.borrow().get(name)
    }

    /// Names bound in the global scope, for the REPL's :vars command
    pub fn global_names(&self) -> Vec<String> {
        self.globals.borrow().local_names()
    }

    /// Runs a program. Runtime faults and control-flow signals escaping
    /// top level surface as structured errors.
    pub fn execute(&mut self, statements: &[Stmt]) -> Result<(), SynthFlowError> {
        for stmt in statements {
            self.exec_stmt(stmt).map_err(Self::signal_to_error)?;
        }
        Ok(())
    }

    /// Evaluates one statement for the REPL, yielding the value of a bare
    /// expression statement so the shell can echo it
    pub fn eval_stmt_repl(&mut self, stmt: &Stmt) -> Result<Option<Value>, SynthFlowError> {
        match stmt {
            Stmt::ExprStmt(expr) => self
                .eval_expr(expr)
                .map(Some)
                .map_err(Self::signal_to_error),
            other => self
                .exec_stmt(other)
                .map(|_| None)
                .map_err(Self::signal_to_error),
        }
    }

    /// A signal that escapes its context is a programming error
    fn signal_to_error(flow: ControlFlow) -> SynthFlowError {
        match flow {
            ControlFlow::Error(error) => error,
            ControlFlow::Return(_) => {
                SynthFlowError::runtime_error("return outside function".to_string())
            }
            ControlFlow::Break => SynthFlowError::runtime_error("break outside loop".to_string()),
            ControlFlow::Continue => {
                SynthFlowError::runtime_error("continue outside loop".to_string())
            }
        }
    }

    fn write_output(&mut self, msg: &str) {
        match &self.output {
            Some(buffer) => buffer.borrow_mut().extend_from_slice(msg.as_bytes()),
            None => {
                print!("{}", msg);
                let _ = std::io::stdout().flush();
            }
        }
    }

    // --- statement execution ---

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), ControlFlow> {
        match stmt {
            Stmt::VarDecl {
                name,
                initializer,
                is_const,
                ..
            } => {
                let value = match initializer {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                if *is_const {
                    self.env.borrow_mut().define_const(name.clone(), value);
                } else {
                    self.env.borrow_mut().define(name.clone(), value);
                }
                Ok(())
            }

            Stmt::ExprStmt(expr) => {
                self.eval_expr(expr)?;
                Ok(())
            }

            Stmt::Block(block) => self.exec_block(block),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.exec_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(else_branch)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => {
                while self.eval_expr(condition)?.is_truthy() {
                    match self.exec_block(body) {
                        Ok(()) => {}
                        Err(ControlFlow::Break) => break,
                        Err(ControlFlow::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }

            Stmt::For {
                init,
                condition,
                increment,
                body,
            } => {
                // The init binding lives in its own scope for the loop's
                // whole duration
                let previous = Rc::clone(&self.env);
                self.env = Environment::with_parent(&previous);
                let result = self.exec_for(init, condition, increment, body);
                self.env = previous;
                result
            }

            Stmt::Break => Err(ControlFlow::Break),
            Stmt::Continue => Err(ControlFlow::Continue),

            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Err(ControlFlow::Return(value))
            }

            Stmt::FnDecl { name, params, body } => {
                let function = Rc::new(Function::User(UserFunction {
                    params: params.clone(),
                    body: FunctionBody::Block(Rc::new(body.clone())),
                    closure: Rc::clone(&self.env),
                }));
                self.functions.insert(name.clone(), Rc::clone(&function));
                // Also bound as a value so functions are first-class
                self.env
                    .borrow_mut()
                    .define(name.clone(), Value::Function(function));
                Ok(())
            }

            Stmt::Try {
                try_block,
                error_var,
                catch_block,
            } => match self.exec_block(try_block) {
                Err(ControlFlow::Error(error)) => {
                    let previous = Rc::clone(&self.env);
                    let catch_env = Environment::with_parent(&previous);
                    catch_env
                        .borrow_mut()
                        .define(error_var.clone(), Value::str(error.message));
                    self.env = catch_env;
                    let result = self.exec_statements(&catch_block.statements);
                    self.env = previous;
                    result
                }
                other => other,
            },

            Stmt::StructDecl { name, fields, .. } => {
                // Superficial struct support: register a factory that
                // builds a __type__-tagged map from positional arguments
                let factory = Rc::new(Function::StructFactory {
                    name: name.clone(),
                    fields: fields.iter().map(|(field, _)| field.clone()).collect(),
                });
                self.globals
                    .borrow_mut()
                    .define(name.clone(), Value::Function(factory));
                Ok(())
            }

            Stmt::Import { .. } => Ok(()), // module semantics are out of scope
        }
    }

    fn exec_statements(&mut self, statements: &[Stmt]) -> Result<(), ControlFlow> {
        for stmt in statements {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// Runs a block in a fresh child environment, restoring the previous
    /// cursor on every exit path
    fn exec_block(&mut self, block: &Block) -> Result<(), ControlFlow> {
        let previous = Rc::clone(&self.env);
        self.env = Environment::with_parent(&previous);
        let result = self.exec_statements(&block.statements);
        self.env = previous;
        result
    }

    fn exec_for(
        &mut self,
        init: &Option<Box<Stmt>>,
        condition: &Option<Expr>,
        increment: &Option<Expr>,
        body: &Block,
    ) -> Result<(), ControlFlow> {
        if let Some(init) = init {
            self.exec_stmt(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.eval_expr(condition)?.is_truthy() {
                    break;
                }
            }

            match self.exec_block(body) {
                Ok(()) => {}
                Err(ControlFlow::Break) => break,
                // continue still runs the increment before re-testing
                Err(ControlFlow::Continue) => {}
                Err(other) => return Err(other),
            }

            if let Some(increment) = increment {
                self.eval_expr(increment)?;
            }
        }

        Ok(())
    }

    // --- expression evaluation ---

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, ControlFlow> {
        match expr {
            Expr::IntLit(value) => Ok(Value::Int(*value)),
            Expr::FloatLit(value) => Ok(Value::Float(*value)),
            Expr::StringLit(value) => Ok(Value::str(value.clone())),
            Expr::BoolLit(value) => Ok(Value::Bool(*value)),
            Expr::NullLit => Ok(Value::Null),

            Expr::Identifier(name) => self
                .env
                .borrow()
                .get(name)
                .ok_or_else(|| SynthFlowError::undefined_variable(name).into()),

            Expr::Binary { left, op, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                self.apply_binary(op, left, right)
            }

            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                self.apply_unary(op, operand)
            }

            Expr::Assignment { target, value } => match target.as_ref() {
                Expr::Identifier(name) => {
                    let value = self.eval_expr(value)?;
                    self.env.borrow_mut().assign(name, value.clone())?;
                    Ok(value)
                }
                _ => Err(
                    SynthFlowError::runtime_error("Invalid assignment target".to_string()).into(),
                ),
            },

            Expr::CompoundAssignment { target, op, value } => {
                let name = match target.as_ref() {
                    Expr::Identifier(name) => name.clone(),
                    _ => {
                        return Err(SynthFlowError::runtime_error(
                            "Compound assignment target must be an identifier".to_string(),
                        )
                        .into())
                    }
                };
                let current = self
                    .env
                    .borrow()
                    .get(&name)
                    .ok_or_else(|| SynthFlowError::undefined_variable(&name))?;
                let value = self.eval_expr(value)?;
                // "+=" applies the same coercions as "+", and so on
                let result = self.apply_binary(&op[..1], current, value)?;
                self.env.borrow_mut().assign(&name, result.clone())?;
                Ok(result)
            }

            Expr::Update {
                target,
                op,
                is_prefix,
            } => {
                let name = match target.as_ref() {
                    Expr::Identifier(name) => name.clone(),
                    _ => {
                        return Err(SynthFlowError::runtime_error(
                            "Update expression operand must be an identifier".to_string(),
                        )
                        .into())
                    }
                };
                let current = self
                    .env
                    .borrow()
                    .get(&name)
                    .ok_or_else(|| SynthFlowError::undefined_variable(&name))?;
                let step = if op == "++" { 1 } else { -1 };
                let updated = match &current {
                    Value::Int(n) => Value::Int(n + step),
                    Value::Float(n) => Value::Float(n + step as f64),
                    other => {
                        return Err(SynthFlowError::type_error(format!(
                            "'{}' requires a numeric operand, got {}",
                            op,
                            other.type_name()
                        ))
                        .into())
                    }
                };
                self.env.borrow_mut().assign(&name, updated.clone())?;
                Ok(if *is_prefix { updated } else { current })
            }

            Expr::Call { callee, args } => {
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_expr(arg)?);
                }
                self.call_function(callee, arg_values)
            }

            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                let object = self.eval_expr(object)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_expr(arg)?);
                }
                self.call_method(object, method, arg_values)
            }

            Expr::ArrayLit(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::array(values))
            }

            Expr::Index { array, index } => {
                let array = self.eval_expr(array)?;
                let index = self.eval_expr(index)?;
                match (&array, &index) {
                    (Value::Array(elements), Value::Int(i)) => {
                        let elements = elements.borrow();
                        let idx = usize::try_from(*i)
                            .ok()
                            .filter(|&idx| idx < elements.len())
                            .ok_or_else(|| {
                                SynthFlowError::runtime_error(
                                    "Array index out of bounds".to_string(),
                                )
                            })?;
                        Ok(elements[idx].clone())
                    }
                    (Value::Array(_), _) => Err(SynthFlowError::type_error(
                        "Array index must be integer".to_string(),
                    )
                    .into()),
                    _ => Err(
                        SynthFlowError::runtime_error("Cannot index non-array".to_string()).into(),
                    ),
                }
            }

            Expr::IndexAssign {
                array,
                index,
                value,
            } => {
                let array = self.eval_expr(array)?;
                let index = self.eval_expr(index)?;
                let value = self.eval_expr(value)?;
                match (&array, &index) {
                    (Value::Array(elements), Value::Int(i)) => {
                        let mut elements = elements.borrow_mut();
                        let idx = usize::try_from(*i)
                            .ok()
                            .filter(|&idx| idx < elements.len())
                            .ok_or_else(|| {
                                SynthFlowError::runtime_error(
                                    "Array index out of bounds".to_string(),
                                )
                            })?;
                        elements[idx] = value.clone();
                        Ok(value)
                    }
                    (Value::Array(_), _) => Err(SynthFlowError::type_error(
                        "Array index must be integer".to_string(),
                    )
                    .into()),
                    _ => Err(
                        SynthFlowError::runtime_error("Cannot index non-array".to_string()).into(),
                    ),
                }
            }

            Expr::MapLit(entries) => {
                let mut map = HashMap::with_capacity(entries.len());
                for (key, value_expr) in entries {
                    let value = self.eval_expr(value_expr)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::map(map))
            }

            Expr::Member { object, member } => {
                let object = self.eval_expr(object)?;
                self.member_access(object, member)
            }

            Expr::Lambda { params, body } => {
                let body = match body {
                    LambdaBody::Expr(expr) => FunctionBody::Expr(Rc::new((**expr).clone())),
                    LambdaBody::Block(block) => FunctionBody::Block(Rc::new(block.clone())),
                };
                Ok(Value::Function(Rc::new(Function::User(UserFunction {
                    params: params.clone(),
                    body,
                    closure: Rc::clone(&self.env),
                }))))
            }

            Expr::Match { subject, cases } => {
                let subject = self.eval_expr(subject)?;
                for case in cases {
                    match &case.pattern {
                        None => return self.eval_expr(&case.result),
                        Some(pattern) => {
                            let pattern = self.eval_expr(pattern)?;
                            if Self::match_equals(&subject, &pattern) {
                                return self.eval_expr(&case.result);
                            }
                        }
                    }
                }
                Ok(Value::Null)
            }

            Expr::Interpolated(parts) => {
                let mut result = String::new();
                for part in parts {
                    match part {
                        StringPart::Text(text) => result.push_str(text),
                        StringPart::Expr(expr) => {
                            let value = self.eval_expr(expr)?;
                            result.push_str(&value.to_display_string());
                        }
                    }
                }
                Ok(Value::str(result))
            }
        }
    }

    // --- calls ---

    /// Resolves a call by name: the user function table first, then any
    /// function value visible through the environment chain (built-ins
    /// live in the global environment)
    fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, ControlFlow> {
        if let Some(function) = self.functions.get(name).cloned() {
            return self.call_value(&function, args, None);
        }

        let value = self.env.borrow().get(name);
        match value {
            Some(Value::Function(function)) => self.call_value(&function, args, None),
            Some(other) => Err(SynthFlowError::type_error(format!(
                "'{}' is not a function, it is a {}",
                name,
                other.type_name()
            ))
            .into()),
            None => Err(SynthFlowError::undefined_function(name).into()),
        }
    }

    fn call_value(
        &mut self,
        function: &Rc<Function>,
        args: Vec<Value>,
        self_value: Option<Value>,
    ) -> Result<Value, ControlFlow> {
        match function.as_ref() {
            Function::Native(name) => {
                let name = name.clone();
                self.call_native(&name, &args)
            }
            Function::StructFactory { name, fields } => {
                let mut map = HashMap::with_capacity(fields.len() + 1);
                for (field, arg) in fields.iter().zip(args.iter()) {
                    map.insert(field.clone(), arg.clone());
                }
                map.insert("__type__".to_string(), Value::str(name.clone()));
                Ok(Value::map(map))
            }
            Function::User(function) => self.call_user(function, args, self_value),
        }
    }

    /// Invokes a user function: a fresh frame parented to the captured
    /// closure environment (not the caller's), parameters padded with
    /// Null, surplus arguments collected by a trailing "...rest" or
    /// discarded. Return signals stop here.
    fn call_user(
        &mut self,
        function: &UserFunction,
        args: Vec<Value>,
        self_value: Option<Value>,
    ) -> Result<Value, ControlFlow> {
        let frame = Environment::with_parent(&function.closure);
        {
            let mut frame_ref = frame.borrow_mut();
            if let Some(self_value) = self_value {
                frame_ref.define("self".to_string(), self_value);
            }
            for (i, param) in function.params.iter().enumerate() {
                if let Some(rest) = param.strip_prefix("...") {
                    let rest_args = args.get(i..).map(<[Value]>::to_vec).unwrap_or_default();
                    frame_ref.define(rest.to_string(), Value::array(rest_args));
                    break;
                }
                frame_ref.define(param.clone(), args.get(i).cloned().unwrap_or(Value::Null));
            }
        }

        let previous = Rc::clone(&self.env);
        self.env = frame;
        let result = match &function.body {
            FunctionBody::Block(block) => match self.exec_block(block) {
                Ok(()) => Ok(Value::Null),
                Err(ControlFlow::Return(value)) => Ok(value),
                Err(other) => Err(other),
            },
            FunctionBody::Expr(expr) => self.eval_expr(expr),
        };
        self.env = previous;
        result
    }

    fn call_method(
        &mut self,
        object: Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, ControlFlow> {
        match &object {
            Value::Map(entries) => {
                let member = entries.borrow().get(method).cloned();
                match member {
                    Some(Value::Function(function)) => {
                        self.call_value(&function, args, Some(object.clone()))
                    }
                    Some(other) => Err(SynthFlowError::type_error(format!(
                        "Map member '{}' is not a function, it is a {}",
                        method,
                        other.type_name()
                    ))
                    .into()),
                    None => Err(SynthFlowError::runtime_error(format!(
                        "Map does not have member: {}",
                        method
                    ))
                    .into()),
                }
            }
            other => Err(SynthFlowError::runtime_error(format!(
                "Cannot call method '{}' on {}",
                method,
                other.type_name()
            ))
            .into()),
        }
    }

    fn member_access(&mut self, object: Value, member: &str) -> Result<Value, ControlFlow> {
        match &object {
            Value::Map(entries) => entries.borrow().get(member).cloned().ok_or_else(|| {
                SynthFlowError::runtime_error(format!("Map does not have member: {}", member))
                    .into()
            }),
            Value::Array(elements) => {
                if member == "length" {
                    Ok(Value::Int(elements.borrow().len() as i64))
                } else {
                    Err(SynthFlowError::runtime_error(format!(
                        "Array does not have member: {}",
                        member
                    ))
                    .into())
                }
            }
            Value::Str(s) => {
                if member == "length" {
                    Ok(Value::Int(s.len() as i64))
                } else {
                    Err(SynthFlowError::runtime_error(format!(
                        "String does not have member: {}",
                        member
                    ))
                    .into())
                }
            }
            _ => Err(SynthFlowError::runtime_error(
                "Cannot access member of non-object type".to_string(),
            )
            .into()),
        }
    }

    // --- operators ---

    fn apply_binary(&mut self, op: &str, left: Value, right: Value) -> Result<Value, ControlFlow> {
        match op {
            "+" => {
                // String on either side means concatenation of printed forms
                if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                    return Ok(Value::str(format!(
                        "{}{}",
                        left.to_display_string(),
                        right.to_display_string()
                    )));
                }
                match (&left, &right) {
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
                    _ => {
                        let (a, b) = Self::numeric_pair(op, &left, &right)?;
                        Ok(Value::Float(a + b))
                    }
                }
            }
            "-" | "*" => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(if op == "-" {
                    a - b
                } else {
                    a * b
                })),
                _ => {
                    let (a, b) = Self::numeric_pair(op, &left, &right)?;
                    Ok(Value::Float(if op == "-" { a - b } else { a * b }))
                }
            },
            "/" => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => {
                    if *b == 0 {
                        return Err(SynthFlowError::division_by_zero().into());
                    }
                    // Integer operands use integer division
                    Ok(Value::Int(a / b))
                }
                _ => {
                    let (a, b) = Self::numeric_pair(op, &left, &right)?;
                    if b == 0.0 {
                        return Err(SynthFlowError::division_by_zero().into());
                    }
                    Ok(Value::Float(a / b))
                }
            },
            "%" => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => {
                    if *b == 0 {
                        return Err(SynthFlowError::division_by_zero().into());
                    }
                    Ok(Value::Int(a % b))
                }
                _ => Err(SynthFlowError::type_error(format!(
                    "'%' requires integer operands, got {} and {}",
                    left.type_name(),
                    right.type_name()
                ))
                .into()),
            },
            "==" => Ok(Value::Bool(Self::values_equal(&left, &right))),
            "!=" => Ok(Value::Bool(!Self::values_equal(&left, &right))),
            "<" | ">" | "<=" | ">=" => self.apply_comparison(op, &left, &right),
            // Both operands are already evaluated; the operator combines
            // their truthiness
            "&&" => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
            "||" => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
            _ => Err(
                SynthFlowError::runtime_error(format!("Unknown binary operator: {}", op)).into(),
            ),
        }
    }

    fn apply_comparison(
        &mut self,
        op: &str,
        left: &Value,
        right: &Value,
    ) -> Result<Value, ControlFlow> {
        // String ordering is lexicographic byte comparison; numeric
        // ordering promotes to float
        if let (Value::Str(a), Value::Str(b)) = (left, right) {
            let result = match op {
                "<" => a < b,
                ">" => a > b,
                "<=" => a <= b,
                _ => a >= b,
            };
            return Ok(Value::Bool(result));
        }
        let (a, b) = Self::numeric_pair(op, left, right)?;
        let result = match op {
            "<" => a < b,
            ">" => a > b,
            "<=" => a <= b,
            _ => a >= b,
        };
        Ok(Value::Bool(result))
    }

    fn apply_unary(&mut self, op: &str, operand: Value) -> Result<Value, ControlFlow> {
        match op {
            "-" => match operand {
                Value::Int(n) => Ok(Value::Int(-n)),
                Value::Float(n) => Ok(Value::Float(-n)),
                other => Err(SynthFlowError::type_error(format!(
                    "Unary '-' requires a numeric operand, got {}",
                    other.type_name()
                ))
                .into()),
            },
            "!" => Ok(Value::Bool(!operand.is_truthy())),
            _ => {
                Err(SynthFlowError::runtime_error(format!("Unknown unary operator: {}", op)).into())
            }
        }
    }

    /// Coerces both operands to float for mixed numeric arithmetic;
    /// anything non-numeric is a type fault
    fn numeric_pair(op: &str, left: &Value, right: &Value) -> Result<(f64, f64), ControlFlow> {
        let coerce = |value: &Value| match value {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        };
        match (coerce(left), coerce(right)) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(SynthFlowError::type_error(format!(
                "Unsupported operand types for '{}': {} and {}",
                op,
                left.type_name(),
                right.type_name()
            ))
            .into()),
        }
    }

    /// Equality for '==': numeric values compare after float promotion,
    /// strings and booleans compare by value, mismatched tags are unequal
    fn values_equal(left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(a), Value::Float(b)) => (*a as f64) == *b,
            (Value::Float(a), Value::Int(b)) => *a == (*b as f64),
            (Value::Float(a), Value::Float(b)) => a == b,
            _ => false,
        }
    }

    /// Structural equality for match patterns: same-tag int, string, and
    /// bool comparisons only
    fn match_equals(subject: &Value, pattern: &Value) -> bool {
        match (subject, pattern) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }

    // --- native functions ---

    fn call_native(&mut self, name: &str, args: &[Value]) -> Result<Value, ControlFlow> {
        match name {
            "print" => {
                let joined = args
                    .iter()
                    .map(Value::to_display_string)
                    .collect::<Vec<String>>()
                    .join(" ");
                self.write_output(&joined);
                self.write_output("\n");
                Ok(Value::Null)
            }
            "input" => {
                if args.len() > 1 {
                    return Err(Self::arity_error(name, "at most 1", args.len()).into());
                }
                if let Some(prompt) = args.first() {
                    let prompt = prompt.to_display_string();
                    self.write_output(&prompt);
                }
                let line = builtins::read_line().map_err(SynthFlowError::runtime_error)?;
                Ok(Value::str(line))
            }
            "len" => {
                Self::check_arity(name, args, 1)?;
                let length = builtins::length(&args[0]).map_err(SynthFlowError::runtime_error)?;
                Ok(Value::Int(length))
            }
            "str" | "string" => {
                Self::check_arity(name, args, 1)?;
                Ok(Value::str(args[0].to_display_string()))
            }
            "int" => {
                Self::check_arity(name, args, 1)?;
                let value = builtins::int_cast(&args[0]).map_err(SynthFlowError::runtime_error)?;
                Ok(Value::Int(value))
            }
            "float" => {
                Self::check_arity(name, args, 1)?;
                let value =
                    builtins::float_cast(&args[0]).map_err(SynthFlowError::runtime_error)?;
                Ok(Value::Float(value))
            }
            "bool" => {
                Self::check_arity(name, args, 1)?;
                Ok(Value::Bool(args[0].is_truthy()))
            }
            "array" => Ok(Value::array(args.to_vec())),
            "map" => {
                Self::check_arity(name, args, 0)?;
                Ok(Value::map(HashMap::new()))
            }
            "read_file" => {
                Self::check_arity(name, args, 1)?;
                match &args[0] {
                    Value::Str(path) => {
                        let content =
                            builtins::read_file(path).map_err(SynthFlowError::runtime_error)?;
                        Ok(Value::str(content))
                    }
                    other => Err(SynthFlowError::type_error(format!(
                        "read_file() requires a string path, got {}",
                        other.type_name()
                    ))
                    .into()),
                }
            }
            "write_file" => {
                Self::check_arity(name, args, 2)?;
                match &args[0] {
                    Value::Str(path) => {
                        let content = args[1].to_display_string();
                        builtins::write_file(path, &content)
                            .map_err(SynthFlowError::runtime_error)?;
                        Ok(Value::Bool(true))
                    }
                    other => Err(SynthFlowError::type_error(format!(
                        "write_file() requires a string path, got {}",
                        other.type_name()
                    ))
                    .into()),
                }
            }
            _ => Err(SynthFlowError::undefined_function(name).into()),
        }
    }

    fn check_arity(name: &str, args: &[Value], expected: usize) -> Result<(), SynthFlowError> {
        if args.len() != expected {
            Err(Self::arity_error(name, &expected.to_string(), args.len()))
        } else {
            Ok(())
        }
    }

    fn arity_error(name: &str, expected: &str, got: usize) -> SynthFlowError {
        SynthFlowError::runtime_error(format!(
            "{}() takes {} argument(s), got {}",
            name, expected, got
        ))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
