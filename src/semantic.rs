// File: src/semantic.rs
//
// Light semantic pass run between parsing and evaluation.
// Checks what can be decided lexically without type information:
// - break/continue must appear inside a loop body
// - assignment targets declared const in a visible scope are rejected
//
// Name resolution stays dynamic: a nested function may legally refer to
// bindings its enclosing scope acquires later, so undefined names are
// left to the evaluator.

use crate::ast::{Block, Expr, LambdaBody, Stmt};
use crate::errors::{ErrorKind, SourceLocation, SynthFlowError};
use std::collections::HashMap;

pub struct SemanticAnalyzer {
    // Each scope maps declared names to their const-ness
    scopes: Vec<HashMap<String, bool>>,
    loop_depth: usize,
}

/// Analyzes a program, failing on the first violation
pub fn analyze(statements: &[Stmt]) -> Result<(), SynthFlowError> {
    let mut analyzer = SemanticAnalyzer {
        scopes: vec![HashMap::new()],
        loop_depth: 0,
    };
    for stmt in statements {
        analyzer.check_stmt(stmt)?;
    }
    Ok(())
}

impl SemanticAnalyzer {
    fn error(message: String) -> SynthFlowError {
        SynthFlowError::new(
            ErrorKind::InvalidOperation,
            message,
            SourceLocation::unknown(),
        )
    }

    fn declare(&mut self, name: &str, is_const: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), is_const);
        }
    }

    /// Finds the nearest visible declaration and reports whether it is const
    fn lookup_const(&self, name: &str) -> Option<bool> {
        for scope in self.scopes.iter().rev() {
            if let Some(is_const) = scope.get(name) {
                return Some(*is_const);
            }
        }
        None
    }

    fn check_assignment_target(&self, name: &str) -> Result<(), SynthFlowError> {
        if self.lookup_const(name) == Some(true) {
            return Err(Self::error(format!(
                "Cannot reassign const variable '{}'",
                name
            )));
        }
        Ok(())
    }

    fn check_block(&mut self, block: &Block) -> Result<(), SynthFlowError> {
        self.scopes.push(HashMap::new());
        let result = block
            .statements
            .iter()
            .try_for_each(|stmt| self.check_stmt(stmt));
        self.scopes.pop();
        result
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), SynthFlowError> {
        match stmt {
            Stmt::VarDecl {
                name,
                initializer,
                is_const,
                ..
            } => {
                if let Some(initializer) = initializer {
                    self.check_expr(initializer)?;
                }
                self.declare(name, *is_const);
                Ok(())
            }

            Stmt::ExprStmt(expr) => self.check_expr(expr),

            Stmt::Block(block) => self.check_block(block),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_expr(condition)?;
                self.check_block(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_block(else_branch)?;
                }
                Ok(())
            }

            Stmt::While { condition, body } => {
                self.check_expr(condition)?;
                self.loop_depth += 1;
                let result = self.check_block(body);
                self.loop_depth -= 1;
                result
            }

            Stmt::For {
                init,
                condition,
                increment,
                body,
            } => {
                self.scopes.push(HashMap::new());
                self.loop_depth += 1;
                let result = self.check_for(init, condition, increment, body);
                self.loop_depth -= 1;
                self.scopes.pop();
                result
            }

            Stmt::Break => {
                if self.loop_depth == 0 {
                    return Err(Self::error(
                        "break statement not allowed outside of loop".to_string(),
                    ));
                }
                Ok(())
            }

            Stmt::Continue => {
                if self.loop_depth == 0 {
                    return Err(Self::error(
                        "continue statement not allowed outside of loop".to_string(),
                    ));
                }
                Ok(())
            }

            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.check_expr(value)?;
                }
                Ok(())
            }

            Stmt::FnDecl { name, params, body } => {
                self.declare(name, false);
                self.check_function(params, body)
            }

            Stmt::Try {
                try_block,
                error_var,
                catch_block,
            } => {
                self.check_block(try_block)?;
                self.scopes.push(HashMap::new());
                self.declare(error_var, false);
                let result = catch_block
                    .statements
                    .iter()
                    .try_for_each(|stmt| self.check_stmt(stmt));
                self.scopes.pop();
                result
            }

            Stmt::StructDecl { name, methods, .. } => {
                self.declare(name, false);
                for method in methods {
                    if let Stmt::FnDecl { params, body, .. } = method {
                        self.check_function(params, body)?;
                    }
                }
                Ok(())
            }

            Stmt::Import { alias, module, .. } => {
                self.declare(alias.as_deref().unwrap_or(module), false);
                Ok(())
            }
        }
    }

    fn check_for(
        &mut self,
        init: &Option<Box<Stmt>>,
        condition: &Option<Expr>,
        increment: &Option<Expr>,
        body: &Block,
    ) -> Result<(), SynthFlowError> {
        if let Some(init) = init {
            self.check_stmt(init)?;
        }
        if let Some(condition) = condition {
            self.check_expr(condition)?;
        }
        if let Some(increment) = increment {
            self.check_expr(increment)?;
        }
        self.check_block(body)
    }

    fn check_function(&mut self, params: &[String], body: &Block) -> Result<(), SynthFlowError> {
        self.scopes.push(HashMap::new());
        for param in params {
            let name = param.strip_prefix("...").unwrap_or(param);
            self.declare(name, false);
        }
        let result = body
            .statements
            .iter()
            .try_for_each(|stmt| self.check_stmt(stmt));
        self.scopes.pop();
        result
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<(), SynthFlowError> {
        match expr {
            Expr::IntLit(_)
            | Expr::FloatLit(_)
            | Expr::StringLit(_)
            | Expr::BoolLit(_)
            | Expr::NullLit
            | Expr::Identifier(_) => Ok(()),

            Expr::Binary { left, right, .. } => {
                self.check_expr(left)?;
                self.check_expr(right)
            }

            Expr::Unary { operand, .. } => self.check_expr(operand),

            Expr::Assignment { target, value } => {
                if let Expr::Identifier(name) = target.as_ref() {
                    self.check_assignment_target(name)?;
                } else {
                    self.check_expr(target)?;
                }
                self.check_expr(value)
            }

            Expr::CompoundAssignment { target, value, .. } => {
                if let Expr::Identifier(name) = target.as_ref() {
                    self.check_assignment_target(name)?;
                }
                self.check_expr(value)
            }

            Expr::Update { target, .. } => {
                if let Expr::Identifier(name) = target.as_ref() {
                    self.check_assignment_target(name)?;
                }
                Ok(())
            }

            Expr::Call { args, .. } => args.iter().try_for_each(|arg| self.check_expr(arg)),

            Expr::MethodCall { object, args, .. } => {
                self.check_expr(object)?;
                args.iter().try_for_each(|arg| self.check_expr(arg))
            }

            Expr::ArrayLit(elements) => elements
                .iter()
                .try_for_each(|element| self.check_expr(element)),

            Expr::Index { array, index } => {
                self.check_expr(array)?;
                self.check_expr(index)
            }

            Expr::IndexAssign {
                array,
                index,
                value,
            } => {
                self.check_expr(array)?;
                self.check_expr(index)?;
                self.check_expr(value)
            }

            Expr::MapLit(entries) => entries
                .iter()
                .try_for_each(|(_, value)| self.check_expr(value)),

            Expr::Member { object, .. } => self.check_expr(object),

            Expr::Lambda { params, body } => match body {
                LambdaBody::Expr(expr) => {
                    self.scopes.push(HashMap::new());
                    for param in params {
                        let name = param.strip_prefix("...").unwrap_or(param);
                        self.declare(name, false);
                    }
                    let result = self.check_expr(expr);
                    self.scopes.pop();
                    result
                }
                LambdaBody::Block(block) => self.check_function(params, block),
            },

            Expr::Match { subject, cases } => {
                self.check_expr(subject)?;
                for case in cases {
                    if let Some(pattern) = &case.pattern {
                        self.check_expr(pattern)?;
                    }
                    self.check_expr(&case.result)?;
                }
                Ok(())
            }

            Expr::Interpolated(parts) => {
                for part in parts {
                    if let crate::ast::StringPart::Expr(expr) = part {
                        self.check_expr(expr)?;
                    }
                }
                Ok(())
            }
        }
    }
}
