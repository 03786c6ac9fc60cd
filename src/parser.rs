// File: src/parser.rs
//
// Recursive-descent parser for the SynthFlow programming language.
// Consumes the token stream produced by the lexer and builds the AST.
//
// Expression precedence, lowest to highest:
//   assignment / compound assignment (right-associative)
//   ||  &&  == !=  < > <= >=  + -  * / %  unary - !
//   primary, then a postfix chain of .member, .method(args), [index],
//   (args), ++ and --
//
// The parser stops at the first syntactic violation; no recovery is
// attempted. Newline tokens are filtered on construction, so every
// production below can ignore line breaks.

use crate::ast::{Block, Expr, LambdaBody, MatchCase, Stmt, StringPart};
use crate::errors::{SourceLocation, SynthFlowError};
use crate::lexer::{self, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Builds a parser over the token stream, dropping Newline tokens
    /// (they exist only so the lexer reports positions correctly).
    pub fn new(tokens: Vec<Token>) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Newline)
            .collect();
        Parser { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>, SynthFlowError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            // Stray semicolons between statements are harmless
            if self.match_kind(&TokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    // --- token stream helpers ---

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| &self.tokens[self.tokens.len() - 1])
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<Token, SynthFlowError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_peek(message))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<String, SynthFlowError> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_at_peek(message)),
        }
    }

    fn error_at_peek(&self, message: &str) -> SynthFlowError {
        let token = self.peek();
        let shown = if token.kind == TokenKind::Eof {
            format!("{} (found end of input)", message)
        } else {
            format!("{} (found '{}')", message, token.lexeme)
        };
        SynthFlowError::parse_error(shown, token.location())
    }

    // --- statements ---

    fn parse_statement(&mut self) -> Result<Stmt, SynthFlowError> {
        match self.peek().kind {
            TokenKind::Import => self.parse_import(),
            TokenKind::Struct => self.parse_struct_decl(),
            TokenKind::Let => self.parse_var_decl(false),
            TokenKind::Const => self.parse_var_decl(true),
            TokenKind::Try => self.parse_try(),
            TokenKind::Fn => self.parse_fn_decl(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => {
                self.advance();
                self.match_kind(&TokenKind::Semicolon);
                Ok(Stmt::Break)
            }
            TokenKind::Continue => {
                self.advance();
                self.match_kind(&TokenKind::Semicolon);
                Ok(Stmt::Continue)
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => {
                let expr = self.parse_expression()?;
                self.match_kind(&TokenKind::Semicolon);
                Ok(Stmt::ExprStmt(expr))
            }
        }
    }

    fn parse_var_decl(&mut self, is_const: bool) -> Result<Stmt, SynthFlowError> {
        self.advance(); // let or const
        let keyword = if is_const { "const" } else { "let" };
        let name = self.expect_identifier(&format!("Expected identifier after '{}'", keyword))?;

        let mut type_annotation = None;
        let mut is_nullable = false;
        if self.match_kind(&TokenKind::Colon) {
            type_annotation = Some(self.parse_type_name()?);
            if self.match_kind(&TokenKind::Question) {
                is_nullable = true;
            }
        }

        self.expect(
            &TokenKind::Assign,
            &format!("Expected '=' in {} declaration", keyword),
        )?;
        let initializer = self.parse_expression()?;
        self.match_kind(&TokenKind::Semicolon);

        Ok(Stmt::VarDecl {
            name,
            initializer: Some(initializer),
            is_const,
            type_annotation,
            is_nullable,
        })
    }

    /// Accepts a type keyword or a bare identifier as a type name.
    /// Annotations are recorded in the AST but never enforced.
    fn parse_type_name(&mut self) -> Result<String, SynthFlowError> {
        let name = match &self.peek().kind {
            TokenKind::KwInt => "int",
            TokenKind::KwFloat => "float",
            TokenKind::KwString => "string",
            TokenKind::KwBool => "bool",
            TokenKind::KwArray => "array",
            TokenKind::KwMap => "map",
            TokenKind::Identifier(_) => {
                let name = self.advance().lexeme;
                return Ok(name);
            }
            _ => return Err(self.error_at_peek("Expected type after ':'")),
        };
        self.advance();
        Ok(name.to_string())
    }

    fn parse_fn_decl(&mut self) -> Result<Stmt, SynthFlowError> {
        self.advance(); // fn
        let name = self.expect_identifier("Expected identifier after 'fn'")?;

        self.expect(&TokenKind::LParen, "Expected '(' after function name")?;
        let params = self.parse_param_list()?;

        // Return type is parsed and discarded
        if self.match_kind(&TokenKind::Arrow) {
            self.parse_type_name()?;
            self.match_kind(&TokenKind::Question);
        }

        let body = self.parse_statement_as_block()?;
        Ok(Stmt::FnDecl { name, params, body })
    }

    /// Parses a parameter list up to and including the closing paren.
    /// A final `...name` becomes a "...name" entry (variadic collector).
    fn parse_param_list(&mut self) -> Result<Vec<String>, SynthFlowError> {
        let mut params = Vec::new();
        if self.match_kind(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            if self.match_kind(&TokenKind::Ellipsis) {
                let name = self.expect_identifier("Expected parameter name after '...'")?;
                params.push(format!("...{}", name));
                break; // variadic must be last
            }

            let name = self.expect_identifier("Expected parameter name")?;
            params.push(name);

            if self.match_kind(&TokenKind::Colon) {
                self.parse_type_name()?;
                self.match_kind(&TokenKind::Question);
            }

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RParen, "Expected ')' after parameters")?;
        Ok(params)
    }

    fn parse_block(&mut self) -> Result<Block, SynthFlowError> {
        self.expect(&TokenKind::LBrace, "Expected '{' at start of block")?;
        let mut statements = Vec::new();
        while !self.is_at_end() && !self.check(&TokenKind::RBrace) {
            if self.match_kind(&TokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace, "Expected '}' at end of block")?;
        Ok(Block::new(statements))
    }

    /// Control-flow bodies are always Block nodes; a bare statement is
    /// wrapped in a one-statement block.
    fn parse_statement_as_block(&mut self) -> Result<Block, SynthFlowError> {
        match self.parse_statement()? {
            Stmt::Block(block) => Ok(block),
            other => Ok(Block::new(vec![other])),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, SynthFlowError> {
        self.advance(); // if
        self.expect(&TokenKind::LParen, "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "Expected ')' after if condition")?;

        let then_branch = self.parse_statement_as_block()?;
        let else_branch = if self.match_kind(&TokenKind::Else) {
            Some(self.parse_statement_as_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, SynthFlowError> {
        self.advance(); // while
        self.expect(&TokenKind::LParen, "Expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "Expected ')' after while condition")?;
        let body = self.parse_statement_as_block()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, SynthFlowError> {
        self.advance(); // for
        self.expect(&TokenKind::LParen, "Expected '(' after 'for'")?;

        let init = if self.check(&TokenKind::Let) {
            Some(Box::new(self.parse_var_decl(false)?))
        } else if self.match_kind(&TokenKind::Semicolon) {
            None
        } else {
            let expr = self.parse_expression()?;
            self.match_kind(&TokenKind::Semicolon);
            Some(Box::new(Stmt::ExprStmt(expr)))
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.match_kind(&TokenKind::Semicolon);

        let increment = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen, "Expected ')' after for clauses")?;

        let body = self.parse_statement_as_block()?;
        Ok(Stmt::For {
            init,
            condition,
            increment,
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, SynthFlowError> {
        self.advance(); // return
        let value = match self.peek().kind {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
            _ => Some(self.parse_expression()?),
        };
        self.match_kind(&TokenKind::Semicolon);
        Ok(Stmt::Return(value))
    }

    fn parse_try(&mut self) -> Result<Stmt, SynthFlowError> {
        self.advance(); // try
        let try_block = self.parse_statement_as_block()?;

        self.expect(&TokenKind::Catch, "Expected 'catch' after try block")?;
        self.expect(&TokenKind::LParen, "Expected '(' after 'catch'")?;
        let error_var = self.expect_identifier("Expected error variable name in catch")?;
        self.expect(&TokenKind::RParen, "Expected ')' after error variable")?;

        let catch_block = self.parse_statement_as_block()?;
        Ok(Stmt::Try {
            try_block,
            error_var,
            catch_block,
        })
    }

    fn parse_import(&mut self) -> Result<Stmt, SynthFlowError> {
        self.advance(); // import
        let module = self.expect_identifier("Expected module name after 'import'")?;

        let mut path = None;
        if self.match_kind(&TokenKind::From) {
            match self.peek().kind.clone() {
                TokenKind::Str(s) => {
                    self.advance();
                    path = Some(s);
                }
                _ => return Err(self.error_at_peek("Expected string path after 'from'")),
            }
        }

        let mut alias = None;
        if self.match_kind(&TokenKind::As) {
            alias = Some(self.expect_identifier("Expected alias after 'as'")?);
        }

        self.match_kind(&TokenKind::Semicolon);
        Ok(Stmt::Import {
            module,
            path,
            alias,
        })
    }

    fn parse_struct_decl(&mut self) -> Result<Stmt, SynthFlowError> {
        self.advance(); // struct
        let name = self.expect_identifier("Expected struct name after 'struct'")?;

        let parent = if self.match_kind(&TokenKind::Extends) {
            Some(self.expect_identifier("Expected parent struct name after 'extends'")?)
        } else {
            None
        };

        self.expect(&TokenKind::LBrace, "Expected '{' after struct name")?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.is_at_end() && !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Fn) {
                methods.push(self.parse_fn_decl()?);
            } else {
                let field_name = self.expect_identifier("Expected field or method in struct")?;
                self.expect(&TokenKind::Colon, "Expected ':' after field name")?;
                let type_name = self.parse_type_name()?;
                self.match_kind(&TokenKind::Question);
                fields.push((field_name, type_name));
                self.match_kind(&TokenKind::Comma);
            }
        }

        self.expect(&TokenKind::RBrace, "Expected '}' at end of struct")?;
        Ok(Stmt::StructDecl {
            name,
            parent,
            fields,
            methods,
        })
    }

    // --- expressions ---

    fn parse_expression(&mut self) -> Result<Expr, SynthFlowError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, SynthFlowError> {
        let expr = self.parse_logical_or()?;

        if self.match_kind(&TokenKind::Assign) {
            let value = self.parse_assignment()?;
            // Index targets get their own node so the evaluator can
            // mutate the aliased array in place
            return Ok(match expr {
                Expr::Index { array, index } => Expr::IndexAssign {
                    array,
                    index,
                    value: Box::new(value),
                },
                other => Expr::Assignment {
                    target: Box::new(other),
                    value: Box::new(value),
                },
            });
        }

        for (kind, op) in [
            (TokenKind::PlusEq, "+="),
            (TokenKind::MinusEq, "-="),
            (TokenKind::StarEq, "*="),
            (TokenKind::SlashEq, "/="),
        ] {
            if self.match_kind(&kind) {
                let value = self.parse_assignment()?;
                return Ok(Expr::CompoundAssignment {
                    target: Box::new(expr),
                    op: op.to_string(),
                    value: Box::new(value),
                });
            }
        }

        Ok(expr)
    }

    fn parse_logical_or(&mut self) -> Result<Expr, SynthFlowError> {
        let mut expr = self.parse_logical_and()?;
        while self.match_kind(&TokenKind::OrOr) {
            let right = self.parse_logical_and()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op: "||".to_string(),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, SynthFlowError> {
        let mut expr = self.parse_equality()?;
        while self.match_kind(&TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op: "&&".to_string(),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, SynthFlowError> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = if self.match_kind(&TokenKind::Eq) {
                "=="
            } else if self.match_kind(&TokenKind::Ne) {
                "!="
            } else {
                break;
            };
            let right = self.parse_comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op: op.to_string(),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SynthFlowError> {
        let mut expr = self.parse_term()?;
        loop {
            let op = if self.match_kind(&TokenKind::Lt) {
                "<"
            } else if self.match_kind(&TokenKind::Gt) {
                ">"
            } else if self.match_kind(&TokenKind::Le) {
                "<="
            } else if self.match_kind(&TokenKind::Ge) {
                ">="
            } else {
                break;
            };
            let right = self.parse_term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op: op.to_string(),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, SynthFlowError> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = if self.match_kind(&TokenKind::Plus) {
                "+"
            } else if self.match_kind(&TokenKind::Minus) {
                "-"
            } else {
                break;
            };
            let right = self.parse_factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op: op.to_string(),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr, SynthFlowError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = if self.match_kind(&TokenKind::Star) {
                "*"
            } else if self.match_kind(&TokenKind::Slash) {
                "/"
            } else if self.match_kind(&TokenKind::Percent) {
                "%"
            } else {
                break;
            };
            let right = self.parse_unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op: op.to_string(),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, SynthFlowError> {
        if self.match_kind(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: "-".to_string(),
                operand: Box::new(operand),
            });
        }
        if self.match_kind(&TokenKind::Not) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: "!".to_string(),
                operand: Box::new(operand),
            });
        }
        if self.match_kind(&TokenKind::PlusPlus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Update {
                target: Box::new(operand),
                op: "++".to_string(),
                is_prefix: true,
            });
        }
        if self.match_kind(&TokenKind::MinusMinus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Update {
                target: Box::new(operand),
                op: "--".to_string(),
                is_prefix: true,
            });
        }
        self.parse_postfix()
    }

    /// Postfix chain after a primary: member access, method calls,
    /// indexing, named calls, and postfix increment/decrement.
    fn parse_postfix(&mut self) -> Result<Expr, SynthFlowError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_kind(&TokenKind::Dot) {
                let member = self.expect_identifier("Expected identifier after '.'")?;
                if self.match_kind(&TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    expr = Expr::MethodCall {
                        object: Box::new(expr),
                        method: member,
                        args,
                    };
                } else {
                    expr = Expr::Member {
                        object: Box::new(expr),
                        member,
                    };
                }
            } else if self.match_kind(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect(&TokenKind::RBracket, "Expected ']' after index expression")?;
                expr = Expr::Index {
                    array: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.check(&TokenKind::LParen) {
                // Only named callees are supported; calling an arbitrary
                // expression result is rejected here
                match expr {
                    Expr::Identifier(name) => {
                        self.advance(); // (
                        let args = self.parse_arguments()?;
                        expr = Expr::Call { callee: name, args };
                    }
                    _ => {
                        return Err(
                            self.error_at_peek("Only named functions can be called directly")
                        )
                    }
                }
            } else if self.match_kind(&TokenKind::PlusPlus) {
                expr = Expr::Update {
                    target: Box::new(expr),
                    op: "++".to_string(),
                    is_prefix: false,
                };
            } else if self.match_kind(&TokenKind::MinusMinus) {
                expr = Expr::Update {
                    target: Box::new(expr),
                    op: "--".to_string(),
                    is_prefix: false,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses a comma-separated argument list up to and including ')'.
    /// The opening paren has already been consumed.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, SynthFlowError> {
        let mut args = Vec::new();
        if self.match_kind(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, SynthFlowError> {
        match self.peek().kind.clone() {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expr::IntLit(value))
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expr::FloatLit(value))
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::StringLit(value))
            }
            TokenKind::Boolean(value) => {
                self.advance();
                Ok(Expr::BoolLit(value))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::NullLit)
            }
            TokenKind::InterpolatedString(body) => {
                let token = self.advance();
                self.parse_interpolated(&body, token.location())
            }
            TokenKind::LBracket => {
                self.advance();
                self.parse_array_literal()
            }
            TokenKind::LBrace => {
                if self.looks_like_map() {
                    self.parse_map_literal()
                } else {
                    Err(self.error_at_peek("Unexpected '{' in expression position"))
                }
            }
            TokenKind::SelfKw => {
                // 'self' resolves like any other binding; method-call
                // frames define it, everywhere else lookup fails
                self.advance();
                Ok(Expr::Identifier("self".to_string()))
            }
            TokenKind::Match => {
                self.advance();
                self.parse_match()
            }
            TokenKind::KwInt
            | TokenKind::KwFloat
            | TokenKind::KwString
            | TokenKind::KwBool
            | TokenKind::KwArray
            | TokenKind::KwMap => {
                let name = self.advance().lexeme;
                if self.match_kind(&TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call { callee: name, args })
                } else {
                    Err(self.error_at_peek(&format!(
                        "Unexpected type keyword '{}' - use as call: {}(value)",
                        name, name
                    )))
                }
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier(name))
            }
            TokenKind::LParen => {
                self.advance();
                self.parse_lambda_or_grouping()
            }
            TokenKind::Invalid(c) => {
                Err(self.error_at_peek(&format!("Unrecognised character '{}'", c)))
            }
            _ => Err(self.error_at_peek("Unexpected token in expression")),
        }
    }

    /// Decides whether a '{' in expression position opens a map literal.
    /// Empty braces, a string key, or `identifier :` mean map; anything
    /// else leaves the brace to the statement level.
    fn looks_like_map(&self) -> bool {
        match self.peek_kind(1) {
            TokenKind::RBrace => true,
            TokenKind::Str(_) => true,
            TokenKind::Identifier(_) => *self.peek_kind(2) == TokenKind::Colon,
            _ => false,
        }
    }

    fn parse_map_literal(&mut self) -> Result<Expr, SynthFlowError> {
        self.advance(); // {
        let mut entries = Vec::new();

        if self.match_kind(&TokenKind::RBrace) {
            return Ok(Expr::MapLit(entries));
        }

        loop {
            if self.check(&TokenKind::RBrace) {
                break; // trailing comma
            }

            // Identifier keys are normalised to their name as a string
            let key = match self.peek().kind.clone() {
                TokenKind::Str(s) => {
                    self.advance();
                    s
                }
                TokenKind::Identifier(name) => {
                    self.advance();
                    name
                }
                _ => return Err(self.error_at_peek("Expected string or identifier as map key")),
            };

            self.expect(&TokenKind::Colon, "Expected ':' after map key")?;
            let value = self.parse_expression()?;
            entries.push((key, value));

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RBrace, "Expected '}' at end of map literal")?;
        Ok(Expr::MapLit(entries))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, SynthFlowError> {
        let mut elements = Vec::new();
        if self.match_kind(&TokenKind::RBracket) {
            return Ok(Expr::ArrayLit(elements));
        }
        loop {
            elements.push(self.parse_expression()?);
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket, "Expected ']' at end of array literal")?;
        Ok(Expr::ArrayLit(elements))
    }

    fn parse_match(&mut self) -> Result<Expr, SynthFlowError> {
        // Subject is parsed at unary precedence so the case braces are
        // not swallowed by a binary production
        let subject = self.parse_unary()?;
        self.expect(&TokenKind::LBrace, "Expected '{' after match subject")?;

        let mut cases = Vec::new();
        while !self.is_at_end() && !self.check(&TokenKind::RBrace) {
            let pattern = match &self.peek().kind {
                TokenKind::Identifier(name) if name == "_" => {
                    self.advance();
                    None
                }
                _ => Some(self.parse_primary()?),
            };

            self.expect(&TokenKind::FatArrow, "Expected '=>' in match case")?;
            let result = self.parse_expression()?;
            cases.push(MatchCase { pattern, result });

            self.match_kind(&TokenKind::Comma);
        }

        self.expect(&TokenKind::RBrace, "Expected '}' after match cases")?;
        Ok(Expr::Match {
            subject: Box::new(subject),
            cases,
        })
    }

    /// Splits a processed interpolated-string body into literal text and
    /// `${...}` sub-expressions. Each sub-expression substring is re-lexed
    /// and re-parsed with a nested lexer and parser.
    fn parse_interpolated(
        &mut self,
        body: &str,
        location: SourceLocation,
    ) -> Result<Expr, SynthFlowError> {
        let mut parts = Vec::new();
        let chars: Vec<char> = body.chars().collect();
        let mut text = String::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] == '$' && i + 1 < chars.len() && chars[i + 1] == '{' {
                if !text.is_empty() {
                    parts.push(StringPart::Text(std::mem::take(&mut text)));
                }

                // Collect the expression source, tracking brace depth so
                // nested map literals survive
                let mut expr_src = String::new();
                let mut depth = 1;
                i += 2;
                while i < chars.len() {
                    match chars[i] {
                        '{' => {
                            depth += 1;
                            expr_src.push('{');
                        }
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                            expr_src.push('}');
                        }
                        c => expr_src.push(c),
                    }
                    i += 1;
                }

                if depth != 0 {
                    return Err(SynthFlowError::parse_error(
                        "Unclosed interpolation in string".to_string(),
                        location,
                    ));
                }
                i += 1; // closing brace

                let tokens = lexer::tokenize(&expr_src)?;
                let mut nested = Parser::new(tokens);
                let expr = nested.parse_expression()?;
                parts.push(StringPart::Expr(expr));
            } else {
                text.push(chars[i]);
                i += 1;
            }
        }

        if !text.is_empty() {
            parts.push(StringPart::Text(text));
        }

        Ok(Expr::Interpolated(parts))
    }

    /// After '(' in expression position: try to read a parameter list
    /// followed by ') =>'. On success this is a lambda; on failure the
    /// position is rewound and the parens group an expression.
    fn parse_lambda_or_grouping(&mut self) -> Result<Expr, SynthFlowError> {
        let saved = self.pos;

        if let Some(params) = self.try_parse_lambda_params() {
            if self.match_kind(&TokenKind::FatArrow) {
                let body = if self.check(&TokenKind::LBrace) {
                    LambdaBody::Block(self.parse_block()?)
                } else {
                    LambdaBody::Expr(Box::new(self.parse_expression()?))
                };
                return Ok(Expr::Lambda { params, body });
            }
        }

        self.pos = saved;
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "Expected ')' after expression")?;
        Ok(expr)
    }

    /// Attempts a lambda parameter list ending in ')'. Never reports an
    /// error: a None return means the caller should rewind and reparse.
    fn try_parse_lambda_params(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();

        if self.match_kind(&TokenKind::RParen) {
            return Some(params);
        }

        loop {
            if self.match_kind(&TokenKind::Ellipsis) {
                match self.peek().kind.clone() {
                    TokenKind::Identifier(name) => {
                        self.advance();
                        params.push(format!("...{}", name));
                    }
                    _ => return None,
                }
                break;
            }

            match self.peek().kind.clone() {
                TokenKind::Identifier(name) => {
                    self.advance();
                    params.push(name);
                }
                _ => return None,
            }

            if self.match_kind(&TokenKind::Colon) {
                if self.parse_type_name().is_err() {
                    return None;
                }
                self.match_kind(&TokenKind::Question);
            }

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        if self.match_kind(&TokenKind::RParen) {
            Some(params)
        } else {
            None
        }
    }
}
