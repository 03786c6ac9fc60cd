// File: src/ast.rs
//
// Abstract syntax tree for the SynthFlow programming language.
// Two top-level sum types: Expr for expressions and Stmt for statements.
// Every node owns its children; control-flow bodies are always Block.

/// An ordered sequence of statements introducing a lexical scope
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Block { statements }
    }
}

/// A lambda body is either a single expression or a block
#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

/// One arm of a match expression; a None pattern is the `_` default
#[derive(Debug, Clone)]
pub struct MatchCase {
    pub pattern: Option<Expr>,
    pub result: Expr,
}

/// A piece of an interpolated string literal
#[derive(Debug, Clone)]
pub enum StringPart {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    BoolLit(bool),
    NullLit,
    Identifier(String),
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    CompoundAssignment {
        target: Box<Expr>,
        op: String,
        value: Box<Expr>,
    },
    // ++ and -- on an identifier; prefix returns the new value
    Update {
        target: Box<Expr>,
        op: String,
        is_prefix: bool,
    },
    // The callee is a plain name, resolved at call time
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    ArrayLit(Vec<Expr>),
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    IndexAssign {
        array: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    // Keys are normalised to strings at parse time
    MapLit(Vec<(String, Expr)>),
    Member {
        object: Box<Expr>,
        member: String,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Lambda {
        params: Vec<String>,
        body: LambdaBody,
    },
    Match {
        subject: Box<Expr>,
        cases: Vec<MatchCase>,
    },
    Interpolated(Vec<StringPart>),
}

#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl {
        name: String,
        initializer: Option<Expr>,
        is_const: bool,
        type_annotation: Option<String>,
        is_nullable: bool,
    },
    ExprStmt(Expr),
    Block(Block),
    If {
        condition: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Block,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    // Parameter names prefixed with "..." mark a trailing variadic parameter
    FnDecl {
        name: String,
        params: Vec<String>,
        body: Block,
    },
    Try {
        try_block: Block,
        error_var: String,
        catch_block: Block,
    },
    // Parsed and recorded; evaluated only superficially
    StructDecl {
        name: String,
        parent: Option<String>,
        fields: Vec<(String, String)>,
        methods: Vec<Stmt>,
    },
    Import {
        module: String,
        path: Option<String>,
        alias: Option<String>,
    },
}
