//! Declaration-level Go front end.
//!
//! The lexer, parser and printer cover what accessor generation reads from a
//! package: package clauses, imports and type declarations. Bodies of
//! functions and initializers of variables are skipped.

mod ast;
mod error;
mod lexer;
mod literal;
mod parser;
mod printer;
mod token;

pub use ast::{
    ArrayLen, ChanDir, FieldDecl, ImportSpec, InterfaceElem, ParamGroup, Signature, SourceFile,
    StructTag, TypeExpr, TypeName, TypeParam, TypeSpec, TypeTerm,
};
pub use error::ParseError;
pub use lexer::{tokenize, tokenize_with_comments};
pub use literal::{UnquoteError, unquote};
pub use parser::{parse_file, parse_type};
pub use token::{KEYWORDS, Token, TokenKind, is_exported, is_identifier, is_keyword};
