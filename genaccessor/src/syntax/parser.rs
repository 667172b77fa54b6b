//! Recursive-descent parser for Go package, import and type declarations.

use super::ast::{
    ArrayLen, ChanDir, FieldDecl, ImportSpec, InterfaceElem, ParamGroup, Signature, SourceFile,
    StructTag, TypeExpr, TypeName, TypeParam, TypeSpec, TypeTerm,
};
use super::error::ParseError;
use super::lexer::{tokenize, tokenize_with_comments};
use super::literal::unquote;
use super::token::{Token, TokenKind};

/// Parses a complete Go source file.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first syntax error.
///
/// # Examples
///
/// ```
/// use genaccessor::syntax::parse_file;
///
/// let file = parse_file("package demo\n\ntype User struct {\n\tname string\n}\n")
///     .expect("valid source");
/// assert_eq!(file.package, "demo");
/// assert_eq!(file.types[0].name, "User");
/// ```
pub fn parse_file(source: &str) -> Result<SourceFile, ParseError> {
    let tokens = tokenize_with_comments(source)?;
    let build_ignored = tokens
        .iter()
        .take_while(|t| !t.is_keyword("package"))
        .filter(|t| t.kind == TokenKind::Comment)
        .any(|t| is_ignore_constraint(&t.text));
    let tokens = tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .collect();
    Parser::new(tokens).file(build_ignored)
}

/// Parses a standalone type expression such as `map[string][]*pkg.T`.
///
/// # Errors
///
/// Returns a [`ParseError`] if `source` is not exactly one type.
pub fn parse_type(source: &str) -> Result<TypeExpr, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);
    let ty = parser.type_expr()?;
    parser.skip_semicolons();
    parser.expect_eof()?;
    Ok(ty)
}

fn is_ignore_constraint(comment: &str) -> bool {
    if let Some(expr) = comment.strip_prefix("//go:build ") {
        return expr.trim() == "ignore";
    }
    comment
        .strip_prefix("// +build ")
        .is_some_and(|expr| expr.split_whitespace().any(|term| term == "ignore"))
}

enum ParamItem {
    Bare(String),
    Named {
        name: String,
        ty: TypeExpr,
        variadic: bool,
    },
    Type {
        ty: TypeExpr,
        variadic: bool,
    },
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens.last().cloned().unwrap_or(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            line: 1,
            column: 1,
            space_before: false,
        });
        Self {
            tokens,
            pos: 0,
            eof,
        }
    }

    // ---- token cursor -------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        self.tokens.get(self.pos + ahead).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at_punct(&self, text: &str) -> bool {
        self.peek().is_punct(text)
    }

    fn at_keyword(&self, word: &str) -> bool {
        self.peek().is_keyword(word)
    }

    fn at_semicolon(&self) -> bool {
        self.peek().kind == TokenKind::Semicolon
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn skip_semicolons(&mut self) {
        while self.at_semicolon() {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        let found = match token.kind {
            TokenKind::Eof => "EOF".to_owned(),
            TokenKind::Semicolon if token.is_implicit_semicolon() => "newline".to_owned(),
            _ => format!("`{}`", token.text),
        };
        ParseError::new(
            token.line,
            token.column,
            format!("expected {expected}, found {found}"),
        )
    }

    fn expect_punct(&mut self, text: &str) -> Result<Token, ParseError> {
        if self.at_punct(text) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("`{text}`")))
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<Token, ParseError> {
        if self.at_keyword(word) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        if self.peek().kind == TokenKind::Ident {
            Ok(self.advance().text)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected("EOF"))
        }
    }

    /// Consumes a declaration terminator at file scope.
    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        if self.at_semicolon() {
            self.advance();
            Ok(())
        } else if self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected("`;` or newline"))
        }
    }

    /// Consumes a separator inside a bracketed list; the separator may be
    /// omitted before `closer`.
    fn expect_separator(&mut self, closer: &str) -> Result<(), ParseError> {
        if self.at_semicolon() {
            self.advance();
            Ok(())
        } else if self.at_punct(closer) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`;` or `{closer}`")))
        }
    }

    /// Index of the `]` matching the `[` at `open`.
    fn matching_bracket(&self, open: usize) -> Option<usize> {
        let mut depth = 0_usize;
        for (index, token) in self.tokens.iter().enumerate().skip(open) {
            if token.kind != TokenKind::Punct {
                continue;
            }
            match token.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn token_after_brackets(&self, open: usize) -> Option<&Token> {
        self.matching_bracket(open)
            .map(|close| self.tokens.get(close + 1).unwrap_or(&self.eof))
    }

    // ---- declarations -------------------------------------------------

    fn file(mut self, build_ignored: bool) -> Result<SourceFile, ParseError> {
        self.skip_semicolons();
        self.expect_keyword("package")?;
        let package = self.expect_ident()?;
        if package == "_" {
            return Err(ParseError::new(
                self.peek().line,
                self.peek().column,
                "invalid package name _",
            ));
        }
        self.expect_terminator()?;

        let mut imports = Vec::new();
        loop {
            self.skip_semicolons();
            if !self.at_keyword("import") {
                break;
            }
            self.advance();
            if self.at_punct("(") {
                self.advance();
                loop {
                    self.skip_semicolons();
                    if self.at_punct(")") {
                        break;
                    }
                    imports.push(self.import_spec()?);
                    self.expect_separator(")")?;
                }
                self.expect_punct(")")?;
            } else {
                imports.push(self.import_spec()?);
            }
            self.expect_terminator()?;
        }

        let mut types = Vec::new();
        loop {
            self.skip_semicolons();
            if self.at_eof() {
                break;
            }
            let token = self.peek();
            if token.is_keyword("type") {
                self.type_decl(&mut types)?;
            } else if ["func", "var", "const"].iter().any(|w| token.is_keyword(w)) {
                self.skip_decl();
            } else if token.is_keyword("import") {
                return Err(ParseError::new(
                    token.line,
                    token.column,
                    "imports must appear before other declarations",
                ));
            } else {
                return Err(self.unexpected("declaration"));
            }
        }

        Ok(SourceFile {
            package,
            imports,
            types,
            build_ignored,
        })
    }

    fn import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let name = if self.peek().kind == TokenKind::Ident {
            Some(self.advance().text)
        } else if self.at_punct(".") {
            self.advance();
            Some(".".to_owned())
        } else {
            None
        };
        let token = self.peek().clone();
        if !token.is_string() {
            return Err(self.unexpected("import path"));
        }
        self.advance();
        let path = unquote(&token.text)
            .map_err(|err| ParseError::new(token.line, token.column, err.to_string()))?;
        if path.is_empty() || path.contains(char::is_whitespace) {
            return Err(ParseError::new(
                token.line,
                token.column,
                format!("invalid import path: {}", token.text),
            ));
        }
        Ok(ImportSpec {
            name,
            path,
            line: token.line,
        })
    }

    fn type_decl(&mut self, out: &mut Vec<TypeSpec>) -> Result<(), ParseError> {
        self.expect_keyword("type")?;
        if self.at_punct("(") {
            self.advance();
            loop {
                self.skip_semicolons();
                if self.at_punct(")") {
                    break;
                }
                out.push(self.type_spec()?);
                self.expect_separator(")")?;
            }
            self.expect_punct(")")?;
        } else {
            out.push(self.type_spec()?);
        }
        self.expect_terminator()
    }

    fn type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let line = self.peek().line;
        let name = self.expect_ident()?;
        let type_params = if self.at_punct("[") && self.looks_like_type_params() {
            self.type_params()?
        } else {
            Vec::new()
        };
        let alias = self.at_punct("=");
        if alias {
            self.advance();
        }
        let ty = self.type_expr()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
            line,
        })
    }

    /// Distinguishes `type T[P any] ...` from `type T [N]int`.
    fn looks_like_type_params(&self) -> bool {
        let first = self.peek_at(1);
        let second = self.peek_at(2);
        first.kind == TokenKind::Ident
            && (matches!(second.kind, TokenKind::Ident | TokenKind::Keyword)
                || [",", "~", "["].iter().any(|p| second.is_punct(p)))
    }

    fn type_params(&mut self) -> Result<Vec<TypeParam>, ParseError> {
        self.expect_punct("[")?;
        let mut params = Vec::new();
        while !self.at_punct("]") {
            let mut names = vec![self.expect_ident()?];
            while self.at_punct(",") {
                self.advance();
                names.push(self.expect_ident()?);
            }
            let constraint = self.constraint()?;
            params.push(TypeParam { names, constraint });
            if self.at_punct(",") {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_punct("]")?;
        if params.is_empty() {
            return Err(self.unexpected("type parameter"));
        }
        Ok(params)
    }

    /// Skips a `func`, `var` or `const` declaration.
    fn skip_decl(&mut self) {
        let mut depth = 0_usize;
        while !self.at_eof() {
            let token = self.advance();
            match token.kind {
                TokenKind::Punct => match token.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth = depth.saturating_sub(1),
                    _ => {}
                },
                TokenKind::Semicolon if depth == 0 => return,
                _ => {}
            }
        }
    }

    // ---- types ----------------------------------------------------------

    fn constraint(&mut self) -> Result<TypeExpr, ParseError> {
        let mut terms = vec![self.type_term()?];
        while self.at_punct("|") {
            self.advance();
            terms.push(self.type_term()?);
        }
        if terms.len() == 1 && terms.first().is_some_and(|term| !term.tilde) {
            if let Some(term) = terms.pop() {
                return Ok(term.ty);
            }
        }
        Ok(TypeExpr::Union(terms))
    }

    fn type_term(&mut self) -> Result<TypeTerm, ParseError> {
        let tilde = self.at_punct("~");
        if tilde {
            self.advance();
        }
        Ok(TypeTerm {
            tilde,
            ty: self.type_expr()?,
        })
    }

    fn type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident => self.type_name().map(TypeExpr::Named),
            TokenKind::Punct => match token.text.as_str() {
                "*" => {
                    self.advance();
                    Ok(TypeExpr::Pointer(Box::new(self.type_expr()?)))
                }
                "[" => self.array_or_slice(),
                "(" => {
                    self.advance();
                    let inner = self.type_expr()?;
                    self.expect_punct(")")?;
                    Ok(TypeExpr::Paren(Box::new(inner)))
                }
                "<-" => {
                    self.advance();
                    self.expect_keyword("chan")?;
                    Ok(TypeExpr::Chan {
                        dir: ChanDir::Recv,
                        elem: Box::new(self.type_expr()?),
                    })
                }
                _ => Err(self.unexpected("type")),
            },
            TokenKind::Keyword => match token.text.as_str() {
                "map" => {
                    self.advance();
                    self.expect_punct("[")?;
                    let key = self.type_expr()?;
                    self.expect_punct("]")?;
                    Ok(TypeExpr::Map {
                        key: Box::new(key),
                        value: Box::new(self.type_expr()?),
                    })
                }
                "chan" => {
                    self.advance();
                    let dir = if self.at_punct("<-") {
                        self.advance();
                        ChanDir::Send
                    } else {
                        ChanDir::Both
                    };
                    Ok(TypeExpr::Chan {
                        dir,
                        elem: Box::new(self.type_expr()?),
                    })
                }
                "func" => {
                    self.advance();
                    self.signature().map(TypeExpr::Func)
                }
                "struct" => self.struct_type(),
                "interface" => self.interface_type(),
                _ => Err(self.unexpected("type")),
            },
            _ => Err(self.unexpected("type")),
        }
    }

    fn starts_type(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Ident => true,
            TokenKind::Punct => ["*", "[", "(", "<-"].iter().any(|p| token.is_punct(p)),
            TokenKind::Keyword => ["map", "chan", "func", "struct", "interface"]
                .iter()
                .any(|w| token.is_keyword(w)),
            _ => false,
        }
    }

    fn type_name(&mut self) -> Result<TypeName, ParseError> {
        let first = self.expect_ident()?;
        let (package, name) = if self.at_punct(".") {
            self.advance();
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };
        let args = if self.at_punct("[") {
            self.type_args()?
        } else {
            Vec::new()
        };
        Ok(TypeName {
            package,
            name,
            args,
        })
    }

    fn type_args(&mut self) -> Result<Vec<TypeExpr>, ParseError> {
        self.expect_punct("[")?;
        let mut args = Vec::new();
        while !self.at_punct("]") {
            args.push(self.type_expr()?);
            if self.at_punct(",") {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_punct("]")?;
        if args.is_empty() {
            return Err(self.unexpected("type argument"));
        }
        Ok(args)
    }

    fn array_or_slice(&mut self) -> Result<TypeExpr, ParseError> {
        let open = self.pos;
        self.expect_punct("[")?;
        if self.at_punct("]") {
            self.advance();
            return Ok(TypeExpr::Slice(Box::new(self.type_expr()?)));
        }
        let len = if self.at_punct("...") && self.peek_at(1).is_punct("]") {
            self.advance();
            ArrayLen::Ellipsis
        } else {
            let close = self
                .matching_bracket(open)
                .ok_or_else(|| self.unexpected("`]`"))?;
            let tokens = self.tokens.get(self.pos..close).map(<[Token]>::to_vec);
            self.pos = close;
            ArrayLen::Expr(tokens.unwrap_or_default())
        };
        self.expect_punct("]")?;
        Ok(TypeExpr::Array {
            len,
            elem: Box::new(self.type_expr()?),
        })
    }

    fn signature(&mut self) -> Result<Signature, ParseError> {
        let params = self.params()?;
        let results = if self.at_punct("(") {
            self.params()?
        } else if self.starts_type() {
            vec![ParamGroup {
                names: Vec::new(),
                ty: self.type_expr()?,
                variadic: false,
            }]
        } else {
            Vec::new()
        };
        Ok(Signature { params, results })
    }

    fn params(&mut self) -> Result<Vec<ParamGroup>, ParseError> {
        let open = self.expect_punct("(")?;
        let mut items = Vec::new();
        loop {
            self.skip_semicolons();
            if self.at_punct(")") {
                break;
            }
            items.push(self.param_item()?);
            if self.at_punct(",") {
                self.advance();
            } else {
                self.skip_semicolons();
                break;
            }
        }
        self.expect_punct(")")?;
        group_params(items).map_err(|message| ParseError::new(open.line, open.column, message))
    }

    fn param_item(&mut self) -> Result<ParamItem, ParseError> {
        if self.at_punct("...") {
            self.advance();
            return Ok(ParamItem::Type {
                ty: self.type_expr()?,
                variadic: true,
            });
        }
        if self.peek().kind != TokenKind::Ident {
            return Ok(ParamItem::Type {
                ty: self.type_expr()?,
                variadic: false,
            });
        }
        let next = self.peek_at(1);
        let named = if next.is_punct(".") {
            false
        } else if next.is_punct(",") || next.is_punct(")") {
            return Ok(ParamItem::Bare(self.advance().text));
        } else if next.is_punct("[") {
            // `a []T` and `a [N]T` declare a name; `G[T]` instantiates.
            self.peek_at(2).is_punct("]")
                || self
                    .token_after_brackets(self.pos + 1)
                    .is_some_and(|after| !(after.is_punct(",") || after.is_punct(")")))
        } else {
            true
        };
        if !named {
            return Ok(ParamItem::Type {
                ty: self.type_expr()?,
                variadic: false,
            });
        }
        let name = self.advance().text;
        let variadic = self.at_punct("...");
        if variadic {
            self.advance();
        }
        Ok(ParamItem::Named {
            name,
            ty: self.type_expr()?,
            variadic,
        })
    }

    fn struct_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.expect_keyword("struct")?;
        self.expect_punct("{")?;
        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.at_punct("}") {
                break;
            }
            fields.push(self.field_decl()?);
            self.expect_separator("}")?;
        }
        self.expect_punct("}")?;
        Ok(TypeExpr::Struct(fields))
    }

    fn field_decl(&mut self) -> Result<FieldDecl, ParseError> {
        let (names, ty) = if self.at_punct("*") {
            self.advance();
            let name = self.type_name()?;
            (Vec::new(), TypeExpr::Pointer(Box::new(TypeExpr::Named(name))))
        } else if self.peek().kind == TokenKind::Ident && self.is_embedded_name() {
            (Vec::new(), TypeExpr::Named(self.type_name()?))
        } else {
            let mut names = vec![self.expect_ident()?];
            while self.at_punct(",") {
                self.advance();
                names.push(self.expect_ident()?);
            }
            (names, self.type_expr()?)
        };
        let tag = if self.peek().is_string() {
            let token = self.advance();
            let value = unquote(&token.text)
                .map_err(|err| ParseError::new(token.line, token.column, err.to_string()))?;
            Some(StructTag {
                literal: token.text,
                value,
            })
        } else {
            None
        };
        Ok(FieldDecl { names, ty, tag })
    }

    fn is_embedded_name(&self) -> bool {
        let ends_field =
            |t: &Token| t.kind == TokenKind::Semicolon || t.is_punct("}") || t.is_string();
        let next = self.peek_at(1);
        if next.is_punct(".") || ends_field(next) {
            return true;
        }
        if next.is_punct("[") {
            // `G[T]` embeds an instantiation; `a []T` and `a [N]T` are fields.
            return !self.peek_at(2).is_punct("]")
                && self.token_after_brackets(self.pos + 1).is_some_and(ends_field);
        }
        false
    }

    fn interface_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.expect_keyword("interface")?;
        self.expect_punct("{")?;
        let mut elems = Vec::new();
        loop {
            self.skip_semicolons();
            if self.at_punct("}") {
                break;
            }
            if self.peek().kind == TokenKind::Ident && self.peek_at(1).is_punct("(") {
                let name = self.advance().text;
                let sig = self.signature()?;
                elems.push(InterfaceElem::Method { name, sig });
            } else {
                elems.push(InterfaceElem::Type(self.constraint()?));
            }
            self.expect_separator("}")?;
        }
        self.expect_punct("}")?;
        Ok(TypeExpr::Interface(elems))
    }
}

fn group_params(items: Vec<ParamItem>) -> Result<Vec<ParamGroup>, String> {
    const MIXED: &str = "mixed named and unnamed parameters";
    let any_named = items.iter().any(|item| matches!(item, ParamItem::Named { .. }));
    if !any_named {
        return Ok(items
            .into_iter()
            .map(|item| match item {
                ParamItem::Bare(name) => ParamGroup {
                    names: Vec::new(),
                    ty: TypeExpr::ident(name),
                    variadic: false,
                },
                ParamItem::Named { ty, variadic, .. } | ParamItem::Type { ty, variadic } => {
                    ParamGroup {
                        names: Vec::new(),
                        ty,
                        variadic,
                    }
                }
            })
            .collect());
    }

    let mut groups = Vec::new();
    let mut pending = Vec::new();
    for item in items {
        match item {
            ParamItem::Bare(name) => pending.push(name),
            ParamItem::Named { name, ty, variadic } => {
                pending.push(name);
                groups.push(ParamGroup {
                    names: std::mem::take(&mut pending),
                    ty,
                    variadic,
                });
            }
            ParamItem::Type { .. } => return Err(MIXED.to_owned()),
        }
    }
    if pending.is_empty() {
        Ok(groups)
    } else {
        Err(MIXED.to_owned())
    }
}
