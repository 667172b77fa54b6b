//! Single-line, gofmt-style rendering of type expressions.

use std::fmt::{self, Display, Formatter, Write as _};

use super::ast::{
    ArrayLen, ChanDir, FieldDecl, InterfaceElem, ParamGroup, Signature, TypeExpr, TypeName,
    TypeTerm,
};
use super::token::Token;

fn join<T: Display>(f: &mut Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        item.fmt(f)?;
    }
    Ok(())
}

/// Renders tokens with a single space wherever the source had whitespace.
fn write_tokens(f: &mut impl fmt::Write, tokens: &[Token]) -> fmt::Result {
    for (index, token) in tokens.iter().enumerate() {
        if index > 0 && token.space_before {
            f.write_char(' ')?;
        }
        f.write_str(&token.text)?;
    }
    Ok(())
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => name.fmt(f),
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Slice(elem) => write!(f, "[]{elem}"),
            Self::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Chan { dir, elem } => match dir {
                ChanDir::Both if matches!(**elem, Self::Chan { dir: ChanDir::Recv, .. }) => {
                    write!(f, "chan ({elem})")
                }
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            Self::Func(sig) => write!(f, "func{sig}"),
            Self::Struct(fields) if fields.is_empty() => f.write_str("struct{}"),
            Self::Struct(fields) => {
                f.write_str("struct{ ")?;
                join(f, fields, "; ")?;
                f.write_str(" }")
            }
            Self::Interface(elems) if elems.is_empty() => f.write_str("interface{}"),
            Self::Interface(elems) => {
                f.write_str("interface{ ")?;
                join(f, elems, "; ")?;
                f.write_str(" }")
            }
            Self::Union(terms) => join(f, terms, " | "),
            Self::Paren(inner) => write!(f, "({inner})"),
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(package) = &self.package {
            write!(f, "{package}.")?;
        }
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_char('[')?;
            join(f, &self.args, ", ")?;
            f.write_char(']')?;
        }
        Ok(())
    }
}

impl Display for ArrayLen {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ellipsis => f.write_str("..."),
            Self::Expr(tokens) => write_tokens(f, tokens),
        }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        join(f, &self.params, ", ")?;
        f.write_char(')')?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] if single.names.is_empty() && !single.variadic => write!(f, " {}", single.ty),
            results => {
                f.write_str(" (")?;
                join(f, results, ", ")?;
                f.write_char(')')
            }
        }
    }
}

impl Display for ParamGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.names.is_empty() {
            f.write_str(&self.names.join(", "))?;
            f.write_char(' ')?;
        }
        if self.variadic {
            f.write_str("...")?;
        }
        self.ty.fmt(f)
    }
}

impl Display for FieldDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.names.is_empty() {
            f.write_str(&self.names.join(", "))?;
            f.write_char(' ')?;
        }
        self.ty.fmt(f)?;
        if let Some(tag) = &self.tag {
            write!(f, " {}", tag.literal)?;
        }
        Ok(())
    }
}

impl Display for InterfaceElem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method { name, sig } => write!(f, "{name}{sig}"),
            Self::Type(ty) => ty.fmt(f),
        }
    }
}

impl Display for TypeTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.tilde {
            f.write_char('~')?;
        }
        self.ty.fmt(f)
    }
}
