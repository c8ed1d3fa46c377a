//! Recursive-descent parser over the token stream.
//!
//! The grammar is deliberately partial: declaration statements and type
//! annotations are parsed in full, while value-level JavaScript is scanned
//! over with a balanced-bracket heuristic and surfaces as
//! `Statement::Skipped`. Malformed syntax *inside* the supported subset is
//! a hard error.

use bumpalo::Bump;
use flowschema_ast::node::*;
use flowschema_core::text::LineMap;

use crate::scanner::{Scanner, Token, TokenKind};
use crate::ParseError;

pub struct Parser<'a> {
    arena: &'a Bump,
    file: String,
    tokens: Vec<Token>,
    cursor: usize,
    line_map: LineMap,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, file: &str, source: &str) -> Self {
        let (tokens, line_map) = Scanner::tokenize(source);
        Self {
            arena,
            file: file.to_string(),
            tokens,
            cursor: 0,
            line_map,
        }
    }

    /// Parse the whole file into a `Program`.
    pub fn parse_program(mut self) -> Result<&'a Program<'a>, ParseError> {
        let mut statements = Vec::new();
        while !self.at(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(self.arena.alloc(Program {
            statements: self.alloc_list(statements),
        }))
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    fn peek_kind(&self, offset: usize) -> TokenKind {
        let i = (self.cursor + offset).min(self.tokens.len() - 1);
        self.tokens[i].kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn at_word(&self, word: &str) -> bool {
        self.current().is_ident(word)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.cursor].clone();
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn expect_ident(&mut self) -> Result<Token, ParseError> {
        self.expect(TokenKind::Ident, "an identifier")
    }

    fn error_here(&self, message: String) -> ParseError {
        let at = self.line_map.line_and_column_of(self.current().span.start);
        ParseError::new(&self.file, at, message)
    }

    fn str(&self, text: &str) -> &'a str {
        self.arena.alloc_str(text)
    }

    fn alloc_list<T>(&self, items: Vec<T>) -> NodeList<'a, T> {
        self.arena.alloc_slice_fill_iter(items)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Statement<'a>, ParseError> {
        if self.at_word("import") {
            return self.parse_import();
        }
        if self.at_word("export") {
            return self.parse_export();
        }
        if self.at_word("declare") {
            // `declare type` / `declare class` behave like the plain form.
            self.advance();
            return self.parse_statement();
        }
        if self.at_word("type") && self.peek_kind(1) == TokenKind::Ident {
            return Ok(Statement::TypeAlias(self.parse_type_alias()?));
        }
        if self.at_word("interface") {
            return Ok(Statement::Interface(self.parse_interface()?));
        }
        if self.at_word("class") {
            return Ok(Statement::Class(self.parse_class()?));
        }
        if self.at_word("function") {
            return Ok(Statement::Function(self.parse_function()?));
        }
        if self.at_word("const") || self.at_word("let") || self.at_word("var") {
            return self.parse_variable();
        }
        if self.at(TokenKind::LBrace) {
            let block = self.parse_block()?;
            return Ok(Statement::Block(self.arena.alloc(block)));
        }
        if self.eat(TokenKind::Semi) {
            return Ok(Statement::Skipped);
        }
        self.skip_statement();
        Ok(Statement::Skipped)
    }

    fn parse_block(&mut self) -> Result<Block<'a>, ParseError> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Block {
            span: open.span.union(&close.span),
            statements: self.alloc_list(statements),
        })
    }

    /// Consume one unsupported statement with a balanced-bracket heuristic.
    fn skip_statement(&mut self) {
        let mut depth = 0usize;
        let mut saw_group = false;
        loop {
            match self.current().kind {
                TokenKind::Eof => return,
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::LBrace | TokenKind::ExactLBrace => {
                    depth += 1;
                    saw_group = true;
                    self.advance();
                }
                TokenKind::RBrace | TokenKind::ExactRBrace => {
                    if depth == 0 {
                        // Closes an enclosing block; leave it alone.
                        return;
                    }
                    depth -= 1;
                    self.advance();
                    // A statement-level `{ ... }` group usually ends the
                    // construct (function expressions, object literals).
                    if depth == 0 && saw_group {
                        self.eat(TokenKind::Semi);
                        return;
                    }
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Consume a bracketed group, current token being the opener.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof => return,
                TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::ExactLBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::ExactRBrace => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Consume a `<...>` group, current token being `<`.
    fn skip_angle_group(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof => return,
                TokenKind::Lt => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::Gt => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Imports / exports
    // ------------------------------------------------------------------

    fn parse_import(&mut self) -> Result<Statement<'a>, ParseError> {
        let keyword = self.advance();
        // `import type {A} from 's'` — the `type` modifier changes nothing
        // for us, every import binds names usable in annotations.
        if self.at_word("type")
            && (self.peek_kind(1) == TokenKind::LBrace || self.peek_kind(1) == TokenKind::Ident)
        {
            self.advance();
        }
        if self.at(TokenKind::Str) {
            // Side-effect import: nothing to bind.
            let _ = self.advance();
            self.eat(TokenKind::Semi);
            return Ok(Statement::Skipped);
        }
        if self.at(TokenKind::Star) {
            // `import * as ns from 's'` — namespace objects are not
            // resolvable as type names, drop the whole statement.
            self.skip_statement();
            return Ok(Statement::Skipped);
        }

        let mut bindings = Vec::new();
        if self.at(TokenKind::Ident) {
            let local = self.advance();
            bindings.push(ImportBinding {
                local: self.str(&local.value),
                imported: None,
            });
            self.eat(TokenKind::Comma);
        }
        if self.eat(TokenKind::LBrace) {
            self.parse_named_bindings(&mut bindings)?;
            self.expect(TokenKind::RBrace, "'}'")?;
        }
        if !self.eat_word("from") {
            return Err(self.error_here("expected 'from' in import".to_string()));
        }
        let source = self.expect(TokenKind::Str, "a module path string")?;
        self.eat(TokenKind::Semi);
        Ok(Statement::Import(self.arena.alloc(ImportDecl {
            span: keyword.span.union(&source.span),
            source: self.str(&source.value),
            bindings: self.alloc_list(bindings),
        })))
    }

    /// `A, B as C, ...` inside import/destructure braces.
    fn parse_named_bindings(
        &mut self,
        bindings: &mut Vec<ImportBinding<'a>>,
    ) -> Result<(), ParseError> {
        while self.at(TokenKind::Ident) {
            let imported = self.advance();
            let local = if self.eat_word("as") || self.eat(TokenKind::Colon) {
                self.expect_ident()?
            } else {
                imported.clone()
            };
            bindings.push(ImportBinding {
                local: self.str(&local.value),
                imported: Some(self.str(&imported.value)),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(())
    }

    fn parse_export(&mut self) -> Result<Statement<'a>, ParseError> {
        let keyword = self.advance();
        if self.eat_word("default") {
            let value = if self.at_word("class") {
                DefaultExport::Class(self.parse_class()?)
            } else if self.at(TokenKind::Ident) {
                let name = self.advance();
                self.eat(TokenKind::Semi);
                DefaultExport::Name(self.str(&name.value))
            } else {
                // A default-exported expression; no name to resolve.
                self.skip_statement();
                return Ok(Statement::Skipped);
            };
            let span = keyword.span;
            return Ok(Statement::ExportDefault(
                self.arena.alloc(ExportDefault { span, value }),
            ));
        }

        // `export type` wraps a declaration or a specifier list.
        if self.at_word("type") && self.peek_kind(1) == TokenKind::LBrace {
            self.advance();
        }
        if self.eat(TokenKind::LBrace) {
            let mut specifiers = Vec::new();
            while self.at(TokenKind::Ident) {
                let local = self.advance();
                let exported = if self.eat_word("as") {
                    self.expect_ident()?
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier {
                    local: self.str(&local.value),
                    exported: self.str(&exported.value),
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let close = self.expect(TokenKind::RBrace, "'}'")?;
            if self.at_word("from") {
                // Re-exports name things in another module's scope;
                // outside the supported subset.
                self.skip_statement();
                return Ok(Statement::Skipped);
            }
            self.eat(TokenKind::Semi);
            return Ok(Statement::ExportNamed(self.arena.alloc(ExportNamed {
                span: keyword.span.union(&close.span),
                declaration: None,
                specifiers: self.alloc_list(specifiers),
            })));
        }

        let declaration = self.parse_statement()?;
        Ok(Statement::ExportNamed(self.arena.alloc(ExportNamed {
            span: keyword.span,
            declaration: Some(declaration),
            specifiers: &[],
        })))
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn parse_type_alias(&mut self) -> Result<&'a TypeAliasDecl<'a>, ParseError> {
        let keyword = self.advance();
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        self.expect(TokenKind::Eq, "'=' in type alias")?;
        let annot = self.parse_annot()?;
        self.eat(TokenKind::Semi);
        Ok(self.arena.alloc(TypeAliasDecl {
            span: keyword.span.union(&annot.span()),
            name: self.str(&name.value),
            type_params,
            annot: self.arena.alloc(annot),
        }))
    }

    fn parse_interface(&mut self) -> Result<&'a InterfaceDecl<'a>, ParseError> {
        let keyword = self.advance();
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        let mut extends = Vec::new();
        if self.eat_word("extends") {
            loop {
                extends.push(self.parse_type_ref()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let body = self.parse_object_body(false)?;
        Ok(self.arena.alloc(InterfaceDecl {
            span: keyword.span.union(&body.span),
            name: self.str(&name.value),
            type_params,
            extends: self.alloc_list(extends),
            body,
        }))
    }

    fn parse_class(&mut self) -> Result<&'a ClassDecl<'a>, ParseError> {
        let keyword = self.advance();
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        let mut superclass = None;
        if self.eat_word("extends") {
            let base = self.parse_type_ref()?;
            superclass = Some(&*self.arena.alloc(base));
        }
        if self.eat_word("implements") {
            loop {
                let _ = self.parse_type_ref()?;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let body = self.parse_object_body(true)?;
        Ok(self.arena.alloc(ClassDecl {
            span: keyword.span.union(&body.span),
            name: self.str(&name.value),
            type_params,
            superclass,
            members: body.props,
        }))
    }

    fn parse_function(&mut self) -> Result<&'a FunctionDecl<'a>, ParseError> {
        let keyword = self.advance();
        let name = self.expect_ident()?;
        if self.at(TokenKind::Lt) {
            self.skip_angle_group();
        }
        if self.at(TokenKind::LParen) {
            self.skip_group();
        }
        if self.eat(TokenKind::Colon) {
            let _ = self.parse_annot()?;
        }
        let body = self.parse_block()?;
        Ok(self.arena.alloc(FunctionDecl {
            span: keyword.span.union(&body.span),
            name: self.str(&name.value),
            body,
        }))
    }

    /// `const`/`let`/`var`: recognized initializers are `require(...)` and
    /// literal constants; anything else is skipped.
    fn parse_variable(&mut self) -> Result<Statement<'a>, ParseError> {
        let keyword = self.advance();
        let is_const = keyword.is_ident("const");

        // Destructured require: `const {A, B: C} = require('./m')`.
        if self.at(TokenKind::LBrace) {
            let checkpoint = self.cursor;
            self.advance();
            let mut bindings = Vec::new();
            if self.parse_named_bindings(&mut bindings).is_ok()
                && self.eat(TokenKind::RBrace)
                && self.eat(TokenKind::Eq)
                && self.at_word("require")
            {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let source = self.expect(TokenKind::Str, "a module path string")?;
                self.expect(TokenKind::RParen, "')'")?;
                self.eat(TokenKind::Semi);
                return Ok(Statement::Require(self.arena.alloc(RequireDecl {
                    span: keyword.span.union(&source.span),
                    source: self.str(&source.value),
                    bindings: self.alloc_list(bindings),
                })));
            }
            self.cursor = checkpoint;
            self.skip_statement();
            return Ok(Statement::Skipped);
        }

        if !self.at(TokenKind::Ident) {
            self.skip_statement();
            return Ok(Statement::Skipped);
        }
        let name = self.advance();
        if !self.eat(TokenKind::Eq) {
            self.skip_statement();
            return Ok(Statement::Skipped);
        }

        if self.at_word("require") && self.peek_kind(1) == TokenKind::LParen {
            self.advance();
            self.advance();
            let source = self.expect(TokenKind::Str, "a module path string")?;
            self.expect(TokenKind::RParen, "')'")?;
            self.eat(TokenKind::Semi);
            let binding = ImportBinding {
                local: self.str(&name.value),
                imported: None,
            };
            return Ok(Statement::Require(self.arena.alloc(RequireDecl {
                span: keyword.span.union(&source.span),
                source: self.str(&source.value),
                bindings: self.alloc_list(vec![binding]),
            })));
        }

        if is_const {
            if let Some(value) = self.try_literal() {
                // The literal must be the whole initializer, not the head
                // of an expression.
                if self.at(TokenKind::Semi) || self.at(TokenKind::Eof) || self.at(TokenKind::RBrace)
                {
                    self.eat(TokenKind::Semi);
                    return Ok(Statement::ConstLiteral(self.arena.alloc(ConstLiteralDecl {
                        span: keyword.span.union(&name.span),
                        name: self.str(&name.value),
                        value,
                    })));
                }
            }
        }
        self.skip_statement();
        Ok(Statement::Skipped)
    }

    /// Consume a literal token if one is next: string, number (optionally
    /// negated), `true`, or `false`.
    fn try_literal(&mut self) -> Option<LiteralExpr<'a>> {
        match self.current().kind {
            TokenKind::Str => {
                let token = self.advance();
                Some(LiteralExpr::Str(self.str(&token.value)))
            }
            TokenKind::Num => {
                let token = self.advance();
                token.value.parse::<f64>().ok().map(LiteralExpr::Num)
            }
            TokenKind::Minus if self.peek_kind(1) == TokenKind::Num => {
                self.advance();
                let token = self.advance();
                token.value.parse::<f64>().ok().map(|n| LiteralExpr::Num(-n))
            }
            TokenKind::Ident if self.at_word("true") => {
                self.advance();
                Some(LiteralExpr::Bool(true))
            }
            TokenKind::Ident if self.at_word("false") => {
                self.advance();
                Some(LiteralExpr::Bool(false))
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Type parameters and references
    // ------------------------------------------------------------------

    fn parse_type_params(&mut self) -> Result<NodeList<'a, TypeParam<'a>>, ParseError> {
        if !self.eat(TokenKind::Lt) {
            return Ok(&[]);
        }
        let mut params = Vec::new();
        while self.at(TokenKind::Ident) || self.at(TokenKind::Plus) || self.at(TokenKind::Minus) {
            // Variance sigils carry no structural meaning here.
            if self.at(TokenKind::Plus) || self.at(TokenKind::Minus) {
                self.advance();
            }
            let name = self.expect_ident()?;
            if self.eat(TokenKind::Colon) {
                // Bounds constrain checking, not structure.
                let _ = self.parse_annot()?;
            }
            let default = if self.eat(TokenKind::Eq) {
                let annot = self.parse_annot()?;
                Some(&*self.arena.alloc(annot))
            } else {
                None
            };
            params.push(TypeParam {
                name: self.str(&name.value),
                default,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "'>'")?;
        Ok(self.alloc_list(params))
    }

    fn parse_type_ref(&mut self) -> Result<TypeRef<'a>, ParseError> {
        let first = self.expect_ident()?;
        let mut name = first.value.clone();
        let mut span = first.span;
        while self.at(TokenKind::Dot) && self.peek_kind(1) == TokenKind::Ident {
            self.advance();
            let segment = self.advance();
            name.push('.');
            name.push_str(&segment.value);
            span = span.union(&segment.span);
        }
        let mut args = Vec::new();
        if self.eat(TokenKind::Lt) {
            loop {
                args.push(self.parse_annot()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let close = self.expect(TokenKind::Gt, "'>'")?;
            span = span.union(&close.span);
        }
        Ok(TypeRef {
            span,
            name: self.str(&name),
            args: self.alloc_list(args),
        })
    }

    // ------------------------------------------------------------------
    // Type annotations
    // ------------------------------------------------------------------

    pub(crate) fn parse_annot(&mut self) -> Result<TypeAnnot<'a>, ParseError> {
        // Leading `|` before the first variant is legal Flow.
        self.eat(TokenKind::Pipe);
        let first = self.parse_intersection()?;
        if !self.at(TokenKind::Pipe) {
            return Ok(first);
        }
        let mut span = first.span();
        let mut variants = vec![first];
        while self.eat(TokenKind::Pipe) {
            let variant = self.parse_intersection()?;
            span = span.union(&variant.span());
            variants.push(variant);
        }
        Ok(TypeAnnot::Union {
            span,
            variants: self.alloc_list(variants),
        })
    }

    fn parse_intersection(&mut self) -> Result<TypeAnnot<'a>, ParseError> {
        let first = self.parse_postfix()?;
        if !self.at(TokenKind::Amp) {
            return Ok(first);
        }
        let mut span = first.span();
        let mut parts = vec![first];
        while self.eat(TokenKind::Amp) {
            let part = self.parse_postfix()?;
            span = span.union(&part.span());
            parts.push(part);
        }
        Ok(TypeAnnot::Intersection {
            span,
            parts: self.alloc_list(parts),
        })
    }

    fn parse_postfix(&mut self) -> Result<TypeAnnot<'a>, ParseError> {
        let mut annot = self.parse_primary()?;
        while self.at(TokenKind::LBracket) && self.peek_kind(1) == TokenKind::RBracket {
            self.advance();
            let close = self.advance();
            let span = annot.span().union(&close.span);
            let element = self.arena.alloc(annot);
            annot = TypeAnnot::Array { span, element };
        }
        Ok(annot)
    }

    fn parse_primary(&mut self) -> Result<TypeAnnot<'a>, ParseError> {
        match self.current().kind {
            TokenKind::Question => {
                let mark = self.advance();
                let inner = self.parse_postfix()?;
                let span = mark.span.union(&inner.span());
                Ok(TypeAnnot::Nullable {
                    span,
                    inner: self.arena.alloc(inner),
                })
            }
            TokenKind::Str => {
                let token = self.advance();
                Ok(TypeAnnot::StringLiteral {
                    span: token.span,
                    value: self.str(&token.value),
                })
            }
            TokenKind::Num => {
                let token = self.advance();
                let value = token
                    .value
                    .parse::<f64>()
                    .map_err(|_| self.error_here(format!("bad number literal '{}'", token.value)))?;
                Ok(TypeAnnot::NumberLiteral {
                    span: token.span,
                    value,
                })
            }
            TokenKind::Minus if self.peek_kind(1) == TokenKind::Num => {
                let mark = self.advance();
                let token = self.advance();
                let value = token
                    .value
                    .parse::<f64>()
                    .map_err(|_| self.error_here(format!("bad number literal '{}'", token.value)))?;
                Ok(TypeAnnot::NumberLiteral {
                    span: mark.span.union(&token.span),
                    value: -value,
                })
            }
            TokenKind::LBrace => {
                let body = self.parse_object_body(false)?;
                Ok(TypeAnnot::Object(body))
            }
            TokenKind::ExactLBrace => {
                let body = self.parse_object_body(false)?;
                Ok(TypeAnnot::Object(body))
            }
            TokenKind::LBracket => self.parse_tuple(),
            TokenKind::LParen => self.parse_paren_or_function(),
            TokenKind::Lt => {
                // `<T>(x: T) => T` — a generic function type.
                let start = self.current().span;
                self.skip_angle_group();
                if self.at(TokenKind::LParen) {
                    self.skip_group();
                }
                self.expect(TokenKind::Arrow, "'=>' in function type")?;
                let ret = self.parse_annot()?;
                Ok(TypeAnnot::Function {
                    span: start.union(&ret.span()),
                })
            }
            TokenKind::Ident => self.parse_named_annot(),
            _ => Err(self.error_here(format!(
                "expected a type annotation, found {:?}",
                self.current().kind
            ))),
        }
    }

    fn parse_named_annot(&mut self) -> Result<TypeAnnot<'a>, ParseError> {
        let word = self.current().value.clone();
        let span = self.current().span;
        match word.as_str() {
            "string" => {
                self.advance();
                Ok(TypeAnnot::String(span))
            }
            "number" => {
                self.advance();
                Ok(TypeAnnot::Number(span))
            }
            "boolean" => {
                self.advance();
                Ok(TypeAnnot::Boolean(span))
            }
            "any" => {
                self.advance();
                Ok(TypeAnnot::Any(span))
            }
            "mixed" => {
                self.advance();
                Ok(TypeAnnot::Mixed(span))
            }
            "void" | "null" => {
                self.advance();
                Ok(TypeAnnot::Null(span))
            }
            "true" => {
                self.advance();
                Ok(TypeAnnot::BooleanLiteral { span, value: true })
            }
            "false" => {
                self.advance();
                Ok(TypeAnnot::BooleanLiteral { span, value: false })
            }
            _ => {
                let reference = self.parse_type_ref()?;
                Ok(TypeAnnot::Reference(reference))
            }
        }
    }

    fn parse_tuple(&mut self) -> Result<TypeAnnot<'a>, ParseError> {
        let open = self.advance();
        let mut elements = Vec::new();
        while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
            elements.push(self.parse_annot()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RBracket, "']'")?;
        Ok(TypeAnnot::Tuple {
            span: open.span.union(&close.span),
            elements: self.alloc_list(elements),
        })
    }

    /// `(...)` is either a parenthesized annotation or the parameter list
    /// of a function type; disambiguated by looking for `=>` after the
    /// matching close paren.
    fn parse_paren_or_function(&mut self) -> Result<TypeAnnot<'a>, ParseError> {
        let start = self.current().span;
        if self.paren_group_is_function() {
            self.skip_group();
            self.expect(TokenKind::Arrow, "'=>' in function type")?;
            let ret = self.parse_annot()?;
            return Ok(TypeAnnot::Function {
                span: start.union(&ret.span()),
            });
        }
        self.advance();
        let inner = self.parse_annot()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(inner)
    }

    fn paren_group_is_function(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.cursor;
        while i < self.tokens.len() {
            match self.tokens[i].kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace
                | TokenKind::ExactLBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace
                | TokenKind::ExactRBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i + 1 < self.tokens.len()
                            && self.tokens[i + 1].kind == TokenKind::Arrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    // ------------------------------------------------------------------
    // Object bodies (object annotations, interfaces, classes)
    // ------------------------------------------------------------------

    fn parse_object_body(&mut self, is_class: bool) -> Result<ObjectAnnot<'a>, ParseError> {
        let open = if self.at(TokenKind::ExactLBrace) {
            self.advance()
        } else {
            self.expect(TokenKind::LBrace, "'{'")?
        };
        let exact = open.kind == TokenKind::ExactLBrace;
        let closer = if exact {
            TokenKind::ExactRBrace
        } else {
            TokenKind::RBrace
        };

        let mut props = Vec::new();
        while !self.at(closer) && !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Comma) || self.eat(TokenKind::Semi) {
                continue;
            }
            if let Some(prop) = self.parse_object_prop(is_class)? {
                props.push(prop);
            }
        }
        let close = self.expect(closer, "a closing brace")?;
        Ok(ObjectAnnot {
            span: open.span.union(&close.span),
            exact,
            props: self.alloc_list(props),
        })
    }

    fn parse_object_prop(&mut self, is_class: bool) -> Result<Option<ObjectProp<'a>>, ParseError> {
        // Spread: `...Base` mixes fields in at the value level; the engine
        // models inheritance through `extends` only.
        if self.eat(TokenKind::Ellipsis) {
            if !self.at(TokenKind::Comma) && !self.at(TokenKind::RBrace)
                && !self.at(TokenKind::ExactRBrace)
            {
                let _ = self.parse_annot()?;
            }
            return Ok(None);
        }

        // Indexer: `[string]: V` or `[key: string]: V`.
        if self.eat(TokenKind::LBracket) {
            let start = self.current().span;
            if self.at(TokenKind::Ident) && self.peek_kind(1) == TokenKind::Colon {
                self.advance();
                self.advance();
            }
            let key = self.parse_annot()?;
            self.expect(TokenKind::RBracket, "']'")?;
            self.expect(TokenKind::Colon, "':' after indexer key")?;
            let value = self.parse_annot()?;
            let span = start.union(&value.span());
            return Ok(Some(ObjectProp::Indexer(IndexerProp {
                span,
                key: self.arena.alloc(key),
                value: self.arena.alloc(value),
            })));
        }

        // Variance sigil on a field.
        if self.at(TokenKind::Plus) || self.at(TokenKind::Minus) {
            self.advance();
        }

        let mut is_static = false;
        if is_class && self.at_word("static") && self.peek_kind(1) == TokenKind::Ident {
            self.advance();
            is_static = true;
        }

        let name_token = if self.at(TokenKind::Str) {
            self.advance()
        } else {
            self.expect(TokenKind::Ident, "a property name")?
        };
        let leading_comment = name_token
            .leading_comment
            .as_deref()
            .map(|c| self.str(c));
        let name = self.str(&name_token.value);
        let optional = self.eat(TokenKind::Question);

        // Method signature or definition.
        if self.at(TokenKind::Lt) || self.at(TokenKind::LParen) {
            if self.at(TokenKind::Lt) {
                self.skip_angle_group();
            }
            if self.at(TokenKind::LParen) {
                self.skip_group();
            }
            let mut span = name_token.span;
            if self.eat(TokenKind::Colon) {
                let ret = self.parse_annot()?;
                span = span.union(&ret.span());
            }
            if is_class && self.at(TokenKind::LBrace) {
                self.skip_group();
            }
            return Ok(Some(ObjectProp::Field(FieldProp {
                span,
                name,
                value: None,
                optional,
                is_static,
                is_method: true,
                leading_comment,
            })));
        }

        if self.eat(TokenKind::Colon) {
            let value = self.parse_annot()?;
            let span = name_token.span.union(&value.span());
            // A class field may carry an initializer after its annotation.
            if is_class && self.eat(TokenKind::Eq) {
                self.skip_initializer();
            }
            return Ok(Some(ObjectProp::Field(FieldProp {
                span,
                name,
                value: Some(self.arena.alloc(value)),
                optional,
                is_static,
                is_method: false,
                leading_comment,
            })));
        }

        // Unannotated class field with an initializer: `count = 0;`.
        if is_class && self.eat(TokenKind::Eq) {
            self.skip_initializer();
            return Ok(Some(ObjectProp::Field(FieldProp {
                span: name_token.span,
                name,
                value: None,
                optional,
                is_static,
                is_method: false,
                leading_comment,
            })));
        }

        Err(self.error_here(format!("expected ':' after property '{}'", name_token.value)))
    }

    /// Consume an initializer expression up to the member separator.
    fn skip_initializer(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof => return,
                TokenKind::Semi | TokenKind::Comma if depth == 0 => return,
                TokenKind::RBrace | TokenKind::ExactRBrace if depth == 0 => return,
                TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::ExactLBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::ExactRBrace => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<'a>(arena: &'a Bump, source: &str) -> &'a Program<'a> {
        Parser::new(arena, "test.js", source)
            .parse_program()
            .unwrap_or_else(|err| panic!("parse failed: {err}"))
    }

    fn single_alias<'a>(program: &'a Program<'a>) -> &'a TypeAliasDecl<'a> {
        match program.statements[0] {
            Statement::TypeAlias(decl) => decl,
            other => panic!("expected type alias, got {other:?}"),
        }
    }

    #[test]
    fn test_type_alias_object() {
        let arena = Bump::new();
        let program = parse(&arena, "type Point = {x: number, y: number};");
        let alias = single_alias(program);
        assert_eq!(alias.name, "Point");
        match alias.annot {
            TypeAnnot::Object(object) => {
                assert_eq!(object.props.len(), 2);
                assert!(!object.exact);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_object_and_optional_field() {
        let arena = Bump::new();
        let program = parse(&arena, "type T = {| a?: string |};");
        match single_alias(program).annot {
            TypeAnnot::Object(object) => {
                assert!(object.exact);
                match &object.props[0] {
                    ObjectProp::Field(field) => {
                        assert_eq!(field.name, "a");
                        assert!(field.optional);
                    }
                    other => panic!("expected field, got {other:?}"),
                }
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_union_and_nullable() {
        let arena = Bump::new();
        let program = parse(&arena, "type T = ?string | number;");
        match single_alias(program).annot {
            TypeAnnot::Union { variants, .. } => {
                assert_eq!(variants.len(), 2);
                assert!(matches!(variants[0], TypeAnnot::Nullable { .. }));
            }
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn test_generic_alias_with_default() {
        let arena = Bump::new();
        let program = parse(&arena, "type Box<T, U = string> = {value: T, tag: U};");
        let alias = single_alias(program);
        assert_eq!(alias.type_params.len(), 2);
        assert_eq!(alias.type_params[0].name, "T");
        assert!(alias.type_params[0].default.is_none());
        assert!(alias.type_params[1].default.is_some());
    }

    #[test]
    fn test_tuple_and_array_postfix() {
        let arena = Bump::new();
        let program = parse(&arena, "type T = [string, number[]];");
        match single_alias(program).annot {
            TypeAnnot::Tuple { elements, .. } => {
                assert_eq!(elements.len(), 2);
                assert!(matches!(elements[1], TypeAnnot::Array { .. }));
            }
            other => panic!("expected tuple, got {other:?}"),
        }
    }

    #[test]
    fn test_indexer_prop() {
        let arena = Bump::new();
        let program = parse(&arena, "type T = {[key: string]: number};");
        match single_alias(program).annot {
            TypeAnnot::Object(object) => {
                assert!(matches!(object.props[0], ObjectProp::Indexer(_)));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_import_forms() {
        let arena = Bump::new();
        let program = parse(
            &arena,
            "import Widget, {Gear as Cog} from './parts';\nimport type {Spec} from './spec';",
        );
        match program.statements[0] {
            Statement::Import(import) => {
                assert_eq!(import.source, "./parts");
                assert_eq!(import.bindings.len(), 2);
                assert_eq!(import.bindings[0].local, "Widget");
                assert!(import.bindings[0].imported.is_none());
                assert_eq!(import.bindings[1].local, "Cog");
                assert_eq!(import.bindings[1].imported, Some("Gear"));
            }
            other => panic!("expected import, got {other:?}"),
        }
        match program.statements[1] {
            Statement::Import(import) => {
                assert_eq!(import.bindings[0].local, "Spec");
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn test_require_forms() {
        let arena = Bump::new();
        let program = parse(
            &arena,
            "const Whole = require('./a');\nconst {X, Y: Z} = require('./b');",
        );
        match program.statements[0] {
            Statement::Require(require) => {
                assert_eq!(require.source, "./a");
                assert!(require.bindings[0].imported.is_none());
            }
            other => panic!("expected require, got {other:?}"),
        }
        match program.statements[1] {
            Statement::Require(require) => {
                assert_eq!(require.bindings.len(), 2);
                assert_eq!(require.bindings[1].local, "Z");
                assert_eq!(require.bindings[1].imported, Some("Y"));
            }
            other => panic!("expected require, got {other:?}"),
        }
    }

    #[test]
    fn test_export_wrapped_declaration() {
        let arena = Bump::new();
        let program = parse(&arena, "export type Id = string;");
        match program.statements[0] {
            Statement::ExportNamed(export) => {
                assert!(matches!(export.declaration, Some(Statement::TypeAlias(_))));
                assert!(export.specifiers.is_empty());
            }
            other => panic!("expected export, got {other:?}"),
        }
    }

    #[test]
    fn test_export_specifiers_and_default() {
        let arena = Bump::new();
        let program = parse(
            &arena,
            "type A = string;\nexport {A, A as Alias};\nexport default A;",
        );
        match program.statements[1] {
            Statement::ExportNamed(export) => {
                assert!(export.declaration.is_none());
                assert_eq!(export.specifiers.len(), 2);
                assert_eq!(export.specifiers[1].exported, "Alias");
            }
            other => panic!("expected export, got {other:?}"),
        }
        match program.statements[2] {
            Statement::ExportDefault(export) => {
                assert!(matches!(export.value, DefaultExport::Name("A")));
            }
            other => panic!("expected default export, got {other:?}"),
        }
    }

    #[test]
    fn test_interface_with_extends() {
        let arena = Bump::new();
        let program = parse(
            &arena,
            "interface Named extends Base, Tagged<string> { name: string; }",
        );
        match program.statements[0] {
            Statement::Interface(decl) => {
                assert_eq!(decl.name, "Named");
                assert_eq!(decl.extends.len(), 2);
                assert_eq!(decl.extends[1].args.len(), 1);
                assert_eq!(decl.body.props.len(), 1);
            }
            other => panic!("expected interface, got {other:?}"),
        }
    }

    #[test]
    fn test_class_fields_methods_and_superclass() {
        let arena = Bump::new();
        let program = parse(
            &arena,
            "class Dog extends Animal {\n\
             name: string;\n\
             static kind = 'dog';\n\
             bark(volume: number): void { return; }\n\
             }",
        );
        match program.statements[0] {
            Statement::Class(decl) => {
                assert_eq!(decl.name, "Dog");
                assert_eq!(decl.superclass.map(|s| s.name), Some("Animal"));
                assert_eq!(decl.members.len(), 3);
                match &decl.members[1] {
                    ObjectProp::Field(field) => assert!(field.is_static),
                    other => panic!("expected field, got {other:?}"),
                }
                match &decl.members[2] {
                    ObjectProp::Field(field) => assert!(field.is_method),
                    other => panic!("expected field, got {other:?}"),
                }
            }
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn test_const_literal() {
        let arena = Bump::new();
        let program = parse(&arena, "const KIND = 'circle';\nconst LIMIT = 42;");
        match program.statements[0] {
            Statement::ConstLiteral(decl) => {
                assert_eq!(decl.name, "KIND");
                assert_eq!(decl.value, LiteralExpr::Str("circle"));
            }
            other => panic!("expected const literal, got {other:?}"),
        }
        match program.statements[1] {
            Statement::ConstLiteral(decl) => {
                assert_eq!(decl.value, LiteralExpr::Num(42.0));
            }
            other => panic!("expected const literal, got {other:?}"),
        }
    }

    #[test]
    fn test_function_body_keeps_nested_declarations() {
        let arena = Bump::new();
        let program = parse(
            &arena,
            "function helper(a, b) {\n  type Local = {n: number};\n  return a + b;\n}",
        );
        match program.statements[0] {
            Statement::Function(decl) => {
                assert_eq!(decl.name, "helper");
                let nested = decl
                    .body
                    .statements
                    .iter()
                    .filter(|s| matches!(s, Statement::TypeAlias(_)))
                    .count();
                assert_eq!(nested, 1);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_statements_are_skipped() {
        let arena = Bump::new();
        let program = parse(
            &arena,
            "console.log('hi');\nlet total = a + b * 2;\ntype T = string;",
        );
        assert!(matches!(program.statements[0], Statement::Skipped));
        assert!(matches!(program.statements[1], Statement::Skipped));
        assert!(matches!(program.statements[2], Statement::TypeAlias(_)));
    }

    #[test]
    fn test_function_type_annotation_is_opaque() {
        let arena = Bump::new();
        let program = parse(&arena, "type T = {run: (a: number) => string};");
        match single_alias(program).annot {
            TypeAnnot::Object(object) => match &object.props[0] {
                ObjectProp::Field(field) => {
                    assert!(matches!(field.value, Some(TypeAnnot::Function { .. })));
                }
                other => panic!("expected field, got {other:?}"),
            },
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_leading_comment_survives_to_field() {
        let arena = Bump::new();
        let program = parse(
            &arena,
            "type T = {\n  // @repr {i32}\n  weight: number,\n};",
        );
        match single_alias(program).annot {
            TypeAnnot::Object(object) => match &object.props[0] {
                ObjectProp::Field(field) => {
                    assert_eq!(field.leading_comment, Some("@repr {i32}"));
                }
                other => panic!("expected field, got {other:?}"),
            },
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_reports_position() {
        let arena = Bump::new();
        let err = Parser::new(&arena, "bad.js", "type T = ;")
            .parse_program()
            .unwrap_err();
        assert_eq!(err.file, "bad.js");
        assert_eq!(err.line, 1);
        assert!(err.message.contains("type annotation"));
    }

    #[test]
    fn test_declare_prefix_is_transparent() {
        let arena = Bump::new();
        let program = parse(&arena, "declare type T = string;");
        assert!(matches!(program.statements[0], Statement::TypeAlias(_)));
    }

    #[test]
    fn test_dotted_reference() {
        let arena = Bump::new();
        let program = parse(&arena, "type T = Api.Response<string>;");
        match single_alias(program).annot {
            TypeAnnot::Reference(reference) => {
                assert_eq!(reference.name, "Api.Response");
                assert_eq!(reference.args.len(), 1);
            }
            other => panic!("expected reference, got {other:?}"),
        }
    }
}
