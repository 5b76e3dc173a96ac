//! Recursive descent parser driving the [`Creator`].
//!
//! There is no syntax tree: every rule emits instructions as it recognizes
//! its input. A rule returns `Ok(false)` when the upcoming tokens cannot
//! start it (nothing consumed, nothing emitted) and an error once it has
//! committed and a required part is missing.
//!
//! Grammar:
//!
//! ```text
//! Program     := Sequence? EOF
//! Sequence    := Expression (";" Expression)* ";"?
//! Expression  := Jump | Term Tie*
//! Jump        := "break" Expression? | "continue" | "return" Expression?
//! Tie         := "!"? BinaryOp ("=" | "->")? Term
//! Term        := UnaryOp* Operand Tail*
//! Operand     := Literal | Variable | Conditional | Loop | Lambda | Group
//!              | "(" Expression ")"
//! Variable    := "loc" "ref"? Identifier ("=" Expression)?
//!              | "ref" Identifier | Identifier
//! Conditional := "if" "(" Expression ")" Expression ("or" Expression)?
//! Loop        := "as" "(" Expression ")" Expression
//! Lambda      := "(" (Param ("," Param)*)? ")" "=>" Expression
//! Param       := "ref"? Identifier
//! Group       := "{" Sequence? "}"
//! Tail        := "[" Expression "]" | Field | "(" Arguments? ")"
//! ```

use crate::{
    compiler::{
        creator::{Creator, Param},
        error::{CompileError, StructureError, StructureErrorKind, SyntaxError, SyntaxErrorKind},
        operators::{PendingOp, binary_op, prefix_op, store_op},
        trace::ParseTracer,
    },
    scanner::{Position, Span, Token, TokenKind},
    values::Value,
    vm::{BinaryOp, Code, Instruction, StoreMode},
};

type RuleResult = Result<bool, CompileError>;

pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    index: usize,
    creator: Creator,
    tracer: &'t mut dyn ParseTracer,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: &'t [Token], tracer: &'t mut dyn ParseTracer) -> Self {
        Self {
            tokens,
            index: 0,
            creator: Creator::new(),
            tracer,
        }
    }

    /// Parse the whole token stream and hand out the program.
    pub(crate) fn parse(mut self) -> Result<Code, CompileError> {
        self.program()?;
        let position = self.end_position();
        Ok(self.creator.finish(position)?)
    }

    // === Token Access ===

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.index)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.index + offset)
    }

    fn at(&self, text: &str) -> bool {
        self.peek().is_some_and(|token| token.is(text))
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.index)?;
        self.index += 1;
        self.creator.set_location(token.location());
        Some(token)
    }

    fn accept(&mut self, text: &str) -> Option<&'t Token> {
        if self.at(text) { self.advance() } else { None }
    }

    fn expect(&mut self, text: &str) -> Result<&'t Token, CompileError> {
        match self.accept(text) {
            Some(token) => Ok(token),
            None => Err(self.unexpected(&format!("'{}'", text))),
        }
    }

    fn expect_identifier(&mut self) -> Result<&'t Token, CompileError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                self.advance();
                Ok(token)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    // === Errors ===

    fn end_position(&self) -> Position {
        self.tokens
            .last()
            .map(|token| token.position)
            .unwrap_or(Position::START)
    }

    /// The upcoming token does not fit; report it, or the end of input.
    fn unexpected(&self, expected: &str) -> CompileError {
        match self.peek() {
            Some(token) => SyntaxError::at(
                SyntaxErrorKind::UnexpectedToken {
                    expected: expected.to_string(),
                    found: token.to_string(),
                },
                token,
            )
            .into(),
            None => {
                let end = self.tokens.last().map_or(0, |token| token.span.0.end);
                SyntaxError::new(
                    SyntaxErrorKind::UnexpectedEnd {
                        expected: expected.to_string(),
                    },
                    self.end_position(),
                    Span::new(end, end),
                )
                .into()
            }
        }
    }

    fn structure(&self, kind: StructureErrorKind) -> CompileError {
        let position = self
            .peek()
            .map_or_else(|| self.end_position(), |token| token.position);
        StructureError { kind, position }.into()
    }

    fn require_expression(&mut self, what: &str) -> Result<(), CompileError> {
        if self.expression()? {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    /// Run one grammar rule, reporting it to the tracer.
    fn rule(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Self) -> RuleResult,
    ) -> RuleResult {
        let token = self.peek();
        self.tracer.enter(name, token);
        let result = body(self);
        match result {
            Ok(true) => self.tracer.commit(name),
            _ => self.tracer.reject(name),
        }
        result
    }

    // === Rules ===

    fn program(&mut self) -> RuleResult {
        self.rule("Program", |p| {
            p.sequence()?;
            if p.peek().is_some() {
                return Err(p.unexpected("';' or end of input"));
            }
            Ok(true)
        })
    }

    /// The value of a sequence is the value of its last expression.
    fn sequence(&mut self) -> RuleResult {
        self.rule("Sequence", |p| {
            if !p.expression()? {
                return Ok(false);
            }
            while p.accept(";").is_some() {
                if p.peek().is_none() || p.at("}") {
                    break;
                }
                p.creator.emit(Instruction::Ignore);
                p.require_expression("an expression after ';'")?;
            }
            Ok(true)
        })
    }

    /// Every expression runs in its own bracket scope and leaves exactly
    /// one value.
    fn expression(&mut self) -> RuleResult {
        self.rule("Expression", |p| {
            p.creator.open_bracket();
            let matched = if p.jump()? {
                true
            } else if p.term()? {
                while p.tie()? {}
                true
            } else {
                false
            };
            p.creator
                .close_bracket()
                .map_err(|kind| p.structure(kind))?;
            Ok(matched)
        })
    }

    fn jump(&mut self) -> RuleResult {
        self.rule("Jump", |p| {
            let Some(keyword) = p.peek() else {
                return Ok(false);
            };

            if keyword.is("break") {
                p.advance();
                let context = p
                    .creator
                    .current_loop()
                    .ok_or_else(|| SyntaxError::at(SyntaxErrorKind::BreakOutsideLoop, keyword))?;
                let before = p.creator.depth();
                p.creator.unwind(context.base);
                if !p.expression()? {
                    p.creator.push(Value::None);
                }
                p.creator.set_location(keyword.location());
                p.creator.goto(context.end);
                p.creator.settle(before);
                Ok(true)
            } else if keyword.is("continue") {
                p.advance();
                let context = p.creator.current_loop().ok_or_else(|| {
                    SyntaxError::at(SyntaxErrorKind::ContinueOutsideLoop, keyword)
                })?;
                let before = p.creator.depth();
                p.creator.unwind(context.base);
                p.creator.push(Value::None);
                p.creator.goto(context.top);
                p.creator.settle(before);
                Ok(true)
            } else if keyword.is("return") {
                p.advance();
                let base = p.creator.lambda_base().ok_or_else(|| {
                    SyntaxError::at(SyntaxErrorKind::ReturnOutsideLambda, keyword)
                })?;
                let before = p.creator.depth();
                p.creator.unwind(base);
                if !p.expression()? {
                    p.creator.push(Value::None);
                }
                p.creator.set_location(keyword.location());
                p.creator.emit(Instruction::Return);
                p.creator.settle(before);
                Ok(true)
            } else {
                Ok(false)
            }
        })
    }

    fn tie(&mut self) -> RuleResult {
        self.rule("Tie", |p| {
            let Some(first) = p.peek() else {
                return Ok(false);
            };
            let negated = first.is("!");
            let offset = usize::from(negated);
            let Some(op_token) = p.peek_at(offset) else {
                return Err(p.unexpected_after_bang());
            };

            let (pending, width) = if let Some(store) = store_op(op_token, None) {
                if negated {
                    return Err(not_negatable(op_token));
                }
                (store, 1)
            } else if let Some(op) = binary_op(op_token) {
                if negated && !op.negatable() {
                    return Err(not_negatable(op_token));
                }
                match p.peek_at(offset + 1).and_then(|t| store_op(t, Some(op))) {
                    Some(store) => {
                        if negated {
                            return Err(SyntaxError::at(SyntaxErrorKind::NegatedCompound, op_token)
                                .into());
                        }
                        if !op.compoundable() {
                            return Err(SyntaxError::at(
                                SyntaxErrorKind::NotCompoundable {
                                    op: op.symbol().to_string(),
                                },
                                op_token,
                            )
                            .into());
                        }
                        (store, 2)
                    }
                    None => (PendingOp::Binary { op, negated }, 1),
                }
            } else if negated {
                return Err(p.unexpected_after_bang());
            } else {
                return Ok(false);
            };

            for _ in 0..offset + width {
                p.advance();
            }
            p.creator.push_op(pending, op_token.location());
            if !p.term()? {
                return Err(p.unexpected("an operand"));
            }
            Ok(true)
        })
    }

    fn unexpected_after_bang(&mut self) -> CompileError {
        self.advance();
        self.unexpected("an operator after '!'")
    }

    fn term(&mut self) -> RuleResult {
        self.rule("Term", |p| {
            let mut prefixed = false;
            while let Some(token) = p.peek() {
                let Some(op) = prefix_op(token) else {
                    break;
                };
                p.advance();
                p.creator.push_op(PendingOp::Prefix(op), token.location());
                prefixed = true;
            }
            if !p.operand()? {
                if prefixed {
                    return Err(p.unexpected("an operand"));
                }
                return Ok(false);
            }
            while p.tail()? {}
            Ok(true)
        })
    }

    fn operand(&mut self) -> RuleResult {
        self.rule("Operand", |p| {
            Ok(p.literal()?
                || p.variable()?
                || p.conditional()?
                || p.while_loop()?
                || p.lambda()?
                || p.group()?
                || p.parenthesized()?)
        })
    }

    fn literal(&mut self) -> RuleResult {
        self.rule("Literal", |p| {
            let Some(token) = p.peek() else {
                return Ok(false);
            };
            let value = match token.kind {
                TokenKind::Integer => {
                    let value = token.text.parse::<i64>().map_err(|_| {
                        SyntaxError::at(
                            SyntaxErrorKind::IntegerOverflow {
                                text: token.text.to_string(),
                            },
                            token,
                        )
                    })?;
                    Value::Integer(value)
                }
                TokenKind::Float => {
                    let value = token.text.parse::<f64>().map_err(|_| {
                        SyntaxError::at(
                            SyntaxErrorKind::InvalidFloat {
                                text: token.text.to_string(),
                            },
                            token,
                        )
                    })?;
                    Value::Float(value)
                }
                TokenKind::String => Value::String(token.text.clone()),
                TokenKind::Identifier | TokenKind::Separator => return Ok(false),
            };
            p.advance();
            p.creator.push(value);
            Ok(true)
        })
    }

    fn variable(&mut self) -> RuleResult {
        self.rule("Variable", |p| {
            if p.accept("loc").is_some() {
                let by_ref = p.accept("ref").is_some();
                let ident = p.expect_identifier()?;
                let name = p.creator.declare(&ident.text);
                p.creator.push(Value::Variable(name));
                if let Some(assign) = p.accept("=") {
                    p.require_expression("an initializer")?;
                    p.creator.set_location(assign.location());
                    p.creator.emit(Instruction::Assign(StoreMode {
                        compound: None,
                        by_ref,
                    }));
                }
                return Ok(true);
            }
            if p.accept("ref").is_some() {
                let ident = p.expect_identifier()?;
                let name = p.creator.global(&ident.text);
                p.creator.push(Value::Variable(name));
                return Ok(true);
            }
            match p.peek() {
                Some(token) if token.kind == TokenKind::Identifier => {
                    p.advance();
                    let name = p.creator.resolve(&token.text);
                    p.creator.push(Value::Variable(name));
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    /// `if (c) a or b` leaves `a` or `b`; without `or`, a false condition
    /// leaves None.
    fn conditional(&mut self) -> RuleResult {
        self.rule("Conditional", |p| {
            let Some(keyword) = p.accept("if") else {
                return Ok(false);
            };
            let otherwise = p.creator.new_label();
            let end = p.creator.new_label();
            let depth = p.creator.depth();

            p.creator.push_label(otherwise);
            p.expect("(")?;
            p.require_expression("a condition")?;
            p.expect(")")?;
            p.creator.set_location(keyword.location());
            p.creator.emit(Instruction::IfGoto);

            p.require_expression("a branch after the condition")?;
            p.creator.goto(end);

            p.creator.place(otherwise);
            p.creator.set_depth(depth);
            if p.accept("or").is_some() {
                p.require_expression("a branch after 'or'")?;
            } else {
                p.creator.push(Value::None);
            }
            p.creator.place(end);
            Ok(true)
        })
    }

    /// `as (c) body` leaves the value of the last body run, or None if the
    /// body never ran.
    fn while_loop(&mut self) -> RuleResult {
        self.rule("Loop", |p| {
            let Some(keyword) = p.accept("as") else {
                return Ok(false);
            };
            let context = p.creator.begin_loop();

            p.creator.push_label(context.end);
            p.expect("(")?;
            p.require_expression("a loop condition")?;
            p.expect(")")?;
            p.creator.set_location(keyword.location());
            p.creator.emit(Instruction::IfGoto);
            p.creator.emit(Instruction::Ignore);

            p.require_expression("a loop body")?;
            p.creator.goto(context.top);
            p.creator
                .end_loop()
                .map_err(|kind| p.structure(kind))?;
            Ok(true)
        })
    }

    /// True if the tokens at the cursor read `( [ref] name, ... ) =>`.
    fn lambda_ahead(&self) -> bool {
        let mut offset = 0;
        if !self.peek_at(offset).is_some_and(|t| t.is("(")) {
            return false;
        }
        offset += 1;
        if self.peek_at(offset).is_some_and(|t| t.is(")")) {
            return self.peek_at(offset + 1).is_some_and(|t| t.is("=>"));
        }
        loop {
            if self.peek_at(offset).is_some_and(|t| t.is("ref")) {
                offset += 1;
            }
            if !self
                .peek_at(offset)
                .is_some_and(|t| t.kind == TokenKind::Identifier)
            {
                return false;
            }
            offset += 1;
            match self.peek_at(offset) {
                Some(t) if t.is(",") => offset += 1,
                Some(t) if t.is(")") => {
                    return self.peek_at(offset + 1).is_some_and(|t| t.is("=>"));
                }
                _ => return false,
            }
        }
    }

    fn lambda(&mut self) -> RuleResult {
        self.rule("Lambda", |p| {
            if !p.lambda_ahead() {
                return Ok(false);
            }
            p.expect("(")?;
            let mut params = Vec::new();
            while p.accept(")").is_none() {
                let by_ref = p.accept("ref").is_some();
                let ident = p.expect_identifier()?;
                params.push(Param {
                    name: ident.text.clone(),
                    by_ref,
                });
                if !p.at(")") {
                    p.expect(",")?;
                }
            }
            p.expect("=>")?;

            p.creator.begin_lambda(&params);
            p.require_expression("a lambda body")?;
            p.creator
                .end_lambda()
                .map_err(|kind| p.structure(kind))?;
            Ok(true)
        })
    }

    fn group(&mut self) -> RuleResult {
        self.rule("Group", |p| {
            if p.accept("{").is_none() {
                return Ok(false);
            }
            if !p.sequence()? {
                p.creator.push(Value::None);
            }
            p.expect("}")?;
            Ok(true)
        })
    }

    fn parenthesized(&mut self) -> RuleResult {
        self.rule("Parenthesized", |p| {
            if p.accept("(").is_none() {
                return Ok(false);
            }
            p.require_expression("an expression")?;
            p.expect(")")?;
            Ok(true)
        })
    }

    /// Tails bind tighter than any operator, so they are emitted at once
    /// instead of going through the expression stack.
    fn tail(&mut self) -> RuleResult {
        self.rule("Tail", |p| {
            let Some(token) = p.peek() else {
                return Ok(false);
            };
            if token.is("[") {
                p.advance();
                p.require_expression("an index")?;
                p.expect("]")?;
                p.creator.set_location(token.location());
                p.creator.emit(index());
                Ok(true)
            } else if token.is_field() {
                p.advance();
                p.creator.push(Value::String(token.text.clone()));
                p.creator.emit(index());
                Ok(true)
            } else if token.is("(") {
                p.call()
            } else {
                Ok(false)
            }
        })
    }

    fn call(&mut self) -> RuleResult {
        self.rule("Call", |p| {
            let open = p.expect("(")?;
            let mut argc = 0;
            if p.accept(")").is_none() {
                loop {
                    p.require_expression("an argument")?;
                    argc += 1;
                    if p.accept(",").is_some() {
                        continue;
                    }
                    p.expect(")")?;
                    break;
                }
            }
            let ret = p.creator.new_label();
            p.creator.set_location(open.location());
            p.creator.emit(Instruction::Eval { argc, ret });
            p.creator.place(ret);
            p.creator.emit(Instruction::Nop);
            Ok(true)
        })
    }
}

fn index() -> Instruction {
    Instruction::Binary {
        op: BinaryOp::Index,
        negated: false,
    }
}

fn not_negatable(token: &Token) -> CompileError {
    SyntaxError::at(
        SyntaxErrorKind::NotNegatable {
            op: token.text.to_string(),
        },
        token,
    )
    .into()
}
