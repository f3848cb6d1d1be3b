//! Evaluator for the path-query subset locator hints are written in.
//!
//! Supported: `/` and `//` steps, name tests, `*`, `.`, `..`, and predicates
//! built from `@attr`, `text()`, `.`, string literals, `=`, `!=`, `and`,
//! `or`, `not()`, `contains()`, `starts-with()`, `normalize-space()`,
//! positional `[n]` and `[last()]`. Anything else is reported as
//! `UnsupportedPathQuery` so the caller can fall back to "no match".
use scraper::{ElementRef, Html};
use std::collections::HashSet;

use intentrank_core::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Comma,
    Eq,
    NotEq,
    Dot,
    DotDot,
    Star,
    Name(String),
    Literal(String),
    Number(String),
}

fn tokenize(query: &str) -> Result<Vec<(usize, Token)>> {
    let chars: Vec<char> = query.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                i += 2;
                Token::DoubleSlash
            }
            '/' => {
                i += 1;
                Token::Slash
            }
            '[' => {
                i += 1;
                Token::LBracket
            }
            ']' => {
                i += 1;
                Token::RBracket
            }
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '@' => {
                i += 1;
                Token::At
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            '=' => {
                i += 1;
                Token::Eq
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                i += 2;
                Token::NotEq
            }
            '*' => {
                i += 1;
                Token::Star
            }
            '.' if chars.get(i + 1) == Some(&'.') => {
                i += 2;
                Token::DotDot
            }
            '.' if !chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()) => {
                i += 1;
                Token::Dot
            }
            '\'' | '"' => {
                let quote = c;
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == quote)
                    .ok_or_else(|| invalid(query, start, "unterminated string literal"))?;
                let literal: String = chars[i + 1..i + 1 + end].iter().collect();
                i += end + 2;
                Token::Literal(literal)
            }
            c if c.is_ascii_digit() || c == '.' => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                Token::Number(chars[start..i].iter().collect())
            }
            c if c.is_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '-')) {
                    i += 1;
                }
                if chars.get(i) == Some(&':') {
                    return Err(Error::UnsupportedPathQuery(format!(
                        "axes and namespaces are not supported: '{}'",
                        query
                    )));
                }
                Token::Name(chars[start..i].iter().collect())
            }
            '|' | '<' | '>' | '+' | '$' => {
                return Err(Error::UnsupportedPathQuery(format!("operator '{}' in '{}'", c, query)));
            }
            _ => return Err(invalid(query, start, &format!("unexpected character '{}'", c))),
        };
        tokens.push((start, token));
    }
    Ok(tokens)
}

fn invalid(query: &str, offset: usize, reason: &str) -> Error {
    Error::InvalidPathQuery { query: query.to_string(), offset, reason: reason.to_string() }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
enum NodeTest {
    Any,
    Name(String),
    SelfNode,
    Parent,
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Attr(String),
    Text,
    Context,
    Literal(String),
    NormalizeSpace(Option<Box<Operand>>),
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Or(Box<Predicate>, Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Compare { left: Operand, right: Operand, negated: bool },
    Exists(Operand),
    Contains(Operand, Operand),
    StartsWith(Operand, Operand),
    Position(usize),
    Last,
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

/// A parsed path query, ready to evaluate against any document.
#[derive(Debug, Clone, PartialEq)]
pub struct PathQuery {
    steps: Vec<Step>,
}

struct Parser<'q> {
    query: &'q str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl<'q> Parser<'q> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(o, _)| *o).unwrap_or(self.query.len())
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let offset = self.offset();
        match self.next() {
            Some(t) if t == expected => Ok(()),
            other => Err(invalid(self.query, offset, &format!("expected {:?}, found {:?}", expected, other))),
        }
    }

    fn is_call(&self, name: &str) -> bool {
        matches!(self.tokens.get(self.pos), Some((_, Token::Name(n))) if n == name)
            && matches!(self.tokens.get(self.pos + 1), Some((_, Token::LParen)))
    }

    fn path(&mut self) -> Result<PathQuery> {
        let mut steps = Vec::new();
        while let Some(token) = self.peek() {
            let axis = match token {
                Token::Slash => Axis::Child,
                Token::DoubleSlash => Axis::Descendant,
                _ => return Err(invalid(self.query, self.offset(), "expected '/' or '//'")),
            };
            self.pos += 1;
            steps.push(self.step(axis)?);
        }
        if steps.is_empty() {
            return Err(invalid(self.query, 0, "empty path"));
        }
        Ok(PathQuery { steps })
    }

    fn step(&mut self, axis: Axis) -> Result<Step> {
        let offset = self.offset();
        let test = match self.next() {
            Some(Token::Star) => NodeTest::Any,
            Some(Token::Dot) => NodeTest::SelfNode,
            Some(Token::DotDot) => NodeTest::Parent,
            Some(Token::Name(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    return Err(Error::UnsupportedPathQuery(format!("node-type step '{}()'", name)));
                }
                NodeTest::Name(name)
            }
            Some(Token::At) => {
                return Err(Error::UnsupportedPathQuery("attribute steps select no elements".to_string()));
            }
            other => return Err(invalid(self.query, offset, &format!("expected a node test, found {:?}", other))),
        };
        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            predicates.push(self.or_expr()?);
            self.expect(Token::RBracket)?;
        }
        Ok(Step { axis, test, predicates })
    }

    fn or_expr(&mut self) -> Result<Predicate> {
        let mut left = self.and_expr()?;
        while matches!(self.peek(), Some(Token::Name(n)) if n == "or") {
            self.pos += 1;
            let right = self.and_expr()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Predicate> {
        let mut left = self.unary()?;
        while matches!(self.peek(), Some(Token::Name(n)) if n == "and") {
            self.pos += 1;
            let right = self.unary()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Predicate> {
        if self.is_call("not") {
            self.pos += 2;
            let inner = self.or_expr()?;
            self.expect(Token::RParen)?;
            return Ok(Predicate::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Predicate> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.or_expr()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }
        if self.is_call("last") {
            self.pos += 2;
            self.expect(Token::RParen)?;
            return Ok(Predicate::Last);
        }
        for (name, build) in [
            ("contains", Predicate::Contains as fn(Operand, Operand) -> Predicate),
            ("starts-with", Predicate::StartsWith as fn(Operand, Operand) -> Predicate),
        ] {
            if self.is_call(name) {
                self.pos += 2;
                let haystack = self.operand()?;
                self.expect(Token::Comma)?;
                let needle = self.operand()?;
                self.expect(Token::RParen)?;
                return Ok(build(haystack, needle));
            }
        }
        if let Some(Token::Number(n)) = self.peek().cloned() {
            let followed_by_comparison = matches!(
                self.tokens.get(self.pos + 1),
                Some((_, Token::Eq)) | Some((_, Token::NotEq))
            );
            if !followed_by_comparison {
                let offset = self.offset();
                self.pos += 1;
                return match n.parse::<usize>() {
                    Ok(index) if index > 0 => Ok(Predicate::Position(index)),
                    _ => Err(invalid(self.query, offset, "position must be a positive integer")),
                };
            }
        }
        let left = self.operand()?;
        let negated = match self.peek() {
            Some(Token::Eq) => false,
            Some(Token::NotEq) => true,
            _ => return Ok(Predicate::Exists(left)),
        };
        self.pos += 1;
        let right = self.operand()?;
        Ok(Predicate::Compare { left, right, negated })
    }

    fn operand(&mut self) -> Result<Operand> {
        if self.is_call("text") {
            self.pos += 2;
            self.expect(Token::RParen)?;
            return Ok(Operand::Text);
        }
        if self.is_call("normalize-space") {
            self.pos += 2;
            if self.peek() == Some(&Token::RParen) {
                self.pos += 1;
                return Ok(Operand::NormalizeSpace(None));
            }
            let inner = self.operand()?;
            self.expect(Token::RParen)?;
            return Ok(Operand::NormalizeSpace(Some(Box::new(inner))));
        }
        let offset = self.offset();
        match self.next() {
            Some(Token::At) => match self.next() {
                Some(Token::Name(name)) => Ok(Operand::Attr(name)),
                Some(Token::Star) => Err(Error::UnsupportedPathQuery("attribute wildcard '@*'".to_string())),
                other => Err(invalid(self.query, offset, &format!("expected attribute name, found {:?}", other))),
            },
            Some(Token::Dot) => Ok(Operand::Context),
            Some(Token::Literal(s)) | Some(Token::Number(s)) => Ok(Operand::Literal(s)),
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                Err(Error::UnsupportedPathQuery(format!("function '{}()'", name)))
            }
            Some(Token::Name(name)) => Err(Error::UnsupportedPathQuery(format!("relative element path '{}'", name))),
            other => Err(invalid(self.query, offset, &format!("expected an operand, found {:?}", other))),
        }
    }
}

impl PathQuery {
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.trim();
        let tokens = tokenize(query)?;
        let mut parser = Parser { query, tokens, pos: 0 };
        parser.path()
    }

    /// Every element the query selects, deduplicated, in discovery order.
    pub fn select<'a>(&self, html: &'a Html) -> Vec<ElementRef<'a>> {
        let mut context = vec![Node::Document];
        for step in &self.steps {
            context = apply_step(html, &context, step);
        }
        context
            .into_iter()
            .filter_map(|n| match n {
                Node::Element(el) => Some(el),
                Node::Document => None,
            })
            .collect()
    }
}

#[derive(Clone, Copy)]
enum Node<'a> {
    Document,
    Element(ElementRef<'a>),
}

fn child_elements<'a>(html: &'a Html, node: Node<'a>) -> Vec<ElementRef<'a>> {
    match node {
        Node::Document => vec![html.root_element()],
        Node::Element(el) => el.children().filter_map(ElementRef::wrap).collect(),
    }
}

fn descendant_or_self<'a>(html: &'a Html, node: Node<'a>) -> Vec<Node<'a>> {
    match node {
        Node::Document => std::iter::once(Node::Document)
            .chain(html.root_element().descendants().filter_map(ElementRef::wrap).map(Node::Element))
            .collect(),
        Node::Element(el) => el.descendants().filter_map(ElementRef::wrap).map(Node::Element).collect(),
    }
}

fn parent<'a>(node: Node<'a>) -> Option<Node<'a>> {
    match node {
        Node::Document => None,
        Node::Element(el) => Some(el.parent().and_then(ElementRef::wrap).map_or(Node::Document, Node::Element)),
    }
}

fn apply_step<'a>(html: &'a Html, context: &[Node<'a>], step: &Step) -> Vec<Node<'a>> {
    let origins: Vec<Node<'a>> = match step.axis {
        Axis::Child => context.to_vec(),
        Axis::Descendant => context.iter().flat_map(|n| descendant_or_self(html, *n)).collect(),
    };

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut document_seen = false;
    for origin in origins {
        let candidates: Vec<Node<'a>> = match &step.test {
            NodeTest::SelfNode => vec![origin],
            NodeTest::Parent => parent(origin).into_iter().collect(),
            NodeTest::Any => child_elements(html, origin).into_iter().map(Node::Element).collect(),
            NodeTest::Name(name) => child_elements(html, origin)
                .into_iter()
                .filter(|el| el.value().name() == name.as_str())
                .map(Node::Element)
                .collect(),
        };
        let selected = step
            .predicates
            .iter()
            .fold(candidates, |nodes, predicate| filter_by(predicate, nodes));
        for node in selected {
            let fresh = match node {
                Node::Document => !std::mem::replace(&mut document_seen, true),
                Node::Element(el) => seen.insert(el.id()),
            };
            if fresh {
                out.push(node);
            }
        }
    }
    out
}

fn filter_by<'a>(predicate: &Predicate, nodes: Vec<Node<'a>>) -> Vec<Node<'a>> {
    let size = nodes.len();
    nodes
        .into_iter()
        .enumerate()
        .filter(|(i, node)| matches(predicate, *node, i + 1, size))
        .map(|(_, node)| node)
        .collect()
}

fn matches(predicate: &Predicate, node: Node<'_>, position: usize, size: usize) -> bool {
    match predicate {
        Predicate::Or(a, b) => matches(a, node, position, size) || matches(b, node, position, size),
        Predicate::And(a, b) => matches(a, node, position, size) && matches(b, node, position, size),
        Predicate::Not(inner) => !matches(inner, node, position, size),
        Predicate::Position(n) => position == *n,
        Predicate::Last => position == size,
        Predicate::Exists(op) => {
            let values = values(op, node);
            match op {
                Operand::Literal(_) | Operand::NormalizeSpace(_) => values.iter().any(|v| !v.is_empty()),
                _ => !values.is_empty(),
            }
        }
        Predicate::Compare { left, right, negated } => {
            let (l, r) = (values(left, node), values(right, node));
            l.iter().any(|a| r.iter().any(|b| (a == b) != *negated))
        }
        Predicate::Contains(h, n) => first(h, node).contains(first(n, node).as_str()),
        Predicate::StartsWith(h, n) => first(h, node).starts_with(first(n, node).as_str()),
    }
}

fn first(op: &Operand, node: Node<'_>) -> String {
    values(op, node).into_iter().next().unwrap_or_default()
}

fn string_value(node: Node<'_>) -> String {
    match node {
        Node::Document => String::new(),
        Node::Element(el) => el.text().collect(),
    }
}

fn values(op: &Operand, node: Node<'_>) -> Vec<String> {
    match op {
        Operand::Literal(s) => vec![s.clone()],
        Operand::Context => vec![string_value(node)],
        Operand::Attr(name) => match node {
            Node::Element(el) => el.value().attr(name).map(str::to_string).into_iter().collect(),
            Node::Document => Vec::new(),
        },
        Operand::Text => match node {
            Node::Element(el) => el
                .children()
                .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
                .collect(),
            Node::Document => Vec::new(),
        },
        Operand::NormalizeSpace(inner) => {
            let raw = match inner {
                Some(op) => first(op, node),
                None => string_value(node),
            };
            vec![raw.split_whitespace().collect::<Vec<_>>().join(" ")]
        }
    }
}
