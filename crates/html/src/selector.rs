//! CSS selector subset used for element discovery and target lookup.
//!
//! Supported: type, `*`, `#id`, `.class`, attribute selectors (`[a]`, `=`, `~=`, `|=`, `^=`,
//! `$=`, `*=`, with quoted or bare values), descendant and child (`>`) combinators, and
//! comma-separated groups. Pseudo-classes and sibling combinators are rejected.
use crate::dom::Document;
use crate::types::Id;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    Unsupported { selector: String, reason: String },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::Empty => write!(f, "empty selector"),
            SelectorError::Unsupported { selector, reason } => {
                write!(f, "unsupported selector `{selector}`: {reason}")
            }
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    DashMatch(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

/// One complex selector, stored right-to-left: `parts[0]` is the subject and each following
/// entry is reached from the previous one through its combinator.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Compound, Combinator)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    groups: Vec<Complex>,
}

impl SelectorList {
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &Document, id: Id) -> bool {
        self.groups.iter().any(|g| g.matches(doc, id))
    }
}

impl Complex {
    fn matches(&self, doc: &Document, id: Id) -> bool {
        let Some(((subject, _), rest)) = self.parts.split_first() else {
            return false;
        };
        if !subject.matches(doc, id) {
            return false;
        }
        // Combinator of the subject says how to reach parts[1].
        let mut combinator = self.parts[0].1;
        let mut current = id;
        for (compound, next_combinator) in rest {
            let found = match combinator {
                Combinator::Child => doc.parent(current).filter(|&p| compound.matches(doc, p)),
                Combinator::Descendant => {
                    let mut cursor = doc.parent(current);
                    let mut found = None;
                    while let Some(p) = cursor {
                        if compound.matches(doc, p) {
                            found = Some(p);
                            break;
                        }
                        cursor = doc.parent(p);
                    }
                    found
                }
            };
            let Some(found) = found else {
                return false;
            };
            current = found;
            combinator = *next_combinator;
        }
        true
    }
}

impl Compound {
    fn matches(&self, doc: &Document, id: Id) -> bool {
        let Some(el) = doc.element(id) else {
            return false;
        };
        if let Some(tag) = &self.tag
            && !el.name.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(want) = &self.id
            && el.attr("id") != Some(want.as_str())
        {
            return false;
        }
        let class_list = el.attr("class").unwrap_or("");
        if !self
            .classes
            .iter()
            .all(|c| class_list.split_whitespace().any(|have| have == c))
        {
            return false;
        }
        self.attrs.iter().all(|cond| {
            let Some(value) = el.attr(&cond.name) else {
                return false;
            };
            match &cond.op {
                AttrOp::Exists => true,
                AttrOp::Equals(want) => value == want,
                AttrOp::Includes(want) => value.split_whitespace().any(|t| t == want),
                AttrOp::DashMatch(want) => {
                    value == want || value.strip_prefix(want.as_str()).is_some_and(|r| r.starts_with('-'))
                }
                AttrOp::Prefix(want) => !want.is_empty() && value.starts_with(want.as_str()),
                AttrOp::Suffix(want) => !want.is_empty() && value.ends_with(want.as_str()),
                AttrOp::Substring(want) => !want.is_empty() && value.contains(want.as_str()),
            }
        })
    }
}

pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    if input.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut parser = Parser {
        source: input,
        chars: input.char_indices().peekable(),
    };
    let mut groups = Vec::new();
    loop {
        groups.push(parser.complex()?);
        parser.skip_ws();
        match parser.chars.next() {
            None => break,
            Some((_, ',')) => continue,
            Some((_, c)) => return Err(parser.unsupported(format!("unexpected `{c}`"))),
        }
    }
    Ok(SelectorList {
        source: input.trim().to_string(),
        groups,
    })
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

impl Parser<'_> {
    fn unsupported(&self, reason: String) -> SelectorError {
        SelectorError::Unsupported {
            selector: self.source.to_string(),
            reason,
        }
    }

    fn skip_ws(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {
            skipped = true;
        }
        skipped
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some((_, c)) = self.chars.next_if(|&(_, c)| is_ident_char(c)) {
            out.push(c);
        }
        out
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_ws();
        // Parsed left-to-right, reversed at the end.
        let mut left_to_right: Vec<(Compound, Combinator)> = Vec::new();
        let mut pending = Combinator::Descendant;
        loop {
            let compound = self.compound()?;
            left_to_right.push((compound, pending));
            let had_ws = self.skip_ws();
            match self.chars.peek().map(|&(_, c)| c) {
                None | Some(',') => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_ws();
                    pending = Combinator::Child;
                }
                Some('+') | Some('~') => {
                    return Err(self.unsupported("sibling combinators".to_string()));
                }
                Some(_) if had_ws => pending = Combinator::Descendant,
                Some(c) => return Err(self.unsupported(format!("unexpected `{c}`"))),
            }
        }

        // Each entry carries the combinator linking it to its left neighbour, which is
        // exactly what the right-to-left walk needs.
        let parts = left_to_right.into_iter().rev().collect();
        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut any = false;

        match self.chars.peek().map(|&(_, c)| c) {
            Some('*') => {
                self.chars.next();
                any = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident().to_ascii_lowercase());
                any = true;
            }
            _ => {}
        }

        loop {
            match self.chars.peek().map(|&(_, c)| c) {
                Some('#') => {
                    self.chars.next();
                    let id = self.ident();
                    if id.is_empty() {
                        return Err(self.unsupported("empty id".to_string()));
                    }
                    compound.id = Some(id);
                }
                Some('.') => {
                    self.chars.next();
                    let class = self.ident();
                    if class.is_empty() {
                        return Err(self.unsupported("empty class".to_string()));
                    }
                    compound.classes.push(class);
                }
                Some('[') => {
                    self.chars.next();
                    compound.attrs.push(self.attribute()?);
                }
                Some(':') => return Err(self.unsupported("pseudo-classes".to_string())),
                _ => break,
            }
            any = true;
        }

        if !any {
            return Err(self.unsupported("expected a compound selector".to_string()));
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttrCondition, SelectorError> {
        self.skip_ws();
        let name = self.ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(self.unsupported("empty attribute name".to_string()));
        }
        self.skip_ws();

        let op_char = match self.chars.next() {
            Some((_, ']')) => {
                return Ok(AttrCondition {
                    name,
                    op: AttrOp::Exists,
                });
            }
            Some((_, '=')) => '=',
            Some((_, c @ ('~' | '|' | '^' | '$' | '*'))) => {
                if self.chars.next().map(|(_, c)| c) != Some('=') {
                    return Err(self.unsupported(format!("expected `=` after `{c}`")));
                }
                c
            }
            _ => return Err(self.unsupported("malformed attribute selector".to_string())),
        };

        self.skip_ws();
        let value = match self.chars.peek().map(|&(_, c)| c) {
            Some(q @ ('"' | '\'')) => {
                self.chars.next();
                let mut value = String::new();
                loop {
                    match self.chars.next() {
                        Some((_, c)) if c == q => break,
                        Some((_, c)) => value.push(c),
                        None => return Err(self.unsupported("unterminated string".to_string())),
                    }
                }
                value
            }
            _ => self.ident(),
        };
        self.skip_ws();
        if self.chars.next().map(|(_, c)| c) != Some(']') {
            return Err(self.unsupported("expected `]`".to_string()));
        }

        let op = match op_char {
            '=' => AttrOp::Equals(value),
            '~' => AttrOp::Includes(value),
            '|' => AttrOp::DashMatch(value),
            '^' => AttrOp::Prefix(value),
            '$' => AttrOp::Suffix(value),
            _ => AttrOp::Substring(value),
        };
        Ok(AttrCondition { name, op })
    }
}
