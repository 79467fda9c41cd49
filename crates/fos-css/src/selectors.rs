//! CSS Selectors
//!
//! Selector parsing on top of `cssparser` tokens and right-to-left matching
//! against the fOS DOM tree. Matching never leaves the tree scope of the
//! element (no crossing from a shadow root into its host).

use cssparser::{ParseError, Parser, ParserInput, Token};
use fos_dom::{DomTree, NodeData, NodeId};

use crate::{CssError, Specificity};

type PResult<'i, T> = Result<T, ParseError<'i, ()>>;

/// A comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

/// Compound selectors joined by combinators, stored left to right
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

/// Sequence of simple selectors with no combinator in between
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector(pub Vec<SelectorComponent>);

/// Combinator between compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// A component of a selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :first-child, :nth-child(), etc.
    PseudoClass(PseudoClass),
}

/// Supported pseudo-classes
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    Checked,
    Disabled,
    Enabled,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    Not(SelectorList),
    Is(SelectorList),
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, PartialEq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    /// Create An+B expression
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }

        let (a, diff) = (i64::from(self.a), i64::from(n) - i64::from(self.b));
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            return self.matcher.is_none() && value.is_some();
        };
        let fold = |s: &str| if self.case_insensitive { s.to_lowercase() } else { s.to_string() };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{}-", expected))
            }
            // empty operands never match for the substring forms
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

impl SelectorList {
    /// Parse a selector list such as `ul > li.active, #main a[href^="http"]`
    pub fn parse(selector: &str) -> Result<Self, CssError> {
        let mut input = ParserInput::new(selector);
        let mut parser = Parser::new(&mut input);
        parser
            .parse_entirely(|p| parse_selector_list(p))
            .map_err(|e| CssError::Selector {
                selector: selector.to_string(),
                message: format!("{:?}", e.kind),
            })
    }

    /// Whether `node` is an element matched by any selector of the list
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.element(node).is_some() && self.0.iter().any(|c| c.matches(tree, node))
    }

    /// Highest specificity among the selectors that match `node`
    pub fn matching_specificity(&self, tree: &DomTree, node: NodeId) -> Option<Specificity> {
        if tree.element(node).is_none() {
            return None;
        }
        self.0.iter()
            .filter(|c| c.matches(tree, node))
            .map(ComplexSelector::specificity)
            .max()
    }

    fn max_specificity(&self) -> Specificity {
        self.0.iter().map(ComplexSelector::specificity).max().unwrap_or_default()
    }
}

fn invalid<'i>(input: &Parser<'i, '_>) -> ParseError<'i, ()> {
    input.new_custom_error::<(), ()>(())
}

fn parse_selector_list<'i, 't>(input: &mut Parser<'i, 't>) -> PResult<'i, SelectorList> {
    let list = input.parse_comma_separated(|p| parse_complex(p))?;
    Ok(SelectorList(list))
}

fn parse_complex<'i, 't>(input: &mut Parser<'i, 't>) -> PResult<'i, ComplexSelector> {
    input.skip_whitespace();
    let mut compounds = vec![parse_compound(input)?];
    let mut combinators = Vec::new();

    loop {
        let mut saw_whitespace = false;
        let combinator = loop {
            let state = input.state();
            let token = match input.next_including_whitespace() {
                Ok(t) => t.clone(),
                Err(_) => break None,
            };
            match token {
                Token::WhiteSpace(_) => saw_whitespace = true,
                Token::Delim('>') => break Some(Combinator::Child),
                Token::Delim('+') => break Some(Combinator::NextSibling),
                Token::Delim('~') => break Some(Combinator::SubsequentSibling),
                _ => {
                    input.reset(&state);
                    break saw_whitespace.then_some(Combinator::Descendant);
                }
            }
        };

        match combinator {
            Some(c) => {
                input.skip_whitespace();
                compounds.push(parse_compound(input)?);
                combinators.push(c);
            }
            None if input.is_exhausted() => break,
            None => return Err(invalid(input)),
        }
    }

    Ok(ComplexSelector { compounds, combinators })
}

fn parse_compound<'i, 't>(input: &mut Parser<'i, 't>) -> PResult<'i, CompoundSelector> {
    let mut components = Vec::new();

    loop {
        let state = input.state();
        let token = match input.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };
        let component = match token {
            Token::Ident(name) if components.is_empty() => {
                SelectorComponent::Type(name.to_ascii_lowercase())
            }
            Token::Delim('*') if components.is_empty() => SelectorComponent::Universal,
            Token::IDHash(id) | Token::Hash(id) => SelectorComponent::Id(id.to_string()),
            Token::Delim('.') => {
                let name = input.expect_ident()?.to_string();
                SelectorComponent::Class(name)
            }
            Token::SquareBracketBlock => {
                let attr = input.parse_nested_block(|p| parse_attribute(p))?;
                SelectorComponent::Attribute(attr)
            }
            Token::Colon => SelectorComponent::PseudoClass(parse_pseudo_class(input)?),
            _ => {
                input.reset(&state);
                break;
            }
        };
        components.push(component);
    }

    if components.is_empty() {
        return Err(invalid(input));
    }
    Ok(CompoundSelector(components))
}

fn parse_attribute<'i, 't>(input: &mut Parser<'i, 't>) -> PResult<'i, AttributeSelector> {
    let name = input.expect_ident()?.to_ascii_lowercase();
    let op = match input.next() {
        Ok(t) => t.clone(),
        Err(_) => {
            return Ok(AttributeSelector { name, matcher: None, case_insensitive: false });
        }
    };
    let value = input.expect_ident_or_string()?.to_string();
    let matcher = match op {
        Token::Delim('=') => AttributeMatcher::Exact(value),
        Token::IncludeMatch => AttributeMatcher::Contains(value),
        Token::DashMatch => AttributeMatcher::DashMatch(value),
        Token::PrefixMatch => AttributeMatcher::Prefix(value),
        Token::SuffixMatch => AttributeMatcher::Suffix(value),
        Token::SubstringMatch => AttributeMatcher::Substring(value),
        _ => return Err(invalid(input)),
    };
    let case_insensitive = match input.next() {
        Ok(Token::Ident(flag)) if flag.eq_ignore_ascii_case("i") => true,
        Ok(Token::Ident(flag)) if flag.eq_ignore_ascii_case("s") => false,
        Ok(_) => return Err(invalid(input)),
        Err(_) => false,
    };

    Ok(AttributeSelector { name, matcher: Some(matcher), case_insensitive })
}

fn parse_pseudo_class<'i, 't>(input: &mut Parser<'i, 't>) -> PResult<'i, PseudoClass> {
    let token = input.next_including_whitespace()?.clone();
    match token {
        Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "root" => Ok(PseudoClass::Root),
            "empty" => Ok(PseudoClass::Empty),
            "first-child" => Ok(PseudoClass::FirstChild),
            "last-child" => Ok(PseudoClass::LastChild),
            "only-child" => Ok(PseudoClass::OnlyChild),
            "checked" => Ok(PseudoClass::Checked),
            "disabled" => Ok(PseudoClass::Disabled),
            "enabled" => Ok(PseudoClass::Enabled),
            _ => Err(invalid(input)),
        },
        Token::Function(name) => match name.to_ascii_lowercase().as_str() {
            "not" => Ok(PseudoClass::Not(input.parse_nested_block(|p| parse_selector_list(p))?)),
            "is" | "where" | "matches" => {
                Ok(PseudoClass::Is(input.parse_nested_block(|p| parse_selector_list(p))?))
            }
            "nth-child" => Ok(PseudoClass::NthChild(input.parse_nested_block(|p| parse_nth(p))?)),
            "nth-last-child" => {
                Ok(PseudoClass::NthLastChild(input.parse_nested_block(|p| parse_nth(p))?))
            }
            _ => Err(invalid(input)),
        },
        _ => Err(invalid(input)),
    }
}

fn parse_nth<'i, 't>(input: &mut Parser<'i, 't>) -> PResult<'i, NthExpression> {
    let (a, b) = cssparser::parse_nth(input)?;
    Ok(NthExpression::new(a, b))
}

// ============================================================================
// Matching
// ============================================================================

impl ComplexSelector {
    /// Specificity (ids, classes/attributes/pseudo-classes, types)
    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for compound in &self.compounds {
            for component in &compound.0 {
                match component {
                    SelectorComponent::Id(_) => spec.0 += 1,
                    SelectorComponent::Class(_) | SelectorComponent::Attribute(_) => spec.1 += 1,
                    SelectorComponent::PseudoClass(PseudoClass::Not(list))
                    | SelectorComponent::PseudoClass(PseudoClass::Is(list)) => {
                        let inner = list.max_specificity();
                        spec.0 += inner.0;
                        spec.1 += inner.1;
                        spec.2 += inner.2;
                    }
                    SelectorComponent::PseudoClass(_) => spec.1 += 1,
                    SelectorComponent::Type(_) => spec.2 += 1,
                    SelectorComponent::Universal => {}
                }
            }
        }
        spec
    }

    /// Match against an element
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.matches_from(tree, node, self.compounds.len() - 1)
    }

    fn matches_from(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Descendant => {
                let mut cur = parent_element(tree, node);
                while let Some(p) = cur {
                    if self.matches_from(tree, p, index - 1) {
                        return true;
                    }
                    cur = parent_element(tree, p);
                }
                false
            }
            Combinator::Child => parent_element(tree, node)
                .is_some_and(|p| self.matches_from(tree, p, index - 1)),
            Combinator::NextSibling => tree.previous_element_sibling(node)
                .is_some_and(|s| self.matches_from(tree, s, index - 1)),
            Combinator::SubsequentSibling => {
                let mut cur = tree.previous_element_sibling(node);
                while let Some(s) = cur {
                    if self.matches_from(tree, s, index - 1) {
                        return true;
                    }
                    cur = tree.previous_element_sibling(s);
                }
                false
            }
        }
    }
}

impl CompoundSelector {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.0.iter().all(|c| match_component(c, tree, node))
    }
}

fn parent_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.parent(node).filter(|&p| tree.element(p).is_some())
}

/// Match a selector component against an element
pub fn match_component(component: &SelectorComponent, tree: &DomTree, node: NodeId) -> bool {
    let Some(elem) = tree.element(node) else { return false };
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => elem.tag_name.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => elem.id() == Some(id.as_str()),
        SelectorComponent::Class(class) => elem.has_class(class),
        SelectorComponent::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(pseudo, tree, node),
    }
}

const FORM_CONTROLS: [&str; 7] = ["button", "input", "select", "textarea", "option", "optgroup", "fieldset"];

/// Match a pseudo-class against an element
pub fn match_pseudo_class(pseudo: &PseudoClass, tree: &DomTree, node: NodeId) -> bool {
    let Some(elem) = tree.element(node) else { return false };
    match pseudo {
        PseudoClass::Root => tree.parent(node)
            .and_then(|p| tree.get(p))
            .is_some_and(|p| matches!(p.data, NodeData::Document)),
        PseudoClass::Empty => tree.children(node).all(|c| match tree.get(c).map(|n| &n.data) {
            Some(NodeData::Comment(_)) => true,
            Some(NodeData::Text(t)) => t.is_empty(),
            _ => false,
        }),
        PseudoClass::FirstChild => tree.previous_element_sibling(node).is_none(),
        PseudoClass::LastChild => tree.next_element_sibling(node).is_none(),
        PseudoClass::OnlyChild => {
            tree.previous_element_sibling(node).is_none() && tree.next_element_sibling(node).is_none()
        }
        PseudoClass::Checked => {
            (elem.is("input") && elem.has_attr("checked")) || (elem.is("option") && elem.has_attr("selected"))
        }
        PseudoClass::Disabled => FORM_CONTROLS.contains(&elem.tag_name.as_str()) && elem.has_attr("disabled"),
        PseudoClass::Enabled => FORM_CONTROLS.contains(&elem.tag_name.as_str()) && !elem.has_attr("disabled"),
        PseudoClass::NthChild(nth) => nth.matches(element_index(tree, node, false)),
        PseudoClass::NthLastChild(nth) => nth.matches(element_index(tree, node, true)),
        PseudoClass::Not(list) => !list.0.iter().any(|c| c.matches(tree, node)),
        PseudoClass::Is(list) => list.0.iter().any(|c| c.matches(tree, node)),
    }
}

/// 1-based position among element siblings
fn element_index(tree: &DomTree, node: NodeId, from_end: bool) -> i32 {
    let mut index = 1;
    let mut cur = node;
    loop {
        let next = if from_end {
            tree.next_element_sibling(cur)
        } else {
            tree.previous_element_sibling(cur)
        };
        match next {
            Some(s) => {
                index += 1;
                cur = s;
            }
            None => return index,
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// querySelectorAll: matching descendants of `root` in document order
pub fn query_all(tree: &DomTree, root: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
    tree.descendants(root)
        .into_iter()
        .filter(|&n| selectors.matches(tree, n))
        .collect()
}

/// querySelector: first match in document order
pub fn query_first(tree: &DomTree, root: NodeId, selectors: &SelectorList) -> Option<NodeId> {
    tree.descendants(root)
        .into_iter()
        .find(|&n| selectors.matches(tree, n))
}

/// element.closest(): nearest inclusive ancestor element that matches
pub fn closest(tree: &DomTree, node: NodeId, selectors: &SelectorList) -> Option<NodeId> {
    let mut cur = Some(node).filter(|&n| tree.element(n).is_some());
    while let Some(n) = cur {
        if selectors.matches(tree, n) {
            return Some(n);
        }
        cur = parent_element(tree, n);
    }
    None
}
