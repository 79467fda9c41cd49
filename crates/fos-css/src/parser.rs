//! CSS Parser using cssparser
//!
//! Parses stylesheets into style rules. At-rules are not supported and are
//! skipped like any other invalid rule.

use cssparser::{
    AtRuleParser, ParseError, Parser, ParserInput, ParserState, QualifiedRuleParser,
};

use crate::selectors::SelectorList;
use crate::style::parse_declarations;
use crate::{CssError, Rule, Stylesheet};

/// CSS Parser
#[derive(Debug, Clone, Copy, Default)]
pub struct CssParser {
    strict: bool,
}

impl CssParser {
    /// Lenient parser: invalid rules are dropped
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that fails on the first invalid rule
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Parse a CSS stylesheet
    pub fn parse(&self, css: &str) -> Result<Stylesheet, CssError> {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rule_parser = RuleParser;

        let mut result = Stylesheet::new();
        for item in cssparser::StyleSheetParser::new(&mut parser, &mut rule_parser) {
            match item {
                Ok(rule) => result.rules.push(rule),
                Err((e, slice)) => {
                    let line = e.location.line + 1;
                    if self.strict {
                        return Err(CssError::Parse {
                            line,
                            message: format!("invalid rule '{}'", slice.trim()),
                        });
                    }
                    tracing::debug!("skipping invalid CSS rule at line {}", line);
                }
            }
        }

        tracing::trace!("parsed stylesheet with {} rules", result.len());
        Ok(result)
    }
}

struct RuleParser;

impl<'i> QualifiedRuleParser<'i> for RuleParser {
    type Prelude = (String, SelectorList);
    type QualifiedRule = Rule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let text = input.slice_from(start).trim().to_string();

        let selectors = SelectorList::parse(&text)
            .map_err(|_| input.new_custom_error::<(), ()>(()))?;
        Ok((text, selectors))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let body = input.slice_from(start);

        let (selector_text, selectors) = prelude;
        Ok(Rule {
            selector_text,
            selectors,
            declarations: parse_declarations(body),
        })
    }
}

impl<'i> AtRuleParser<'i> for RuleParser {
    type Prelude = ();
    type AtRule = Rule;
    type Error = ();
}
