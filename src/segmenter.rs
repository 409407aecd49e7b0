//! Utterance segmentation
//!
//! Walks a typed [`Utterance`] left to right and produces the ordered token
//! list the executor replays. Segmentation is pure: nothing is injected and no
//! state outlives the call.

use crate::action::Action;
use crate::composer::CommandComposer;
use crate::count::CountResolvers;
use crate::error::{GrammarError, Result};
use crate::format::IdentifierFormatter;
use crate::token::{SegmentedUtterance, Token};
use crate::tree::{Element, IdentifierPhrase, InsertionPhrase, PrimitiveInsertion, Utterance};
use crate::vocabulary::{CountSlot, Vocabulary};

/// Default bound on top-level elements per utterance
pub const DEFAULT_MAX_ELEMENTS: usize = 10;

pub struct Segmenter<'a> {
    vocabulary: &'a Vocabulary,
    formatter: &'a IdentifierFormatter,
    counts: &'a CountResolvers,
    count_digits: usize,
    max_elements: usize,
}

impl<'a> Segmenter<'a> {
    pub fn new(
        vocabulary: &'a Vocabulary,
        formatter: &'a IdentifierFormatter,
        counts: &'a CountResolvers,
    ) -> Self {
        Self {
            vocabulary,
            formatter,
            counts,
            count_digits: 3,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }

    pub fn max_elements(mut self, max: usize) -> Self {
        self.max_elements = max;
        self
    }

    pub fn count_digits(mut self, digits: usize) -> Self {
        self.count_digits = digits;
        self
    }

    pub fn segment(&self, utterance: &Utterance) -> Result<SegmentedUtterance> {
        if utterance.elements.len() > self.max_elements {
            return Err(GrammarError::UtteranceTooLong {
                count: utterance.elements.len(),
                max: self.max_elements,
            });
        }

        let composer = CommandComposer::new(self.vocabulary, self.counts, self.count_digits);
        let mut tokens = Vec::with_capacity(utterance.elements.len());
        for element in &utterance.elements {
            match element {
                Element::Command(phrase) => tokens.extend(composer.compose(phrase)?),
                Element::Insertion(phrase) => tokens.push(self.insertion(phrase)?),
            }
        }

        let literal = match &utterance.literal {
            Some(literal) => {
                let mode_entry = self.mode_entry(literal.mode_entry.as_deref())?;
                let payload = self.identifier(&literal.identifier)?;
                Some(Token::insertion(mode_entry, payload))
            }
            None => None,
        };

        Ok(SegmentedUtterance { tokens, literal })
    }

    fn mode_entry(&self, phrase: Option<&str>) -> Result<Option<Action>> {
        phrase
            .map(|p| {
                self.vocabulary
                    .insert_mode(p)
                    .cloned()
                    .ok_or_else(|| GrammarError::unrecognized("insert mode", p))
            })
            .transpose()
    }

    fn identifier(&self, phrase: &IdentifierPhrase) -> Result<Action> {
        let style = self
            .vocabulary
            .style(&phrase.style)
            .unwrap_or(phrase.style.as_str());
        let formatted = self.formatter.format(phrase.case, style, phrase.words.as_slice())?;
        Ok(Action::text(formatted))
    }

    fn insertion(&self, phrase: &InsertionPhrase) -> Result<Token> {
        let mode_entry = self.mode_entry(phrase.mode_entry.as_deref())?;
        let resolver = self.counts.get(self.count_digits);

        let payload = match &phrase.primitive {
            PrimitiveInsertion::Dictation(words) => Action::text(words.join(" ")),
            PrimitiveInsertion::Key { phrase: name, count } => {
                let entry = self
                    .vocabulary
                    .key_insertion(name)
                    .ok_or_else(|| GrammarError::unrecognized("key insertion", name.as_str()))?;
                match (entry.count, count) {
                    (CountSlot::None, Some(_)) => {
                        return Err(GrammarError::InvalidCount(format!(
                            "'{}' takes no count",
                            name
                        )));
                    }
                    (CountSlot::Required, None) => {
                        return Err(GrammarError::InvalidCount(format!(
                            "'{}' needs a count",
                            name
                        )));
                    }
                    _ => {}
                }
                let n = resolver.resolve(count.as_deref().unwrap_or_default())?;
                entry.action.bind_count(n)
            }
            PrimitiveInsertion::Identifier(identifier) => self.identifier(identifier)?,
            PrimitiveInsertion::Arithmetic(name) => self
                .vocabulary
                .arithmetic(name)
                .cloned()
                .ok_or_else(|| GrammarError::unrecognized("arithmetic", name.as_str()))?,
            PrimitiveInsertion::Spelling(name) => self
                .vocabulary
                .spelling(name)
                .map(Action::text)
                .ok_or_else(|| GrammarError::unrecognized("spelling", name.as_str()))?,
            PrimitiveInsertion::Custom(name) => self
                .vocabulary
                .custom(name)
                .cloned()
                .ok_or_else(|| GrammarError::unrecognized("insertion", name.as_str()))?,
        };

        let payload = match &phrase.parrot {
            Some(spoken) => payload.repeated(resolver.resolve(spoken.as_slice())?),
            None => payload,
        };

        Ok(Token::insertion(mode_entry, payload))
    }
}
