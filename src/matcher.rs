//! Transcript matcher
//!
//! Turns a plain transcript into a typed [`Utterance`] against one vocabulary.
//! At each position the longest command or keyed insertion wins (commands on
//! ties); anything else is dictation, which runs until the next word that
//! starts an element. `[<entry>] literal <identifier>` swallows the rest of
//! the utterance, so it can only ever be the last element.

use crate::count::is_count_word;
use crate::format::CaseMode;
use crate::tree::{
    CommandBody, CommandPhrase, CountedMotion, Element, IdentifierPhrase, InsertionPhrase,
    LiteralPhrase, MotionPhrase, OperatorPhrase, PrimitiveInsertion, SpokenCount, Utterance,
};
use crate::vocabulary::{normalize_word, CountSlot, Vocabulary};

const LITERAL: &str = "literal";
const PARROT: &str = "parrot";
const REGISTER: &str = "reg";

/// A matched production and the position just after it
type Match<T> = Option<(T, usize)>;

/// Keep `a` unless `b` reaches further
fn longer<T>(a: Match<T>, b: Match<T>) -> Match<T> {
    match (&a, &b) {
        (Some((_, ea)), Some((_, eb))) if eb > ea => b,
        (None, _) => b,
        _ => a,
    }
}

/// Transcript words, as spoken and normalized for lookup
struct Words {
    raw: Vec<String>,
    norm: Vec<String>,
}

impl Words {
    fn new(transcript: &str) -> Self {
        let mut raw = Vec::new();
        let mut norm = Vec::new();
        for word in transcript.split_whitespace() {
            let normalized = normalize_word(word);
            if normalized.is_empty() {
                continue;
            }
            raw.push(word.to_string());
            norm.push(normalized);
        }
        Self { raw, norm }
    }

    fn len(&self) -> usize {
        self.norm.len()
    }

    fn get(&self, i: usize) -> Option<&str> {
        self.norm.get(i).map(String::as_str)
    }

    /// Spoken words with surrounding punctuation removed, case kept
    fn bare(&self, range: std::ops::Range<usize>) -> Vec<String> {
        self.raw[range]
            .iter()
            .map(|w| {
                w.trim_matches(|c: char| matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '"'))
                    .to_string()
            })
            .collect()
    }
}

pub struct PhraseMatcher<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> PhraseMatcher<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Match a whole transcript
    pub fn parse(&self, transcript: &str) -> Utterance {
        let w = Words::new(transcript);
        let mut utterance = Utterance::default();
        let mut i = 0;

        while i < w.len() {
            if let Some(literal) = self.literal(&w, i) {
                utterance.literal = Some(literal);
                break;
            }

            let command = self.command(&w, i).map(|(c, end)| (Element::Command(c), end));
            let insertion = self
                .insertion(&w, i)
                .map(|(ins, end)| (Element::Insertion(ins), end));

            let (element, end) = match longer(command, insertion) {
                Some(found) => found,
                None => {
                    let end = self.dictation_end(&w, i, 1);
                    let mut phrase =
                        InsertionPhrase::new(PrimitiveInsertion::Dictation(w.raw[i..end].to_vec()));
                    let end = match self.parrot(&w, end) {
                        Some((count, after)) => {
                            phrase.parrot = Some(count);
                            after
                        }
                        None => end,
                    };
                    (Element::Insertion(phrase), end)
                }
            };
            utterance.elements.push(element);
            i = end;
        }

        tracing::trace!(
            elements = utterance.elements.len(),
            literal = utterance.literal.is_some(),
            "Matched transcript"
        );
        utterance
    }

    /// Longest phrase starting at `i` accepted by `lookup`
    fn longest<V>(&self, w: &Words, i: usize, lookup: impl Fn(&str) -> Option<V>) -> Option<(String, V, usize)> {
        let max = self.vocabulary.max_phrase_words().min(w.len().saturating_sub(i));
        (1..=max).rev().find_map(|len| {
            let phrase = w.norm[i..i + len].join(" ");
            lookup(&phrase).map(|v| (phrase, v, i + len))
        })
    }

    fn count(&self, w: &Words, i: usize) -> Match<SpokenCount> {
        let mut end = i;
        while w.get(end).is_some_and(is_count_word) {
            end += 1;
        }
        (end > i).then(|| (w.norm[i..end].to_vec(), end))
    }

    fn optional_count(&self, w: &Words, i: usize) -> (Option<SpokenCount>, usize) {
        match self.count(w, i) {
            Some((count, end)) => (Some(count), end),
            None => (None, i),
        }
    }

    fn register(&self, w: &Words, i: usize) -> Match<String> {
        if w.get(i) != Some(REGISTER) {
            return None;
        }
        let letter = w.get(i + 1)?;
        self.vocabulary
            .letter(letter)
            .map(|_| (letter.to_string(), i + 2))
    }

    fn command(&self, w: &Words, i: usize) -> Match<CommandPhrase> {
        let (count, j) = self.optional_count(w, i);
        let (register, k) = match self.register(w, j) {
            Some((letter, end)) => (Some(letter), end),
            None => (None, j),
        };
        let (body, end) = self.command_body(w, k)?;
        Some((
            CommandPhrase {
                count,
                register,
                body,
            },
            end,
        ))
    }

    fn command_body(&self, w: &Words, i: usize) -> Match<CommandBody> {
        let self_applied = self.operator_self(w, i);
        let with_motion = self.operator_motion(w, i);
        let primitive = self
            .longest(w, i, |p| self.vocabulary.command(p))
            .map(|(phrase, _, end)| (CommandBody::Primitive(phrase), end));
        longer(longer(self_applied, with_motion), primitive)
    }

    fn operator_self(&self, w: &Words, i: usize) -> Match<CommandBody> {
        let (operator, _, j) = self.longest(w, i, |p| self.vocabulary.operator(p))?;
        let (count, k) = self.optional_count(w, j);
        let len = j - i;
        if k + len > w.len() || w.norm[k..k + len].join(" ") != operator {
            return None;
        }
        Some((CommandBody::OperatorSelf { operator, count }, k + len))
    }

    fn operator_motion(&self, w: &Words, i: usize) -> Match<CommandBody> {
        let bare_motion = self.motion(w, i).map(|(motion, end)| {
            (
                CommandBody::OperatorMotion {
                    operator: None,
                    motion,
                },
                end,
            )
        });

        let (count, j) = self.optional_count(w, i);
        let applied = self
            .longest(w, j, |p| self.vocabulary.operator(p))
            .and_then(|(name, _, k)| {
                let (motion, end) = self.motion(w, k)?;
                Some((
                    CommandBody::OperatorMotion {
                        operator: Some(OperatorPhrase { count, name }),
                        motion,
                    },
                    end,
                ))
            });

        longer(applied, bare_motion)
    }

    fn motion(&self, w: &Words, i: usize) -> Match<MotionPhrase> {
        let (count, j) = self.optional_count(w, i);
        let counted = self
            .counted_motion(w, j)
            .map(|(motion, end)| (MotionPhrase::Counted { count, motion }, end));
        let uncounted = self
            .longest(w, i, |p| self.vocabulary.uncounted_motion(p))
            .map(|(phrase, _, end)| (MotionPhrase::Uncounted(phrase), end));
        longer(counted, uncounted)
    }

    fn counted_motion(&self, w: &Words, i: usize) -> Match<CountedMotion> {
        let primitive = self
            .longest(w, i, |p| self.vocabulary.motion(p))
            .map(|(phrase, _, end)| (CountedMotion::Primitive(phrase), end));
        let parameterized = self
            .longest(w, i, |p| self.vocabulary.parameter_motion(p))
            .and_then(|(motion, _, j)| {
                let letter = w.get(j)?;
                self.vocabulary.letter(letter)?;
                Some((
                    CountedMotion::Parameterized {
                        motion,
                        letter: letter.to_string(),
                    },
                    j + 1,
                ))
            });
        longer(primitive, parameterized)
    }

    /// `[<mode entry>] <primitive insertion> [parrot <count>]`, dictation only after a mode entry
    fn insertion(&self, w: &Words, i: usize) -> Match<InsertionPhrase> {
        let entry = self.longest(w, i, |p| self.vocabulary.insert_mode(p));
        let (mode_entry, primitive) = match entry {
            Some((entry, _, j)) if j < w.len() => {
                let primitive = self.keyed(w, j).or_else(|| {
                    let end = self.dictation_end(w, j, 1);
                    Some((PrimitiveInsertion::Dictation(w.raw[j..end].to_vec()), end))
                });
                (Some(entry), primitive)
            }
            _ => (None, self.keyed(w, i)),
        };
        let (primitive, end) = primitive?;

        let mut phrase = InsertionPhrase {
            mode_entry,
            primitive,
            parrot: None,
        };
        let end = match self.parrot(w, end) {
            Some((count, after)) => {
                phrase.parrot = Some(count);
                after
            }
            None => end,
        };
        Some((phrase, end))
    }

    /// Any insertion introduced by a vocabulary phrase
    fn keyed(&self, w: &Words, i: usize) -> Match<PrimitiveInsertion> {
        let key = self
            .longest(w, i, |p| self.vocabulary.key_insertion(p))
            .map(|(phrase, entry, j)| {
                let (count, end) = match entry.count {
                    CountSlot::None => (None, j),
                    CountSlot::Optional | CountSlot::Required => self.optional_count(w, j),
                };
                (PrimitiveInsertion::Key { phrase, count }, end)
            });
        let identifier = self
            .identifier(w, i)
            .map(|(id, end)| (PrimitiveInsertion::Identifier(id), end));
        let custom = self
            .longest(w, i, |p| self.vocabulary.custom(p))
            .map(|(phrase, _, end)| (PrimitiveInsertion::Custom(phrase), end));
        let arithmetic = self
            .longest(w, i, |p| self.vocabulary.arithmetic(p))
            .map(|(phrase, _, end)| (PrimitiveInsertion::Arithmetic(phrase), end));
        let spelling = self
            .longest(w, i, |p| self.vocabulary.spelling(p))
            .map(|(phrase, _, end)| (PrimitiveInsertion::Spelling(phrase), end));

        [identifier, custom, arithmetic, spelling]
            .into_iter()
            .fold(key, longer)
    }

    /// `[upper | natural] <style>`
    fn identifier_head(&self, w: &Words, i: usize) -> Match<(CaseMode, String)> {
        let (case, j) = match w.get(i).and_then(CaseMode::from_word) {
            Some(case) => (case, i + 1),
            None => (CaseMode::Lower, i),
        };
        let (style, _, end) = self.longest(w, j, |p| self.vocabulary.style(p))?;
        Some(((case, style), end))
    }

    fn identifier(&self, w: &Words, i: usize) -> Match<IdentifierPhrase> {
        let ((case, style), j) = self.identifier_head(w, i)?;
        let end = self.dictation_end(w, j, 0);
        Some((
            IdentifierPhrase {
                case,
                style,
                words: w.bare(j..end),
            },
            end,
        ))
    }

    fn literal(&self, w: &Words, i: usize) -> Option<LiteralPhrase> {
        let (mode_entry, j) = match self.longest(w, i, |p| self.vocabulary.insert_mode(p)) {
            Some((entry, _, j)) if w.get(j) == Some(LITERAL) => (Some(entry), j),
            _ => (None, i),
        };
        if w.get(j) != Some(LITERAL) {
            return None;
        }
        let ((case, style), k) = self.identifier_head(w, j + 1)?;
        Some(LiteralPhrase {
            mode_entry,
            identifier: IdentifierPhrase {
                case,
                style,
                words: w.bare(k..w.len()),
            },
        })
    }

    fn parrot(&self, w: &Words, i: usize) -> Match<SpokenCount> {
        if w.get(i) != Some(PARROT) {
            return None;
        }
        self.count(w, i + 1)
    }

    /// Whether a new element could begin at `i`
    fn starts_element(&self, w: &Words, i: usize) -> bool {
        if self.parrot(w, i).is_some() || self.literal(w, i).is_some() {
            return true;
        }
        if self
            .longest(w, i, |p| self.vocabulary.insert_mode(p))
            .is_some_and(|(_, _, end)| end < w.len())
        {
            return true;
        }
        let keyed_start = self.longest(w, i, |p| self.vocabulary.key_insertion(p)).is_some()
            || self.longest(w, i, |p| self.vocabulary.custom(p)).is_some()
            || self.longest(w, i, |p| self.vocabulary.arithmetic(p)).is_some()
            || self.longest(w, i, |p| self.vocabulary.spelling(p)).is_some()
            || self.identifier_head(w, i).is_some();
        keyed_start || self.command(w, i).is_some()
    }

    /// End of a dictation run starting at `start` that takes at least `min_words`
    fn dictation_end(&self, w: &Words, start: usize, min_words: usize) -> usize {
        let mut end = (start + min_words).min(w.len());
        while end < w.len() && !self.starts_element(w, end) {
            end += 1;
        }
        end
    }
}
