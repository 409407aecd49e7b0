//! Typed phrase tree
//!
//! One type per grammar production. Leaves hold the matched vocabulary
//! phrases (normalized spoken words); resolving them to actions is the
//! segmenter's job. Counts are kept as the spoken digit words so that range
//! errors surface during segmentation, not matching.

use crate::format::CaseMode;

/// Spoken digits of a count, e.g. `["one", "two"]`
pub type SpokenCount = Vec<String>;

/// A whole recognized utterance
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Utterance {
    pub elements: Vec<Element>,
    pub literal: Option<LiteralPhrase>,
}

/// One top-level repetition element
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Command(CommandPhrase),
    Insertion(InsertionPhrase),
}

/// `[<count>] [reg <letter>] <command>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPhrase {
    pub count: Option<SpokenCount>,
    pub register: Option<String>,
    pub body: CommandBody,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandBody {
    /// A primitive command such as `dell` or `ripple`
    Primitive(String),
    /// `[[<count>] <operator>] <motion>`
    OperatorMotion {
        operator: Option<OperatorPhrase>,
        motion: MotionPhrase,
    },
    /// `<operator> [<count>] <operator>`
    OperatorSelf {
        operator: String,
        count: Option<SpokenCount>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorPhrase {
    pub count: Option<SpokenCount>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MotionPhrase {
    Counted {
        count: Option<SpokenCount>,
        motion: CountedMotion,
    },
    Uncounted(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CountedMotion {
    Primitive(String),
    /// `<parameter motion> <letter>`, e.g. `phytic alpha`
    Parameterized { motion: String, letter: String },
}

/// `[<mode entry>] <primitive insertion> [parrot <count>]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertionPhrase {
    pub mode_entry: Option<String>,
    pub primitive: PrimitiveInsertion,
    pub parrot: Option<SpokenCount>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrimitiveInsertion {
    /// Free dictation, typed as spoken
    Dictation(Vec<String>),
    Key {
        phrase: String,
        count: Option<SpokenCount>,
    },
    Identifier(IdentifierPhrase),
    Arithmetic(String),
    Spelling(String),
    /// User-configured insertion
    Custom(String),
}

/// `[upper | natural] <style> [<dictation>]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentifierPhrase {
    pub case: CaseMode,
    pub style: String,
    pub words: Vec<String>,
}

/// `[<mode entry>] literal <identifier>`, only valid at the end of an utterance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteralPhrase {
    pub mode_entry: Option<String>,
    pub identifier: IdentifierPhrase,
}

fn words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

impl CommandPhrase {
    pub fn new(body: CommandBody) -> Self {
        Self {
            count: None,
            register: None,
            body,
        }
    }

    pub fn primitive(name: &str) -> Self {
        Self::new(CommandBody::Primitive(name.to_string()))
    }

    /// Operator applied to itself (`chaos chaos`)
    pub fn operator_self(operator: &str, count: Option<&str>) -> Self {
        Self::new(CommandBody::OperatorSelf {
            operator: operator.to_string(),
            count: count.map(words),
        })
    }

    /// Optional operator followed by a primitive motion
    pub fn operator_motion(operator: Option<&str>, motion: &str) -> Self {
        Self::new(CommandBody::OperatorMotion {
            operator: operator.map(|name| OperatorPhrase {
                count: None,
                name: name.to_string(),
            }),
            motion: MotionPhrase::Counted {
                count: None,
                motion: CountedMotion::Primitive(motion.to_string()),
            },
        })
    }

    pub fn with_count(mut self, spoken: &str) -> Self {
        self.count = Some(words(spoken));
        self
    }

    pub fn with_register(mut self, letter: &str) -> Self {
        self.register = Some(letter.to_string());
        self
    }
}

impl InsertionPhrase {
    pub fn new(primitive: PrimitiveInsertion) -> Self {
        Self {
            mode_entry: None,
            primitive,
            parrot: None,
        }
    }

    pub fn dictation(text: &str) -> Self {
        Self::new(PrimitiveInsertion::Dictation(words(text)))
    }

    pub fn key(phrase: &str, count: Option<&str>) -> Self {
        Self::new(PrimitiveInsertion::Key {
            phrase: phrase.to_string(),
            count: count.map(words),
        })
    }

    pub fn with_mode_entry(mut self, entry: &str) -> Self {
        self.mode_entry = Some(entry.to_string());
        self
    }

    pub fn with_parrot(mut self, spoken: &str) -> Self {
        self.parrot = Some(words(spoken));
        self
    }
}

impl IdentifierPhrase {
    pub fn new(case: CaseMode, style: &str, text: &str) -> Self {
        Self {
            case,
            style: style.to_string(),
            words: words(text),
        }
    }
}

impl From<CommandPhrase> for Element {
    fn from(phrase: CommandPhrase) -> Self {
        Element::Command(phrase)
    }
}

impl From<InsertionPhrase> for Element {
    fn from(phrase: InsertionPhrase) -> Self {
        Element::Insertion(phrase)
    }
}
