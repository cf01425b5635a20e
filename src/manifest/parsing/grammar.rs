//! Grammar registry
//!
//!     Each node variant is described declaratively by a [Descriptor]:
//!
//!     - prefix patterns: sequences of token-kind sets. The default validity predicate for
//!       a variant is "any of its patterns matches at the cursor".
//!     - a step grammar: the ordered [Step]s the stepper runs to construct the node.
//!     - spacing defaults: whether the node is surrounded by blank lines (outer) and whether
//!       its children are padded (inner).
//!
//! Steps
//!
//!     | Step      | Matches                                                |
//!     |-----------|--------------------------------------------------------|
//!     | `token`   | one token whose kind is in the set                     |
//!     | `class`   | one node of the first variant (in order) that parses   |
//!     | `group`   | all inner steps in sequence                            |
//!     | `alt`     | the first inner step sequence that parses              |
//!     | `block`   | `{` statements `}`                                     |
//!
//!     Any step can be bound to a name, made `optional`, repeated with `many`, or told to
//!     `keep_newlines` (by default leading newlines are skipped before a step runs).
//!
//!     Resource bodies do not fit the step model (titles, attributes and separators mix
//!     freely, and a second title may split the block), so the Resource descriptor only
//!     describes the head and the body is handled by a dedicated builder.

use crate::manifest::ast::Variant;
use crate::manifest::token::TokenKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use TokenKind as T;

/// One step of a variant's grammar
#[derive(Debug, Clone)]
pub struct Step {
    pub kind: StepKind,
    pub bind: Option<&'static str>,
    pub optional: bool,
    pub many: bool,
    pub keep_newlines: bool,
}

#[derive(Debug, Clone)]
pub enum StepKind {
    Token(&'static [TokenKind]),
    Class(&'static [Variant]),
    Group(Vec<Step>),
    Alt(Vec<Vec<Step>>),
    Block,
}

impl Step {
    fn new(kind: StepKind) -> Self {
        Self {
            kind,
            bind: None,
            optional: false,
            many: false,
            keep_newlines: false,
        }
    }

    pub fn bind(mut self, name: &'static str) -> Self {
        self.bind = Some(name);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn many(mut self) -> Self {
        self.many = true;
        self
    }

    pub fn keep_newlines(mut self) -> Self {
        self.keep_newlines = true;
        self
    }
}

pub fn token(kinds: &'static [TokenKind]) -> Step {
    Step::new(StepKind::Token(kinds))
}

pub fn class(variants: &'static [Variant]) -> Step {
    Step::new(StepKind::Class(variants))
}

pub fn group(steps: Vec<Step>) -> Step {
    Step::new(StepKind::Group(steps))
}

pub fn alt(groups: Vec<Vec<Step>>) -> Step {
    Step::new(StepKind::Alt(groups))
}

pub fn block() -> Step {
    Step::new(StepKind::Block)
}

pub type Pattern = &'static [&'static [TokenKind]];

/// Everything the engine needs to know about one variant
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub variant: Variant,
    pub patterns: Vec<Pattern>,
    /// Kinds skipped transparently while matching patterns
    pub skip: &'static [TokenKind],
    pub grammar: Vec<Step>,
    pub inner_spacing: bool,
    pub outer_spacing: bool,
}

impl Descriptor {
    fn new(variant: Variant) -> Self {
        Self {
            variant,
            patterns: Vec::new(),
            skip: NEWLINES,
            grammar: Vec::new(),
            inner_spacing: false,
            outer_spacing: false,
        }
    }

    fn pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    fn skip(mut self, skip: &'static [TokenKind]) -> Self {
        self.skip = skip;
        self
    }

    fn grammar(mut self, steps: Vec<Step>) -> Self {
        self.grammar = steps;
        self
    }

    fn outer(mut self) -> Self {
        self.outer_spacing = true;
        self
    }
}

pub const NEWLINES: &[TokenKind] = &[T::Return];

/// Candidates tried, in order, for each statement
pub const STATEMENTS: &[Variant] = &[
    Variant::Comment,
    Variant::MultilineComment,
    Variant::CaseCondition,
    Variant::Class,
    Variant::Define,
    Variant::Node,
    Variant::IfStatement,
    Variant::CaseStatement,
    Variant::Include,
    Variant::VarAssignment,
    Variant::DependencyChain,
    Variant::Resource,
    Variant::FunctionCall,
];

/// Candidates tried, in order, for each term of an expression
pub const TERMS: &[Variant] = &[
    Variant::Selector,
    Variant::FunctionCall,
    Variant::ResourceRef,
    Variant::Hash,
    Variant::List,
    Variant::Parenthesized,
    Variant::Unary,
    Variant::Simple,
];

pub const CHAIN_MEMBERS: &[Variant] = &[Variant::Resource, Variant::ResourceRef];

pub const COMMENTS: &[Variant] = &[Variant::Comment, Variant::MultilineComment];

pub const BINOPS: &[TokenKind] = &[
    T::Isequal,
    T::Notequal,
    T::Greaterequal,
    T::Greaterthan,
    T::Lessthan,
    T::Lessequal,
    T::Match,
    T::Nomatch,
    T::Plus,
    T::Minus,
    T::Times,
    T::Div,
    T::Lshift,
    T::Rshift,
    T::And,
    T::Or,
    T::In,
];

pub const EDGES: &[TokenKind] = &[T::InEdge, T::OutEdge, T::InEdgeSub, T::OutEdgeSub];

pub const ARROWS: &[TokenKind] = &[T::Farrow, T::Parrow];

pub const KEY_KINDS: &[TokenKind] = &[
    T::Name,
    T::Classref,
    T::DollarVar,
    T::Number,
    T::Squotes,
    T::Dquotes,
    T::Regex,
    T::Default,
    T::True,
    T::False,
    T::Undef,
];

pub const SIMPLE_KINDS: &[TokenKind] = &[
    T::Name,
    T::Classref,
    T::DollarVar,
    T::Number,
    T::Squotes,
    T::Dquotes,
    T::Regex,
    T::True,
    T::False,
    T::Undef,
    T::Default,
];

pub const NODE_NAME_KINDS: &[TokenKind] = &[T::Name, T::Squotes, T::Dquotes, T::Regex, T::Default];

pub const RESOURCE_TYPES: &[TokenKind] = &[T::Name, T::Classref, T::Class];

pub const COLLECTOR_OPENS: &[TokenKind] = &[T::Lcollect, T::Llcollect];

pub const COLLECTOR_CLOSES: &[TokenKind] = &[T::Rcollect, T::Rrcollect];

/// Functions that may be called without parentheses at statement level
pub const BARE_FUNCTIONS: &[&str] = &[
    "realize",
    "require",
    "contain",
    "fail",
    "notice",
    "warning",
    "tag",
    "hiera_include",
];

/// Parameter list shared by classes and defines
fn parameter_list() -> Step {
    group(vec![
        token(&[T::Lparen]),
        group(vec![
            class(&[Variant::Comment, Variant::MultilineComment, Variant::Parameter])
                .bind("params"),
            token(&[T::Comma]).optional(),
        ])
        .many()
        .optional(),
        token(&[T::Rparen]),
    ])
    .optional()
}

/// `item ,?` repeated, for hash, list and selector bodies
fn items(variants: &'static [Variant]) -> Step {
    group(vec![
        class(variants).bind("items"),
        token(&[T::Comma]).optional(),
    ])
    .many()
    .optional()
}

/// `Expression {, Expression}`
fn expressions(name: &'static str) -> Vec<Step> {
    vec![
        class(&[Variant::Expression]).bind(name),
        group(vec![
            token(&[T::Comma]),
            class(&[Variant::Expression]).bind(name),
        ])
        .many()
        .optional(),
    ]
}

/// Steps of the resource head: sigils, type or reference, optional collector
pub fn resource_head() -> Vec<Step> {
    vec![
        token(&[T::At]).bind("sigil").many().optional(),
        alt(vec![
            vec![class(&[Variant::ResourceRef]).bind("reference")],
            vec![token(RESOURCE_TYPES).bind("type")],
        ]),
        class(&[Variant::Collector]).bind("collector").optional(),
    ]
}

/// Values and colon of a case condition, shared with its speculative check
pub fn case_condition_values() -> Vec<Step> {
    let mut steps = expressions("values");
    steps.push(token(&[T::Colon]));
    steps
}

fn build_registry() -> HashMap<Variant, Descriptor> {
    let descriptors = vec![
        Descriptor::new(Variant::Manifest),
        Descriptor::new(Variant::Comment)
            .pattern(&[&[T::Comment]])
            .grammar(vec![token(&[T::Comment]).bind("text")]),
        Descriptor::new(Variant::MultilineComment)
            .pattern(&[&[T::Mlcomment]])
            .grammar(vec![token(&[T::Mlcomment]).bind("text")]),
        Descriptor::new(Variant::CaseCondition).grammar({
            let mut steps = case_condition_values();
            steps.push(block().bind("body"));
            steps
        }),
        Descriptor::new(Variant::Class)
            .pattern(&[&[T::Class], &[T::Name]])
            .outer()
            .grammar(vec![
                token(&[T::Class]),
                token(&[T::Name]).bind("name"),
                parameter_list(),
                group(vec![
                    token(&[T::Inherits]),
                    token(&[T::Name, T::Default]).bind("inherits"),
                ])
                .optional(),
                block().bind("body"),
            ]),
        Descriptor::new(Variant::Define)
            .pattern(&[&[T::Define]])
            .outer()
            .grammar(vec![
                token(&[T::Define]),
                token(&[T::Name]).bind("name"),
                parameter_list(),
                block().bind("body"),
            ]),
        Descriptor::new(Variant::Node)
            .pattern(&[&[T::Node]])
            .outer()
            .grammar(vec![
                token(&[T::Node]),
                token(NODE_NAME_KINDS).bind("names"),
                group(vec![token(&[T::Comma]), token(NODE_NAME_KINDS).bind("names")])
                    .many()
                    .optional(),
                group(vec![
                    token(&[T::Inherits]),
                    token(NODE_NAME_KINDS).bind("inherits"),
                ])
                .optional(),
                block().bind("body"),
            ]),
        Descriptor::new(Variant::Parameter)
            .pattern(&[&[T::DollarVar]])
            .pattern(&[&[T::Classref]])
            .grammar(vec![
                alt(vec![
                    vec![
                        class(&[Variant::ResourceRef, Variant::Simple]).bind("type"),
                        token(&[T::DollarVar]).bind("name"),
                    ],
                    vec![token(&[T::DollarVar]).bind("name")],
                ]),
                group(vec![
                    token(&[T::Equals]),
                    class(&[Variant::Expression]).bind("default"),
                ])
                .optional(),
            ]),
        Descriptor::new(Variant::Resource)
            .outer()
            .grammar(resource_head()),
        Descriptor::new(Variant::ResourceTitle).grammar({
            let mut steps = expressions("titles");
            steps.push(token(&[T::Colon]));
            steps
        }),
        Descriptor::new(Variant::Collector)
            .pattern(&[COLLECTOR_OPENS])
            .grammar(vec![
                token(COLLECTOR_OPENS).bind("open"),
                class(&[Variant::Expression]).bind("query").optional(),
                token(COLLECTOR_CLOSES).bind("close"),
            ]),
        Descriptor::new(Variant::IfStatement)
            .pattern(&[&[T::If, T::Elsif, T::Else]])
            .outer()
            .grammar(vec![
                alt(vec![
                    vec![
                        token(&[T::If, T::Elsif]).bind("keyword"),
                        class(&[Variant::Expression]).bind("condition"),
                    ],
                    vec![token(&[T::Else]).bind("keyword")],
                ]),
                block().bind("body"),
            ]),
        Descriptor::new(Variant::CaseStatement)
            .pattern(&[&[T::Case]])
            .outer()
            .grammar(vec![
                token(&[T::Case]),
                class(&[Variant::Expression]).bind("subject"),
                block().bind("body"),
            ]),
        Descriptor::new(Variant::Selector).grammar(vec![
            class(&[Variant::ResourceRef, Variant::Simple]).bind("subject"),
            token(&[T::Qmark]),
            token(&[T::Lbrace]),
            items(&[
                Variant::Comment,
                Variant::MultilineComment,
                Variant::KeyValuePair,
            ]),
            token(&[T::Rbrace]),
        ]),
        Descriptor::new(Variant::Include)
            .pattern(&[&[T::Include, T::Import]])
            .grammar({
                let mut steps = vec![token(&[T::Include, T::Import]).bind("keyword")];
                steps.extend(expressions("args"));
                steps
            }),
        Descriptor::new(Variant::VarAssignment)
            .pattern(&[&[T::DollarVar], &[T::Equals, T::Appends]])
            .grammar(vec![
                token(&[T::DollarVar]).bind("name"),
                token(&[T::Equals, T::Appends]).bind("operator"),
                class(&[Variant::Expression]).bind("value"),
            ]),
        Descriptor::new(Variant::FunctionCall)
            .pattern(&[&[T::Name], &[T::Lparen]])
            .skip(&[])
            .grammar(vec![alt(vec![
                vec![
                    token(&[T::Name]).bind("name"),
                    token(&[T::Lparen]).bind("open").keep_newlines(),
                    class(&[Variant::Expression]).bind("args").optional(),
                    group(vec![
                        token(&[T::Comma]),
                        class(&[Variant::Expression]).bind("args"),
                    ])
                    .many()
                    .optional(),
                    token(&[T::Comma]).optional(),
                    token(&[T::Rparen]),
                ],
                vec![
                    token(&[T::Name]).bind("name"),
                    class(&[Variant::Expression])
                        .bind("args")
                        .keep_newlines(),
                    group(vec![
                        token(&[T::Comma]),
                        class(&[Variant::Expression]).bind("args"),
                    ])
                    .many()
                    .optional(),
                ],
            ])]),
        Descriptor::new(Variant::DependencyChain).grammar(vec![
            class(CHAIN_MEMBERS).bind("members"),
            group(vec![
                token(EDGES).bind("edges"),
                class(CHAIN_MEMBERS).bind("members"),
            ])
            .many(),
        ]),
        Descriptor::new(Variant::ResourceRef)
            .pattern(&[&[T::Classref, T::DollarVar], &[T::Lbrack]])
            .skip(&[])
            .grammar(vec![
                token(&[T::Classref, T::DollarVar]).bind("head"),
                class(&[Variant::List])
                    .bind("indexes")
                    .many()
                    .keep_newlines(),
            ]),
        Descriptor::new(Variant::Hash)
            .pattern(&[&[T::Lbrace]])
            .grammar(vec![
                token(&[T::Lbrace]),
                items(&[
                    Variant::Comment,
                    Variant::MultilineComment,
                    Variant::KeyValuePair,
                ]),
                token(&[T::Rbrace]),
            ]),
        Descriptor::new(Variant::List)
            .pattern(&[&[T::Lbrack]])
            .grammar(vec![
                token(&[T::Lbrack]),
                items(&[
                    Variant::Comment,
                    Variant::MultilineComment,
                    Variant::Expression,
                ]),
                token(&[T::Rbrack]),
            ]),
        Descriptor::new(Variant::KeyValuePair)
            .pattern(&[KEY_KINDS, ARROWS])
            .grammar(vec![
                token(KEY_KINDS).bind("key"),
                token(ARROWS).bind("arrow"),
                class(&[Variant::Expression]).bind("value"),
            ]),
        Descriptor::new(Variant::Expression).grammar(vec![
            class(TERMS).bind("parts"),
            group(vec![token(BINOPS).bind("parts"), class(TERMS).bind("parts")])
                .many()
                .optional(),
        ]),
        Descriptor::new(Variant::Parenthesized)
            .pattern(&[&[T::Lparen]])
            .grammar(vec![
                token(&[T::Lparen]),
                class(&[Variant::Expression]).bind("inner"),
                token(&[T::Rparen]),
            ]),
        Descriptor::new(Variant::Unary)
            .pattern(&[&[T::Not, T::Minus]])
            .grammar(vec![
                token(&[T::Not, T::Minus]).bind("operator"),
                class(TERMS).bind("operand"),
            ]),
        Descriptor::new(Variant::Simple)
            .pattern(&[SIMPLE_KINDS])
            .grammar(vec![token(SIMPLE_KINDS).bind("token")]),
    ];

    descriptors
        .into_iter()
        .map(|descriptor| (descriptor.variant, descriptor))
        .collect()
}

static REGISTRY: Lazy<HashMap<Variant, Descriptor>> = Lazy::new(build_registry);

/// Descriptor of a variant
pub fn descriptor(variant: Variant) -> Option<&'static Descriptor> {
    REGISTRY.get(&variant)
}
