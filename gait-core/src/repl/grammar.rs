#![allow(clippy::module_name_repetitions)]

//! Lexer and parser for the plan-authoring REPL.
//!
//! This module exposes an embedded-friendly lexer/parser pipeline. The lexer
//! uses `regal` to produce a bounded token stream, while the parser composes
//! `winnow` combinators over those tokens to build structured command values.

use super::catalog::{
    self, ChoiceBranch, ChoiceTag, CommandTag, DefaultChoice, HelpTopics, Node, SubcommandBranch,
    SubcommandTag, ValueSpec,
};
use core::fmt;
use core::ops::Range;

use crate::keys::KeySet;

use heapless::Vec as HeaplessVec;
use regal::IncrementalError;
use regal::TokenCache;
use regal_macros::RegalLexer;
#[allow(deprecated)]
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::stream::Stream;

/// Maximum number of tokens produced per REPL line. Commands remain short and bounded.
pub const MAX_TOKENS: usize = 32;
const MAX_CACHE_RECORDS: usize = MAX_TOKENS * 2;

/// Lexical token kinds recognized by the REPL grammar.
#[derive(RegalLexer, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TokenKind {
    /// Unsuffixed integer literal (step counts).
    #[regex(r"[0-9]+")]
    Integer,
    /// Identifier or keyword: commands, key letters, `none`.
    #[regex(r"[A-Za-z][A-Za-z0-9-]*")]
    Ident,
    /// Equals sign for key/value assignments.
    #[token("=")]
    Equals,
    /// Inline whitespace is ignored.
    #[regex(r"[ \t]+", skip)]
    Whitespace,
    /// End-of-line token (`\r`, `\n`, or `\r\n`).
    #[token("\r\n")]
    #[token("\n")]
    #[token("\r")]
    Eol,
    /// Pseudo variant used when the lexer encounters unsupported input.
    #[default]
    #[regex(r".", priority = 1024)]
    Error,
}

/// Token emitted by the lexer with a byte span back into the source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: Range<usize>,
}

/// Bounded token buffer to avoid dynamic allocation in `no_std` environments.
pub type TokenBuffer<'a> = HeaplessVec<Token<'a>, MAX_TOKENS>;

/// Lexer errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    /// Input produced more tokens than the static buffer allows.
    TooManyTokens { processed: usize },
    /// Underlying lexer reported an unrecoverable error.
    Engine,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::TooManyTokens { processed } => {
                write!(f, "token buffer exhausted after {processed} items")
            }
            LexError::Engine => write!(f, "lexer engine error"),
        }
    }
}

/// Grammar errors emitted by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrammarErrorKind<'a> {
    UnexpectedToken {
        expected: &'static str,
        found: Option<TokenKind>,
        span: Range<usize>,
    },
    UnexpectedEnd {
        expected: &'static str,
    },
    InvalidInteger {
        span: Range<usize>,
    },
    InvalidKeys {
        span: Range<usize>,
        lexeme: &'a str,
    },
    InvalidToken {
        span: Range<usize>,
        lexeme: &'a str,
    },
}

impl<'a> fmt::Display for GrammarErrorKind<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarErrorKind::UnexpectedToken {
                expected,
                found,
                span,
            } => write!(f, "expected {expected}, found {found:?} at {span:?}"),
            GrammarErrorKind::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            GrammarErrorKind::InvalidInteger { span } => {
                write!(f, "invalid integer literal at {span:?}")
            }
            GrammarErrorKind::InvalidKeys { span, lexeme } => {
                write!(f, "invalid key letters `{lexeme}` at {span:?}")
            }
            GrammarErrorKind::InvalidToken { span, lexeme } => {
                write!(f, "unsupported token `{lexeme}` at {span:?}")
            }
        }
    }
}

/// Wrapper type enabling a consistent error surface for consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarError<'a> {
    pub kind: GrammarErrorKind<'a>,
}

impl<'a> fmt::Display for GrammarError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl<'a> GrammarError<'a> {
    fn unexpected(expected: &'static str, token: Option<&Token<'a>>) -> Self {
        GrammarError {
            kind: match token {
                Some(tok) => GrammarErrorKind::UnexpectedToken {
                    expected,
                    found: Some(tok.kind),
                    span: tok.span.clone(),
                },
                None => GrammarErrorKind::UnexpectedEnd { expected },
            },
        }
    }

    fn invalid_integer(token: &Token<'a>) -> Self {
        GrammarError {
            kind: GrammarErrorKind::InvalidInteger {
                span: token.span.clone(),
            },
        }
    }

    fn invalid_keys(token: &Token<'a>) -> Self {
        GrammarError {
            kind: GrammarErrorKind::InvalidKeys {
                span: token.span.clone(),
                lexeme: token.lexeme,
            },
        }
    }

    fn invalid_token(token: &Token<'a>) -> Self {
        GrammarError {
            kind: GrammarErrorKind::InvalidToken {
                span: token.span.clone(),
                lexeme: token.lexeme,
            },
        }
    }
}

type Input<'src, 'slice> = &'slice [Token<'src>];

impl<'src, 'slice> ParserError<Input<'src, 'slice>> for GrammarError<'src>
where
    'src: 'slice,
{
    type Inner = Self;

    fn from_input(input: &Input<'src, 'slice>) -> Self {
        GrammarError::unexpected("token", input.first())
    }

    fn append(
        self,
        _input: &Input<'src, 'slice>,
        _token_start: &<Input<'src, 'slice> as Stream>::Checkpoint,
    ) -> Self {
        self
    }

    fn or(self, other: Self) -> Self {
        other
    }

    fn into_inner(self) -> Result<Self::Inner, Self> {
        Ok(self)
    }
}

/// Combined lex/parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError<'a> {
    Lex(LexError),
    Grammar(GrammarError<'a>),
}

impl<'a> fmt::Display for ParseError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(err) => err.fmt(f),
            ParseError::Grammar(err) => err.fmt(f),
        }
    }
}

/// Structured commands produced by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Hold(HoldCommand),
    Step(StepCommand),
    Plan(PlanCommand),
    Status,
    Help(HelpCommand<'a>),
}

/// Append one key hold to the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldCommand {
    pub keys: KeySet,
    pub steps: u32,
}

/// Drive the stepping loop forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepCommand {
    Once,
    All,
    Count(u32),
}

/// Manage the authored plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanCommand {
    Show,
    Consolidate,
    Reset,
    Clear,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelpCommand<'a> {
    pub topic: Option<&'a str>,
}

pub(crate) fn parse_tokens_partial<'src, 'slice>(
    tokens: &'slice [Token<'src>],
) -> Result<(Command<'src>, &'slice [Token<'src>]), GrammarError<'src>>
where
    'src: 'slice,
{
    let mut input = tokens;
    match command().parse_next(&mut input) {
        Ok(cmd) => Ok((cmd, input)),
        Err(ErrMode::Backtrack(err)) | Err(ErrMode::Cut(err)) => Err(err),
        Err(ErrMode::Incomplete(_)) => Err(GrammarError::unexpected("token", input.first())),
    }
}

/// Tokenize the provided line.
pub fn lex(line: &str) -> Result<TokenBuffer<'_>, LexError> {
    let compiled = TokenKind::lexer();
    let mut cache: TokenCache<TokenKind, MAX_CACHE_RECORDS> = TokenCache::new();
    let partial = cache
        .rebuild(compiled, line)
        .map_err(map_incremental_error)?;
    let mut buffer = TokenBuffer::new();

    for record in cache.tokens() {
        if record.skipped {
            continue;
        }

        let span = record.start..record.end;
        let lexeme = &line[span.clone()];
        if buffer
            .push(Token {
                kind: record.token,
                lexeme,
                span,
            })
            .is_err()
        {
            return Err(LexError::TooManyTokens {
                processed: buffer.len() + 1,
            });
        }
    }

    if let Some(partial) = partial.filter(|partial| !partial.fragment.is_empty()) {
        let start = partial.start;
        let end = start + partial.fragment.len();
        let span = start..end;
        if buffer
            .push(Token {
                kind: TokenKind::Error,
                lexeme: partial.fragment,
                span,
            })
            .is_err()
        {
            return Err(LexError::TooManyTokens {
                processed: buffer.len() + 1,
            });
        }
    }

    Ok(buffer)
}

fn map_incremental_error(error: IncrementalError) -> LexError {
    match error {
        IncrementalError::TokenOverflow => LexError::TooManyTokens {
            processed: MAX_TOKENS,
        },
        _ => LexError::Engine,
    }
}

/// Parse a REPL command from the provided line.
pub fn parse(line: &str) -> Result<Command<'_>, ParseError<'_>> {
    let tokens = lex(line).map_err(ParseError::Lex)?;

    for token in tokens.iter() {
        if token.kind == TokenKind::Error {
            return Err(ParseError::Grammar(GrammarError::invalid_token(token)));
        }
    }

    let (command, mut rest) =
        parse_tokens_partial(tokens.as_slice()).map_err(ParseError::Grammar)?;

    while let Some((token, remaining)) = rest.split_first() {
        if token.kind == TokenKind::Eol {
            rest = remaining;
        } else {
            return Err(ParseError::Grammar(GrammarError::unexpected(
                "end of command",
                Some(token),
            )));
        }
    }

    Ok(command)
}

fn command<'src, 'slice>()
-> impl Parser<Input<'src, 'slice>, Command<'src>, ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    move |input: &mut Input<'src, 'slice>| {
        let snapshot = *input;
        let command_token = expect_kind(TokenKind::Ident, "command keyword").parse_next(input)?;

        match catalog::find(command_token.lexeme) {
            Some(spec) => {
                let mut state = CommandState::new(spec.tag);
                parse_node(spec.grammar, input, &mut state)?;
                state.finish()
            }
            None => {
                *input = snapshot;
                Err(ErrMode::Backtrack(GrammarError::unexpected(
                    "command keyword",
                    Some(&command_token),
                )))
            }
        }
    }
}

fn parse_node<'src, 'slice>(
    node: &'static Node,
    input: &mut Input<'src, 'slice>,
    state: &mut CommandState<'src>,
) -> Result<(), ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    match node {
        Node::End => Ok(()),
        Node::Arguments(specs) => parse_arguments(input, specs, state),
        Node::OptionalChoice { choices, default } => {
            parse_optional_choice(input, choices, *default, state)
        }
        Node::Subcommands(branches) => parse_subcommands(input, branches, state),
        Node::Topic { topics, next } => {
            parse_topic(*topics, input, state)?;
            parse_node(next, input, state)
        }
    }
}

fn parse_arguments<'src, 'slice>(
    input: &mut Input<'src, 'slice>,
    specs: &'static [ValueSpec],
    state: &mut CommandState<'src>,
) -> Result<(), ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    for spec in specs {
        let value = parse_value(input, *spec)?;
        state.apply_argument(*spec, value)?;
    }
    Ok(())
}

fn parse_optional_choice<'src, 'slice>(
    input: &mut Input<'src, 'slice>,
    choices: &'static [ChoiceBranch],
    default: Option<DefaultChoice>,
    state: &mut CommandState<'src>,
) -> Result<(), ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    match input.split_first() {
        Some((token, rest)) if token.kind == TokenKind::Ident => {
            if let Some(branch) = find_choice(choices, token.lexeme) {
                *input = rest;
                parse_choice_branch(input, branch, state)
            } else {
                Err(ErrMode::Backtrack(GrammarError::unexpected(
                    choice_expected_label(choices),
                    Some(token),
                )))
            }
        }
        Some((token, _)) if token.kind == TokenKind::Eol => {
            if let Some(default_choice) = default {
                state.apply_default_choice(default_choice.tag)?;
                parse_node(default_choice.next, input, state)
            } else {
                Ok(())
            }
        }
        Some((token, _)) => Err(ErrMode::Backtrack(GrammarError::unexpected(
            choice_expected_label(choices),
            Some(token),
        ))),
        None => {
            if let Some(default_choice) = default {
                state.apply_default_choice(default_choice.tag)?;
                parse_node(default_choice.next, input, state)
            } else {
                Ok(())
            }
        }
    }
}

fn parse_choice_branch<'src, 'slice>(
    input: &mut Input<'src, 'slice>,
    branch: &'static ChoiceBranch,
    state: &mut CommandState<'src>,
) -> Result<(), ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    let value = parse_value(input, branch.value)?;
    state.apply_choice(branch.tag, value)?;
    parse_node(branch.next, input, state)
}

fn parse_subcommands<'src, 'slice>(
    input: &mut Input<'src, 'slice>,
    branches: &'static [SubcommandBranch],
    state: &mut CommandState<'src>,
) -> Result<(), ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    let expected = branches
        .first()
        .map(|branch| branch.name)
        .unwrap_or("subcommand");

    match input.split_first() {
        Some((token, rest)) if token.kind == TokenKind::Ident => {
            if let Some(branch) = branches
                .iter()
                .find(|candidate| candidate.name.eq_ignore_ascii_case(token.lexeme))
            {
                *input = rest;
                state.set_subcommand(branch.tag);
                parse_node(branch.grammar, input, state)
            } else {
                Err(ErrMode::Backtrack(GrammarError::unexpected(
                    expected,
                    Some(token),
                )))
            }
        }
        Some((token, _)) => Err(ErrMode::Backtrack(GrammarError::unexpected(
            expected,
            Some(token),
        ))),
        None => Err(ErrMode::Backtrack(GrammarError::unexpected(expected, None))),
    }
}

fn parse_topic<'src, 'slice>(
    _topics: HelpTopics,
    input: &mut Input<'src, 'slice>,
    state: &mut CommandState<'src>,
) -> Result<(), ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    state.set_topic(None);

    match input.split_first() {
        Some((token, rest)) if token.kind == TokenKind::Ident => {
            state.set_topic(Some(token.lexeme));
            *input = rest;
            Ok(())
        }
        Some((token, _)) if token.kind == TokenKind::Eol => Ok(()),
        Some((token, _)) => Err(ErrMode::Backtrack(GrammarError::unexpected(
            "identifier",
            Some(token),
        ))),
        None => Ok(()),
    }
}

fn parse_value<'src, 'slice>(
    input: &mut Input<'src, 'slice>,
    spec: ValueSpec,
) -> Result<ChoiceValue, ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    match spec {
        ValueSpec::None => Ok(ChoiceValue::None),
        ValueSpec::KeySet => {
            let keys_token = expect_kind(TokenKind::Ident, "key set").parse_next(input)?;
            let keys = parse_keys(&keys_token).map_err(ErrMode::Cut)?;
            Ok(ChoiceValue::Keys(keys))
        }
        ValueSpec::StepCount => {
            let steps_token = expect_kind(TokenKind::Integer, "step count").parse_next(input)?;
            let steps = parse_integer(&steps_token).map_err(ErrMode::Cut)?;
            Ok(ChoiceValue::Integer(steps))
        }
        ValueSpec::IntegerAssignment { .. } => {
            let _ = expect_kind(TokenKind::Equals, "=").parse_next(input)?;
            let integer_token = expect_kind(TokenKind::Integer, "integer").parse_next(input)?;
            let value = parse_integer(&integer_token).map_err(ErrMode::Cut)?;
            Ok(ChoiceValue::Integer(value))
        }
    }
}

fn find_choice(choices: &'static [ChoiceBranch], lexeme: &str) -> Option<&'static ChoiceBranch> {
    choices
        .iter()
        .find(|choice| choice.keyword.eq_ignore_ascii_case(lexeme))
}

fn choice_expected_label(choices: &'static [ChoiceBranch]) -> &'static str {
    choices
        .first()
        .map(|choice| choice.keyword)
        .unwrap_or("keyword")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChoiceValue {
    None,
    Keys(KeySet),
    Integer(u32),
}

enum CommandState<'a> {
    Hold {
        keys: Option<KeySet>,
        steps: Option<u32>,
    },
    Step {
        action: Option<StepCommand>,
    },
    Plan {
        subcommand: Option<SubcommandTag>,
    },
    Status,
    Help {
        topic: Option<&'a str>,
    },
}

impl<'a> CommandState<'a> {
    fn new(tag: CommandTag) -> Self {
        match tag {
            CommandTag::Hold => CommandState::Hold {
                keys: None,
                steps: None,
            },
            CommandTag::Step => CommandState::Step { action: None },
            CommandTag::Plan => CommandState::Plan { subcommand: None },
            CommandTag::Status => CommandState::Status,
            CommandTag::Help => CommandState::Help { topic: None },
        }
    }

    fn apply_argument(
        &mut self,
        spec: ValueSpec,
        value: ChoiceValue,
    ) -> Result<(), ErrMode<GrammarError<'a>>> {
        match (self, spec, value) {
            (CommandState::Hold { keys, .. }, ValueSpec::KeySet, ChoiceValue::Keys(value)) => {
                *keys = Some(value);
                Ok(())
            }
            (
                CommandState::Hold { steps, .. },
                ValueSpec::StepCount,
                ChoiceValue::Integer(value),
            ) => {
                *steps = Some(value);
                Ok(())
            }
            _ => Err(ErrMode::Backtrack(GrammarError::unexpected(
                "argument",
                None,
            ))),
        }
    }

    fn apply_choice(
        &mut self,
        tag: ChoiceTag,
        value: ChoiceValue,
    ) -> Result<(), ErrMode<GrammarError<'a>>> {
        match (self, tag, value) {
            (CommandState::Step { action }, ChoiceTag::StepOnce, _) => {
                *action = Some(StepCommand::Once);
                Ok(())
            }
            (CommandState::Step { action }, ChoiceTag::StepAll, _) => {
                *action = Some(StepCommand::All);
                Ok(())
            }
            (CommandState::Step { action }, ChoiceTag::StepCount, ChoiceValue::Integer(count)) => {
                *action = Some(StepCommand::Count(count));
                Ok(())
            }
            (_, unexpected_tag, _) => {
                let _ = unexpected_tag;
                Err(ErrMode::Backtrack(GrammarError::unexpected("choice", None)))
            }
        }
    }

    fn apply_default_choice(&mut self, tag: ChoiceTag) -> Result<(), ErrMode<GrammarError<'a>>> {
        self.apply_choice(tag, ChoiceValue::None)
    }

    fn set_subcommand(&mut self, tag: SubcommandTag) {
        if let CommandState::Plan { subcommand } = self {
            *subcommand = Some(tag);
        } else {
            unreachable!("subcommands only apply to plan commands");
        }
    }

    fn set_topic(&mut self, topic: Option<&'a str>) {
        if let CommandState::Help { topic: slot } = self {
            *slot = topic;
        }
    }

    fn finish(self) -> Result<Command<'a>, ErrMode<GrammarError<'a>>> {
        match self {
            CommandState::Hold {
                keys: Some(keys),
                steps: Some(steps),
            } => Ok(Command::Hold(HoldCommand { keys, steps })),
            CommandState::Step {
                action: Some(command),
            } => Ok(Command::Step(command)),
            CommandState::Plan {
                subcommand: Some(tag),
            } => Ok(Command::Plan(match tag {
                SubcommandTag::PlanShow => PlanCommand::Show,
                SubcommandTag::PlanConsolidate => PlanCommand::Consolidate,
                SubcommandTag::PlanReset => PlanCommand::Reset,
                SubcommandTag::PlanClear => PlanCommand::Clear,
            })),
            CommandState::Status => Ok(Command::Status),
            CommandState::Help { topic } => Ok(Command::Help(HelpCommand { topic })),
            CommandState::Hold { .. } => Err(ErrMode::Backtrack(GrammarError::unexpected(
                "hold arguments",
                None,
            ))),
            CommandState::Step { action: None } => Err(ErrMode::Backtrack(
                GrammarError::unexpected("step argument", None),
            )),
            CommandState::Plan { subcommand: None } => Err(ErrMode::Backtrack(
                GrammarError::unexpected("plan subcommand", None),
            )),
        }
    }
}

fn expect_kind<'src, 'slice>(
    kind: TokenKind,
    label: &'static str,
) -> impl Parser<Input<'src, 'slice>, Token<'src>, ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    move |input: &mut Input<'src, 'slice>| match input.split_first() {
        Some((token, rest)) if token.kind == kind => {
            *input = rest;
            Ok(token.clone())
        }
        Some((token, _)) => Err(ErrMode::Backtrack(GrammarError::unexpected(
            label,
            Some(token),
        ))),
        None => Err(ErrMode::Backtrack(GrammarError::unexpected(label, None))),
    }
}

fn parse_integer<'a>(token: &Token<'a>) -> Result<u32, GrammarError<'a>> {
    token
        .lexeme
        .parse::<u32>()
        .map_err(|_| GrammarError::invalid_integer(token))
}

fn parse_keys<'a>(token: &Token<'a>) -> Result<KeySet, GrammarError<'a>> {
    KeySet::from_labels(token.lexeme).map_err(|_| GrammarError::invalid_keys(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyId;

    fn parse_ok(input: &str) -> Command<'_> {
        parse(input).expect("command should parse")
    }

    #[test]
    fn parses_hold_with_keys_and_steps() {
        match parse_ok("hold qw 12") {
            Command::Hold(HoldCommand { keys, steps }) => {
                assert!(keys.is_pressed(KeyId::Q));
                assert!(keys.is_pressed(KeyId::W));
                assert!(!keys.is_pressed(KeyId::O));
                assert_eq!(steps, 12);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_hold_none_as_coasting() {
        match parse_ok("hold none 4") {
            Command::Hold(HoldCommand { keys, steps }) => {
                assert!(keys.is_idle());
                assert_eq!(steps, 4);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_hold_with_unknown_keys() {
        match parse("hold xz 3") {
            Err(ParseError::Grammar(err)) => {
                assert!(matches!(err.kind, GrammarErrorKind::InvalidKeys { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_hold_missing_step_count() {
        match parse("hold qw") {
            Err(ParseError::Grammar(err)) => {
                assert!(matches!(
                    err.kind,
                    GrammarErrorKind::UnexpectedEnd {
                        expected: "step count"
                    }
                ));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parses_step_variants() {
        assert_eq!(parse_ok("step"), Command::Step(StepCommand::Once));
        assert_eq!(parse_ok("step all"), Command::Step(StepCommand::All));
        assert_eq!(
            parse_ok("step count=25"),
            Command::Step(StepCommand::Count(25))
        );
    }

    #[test]
    fn parses_plan_subcommands() {
        assert_eq!(parse_ok("plan show"), Command::Plan(PlanCommand::Show));
        assert_eq!(
            parse_ok("plan consolidate"),
            Command::Plan(PlanCommand::Consolidate)
        );
        assert_eq!(parse_ok("plan reset"), Command::Plan(PlanCommand::Reset));
        assert_eq!(parse_ok("plan clear"), Command::Plan(PlanCommand::Clear));
    }

    #[test]
    fn plan_without_subcommand_is_rejected() {
        match parse("plan") {
            Err(ParseError::Grammar(err)) => {
                assert!(matches!(
                    err.kind,
                    GrammarErrorKind::UnexpectedEnd { expected: "show" }
                ));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parses_status() {
        assert_eq!(parse_ok("status"), Command::Status);
    }

    #[test]
    fn parses_help_topic() {
        assert_eq!(
            parse_ok("help hold"),
            Command::Help(HelpCommand {
                topic: Some("hold"),
            })
        );
    }

    #[test]
    fn rejects_invalid_token() {
        match parse("hold qw 3$") {
            Err(ParseError::Grammar(err)) => {
                assert!(matches!(err.kind, GrammarErrorKind::InvalidToken { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn supports_case_insensitive_keywords() {
        match parse_ok("HoLd QP 3") {
            Command::Hold(HoldCommand { keys, steps }) => {
                assert!(keys.is_pressed(KeyId::Q));
                assert!(keys.is_pressed(KeyId::P));
                assert_eq!(steps, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(parse_ok("StEp AlL"), Command::Step(StepCommand::All));
    }

    #[test]
    fn lexer_emits_error_token_for_unknown_symbol() {
        let tokens = lex("step all$").expect("lexing should succeed");
        let last = tokens.last().expect("expected at least one token");
        assert_eq!(last.kind, TokenKind::Error);
        assert_eq!(last.lexeme, "$");
    }

    #[test]
    fn trailing_tokens_after_a_command_are_rejected() {
        match parse("status now") {
            Err(ParseError::Grammar(err)) => {
                assert!(matches!(
                    err.kind,
                    GrammarErrorKind::UnexpectedToken {
                        expected: "end of command",
                        ..
                    }
                ));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
