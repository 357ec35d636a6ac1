//! Shared REPL grammar specification expressed as an applicative AST.
//!
//! The parser and completion engine interpret the same structure, ensuring
//! keywords, defaults, and value layouts stay in sync.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandTag {
    Hold,
    Step,
    Plan,
    Status,
    Help,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubcommandTag {
    PlanShow,
    PlanConsolidate,
    PlanReset,
    PlanClear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceTag {
    StepOnce,
    StepAll,
    StepCount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueSpec {
    None,
    /// Key letters or `none`, parsed into a key set.
    KeySet,
    /// Bare step count integer.
    StepCount,
    IntegerAssignment {
        suggestions: &'static [&'static str],
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelpTopics {
    None,
    Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub tag: CommandTag,
    pub grammar: &'static Node,
    pub help: HelpTopics,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    End,
    /// Fixed positional arguments, each consumed in order.
    Arguments(&'static [ValueSpec]),
    OptionalChoice {
        choices: &'static [ChoiceBranch],
        default: Option<DefaultChoice>,
    },
    Subcommands(&'static [SubcommandBranch]),
    Topic {
        topics: HelpTopics,
        next: &'static Node,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChoiceBranch {
    pub keyword: &'static str,
    pub tag: ChoiceTag,
    pub value: ValueSpec,
    pub next: &'static Node,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultChoice {
    pub tag: ChoiceTag,
    pub next: &'static Node,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubcommandBranch {
    pub name: &'static str,
    pub tag: SubcommandTag,
    pub grammar: &'static Node,
}

const END: Node = Node::End;

const HOLD_ARGS: [ValueSpec; 2] = [ValueSpec::KeySet, ValueSpec::StepCount];

const HOLD_GRAMMAR: Node = Node::Arguments(&HOLD_ARGS);

const STEP_COUNT_SUGGESTIONS: [&str; 3] = ["count=5", "count=10", "count=25"];

const STEP_CHOICES: [ChoiceBranch; 2] = [
    ChoiceBranch {
        keyword: "all",
        tag: ChoiceTag::StepAll,
        value: ValueSpec::None,
        next: &END,
    },
    ChoiceBranch {
        keyword: "count",
        tag: ChoiceTag::StepCount,
        value: ValueSpec::IntegerAssignment {
            suggestions: &STEP_COUNT_SUGGESTIONS,
        },
        next: &END,
    },
];

const STEP_GRAMMAR: Node = Node::OptionalChoice {
    choices: &STEP_CHOICES,
    default: Some(DefaultChoice {
        tag: ChoiceTag::StepOnce,
        next: &END,
    }),
};

const PLAN_SUBCOMMANDS: [SubcommandBranch; 4] = [
    SubcommandBranch {
        name: "show",
        tag: SubcommandTag::PlanShow,
        grammar: &END,
    },
    SubcommandBranch {
        name: "consolidate",
        tag: SubcommandTag::PlanConsolidate,
        grammar: &END,
    },
    SubcommandBranch {
        name: "reset",
        tag: SubcommandTag::PlanReset,
        grammar: &END,
    },
    SubcommandBranch {
        name: "clear",
        tag: SubcommandTag::PlanClear,
        grammar: &END,
    },
];

const PLAN_GRAMMAR: Node = Node::Subcommands(&PLAN_SUBCOMMANDS);

const HELP_GRAMMAR: Node = Node::Topic {
    topics: HelpTopics::Commands,
    next: &END,
};

const COMMANDS: [CommandSpec; 5] = [
    CommandSpec {
        name: "hold",
        tag: CommandTag::Hold,
        grammar: &HOLD_GRAMMAR,
        help: HelpTopics::None,
    },
    CommandSpec {
        name: "step",
        tag: CommandTag::Step,
        grammar: &STEP_GRAMMAR,
        help: HelpTopics::None,
    },
    CommandSpec {
        name: "plan",
        tag: CommandTag::Plan,
        grammar: &PLAN_GRAMMAR,
        help: HelpTopics::None,
    },
    CommandSpec {
        name: "status",
        tag: CommandTag::Status,
        grammar: &END,
        help: HelpTopics::None,
    },
    CommandSpec {
        name: "help",
        tag: CommandTag::Help,
        grammar: &HELP_GRAMMAR,
        help: HelpTopics::Commands,
    },
];

/// Returns the full command catalog.
#[must_use]
pub const fn commands() -> &'static [CommandSpec] {
    &COMMANDS
}

/// Looks up a command by its tag.
#[must_use]
pub fn command(tag: CommandTag) -> &'static CommandSpec {
    match tag {
        CommandTag::Hold => &COMMANDS[0],
        CommandTag::Step => &COMMANDS[1],
        CommandTag::Plan => &COMMANDS[2],
        CommandTag::Status => &COMMANDS[3],
        CommandTag::Help => &COMMANDS[4],
    }
}

/// Finds a command by name (case insensitive).
#[must_use]
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}
