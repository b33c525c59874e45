//! The request vocabulary.
//!
//! A client request is a list of argument tokens:
//!
//! ```text
//! <root|focused|last> [-p | --parent | -c <i> | --child <i>]... <command> [args]
//! ```
//!
//! The first part selects a desktop (a [`Target`]), the second names one
//! [`Command`] to apply to it.  [`Request::parse`] only checks the syntax;
//! resolving the target against the tree happens in [`Target::resolve`].

use crate::traits::WindowManager;
use crate::tree::{DesktopTree, NodeId, TreeError};

/// Where desktop selection starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Root,
    Focused,
    Last,
}

/// One navigation step applied after the [`Selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Parent,
    /// Signed so that negative indices resolve to "out-of-bounds".
    Child(i64),
}

/// A desktop selector followed by navigation steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub selector: Selector,
    pub steps: Vec<Step>,
}

/// Sibling argument of `--swap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapTarget {
    Next,
    Prev,
    Index(i64),
}

impl SwapTarget {
    pub fn parse(s: &str) -> Result<Self, CommandError> {
        match s {
            "next" => Ok(SwapTarget::Next),
            "prev" => Ok(SwapTarget::Prev),
            other => other
                .parse()
                .map(SwapTarget::Index)
                .map_err(|_| CommandError::InvalidSibling),
        }
    }
}

/// Every operation a client can apply to the selected desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Focus,
    FocusNext,
    FocusPrev,
    AddChild,
    Remove,
    /// Report an attribute value (empty when unset).
    GetAttr(String),
    SetAttr(String, String),
    UnsetAttr(String),
    /// Move the focused window onto the selected desktop.
    MoveWindow,
    /// Raw sibling argument.  Checked against the selected desktop first,
    /// so swapping the root reports that before a bad or missing sibling.
    Swap(Option<String>),
    /// Report the index of the focused child.
    FocusedChild,
    /// Report the number of children.
    ChildCount,
    /// Render the desktop once with the named formatter.
    Print(String),
    /// Keep the connection open and push a rendering every tick.
    Subscribe(String),
}

/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub target: Target,
    pub command: Command,
    /// Tokens left over after the command.
    pub extra: Vec<String>,
}

/// Errors reported to the client with status `1`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("no desktop selector provided")]
    MissingSelector,
    #[error("invalid initial desktop selector")]
    InvalidSelector,
    #[error("no child index provided")]
    MissingChildIndex,
    #[error("invalid child index")]
    InvalidChildIndex,
    #[error("child index out-of-bounds")]
    ChildOutOfBounds,
    #[error("no matching desktop")]
    NoMatchingDesktop,
    #[error("no command provided")]
    MissingCommand,
    #[error("invalid command")]
    InvalidCommand,
    #[error("no attribute name provided")]
    MissingAttrName,
    #[error("no sibling provided")]
    MissingSibling,
    #[error("invalid sibling selector")]
    InvalidSibling,
    #[error("no formatter provided")]
    MissingFormatter,
    #[error("unknown formatter")]
    UnknownFormatter,
    #[error("warning: extra arguments '{0}' ignored")]
    ExtraArguments(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Cursor over the request tokens.
struct Args<'a> {
    rest: &'a [String],
}

impl<'a> Args<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.rest.first().map(String::as_str)
    }

    fn next(&mut self) -> Option<&'a str> {
        let (first, rest) = self.rest.split_first()?;
        self.rest = rest;
        Some(first.as_str())
    }

    fn require(&mut self, err: CommandError) -> Result<String, CommandError> {
        self.next().map(str::to_string).ok_or(err)
    }
}

impl Request {
    /// Parse the tokens of one request.
    pub fn parse(tokens: &[String]) -> Result<Self, CommandError> {
        let mut args = Args { rest: tokens };
        let target = parse_target(&mut args)?;
        let command = parse_command(&mut args)?;
        Ok(Self {
            target,
            command,
            extra: args.rest.to_vec(),
        })
    }
}

fn parse_target(args: &mut Args<'_>) -> Result<Target, CommandError> {
    let selector = match args.next().ok_or(CommandError::MissingSelector)? {
        "root" => Selector::Root,
        "focused" => Selector::Focused,
        "last" => Selector::Last,
        _ => return Err(CommandError::InvalidSelector),
    };

    let mut steps = Vec::new();
    loop {
        match args.peek() {
            Some("-p" | "--parent") => {
                args.next();
                steps.push(Step::Parent);
            }
            Some("-c" | "--child") => {
                args.next();
                let index = args
                    .next()
                    .ok_or(CommandError::MissingChildIndex)?
                    .parse()
                    .map_err(|_| CommandError::InvalidChildIndex)?;
                steps.push(Step::Child(index));
            }
            _ => return Ok(Target { selector, steps }),
        }
    }
}

fn parse_command(args: &mut Args<'_>) -> Result<Command, CommandError> {
    let command = match args.next().ok_or(CommandError::MissingCommand)? {
        "-f" | "--focus" => Command::Focus,
        "-n" | "--next" => Command::FocusNext,
        "-N" | "--prev" => Command::FocusPrev,
        "-a" | "--add" => Command::AddChild,
        "-r" | "--remove" => Command::Remove,
        "-A" | "--attrib" => {
            let name = args.require(CommandError::MissingAttrName)?;
            match args.next() {
                Some(value) => Command::SetAttr(name, value.to_string()),
                None => Command::GetAttr(name),
            }
        }
        "-u" | "--unset" => Command::UnsetAttr(args.require(CommandError::MissingAttrName)?),
        "-w" | "--move-window" => Command::MoveWindow,
        "-s" | "--swap" => Command::Swap(args.next().map(str::to_string)),
        "-F" | "--focused-child" => Command::FocusedChild,
        "-C" | "--child-count" => Command::ChildCount,
        "-P" | "--print" => Command::Print(args.require(CommandError::MissingFormatter)?),
        "-S" | "--subscribe" => Command::Subscribe(args.require(CommandError::MissingFormatter)?),
        _ => return Err(CommandError::InvalidCommand),
    };
    Ok(command)
}

impl Target {
    /// Walk the tree from the selector through every step.
    pub fn resolve<W: WindowManager>(&self, tree: &DesktopTree<W>) -> Result<NodeId, CommandError> {
        let mut node = match self.selector {
            Selector::Root => tree.root(),
            Selector::Focused => tree.focused(),
            Selector::Last => tree.last_focused(),
        };
        for step in &self.steps {
            node = match *step {
                Step::Parent => tree.parent(node).ok_or(CommandError::NoMatchingDesktop)?,
                Step::Child(i) => usize::try_from(i)
                    .ok()
                    .and_then(|i| tree.child(node, i))
                    .ok_or(CommandError::ChildOutOfBounds)?,
            };
        }
        Ok(node)
    }
}

//  Tests
