//! Text command parsing.
//!
//! Channel messages addressed to the bot start with a `!w` keyword. The
//! parser turns them into typed [`Command`] values so the dispatcher and
//! the core never match on strings. Keywords are case-sensitive; arguments
//! are whitespace-delimited.
//!
//! Surface:
//!
//! ```text
//! !wadd <URL> [@handle ...]        queue a review request
//! !w                               list the queue
//! !wdone <N | #N | task_id>        remove a finished request
//! !wassign <ref> <@handle ...>     replace a request's assignees
//! !wreminder set <cron expr>       set this channel's reminder schedule
//! !wreminder [show]                show the schedule
//! !wreminder off                   disable without discarding
//! !wreminder remove                delete the schedule
//! !whelp                           usage summary
//! ```

/// A parsed bot command with its typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Queue a review request, optionally pre-assigned.
    Add {
        /// Review request URL as submitted.
        url: String,
        /// Reviewer handles, possibly empty.
        assignees: Vec<String>,
    },
    /// List the channel queue.
    List,
    /// Remove a finished request by reference.
    Done {
        /// Sequence number (`N` / `#N`) or literal task id.
        reference: String,
    },
    /// Replace a request's assignee set.
    Assign {
        /// Sequence number (`N` / `#N`) or literal task id.
        reference: String,
        /// Replacement handles, at least one.
        assignees: Vec<String>,
    },
    /// Set this channel's reminder schedule.
    ReminderSet {
        /// 5-field cron expression (remaining tokens joined).
        expr: String,
    },
    /// Show this channel's reminder configuration.
    ReminderShow,
    /// Disable the reminder without discarding its schedule.
    ReminderOff,
    /// Delete the reminder configuration.
    ReminderRemove,
    /// Usage summary.
    Help,
}

/// Malformed invocation of a recognized keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// `!wadd` without a URL.
    MissingUrl,
    /// `!wdone` / `!wassign` without a reference.
    MissingReference,
    /// `!wassign` without any handle.
    MissingAssignees,
    /// A token where a `@handle` was expected.
    BadHandle(String),
    /// `!wreminder set` without an expression.
    MissingSchedule,
    /// `!wreminder` with an unrecognized action.
    UnknownReminderAction(String),
}

impl UsageError {
    /// One-line usage hint for the reply.
    #[must_use]
    pub fn usage(&self) -> String {
        match self {
            Self::MissingUrl => "usage: `!wadd <URL> [@handle ...]`".into(),
            Self::MissingReference => "usage: reference a task by `N`, `#N`, or its id".into(),
            Self::MissingAssignees => "usage: `!wassign <ref> <@handle ...>`".into(),
            Self::BadHandle(token) => {
                format!("`{token}` is not a handle; handles start with `@`")
            }
            Self::MissingSchedule => {
                "usage: `!wreminder set <minute hour day month weekday>`".into()
            }
            Self::UnknownReminderAction(action) => {
                format!("unknown reminder action `{action}`; try `set`, `show`, `off`, `remove`")
            }
        }
    }
}

/// Parse a channel message.
///
/// Returns `None` for messages not addressed to the bot, `Some(Err(_))`
/// for malformed invocations of a recognized keyword, and
/// `Some(Ok(command))` otherwise.
#[must_use]
pub fn parse(text: &str) -> Option<std::result::Result<Command, UsageError>> {
    let mut tokens = text.split_whitespace();
    let keyword = tokens.next()?;
    let args: Vec<&str> = tokens.collect();

    match keyword {
        "!w" if args.is_empty() => Some(Ok(Command::List)),
        "!wadd" => Some(parse_add(&args)),
        "!wdone" => Some(parse_done(&args)),
        "!wassign" => Some(parse_assign(&args)),
        "!wreminder" => Some(parse_reminder(&args)),
        "!whelp" => Some(Ok(Command::Help)),
        _ => None,
    }
}

fn parse_add(args: &[&str]) -> std::result::Result<Command, UsageError> {
    let Some((url, handles)) = args.split_first() else {
        return Err(UsageError::MissingUrl);
    };
    let assignees = parse_handles(handles)?;
    Ok(Command::Add {
        url: (*url).to_owned(),
        assignees,
    })
}

fn parse_done(args: &[&str]) -> std::result::Result<Command, UsageError> {
    match args {
        [reference] => Ok(Command::Done {
            reference: (*reference).to_owned(),
        }),
        _ => Err(UsageError::MissingReference),
    }
}

fn parse_assign(args: &[&str]) -> std::result::Result<Command, UsageError> {
    let Some((reference, handles)) = args.split_first() else {
        return Err(UsageError::MissingReference);
    };
    if handles.is_empty() {
        return Err(UsageError::MissingAssignees);
    }
    let assignees = parse_handles(handles)?;
    Ok(Command::Assign {
        reference: (*reference).to_owned(),
        assignees,
    })
}

fn parse_reminder(args: &[&str]) -> std::result::Result<Command, UsageError> {
    match args {
        [] | ["show"] => Ok(Command::ReminderShow),
        ["off"] => Ok(Command::ReminderOff),
        ["remove"] => Ok(Command::ReminderRemove),
        ["set", rest @ ..] => {
            if rest.is_empty() {
                return Err(UsageError::MissingSchedule);
            }
            Ok(Command::ReminderSet {
                expr: rest.join(" "),
            })
        }
        [action, ..] => Err(UsageError::UnknownReminderAction((*action).to_owned())),
    }
}

/// Validate and collect `@handle` tokens.
///
/// Accepts both plain `@name` handles and Slack mention syntax `<@U…>`.
fn parse_handles(tokens: &[&str]) -> std::result::Result<Vec<String>, UsageError> {
    tokens
        .iter()
        .map(|token| {
            if is_handle(token) {
                Ok((*token).to_owned())
            } else {
                Err(UsageError::BadHandle((*token).to_owned()))
            }
        })
        .collect()
}

fn is_handle(token: &str) -> bool {
    (token.starts_with('@') && token.len() > 1)
        || (token.starts_with("<@") && token.ends_with('>') && token.len() > 3)
}
