//! Handlers described on the command line.
//!
//! `1.0.0:click=stop` registers a `click` handler on node `1.0.0` that
//! stops bubbling; `=continue` lets the event bubble on. Every firing is
//! logged and recorded in a shared [`DispatchLog`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::info;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Document, HandlerContext, NodeId, NodePath, Propagation};

/// A node address plus an event name: `1.0.0:click`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerTarget {
    pub path: NodePath,
    pub event: String,
}

impl HandlerTarget {
    pub fn resolve(&self, document: &Document) -> ApplicationResult<NodeId> {
        Ok(document.resolve(&self.path)?)
    }
}

impl fmt::Display for HandlerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.event)
    }
}

impl FromStr for HandlerTarget {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ApplicationError::InvalidHandler {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let (path, event) = s
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected <path>:<event>"))?;
        let event = event.trim();
        if event.is_empty() {
            return Err(invalid("empty event name"));
        }
        Ok(Self {
            path: path.parse()?,
            event: event.to_string(),
        })
    }
}

/// One handler invocation as seen by the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    pub path: NodePath,
    pub tag: String,
    pub event: String,
    pub propagation: Propagation,
}

impl fmt::Display for Firing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.propagation {
            Propagation::Continue => "continue",
            Propagation::Stop => "stop",
        };
        write!(f, "{} on {} ({}) -> {}", self.event, self.tag, self.path, outcome)
    }
}

/// Shared record of handler firings, in order.
#[derive(Debug, Clone, Default)]
pub struct DispatchLog(Rc<RefCell<Vec<Firing>>>);

impl DispatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, firing: Firing) {
        self.0.borrow_mut().push(firing);
    }

    pub fn firings(&self) -> Vec<Firing> {
        self.0.borrow().clone()
    }
}

/// `<path>:<event>=<continue|stop>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedHandler {
    pub target: HandlerTarget,
    pub propagation: Propagation,
}

impl ScriptedHandler {
    /// Register on the addressed node; returns the node it was registered on.
    pub fn register(&self, document: &mut Document, log: &DispatchLog) -> ApplicationResult<NodeId> {
        let node = self.target.resolve(document)?;
        let propagation = self.propagation;
        let log = log.clone();

        document.on(node, self.target.event.clone(), move |ctx: &mut HandlerContext<'_>| {
            info!("handled {} on {}", ctx.event(), ctx.tag());
            let path = ctx.document().path_of(ctx.node()).unwrap_or_default();
            log.record(Firing {
                path,
                tag: ctx.tag().to_string(),
                event: ctx.event().to_string(),
                propagation,
            });
            propagation
        })?;
        Ok(node)
    }
}

impl FromStr for ScriptedHandler {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ApplicationError::InvalidHandler {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let (target, outcome) = match s.rsplit_once('=') {
            Some((target, outcome)) => (target, outcome.trim()),
            None => (s, "continue"),
        };
        let propagation = match outcome.to_ascii_lowercase().as_str() {
            "continue" | "true" => Propagation::Continue,
            "stop" | "false" => Propagation::Stop,
            _ => return Err(invalid("outcome must be continue or stop")),
        };
        Ok(Self {
            target: target.parse()?,
            propagation,
        })
    }
}
