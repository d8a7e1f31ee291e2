//! Per-node event handlers and bubbling dispatch.
//!
//! Each node keeps at most one active handler per event name. `off` retires
//! the handler instead of dropping it. `handle` fires the handler on the
//! node, then walks the ancestor chain one parent at a time until a handler
//! returns [`Propagation::Stop`] or the root has been visited. Nodes without
//! a handler are visited but never block the walk.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, instrument, trace};

use crate::domain::arena::{Document, NodeId};
use crate::domain::error::DomainResult;

/// What a handler asks the dispatcher to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// `false` stops bubbling, `true` continues.
impl From<bool> for Propagation {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Propagation::Continue
        } else {
            Propagation::Stop
        }
    }
}

/// A handler with no opinion lets the event bubble on.
impl From<()> for Propagation {
    fn from(_: ()) -> Self {
        Propagation::Continue
    }
}

/// Shared so a handler can be cloned out of its table before it runs.
pub type Handler = Rc<dyn Fn(&mut HandlerContext<'_>) -> Propagation>;

/// Wrap a closure returning anything convertible into [`Propagation`].
pub fn handler<F, R>(f: F) -> Handler
where
    F: Fn(&mut HandlerContext<'_>) -> R + 'static,
    R: Into<Propagation>,
{
    Rc::new(move |ctx: &mut HandlerContext<'_>| -> Propagation { f(ctx).into() })
}

/// Execution context passed to every handler invocation.
///
/// `node()` is the node the handler is registered on, which differs from
/// `target()` once the event has bubbled past the node it was handled on.
pub struct HandlerContext<'a> {
    document: &'a mut Document,
    node: NodeId,
    target: NodeId,
    event: &'a str,
}

impl<'a> HandlerContext<'a> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn event(&self) -> &str {
        self.event
    }

    pub fn tag(&self) -> &str {
        self.document.tag(self.node).unwrap_or_default()
    }

    pub fn document(&self) -> &Document {
        &*self.document
    }

    /// Mutations are visible to handlers further up the chain; the chain itself is fixed.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.document
    }
}

/// Active and retired handlers of one node. An event name is never in both.
#[derive(Clone, Default)]
pub struct HandlerTable {
    active: HashMap<String, Handler>,
    inactive: HashMap<String, Handler>,
}

impl HandlerTable {
    /// Register `handler` for `event`, superseding any active or retired one.
    /// Returns the handler it replaced, if one was active.
    pub fn on(&mut self, event: impl Into<String>, handler: Handler) -> Option<Handler> {
        let event = event.into();
        self.inactive.remove(&event);
        self.active.insert(event, handler)
    }

    /// Retire the active handler for `event`. No-op (returns false) when there is none.
    pub fn off(&mut self, event: &str) -> bool {
        match self.active.remove(event) {
            Some(h) => {
                self.inactive.insert(event.to_string(), h);
                true
            }
            None => false,
        }
    }

    /// Move a retired handler back to active.
    pub fn reactivate(&mut self, event: &str) -> bool {
        match self.inactive.remove(event) {
            Some(h) => {
                self.active.insert(event.to_string(), h);
                true
            }
            None => false,
        }
    }

    pub fn active(&self, event: &str) -> Option<&Handler> {
        self.active.get(event)
    }

    pub fn is_active(&self, event: &str) -> bool {
        self.active.contains_key(event)
    }

    pub fn is_retired(&self, event: &str) -> bool {
        self.inactive.contains_key(event)
    }

    pub fn active_events(&self) -> Vec<&str> {
        sorted_keys(&self.active)
    }

    pub fn retired_events(&self) -> Vec<&str> {
        sorted_keys(&self.inactive)
    }
}

fn sorted_keys(map: &HashMap<String, Handler>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("active", &self.active_events())
            .field("inactive", &self.retired_events())
            .finish()
    }
}

/// Outcome of one `handle` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub event: String,
    /// Node the event was handled on
    pub target: NodeId,
    /// Every node the dispatch walked through, target first
    pub visited: Vec<NodeId>,
    /// Nodes whose handler ran, in invocation order
    pub invoked: Vec<NodeId>,
    /// Node whose handler returned [`Propagation::Stop`]
    pub stopped_at: Option<NodeId>,
}

impl DispatchReport {
    pub fn stopped(&self) -> bool {
        self.stopped_at.is_some()
    }
}

impl Document {
    /// Register a closure as the active handler for `event` on `node`.
    pub fn on<F, R>(&mut self, node: NodeId, event: impl Into<String>, f: F) -> DomainResult<()>
    where
        F: Fn(&mut HandlerContext<'_>) -> R + 'static,
        R: Into<Propagation>,
    {
        self.on_handler(node, event, handler(f))
    }

    pub fn on_handler(
        &mut self,
        node: NodeId,
        event: impl Into<String>,
        handler: Handler,
    ) -> DomainResult<()> {
        let event = event.into();
        debug!(?node, %event, "registering handler");
        self.get_mut(node)?.handlers.on(event, handler);
        Ok(())
    }

    /// Retire the active handler for `event` on `node`; returns whether one was active.
    pub fn off(&mut self, node: NodeId, event: &str) -> DomainResult<bool> {
        let retired = self.get_mut(node)?.handlers.off(event);
        debug!(?node, event, retired, "off");
        Ok(retired)
    }

    pub fn reactivate(&mut self, node: NodeId, event: &str) -> DomainResult<bool> {
        Ok(self.get_mut(node)?.handlers.reactivate(event))
    }

    /// Dispatch `event` on `node` and bubble it towards the root.
    ///
    /// The ancestor chain is captured before the first handler runs. Each
    /// step looks up the node's handler at the moment it is reached, so a
    /// handler retired by an earlier handler in the same dispatch is skipped.
    #[instrument(level = "debug", skip(self))]
    pub fn handle(&mut self, node: NodeId, event: &str) -> DomainResult<DispatchReport> {
        self.get(node)?;
        let mut chain = vec![node];
        chain.extend(self.ancestors(node));

        let mut report = DispatchReport {
            event: event.to_string(),
            target: node,
            visited: Vec::with_capacity(chain.len()),
            invoked: Vec::new(),
            stopped_at: None,
        };

        for current in chain {
            report.visited.push(current);
            let Some(handler) = self.get(current)?.handlers.active(event).cloned() else {
                trace!(?current, "no handler, bubbling on");
                continue;
            };

            let mut ctx = HandlerContext {
                document: &mut *self,
                node: current,
                target: node,
                event,
            };
            let outcome = handler(&mut ctx);
            report.invoked.push(current);
            trace!(?current, ?outcome, "handler ran");

            if outcome == Propagation::Stop {
                report.stopped_at = Some(current);
                break;
            }
        }

        debug!(
            visited = report.visited.len(),
            invoked = report.invoked.len(),
            stopped = report.stopped(),
            "dispatch complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::NodeData;
    use std::cell::RefCell;

    /// root -> a -> b -> c
    fn chain() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let mut insert = |tag: &str, parent| {
            doc.insert_node(
                NodeData {
                    tag: tag.to_string(),
                    contents: None,
                },
                parent,
            )
            .unwrap()
        };
        let root = insert("html", None);
        let a = insert("body", Some(root));
        let b = insert("div", Some(a));
        let c = insert("p", Some(b));
        (doc, root, a, b, c)
    }

    fn recorder(log: &Rc<RefCell<Vec<String>>>, result: bool) -> Handler {
        let log = Rc::clone(log);
        handler(move |ctx: &mut HandlerContext<'_>| {
            log.borrow_mut().push(ctx.tag().to_string());
            result
        })
    }

    #[test]
    fn given_handlers_on_a_and_c_when_handling_on_c_then_fires_c_then_a() {
        let (mut doc, root, a, b, c) = chain();
        let log = Rc::new(RefCell::new(Vec::new()));
        doc.on_handler(a, "e", recorder(&log, true)).unwrap();
        doc.on_handler(c, "e", recorder(&log, true)).unwrap();

        let report = doc.handle(c, "e").unwrap();

        assert_eq!(*log.borrow(), vec!["p", "body"]);
        assert_eq!(report.invoked, vec![c, a]);
        assert_eq!(report.visited, vec![c, b, a, root]);
        assert!(!report.stopped());
    }

    #[test]
    fn given_handler_returning_false_when_handling_then_stops_bubbling() {
        let (mut doc, _, a, _, c) = chain();
        let log = Rc::new(RefCell::new(Vec::new()));
        doc.on_handler(a, "e", recorder(&log, true)).unwrap();
        doc.on_handler(c, "e", recorder(&log, false)).unwrap();

        let report = doc.handle(c, "e").unwrap();

        assert_eq!(*log.borrow(), vec!["p"]);
        assert_eq!(report.stopped_at, Some(c));
        assert_eq!(report.visited, vec![c]);
    }

    #[test]
    fn given_unit_returning_handler_when_handling_then_continues() {
        let (mut doc, root, _, _, c) = chain();
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        doc.on(c, "e", |_ctx: &mut HandlerContext<'_>| {}).unwrap();
        doc.on(root, "e", move |_ctx: &mut HandlerContext<'_>| {
            *h.borrow_mut() += 1;
        })
        .unwrap();

        doc.handle(c, "e").unwrap();

        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn given_ancestor_handler_when_bubbling_then_context_is_the_ancestor() {
        let (mut doc, _, a, _, c) = chain();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for node in [a, c] {
            let seen = Rc::clone(&seen);
            doc.on(node, "click", move |ctx: &mut HandlerContext<'_>| {
                seen.borrow_mut().push((ctx.node(), ctx.target()));
                true
            })
            .unwrap();
        }

        doc.handle(c, "click").unwrap();

        assert_eq!(*seen.borrow(), vec![(c, c), (a, c)]);
    }

    #[test]
    fn given_on_then_off_twice_when_inspecting_then_exactly_one_retired() {
        let (mut doc, _, _, _, c) = chain();
        doc.on(c, "e", |_ctx: &mut HandlerContext<'_>| true).unwrap();

        assert!(doc.off(c, "e").unwrap());
        assert!(!doc.off(c, "e").unwrap());

        let table = &doc.get(c).unwrap().handlers;
        assert_eq!(table.retired_events(), vec!["e"]);
        assert!(table.active_events().is_empty());
    }

    #[test]
    fn given_retired_handler_when_registering_again_then_retirement_cleared() {
        let mut table = HandlerTable::default();
        table.on("e", handler(|_ctx: &mut HandlerContext<'_>| true));
        table.off("e");

        table.on("e", handler(|_ctx: &mut HandlerContext<'_>| false));

        assert!(table.is_active("e"));
        assert!(!table.is_retired("e"));
    }

    #[test]
    fn given_retired_handler_when_reactivating_then_fires_again() {
        let (mut doc, _, _, _, c) = chain();
        let log = Rc::new(RefCell::new(Vec::new()));
        doc.on_handler(c, "e", recorder(&log, true)).unwrap();
        doc.off(c, "e").unwrap();

        assert!(doc.reactivate(c, "e").unwrap());
        doc.handle(c, "e").unwrap();

        assert_eq!(*log.borrow(), vec!["p"]);
        assert!(!doc.reactivate(c, "e").unwrap());
    }

    #[test]
    fn given_handler_retiring_ancestor_when_bubbling_then_ancestor_skipped() {
        let (mut doc, _, a, _, c) = chain();
        let log = Rc::new(RefCell::new(Vec::new()));
        doc.on_handler(a, "e", recorder(&log, true)).unwrap();
        doc.on(c, "e", move |ctx: &mut HandlerContext<'_>| {
            let _ = ctx.document_mut().off(a, "e");
            true
        })
        .unwrap();

        let report = doc.handle(c, "e").unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(report.invoked, vec![c]);
        assert_eq!(report.visited.len(), 4);
    }

    #[test]
    fn given_no_handlers_when_handling_then_walks_to_root() {
        let (mut doc, root, a, b, c) = chain();

        let report = doc.handle(c, "missing").unwrap();

        assert_eq!(report.visited, vec![c, b, a, root]);
        assert!(report.invoked.is_empty());
    }
}
