//! Minimal behavior tree: conditions and actions composed with sequences,
//! selectors and inverters.
//!
//! Every node completes within a single tick; there is no `Running` status
//! because an AI decision is made in one call.

/// Result of evaluating a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
        }
    }
}

/// A node evaluated against a blackboard `C`.
pub trait Behavior<C>: Send + Sync {
    fn tick(&self, ctx: &mut C) -> Status;
}

pub type Node<C> = Box<dyn Behavior<C>>;

impl<C> Behavior<C> for Box<dyn Behavior<C>> {
    #[inline]
    fn tick(&self, ctx: &mut C) -> Status {
        (**self).tick(ctx)
    }
}

/// Runs children in order and stops at the first failure (logical AND).
pub struct Sequence<C> {
    children: Vec<Node<C>>,
}

impl<C> Sequence<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self { children }
    }
}

impl<C> Behavior<C> for Sequence<C> {
    fn tick(&self, ctx: &mut C) -> Status {
        for child in &self.children {
            if child.tick(ctx) == Status::Failure {
                return Status::Failure;
            }
        }
        Status::Success
    }
}

/// Runs children in order and stops at the first success (logical OR).
pub struct Selector<C> {
    children: Vec<Node<C>>,
}

impl<C> Selector<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self { children }
    }
}

impl<C> Behavior<C> for Selector<C> {
    fn tick(&self, ctx: &mut C) -> Status {
        for child in &self.children {
            if child.tick(ctx).is_success() {
                return Status::Success;
            }
        }
        Status::Failure
    }
}

pub struct Inverter<C> {
    child: Node<C>,
}

impl<C> Inverter<C> {
    pub fn new(child: Node<C>) -> Self {
        Self { child }
    }
}

impl<C> Behavior<C> for Inverter<C> {
    fn tick(&self, ctx: &mut C) -> Status {
        self.child.tick(ctx).invert()
    }
}

#[inline]
pub fn sequence<C: 'static>(children: Vec<Node<C>>) -> Node<C> {
    Box::new(Sequence::new(children))
}

#[inline]
pub fn selector<C: 'static>(children: Vec<Node<C>>) -> Node<C> {
    Box::new(Selector::new(children))
}

#[inline]
pub fn inverter<C: 'static>(child: Node<C>) -> Node<C> {
    Box::new(Inverter::new(child))
}
