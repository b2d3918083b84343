//! Fine-grained reactive signal system
//!
//! Signals live in an arena owned by a [`ReactiveGraph`] and are addressed by
//! cheap [`Signal<T>`] handles. A signal holds either a literal value or a
//! formula. Formulas are evaluated lazily and cached:
//!
//! - Reading a signal inside a formula registers it as a dependency of that
//!   formula (tracked on an explicit evaluation-context stack, recomputed on
//!   every evaluation).
//! - Writing a signal marks every transitive dependent dirty; the next read
//!   re-evaluates.
//! - Effects observe signals and re-run after writes. Inside a
//!   [`ReactiveGraph::batch`] both invalidation and effects are deferred to a
//!   single pass.
//!
//! ```rust
//! use motif_core::reactive::{ReactiveGraph, SignalValue};
//!
//! let graph = ReactiveGraph::new();
//! let width = graph.create_signal(10.0);
//! let area = graph.create_computed(move |g| Ok(g.get(width)? * g.get(width)?));
//!
//! assert_eq!(graph.get(area).unwrap(), 100.0);
//! graph.set(width, 3.0).unwrap();
//! assert_eq!(graph.get(area).unwrap(), 9.0);
//! ```

use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::{type_name, Any};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{SignalError, SignalResult};
use crate::geometry::Vector2;

new_key_type! {
    /// Unique identifier for a signal
    pub struct SignalId;
    /// Unique identifier for an effect
    pub struct EffectId;
}

/// Subscriber types that can react to signal changes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriberId {
    Signal(SignalId),
    Effect(EffectId),
}

/// A typed reactive signal handle (cheap to copy)
pub struct Signal<T> {
    id: SignalId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Signal<T> {}

impl<T> Hash for Signal<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal").field(&self.id).finish()
    }
}

impl<T> Signal<T> {
    /// Get the signal's internal ID
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Reconstruct a typed handle from a raw id.
    ///
    /// Reading through a handle of the wrong type yields
    /// [`SignalError::TypeMismatch`].
    pub fn from_id(id: SignalId) -> Self {
        Signal {
            id,
            _marker: PhantomData,
        }
    }
}

/// An effect handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.id
    }
}

/// A lazily evaluated signal source
pub type Formula<T> = Rc<dyn Fn(&ReactiveGraph) -> SignalResult<T>>;

/// Normalizes every value written to a signal
pub type Parser<T> = Rc<dyn Fn(T) -> T>;

// =========================================================================
// SIGNAL VALUES
// =========================================================================

/// What can be written into a signal: a literal or a formula
pub enum SignalValue<T> {
    Value(T),
    Formula(Formula<T>),
}

impl<T> SignalValue<T> {
    /// Wrap a closure as a formula
    pub fn formula<F>(formula: F) -> Self
    where
        F: Fn(&ReactiveGraph) -> SignalResult<T> + 'static,
    {
        SignalValue::Formula(Rc::new(formula))
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, SignalValue::Formula(_))
    }

    /// Resolve the value now. Reads performed by a formula are tracked by
    /// whatever evaluation is currently running.
    pub fn evaluate(&self, graph: &ReactiveGraph) -> SignalResult<T>
    where
        T: Clone,
    {
        match self {
            SignalValue::Value(value) => Ok(value.clone()),
            SignalValue::Formula(formula) => formula(graph),
        }
    }

    /// Transform the produced value. Formulas stay lazy.
    pub fn map<U, F>(self, f: F) -> SignalValue<U>
    where
        T: 'static,
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        match self {
            SignalValue::Value(value) => SignalValue::Value(f(value)),
            SignalValue::Formula(formula) => {
                SignalValue::Formula(Rc::new(move |graph: &ReactiveGraph| {
                    formula(graph).map(&f)
                }))
            }
        }
    }
}

impl<T: Clone> Clone for SignalValue<T> {
    fn clone(&self) -> Self {
        match self {
            SignalValue::Value(value) => SignalValue::Value(value.clone()),
            SignalValue::Formula(formula) => SignalValue::Formula(formula.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SignalValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            SignalValue::Formula(_) => f.write_str("Formula(..)"),
        }
    }
}

impl<T> From<T> for SignalValue<T> {
    fn from(value: T) -> Self {
        SignalValue::Value(value)
    }
}

impl From<(f64, f64)> for SignalValue<Vector2> {
    fn from(value: (f64, f64)) -> Self {
        SignalValue::Value(value.into())
    }
}

impl From<[f64; 2]> for SignalValue<Vector2> {
    fn from(value: [f64; 2]) -> Self {
        SignalValue::Value(value.into())
    }
}

impl From<f64> for SignalValue<Vector2> {
    fn from(value: f64) -> Self {
        SignalValue::Value(value.into())
    }
}

/// Creation options for [`ReactiveGraph::create_signal_with`]
pub struct SignalOptions<T> {
    name: Option<String>,
    parser: Option<Parser<T>>,
}

impl<T> Default for SignalOptions<T> {
    fn default() -> Self {
        Self {
            name: None,
            parser: None,
        }
    }
}

impl<T> SignalOptions<T> {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            parser: None,
        }
    }

    /// Normalize every written value, including formula results
    pub fn parser(mut self, parser: impl Fn(T) -> T + 'static) -> Self {
        self.parser = Some(Rc::new(parser));
        self
    }
}

// =========================================================================
// GRAPH STORAGE
// =========================================================================

type AnyValue = Rc<dyn Any>;
type AnyFormula = Rc<dyn Fn(&ReactiveGraph) -> SignalResult<AnyValue>>;
type EffectFn = Rc<RefCell<dyn FnMut(&ReactiveGraph) -> SignalResult<()>>>;
type Dependencies = SmallVec<[SignalId; 4]>;

enum Source {
    Value(AnyValue),
    Formula(AnyFormula),
}

/// Internal signal node storage
struct SignalNode {
    name: Option<String>,
    source: Source,
    /// Last successful formula result
    cached: Option<AnyValue>,
    /// Whether the cached value is stale
    dirty: bool,
    /// Signals read during the last evaluation
    dependencies: Dependencies,
    /// Subscribers to notify on change
    subscribers: SmallVec<[SubscriberId; 4]>,
    /// `Parser<T>` behind `dyn Any`
    parser: Option<Rc<dyn Any>>,
    /// Version counter for change detection
    version: u64,
}

/// Internal effect node storage
struct EffectNode {
    run: EffectFn,
    dependencies: Dependencies,
    dirty: bool,
}

/// Snapshot of graph bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReactiveStats {
    pub signal_count: usize,
    pub effect_count: usize,
    pub dirty_count: usize,
    pub global_version: u64,
}

/// The reactive graph that owns all signals and effects
///
/// The graph is single-threaded and uses interior mutability, so every
/// operation takes `&self`. Formulas receive the graph as their argument and
/// read other signals through it.
pub struct ReactiveGraph {
    signals: RefCell<SlotMap<SignalId, SignalNode>>,
    effects: RefCell<SlotMap<EffectId, EffectNode>>,
    /// Evaluation-context stack. `None` frames suppress tracking.
    tracking: RefCell<Vec<Option<Dependencies>>>,
    /// Signals whose formulas are currently running
    evaluating: RefCell<Vec<SignalId>>,
    /// Pending effects to run
    pending_effects: RefCell<VecDeque<EffectId>>,
    /// Writes whose invalidation is deferred by a batch
    pending_roots: RefCell<Vec<SignalId>>,
    /// Current batch depth (> 0 means we're in a batch)
    batch_depth: Cell<u32>,
    flushing: Cell<bool>,
    /// Global version counter
    global_version: Cell<u64>,
}

impl Default for ReactiveGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveGraph {
    pub fn new() -> Self {
        Self {
            signals: RefCell::new(SlotMap::with_key()),
            effects: RefCell::new(SlotMap::with_key()),
            tracking: RefCell::new(Vec::new()),
            evaluating: RefCell::new(Vec::new()),
            pending_effects: RefCell::new(VecDeque::new()),
            pending_roots: RefCell::new(Vec::new()),
            batch_depth: Cell::new(0),
            flushing: Cell::new(false),
            global_version: Cell::new(0),
        }
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Create a new signal with an initial value
    pub fn create_signal<T: 'static>(&self, initial: T) -> Signal<T> {
        self.create_signal_with(SignalValue::Value(initial), SignalOptions::default())
    }

    /// Create a signal whose value is computed by `formula`
    pub fn create_computed<T, F>(&self, formula: F) -> Signal<T>
    where
        T: 'static,
        F: Fn(&ReactiveGraph) -> SignalResult<T> + 'static,
    {
        self.create_signal_with(SignalValue::formula(formula), SignalOptions::default())
    }

    /// Create a signal from a literal or formula with a name and parser
    pub fn create_signal_with<T: 'static>(
        &self,
        initial: SignalValue<T>,
        options: SignalOptions<T>,
    ) -> Signal<T> {
        let parser = options.parser;
        let source = Self::make_source(initial, parser.clone());
        let id = self.signals.borrow_mut().insert(SignalNode {
            name: options.name,
            source,
            cached: None,
            dirty: true,
            dependencies: SmallVec::new(),
            subscribers: SmallVec::new(),
            parser: parser.map(|p| Rc::new(p) as Rc<dyn Any>),
            version: 0,
        });
        Signal::from_id(id)
    }

    /// Get the current value of a signal
    ///
    /// If called while a formula or effect is running, the signal is recorded
    /// as one of its dependencies. A failing formula returns its error, keeps
    /// its previous cache and stays dirty, so the next read retries.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> SignalResult<T> {
        self.settle();
        self.track(signal.id);
        let value = self.resolve(signal.id)?;
        Self::downcast(signal.id, &value)
    }

    /// Get the current value without tracking it as a dependency
    pub fn get_untracked<T: Clone + 'static>(&self, signal: Signal<T>) -> SignalResult<T> {
        self.untracked(|graph| graph.get(signal))
    }

    /// Write a literal or a formula into a signal
    ///
    /// Every transitive dependent is marked dirty. Effects run afterwards
    /// unless a batch is open.
    pub fn set<T: 'static>(
        &self,
        signal: Signal<T>,
        value: impl Into<SignalValue<T>>,
    ) -> SignalResult<()> {
        let value = value.into();
        let parser = {
            let signals = self.signals.borrow();
            let node = signals
                .get(signal.id)
                .ok_or(SignalError::Disposed(signal.id))?;
            node.parser
                .as_ref()
                .and_then(|p| p.downcast_ref::<Parser<T>>())
                .cloned()
        };
        let is_literal = !value.is_formula();
        let source = Self::make_source(value, parser);
        {
            let mut signals = self.signals.borrow_mut();
            let node = signals
                .get_mut(signal.id)
                .ok_or(SignalError::Disposed(signal.id))?;
            node.source = source;
            node.cached = None;
            node.dirty = true;
            node.version += 1;
        }
        if is_literal {
            self.resubscribe(signal.id, SmallVec::new());
        }
        self.global_version.set(self.global_version.get() + 1);
        self.invalidate(signal.id);
        Ok(())
    }

    /// Update a signal from its current value
    pub fn update<T, F>(&self, signal: Signal<T>, f: F) -> SignalResult<()>
    where
        T: Clone + 'static,
        F: FnOnce(T) -> T,
    {
        let current = self.get_untracked(signal)?;
        self.set(signal, f(current))
    }

    /// Remove a signal. Dependents are invalidated and will fail with
    /// [`SignalError::Disposed`] if they read it again.
    pub fn dispose<T>(&self, signal: Signal<T>) {
        self.dispose_id(signal.id);
    }

    pub fn dispose_id(&self, id: SignalId) {
        if !self.signals.borrow().contains_key(id) {
            return;
        }
        self.propagate(&[id]);
        self.resubscribe(id, SmallVec::new());
        self.signals.borrow_mut().remove(id);
        if self.batch_depth.get() == 0 {
            self.flush_effects();
        }
    }

    pub fn contains(&self, id: SignalId) -> bool {
        self.signals.borrow().contains_key(id)
    }

    /// Whether the next read of a formula signal re-evaluates it
    pub fn is_dirty(&self, id: SignalId) -> bool {
        self.settle();
        self.signals.borrow().get(id).is_some_and(|node| match node.source {
            Source::Value(_) => false,
            Source::Formula(_) => node.dirty,
        })
    }

    /// Get the write version of a signal (for change detection)
    pub fn version(&self, id: SignalId) -> Option<u64> {
        self.signals.borrow().get(id).map(|node| node.version)
    }

    pub fn name(&self, id: SignalId) -> Option<String> {
        self.signals.borrow().get(id).and_then(|node| node.name.clone())
    }

    /// Signals read by the last evaluation of `id`
    pub fn dependencies(&self, id: SignalId) -> Vec<SignalId> {
        self.signals
            .borrow()
            .get(id)
            .map(|node| node.dependencies.to_vec())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> ReactiveStats {
        let signals = self.signals.borrow();
        ReactiveStats {
            signal_count: signals.len(),
            effect_count: self.effects.borrow().len(),
            dirty_count: signals
                .values()
                .filter(|node| node.dirty && matches!(node.source, Source::Formula(_)))
                .count(),
            global_version: self.global_version.get(),
        }
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Create an effect that runs now and after every write to a signal it
    /// read. Errors returned by the effect are logged.
    pub fn create_effect<F>(&self, run: F) -> Effect
    where
        F: FnMut(&ReactiveGraph) -> SignalResult<()> + 'static,
    {
        let id = self.effects.borrow_mut().insert(EffectNode {
            run: Rc::new(RefCell::new(run)),
            dependencies: SmallVec::new(),
            dirty: true,
        });
        self.pending_effects.borrow_mut().push_back(id);
        if self.batch_depth.get() == 0 {
            self.flush_effects();
        }
        Effect { id }
    }

    /// Dispose of an effect, removing it from the graph
    pub fn dispose_effect(&self, effect: Effect) {
        let Some(node) = self.effects.borrow_mut().remove(effect.id) else {
            return;
        };
        let mut signals = self.signals.borrow_mut();
        for dep in &node.dependencies {
            if let Some(sig) = signals.get_mut(*dep) {
                sig.subscribers
                    .retain(|s| *s != SubscriberId::Effect(effect.id));
            }
        }
    }

    // =========================================================================
    // BATCHING & TRACKING
    // =========================================================================

    /// Run `f` as one logical instant: invalidation runs once for all writes
    /// and effects run once at the end.
    pub fn batch<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        self.batch_depth.set(self.batch_depth.get() + 1);
        let result = f(self);
        let depth = self.batch_depth.get().saturating_sub(1);
        self.batch_depth.set(depth);
        if depth == 0 {
            self.settle();
            self.flush_effects();
        }
        result
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth.get() > 0
    }

    /// Run `f` without recording any reads as dependencies
    pub fn untracked<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        self.tracking.borrow_mut().push(None);
        let result = f(self);
        self.tracking.borrow_mut().pop();
        result
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn make_source<T: 'static>(value: SignalValue<T>, parser: Option<Parser<T>>) -> Source {
        match value {
            SignalValue::Value(value) => {
                let value = match &parser {
                    Some(parse) => parse(value),
                    None => value,
                };
                Source::Value(Rc::new(value))
            }
            SignalValue::Formula(formula) => Source::Formula(Rc::new(move |graph: &ReactiveGraph| {
                let value = formula(graph)?;
                let value = match &parser {
                    Some(parse) => parse(value),
                    None => value,
                };
                Ok(Rc::new(value) as AnyValue)
            })),
        }
    }

    fn downcast<T: Clone + 'static>(id: SignalId, value: &AnyValue) -> SignalResult<T> {
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or(SignalError::TypeMismatch {
                id,
                expected: type_name::<T>(),
            })
    }

    /// Record a read into the innermost evaluation context
    fn track(&self, id: SignalId) {
        if let Some(Some(frame)) = self.tracking.borrow_mut().last_mut() {
            if !frame.contains(&id) {
                frame.push(id);
            }
        }
    }

    /// Resolve a signal to its type-erased value, evaluating if needed
    fn resolve(&self, id: SignalId) -> SignalResult<AnyValue> {
        let formula = {
            let signals = self.signals.borrow();
            let node = signals.get(id).ok_or(SignalError::Disposed(id))?;
            match &node.source {
                Source::Value(value) => return Ok(value.clone()),
                Source::Formula(formula) => {
                    if !node.dirty {
                        if let Some(cached) = &node.cached {
                            return Ok(cached.clone());
                        }
                    }
                    formula.clone()
                }
            }
        };

        if self.evaluating.borrow().contains(&id) {
            return Err(SignalError::Cycle(id));
        }

        tracing::trace!(signal = ?id, "evaluating formula");
        self.evaluating.borrow_mut().push(id);
        self.tracking.borrow_mut().push(Some(SmallVec::new()));
        let result = formula(self);
        let deps = self.tracking.borrow_mut().pop().flatten().unwrap_or_default();
        self.evaluating.borrow_mut().pop();

        self.resubscribe(id, deps);

        let mut signals = self.signals.borrow_mut();
        let node = signals.get_mut(id).ok_or(SignalError::Disposed(id))?;
        match result {
            Ok(value) => {
                node.cached = Some(value.clone());
                node.dirty = false;
                Ok(value)
            }
            Err(err) => {
                node.dirty = true;
                Err(err)
            }
        }
    }

    /// Replace the dependency set of a signal
    fn resubscribe(&self, id: SignalId, deps: Dependencies) {
        let mut signals = self.signals.borrow_mut();
        let Some(node) = signals.get_mut(id) else {
            return;
        };
        let old = std::mem::take(&mut node.dependencies);
        let sub = SubscriberId::Signal(id);
        for dep in &old {
            if let Some(dep_node) = signals.get_mut(*dep) {
                dep_node.subscribers.retain(|s| *s != sub);
            }
        }
        let deps: Dependencies = deps.into_iter().filter(|dep| *dep != id).collect();
        for dep in &deps {
            if let Some(dep_node) = signals.get_mut(*dep) {
                if !dep_node.subscribers.contains(&sub) {
                    dep_node.subscribers.push(sub);
                }
            }
        }
        if let Some(node) = signals.get_mut(id) {
            node.dependencies = deps;
        }
    }

    fn invalidate(&self, root: SignalId) {
        if self.batch_depth.get() > 0 {
            self.pending_roots.borrow_mut().push(root);
            return;
        }
        self.propagate(&[root]);
        self.flush_effects();
    }

    /// Apply invalidation deferred by an open batch
    fn settle(&self) {
        if self.pending_roots.borrow().is_empty() {
            return;
        }
        let roots = std::mem::take(&mut *self.pending_roots.borrow_mut());
        self.propagate(&roots);
    }

    /// Mark every transitive subscriber of `roots` dirty in one pass
    fn propagate(&self, roots: &[SignalId]) {
        let mut signals = self.signals.borrow_mut();
        let mut effects = self.effects.borrow_mut();
        let mut pending = self.pending_effects.borrow_mut();

        let mut visited: FxHashSet<SubscriberId> = FxHashSet::default();
        let mut stack: Vec<SubscriberId> = Vec::new();
        for root in roots {
            if let Some(node) = signals.get(*root) {
                stack.extend(node.subscribers.iter().copied());
            }
        }

        while let Some(sub) = stack.pop() {
            if !visited.insert(sub) {
                continue;
            }
            match sub {
                SubscriberId::Signal(id) => {
                    if let Some(node) = signals.get_mut(id) {
                        node.dirty = true;
                        stack.extend(node.subscribers.iter().copied());
                    }
                }
                SubscriberId::Effect(id) => {
                    if let Some(node) = effects.get_mut(id) {
                        if !node.dirty {
                            node.dirty = true;
                            pending.push_back(id);
                        }
                    }
                }
            }
        }
    }

    /// Flush all pending effects. Re-entrant calls are absorbed by the
    /// outermost flush.
    fn flush_effects(&self) {
        if self.flushing.get() {
            return;
        }
        self.flushing.set(true);
        loop {
            let next = self.pending_effects.borrow_mut().pop_front();
            let Some(id) = next else {
                break;
            };
            self.run_effect(id);
        }
        self.flushing.set(false);
    }

    fn run_effect(&self, id: EffectId) {
        let run = {
            let mut effects = self.effects.borrow_mut();
            match effects.get_mut(id) {
                Some(node) if node.dirty => {
                    node.dirty = false;
                    node.run.clone()
                }
                _ => return,
            }
        };

        self.tracking.borrow_mut().push(Some(SmallVec::new()));
        let result = (&mut *run.borrow_mut())(self);
        let deps = self.tracking.borrow_mut().pop().flatten().unwrap_or_default();

        {
            let mut signals = self.signals.borrow_mut();
            let mut effects = self.effects.borrow_mut();
            let sub = SubscriberId::Effect(id);
            let Some(node) = effects.get_mut(id) else {
                return;
            };
            for dep in &node.dependencies {
                if let Some(sig) = signals.get_mut(*dep) {
                    sig.subscribers.retain(|s| *s != sub);
                }
            }
            for dep in &deps {
                if let Some(sig) = signals.get_mut(*dep) {
                    if !sig.subscribers.contains(&sub) {
                        sig.subscribers.push(sub);
                    }
                }
            }
            node.dependencies = deps;
        }

        if let Err(err) = result {
            tracing::warn!(effect = ?id, %err, "effect failed");
        }
    }
}
