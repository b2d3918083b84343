//! Compound signals
//!
//! A [`CompoundSignal`] groups one scalar signal per component (`x`, `y`)
//! under a single identity. Reading composes the components, writing
//! decomposes the value and updates every component inside one
//! [`ReactiveGraph::batch`], so observers never see a half-written value.

use smallvec::SmallVec;
use std::fmt;
use std::marker::PhantomData;

use crate::error::SignalResult;
use crate::geometry::Vector2;
use crate::reactive::{ReactiveGraph, Signal, SignalOptions, SignalValue};

/// A value made of named scalar components
pub trait Compound: Clone + 'static {
    /// Component names, in storage order
    const KEYS: &'static [&'static str];

    fn component(&self, index: usize) -> f64;

    /// Rebuild from components ordered like [`Compound::KEYS`]
    fn from_components(components: &[f64]) -> Self;
}

impl Compound for Vector2 {
    const KEYS: &'static [&'static str] = &["x", "y"];

    fn component(&self, index: usize) -> f64 {
        self[index]
    }

    fn from_components(components: &[f64]) -> Self {
        Vector2::new(
            components.first().copied().unwrap_or_default(),
            components.get(1).copied().unwrap_or_default(),
        )
    }
}

/// A vector-valued signal backed by one signal per component
pub struct CompoundSignal<T> {
    components: SmallVec<[Signal<f64>; 4]>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CompoundSignal<T> {
    fn clone(&self) -> Self {
        Self {
            components: self.components.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for CompoundSignal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl<T> fmt::Debug for CompoundSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundSignal")
            .field("components", &self.components)
            .finish()
    }
}

impl<T: Compound> CompoundSignal<T> {
    /// Create the component signals. Component names are `"{name}.{key}"`.
    pub fn new(graph: &ReactiveGraph, name: &str, initial: impl Into<SignalValue<T>>) -> Self {
        let initial = initial.into();
        let components = T::KEYS
            .iter()
            .enumerate()
            .map(|(index, key)| {
                graph.create_signal_with(
                    Self::split(&initial, index),
                    SignalOptions::named(format!("{name}.{key}")),
                )
            })
            .collect();
        Self {
            components,
            _marker: PhantomData,
        }
    }

    /// Read the full value
    pub fn get(&self, graph: &ReactiveGraph) -> SignalResult<T> {
        let mut values: SmallVec<[f64; 4]> = SmallVec::new();
        for component in &self.components {
            values.push(graph.get(*component)?);
        }
        Ok(T::from_components(&values))
    }

    /// Write every component in one logical instant
    ///
    /// A formula is split into one formula per component; each component
    /// evaluates the formula on its own.
    pub fn set(&self, graph: &ReactiveGraph, value: impl Into<SignalValue<T>>) -> SignalResult<()> {
        let value = value.into();
        graph.batch(|g| {
            for (index, component) in self.components.iter().enumerate() {
                g.set(*component, Self::split(&value, index))?;
            }
            Ok(())
        })
    }

    /// The sub-signal for a component key such as `"x"`
    pub fn component(&self, key: &str) -> Option<Signal<f64>> {
        T::KEYS
            .iter()
            .position(|k| *k == key)
            .and_then(|index| self.components.get(index).copied())
    }

    /// Component signals in key order
    pub fn components(&self) -> &[Signal<f64>] {
        &self.components
    }

    pub fn dispose(&self, graph: &ReactiveGraph) {
        for component in &self.components {
            graph.dispose(*component);
        }
    }

    fn split(value: &SignalValue<T>, index: usize) -> SignalValue<f64> {
        match value {
            SignalValue::Value(v) => SignalValue::Value(v.component(index)),
            SignalValue::Formula(formula) => {
                let formula = formula.clone();
                SignalValue::formula(move |g| Ok(formula(g)?.component(index)))
            }
        }
    }
}
