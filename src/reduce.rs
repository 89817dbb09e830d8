//! Candidate set reduction.
//!
//! Narrows a [`CandidateSet`] one disambiguation dimension at a time. When a
//! dimension has several distinct values the decision is delegated to a
//! [`Chooser`], which the presentation layer implements (a terminal prompt,
//! a scripted answer in tests, or "always the first option").
//!
//! The loop holds no state besides the narrowed set itself, so surfaces
//! that cannot block can drive it step by step with [`prompt_for`] and
//! [`apply_choice`].

use crate::record::{CandidateSet, FieldValue};

/// Picks one option out of several for a dimension.
pub trait Chooser {
    /// Return the index of the chosen option in `options` (sorted ascending),
    /// or `None` to stop narrowing and keep the current set.
    fn choose(&mut self, dimension: &str, options: &[FieldValue]) -> Option<usize>;
}

impl<F> Chooser for F
where
    F: FnMut(&str, &[FieldValue]) -> Option<usize>,
{
    fn choose(&mut self, dimension: &str, options: &[FieldValue]) -> Option<usize> {
        self(dimension, options)
    }
}

/// Always takes the smallest option.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstOption;

impl Chooser for FirstOption {
    fn choose(&mut self, _dimension: &str, options: &[FieldValue]) -> Option<usize> {
        if options.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

/// Never narrows; leaves ambiguity to the reconciler.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChoice;

impl Chooser for NoChoice {
    fn choose(&mut self, _dimension: &str, _options: &[FieldValue]) -> Option<usize> {
        None
    }
}

/// What a dimension requires for the current set.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// Zero or one row left; nothing to narrow.
    Settled,
    /// No row has a value for this dimension.
    Skip,
    /// Exactly one distinct value; filter without asking.
    Resolved(FieldValue),
    /// Several distinct values, sorted ascending.
    Choose(Vec<FieldValue>),
}

/// Inspect `dimension` on the current set.
pub fn prompt_for(set: &CandidateSet, dimension: &str) -> Prompt {
    if set.len() <= 1 {
        return Prompt::Settled;
    }

    let mut options = set.distinct_values(dimension);
    match options.len() {
        0 => Prompt::Skip,
        1 => Prompt::Resolved(options.remove(0)),
        _ => Prompt::Choose(options),
    }
}

/// Keep the rows whose `dimension` equals `value`.
pub fn apply_choice(set: CandidateSet, dimension: &str, value: &FieldValue) -> CandidateSet {
    set.retain(|row| row.get(dimension) == value)
}

/// Narrow `set` through `dimensions` in order.
///
/// Sets of zero or one row come back unchanged. The result never has more
/// rows than the input, and several rows may remain once the dimensions are
/// exhausted or the chooser declines.
pub fn reduce<D, C>(set: CandidateSet, dimensions: &[D], chooser: &mut C) -> CandidateSet
where
    D: AsRef<str>,
    C: Chooser + ?Sized,
{
    let source = set.source();
    let mut set = set;

    for dimension in dimensions {
        let dimension = dimension.as_ref();
        let before = set.len();

        set = match prompt_for(&set, dimension) {
            Prompt::Settled => break,
            Prompt::Skip => {
                tracing::debug!(%source, dimension, "No values for dimension, skipping");
                continue;
            }
            Prompt::Resolved(value) => apply_choice(set, dimension, &value),
            Prompt::Choose(options) => match chooser.choose(dimension, &options) {
                Some(index) if index < options.len() => {
                    apply_choice(set, dimension, &options[index])
                }
                Some(index) => {
                    tracing::warn!(
                        %source,
                        dimension,
                        index,
                        option_count = options.len(),
                        "Chooser returned an out-of-range option, stopping reduction"
                    );
                    break;
                }
                None => {
                    tracing::debug!(%source, dimension, "Chooser declined, stopping reduction");
                    break;
                }
            },
        };

        tracing::debug!(
            %source,
            dimension,
            before,
            after = set.len(),
            "Candidate set narrowed"
        );
    }

    set
}
