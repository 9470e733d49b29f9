//! Partitioning desired and observed state into the calls that converge them.

use std::collections::HashSet;

use crate::diff::missing;

/// One call towards a desired entry.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<'a, D, O> {
    /// The desired entry matched this observed entry.
    Update(&'a D, &'a O),
    /// Nothing observed carries the desired key.
    Create(&'a D),
}

/// What to do for one resource kind.
#[derive(Debug)]
pub struct Plan<'a, D, O> {
    /// Updates and creates, in the order of the desired entries. A desired
    /// entry matching several observed entries yields one update for each.
    pub steps: Vec<Step<'a, D, O>>,
    /// Observed entries whose key is not desired, minus protected ones.
    /// Each observed entry appears at most once.
    pub delete: Vec<&'a O>,
}

impl<'a, D, O> Plan<'a, D, O> {
    /// True when nothing needs to be sent.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.delete.is_empty()
    }

    /// Update pairs, in step order.
    pub fn updates(&self) -> impl Iterator<Item = (&'a D, &'a O)> + '_ {
        self.steps.iter().filter_map(|step| match *step {
            Step::Update(want, have) => Some((want, have)),
            Step::Create(_) => None,
        })
    }

    /// Desired entries to create, in step order.
    pub fn creates(&self) -> impl Iterator<Item = &'a D> + '_ {
        self.steps.iter().filter_map(|step| match *step {
            Step::Create(want) => Some(want),
            Step::Update(..) => None,
        })
    }
}

/// Match desired against observed by natural key.
///
/// Keys compare exactly. An entry present on both sides is updated, never
/// deleted and recreated.
pub fn plan<'a, D, O, DK, OK, P>(
    desired: &'a [D],
    observed: &'a [O],
    desired_key: DK,
    observed_key: OK,
    protected: P,
) -> Plan<'a, D, O>
where
    DK: Fn(&'a D) -> &'a str,
    OK: Fn(&'a O) -> &'a str,
    P: Fn(&'a O) -> bool,
{
    let mut steps = Vec::new();

    for want in desired {
        let key = desired_key(want);
        let before = steps.len();
        steps.extend(
            observed
                .iter()
                .filter(|have| observed_key(*have) == key)
                .map(|have| Step::Update(want, have)),
        );
        if steps.len() == before {
            steps.push(Step::Create(want));
        }
    }

    let gone: HashSet<&str> = missing(
        desired.iter().map(&desired_key),
        observed.iter().map(&observed_key),
    )
    .into_iter()
    .collect();

    let delete = observed
        .iter()
        .filter(|have| gone.contains(observed_key(*have)) && !protected(*have))
        .collect();

    Plan { steps, delete }
}
