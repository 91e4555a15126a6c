use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use rsweep_core::errors::{ErrorInfo, LaunchError};
use rsweep_core::sanitize::SanitizedPair;
use serde::{Deserialize, Serialize};

use crate::template::is_identifier;

/// Suffix appended to an axis name to form its sanitized companion.
pub const SANITIZED_SUFFIX: &str = "_sanitized";

/// Scalar axis value as written in a plan file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Integer such as a seed.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Free text such as an env name.
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int(value) => write!(f, "{value}"),
            ScalarValue::Float(value) => write!(f, "{value}"),
            ScalarValue::Bool(value) => write!(f, "{value}"),
            ScalarValue::Text(value) => f.write_str(value),
        }
    }
}

/// Half-open integer range `[start, end)` used to derive axis values such as seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    /// First value, inclusive.
    pub start: i64,
    /// Upper bound, exclusive.
    pub end: i64,
    /// Increment between values; must be positive.
    #[serde(default = "RangeSpec::default_step")]
    pub step: i64,
}

impl RangeSpec {
    const fn default_step() -> i64 {
        1
    }

    fn values(&self) -> Result<Vec<String>, LaunchError> {
        if self.step <= 0 {
            return Err(LaunchError::Grid(
                ErrorInfo::new("range-step", "range step must be positive")
                    .with_context("step", self.step.to_string()),
            ));
        }
        let mut values = Vec::new();
        let mut current = self.start;
        while current < self.end {
            values.push(current.to_string());
            current = match current.checked_add(self.step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(values)
    }
}

/// Plan-level description of a single axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Name bound at every grid point.
    pub name: String,
    /// Explicit values, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ScalarValue>,
    /// Derived integer values, exclusive with `values`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeSpec>,
    /// Emit a `<name>_sanitized` companion axis.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sanitize: bool,
}

/// Named axis of a parameter grid.
///
/// Every value is stored with its sanitized form, so the companion list is
/// index-aligned with the raw list by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Axis {
    name: String,
    values: Vec<SanitizedPair>,
    sanitize: bool,
}

impl Axis {
    /// Creates an axis whose values are bound verbatim.
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(name.into(), values, false)
    }

    /// Creates an axis that also binds a `<name>_sanitized` companion.
    pub fn sanitized<I, S>(name: impl Into<String>, values: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(name.into(), values, true)
    }

    /// Materializes an axis from its plan description.
    pub fn from_spec(spec: &AxisSpec) -> Result<Self, LaunchError> {
        let values = match (&spec.range, spec.values.is_empty()) {
            (Some(_), false) => {
                return Err(LaunchError::Config(
                    ErrorInfo::new("axis-values-and-range", "axis sets both values and range")
                        .with_context("axis", spec.name.clone()),
                ))
            }
            (Some(range), true) => range.values()?,
            (None, _) => spec.values.iter().map(ToString::to_string).collect(),
        };
        Self::build(spec.name.clone(), values, spec.sanitize)
    }

    fn build<I, S>(name: String, values: I, sanitize: bool) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !is_identifier(&name) {
            return Err(LaunchError::Grid(
                ErrorInfo::new("axis-name", "axis names must be identifiers")
                    .with_context("axis", name)
                    .with_hint("use letters, digits and underscores, not starting with a digit"),
            ));
        }
        let values: Vec<SanitizedPair> = values.into_iter().map(SanitizedPair::new).collect();
        if values.is_empty() {
            return Err(LaunchError::Grid(
                ErrorInfo::new("axis-empty", "axis has no values").with_context("axis", name),
            ));
        }
        let mut seen = BTreeSet::new();
        for pair in &values {
            if !seen.insert(pair.raw.as_str()) {
                return Err(LaunchError::Grid(
                    ErrorInfo::new("axis-duplicate-value", "axis lists a value twice")
                        .with_context("axis", name.clone())
                        .with_context("value", pair.raw.clone()),
                ));
            }
        }
        // Sanitized values name output directories, so they must stay distinct too.
        if sanitize {
            let mut sanitized = BTreeSet::new();
            for pair in &values {
                if !sanitized.insert(pair.sanitized.as_str()) {
                    return Err(LaunchError::Grid(
                        ErrorInfo::new(
                            "axis-sanitized-collision",
                            "two values sanitize to the same path component",
                        )
                        .with_context("axis", name.clone())
                        .with_context("value", pair.raw.clone())
                        .with_context("sanitized", pair.sanitized.clone()),
                    ));
                }
            }
        }
        Ok(Self {
            name,
            values,
            sanitize,
        })
    }

    /// Name bound at every grid point.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed axis.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether a companion axis is bound.
    pub fn is_sanitized(&self) -> bool {
        self.sanitize
    }

    /// Raw values in declaration order.
    pub fn raw_values(&self) -> Vec<&str> {
        self.values.iter().map(|pair| pair.raw.as_str()).collect()
    }

    /// Sanitized values, index-aligned with [`Axis::raw_values`].
    pub fn sanitized_values(&self) -> Vec<&str> {
        self.values.iter().map(|pair| pair.sanitized.as_str()).collect()
    }

    /// Raw and sanitized values, index-aligned.
    pub fn pairs(&self) -> &[SanitizedPair] {
        &self.values
    }

    /// Name of the companion axis, when one is bound.
    pub fn companion_name(&self) -> Option<String> {
        self.sanitize
            .then(|| format!("{}{SANITIZED_SUFFIX}", self.name))
    }

    /// Names this axis binds at every grid point.
    pub fn bindings(&self) -> Vec<String> {
        let mut names = vec![self.name.clone()];
        names.extend(self.companion_name());
        names
    }
}

/// One concrete assignment of a value to every axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Position of the point in enumeration order.
    pub index: usize,
    /// Bound names in axis order; companions follow their raw axis.
    pub bindings: IndexMap<String, String>,
}

impl GridPoint {
    /// Value bound to `name`, companions included.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }
}

/// Ordered set of axes whose Cartesian product defines the jobs of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ParameterGrid {
    axes: Vec<Axis>,
}

impl ParameterGrid {
    /// Builds a grid, rejecting axes whose bound names collide.
    pub fn new(axes: Vec<Axis>) -> Result<Self, LaunchError> {
        let mut seen = BTreeSet::new();
        for axis in &axes {
            for name in axis.bindings() {
                if !seen.insert(name.clone()) {
                    return Err(LaunchError::Grid(
                        ErrorInfo::new("axis-duplicate-name", "grid binds a name twice")
                            .with_context("name", name),
                    ));
                }
            }
        }
        Ok(Self { axes })
    }

    /// Builds a grid from plan-level axis descriptions.
    pub fn from_specs(specs: &[AxisSpec]) -> Result<Self, LaunchError> {
        let axes = specs
            .iter()
            .map(Axis::from_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(axes)
    }

    /// Axes in declaration order.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Axis with the given name.
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    /// Number of grid points: the product of the axis sizes.
    pub fn len(&self) -> usize {
        self.axes.iter().map(Axis::len).product()
    }

    /// Axes are never empty, so a grid has at least one point.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every name bound at each grid point, companions included.
    pub fn bindings(&self) -> Vec<String> {
        self.axes.iter().flat_map(Axis::bindings).collect()
    }

    /// Enumerates the Cartesian product with the first axis varying slowest.
    pub fn points(&self) -> Vec<GridPoint> {
        let mut outputs = Vec::with_capacity(self.len());
        expand_grid(&self.axes, 0, IndexMap::new(), &mut outputs);
        outputs
            .into_iter()
            .enumerate()
            .map(|(index, bindings)| GridPoint { index, bindings })
            .collect()
    }
}

fn expand_grid(
    axes: &[Axis],
    idx: usize,
    current: IndexMap<String, String>,
    outputs: &mut Vec<IndexMap<String, String>>,
) {
    if idx == axes.len() {
        outputs.push(current);
        return;
    }
    let axis = &axes[idx];
    let companion = axis.companion_name();
    for pair in &axis.values {
        let mut next = current.clone();
        next.insert(axis.name.clone(), pair.raw.clone());
        if let Some(companion) = &companion {
            next.insert(companion.clone(), pair.sanitized.clone());
        }
        expand_grid(axes, idx + 1, next, outputs);
    }
}
