//! Abstract Syntax Tree definitions for the query language.

/// Wildcard marker accepted at either edge of an `IS` pattern.
pub const WILDCARD: char = '*';

/// Logical operators for combining filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Every operand must match.
    And,
    /// At least one operand must match.
    Or,
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Strictly less than.
    Lt,
    /// Strictly greater than.
    Gt,
    /// Equal.
    Eq,
}

impl ComparisonOp {
    /// Applies the comparison to `lhs` and `rhs`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
            Self::Eq => lhs == rhs,
        }
    }
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lt => write!(f, "LT"),
            Self::Gt => write!(f, "GT"),
            Self::Eq => write!(f, "EQ"),
        }
    }
}

/// A string-comparison pattern.
///
/// A leading `*` makes the pattern a suffix match, a trailing `*` a prefix
/// match, and both a substring match. Asterisks anywhere else are literal.
///
/// # Example
///
/// ```
/// use shared::query::Pattern;
///
/// assert!(Pattern::new("cp*").matches("cpsc"));
/// assert!(Pattern::new("*sc").matches("cpsc"));
/// assert!(!Pattern::new("*sc").matches("cpen"));
/// assert!(Pattern::new("c*c").matches("c*c"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
}

impl Pattern {
    /// Creates a pattern from its raw text (wildcards included).
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Returns the raw pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if `value` matches the pattern.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        let (leading, rest) = match self.raw.strip_prefix(WILDCARD) {
            Some(rest) => (true, rest),
            None => (false, self.raw.as_str()),
        };
        let (trailing, needle) = match rest.strip_suffix(WILDCARD) {
            Some(needle) => (true, needle),
            None => (false, rest),
        };

        match (leading, trailing) {
            (true, true) => value.contains(needle),
            (true, false) => value.ends_with(needle),
            (false, true) => value.starts_with(needle),
            (false, false) => value == needle,
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.raw)
    }
}

/// A predicate tree over record attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// The empty filter `{}`; matches every record.
    All,
    /// `AND` / `OR` over one or more operands.
    Logic {
        /// The logical operator.
        op: LogicalOp,
        /// The operands.
        operands: Vec<Filter>,
    },
    /// `LT` / `GT` / `EQ` against a numeric field.
    Numeric {
        /// The comparison operator.
        op: ComparisonOp,
        /// Namespaced field, e.g. `courses_avg`.
        field: String,
        /// The literal to compare against.
        value: f64,
    },
    /// `IS` against a string field.
    Text {
        /// Namespaced field, e.g. `courses_dept`.
        field: String,
        /// The pattern to match.
        pattern: Pattern,
    },
    /// `NOT` of the inner filter.
    Not(Box<Filter>),
}

impl Filter {
    /// `AND` of the given operands.
    #[must_use]
    pub fn and(operands: Vec<Self>) -> Self {
        Self::Logic {
            op: LogicalOp::And,
            operands,
        }
    }

    /// `OR` of the given operands.
    #[must_use]
    pub fn or(operands: Vec<Self>) -> Self {
        Self::Logic {
            op: LogicalOp::Or,
            operands,
        }
    }

    /// Numeric comparison.
    #[must_use]
    pub fn numeric(op: ComparisonOp, field: impl Into<String>, value: f64) -> Self {
        Self::Numeric {
            op,
            field: field.into(),
            value,
        }
    }

    /// `IS` comparison.
    #[must_use]
    pub fn is(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Text {
            field: field.into(),
            pattern: Pattern::new(pattern),
        }
    }

    /// Negation.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Calls `visit` with every field referenced in the tree, in document order.
    pub fn visit_fields<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Self::All => {}
            Self::Logic { operands, .. } => {
                for operand in operands {
                    operand.visit_fields(visit);
                }
            }
            Self::Numeric { field, .. } | Self::Text { field, .. } => visit(field),
            Self::Not(inner) => inner.visit_fields(visit),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Logic { op, operands } => {
                write!(f, "(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {op} ")?;
                    }
                    write!(f, "{operand}")?;
                }
                write!(f, ")")
            }
            Self::Numeric { op, field, value } => write!(f, "{field} {op} {value}"),
            Self::Text { field, pattern } => write!(f, "{field} IS {pattern}"),
            Self::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

/// Sort direction for a structured `ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Up,
    /// Descending.
    Down,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

/// The `ORDER` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    /// A single column, ascending.
    Column(String),
    /// Several columns compared left to right in one direction.
    Keys {
        /// Sort direction.
        direction: SortDirection,
        /// Columns to compare, highest priority first.
        keys: Vec<String>,
    },
}

impl Order {
    /// Returns the direction and the sort keys in priority order.
    #[must_use]
    pub fn parts(&self) -> (SortDirection, &[String]) {
        match self {
            Self::Column(column) => (SortDirection::Up, std::slice::from_ref(column)),
            Self::Keys { direction, keys } => (*direction, keys.as_slice()),
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (direction, keys) = self.parts();
        write!(f, "{} {direction}", keys.join(", "))
    }
}

/// The `OPTIONS` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Columns to project, in output order.
    pub columns: Vec<String>,
    /// Optional ordering.
    pub order: Option<Order>,
}

/// Aggregation tokens usable in `APPLY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyToken {
    /// Numeric maximum.
    Max,
    /// Numeric minimum.
    Min,
    /// Mean, rounded to two decimals.
    Avg,
    /// Total, rounded to two decimals.
    Sum,
    /// Number of distinct values.
    Count,
    /// A token outside the supported set; rejected during validation.
    Unknown(String),
}

impl ApplyToken {
    /// Maps a wire token to an `ApplyToken`.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "MAX" => Self::Max,
            "MIN" => Self::Min,
            "AVG" => Self::Avg,
            "SUM" => Self::Sum,
            "COUNT" => Self::Count,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for ApplyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Max => write!(f, "MAX"),
            Self::Min => write!(f, "MIN"),
            Self::Avg => write!(f, "AVG"),
            Self::Sum => write!(f, "SUM"),
            Self::Count => write!(f, "COUNT"),
            Self::Unknown(token) => write!(f, "{token}"),
        }
    }
}

/// A named aggregation computed per group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRule {
    /// Bare output column name.
    pub output_key: String,
    /// The aggregation.
    pub token: ApplyToken,
    /// Namespaced field aggregated over.
    pub field: String,
}

impl ApplyRule {
    /// Creates an apply rule.
    #[must_use]
    pub fn new(output_key: impl Into<String>, token: ApplyToken, field: impl Into<String>) -> Self {
        Self {
            output_key: output_key.into(),
            token,
            field: field.into(),
        }
    }
}

impl std::fmt::Display for ApplyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}({})", self.output_key, self.token, self.field)
    }
}

/// The `TRANSFORMATIONS` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    /// Namespaced fields forming the composite group key.
    pub group_by: Vec<String>,
    /// Aggregations computed per group.
    pub apply: Vec<ApplyRule>,
}

/// A parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The `WHERE` filter.
    pub filter: Filter,
    /// The `OPTIONS` block.
    pub options: Options,
    /// The optional `TRANSFORMATIONS` block.
    pub transform: Option<Transform>,
}

impl Query {
    /// Creates a query with the given filter and columns and no ordering.
    #[must_use]
    pub fn new(filter: Filter, columns: Vec<String>) -> Self {
        Self {
            filter,
            options: Options {
                columns,
                order: None,
            },
            transform: None,
        }
    }

    /// Sets the ORDER option.
    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.options.order = Some(order);
        self
    }

    /// Sets the TRANSFORMATIONS block.
    #[must_use]
    pub fn with_transform(mut self, group_by: Vec<String>, apply: Vec<ApplyRule>) -> Self {
        self.transform = Some(Transform { group_by, apply });
        self
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SELECT {}", self.options.columns.join(", "))?;
        write!(f, " WHERE {}", self.filter)?;

        if let Some(ref transform) = self.transform {
            write!(f, " GROUP BY {}", transform.group_by.join(", "))?;
            for rule in &transform.apply {
                write!(f, " APPLY {rule}")?;
            }
        }

        if let Some(ref order) = self.options.order {
            write!(f, " ORDER BY {order}")?;
        }

        Ok(())
    }
}
