//! Core domain types for performance dashboards.
//!
//! This module defines the identifiers and descriptors shared by the engine
//! and its collaborators:
//!
//! - [`MetricId`], [`UserId`], [`DepartmentId`], [`CompanyId`] - Entity identifiers
//! - [`Owner`] - Who a metric series belongs to
//! - [`MetricDescriptor`] - How a plan/fact series is recorded
//! - [`Indicator`] - A company-level descriptor that may count as a key indicator
//! - [`SeriesData`] - Raw plan/fact samples from the time-series store
//! - [`Employee`], [`Department`], [`DepartmentMember`], [`HierarchyEdge`] - Organization

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::period::PeriodKind;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a metric or indicator series.
    MetricId
);
string_id!(
    /// Identifier of a user (employee or supervisor).
    UserId
);
string_id!(
    /// Identifier of a department.
    DepartmentId
);
string_id!(
    /// Identifier of a company.
    CompanyId
);

/// Owner of a metric series, also the scope of a time-series write.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Owner {
    /// A metric assigned to an individual user.
    User(UserId),
    /// A company-level metric.
    Company,
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Company => f.write_str("company"),
        }
    }
}

/// Which half of a plan/fact pair a sample belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Planned (target) value.
    Plan,
    /// Actual (achieved) value.
    Fact,
}

/// Numeric classification of a metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Plain counts.
    #[default]
    Count,
    /// Monetary amounts.
    Currency,
    /// Values that are already percentages.
    Percent,
    /// Time spent.
    Duration,
}

impl ValueType {
    /// Whether week-over-week growth is meaningful for this type.
    #[must_use]
    pub const fn supports_growth(self) -> bool {
        !matches!(self, Self::Percent)
    }
}

/// How week-over-week growth picks the comparison sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekType {
    /// Anchored to a configured week start offset.
    Calendar,
    /// Fixed 7-sample lag.
    #[default]
    Sliding,
}

/// Describes how a plan/fact series is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    /// Series identifier.
    pub id: MetricId,
    /// Display name.
    pub name: String,
    /// Granularity the values are recorded at.
    pub source_period: PeriodKind,
    /// Numeric classification.
    #[serde(default)]
    pub value_type: ValueType,
    /// Whether a growth series is requested.
    #[serde(default)]
    pub show_growth_percent: bool,
    /// Growth lag policy.
    #[serde(default)]
    pub week_type: WeekType,
    /// Growth lag in samples for [`WeekType::Calendar`].
    #[serde(default)]
    pub week_start_offset: i32,
}

impl MetricDescriptor {
    /// Creates a descriptor without growth.
    #[must_use]
    pub fn new(id: impl Into<MetricId>, name: impl Into<String>, source_period: PeriodKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_period,
            value_type: ValueType::default(),
            show_growth_percent: false,
            week_type: WeekType::default(),
            week_start_offset: 0,
        }
    }

    /// Sets the value type.
    #[must_use]
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Enables the growth series with the given lag policy.
    #[must_use]
    pub fn with_growth(mut self, week_type: WeekType, week_start_offset: i32) -> Self {
        self.show_growth_percent = true;
        self.week_type = week_type;
        self.week_start_offset = week_start_offset;
        self
    }

    /// Granularity the series must be fetched at for a display period:
    /// the source when it is strictly coarser, the display period otherwise.
    #[must_use]
    pub const fn expected_period(&self, display: PeriodKind) -> PeriodKind {
        self.source_period.coarser(display)
    }

    /// Whether a growth series should be computed.
    #[must_use]
    pub const fn wants_growth(&self) -> bool {
        self.show_growth_percent && self.value_type.supports_growth()
    }
}

/// A company-level series that may feed the key-indicator average.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    /// Series description.
    pub descriptor: MetricDescriptor,
    /// Whether this indicator counts as a key indicator.
    #[serde(default)]
    pub key: bool,
}

/// Raw plan/fact samples as returned by a time-series store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesData {
    /// Planned values, oldest first.
    pub plan: Vec<i64>,
    /// Actual values, oldest first.
    pub fact: Vec<i64>,
}

impl SeriesData {
    /// Creates series data from plan and fact vectors.
    #[must_use]
    pub const fn new(plan: Vec<i64>, fact: Vec<i64>) -> Self {
        Self { plan, fact }
    }
}

/// An employee of a company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Employing company.
    pub company_id: CompanyId,
}

/// A department of a company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Department identifier.
    pub id: DepartmentId,
    /// Display name.
    pub name: String,
    /// Owning company.
    pub company_id: CompanyId,
}

/// Role a user holds in a department.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Regular member.
    Employee,
    /// Department supervisor.
    Supervisor,
}

/// Link between a user and a department.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentMember {
    /// Linked department.
    pub department_id: DepartmentId,
    /// Linked user.
    pub user_id: UserId,
    /// Role of the user in the department.
    pub role: MemberRole,
}

/// Closure-table edge of the department hierarchy.
///
/// `depth` 1 links a parent to a direct child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEdge {
    /// Ancestor department.
    pub ancestor: DepartmentId,
    /// Descendant department.
    pub descendant: DepartmentId,
    /// Number of levels between the two.
    pub depth: u32,
}
