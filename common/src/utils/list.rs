//! Client-side filtering and sorting of record lists.
//!
//! Sortable fields are declared as a table of [`SortField`]s, each mapping a
//! key to an extractor. Records whose field is absent yield
//! [`SortValue::Missing`], which orders before every present value, so the
//! ascending and descending orders are exact reverses of each other apart
//! from ties. Ties are always broken by record name, ascending.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Signed multiplier applied to the primary comparison.
    pub fn multiplier(self) -> i8 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }

    /// The opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Applies the direction to an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        if self.multiplier() < 0 {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// A comparable field value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SortValue {
    /// Text value, compared case-insensitively.
    pub fn text(value: impl AsRef<str>) -> Self {
        SortValue::Text(value.as_ref().to_lowercase())
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Bool(_) => 1,
            SortValue::Number(_) => 2,
            SortValue::Text(_) => 3,
        }
    }

    /// Total order over values; missing values come first.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<f64> for SortValue {
    fn from(v: f64) -> Self {
        SortValue::Number(v)
    }
}

impl From<u64> for SortValue {
    fn from(v: u64) -> Self {
        SortValue::Number(v as f64)
    }
}

impl From<bool> for SortValue {
    fn from(v: bool) -> Self {
        SortValue::Bool(v)
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SortValue::Missing)
    }
}

/// One entry of a sortable-field table.
pub struct SortField<T> {
    /// Key used by callers to select the field.
    pub key: &'static str,
    /// Direction used when the field is selected anew.
    pub default_order: SortOrder,
    /// Reads the field from a record.
    pub extract: fn(&T) -> SortValue,
}

/// Records that can be listed: they have a name used for tie-breaking.
pub trait Named {
    fn name(&self) -> &str;
}

/// Currently selected sort key and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SortState {
    pub key: String,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: key.into(),
            order,
        }
    }

    /// Selects a sort key.
    ///
    /// The same key toggles the direction; another key starts from
    /// `default_order`.
    pub fn select(&mut self, key: &str, default_order: SortOrder) {
        if self.key == key {
            self.order = self.order.toggle();
        } else {
            self.key = key.to_string();
            self.order = default_order;
        }
    }
}

/// Keeps the records whose `field`, lower-cased, contains `filter` lower-cased.
///
/// Only the empty filter keeps everything; whitespace is matched like any
/// other character.
pub fn filter_by<T: Clone>(items: &[T], filter: &str, field: impl Fn(&T) -> &str) -> Vec<T> {
    let needle = filter.to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| field(item).to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Sorts records in place on `field`, ties broken by name ascending.
pub fn sort_records<T: Named>(items: &mut [T], field: &SortField<T>, order: SortOrder) {
    items.sort_by(|a, b| {
        let primary = (field.extract)(a).compare(&(field.extract)(b));
        order
            .apply(primary)
            .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
    });
}

/// A filtered and sorted projection of a record list.
pub struct ListView<T: 'static> {
    source: Vec<T>,
    visible: Vec<T>,
    fields: &'static [SortField<T>],
    filter: String,
    sort: SortState,
}

impl<T: Named + Clone + 'static> ListView<T> {
    /// Creates an empty list sorted on `key` with `order`.
    pub fn new(fields: &'static [SortField<T>], key: &str, order: SortOrder) -> Self {
        Self {
            source: Vec::new(),
            visible: Vec::new(),
            fields,
            filter: String::new(),
            sort: SortState::new(key, order),
        }
    }

    /// Replaces the records, keeping the current filter and sort.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.source = items;
        self.refresh();
    }

    /// Filters on record names.
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.refresh();
    }

    /// Selects a sort key, toggling when it is already selected.
    pub fn sort_by(&mut self, key: &str) -> AppResult<()> {
        let field = self.field(key)?;
        self.sort.select(key, field.default_order);
        self.refresh();
        Ok(())
    }

    /// Selects a key with its default direction, without toggling.
    pub fn sort_with_default(&mut self, key: &str) -> AppResult<()> {
        let field = self.field(key)?;
        self.sort = SortState::new(key, field.default_order);
        self.refresh();
        Ok(())
    }

    /// Sets key and direction explicitly.
    pub fn sort_with(&mut self, key: &str, order: SortOrder) -> AppResult<()> {
        self.field(key)?;
        self.sort = SortState::new(key, order);
        self.refresh();
        Ok(())
    }

    /// Records to display.
    pub fn items(&self) -> &[T] {
        &self.visible
    }

    /// All records, unfiltered, in fetch order.
    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Keys that can be passed to [`ListView::sort_by`].
    pub fn sort_keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.key).collect()
    }

    fn field(&self, key: &str) -> AppResult<&'static SortField<T>> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| AppError::Validation(format!("unknown sort key: {}", key)))
    }

    fn refresh(&mut self) {
        let mut visible = filter_by(&self.source, &self.filter, |item: &T| item.name());
        if let Some(field) = self.fields.iter().find(|f| f.key == self.sort.key) {
            sort_records(&mut visible, field, self.sort.order);
        }
        self.visible = visible;
    }
}
