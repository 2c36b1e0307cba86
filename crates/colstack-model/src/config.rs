//! Declarative column-stack configuration.
//!
//! The document shape follows the pipeline's JSON payload:
//!
//! ```json
//! {
//!   "nameSpace": { "age": "age_at_lot1" },
//!   "columnOptions": [
//!     { "name": "country", "dtype": "cat", "filters": { "__eq__": "gb" } },
//!     { "name": "age_at_lot1", "dtype": "float",
//!       "create_func": "get_age_float", "create_args": ["lot1", "dob"],
//!       "bins": { "<20": "[..20)", "20s": "[20..30)", "30+": "[30..)" },
//!       "bin_include": { "other": true, "null": true } }
//!   ]
//! }
//! ```
//!
//! Empty fields are omitted when the configuration is dumped.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::scalar::ScalarType;

/// Suffix for the output column of a binned column without an explicit `bin_name`.
pub const BINNED_SUFFIX: &str = "_binned";

/// Top-level configuration: the ordered list of column options plus the
/// namespace (column alias) table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStack {
    /// New column name -> existing column name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub name_space: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "deserialize_column_entries")]
    pub column_options: Vec<ColumnOptions>,
}

impl ColumnStack {
    /// Builds a stack with one bare entry per column name.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name_space: BTreeMap::new(),
            column_options: names.into_iter().map(ColumnOptions::new).collect(),
        }
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::Config`] for malformed documents, including
    /// unknown dtype tags.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration to a JSON value, omitting empty fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::Config`] if serialization fails.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.column_options.iter().map(|c| c.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnOptions> {
        self.column_options.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ColumnOptions> {
        self.column_options.iter_mut().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Adds a bare column entry and returns it for further configuration.
    pub fn add_column(&mut self, name: impl Into<String>) -> &mut ColumnOptions {
        self.append_column(ColumnOptions::new(name))
    }

    pub fn append_column(&mut self, column: ColumnOptions) -> &mut ColumnOptions {
        let index = self.column_options.len();
        self.column_options.push(column);
        &mut self.column_options[index]
    }

    /// Merges another stack into this one: namespace entries are added and
    /// column entries appended in order.
    pub fn extend(&mut self, other: ColumnStack) {
        self.name_space.extend(other.name_space);
        self.column_options.extend(other.column_options);
    }

    /// Columns with parse functions configured.
    pub fn parsed_columns(&self) -> impl Iterator<Item = &ColumnOptions> {
        self.column_options.iter().filter(|c| !c.parse_funcs.is_empty())
    }

    /// Columns produced by a creation function.
    pub fn created_columns(&self) -> impl Iterator<Item = &ColumnOptions> {
        self.column_options.iter().filter(|c| c.create_func.is_some())
    }

    /// Columns read from the input table.
    pub fn source_columns(&self) -> impl Iterator<Item = &ColumnOptions> {
        self.column_options.iter().filter(|c| c.create_func.is_none())
    }

    pub fn binned_columns(&self) -> impl Iterator<Item = &ColumnOptions> {
        self.column_options.iter().filter(|c| !c.bins.is_empty())
    }

    pub fn filtered_columns(&self) -> impl Iterator<Item = &ColumnOptions> {
        self.column_options.iter().filter(|c| !c.filters.is_empty())
    }
}

/// Per-column instructions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnOptions {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<ScalarType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_funcs: Vec<ParseFunc>,

    /// Keyword arguments for each entry of `parse_funcs`, by position.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_kwargs: Vec<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    #[serde(default, skip_serializing_if = "BinSpec::is_empty")]
    pub bins: BinSpec,

    #[serde(default, skip_serializing_if = "BinInclude::is_default")]
    pub bin_include: BinInclude,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_name: Option<String>,

    #[serde(default, skip_serializing_if = "OverlapPolicy::is_default")]
    pub bin_overlap: OverlapPolicy,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<FilterOp, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_func: Option<CreateFunc>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_args: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub create_kwargs: BTreeMap<String, serde_json::Value>,
}

impl ColumnOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares a new data type for the column from its tag.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::UnknownScalarType`] if the tag is not registered.
    pub fn set_dtype(&mut self, tag: &str) -> Result<()> {
        self.dtype = Some(tag.parse()?);
        Ok(())
    }

    pub fn set_friendly_name(&mut self, friendly_name: impl Into<String>) {
        self.friendly_name = Some(friendly_name.into());
    }

    /// Name of the column holding materialized bin labels.
    pub fn binned_column_name(&self) -> String {
        self.bin_name
            .clone()
            .unwrap_or_else(|| format!("{}{BINNED_SUFFIX}", self.name))
    }

    pub fn is_created(&self) -> bool {
        self.create_func.is_some()
    }
}

/// Inclusion flags for the reserved `other` and `NA` bins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinInclude {
    #[serde(default)]
    pub other: bool,
    #[serde(default)]
    pub null: bool,
}

impl BinInclude {
    pub fn new(other: bool, null: bool) -> Self {
        Self { other, null }
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// How rows claimed by more than one user bin are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Fail with an overlapping-bin error.
    #[default]
    Reject,
    /// The bin declared last claims the row.
    LastWins,
}

impl OverlapPolicy {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Row filter operators, keyed by their configuration tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "__lt__")]
    Lt,
    #[serde(rename = "__le__")]
    Le,
    #[serde(rename = "__gt__")]
    Gt,
    #[serde(rename = "__ge__")]
    Ge,
    #[serde(rename = "__eq__")]
    Eq,
    #[serde(rename = "__ne__")]
    Ne,
}

impl FilterOp {
    pub fn tag(self) -> &'static str {
        match self {
            FilterOp::Lt => "__lt__",
            FilterOp::Le => "__le__",
            FilterOp::Gt => "__gt__",
            FilterOp::Ge => "__ge__",
            FilterOp::Eq => "__eq__",
            FilterOp::Ne => "__ne__",
        }
    }
}

/// Text-level parse functions applied before dtype coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFunc {
    /// Leave the text unchanged.
    Id,
    /// Re-format dates: kwargs `input_format`, `output_format` (strftime syntax).
    ToDateStr,
}

impl ParseFunc {
    pub fn name(self) -> &'static str {
        match self {
            ParseFunc::Id => "id",
            ParseFunc::ToDateStr => "to_date_str",
        }
    }
}

/// Column creation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateFunc {
    /// Identity of a single column.
    Id,
    /// Copy of a single column.
    CopyCol,
    /// `(date - dob)` in whole days divided by 365.25.
    GetAgeFloat,
    /// `date - dob` as a duration.
    GetAgeDelta,
    /// Per patient, the date of the next line of therapy.
    NextLotDate,
    /// Per group, the value at the row whose key equals `keep_key`.
    ColForLot,
}

impl CreateFunc {
    pub fn name(self) -> &'static str {
        match self {
            CreateFunc::Id => "id",
            CreateFunc::CopyCol => "copy_col",
            CreateFunc::GetAgeFloat => "get_age_float",
            CreateFunc::GetAgeDelta => "get_age_delta",
            CreateFunc::NextLotDate => "next_lot_date",
            CreateFunc::ColForLot => "col_for_lot",
        }
    }

    /// Number of positional column arguments.
    pub fn arity(self) -> usize {
        match self {
            CreateFunc::Id | CreateFunc::CopyCol => 1,
            CreateFunc::GetAgeFloat | CreateFunc::GetAgeDelta => 2,
            CreateFunc::NextLotDate | CreateFunc::ColForLot => 3,
        }
    }
}

/// Ordered mapping of bin name to bin expression text.
///
/// Serialized as a JSON object; declaration order is kept because it is the
/// evaluation order of the bins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinSpec(Vec<(String, String)>);

impl BinSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, expression: impl Into<String>) {
        self.0.push((name.into(), expression.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, expr)| (name.as_str(), expr.as_str()))
    }
}

impl<N: Into<String>, E: Into<String>> FromIterator<(N, E)> for BinSpec {
    fn from_iter<T: IntoIterator<Item = (N, E)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, expr)| (name.into(), expr.into()))
                .collect(),
        )
    }
}

impl Serialize for BinSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, expr) in &self.0 {
            map.serialize_entry(name, expr)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BinSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BinSpecVisitor;

        impl<'de> Visitor<'de> for BinSpecVisitor {
            type Value = BinSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of bin name to bin expression")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<BinSpec, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, expr)) = access.next_entry::<String, String>()? {
                    entries.push((name, expr));
                }
                Ok(BinSpec(entries))
            }
        }

        deserializer.deserialize_map(BinSpecVisitor)
    }
}

/// A `columnOptions` entry may be a bare column name or a full options object.
fn deserialize_column_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<ColumnOptions>, D::Error>
where
    D: Deserializer<'de>,
{
    // `bins` keeps declaration order only because serde_json's `preserve_order` is enabled.
    let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
    entries
        .into_iter()
        .map(|entry| match entry {
            serde_json::Value::String(name) => Ok(ColumnOptions::new(name)),
            other => serde_json::from_value(other).map_err(serde::de::Error::custom),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "columnOptions": [
            { "name": "pat_id", "dtype": "str" },
            { "name": "country", "dtype": "cat", "filters": { "__eq__": "gb" } },
            { "name": "location_code", "dtype": "int" },
            {
                "name": "age_at_lot1",
                "dtype": "float",
                "create_func": "get_age_float",
                "create_args": ["lot1", "dob"],
                "bins": { "<20": "[..20)", "20s": "[20..30)", "50+": "[50..)" },
                "bin_include": { "other": true }
            }
        ]
    }"#;

    #[test]
    fn test_parse_payload() {
        let stack = ColumnStack::from_json(PAYLOAD).unwrap();
        assert_eq!(
            stack.column_names(),
            vec!["pat_id", "country", "location_code", "age_at_lot1"]
        );
        let age = stack.get("age_at_lot1").unwrap();
        assert_eq!(age.dtype, Some(ScalarType::Float));
        assert_eq!(age.create_func, Some(CreateFunc::GetAgeFloat));
        assert!(age.bin_include.other);
        assert!(!age.bin_include.null);
        assert_eq!(age.bin_overlap, OverlapPolicy::Reject);
    }

    #[test]
    fn test_bins_keep_declaration_order() {
        let stack = ColumnStack::from_json(PAYLOAD).unwrap();
        let names: Vec<_> = stack
            .get("age_at_lot1")
            .unwrap()
            .bins
            .iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["<20", "20s", "50+"]);
    }

    #[test]
    fn test_bins_order_is_not_alphabetical() {
        let stack = ColumnStack::from_json(
            r#"{"columnOptions": [{
                "name": "score",
                "dtype": "int",
                "bins": {"z_low": "[..5]", "m_mid": "[3..7]", "a_high": "[5..]"},
                "bin_overlap": "last_wins"
            }]}"#,
        )
        .unwrap();
        let score = stack.get("score").unwrap();
        let names: Vec<_> = score.bins.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z_low", "m_mid", "a_high"]);
        assert_eq!(score.bin_overlap, OverlapPolicy::LastWins);

        let dumped = stack.to_json_value().unwrap();
        let keys: Vec<_> = dumped["columnOptions"][0]["bins"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["z_low", "m_mid", "a_high"]);
    }

    #[test]
    fn test_bare_names_accepted() {
        let stack = ColumnStack::from_json(r#"{"columnOptions": ["a", {"name": "b"}]}"#).unwrap();
        assert_eq!(stack.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_dtype_rejected() {
        let err = ColumnStack::from_json(r#"{"columnOptions": [{"name": "a", "dtype": "money"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("money"));
    }

    #[test]
    fn test_dump_omits_empty_fields() {
        let stack = ColumnStack::from_json(PAYLOAD).unwrap();
        let value = stack.to_json_value().unwrap();
        let first = &value["columnOptions"][0];
        assert_eq!(first, &serde_json::json!({ "name": "pat_id", "dtype": "str" }));
        assert!(value.get("nameSpace").is_none());
    }

    #[test]
    fn test_dump_roundtrip() {
        let stack = ColumnStack::from_json(PAYLOAD).unwrap();
        let dumped = serde_json::to_string(&stack).unwrap();
        assert_eq!(ColumnStack::from_json(&dumped).unwrap(), stack);
    }

    #[test]
    fn test_set_dtype() {
        let mut column = ColumnOptions::new("location_code");
        column.set_dtype("str").unwrap();
        assert_eq!(column.dtype, Some(ScalarType::Str));
        assert!(column.set_dtype("decimal").is_err());
        assert_eq!(column.dtype, Some(ScalarType::Str));
    }

    #[test]
    fn test_binned_column_name() {
        let mut column = ColumnOptions::new("age");
        assert_eq!(column.binned_column_name(), "age_binned");
        column.bin_name = Some("age_group".to_string());
        assert_eq!(column.binned_column_name(), "age_group");
    }

    #[test]
    fn test_filter_tags() {
        let stack = ColumnStack::from_json(PAYLOAD).unwrap();
        let filters = &stack.get("country").unwrap().filters;
        assert_eq!(filters.get(&FilterOp::Eq), Some(&serde_json::json!("gb")));
        assert_eq!(FilterOp::Ne.tag(), "__ne__");
    }
}
