//! In-memory table model and column type inference
//!
//! Records are held as rows of [`Cell`]s. When a table is converted to Arrow,
//! each column's type is inferred from the union of the values it holds.

use crate::table::{TableError, TableRecord, TableResult};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use std::fmt;
use std::sync::Arc;

/// A single value in a table row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Renders the value as text, `None` for nulls
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Int)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Physical type of an inferred column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Int64,
    Float64,
    Utf8,
}

impl ColumnType {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Boolean => DataType::Boolean,
            Self::Int64 => DataType::Int64,
            Self::Float64 => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
        }
    }
}

/// Inferred type and nullability of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column_type: ColumnType,
    pub nullable: bool,
}

/// Infers a column's type from the values it holds
///
/// Nulls are ignored when picking the type but make the column nullable.
///
/// | Values present     | Type    |
/// |--------------------|---------|
/// | only booleans      | Boolean |
/// | only integers      | Int64   |
/// | integers + floats  | Float64 |
/// | anything else      | Utf8    |
/// | only nulls         | Utf8    |
pub fn infer_column_type<'a, I>(cells: I) -> ColumnSpec
where
    I: IntoIterator<Item = &'a Cell>,
{
    let (mut bools, mut ints, mut floats, mut texts, mut nulls) = (false, false, false, false, false);

    for cell in cells {
        match cell {
            Cell::Null => nulls = true,
            Cell::Bool(_) => bools = true,
            Cell::Int(_) => ints = true,
            Cell::Float(_) => floats = true,
            Cell::Text(_) => texts = true,
        }
    }

    let column_type = match (bools, ints, floats, texts) {
        (true, false, false, false) => ColumnType::Boolean,
        (false, true, false, false) => ColumnType::Int64,
        (false, _, true, false) => ColumnType::Float64,
        _ => ColumnType::Utf8,
    };

    ColumnSpec {
        column_type,
        nullable: nulls,
    }
}

/// A rectangular in-memory table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRows {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    /// Declared column types; inferred from the rows when absent
    specs: Option<Vec<ColumnSpec>>,
}

impl TableRows {
    /// Creates an empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            specs: None,
        }
    }

    /// Fixes the column types instead of inferring them
    pub fn with_column_specs(mut self, specs: Vec<ColumnSpec>) -> TableResult<Self> {
        if specs.len() != self.columns.len() {
            return Err(TableError::Schema(format!(
                "{} column types declared for {} columns",
                specs.len(),
                self.columns.len()
            )));
        }
        self.specs = Some(specs);
        Ok(self)
    }

    /// Appends a row; it must have one value per column
    pub fn push_row(&mut self, row: Vec<Cell>) -> TableResult<()> {
        if row.len() != self.columns.len() {
            return Err(TableError::Schema(format!(
                "row {} has {} values, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builds a table from typed records, keeping their order
    ///
    /// Column types come from [`TableRecord::column_specs`] when the record
    /// declares them.
    ///
    /// # Returns
    ///
    /// * `Ok(TableRows)` - One row per record
    /// * `Err(TableError::Empty)` - `records` is empty
    pub fn from_records<R: TableRecord>(records: &[R]) -> TableResult<Self> {
        if records.is_empty() {
            return Err(TableError::Empty);
        }

        let columns = R::field_names().iter().map(|s| s.to_string()).collect();
        let mut table = Self::new(columns);
        if let Some(specs) = R::column_specs() {
            table = table.with_column_specs(specs.to_vec())?;
        }
        for record in records {
            table.push_row(record.cells())?;
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Type of the column at `idx`, declared or inferred
    pub fn column_spec(&self, idx: usize) -> ColumnSpec {
        match &self.specs {
            Some(specs) => specs[idx],
            None => infer_column_type(self.rows.iter().map(|row| &row[idx])),
        }
    }

    /// Arrow schema of the table
    pub fn schema(&self) -> Schema {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let spec = self.column_spec(idx);
                Field::new(name, spec.column_type.data_type(), spec.nullable)
            })
            .collect();
        Schema::new(fields)
    }

    /// Converts the table into a single Arrow record batch
    pub fn to_record_batch(&self) -> TableResult<RecordBatch> {
        if self.columns.is_empty() {
            return Err(TableError::Schema("table has no columns".to_string()));
        }

        let schema: SchemaRef = Arc::new(self.schema());
        let arrays = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| self.build_array(idx, field.data_type()))
            .collect::<TableResult<Vec<ArrayRef>>>()?;

        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    fn build_array(&self, idx: usize, data_type: &DataType) -> TableResult<ArrayRef> {
        let values = self.rows.iter().map(|row| &row[idx]);

        let array: ArrayRef = match data_type {
            DataType::Boolean => Arc::new(BooleanArray::from(
                values
                    .map(|cell| match cell {
                        Cell::Bool(v) => Some(*v),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
            DataType::Int64 => Arc::new(Int64Array::from(
                values.map(Cell::as_i64).collect::<Vec<_>>(),
            )),
            DataType::Float64 => Arc::new(Float64Array::from(
                values
                    .map(|cell| match cell {
                        Cell::Int(v) => Some(*v as f64),
                        Cell::Float(v) => Some(*v),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
            DataType::Utf8 => Arc::new(StringArray::from(
                values.map(Cell::to_text).collect::<Vec<_>>(),
            )),
            other => {
                return Err(TableError::Schema(format!(
                    "unsupported column type {}",
                    other
                )))
            }
        };
        Ok(array)
    }

    /// Converts every row into a typed record
    pub fn to_records<R: TableRecord>(&self) -> TableResult<Vec<R>> {
        self.rows
            .iter()
            .map(|row| R::from_cells(&self.columns, row))
            .collect()
    }

    /// Appends the rows of another table with identical columns
    pub fn extend(&mut self, other: TableRows) -> TableResult<()> {
        if other.columns != self.columns {
            return Err(TableError::Schema(
                "cannot merge tables with different columns".to_string(),
            ));
        }
        self.rows.extend(other.rows);
        Ok(())
    }
}

/// Decodes an Arrow record batch back into rows of cells
///
/// Boolean, integer, float and string columns map to their [`Cell`]
/// counterparts; any other Arrow type is rendered as text.
pub fn batch_to_rows(batch: &RecordBatch) -> TableResult<TableRows> {
    let schema = batch.schema();
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

    let decoded = batch
        .columns()
        .iter()
        .map(|array| decode_column(array.as_ref()))
        .collect::<TableResult<Vec<Vec<Cell>>>>()?;

    let mut table = TableRows::new(columns);
    for row_idx in 0..batch.num_rows() {
        table.push_row(decoded.iter().map(|col| col[row_idx].clone()).collect())?;
    }
    Ok(table)
}

fn decode_column(array: &dyn Array) -> TableResult<Vec<Cell>> {
    let len = array.len();

    macro_rules! decode_as {
        ($array_type:ty, $variant:expr) => {{
            let typed = array
                .as_any()
                .downcast_ref::<$array_type>()
                .ok_or_else(|| TableError::Decode(format!("unexpected array for {}", array.data_type())))?;
            (0..len)
                .map(|i| {
                    if typed.is_null(i) {
                        Cell::Null
                    } else {
                        ($variant)(typed.value(i))
                    }
                })
                .collect()
        }};
    }

    let cells = match array.data_type() {
        DataType::Boolean => decode_as!(BooleanArray, Cell::Bool),
        DataType::Int64 => decode_as!(Int64Array, Cell::Int),
        DataType::Float64 => decode_as!(Float64Array, Cell::Float),
        DataType::Utf8 => decode_as!(StringArray, |s: &str| Cell::Text(s.to_string())),
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(array, &options)?;
            // NullArray has no validity buffer, only logical nulls
            let nulls = array.logical_nulls();
            (0..len)
                .map(|i| {
                    if nulls.as_ref().is_some_and(|n| n.is_null(i)) {
                        Cell::Null
                    } else {
                        Cell::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}
