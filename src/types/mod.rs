//! Semantic data types shared by every engine component.

mod sql_type;
mod value;
mod column;
mod record;

pub use sql_type::SqlType;
pub use value::Value;
pub use column::{ColumnInfo, ColumnMetadata, ResultColumn, TableMetadata};
pub use record::Record;
