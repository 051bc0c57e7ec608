use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Column type as reported by the target database catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    Decimal,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Bit,
    Date,
    Timestamp,
    Time,
    Year,
    Char,
    VarChar,
    Text,
    Json,
    Enum,
    Set,
    Binary,
    VarBinary,
    Blob,
    Geometry,
    Custom(String),
}

lazy_static! {
    static ref MYSQL_TYPE_MAP: HashMap<&'static str, DataType> = build_mysql_type_map();
}

impl DataType {
    /// Maps a catalog type name (`information_schema.COLUMNS.DATA_TYPE`) to a
    /// known type. Unknown names are kept as [`DataType::Custom`].
    pub fn from_mysql_type(type_name: &str) -> Self {
        let normalized = type_name.trim().to_uppercase();
        MYSQL_TYPE_MAP
            .get(normalized.as_str())
            .cloned()
            .unwrap_or(DataType::Custom(normalized))
    }

    /// Whether values of this type are exported as text that may need quoting.
    ///
    /// Temporal types are treated as strings: their rendering contains `-` and
    /// `:` which are legal separators.
    pub fn is_string_like(&self) -> bool {
        match self {
            DataType::Char
            | DataType::VarChar
            | DataType::Text
            | DataType::Json
            | DataType::Enum
            | DataType::Set
            | DataType::Binary
            | DataType::VarBinary
            | DataType::Blob
            | DataType::Date
            | DataType::Timestamp
            | DataType::Time
            | DataType::Custom(_) => true,
            DataType::Decimal
            | DataType::Short
            | DataType::Int
            | DataType::Long
            | DataType::Float
            | DataType::Double
            | DataType::Boolean
            | DataType::Bit
            | DataType::Year
            | DataType::Geometry => false,
        }
    }

    pub fn mysql_name(&self) -> &str {
        match self {
            DataType::Decimal => "DECIMAL",
            DataType::Short => "SMALLINT",
            DataType::Int => "INT",
            DataType::Long => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Boolean => "BOOLEAN",
            DataType::Bit => "BIT",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Time => "TIME",
            DataType::Year => "YEAR",
            DataType::Char => "CHAR",
            DataType::VarChar => "VARCHAR",
            DataType::Text => "TEXT",
            DataType::Json => "JSON",
            DataType::Enum => "ENUM",
            DataType::Set => "SET",
            DataType::Binary => "BINARY",
            DataType::VarBinary => "VARBINARY",
            DataType::Blob => "BLOB",
            DataType::Geometry => "GEOMETRY",
            DataType::Custom(name) => name,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mysql_name())
    }
}

fn build_mysql_type_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("TINYINT", Short),
        ("SMALLINT", Short),
        ("MEDIUMINT", Int),
        ("INT", Int),
        ("INTEGER", Int),
        ("BIGINT", Long),
        ("FLOAT", Float),
        ("DOUBLE", Double),
        ("DOUBLE PRECISION", Double),
        ("REAL", Double),
        ("DECIMAL", Decimal),
        ("NUMERIC", Decimal),
        ("BIT", Bit),
        ("TIMESTAMP", Timestamp),
        ("DATETIME", Timestamp),
        ("DATE", Date),
        ("TIME", Time),
        ("YEAR", Year),
        ("ENUM", Enum),
        ("SET", Set),
        ("JSON", Json),
        ("GEOMETRY", Geometry),
        ("POINT", Geometry),
        ("CHAR", Char),
        ("CHARACTER", Char),
        ("VARCHAR", VarChar),
        ("CHARACTER VARYING", VarChar),
        ("TEXT", Text),
        ("TINYTEXT", Text),
        ("MEDIUMTEXT", Text),
        ("LONGTEXT", Text),
        ("BINARY", Binary),
        ("VARBINARY", VarBinary),
        ("TINYBLOB", Blob),
        ("BLOB", Blob),
        ("MEDIUMBLOB", Blob),
        ("LONGBLOB", Blob),
    ];

    let mut map = HashMap::new();
    for (name, data_type) in entries {
        map.insert(name, data_type);
    }
    map
}
