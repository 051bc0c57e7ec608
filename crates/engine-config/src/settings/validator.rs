use crate::{
    error::ConfigError,
    settings::{
        export::ExportSettings, format::FormatSettings, import::ImportSettings,
        pipeline::PipelineSettings,
    },
};
use model::{
    core::constants::ILLEGAL_SEPARATORS,
    execution::modes::{CompressMode, DdlMode, EncryptionMode, FileFormat, RecordFormat},
    topology::{rule::PartitionRule, shard::TableTopology},
};

pub fn validate_format(format: &FormatSettings) -> Result<(), ConfigError> {
    let sep = &format.separator;
    if sep.is_empty() || ILLEGAL_SEPARATORS.iter().any(|illegal| sep.contains(illegal)) {
        return Err(ConfigError::IllegalSeparator(sep.clone()));
    }
    if format.record_format == RecordFormat::Csv && sep.len() != 1 {
        return Err(ConfigError::SeparatorTooWide(sep.clone()));
    }
    Ok(())
}

/// Compression, encryption and special file formats exclude each other.
pub fn validate_output(export: &ExportSettings) -> Result<(), ConfigError> {
    let mut requested = Vec::new();
    if export.compress != CompressMode::None {
        requested.push(format!("compress={:?}", export.compress));
    }
    if export.encryption != EncryptionMode::None {
        requested.push(format!("encryption={:?}", export.encryption));
    }
    if export.file_format != FileFormat::None {
        requested.push(format!("file_format={:?}", export.file_format));
    }

    if requested.len() > 1 {
        return Err(ConfigError::ConflictingOutputOptions(requested.join(", ")));
    }
    Ok(())
}

pub fn validate_pipeline(pipeline: &PipelineSettings) -> Result<(), ConfigError> {
    let sizes = [
        ("pipeline.batch_size", pipeline.batch_size),
        ("pipeline.buffer_capacity", pipeline.buffer_capacity),
        ("pipeline.producers", pipeline.producers),
        ("pipeline.consumers", pipeline.consumers),
        ("pipeline.insert_batch_rows", pipeline.insert_batch_rows),
        ("pipeline.max_statement_bytes", pipeline.max_statement_bytes),
        ("pipeline.max_csv_multiline", pipeline.max_csv_multiline),
        ("pipeline.export_flush_rows", pipeline.export_flush_rows),
    ];

    for (field, value) in sizes {
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                field,
                message: "must be at least 1".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_import(import: &ImportSettings) -> Result<(), ConfigError> {
    if import.ddl_mode != DdlMode::NoDdl && import.ddl_file.is_none() {
        return Err(ConfigError::InvalidValue {
            field: "import.ddl_file",
            message: format!("required when ddl_mode is {}", import.ddl_mode),
        });
    }
    if import.benchmark_rows == Some(0) {
        return Err(ConfigError::InvalidValue {
            field: "import.benchmark_rows",
            message: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

pub fn validate_topology(tables: &[TableTopology]) -> Result<(), ConfigError> {
    for table in tables {
        if table.shards.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "topology.shards",
                message: format!("table '{}' has no shards", table.logical_table),
            });
        }

        let Some(partition) = &table.partition else {
            continue;
        };
        if let PartitionRule::Range { bounds } = &partition.rule {
            if bounds.len() != table.shards.len() {
                return Err(ConfigError::InvalidValue {
                    field: "topology.partition.rule.bounds",
                    message: format!(
                        "table '{}' has {} bounds for {} shards",
                        table.logical_table,
                        bounds.len(),
                        table.shards.len()
                    ),
                });
            }
            if bounds.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ConfigError::InvalidValue {
                    field: "topology.partition.rule.bounds",
                    message: format!(
                        "bounds of table '{}' must be strictly increasing",
                        table.logical_table
                    ),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::topology::shard::{PartitionSpec, ShardTarget};

    fn format(separator: &str, record_format: RecordFormat) -> FormatSettings {
        FormatSettings {
            separator: separator.to_string(),
            record_format,
            ..Default::default()
        }
    }

    #[test]
    fn separators_with_line_breaks_or_quotes_are_illegal() {
        for sep in ["", "\n", "a\rb", "\""] {
            assert!(matches!(
                validate_format(&format(sep, RecordFormat::Delimited)),
                Err(ConfigError::IllegalSeparator(_))
            ));
        }
        validate_format(&format("||", RecordFormat::Delimited)).unwrap();
    }

    #[test]
    fn csv_needs_one_character() {
        assert!(matches!(
            validate_format(&format("||", RecordFormat::Csv)),
            Err(ConfigError::SeparatorTooWide(_))
        ));
        validate_format(&format("\t", RecordFormat::Csv)).unwrap();
    }

    #[test]
    fn output_options_are_exclusive() {
        let mut export = ExportSettings::default();
        validate_output(&export).unwrap();

        export.compress = CompressMode::Gzip;
        validate_output(&export).unwrap();

        export.encryption = EncryptionMode::Aes;
        export.file_format = FileFormat::Parquet;
        let err = validate_output(&export).unwrap_err();
        assert!(
            matches!(err, ConfigError::ConflictingOutputOptions(ref s) if s.contains("Gzip") && s.contains("Aes"))
        );
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let pipeline = PipelineSettings {
            consumers: 0,
            ..Default::default()
        };
        assert!(matches!(
            validate_pipeline(&pipeline),
            Err(ConfigError::InvalidValue {
                field: "pipeline.consumers",
                ..
            })
        ));
    }

    #[test]
    fn ddl_modes_need_a_ddl_file() {
        let import = ImportSettings {
            ddl_mode: DdlMode::DdlOnly,
            ..Default::default()
        };
        assert!(validate_import(&import).is_err());
    }

    #[test]
    fn range_bounds_must_match_shards() {
        let shard = |id: &str| ShardTarget {
            shard_id: id.into(),
            url: "mysql://h/db".into(),
            physical_table: "t".into(),
        };
        let table = TableTopology {
            logical_table: "t".into(),
            shards: vec![shard("a"), shard("b")],
            partition: Some(PartitionSpec {
                column_index: 0,
                rule: PartitionRule::Range {
                    bounds: vec![100, 50],
                },
            }),
        };
        assert!(validate_topology(&[table]).is_err());
    }
}
