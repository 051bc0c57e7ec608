use crate::error::TransferError;
use engine_config::settings::import::ImportSettings;
use std::path::{Path, PathBuf};

/// Source files of `table`: the explicit list when one is configured,
/// otherwise every file in the input directory named `<table>`,
/// `<table>.<ext>` or `<table>_<n>...`.
pub fn files_for_table(import: &ImportSettings, table: &str) -> Result<Vec<PathBuf>, TransferError> {
    if let Some(files) = import.files.get(table) {
        if files.is_empty() {
            return Err(TransferError::NoSourceFiles(table.to_string()));
        }
        return Ok(files.clone());
    }

    let Some(dir) = &import.input_dir else {
        return Err(TransferError::NoSourceFiles(table.to_string()));
    };

    let mut files = scan_dir(dir, table)?;
    if files.is_empty() {
        return Err(TransferError::NoSourceFiles(table.to_string()));
    }
    files.sort();
    Ok(files)
}

fn scan_dir(dir: &Path, table: &str) -> Result<Vec<PathBuf>, TransferError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if belongs_to(&name.to_string_lossy(), table) {
            files.push(entry.path());
        }
    }
    Ok(files)
}

fn belongs_to(file_name: &str, table: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(table) else {
        return false;
    };
    match rest.chars().next() {
        None | Some('.') => true,
        Some('_') => rest[1..].starts_with(|c: char| c.is_ascii_digit()),
        Some(_) => false,
    }
}

/// Splits `files` into at most `producers` groups round-robin. Each file keeps
/// its position in `files` as its source index.
pub fn group_files(files: &[PathBuf], producers: usize) -> Vec<Vec<(usize, PathBuf)>> {
    let groups = producers.max(1).min(files.len());
    let mut out = vec![Vec::new(); groups];
    for (index, path) in files.iter().enumerate() {
        out[index % groups].push((index, path.clone()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_table_prefix_convention() {
        assert!(belongs_to("orders", "orders"));
        assert!(belongs_to("orders.csv", "orders"));
        assert!(belongs_to("orders_0.txt", "orders"));
        assert!(!belongs_to("orders_items.csv", "orders"));
        assert!(!belongs_to("orders2.csv", "orders"));
        assert!(!belongs_to("customers.csv", "orders"));
    }

    #[test]
    fn scans_input_dir_when_no_explicit_list() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["t_1.csv", "t_0.csv", "u.csv", "t_x.csv"] {
            std::fs::write(dir.path().join(name), "1\n").unwrap();
        }
        let import = ImportSettings {
            input_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let files = files_for_table(&import, "t").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["t_0.csv", "t_1.csv"]);

        assert!(matches!(
            files_for_table(&import, "v"),
            Err(TransferError::NoSourceFiles(_))
        ));
    }

    #[test]
    fn groups_files_round_robin() {
        let files: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("f{i}"))).collect();
        let groups = group_files(&files, 2);
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0].iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![0, 2, 4]
        );
        assert_eq!(group_files(&files[..1], 8).len(), 1);
    }
}
