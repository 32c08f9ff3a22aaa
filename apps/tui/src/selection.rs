use std::path::Path;
use std::sync::Arc;

use crate::error::SelectionError;

/// A file chosen by the user, kept as opaque bytes.
///
/// The content is shared so handing a copy to an upload task does not clone
/// the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedInput {
    file_name: String,
    content: Arc<[u8]>,
}

impl SelectedInput {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: Arc::from(content.into()),
        }
    }

    /// Reads the whole file into memory. No format check is made here.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SelectionError::EmptyPath);
        }

        let content = std::fs::read(path).map_err(|source| SelectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.csv")
            .to_string();

        Ok(Self::new(file_name, content))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FileSelection {
    current: Option<SelectedInput>,
}

impl FileSelection {
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Replaces whatever was selected before.
    pub fn select(&mut self, input: SelectedInput) {
        self.current = Some(input);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub const fn has_selection(&self) -> bool {
        self.current.is_some()
    }

    pub const fn current(&self) -> Option<&SelectedInput> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn select_replaces_previous_input() {
        let mut selection = FileSelection::new();
        assert!(!selection.has_selection());

        selection.select(SelectedInput::new("a.csv", b"a,b\n1,2\n".to_vec()));
        selection.select(SelectedInput::new("b.csv", b"x\n".to_vec()));

        let current = selection.current().map(SelectedInput::file_name);
        assert_eq!(current, Some("b.csv"));
    }

    #[test]
    fn clear_drops_the_selection() {
        let mut selection = FileSelection::new();
        selection.select(SelectedInput::new("a.csv", Vec::new()));
        selection.clear();

        assert!(!selection.has_selection());
    }

    #[test]
    fn from_path_reads_bytes_and_name() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ventas.csv");
        let mut file = std::fs::File::create(&path)?;
        file.write_all(b"region,total\nnorte,10\n")?;

        let input = SelectedInput::from_path(&path)?;

        assert_eq!(input.file_name(), "ventas.csv");
        assert_eq!(input.content(), b"region,total\nnorte,10\n");
        assert_eq!(input.len(), 22);
        Ok(())
    }

    #[test]
    fn from_path_reports_missing_file() {
        let result = SelectedInput::from_path("/definitely/not/here.csv");

        assert!(matches!(result, Err(SelectionError::Read { .. })));
    }

    #[test]
    fn from_path_rejects_empty_path() {
        assert!(matches!(
            SelectedInput::from_path(""),
            Err(SelectionError::EmptyPath)
        ));
    }
}
