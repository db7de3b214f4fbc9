//! File system tools.
//!
//! Relative paths resolve against the configured workspace directory;
//! absolute paths are used as given.

use super::{Tool, ToolError};
use std::path::{Path, PathBuf};

fn resolve(workspace: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

fn missing_arg(expected: usize, got: usize) -> ToolError {
    ToolError::Arity { expected, got }
}

/// Create a file with optional content.
pub struct CreateFile {
    workspace: PathBuf,
}

impl CreateFile {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for CreateFile {
    fn name(&self) -> &str {
        "create_file"
    }

    fn description(&self) -> &str {
        "Create a new file with optional content"
    }

    fn params(&self) -> &[&str] {
        &["filepath", "content"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let filepath = args.first().ok_or_else(|| missing_arg(2, args.len()))?;
        let content = args.get(1).map(String::as_str).unwrap_or_default();

        let path = resolve(&self.workspace, filepath);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::failed(format!("Error creating file: {}", e)))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ToolError::failed(format!("Error creating file: {}", e)))?;

        Ok(format!("File created: {}", path.display()))
    }
}

/// Read the contents of a file.
pub struct ReadFile {
    workspace: PathBuf,
}

impl ReadFile {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for ReadFile {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read contents of a file"
    }

    fn params(&self) -> &[&str] {
        &["filepath"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let filepath = args.first().ok_or_else(|| missing_arg(1, args.len()))?;
        let path = resolve(&self.workspace, filepath);

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::failed(format!("Error reading file: {}", e)))
    }
}

/// Delete a file.
pub struct DeleteFile {
    workspace: PathBuf,
}

impl DeleteFile {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteFile {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a file"
    }

    fn params(&self) -> &[&str] {
        &["filepath"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let filepath = args.first().ok_or_else(|| missing_arg(1, args.len()))?;
        let path = resolve(&self.workspace, filepath);

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| ToolError::failed(format!("Error deleting file: {}", e)))?;

        Ok(format!("File deleted: {}", path.display()))
    }
}

/// List files in a directory. Defaults to the workspace root.
pub struct ListFiles {
    workspace: PathBuf,
}

impl ListFiles {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for ListFiles {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List all files in a directory"
    }

    fn params(&self) -> &[&str] {
        &["directory"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let directory = args.first().map(String::as_str).unwrap_or(".");
        let path = resolve(&self.workspace, directory);

        let mut entries = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| ToolError::failed(format!("Error listing files: {}", e)))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ToolError::failed(format!("Error listing files: {}", e)))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        if names.is_empty() {
            return Ok(format!("No files in {}", path.display()));
        }

        Ok(format!(
            "Files in {}:\n{}",
            path.display(),
            names.join("\n")
        ))
    }
}

/// Create a folder, including parents.
pub struct CreateFolder {
    workspace: PathBuf,
}

impl CreateFolder {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for CreateFolder {
    fn name(&self) -> &str {
        "create_folder"
    }

    fn description(&self) -> &str {
        "Create a new folder"
    }

    fn params(&self) -> &[&str] {
        &["folderpath"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let folderpath = args.first().ok_or_else(|| missing_arg(1, args.len()))?;
        let path = resolve(&self.workspace, folderpath);

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| ToolError::failed(format!("Error creating folder: {}", e)))?;

        Ok(format!("Folder created: {}", path.display()))
    }
}

/// Move or rename a file.
pub struct MoveFile {
    workspace: PathBuf,
}

impl MoveFile {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for MoveFile {
    fn name(&self) -> &str {
        "move_file"
    }

    fn description(&self) -> &str {
        "Move a file from source to destination"
    }

    fn params(&self) -> &[&str] {
        &["source", "destination"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        if args.len() < 2 {
            return Err(missing_arg(2, args.len()));
        }
        let source = resolve(&self.workspace, &args[0]);
        let destination = resolve(&self.workspace, &args[1]);

        tokio::fs::rename(&source, &destination)
            .await
            .map_err(|e| ToolError::failed(format!("Error moving file: {}", e)))?;

        Ok(format!(
            "Moved {} to {}",
            source.display(),
            destination.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let create = CreateFile::new(dir.path());
        let read = ReadFile::new(dir.path());

        let out = create
            .invoke(&["notes.txt".to_string(), "hello".to_string()])
            .await
            .unwrap();
        assert!(out.contains("notes.txt"));

        let content = read.invoke(&["notes.txt".to_string()]).await.unwrap();
        assert_eq!(content, "hello");
    }

    #[tokio::test]
    async fn test_create_file_without_content() {
        let dir = tempfile::tempdir().unwrap();
        let create = CreateFile::new(dir.path());
        create.invoke(&["empty.txt".to_string()]).await.unwrap();

        let content = tokio::fs::read_to_string(dir.path().join("empty.txt"))
            .await
            .unwrap();
        assert_eq!(content, "");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_textual_error() {
        let dir = tempfile::tempdir().unwrap();
        let read = ReadFile::new(dir.path());
        let err = read.invoke(&["missing.txt".to_string()]).await.unwrap_err();
        assert!(matches!(err, ToolError::Failed(_)));
    }

    #[tokio::test]
    async fn test_read_file_requires_argument() {
        let dir = tempfile::tempdir().unwrap();
        let read = ReadFile::new(dir.path());
        let err = read.invoke(&[]).await.unwrap_err();
        assert!(matches!(err, ToolError::Arity { expected: 1, got: 0 }));
    }

    #[tokio::test]
    async fn test_list_files_defaults_to_workspace() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();

        let list = ListFiles::new(dir.path());
        let out = list.invoke(&[]).await.unwrap();
        assert!(out.contains("a.txt"));
        assert!(out.contains("b.txt"));
    }

    #[tokio::test]
    async fn test_move_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.txt"), "data").unwrap();

        let mv = MoveFile::new(dir.path());
        mv.invoke(&["old.txt".to_string(), "new.txt".to_string()])
            .await
            .unwrap();
        assert!(dir.path().join("new.txt").exists());

        let del = DeleteFile::new(dir.path());
        del.invoke(&["new.txt".to_string()]).await.unwrap();
        assert!(!dir.path().join("new.txt").exists());
    }

    #[tokio::test]
    async fn test_create_folder() {
        let dir = tempfile::tempdir().unwrap();
        let mkdir = CreateFolder::new(dir.path());
        mkdir
            .invoke(&["projects/rust".to_string()])
            .await
            .unwrap();
        assert!(dir.path().join("projects/rust").is_dir());
    }
}
