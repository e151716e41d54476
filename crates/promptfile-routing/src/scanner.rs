//! Startup scan of the prompt directory tree.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use promptfile_config::DeclarationFile;
use tracing::debug;

use crate::error::CompileError;

/// Extension of declaration files.
const EXTENSION: &str = "prompt";

/// Recursively collect every declaration file under `root`, reading its
/// contents and deriving its route path from its location. Entries are
/// visited in name order so the catalog's registration order is stable
/// across runs.
pub async fn scan_prompt_dir(root: &Path) -> Result<Vec<DeclarationFile>, CompileError> {
  let mut files = Vec::new();
  walk(root, root, &mut files).await?;
  debug!(count = files.len(), root = %root.display(), "scanned prompt directory");
  Ok(files)
}

fn walk<'a>(
  root: &'a Path,
  dir: &'a Path,
  files: &'a mut Vec<DeclarationFile>,
) -> BoxFuture<'a, Result<(), CompileError>> {
  Box::pin(async move {
    let mut entries = collect_dir(dir).await?;
    entries.sort();

    for path in entries {
      if path.is_dir() {
        walk(root, &path, files).await?;
      } else if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
        let content = tokio::fs::read_to_string(&path)
          .await
          .map_err(|source| CompileError::Io {
            path: path.clone(),
            source,
          })?;
        files.push(DeclarationFile {
          route_path: route_path(root, &path),
          path,
          content,
        });
      }
    }

    Ok(())
  })
}

async fn collect_dir(dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
  let mut reader = tokio::fs::read_dir(dir)
    .await
    .map_err(|source| CompileError::Io {
      path: dir.to_path_buf(),
      source,
    })?;

  let mut entries = Vec::new();
  while let Some(entry) = reader.next_entry().await.map_err(|source| CompileError::Io {
    path: dir.to_path_buf(),
    source,
  })? {
    entries.push(entry.path());
  }
  Ok(entries)
}

/// Route path for a file: its path relative to the root, `/`-separated,
/// extension stripped, always with a leading slash.
fn route_path(root: &Path, path: &Path) -> String {
  let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
  let mut route = String::new();
  for component in relative.components() {
    route.push('/');
    route.push_str(&component.as_os_str().to_string_lossy());
  }
  route
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn collects_nested_declaration_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("items")).unwrap();
    std::fs::create_dir_all(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("items/[id].prompt"), "a").unwrap();
    std::fs::write(dir.path().join("docs/[...slug].prompt"), "b").unwrap();
    std::fs::write(dir.path().join("health.prompt"), "c").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let files = scan_prompt_dir(dir.path()).await.unwrap();
    let routes: Vec<&str> = files.iter().map(|f| f.route_path.as_str()).collect();
    assert_eq!(routes, vec!["/docs/[...slug]", "/health", "/items/[id]"]);
    assert_eq!(files[1].content, "c");
  }

  #[tokio::test]
  async fn missing_root_is_an_io_error() {
    let err = scan_prompt_dir(Path::new("/nonexistent-prompt-root"))
      .await
      .unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
  }
}
