use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Fail when `output` names the same file as any of `inputs`.
pub fn ensure_output_not_same(output: &Path, inputs: &[&Path]) -> Result<()> {
    let out_norm = normalize_for_compare(output)
        .with_context(|| format!("failed to normalize output path {}", output.display()))?;

    for input in inputs {
        let in_norm = normalize_for_compare(input)
            .with_context(|| format!("failed to normalize input path {}", input.display()))?;
        if out_norm == in_norm {
            bail!(
                "refusing to overwrite input file: output {} matches {}",
                output.display(),
                input.display()
            );
        }
    }
    Ok(())
}

fn normalize_for_compare(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    // Not on disk yet: canonicalize the parent when it exists so `./x` and
    // `dir/../x` still compare equal to an existing sibling.
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().context("current_dir")?.join(path)
    };
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) if parent.exists() => Ok(parent
            .canonicalize()
            .with_context(|| format!("canonicalize {}", parent.display()))?
            .join(name)),
        _ => Ok(absolute),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::ensure_output_not_same;

    #[test]
    fn detects_same_file_through_dot_segments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = dir.path().join("profiles.json");
        fs::write(&store, "[]").expect("write");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");

        let sneaky = dir.path().join("sub").join("..").join("profiles.json");
        assert!(ensure_output_not_same(&sneaky, &[&store]).is_err());

        let other = dir.path().join("SW-1-baseline.cfg");
        assert!(ensure_output_not_same(&other, &[&store]).is_ok());
    }

    #[test]
    fn missing_inputs_compare_by_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = dir.path().join("profiles.json");
        assert!(ensure_output_not_same(&store, &[&store]).is_err());
    }
}
