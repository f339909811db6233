use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Extension of flat corpus files (one headline per line).
pub const CORPUS_EXTENSION: &str = "txt";

/// Reads a corpus file, one headline per line (`\n` or `\r\n`).
pub fn read_lines<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
	let contents = fs::read_to_string(path)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Resolves the data folder given on the command line.
///
/// `"."` and `"./"` become the current working directory, anything else is
/// used as given.
pub fn normalize_folder(folder: &str) -> PathBuf {
	match folder {
		"." | "./" => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
		_ => PathBuf::from(folder),
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted so that loading order
/// does not depend on the file system.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}
