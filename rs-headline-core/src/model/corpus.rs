use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::io::{list_files, normalize_folder, read_lines, CORPUS_EXTENSION};
use super::token::clean_headline;

/// Anything that carries a headline title.
///
/// Scraped rows usually hold more than a title (link, date, source); only the
/// title is used for training.
pub trait Headline {
	fn title(&self) -> &str;
}

impl Headline for str {
	fn title(&self) -> &str {
		self
	}
}

impl Headline for String {
	fn title(&self) -> &str {
		self
	}
}

impl<T: Headline + ?Sized> Headline for &T {
	fn title(&self) -> &str {
		(**self).title()
	}
}

/// Cleaned, de-duplicated set of headlines, in insertion order.
///
/// Headlines are trimmed and lowercased on insertion. Exact duplicates of the
/// cleaned string, and headlines that are blank once cleaned, are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
	headlines: Vec<String>,
	seen: HashSet<String>,
	/// Names of the files this corpus was loaded from.
	sources: Vec<String>,
}

impl Corpus {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a corpus from any sequence of titled records.
	pub fn from_headlines<I>(headlines: I) -> Self
	where
		I: IntoIterator,
		I::Item: Headline,
	{
		let mut corpus = Self::new();
		corpus.extend(headlines);
		corpus
	}

	/// Loads every `.txt` file of a directory (one headline per line).
	pub fn load_dir(folder: &str) -> Result<Self> {
		let folder = normalize_folder(folder);
		let files = list_files(&folder, CORPUS_EXTENSION)?;
		Self::load_files(&folder, &files)
	}

	/// Loads the given files of a directory (one headline per line).
	pub fn load_files<P, S>(folder: P, files: &[S]) -> Result<Self>
	where
		P: AsRef<Path>,
		S: AsRef<str>,
	{
		let mut corpus = Self::new();
		for file in files {
			let file = file.as_ref();
			let lines = read_lines(folder.as_ref().join(file))?;
			let added = corpus.extend(lines.iter());
			debug!("{file}: {} lines, {added} new headlines", lines.len());
			corpus.sources.push(file.to_owned());
		}
		info!("loaded {} headlines from {} files", corpus.len(), corpus.sources.len());
		Ok(corpus)
	}

	/// Adds one headline. Returns `false` if it was blank or already present.
	pub fn push<H: Headline + ?Sized>(&mut self, headline: &H) -> bool {
		let cleaned = clean_headline(headline.title());
		if cleaned.is_empty() || self.seen.contains(&cleaned) {
			return false;
		}
		self.seen.insert(cleaned.clone());
		self.headlines.push(cleaned);
		true
	}

	/// Adds several headlines, returning how many were new.
	pub fn extend<I>(&mut self, headlines: I) -> usize
	where
		I: IntoIterator,
		I::Item: Headline,
	{
		headlines.into_iter().filter(|h| self.push(h)).count()
	}

	/// Appends every headline of `other` not already present.
	pub fn merge(&mut self, other: &Self) -> usize {
		self.sources.extend(other.sources.iter().cloned());
		self.extend(other.headlines.iter())
	}

	/// Removes the given headlines (raw or cleaned), returning how many were present.
	/// Sources are kept.
	pub fn remove(&mut self, headlines: &[String]) -> usize {
		let removed: HashSet<String> = headlines
			.iter()
			.map(|h| clean_headline(h))
			.filter(|h| self.seen.remove(h))
			.collect();
		self.headlines.retain(|h| !removed.contains(h));
		removed.len()
	}

	/// Checks membership of an already-cleaned or raw headline.
	pub fn contains(&self, headline: &str) -> bool {
		self.seen.contains(&clean_headline(headline))
	}

	pub fn len(&self) -> usize {
		self.headlines.len()
	}

	pub fn is_empty(&self) -> bool {
		self.headlines.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.headlines.iter().map(String::as_str)
	}

	pub fn headlines(&self) -> &[String] {
		&self.headlines
	}

	pub fn sources(&self) -> &[String] {
		&self.sources
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn cleans_and_deduplicates() {
		let corpus = Corpus::from_headlines(["Florida Man Arrested ", "florida man arrested", "   ", "Florida Woman"]);
		assert_eq!(corpus.headlines(), &["florida man arrested".to_owned(), "florida woman".to_owned()]);
		assert!(corpus.contains("FLORIDA WOMAN"));
		assert!(!corpus.contains("florida"));
	}

	struct Scraped {
		title: String,
		#[allow(dead_code)]
		link: String,
	}

	impl Headline for Scraped {
		fn title(&self) -> &str {
			&self.title
		}
	}

	#[test]
	fn records_keep_only_title_for_training() {
		let records = vec![
			Scraped { title: "Florida man bites dog".into(), link: "https://a".into() },
			Scraped { title: "FLORIDA MAN BITES DOG".into(), link: "https://b".into() },
		];
		let corpus = Corpus::from_headlines(&records);
		assert_eq!(corpus.len(), 1);
	}

	#[test]
	fn merge_skips_duplicates() {
		let mut a = Corpus::from_headlines(["a b", "c d"]);
		let b = Corpus::from_headlines(["c d", "e f"]);
		assert_eq!(a.merge(&b), 1);
		assert_eq!(a.len(), 3);
	}

	#[test]
	fn remove_keeps_order_and_sources() {
		let mut corpus = Corpus::from_headlines(["a b", "c d", "e f"]);
		corpus.sources.push("user.txt".to_owned());

		assert_eq!(corpus.remove(&["C D".to_owned(), "x y".to_owned()]), 1);
		assert_eq!(corpus.headlines(), &["a b".to_owned(), "e f".to_owned()]);
		assert!(!corpus.contains("c d"));
		assert!(corpus.push("c d"));
		assert_eq!(corpus.sources(), &["user.txt".to_owned()]);
	}

	#[test]
	fn loads_directory() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("local10.txt"), "Florida man steals boat\nFlorida man eats cake\n").unwrap();
		fs::write(dir.path().join("user.txt"), "florida man eats cake\n\nFlorida woman wins\n").unwrap();
		fs::write(dir.path().join("notes.md"), "ignored\n").unwrap();

		let corpus = Corpus::load_dir(dir.path().to_str().unwrap()).unwrap();
		assert_eq!(corpus.len(), 3);
		assert_eq!(corpus.sources(), &["local10.txt".to_owned(), "user.txt".to_owned()]);
	}

	#[test]
	fn missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let result = Corpus::load_files(dir.path(), &["missing.txt"]);
		assert!(matches!(result, Err(crate::ModelError::Io(_))));
	}
}
