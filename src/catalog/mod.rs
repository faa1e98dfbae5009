//! # Exercise Catalog
//!
//! Read-only exercise dataset. The builtin set ships inside the binary; additional catalogs are
//! YAML files, or directories of YAML files, each holding a list of [`Exercise`] records.
//! Exercise ids are unique across a catalog.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{CamlpadError, Result};

mod exercise;

pub use exercise::{Difficulty, Exercise};

const BUILTIN_CATALOG: &str = include_str!("../../data/exercises.yaml");

/// Optional constraints for listing exercises.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
    /// Case-insensitive substring of the title or description.
    pub query: Option<String>,
}

impl CatalogFilter {
    pub fn matches(&self, exercise: &Exercise) -> bool {
        self.difficulty.map_or(true, |d| exercise.difficulty == d)
            && self
                .category
                .as_deref()
                .map_or(true, |c| exercise.category.eq_ignore_ascii_case(c))
            && self.query.as_deref().map_or(true, |q| {
                let q = q.to_lowercase();
                exercise.title.to_lowercase().contains(&q)
                    || exercise.description.to_lowercase().contains(&q)
            })
    }
}

/// Completion tally for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress<'a> {
    pub category: &'a str,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

impl Catalog {
    /// The exercises bundled with camlpad.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG, "builtin")
    }

    pub fn from_yaml_str(source: &str, origin: &str) -> Result<Self> {
        let exercises: Vec<Exercise> =
            serde_yaml::from_str(source).map_err(|e| CamlpadError::Catalog {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        Self::from_exercises(exercises)
    }

    pub fn from_exercises(exercises: Vec<Exercise>) -> Result<Self> {
        let mut seen = HashSet::new();
        for exercise in &exercises {
            if !seen.insert(exercise.id.as_str()) {
                return Err(CamlpadError::DuplicateExercise {
                    id: exercise.id.clone(),
                });
            }
        }
        Ok(Self { exercises })
    }

    /// Loads a catalog from a YAML file, or from every `*.yaml`/`*.yml` file under a directory
    /// in path order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let files = if path.is_dir() {
            discover_yaml_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut exercises = Vec::new();
        for file in files {
            let source = fs::read_to_string(&file).map_err(|e| CamlpadError::io(&file, e))?;
            let origin = file.display().to_string();
            let parsed: Vec<Exercise> =
                serde_yaml::from_str(&source).map_err(|e| CamlpadError::Catalog {
                    origin: origin.clone(),
                    message: e.to_string(),
                })?;
            debug!(file = %origin, count = parsed.len(), "loaded exercises");
            exercises.extend(parsed);
        }
        Self::from_exercises(exercises)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Exercise> {
        self.get(id)
            .ok_or_else(|| CamlpadError::UnknownExercise { id: id.to_string() })
    }

    pub fn filter<'a>(&'a self, filter: &'a CatalogFilter) -> impl Iterator<Item = &'a Exercise> {
        self.exercises.iter().filter(move |e| filter.matches(e))
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.exercises
            .iter()
            .map(|e| e.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Completed and total exercise counts per category, in first-appearance order.
    /// Completed ids unknown to the catalog are ignored.
    pub fn completion_by_category(&self, completed: &BTreeSet<String>) -> Vec<CategoryProgress<'_>> {
        self.categories()
            .into_iter()
            .map(|category| {
                let members = self.exercises.iter().filter(|e| e.category == category);
                let (total, done) = members.fold((0, 0), |(total, done), e| {
                    (total + 1, done + usize::from(completed.contains(&e.id)))
                });
                CategoryProgress {
                    category,
                    completed: done,
                    total,
                }
            })
            .collect()
    }
}

fn discover_yaml_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| CamlpadError::Catalog {
            origin: root.display().to_string(),
            message: format!("failed to walk directory: {e}"),
        })?;
        let is_yaml = entry
            .path()
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml");
        if entry.file_type().is_file() && is_yaml {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_EXERCISES: &str = r#"
- id: double
  title: Double
  description: Double a number.
  difficulty: easy
  category: Basics
  starter_code: |
    let double x =
      failwith "TODO"
  solution: |
    let double x = 2 * x
  tests: |
    let () =
      assert (double 2 = 4);
      print_endline "All tests passed!"
- id: halve
  title: Halve
  description: Halve a number.
  difficulty: medium
  category: basics
  starter_code: "let halve x = failwith \"TODO\""
  solution: "let halve x = x / 2"
  tests: "assert (halve 4 = 2);"
  hints: ["Use integer division"]
"#;

    #[test]
    fn test_parse_and_lookup() {
        let catalog = Catalog::from_yaml_str(TWO_EXERCISES, "inline").unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.require("halve").unwrap().hints, ["Use integer division"]);
        assert!(catalog.get("double").unwrap().hints.is_empty());
        assert!(matches!(
            catalog.require("triple"),
            Err(CamlpadError::UnknownExercise { .. })
        ));
    }

    #[test]
    fn test_filter_by_difficulty_and_category() {
        let catalog = Catalog::from_yaml_str(TWO_EXERCISES, "inline").unwrap();
        let medium = CatalogFilter {
            difficulty: Some(Difficulty::Medium),
            ..CatalogFilter::default()
        };
        let ids: Vec<_> = catalog.filter(&medium).map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["halve"]);

        let basics = CatalogFilter {
            category: Some("BASICS".into()),
            ..CatalogFilter::default()
        };
        assert_eq!(catalog.filter(&basics).count(), 2);
    }

    #[test]
    fn test_filter_by_query_in_title_or_description() {
        let catalog = Catalog::from_yaml_str(TWO_EXERCISES, "inline").unwrap();
        let ids = |query: &str| {
            let filter = CatalogFilter {
                query: Some(query.into()),
                ..CatalogFilter::default()
            };
            catalog
                .filter(&filter)
                .map(|e| e.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids("HALVE"), ["halve"]);
        assert_eq!(ids("a number"), ["double", "halve"]);
        assert!(ids("triple").is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let doubled = format!("{TWO_EXERCISES}{}", TWO_EXERCISES.replacen("halve", "other", 1));
        assert!(matches!(
            Catalog::from_yaml_str(&doubled, "inline"),
            Err(CamlpadError::DuplicateExercise { .. })
        ));
    }

    #[test]
    fn test_invalid_yaml_reports_origin() {
        let err = Catalog::from_yaml_str("- id: [", "broken.yaml").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_completion_by_category() {
        let mut exercises = Catalog::from_yaml_str(TWO_EXERCISES, "inline")
            .unwrap()
            .exercises()
            .to_vec();
        exercises[1].category = "Arithmetic".into();
        let catalog = Catalog::from_exercises(exercises).unwrap();

        let completed = BTreeSet::from(["halve".to_string(), "gone".to_string()]);
        let tally: Vec<_> = catalog
            .completion_by_category(&completed)
            .into_iter()
            .map(|p| (p.category, p.completed, p.total))
            .collect();
        assert_eq!(tally, [("Basics", 0, 1), ("Arithmetic", 1, 1)]);
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.len() >= 8);
        assert!(catalog.get("factorial").is_some());
        assert!(catalog.categories().contains(&"Recursion"));
    }
}
