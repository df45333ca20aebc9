use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

/// The in-memory metadata store
///
/// Holds the precomputed movie catalog and index lookups over it. Built once
/// at startup from the catalog artifact; read-only afterwards. Row positions
/// are the canonical ordering the similarity matrix is aligned with.
#[derive(Debug)]
pub struct MovieCatalog {
    movies: Vec<Movie>,
    by_id: HashMap<u32, usize>,
    by_title: HashMap<String, usize>,
}

impl MovieCatalog {
    /// Builds the catalog and its indexes
    ///
    /// Duplicate movie ids are a data-integrity error. Duplicate titles are
    /// tolerated; title lookup resolves to the first occurrence, matching the
    /// ordering the offline pipeline emitted.
    pub fn new(movies: Vec<Movie>) -> AppResult<Self> {
        let mut by_id = HashMap::with_capacity(movies.len());
        let mut by_title = HashMap::with_capacity(movies.len());

        for (index, movie) in movies.iter().enumerate() {
            if by_id.insert(movie.id, index).is_some() {
                return Err(AppError::DataIntegrity(format!(
                    "duplicate movie id {} in catalog",
                    movie.id
                )));
            }
            by_title.entry(movie.title.to_lowercase()).or_insert(index);
        }

        Ok(Self {
            movies,
            by_id,
            by_title,
        })
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Movie at a catalog row position
    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    /// Row position of a movie id
    pub fn index_of_id(&self, id: u32) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Row position of a title, compared case-insensitively
    pub fn index_of_title(&self, title: &str) -> Option<usize> {
        self.by_title.get(&title.to_lowercase()).copied()
    }

    /// All movies in catalog order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// All titles in catalog order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|m| m.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u32, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            feature_text: String::new(),
            poster_path: None,
        }
    }

    #[test]
    fn test_title_lookup_is_case_insensitive() {
        let catalog =
            MovieCatalog::new(vec![movie(1, "Inception"), movie(2, "Interstellar")]).unwrap();

        assert_eq!(catalog.index_of_title("inception"), Some(0));
        assert_eq!(catalog.index_of_title("INTERSTELLAR"), Some(1));
        assert_eq!(catalog.index_of_title("Tenet"), None);
    }

    #[test]
    fn test_id_lookup() {
        let catalog = MovieCatalog::new(vec![movie(27205, "Inception")]).unwrap();

        assert_eq!(catalog.index_of_id(27205), Some(0));
        assert_eq!(catalog.index_of_id(603), None);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = MovieCatalog::new(vec![movie(1, "Inception"), movie(1, "Tenet")]);

        assert!(matches!(result, Err(AppError::DataIntegrity(_))));
    }

    #[test]
    fn test_duplicate_titles_resolve_to_first_occurrence() {
        let catalog = MovieCatalog::new(vec![
            movie(1, "The Thing"),
            movie(2, "Solaris"),
            movie(3, "The Thing"),
        ])
        .unwrap();

        assert_eq!(catalog.index_of_title("the thing"), Some(0));
    }

    #[test]
    fn test_get_returns_row_order() {
        let catalog =
            MovieCatalog::new(vec![movie(10, "Alien"), movie(20, "Aliens")]).unwrap();

        assert_eq!(catalog.get(1).map(|m| m.title.as_str()), Some("Aliens"));
        assert_eq!(catalog.get(2), None);
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
    }
}
