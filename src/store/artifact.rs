use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    store::{catalog::MovieCatalog, similarity::SimilarityMatrix},
};

/// Schema identifier carried by catalog artifacts
pub const CATALOG_SCHEMA: &str = "cinematch/catalog";

/// Schema identifier carried by similarity artifacts
pub const SIMILARITY_SCHEMA: &str = "cinematch/similarity";

/// Artifact format version this build reads and writes
pub const ARTIFACT_VERSION: u32 = 1;

/// On-disk form of the movie catalog
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogArtifact {
    pub schema: String,
    pub version: u32,
    pub built_at: DateTime<Utc>,
    pub movies: Vec<Movie>,
}

impl CatalogArtifact {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            schema: CATALOG_SCHEMA.to_string(),
            version: ARTIFACT_VERSION,
            built_at: Utc::now(),
            movies,
        }
    }
}

/// On-disk form of the similarity matrix
///
/// `movie_ids` records which catalog movie each row refers to, in row order,
/// so catalog/matrix compatibility is checkable instead of assumed.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarityArtifact {
    pub schema: String,
    pub version: u32,
    pub built_at: DateTime<Utc>,
    pub movie_ids: Vec<u32>,
    pub rows: Vec<Vec<f32>>,
}

impl SimilarityArtifact {
    pub fn new(movie_ids: Vec<u32>, rows: Vec<Vec<f32>>) -> Self {
        Self {
            schema: SIMILARITY_SCHEMA.to_string(),
            version: ARTIFACT_VERSION,
            built_at: Utc::now(),
            movie_ids,
            rows,
        }
    }
}

/// Loads and cross-validates both artifacts into the in-memory store
///
/// Fails with a `DataIntegrity` error naming the offending artifact when a
/// schema identifier or version does not match, or when any invariant of the
/// store does not hold: duplicate catalog ids, a matrix that is not square,
/// symmetric and finite, or a matrix id list that does not line up with the
/// catalog row for row.
pub fn load_store<P: AsRef<Path>>(
    catalog_path: P,
    similarity_path: P,
) -> AppResult<(MovieCatalog, SimilarityMatrix)> {
    let catalog_path = catalog_path.as_ref();
    let similarity_path = similarity_path.as_ref();

    let catalog_artifact: CatalogArtifact = read_artifact(catalog_path)?;
    check_envelope(
        catalog_path,
        &catalog_artifact.schema,
        CATALOG_SCHEMA,
        catalog_artifact.version,
    )?;

    let similarity_artifact: SimilarityArtifact = read_artifact(similarity_path)?;
    check_envelope(
        similarity_path,
        &similarity_artifact.schema,
        SIMILARITY_SCHEMA,
        similarity_artifact.version,
    )?;

    let catalog = MovieCatalog::new(catalog_artifact.movies)?;
    let matrix = SimilarityMatrix::new(similarity_artifact.rows)?;

    if similarity_artifact.movie_ids.len() != matrix.len() {
        return Err(AppError::DataIntegrity(format!(
            "{}: id list covers {} movies but the matrix has {} rows",
            similarity_path.display(),
            similarity_artifact.movie_ids.len(),
            matrix.len()
        )));
    }

    if matrix.len() != catalog.len() {
        return Err(AppError::DataIntegrity(format!(
            "similarity matrix covers {} movies but the catalog has {}",
            matrix.len(),
            catalog.len()
        )));
    }

    for (row, id) in similarity_artifact.movie_ids.iter().enumerate() {
        match catalog.index_of_id(*id) {
            Some(index) if index == row => {}
            Some(index) => {
                return Err(AppError::DataIntegrity(format!(
                    "similarity row {} refers to movie {} at catalog row {}; artifacts were built from different catalog orderings",
                    row, id, index
                )));
            }
            None => {
                return Err(AppError::DataIntegrity(format!(
                    "similarity row {} refers to movie {} which is not in the catalog",
                    row, id
                )));
            }
        }
    }

    tracing::info!(
        movies = catalog.len(),
        catalog_built_at = %catalog_artifact.built_at,
        similarity_built_at = %similarity_artifact.built_at,
        "Loaded catalog and similarity artifacts"
    );

    Ok((catalog, matrix))
}

/// Writes a catalog artifact, picking the encoding from the file extension
pub fn write_catalog<P: AsRef<Path>>(path: P, artifact: &CatalogArtifact) -> AppResult<()> {
    write_artifact(path.as_ref(), artifact)
}

/// Writes a similarity artifact, picking the encoding from the file extension
pub fn write_similarity<P: AsRef<Path>>(path: P, artifact: &SimilarityArtifact) -> AppResult<()> {
    write_artifact(path.as_ref(), artifact)
}

fn check_envelope(path: &Path, found: &str, expected: &str, version: u32) -> AppResult<()> {
    if found != expected {
        return Err(AppError::DataIntegrity(format!(
            "{}: schema identifier is \"{}\", expected \"{}\"",
            path.display(),
            found,
            expected
        )));
    }
    if version != ARTIFACT_VERSION {
        return Err(AppError::DataIntegrity(format!(
            "{}: artifact version {} is not supported (this build reads version {})",
            path.display(),
            version,
            ARTIFACT_VERSION
        )));
    }
    Ok(())
}

/// Decodes an artifact file, dispatching on its extension
///
/// `.json` files hold the envelope as JSON; `.bin` files hold the same
/// envelope bincode-encoded, for catalogs large enough that JSON parse time
/// hurts startup.
fn read_artifact<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let file = File::open(path).map_err(|e| {
        AppError::DataIntegrity(format!("failed to open artifact {}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);

    match extension_of(path) {
        "json" => serde_json::from_reader(reader).map_err(|e| {
            AppError::DataIntegrity(format!("failed to parse {}: {}", path.display(), e))
        }),
        "bin" => bincode::deserialize_from(reader).map_err(|e| {
            AppError::DataIntegrity(format!("failed to decode {}: {}", path.display(), e))
        }),
        other => Err(AppError::DataIntegrity(format!(
            "unsupported artifact extension \"{}\" for {}",
            other,
            path.display()
        ))),
    }
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let extension = extension_of(path);
    if extension != "json" && extension != "bin" {
        return Err(AppError::DataIntegrity(format!(
            "unsupported artifact extension \"{}\" for {}",
            extension,
            path.display()
        )));
    }

    let file = File::create(path).map_err(|e| {
        AppError::DataIntegrity(format!(
            "failed to create artifact {}: {}",
            path.display(),
            e
        ))
    })?;
    let writer = BufWriter::new(file);

    if extension == "json" {
        serde_json::to_writer_pretty(writer, value).map_err(|e| {
            AppError::DataIntegrity(format!("failed to write {}: {}", path.display(), e))
        })
    } else {
        bincode::serialize_into(writer, value).map_err(|e| {
            AppError::DataIntegrity(format!("failed to encode {}: {}", path.display(), e))
        })
    }
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}
