use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{CustomPatternError, PatternError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    CustomPattern(#[from] CustomPatternError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
