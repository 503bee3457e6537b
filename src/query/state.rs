use crate::transport::ErrorKind;

/// Status of a query's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    /// An invocation is in flight and no result is shown.
    Loading,
    /// The latest invocation succeeded. Mutations edit this value in place.
    Ok(T),
    /// The latest invocation failed.
    Error(ErrorKind),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, QueryState::Ok(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            QueryState::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            QueryState::Error(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl<T> From<Result<T, ErrorKind>> for QueryState<T> {
    fn from(result: Result<T, ErrorKind>) -> Self {
        match result {
            Ok(value) => QueryState::Ok(value),
            Err(kind) => QueryState::Error(kind),
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Loading
    }
}
