/// Observable state of a single asynchronous query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    /// True once a request has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self, QueryState::Success(_) | QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Error(message) => Some(message),
            _ => None,
        }
    }
}
