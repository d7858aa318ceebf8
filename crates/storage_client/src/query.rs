//! Listing parameters for `GET /storage/files` and `GET /storage/groups`.
//!
//! Unset fields are omitted from the query string. `page` / `per_page` are
//! always sent. The service accepts `per_page` in 1..=100; not enforced here.

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Filters for listing files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    /// Free-text search (`q`)
    pub search_term: Option<String>,
    /// File kind, e.g. `android` or `ios`
    pub kind: Option<String>,
    pub file_id: Option<String>,
    pub team_id: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for FileQuery {
    fn default() -> Self {
        Self {
            search_term: None,
            kind: None,
            file_id: None,
            team_id: None,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl FileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }

    pub fn team_id(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "q", &self.search_term);
        push_opt(&mut pairs, "kind", &self.kind);
        push_opt(&mut pairs, "file_id", &self.file_id);
        push_opt(&mut pairs, "team_id", &self.team_id);
        push_paging(&mut pairs, self.page, self.per_page);
        pairs
    }
}

/// Filters for listing groups. Same as [`FileQuery`] minus `team_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupQuery {
    pub search_term: Option<String>,
    pub kind: Option<String>,
    pub file_id: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for GroupQuery {
    fn default() -> Self {
        Self {
            search_term: None,
            kind: None,
            file_id: None,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl GroupQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "q", &self.search_term);
        push_opt(&mut pairs, "kind", &self.kind);
        push_opt(&mut pairs, "file_id", &self.file_id);
        push_paging(&mut pairs, self.page, self.per_page);
        pairs
    }
}

fn push_opt(pairs: &mut Vec<(String, String)>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        pairs.push((key.to_string(), v.clone()));
    }
}

fn push_paging(pairs: &mut Vec<(String, String)>, page: u32, per_page: u32) {
    pairs.push(("page".into(), page.to_string()));
    pairs.push(("per_page".into(), per_page.to_string()));
}
