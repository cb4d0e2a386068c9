//! Structured CMS queries

/// Which version of the content a request reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentRef {
    /// Currently published content
    #[default]
    Master,
    /// Unpublished draft identified by a preview token
    Preview(String),
}

impl ContentRef {
    pub fn from_preview(reference: Option<&str>) -> Self {
        match reference {
            Some(r) if !r.is_empty() => Self::Preview(r.to_string()),
            _ => Self::Master,
        }
    }
}

/// A query predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `path` equals `value`
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::At {
            path: path.into(),
            value: value.into(),
        }
    }

    fn render(&self) -> String {
        match self {
            Self::At { path, value } => {
                format!("[at({}, \"{}\")]", path, value.replace('"', "\\\""))
            }
        }
    }
}

/// A document search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub fetch: Vec<String>,
    pub page_size: Option<usize>,
    pub orderings: Option<String>,
    pub reference: ContentRef,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// The listing query: posts only, display fields only, most recently
    /// modified first
    pub fn posts(page_size: usize) -> Self {
        Self::new()
            .predicate(Predicate::at("document.type", "post"))
            .fetch(["post.title", "post.subtitle", "post.author"])
            .page_size(page_size)
            .orderings("[document.last_publication_date desc]")
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    pub fn orderings(mut self, orderings: impl Into<String>) -> Self {
        self.orderings = Some(orderings.into());
        self
    }

    pub fn reference(mut self, reference: ContentRef) -> Self {
        self.reference = reference;
        self
    }

    /// The `q` parameter
    pub fn q(&self) -> String {
        let inner: String = self.predicates.iter().map(Predicate::render).collect();
        format!("[{}]", inner)
    }

    /// Query string pairs, without `ref` and `access_token`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q())];
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.to_string()));
        }
        if let Some(ref orderings) = self.orderings {
            params.push(("orderings", orderings.clone()));
        }
        params
    }
}
