//! Query construction for the GDELT DOC 2.0 search endpoint.
//!
//! The query language has no explicit AND operator: values inside one clause
//! are OR'd, and clauses of different types are AND'ed by being placed next to
//! each other inside the `query` parameter.

use tracing::warn;

use crate::gdelt::errors::ValidationError;

/// Upper bound on search terms accepted by the endpoint.
pub const MAX_KEYWORDS: usize = 70;
pub const DEFAULT_MAX_RECORDS: u32 = 250;

const TIME_SUFFIX: &str = "000000";

/// A compiled, immutable set of query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    has_keywords: bool,
    query_terms: Vec<String>,
    query_params: Vec<(&'static str, String)>,
}

impl Filter {
    pub fn builder() -> FilterBuilder {
        FilterBuilder::default()
    }

    /// Whether any keyword survived cleaning.
    pub fn has_keywords(&self) -> bool {
        self.has_keywords
    }

    /// The `query=` clause, or an empty string when there are no terms.
    pub fn search_term_clause(&self) -> String {
        if self.query_terms.is_empty() {
            String::new()
        } else {
            format!("query={}", self.query_terms.join(" "))
        }
    }

    /// Date window and record cap, `&`-joined.
    pub fn param_clause(&self) -> String {
        self.query_params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Raw (unencoded) query string.
    pub fn query_string(&self) -> String {
        [self.search_term_clause(), self.param_clause()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Ordered name/value pairs, suitable for URL encoding.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(self.query_params.len() + 1);
        if !self.query_terms.is_empty() {
            params.push(("query", self.query_terms.join(" ")));
        }
        params.extend(self.query_params.iter().cloned());
        params
    }
}

#[derive(Debug, Clone)]
pub struct FilterBuilder {
    keywords: Vec<String>,
    countries: Vec<String>,
    languages: Vec<String>,
    themes: Vec<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    max_records: u32,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            countries: Vec::new(),
            languages: Vec::new(),
            themes: Vec::new(),
            start_date: None,
            end_date: None,
            max_records: DEFAULT_MAX_RECORDS,
        }
    }
}

impl FilterBuilder {
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn themes<I, S>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.themes = themes.into_iter().map(Into::into).collect();
        self
    }

    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    pub fn max_records(mut self, max_records: u32) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn build(self) -> Result<Filter, ValidationError> {
        if self.max_records == 0 {
            return Err(ValidationError::ZeroRecordCap);
        }

        let start = self
            .start_date
            .map(|d| validate_date("start date", d))
            .transpose()?;
        let end = self
            .end_date
            .map(|d| validate_date("end date", d))
            .transpose()?;

        let mut keywords = clean_terms(self.keywords);
        for keyword in &mut keywords {
            keyword.retain(|c| c != '"');
        }
        keywords.retain(|k| !k.trim().is_empty());
        if keywords.len() > MAX_KEYWORDS {
            warn!(
                "Truncating {} keywords to the endpoint limit of {}",
                keywords.len(),
                MAX_KEYWORDS
            );
            keywords.truncate(MAX_KEYWORDS);
        }

        let mut query_terms = Vec::new();
        if let Some(clause) = keyword_clause(&keywords) {
            query_terms.push(clause);
        }
        for (name, values) in [
            ("sourcecountry", clean_terms(self.countries)),
            ("sourcelang", clean_terms(self.languages)),
            ("theme", clean_terms(self.themes)),
        ] {
            if let Some(clause) = filter_clause(name, &values) {
                query_terms.push(clause);
            }
        }

        let mut query_params = Vec::new();
        let start_is_short = start.as_ref().map(|s| s.len() == 8);
        if let Some(start) = start {
            query_params.push(("startdatetime", pad_date(start, None)));
        }
        if let Some(end) = end {
            // End-date padding follows the start date's width when one is set, so
            // an 8-digit start with a 14-digit end yields a 20-digit end bound.
            query_params.push(("enddatetime", pad_date(end, start_is_short)));
        }
        query_params.push(("maxrecords", self.max_records.to_string()));

        Ok(Filter {
            has_keywords: !keywords.is_empty(),
            query_terms,
            query_params,
        })
    }
}

fn clean_terms(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn validate_date(field: &'static str, value: String) -> Result<String, ValidationError> {
    let value = value.trim().to_string();
    let well_formed =
        matches!(value.len(), 8 | 14) && value.bytes().all(|b| b.is_ascii_digit());
    if well_formed {
        Ok(value)
    } else {
        Err(ValidationError::InvalidDate { field, value })
    }
}

/// `short_override` replaces the date's own width check when present.
fn pad_date(date: String, short_override: Option<bool>) -> String {
    let is_short = short_override.unwrap_or(date.len() == 8);
    if is_short {
        format!("{date}{TIME_SUFFIX}")
    } else {
        date
    }
}

fn keyword_clause(keywords: &[String]) -> Option<String> {
    match keywords {
        [] => None,
        [single] => Some(format!("\"{single}\"")),
        many => Some(format!(
            "({})",
            many.iter()
                .map(|k| format!("\"{k}\""))
                .collect::<Vec<_>>()
                .join(" OR ")
        )),
    }
}

fn filter_clause(name: &str, values: &[String]) -> Option<String> {
    match values {
        [] => None,
        [single] => Some(format!("{name}:{single}")),
        many => Some(format!("{name}:({})", many.join(" OR "))),
    }
}
