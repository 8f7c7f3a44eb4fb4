use serde::{Deserialize, Deserializer, Serialize};

/// Search filters for the CareerNet job catalog. Built per request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub keyword: Option<String>,
    pub aptitude_codes: Option<String>,
    pub theme_code: Option<String>,
}

impl CatalogQuery {
    /// Non-blank filters as `(upstream parameter, value)` pairs.
    pub fn filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("searchJobNm", self.keyword.as_deref()),
            ("searchAptdCodes", self.aptitude_codes.as_deref()),
            ("searchThemeCode", self.theme_code.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        })
        .collect()
    }

    pub fn is_usable(&self) -> bool {
        !self.filters().is_empty()
    }
}

/// A single job in the catalog. Uniqueness key is `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(alias = "job_nm")]
    pub name: String,
    #[serde(alias = "job_cd", deserialize_with = "string_or_number")]
    pub code: String,
}

/// One page of the upstream job list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    #[serde(deserialize_with = "lenient_u32")]
    pub count: u32,
    #[serde(rename = "pageSize", deserialize_with = "lenient_u32")]
    pub page_size: u32,
    #[serde(rename = "pageIndex", deserialize_with = "lenient_u32")]
    pub page_index: u32,
    #[serde(rename = "jobs", default)]
    pub items: Vec<JobRecord>,
}

impl CatalogPage {
    /// `ceil(count / page_size)`; `None` when the envelope claims results but no page size.
    pub fn total_pages(&self) -> Option<u32> {
        if self.count == 0 {
            return Some(0);
        }
        if self.page_size == 0 {
            return None;
        }
        Some(self.count.div_ceil(self.page_size))
    }
}

/// Aggregated result of a full catalog search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSummary {
    /// What the first page claimed.
    pub total_count: u32,
    /// Records received across all pages, before dedup.
    pub retrieved_count: usize,
    pub unique_count: usize,
    pub jobs: Vec<JobRecord>,
}

impl FetchSummary {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            retrieved_count: 0,
            unique_count: 0,
            jobs: vec![],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(s) => s.trim().to_string(),
        StringOrNumber::Int(n) => n.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| D::Error::custom(format!("expected a count, got '{s}'"))),
        StringOrNumber::Int(n) => {
            u32::try_from(n).map_err(|_| D::Error::custom(format!("count out of range: {n}")))
        }
        StringOrNumber::Float(f) => Err(D::Error::custom(format!("expected an integer, got {f}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_not_usable() {
        let query = CatalogQuery {
            keyword: Some("   ".to_string()),
            aptitude_codes: None,
            theme_code: Some(String::new()),
        };
        assert!(!query.is_usable());
        assert!(!CatalogQuery::default().is_usable());
    }

    #[test]
    fn test_filters_are_trimmed_and_mapped_to_upstream_names() {
        let query = CatalogQuery {
            keyword: Some(" 간호사 ".to_string()),
            aptitude_codes: None,
            theme_code: Some("7".to_string()),
        };
        assert_eq!(
            query.filters(),
            vec![("searchJobNm", "간호사"), ("searchThemeCode", "7")]
        );
    }

    #[test]
    fn test_page_parses_string_and_numeric_fields() {
        let json = r#"{
            "count": "47",
            "pageSize": 10,
            "pageIndex": "1",
            "jobs": [
                {"job_nm": "간호사", "job_cd": 120},
                {"job_nm": "약사", "job_cd": "121"}
            ]
        }"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 47);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.items[0].code, "120");
        assert_eq!(page.items[1].code, "121");
        assert_eq!(page.items[1].name, "약사");
    }

    #[test]
    fn test_page_without_jobs_array_is_empty() {
        let json = r#"{"count": 0, "pageSize": 10, "pageIndex": 1}"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let json = r#"{"count": -1, "pageSize": 10, "pageIndex": 1, "jobs": []}"#;
        assert!(serde_json::from_str::<CatalogPage>(json).is_err());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = CatalogPage {
            count: 47,
            page_size: 10,
            page_index: 1,
            items: vec![],
        };
        assert_eq!(page.total_pages(), Some(5));
    }

    #[test]
    fn test_total_pages_with_missing_page_size() {
        let page = CatalogPage {
            count: 3,
            page_size: 0,
            page_index: 1,
            items: vec![],
        };
        assert_eq!(page.total_pages(), None);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = FetchSummary::empty();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalCount"], 0);
        assert_eq!(json["uniqueCount"], 0);
        assert!(json["jobs"].as_array().unwrap().is_empty());
    }
}
