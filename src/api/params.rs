use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::query::{AuthorFilter, CommentFilter, NewsFilter, QueryError, SortKey, TagFilter};

lazy_static! {
    static ref RE_ID_LIST: Regex = Regex::new(r"^[0-9]+(,[0-9]+)*$").unwrap();
    static ref RE_NAME_LIST: Regex = Regex::new(r"^[^,]+(,[^,]+)*$").unwrap();
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub(crate) struct NewsSearchParams {
    /// Part of the title, ignoring case
    #[serde(rename = "titlePart")]
    pub(crate) title_part: Option<String>,

    /// Part of the content, ignoring case
    #[serde(rename = "contentPart")]
    pub(crate) content_part: Option<String>,

    #[serde(rename = "authorId")]
    pub(crate) author_id: Option<i64>,

    /// Exact author name
    #[serde(rename = "authorName")]
    pub(crate) author_name: Option<String>,

    /// Comma separated tag ids, news with at least one of them match
    #[validate(regex(path = *RE_ID_LIST))]
    #[serde(rename = "tagIds")]
    pub(crate) tag_ids: Option<String>,

    /// Comma separated tag names, news with at least one of them match
    #[validate(regex(path = *RE_NAME_LIST))]
    #[serde(rename = "tagNames")]
    pub(crate) tag_names: Option<String>,

    /// One of createdAsc, createdDesc, modifiedAsc, modifiedDesc. Anything else
    /// sorts newest first.
    #[serde(rename = "sort")]
    pub(crate) sort: Option<String>,
}

impl TryFrom<NewsSearchParams> for NewsFilter {
    type Error = QueryError;

    fn try_from(params: NewsSearchParams) -> Result<Self, Self::Error> {
        let tag_ids = split_list(params.tag_ids.as_deref())
            .map(|id| {
                id.parse()
                    .map_err(|_| QueryError::InvalidArgument(format!("Invalid tag id {id}")))
            })
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(NewsFilter {
            title_part: params.title_part,
            content_part: params.content_part,
            author_id: params.author_id,
            author_name: params.author_name,
            tag_ids,
            tag_names: split_list(params.tag_names.as_deref())
                .map(str::to_string)
                .collect(),
            sort: SortKey::from_param(params.sort.as_deref()),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub(crate) struct SortParams {
    /// One of createdAsc, createdDesc, modifiedAsc, modifiedDesc. Anything else
    /// sorts newest first.
    #[serde(rename = "sort")]
    pub(crate) sort: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub(crate) struct CommentSearchParams {
    #[serde(rename = "newsId")]
    pub(crate) news_id: Option<i64>,

    /// Part of the comment text, ignoring case
    #[serde(rename = "contentPart")]
    pub(crate) content_part: Option<String>,

    /// One of createdAsc, createdDesc, modifiedAsc, modifiedDesc. Anything else
    /// sorts newest first.
    #[serde(rename = "sort")]
    pub(crate) sort: Option<String>,
}

impl From<CommentSearchParams> for CommentFilter {
    fn from(params: CommentSearchParams) -> Self {
        CommentFilter {
            news_id: params.news_id,
            content_part: params.content_part,
            sort: SortKey::from_param(params.sort.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub(crate) struct NamePartParams {
    /// Part of the name, ignoring case
    #[serde(rename = "namePart")]
    #[validate(length(max = 15))]
    pub(crate) name_part: Option<String>,
}

impl From<NamePartParams> for TagFilter {
    fn from(params: NamePartParams) -> Self {
        TagFilter {
            name_part: params.name_part,
            news_id: None,
        }
    }
}

impl From<NamePartParams> for AuthorFilter {
    fn from(params: NamePartParams) -> Self {
        AuthorFilter {
            name_part: params.name_part,
        }
    }
}

fn split_list(s: Option<&str>) -> impl Iterator<Item = &str> {
    s.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn param_validation_test() {
        let all_fields_empty = NewsSearchParams::default();
        assert!(all_fields_empty.validate().is_ok());

        let valid = NewsSearchParams {
            tag_ids: Some("1,3,12".to_string()),
            sort: Some("modifiedAsc".to_string()),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let invalid_tag_ids = NewsSearchParams {
            tag_ids: Some("1,,x".to_string()),
            ..Default::default()
        };
        assert!(invalid_tag_ids.validate().is_err());

        let unknown_sort = NewsSearchParams {
            sort: Some("title".to_string()),
            ..Default::default()
        };
        assert!(unknown_sort.validate().is_ok());
    }

    #[test]
    fn news_params_to_filter() {
        // Arrange
        let params = NewsSearchParams {
            title_part: Some("rust".to_string()),
            tag_ids: Some("3,5".to_string()),
            tag_names: Some("science, tech".to_string()),
            sort: Some("CreatedAsc".to_string()),
            ..Default::default()
        };

        // Act
        let filter = NewsFilter::try_from(params).unwrap();

        // Assert
        assert_eq!(
            filter,
            NewsFilter::builder()
                .title_part("rust")
                .tag_ids(vec![3, 5])
                .tag_names(vec!["science".to_string(), "tech".to_string()])
                .sort(SortKey::CreatedAsc)
                .build()
        );
    }

    #[test]
    fn tag_id_out_of_range_is_rejected() {
        // Arrange
        let params = NewsSearchParams {
            tag_ids: Some("99999999999999999999".to_string()),
            ..Default::default()
        };
        assert!(params.validate().is_ok());

        // Act
        let r = NewsFilter::try_from(params);

        // Assert
        assert!(matches!(r, Err(QueryError::InvalidArgument(_))));
    }

    #[test]
    fn unknown_sort_is_newest_first() {
        let filter = NewsFilter::try_from(NewsSearchParams {
            sort: Some("title".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(filter.sort, SortKey::CreatedDesc);
    }

    #[test]
    fn missing_sort_is_newest_first() {
        let filter: CommentFilter = CommentSearchParams {
            news_id: Some(2),
            ..Default::default()
        }
        .into();

        assert_eq!(filter.sort, SortKey::CreatedDesc);
        assert_eq!(filter.news_id, Some(2));
    }

    #[test]
    fn empty_list_is_no_filter() {
        assert_eq!(split_list(None).count(), 0);
        assert_eq!(split_list(Some("")).count(), 0);
    }
}
