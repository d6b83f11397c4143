use typed_builder::TypedBuilder;

/// Order of a timestamped listing. Ties are always broken by ascending id.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAsc,
    #[default]
    CreatedDesc,
    ModifiedAsc,
    ModifiedDesc,
}

impl SortKey {
    /// Parses a sort parameter, ignoring case. Anything unknown sorts newest first.
    pub fn from_param(param: Option<&str>) -> Self {
        let Some(param) = param.map(str::trim) else {
            return SortKey::default();
        };
        if param.eq_ignore_ascii_case("CreatedAsc") {
            SortKey::CreatedAsc
        } else if param.eq_ignore_ascii_case("ModifiedAsc") {
            SortKey::ModifiedAsc
        } else if param.eq_ignore_ascii_case("ModifiedDesc") {
            SortKey::ModifiedDesc
        } else {
            SortKey::CreatedDesc
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, TypedBuilder)]
pub struct NewsFilter {
    #[builder(default, setter(strip_option, into))]
    pub title_part: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub content_part: Option<String>,
    #[builder(default, setter(strip_option))]
    pub author_id: Option<i64>,
    #[builder(default, setter(strip_option, into))]
    pub author_name: Option<String>,
    /// Matches news linked to at least one of these tags.
    #[builder(default)]
    pub tag_ids: Vec<i64>,
    /// Matches news linked to at least one tag with one of these names.
    #[builder(default)]
    pub tag_names: Vec<String>,
    #[builder(default)]
    pub sort: SortKey,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, TypedBuilder)]
pub struct TagFilter {
    #[builder(default, setter(strip_option, into))]
    pub name_part: Option<String>,
    /// Restricts to tags linked to this news article.
    #[builder(default, setter(strip_option))]
    pub news_id: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, TypedBuilder)]
pub struct CommentFilter {
    #[builder(default, setter(strip_option))]
    pub news_id: Option<i64>,
    #[builder(default, setter(strip_option, into))]
    pub content_part: Option<String>,
    #[builder(default)]
    pub sort: SortKey,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, TypedBuilder)]
pub struct AuthorFilter {
    #[builder(default, setter(strip_option, into))]
    pub name_part: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sort_key_parsing() {
        assert_eq!(SortKey::from_param(Some("CreatedAsc")), SortKey::CreatedAsc);
        assert_eq!(SortKey::from_param(Some("createdasc")), SortKey::CreatedAsc);
        assert_eq!(SortKey::from_param(Some("MODIFIEDDESC")), SortKey::ModifiedDesc);
        assert_eq!(SortKey::from_param(Some("ModifiedAsc")), SortKey::ModifiedAsc);
        assert_eq!(SortKey::from_param(Some("CreatedDesc")), SortKey::CreatedDesc);
    }

    #[test]
    fn unknown_or_missing_sort_key_is_newest_first() {
        assert_eq!(SortKey::from_param(None), SortKey::CreatedDesc);
        assert_eq!(SortKey::from_param(Some("")), SortKey::CreatedDesc);
        assert_eq!(SortKey::from_param(Some("title")), SortKey::CreatedDesc);
    }

    #[test]
    fn builder_leaves_unset_filters_empty() {
        let filter = NewsFilter::builder().title_part("rust").tag_ids(vec![3]).build();

        assert_eq!(filter.title_part.as_deref(), Some("rust"));
        assert_eq!(filter.content_part, None);
        assert_eq!(filter.author_id, None);
        assert_eq!(filter.tag_ids, vec![3]);
        assert!(filter.tag_names.is_empty());
        assert_eq!(filter.sort, SortKey::CreatedDesc);
    }
}
